use std::io::Cursor;

use anyhow::Result;

use mdfcarve::consts::{
    LOB_INTERNAL_HDR_SIZE, LOB_INTERNAL_LINK_SIZE, LOB_REC_HDR_SIZE, LOB_ROOT_HDR_SIZE,
    LOB_ROOT_LINK_SIZE, LOB_TYPE_DATA, LOB_TYPE_INTERNAL, LOB_TYPE_LARGE_ROOT, PAGE_SIZE,
    PAGE_TYPE_TEXT_MIX, PAGE_TYPE_TEXT_TREE,
};
use mdfcarve::page::{page_header_write, PageHeader};
use mdfcarve::record::{
    LobInternalHeader, LobInternalLink, LobRecordHeader, LobRootHeader, LobRootLink,
};
use mdfcarve::{
    walk_lob_tree, CarveBuilder, CarveConfig, ErrorKind, LeafRef, PageReader, WarningKind,
};

// ---------- синтетический образ ----------

fn image(pages: usize) -> Vec<u8> {
    vec![0u8; pages * PAGE_SIZE]
}

fn page_mut(img: &mut [u8], pid: u32) -> &mut [u8] {
    let s = pid as usize * PAGE_SIZE;
    &mut img[s..s + PAGE_SIZE]
}

fn set_header(img: &mut [u8], pid: u32, page_type: u8, slot_cnt: u16) -> Result<()> {
    let h = PageHeader {
        page_type,
        slot_cnt,
        page_id: pid,
        ..PageHeader::default()
    };
    page_header_write(page_mut(img, pid), &h)?;
    Ok(())
}

/// LOB-запись на смещении off; возвращает смещение следующей.
fn put_lob(img: &mut [u8], pid: u32, off: usize, rec_type: u16, payload: &[u8]) -> Result<usize> {
    let p = page_mut(img, pid);
    let len = LOB_REC_HDR_SIZE + payload.len();
    LobRecordHeader {
        status: 0,
        length: len as u16,
        blob_id: 0xB10B,
        rec_type,
    }
    .encode(&mut p[off..])?;
    p[off + LOB_REC_HDR_SIZE..off + len].copy_from_slice(payload);
    Ok(off + len)
}

/// Тело LARGE_ROOT; ссылки (page, file_id, slot).
fn root_payload(links: &[(u32, u16, u16)]) -> Result<Vec<u8>> {
    let mut v = vec![0u8; LOB_ROOT_HDR_SIZE + links.len() * LOB_ROOT_LINK_SIZE];
    LobRootHeader {
        maxlinks: 5,
        curlinks: links.len() as u16,
        level: 1,
        unused: 0,
    }
    .encode(&mut v)?;
    for (i, &(page, file_id, slot)) in links.iter().enumerate() {
        let at = LOB_ROOT_HDR_SIZE + i * LOB_ROOT_LINK_SIZE;
        LobRootLink {
            size: 0,
            page,
            file_id,
            slot,
        }
        .encode(&mut v[at..])?;
    }
    Ok(v)
}

/// Тело INTERNAL узла.
fn internal_payload(maxlinks: u16, level: u16, links: &[(u32, u16, u16)]) -> Result<Vec<u8>> {
    let mut v = vec![0u8; LOB_INTERNAL_HDR_SIZE + links.len() * LOB_INTERNAL_LINK_SIZE];
    LobInternalHeader {
        maxlinks,
        curlinks: links.len() as u16,
        level,
    }
    .encode(&mut v)?;
    for (i, &(page, file_id, slot)) in links.iter().enumerate() {
        let at = LOB_INTERNAL_HDR_SIZE + i * LOB_INTERNAL_LINK_SIZE;
        LobInternalLink {
            offset: (i as u32 + 1) * 8000,
            unused: 0,
            page,
            file_id,
            slot,
        }
        .encode(&mut v[at..])?;
    }
    Ok(v)
}

fn put_internal(img: &mut [u8], pid: u32, level: u16, links: &[(u32, u16, u16)]) -> Result<()> {
    set_header(img, pid, PAGE_TYPE_TEXT_TREE, 1)?;
    put_lob(img, pid, 96, LOB_TYPE_INTERNAL, &internal_payload(501, level, links)?)?;
    Ok(())
}

fn reader(img: Vec<u8>) -> Result<PageReader<Cursor<Vec<u8>>>> {
    Ok(PageReader::new(Cursor::new(img))?)
}

fn cfg() -> CarveConfig {
    CarveBuilder::from_default().build()
}

// root(p1) -> [p2: level 0, 3 листа] + [p3: level 1 -> p4: level 0, 2 листа]
fn two_branch_image() -> Result<Vec<u8>> {
    let mut img = image(12);
    set_header(&mut img, 1, PAGE_TYPE_TEXT_MIX, 1)?;
    put_lob(&mut img, 1, 96, LOB_TYPE_LARGE_ROOT, &root_payload(&[(2, 1, 0), (3, 1, 0)])?)?;

    put_internal(&mut img, 2, 0, &[(10, 1, 0), (10, 1, 1), (10, 1, 2)])?;
    put_internal(&mut img, 3, 1, &[(4, 1, 0)])?;
    put_internal(&mut img, 4, 0, &[(11, 1, 0), (11, 1, 1)])?;
    Ok(img)
}

#[test]
fn walk_two_branches_in_link_order() -> Result<()> {
    let mut r = reader(two_branch_image()?)?;
    let tree = walk_lob_tree(&mut r, 1, 0, &cfg())?;

    let want = vec![
        LeafRef { page: 10, slot: 0 },
        LeafRef { page: 10, slot: 1 },
        LeafRef { page: 10, slot: 2 },
        LeafRef { page: 11, slot: 0 },
        LeafRef { page: 11, slot: 1 },
    ];
    assert_eq!(tree.leaves, want);
    assert_eq!(tree.links.len(), 2);
    assert_eq!(tree.nodes_visited, 3);
    assert!(tree.diagnostics.is_empty(), "{:?}", tree.diagnostics);
    Ok(())
}

#[test]
fn leaf_order_follows_links_not_page_numbers() -> Result<()> {
    let mut img = image(12);
    set_header(&mut img, 1, PAGE_TYPE_TEXT_MIX, 1)?;
    // первая ссылка ведёт на страницу с большим номером
    put_lob(&mut img, 1, 96, LOB_TYPE_LARGE_ROOT, &root_payload(&[(5, 1, 0), (2, 1, 0)])?)?;
    put_internal(&mut img, 5, 0, &[(9, 1, 3)])?;
    put_internal(&mut img, 2, 0, &[(8, 1, 0)])?;

    let mut r = reader(img)?;
    let tree = walk_lob_tree(&mut r, 1, 0, &cfg())?;
    assert_eq!(
        tree.leaves,
        vec![LeafRef { page: 9, slot: 3 }, LeafRef { page: 8, slot: 0 }]
    );
    Ok(())
}

#[test]
fn revisited_internal_page_is_structure_error() -> Result<()> {
    let mut img = image(6);
    set_header(&mut img, 1, PAGE_TYPE_TEXT_MIX, 1)?;
    put_lob(&mut img, 1, 96, LOB_TYPE_LARGE_ROOT, &root_payload(&[(3, 1, 0)])?)?;
    // p3 (level 1) -> p4 (level 1) -> p3
    put_internal(&mut img, 3, 1, &[(4, 1, 0)])?;
    put_internal(&mut img, 4, 1, &[(3, 1, 0)])?;

    let mut r = reader(img)?;
    let err = walk_lob_tree(&mut r, 1, 0, &cfg()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Structure);
    assert!(err.to_string().contains("revisited"), "{}", err);
    Ok(())
}

#[test]
fn self_referencing_node_is_structure_error() -> Result<()> {
    let mut img = image(4);
    set_header(&mut img, 1, PAGE_TYPE_TEXT_MIX, 1)?;
    put_lob(&mut img, 1, 96, LOB_TYPE_LARGE_ROOT, &root_payload(&[(2, 1, 0)])?)?;
    put_internal(&mut img, 2, 2, &[(2, 1, 0)])?;

    let mut r = reader(img)?;
    let err = walk_lob_tree(&mut r, 1, 0, &cfg()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Structure);
    Ok(())
}

#[test]
fn non_large_root_is_format_mismatch() -> Result<()> {
    let mut img = image(3);
    set_header(&mut img, 1, PAGE_TYPE_TEXT_MIX, 1)?;
    put_lob(&mut img, 1, 96, LOB_TYPE_DATA, b"payload")?;

    let mut r = reader(img)?;
    let err = walk_lob_tree(&mut r, 1, 0, &cfg()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FormatMismatch);
    match err {
        mdfcarve::Error::FormatMismatch { page, slot, actual, .. } => {
            assert_eq!(page, 1);
            assert_eq!(slot, Some(0));
            assert_eq!(actual, LOB_TYPE_DATA);
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[test]
fn irregular_values_are_warnings_not_failures() -> Result<()> {
    let mut img = image(12);
    set_header(&mut img, 1, PAGE_TYPE_TEXT_MIX, 1)?;
    put_lob(&mut img, 1, 96, LOB_TYPE_LARGE_ROOT, &root_payload(&[(2, 3, 0)])?)?;
    set_header(&mut img, 2, PAGE_TYPE_TEXT_TREE, 1)?;
    put_lob(
        &mut img,
        2,
        96,
        LOB_TYPE_INTERNAL,
        &internal_payload(200, 0, &[(10, 1, 0), (10, 7, 1)])?,
    )?;

    let mut r = reader(img)?;
    let tree = walk_lob_tree(&mut r, 1, 0, &cfg())?;
    assert_eq!(tree.leaves.len(), 2);

    let kinds: Vec<WarningKind> = tree.diagnostics.iter().map(|w| w.kind.clone()).collect();
    assert!(kinds.contains(&WarningKind::IrregularFileId { file_id: 3 }));
    assert!(kinds.contains(&WarningKind::IrregularFileId { file_id: 7 }));
    assert!(kinds.contains(&WarningKind::IrregularMaxLinks {
        expected: 501,
        found: 200
    }));
    Ok(())
}

#[test]
fn expected_maxlinks_is_configurable() -> Result<()> {
    let mut img = image(12);
    set_header(&mut img, 1, PAGE_TYPE_TEXT_MIX, 1)?;
    put_lob(&mut img, 1, 96, LOB_TYPE_LARGE_ROOT, &root_payload(&[(2, 1, 0)])?)?;
    set_header(&mut img, 2, PAGE_TYPE_TEXT_TREE, 1)?;
    put_lob(&mut img, 2, 96, LOB_TYPE_INTERNAL, &internal_payload(200, 0, &[(10, 1, 0)])?)?;

    let cfg = CarveBuilder::from_default().expected_maxlinks(200).build();
    let mut r = reader(img)?;
    let tree = walk_lob_tree(&mut r, 1, 0, &cfg)?;
    assert!(tree.diagnostics.is_empty());
    Ok(())
}

#[test]
fn root_link_with_nonzero_slot_is_flagged_and_followed() -> Result<()> {
    let mut img = image(12);
    set_header(&mut img, 1, PAGE_TYPE_TEXT_MIX, 1)?;
    put_lob(&mut img, 1, 96, LOB_TYPE_LARGE_ROOT, &root_payload(&[(2, 1, 1)])?)?;

    // p2: slot 0: посторонняя DATA-запись, slot 1: INTERNAL узел
    set_header(&mut img, 2, PAGE_TYPE_TEXT_TREE, 2)?;
    let next = put_lob(&mut img, 2, 96, LOB_TYPE_DATA, b"other")?;
    put_lob(&mut img, 2, next, LOB_TYPE_INTERNAL, &internal_payload(501, 0, &[(10, 1, 4)])?)?;

    let mut r = reader(img)?;
    let tree = walk_lob_tree(&mut r, 1, 0, &cfg())?;
    assert_eq!(tree.leaves, vec![LeafRef { page: 10, slot: 4 }]);
    assert_eq!(tree.diagnostics.len(), 1);
    let w = tree.diagnostics.iter().next().unwrap();
    assert_eq!(w.kind, WarningKind::IrregularRootSlot { slot: 1 });
    Ok(())
}

#[test]
fn root_link_pointing_at_data_is_a_leaf() -> Result<()> {
    let mut img = image(12);
    set_header(&mut img, 1, PAGE_TYPE_TEXT_MIX, 1)?;
    put_lob(&mut img, 1, 96, LOB_TYPE_LARGE_ROOT, &root_payload(&[(7, 1, 0), (8, 1, 0)])?)?;
    set_header(&mut img, 7, PAGE_TYPE_TEXT_MIX, 1)?;
    put_lob(&mut img, 7, 96, LOB_TYPE_DATA, b"first")?;
    set_header(&mut img, 8, PAGE_TYPE_TEXT_MIX, 1)?;
    put_lob(&mut img, 8, 96, LOB_TYPE_DATA, b"second")?;

    let mut r = reader(img)?;
    let tree = walk_lob_tree(&mut r, 1, 0, &cfg())?;
    assert_eq!(
        tree.leaves,
        vec![LeafRef { page: 7, slot: 0 }, LeafRef { page: 8, slot: 0 }]
    );
    assert_eq!(tree.nodes_visited, 0);
    Ok(())
}

#[test]
fn root_found_behind_irregular_record() -> Result<()> {
    let mut img = image(12);
    set_header(&mut img, 1, PAGE_TYPE_TEXT_MIX, 2)?;
    // 96: irregular (14), 110: DATA (slot 0), затем LARGE_ROOT (slot 1)
    let off = put_lob(&mut img, 1, 96, LOB_TYPE_DATA, &[])?;
    let off = put_lob(&mut img, 1, off, LOB_TYPE_DATA, b"xxxxxx")?;
    put_lob(&mut img, 1, off, LOB_TYPE_LARGE_ROOT, &root_payload(&[(2, 1, 0)])?)?;
    put_internal(&mut img, 2, 0, &[(10, 1, 0)])?;

    let mut r = reader(img)?;
    let tree = walk_lob_tree(&mut r, 1, 1, &cfg())?;
    assert_eq!(tree.root_offset as usize, off);
    assert_eq!(tree.leaves, vec![LeafRef { page: 10, slot: 0 }]);
    Ok(())
}

#[test]
fn tree_page_budget_is_enforced() -> Result<()> {
    let cfg = CarveBuilder::from_default().max_tree_pages(2).build();
    let mut r = reader(two_branch_image()?)?;
    let err = walk_lob_tree(&mut r, 1, 0, &cfg).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Structure);
    Ok(())
}

#[test]
fn child_page_beyond_file_is_io_error() -> Result<()> {
    let mut img = image(3);
    set_header(&mut img, 1, PAGE_TYPE_TEXT_MIX, 1)?;
    put_lob(&mut img, 1, 96, LOB_TYPE_LARGE_ROOT, &root_payload(&[(50, 1, 0)])?)?;

    let mut r = reader(img)?;
    let err = walk_lob_tree(&mut r, 1, 0, &cfg()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    Ok(())
}

#[test]
fn warnings_survive_a_failed_walk() -> Result<()> {
    let mut img = image(3);
    set_header(&mut img, 1, PAGE_TYPE_TEXT_MIX, 1)?;
    // fileId 3 даёт предупреждение до того, как чтение p50 упадёт
    put_lob(&mut img, 1, 96, LOB_TYPE_LARGE_ROOT, &root_payload(&[(50, 3, 0)])?)?;

    let mut r = reader(img)?;
    let err = walk_lob_tree(&mut r, 1, 0, &cfg()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    let diag = err.diagnostics().expect("warnings attached to error");
    let kinds: Vec<WarningKind> = diag.iter().map(|w| w.kind.clone()).collect();
    assert_eq!(kinds, vec![WarningKind::IrregularFileId { file_id: 3 }]);
    assert!(err.to_string().contains("1 warning(s)"), "{}", err);
    Ok(())
}

#[test]
fn nonzero_slot_between_internal_nodes_is_flagged() -> Result<()> {
    let mut img = image(12);
    set_header(&mut img, 1, PAGE_TYPE_TEXT_MIX, 1)?;
    put_lob(&mut img, 1, 96, LOB_TYPE_LARGE_ROOT, &root_payload(&[(3, 1, 0)])?)?;
    put_internal(&mut img, 3, 1, &[(4, 1, 1)])?;

    // p4: slot 0: посторонняя DATA-запись, slot 1: INTERNAL level 0
    set_header(&mut img, 4, PAGE_TYPE_TEXT_TREE, 2)?;
    let next = put_lob(&mut img, 4, 96, LOB_TYPE_DATA, b"other")?;
    put_lob(&mut img, 4, next, LOB_TYPE_INTERNAL, &internal_payload(501, 0, &[(10, 1, 0)])?)?;

    let mut r = reader(img)?;
    let tree = walk_lob_tree(&mut r, 1, 0, &cfg())?;
    assert_eq!(tree.leaves, vec![LeafRef { page: 10, slot: 0 }]);
    assert_eq!(tree.nodes_visited, 2);
    let kinds: Vec<WarningKind> = tree.diagnostics.iter().map(|w| w.kind.clone()).collect();
    assert_eq!(kinds, vec![WarningKind::IrregularLinkSlot { slot: 1 }]);
    let w = tree.diagnostics.iter().next().unwrap();
    assert_eq!(w.page, 3);
    Ok(())
}
