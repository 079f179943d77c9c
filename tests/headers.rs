use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;

use mdfcarve::consts::{PAGE_SIZE, PAGE_TYPE_DATA, PAGE_TYPE_TEXT_MIX, PAGE_TYPE_TEXT_TREE};
use mdfcarve::page::{page_header_read, page_header_write, PageHeader};
use mdfcarve::scan::for_each_page_header;
use mdfcarve::{scan_headers, ErrorKind, PageReader, WarningKind};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("mdfcarve-{prefix}-{pid}-{t}-{id}"))
}

/// Образ из страниц заданных типов; page_id в заголовке = номер страницы.
fn image_of(types: &[u8]) -> Result<Vec<u8>> {
    let mut img = vec![0u8; types.len() * PAGE_SIZE];
    for (i, &t) in types.iter().enumerate() {
        let h = PageHeader {
            page_type: t,
            page_id: i as u32,
            obj_id: 1000 + i as u32,
            slot_cnt: i as u16,
            ..PageHeader::default()
        };
        page_header_write(&mut img[i * PAGE_SIZE..(i + 1) * PAGE_SIZE], &h)?;
    }
    Ok(img)
}

#[test]
fn header_fields_land_at_fixed_offsets() -> Result<()> {
    let h = PageHeader {
        page_type: PAGE_TYPE_DATA,
        index_id: -1,
        next_page_id: 0x0102_0304,
        slot_cnt: 0x0A0B,
        free_data: 0x1F00,
        page_id: 153,
        file_id: 1,
        ghost_rec_cnt: 2,
        ..PageHeader::default()
    };
    let mut buf = [0u8; 96];
    page_header_write(&mut buf, &h)?;

    assert_eq!(buf[1], PAGE_TYPE_DATA);
    assert_eq!(&buf[6..8], &[0xFF, 0xFF]);
    assert_eq!(&buf[16..20], &[0x04, 0x03, 0x02, 0x01]);
    assert_eq!(&buf[22..24], &[0x0B, 0x0A]);
    assert_eq!(&buf[30..32], &[0x00, 0x1F]);
    assert_eq!(&buf[32..36], &153u32.to_le_bytes());
    assert_eq!(&buf[58..60], &[0x02, 0x00]);

    let back = page_header_read(&buf)?;
    assert_eq!(back, h);
    assert!(back.is_data_page());
    Ok(())
}

#[test]
fn short_header_buffer_is_io_class_error() {
    let err = page_header_read(&[0u8; 95]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn reading_header_past_end_of_source_is_io_error() -> Result<()> {
    // файл короче одной страницы и даже короче заголовка
    let mut r = PageReader::new(Cursor::new(vec![0u8; 50]))?;
    assert_eq!(r.page_count(), 0);
    let err = r.read_page_header(0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);

    let mut r = PageReader::new(Cursor::new(image_of(&[1, 1])?))?;
    let err = r.read_page(2).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    Ok(())
}

#[test]
fn scan_all_and_data_only() -> Result<()> {
    let types = [0, PAGE_TYPE_DATA, PAGE_TYPE_TEXT_MIX, PAGE_TYPE_DATA, PAGE_TYPE_TEXT_TREE];
    let mut r = PageReader::new(Cursor::new(image_of(&types)?))?;

    let (all, diag) = scan_headers(&mut r, false)?;
    assert_eq!(all.len(), 5);
    assert!(diag.is_empty());
    for (pid, h) in &all {
        assert_eq!(h.page_id, *pid);
        assert_eq!(h.page_type, types[*pid as usize]);
    }

    let (data, _) = scan_headers(&mut r, true)?;
    let pids: Vec<u32> = data.iter().map(|(p, _)| *p).collect();
    assert_eq!(pids, vec![1, 3]);
    Ok(())
}

#[test]
fn trailing_partial_page_is_reported() -> Result<()> {
    let mut img = image_of(&[PAGE_TYPE_DATA, PAGE_TYPE_DATA])?;
    img.extend_from_slice(&[0u8; 100]);
    let mut r = PageReader::new(Cursor::new(img))?;

    let (all, diag) = scan_headers(&mut r, false)?;
    assert_eq!(all.len(), 2);
    let kinds: Vec<_> = diag.iter().map(|w| w.kind.clone()).collect();
    assert_eq!(kinds, vec![WarningKind::TrailingBytes { bytes: 100 }]);
    Ok(())
}

#[test]
fn callback_error_stops_scan() -> Result<()> {
    let mut r = PageReader::new(Cursor::new(image_of(&[1, 1, 1, 1])?))?;
    let mut seen = 0;
    let res = for_each_page_header(&mut r, false, |pid, _| {
        seen += 1;
        if pid == 1 {
            return Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed").into());
        }
        Ok(())
    });
    assert!(res.is_err());
    assert_eq!(seen, 2);
    Ok(())
}

#[test]
fn headers_from_file_on_disk() -> Result<()> {
    let root = unique_root("headers");
    fs::create_dir_all(&root)?;
    let path = root.join("data.mdf");
    fs::write(&path, image_of(&[0, PAGE_TYPE_DATA, PAGE_TYPE_TEXT_MIX])?)?;

    let mut r = PageReader::open(&path)?;
    assert_eq!(r.len(), 3 * PAGE_SIZE as u64);
    assert_eq!(r.page_count(), 3);
    let h = r.read_page_header(2)?;
    assert_eq!(h.page_type, PAGE_TYPE_TEXT_MIX);
    assert_eq!(h.obj_id, 1002);

    let page = r.read_page(1)?;
    assert_eq!(page.page_id, 1);
    assert!(page.header.is_data_page());

    fs::remove_dir_all(&root)?;
    Ok(())
}
