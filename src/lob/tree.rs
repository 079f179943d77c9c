//! lob/tree (LobTreeWalker): LARGE_ROOT → INTERNAL* → список DATA-листьев.
//!
//! Обход: явный стек (pre-order, дети кладутся в обратном порядке), поэтому глубина
//! дерева ограничена только тем, что реально записано в level, а не рекурсией.
//! Каждая INTERNAL-страница посещается не более одного раза: повтор даёт Structure (цикл).
//!
//! Где лежит узел: ссылка (page, slot); slot 0: смещение 96, иначе обход слотов страницы.
//! Если ссылка из корня указывает прямо на DATA-запись (дерево в один уровень),
//! эта ссылка сама является листом.
//!
//! Необычные значения (fileId != 1, ненулевой slot в ссылке корня или между INTERNAL
//! узлами, maxlinks != 501) не прерывают обход, а попадают в Diagnostics. Если обход
//! всё же падает, накопленное уходит в Error::WithDiagnostics.

use std::collections::HashSet;
use std::io::{Read, Seek};

use log::{debug, info};
use serde::Serialize;

use crate::config::CarveConfig;
use crate::consts::{
    LOB_INTERNAL_HDR_SIZE, LOB_INTERNAL_LINK_SIZE, LOB_REC_HDR_SIZE, LOB_ROOT_HDR_SIZE,
    LOB_ROOT_LINK_SIZE, LOB_TYPE_DATA, LOB_TYPE_LARGE_ROOT, PRIMARY_FILE_ID,
};
use crate::error::{Diagnostics, Error, Result, WarningKind};
use crate::page::Page;
use crate::pager::PageReader;
use crate::record::{
    LobInternalHeader, LobInternalLink, LobRecordHeader, LobRootHeader, LobRootLink,
};

/// Ссылка на одну DATA-запись, вносящую байты в объект.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LeafRef {
    pub page: u32,
    pub slot: u16,
}

/// Результат обхода одного LARGE_ROOT.
#[derive(Debug, Clone, Serialize)]
pub struct LobTree {
    pub root_page: u32,
    pub root_slot: u16,
    pub root_offset: u16,
    pub record: LobRecordHeader,
    pub root: LobRootHeader,
    pub links: Vec<LobRootLink>,
    /// Листья в порядке объекта (порядок ссылок, не номеров страниц).
    pub leaves: Vec<LeafRef>,
    /// Сколько INTERNAL-страниц прочитано.
    pub nodes_visited: usize,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    page: u32,
    slot: u16,
    from_root: bool,
}

pub struct LobTreeWalker<'a, R> {
    reader: &'a mut PageReader<R>,
    cfg: &'a CarveConfig,
}

impl<'a, R: Read + Seek> LobTreeWalker<'a, R> {
    pub fn new(reader: &'a mut PageReader<R>, cfg: &'a CarveConfig) -> Self {
        Self { reader, cfg }
    }

    /// Обойти дерево с корнем LARGE_ROOT в (page, slot).
    pub fn walk(&mut self, page_id: u32, slot: u16) -> Result<LobTree> {
        let mut diag = Diagnostics::new();
        match self.walk_inner(page_id, slot, &mut diag) {
            Ok(mut tree) => {
                tree.diagnostics = diag;
                Ok(tree)
            }
            Err(e) => Err(e.with_diagnostics(diag)),
        }
    }

    fn walk_inner(&mut self, page_id: u32, slot: u16, diag: &mut Diagnostics) -> Result<LobTree> {
        let page = self.reader.read_page(page_id)?;
        let root_off = page.offset_of_slot(slot)?;
        let off = root_off as usize;
        let record = page.lob_header_at(off)?;
        debug!(
            "lob root: pid={} slot={} off={} len={} blob_id={} type={}",
            page_id, slot, off, record.length, record.blob_id, record.rec_type
        );
        if record.rec_type != LOB_TYPE_LARGE_ROOT {
            return Err(Error::FormatMismatch {
                page: page_id,
                slot: Some(slot),
                expected: "LARGE_ROOT",
                actual: record.rec_type,
            });
        }

        let root_at = off + LOB_REC_HDR_SIZE;
        let root = LobRootHeader::decode(page.bytes_at(root_at, LOB_ROOT_HDR_SIZE)?)?;
        debug!(
            "lob root: maxlinks={} curlinks={} level={}",
            root.maxlinks, root.curlinks, root.level
        );

        let links_at = root_at + LOB_ROOT_HDR_SIZE;
        let body = page.bytes_at(links_at, root.curlinks as usize * LOB_ROOT_LINK_SIZE)?;
        let mut links = Vec::with_capacity(root.curlinks as usize);
        for chunk in body.chunks_exact(LOB_ROOT_LINK_SIZE) {
            let link = LobRootLink::decode(chunk)?;
            if link.slot != 0 {
                let kind = WarningKind::IrregularRootSlot { slot: link.slot };
                diag.push(page_id, Some(slot), kind);
            }
            if link.file_id != PRIMARY_FILE_ID {
                let kind = WarningKind::IrregularFileId {
                    file_id: link.file_id,
                };
                diag.push(page_id, Some(slot), kind);
            }
            debug!("  link: size={} page={} slot={}", link.size, link.page, link.slot);
            links.push(link);
        }

        let mut stack: Vec<Pending> = links
            .iter()
            .rev()
            .map(|l| Pending {
                page: l.page,
                slot: l.slot,
                from_root: true,
            })
            .collect();

        let mut visited: HashSet<u32> = HashSet::new();
        let mut leaves = Vec::new();

        while let Some(p) = stack.pop() {
            let node = self.reader.read_page(p.page)?;
            let node_off = node.offset_of_slot(p.slot)? as usize;
            let rh = node.lob_header_at(node_off)?;

            if p.from_root && rh.rec_type == LOB_TYPE_DATA {
                debug!("lob root link points at DATA: pid={} slot={}", p.page, p.slot);
                leaves.push(LeafRef {
                    page: p.page,
                    slot: p.slot,
                });
                continue;
            }

            if !visited.insert(p.page) {
                return Err(Error::structure(
                    p.page,
                    format!("LOB tree cycle: internal page {} revisited", p.page),
                ));
            }
            if visited.len() > self.cfg.max_tree_pages {
                return Err(Error::structure(
                    p.page,
                    format!(
                        "LOB tree exceeds max_tree_pages {} (set MDF_MAX_TREE_PAGES to override)",
                        self.cfg.max_tree_pages
                    ),
                ));
            }

            let (ih, node_links) = read_internal(&node, node_off)?;
            debug!(
                "lob internal: pid={} maxlinks={} curlinks={} level={}",
                p.page, ih.maxlinks, ih.curlinks, ih.level
            );
            if ih.maxlinks != self.cfg.expected_maxlinks {
                diag.push(
                    p.page,
                    Some(p.slot),
                    WarningKind::IrregularMaxLinks {
                        expected: self.cfg.expected_maxlinks,
                        found: ih.maxlinks,
                    },
                );
            }
            for l in &node_links {
                if l.file_id != PRIMARY_FILE_ID {
                    let kind = WarningKind::IrregularFileId { file_id: l.file_id };
                    diag.push(p.page, Some(p.slot), kind);
                }
            }

            if ih.level != 0 {
                // дочерний INTERNAL узел ожидается единственной записью страницы
                for l in node_links.iter().filter(|l| l.slot != 0) {
                    let kind = WarningKind::IrregularLinkSlot { slot: l.slot };
                    diag.push(p.page, Some(p.slot), kind);
                }
                for l in node_links.iter().rev() {
                    stack.push(Pending {
                        page: l.page,
                        slot: l.slot,
                        from_root: false,
                    });
                }
            } else {
                leaves.extend(node_links.iter().map(|l| LeafRef {
                    page: l.page,
                    slot: l.slot,
                }));
            }
        }

        info!(
            "lob tree: root pid={} slot={} -> {} leaf record(s) via {} internal page(s)",
            page_id,
            slot,
            leaves.len(),
            visited.len()
        );

        Ok(LobTree {
            root_page: page_id,
            root_slot: slot,
            root_offset: root_off,
            record,
            root,
            links,
            leaves,
            nodes_visited: visited.len(),
            diagnostics: Diagnostics::new(),
        })
    }
}

fn read_internal(page: &Page, off: usize) -> Result<(LobInternalHeader, Vec<LobInternalLink>)> {
    let hdr_at = off + LOB_REC_HDR_SIZE;
    let ih = LobInternalHeader::decode(page.bytes_at(hdr_at, LOB_INTERNAL_HDR_SIZE)?)?;
    let links_at = hdr_at + LOB_INTERNAL_HDR_SIZE;
    let body = page.bytes_at(links_at, ih.curlinks as usize * LOB_INTERNAL_LINK_SIZE)?;
    let links = body
        .chunks_exact(LOB_INTERNAL_LINK_SIZE)
        .map(LobInternalLink::decode)
        .collect::<Result<Vec<_>>>()?;
    Ok((ih, links))
}

/// Обойти дерево LARGE_ROOT в (page, slot) и вернуть упорядоченные листья.
pub fn walk_lob_tree<R: Read + Seek>(
    reader: &mut PageReader<R>,
    page_id: u32,
    slot: u16,
    cfg: &CarveConfig,
) -> Result<LobTree> {
    LobTreeWalker::new(reader, cfg).walk(page_id, slot)
}
