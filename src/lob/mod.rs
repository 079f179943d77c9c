//! lob: восстановление LOB-значений.
//!
//! - tree.rs    : LobTreeWalker, LARGE_ROOT → INTERNAL → упорядоченный список листьев.
//! - assemble.rs: BlobAssembler, склейка payload листьев; SMALL_ROOT inline.
//!
//! Точки входа по (page, slot):
//! - extract_small: SMALL_ROOT (type 0), без обхода дерева;
//! - extract_large: LARGE_ROOT (type 5): обход + сборка в Write; при cfg.strict
//!   предупреждения обхода останавливают извлечение до первой записи в выход;
//! - extract_lob  : по фактическому типу корневой записи.

pub mod assemble;
pub mod tree;

pub use assemble::{assemble, assemble_into, decode_small_root, Assembled};
pub use tree::{walk_lob_tree, LeafRef, LobTree, LobTreeWalker};

use std::io::{Read, Seek, Write};

use serde::Serialize;

use crate::config::CarveConfig;
use crate::consts::{LOB_TYPE_LARGE_ROOT, LOB_TYPE_SMALL_ROOT};
use crate::error::{Diagnostics, Error, Result};
use crate::pager::PageReader;

/// Итог извлечения одного объекта.
#[derive(Debug, Clone, Serialize)]
pub struct Extracted {
    pub page: u32,
    pub slot: u16,
    pub root_offset: u16,
    pub root_type: u16,
    pub bytes_written: u64,
    pub leaves: usize,
    pub diagnostics: Diagnostics,
}

/// SMALL_ROOT в (page, slot) → значение.
pub fn extract_small<R: Read + Seek>(
    reader: &mut PageReader<R>,
    page_id: u32,
    slot: u16,
) -> Result<Vec<u8>> {
    let page = reader.read_page(page_id)?;
    let off = page.offset_of_slot(slot)? as usize;
    decode_small_root(&page, off, slot)
}

/// LARGE_ROOT в (page, slot) → байты объекта в out.
pub fn extract_large<R: Read + Seek, W: Write>(
    reader: &mut PageReader<R>,
    page_id: u32,
    slot: u16,
    out: &mut W,
    cfg: &CarveConfig,
) -> Result<Extracted> {
    let tree = walk_lob_tree(reader, page_id, slot, cfg)?;
    let mut diagnostics = tree.diagnostics;
    if cfg.strict && !diagnostics.is_empty() {
        return Err(strict_failure(page_id, &diagnostics).with_diagnostics(diagnostics));
    }

    let bytes_written = assemble_into(reader, &tree.leaves, out, cfg, &mut diagnostics)?;
    if cfg.strict && !diagnostics.is_empty() {
        return Err(Error::Partial {
            written: bytes_written,
            recovered: None,
            source: Box::new(strict_failure(page_id, &diagnostics)),
            diagnostics,
        });
    }
    Ok(Extracted {
        page: page_id,
        slot,
        root_offset: tree.root_offset,
        root_type: LOB_TYPE_LARGE_ROOT,
        bytes_written,
        leaves: tree.leaves.len(),
        diagnostics,
    })
}

/// Извлечь объект, выбрав путь по типу корневой записи.
pub fn extract_lob<R: Read + Seek, W: Write>(
    reader: &mut PageReader<R>,
    page_id: u32,
    slot: u16,
    out: &mut W,
    cfg: &CarveConfig,
) -> Result<Extracted> {
    let page = reader.read_page(page_id)?;
    let off = page.offset_of_slot(slot)? as usize;
    let rec_type = page.lob_header_at(off)?.rec_type;

    match rec_type {
        LOB_TYPE_SMALL_ROOT => {
            let v = decode_small_root(&page, off, slot)?;
            out.write_all(&v)?;
            Ok(Extracted {
                page: page_id,
                slot,
                root_offset: off as u16,
                root_type: rec_type,
                bytes_written: v.len() as u64,
                leaves: 0,
                diagnostics: Diagnostics::new(),
            })
        }
        LOB_TYPE_LARGE_ROOT => extract_large(reader, page_id, slot, out, cfg),
        other => Err(Error::FormatMismatch {
            page: page_id,
            slot: Some(slot),
            expected: "SMALL_ROOT or LARGE_ROOT",
            actual: other,
        }),
    }
}

fn strict_failure(page_id: u32, diag: &Diagnostics) -> Error {
    Error::structure(
        page_id,
        format!("strict mode: {} irregular value(s) in LOB tree", diag.len()),
    )
}
