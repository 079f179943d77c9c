//! lob/assemble (BlobAssembler): склейка payload DATA-листьев в порядке списка,
//! плюс разбор SMALL_ROOT (объект целиком внутри одной записи, без дерева).
//!
//! Лист не-DATA типа: предупреждение, payload всё равно пишется (best-effort).
//! Ошибка на листе прерывает сборку: возвращается Error::Partial с числом уже
//! записанных байт и предупреждениями на момент сбоя; `assemble` кладёт туда же
//! собранный в память префикс.

use std::io::{Read, Seek, Write};

use byteorder::{ByteOrder, LittleEndian};
use log::{debug, info};

use crate::config::CarveConfig;
use crate::consts::{
    LOB_REC_HDR_SIZE, LOB_TYPE_DATA, LOB_TYPE_SMALL_ROOT, SMALL_ROOT_RESERVED_LEN,
    SMALL_ROOT_SIZE_LEN,
};
use crate::error::{Diagnostics, Error, Result, WarningKind};
use crate::page::Page;
use crate::pager::PageReader;

use super::tree::LeafRef;

/// Собранный в память объект.
#[derive(Debug, Clone)]
pub struct Assembled {
    pub bytes: Vec<u8>,
    pub diagnostics: Diagnostics,
}

/// Записать payload листьев в out по порядку. Возвращает число записанных байт.
pub fn assemble_into<R: Read + Seek, W: Write>(
    reader: &mut PageReader<R>,
    leaves: &[LeafRef],
    out: &mut W,
    cfg: &CarveConfig,
    diag: &mut Diagnostics,
) -> Result<u64> {
    let mut written = 0u64;
    // Подряд идущие листья часто лежат на одной странице.
    let mut cached: Option<Page> = None;

    for leaf in leaves {
        let step = copy_leaf(reader, &mut cached, *leaf, out, cfg, written, diag);
        match step {
            Ok(n) => written += n,
            Err(e) => {
                return Err(Error::Partial {
                    written,
                    recovered: None,
                    diagnostics: diag.clone(),
                    source: Box::new(e),
                })
            }
        }
    }

    info!("assembled {} byte(s) from {} leaf record(s)", written, leaves.len());
    Ok(written)
}

/// assemble в память.
pub fn assemble<R: Read + Seek>(
    reader: &mut PageReader<R>,
    leaves: &[LeafRef],
    cfg: &CarveConfig,
) -> Result<Assembled> {
    let mut bytes = Vec::new();
    let mut diagnostics = Diagnostics::new();
    match assemble_into(reader, leaves, &mut bytes, cfg, &mut diagnostics) {
        Ok(_) => Ok(Assembled { bytes, diagnostics }),
        Err(Error::Partial {
            written,
            diagnostics,
            source,
            ..
        }) => Err(Error::Partial {
            written,
            recovered: Some(bytes),
            diagnostics,
            source,
        }),
        Err(e) => Err(e),
    }
}

fn copy_leaf<R: Read + Seek, W: Write>(
    reader: &mut PageReader<R>,
    cached: &mut Option<Page>,
    leaf: LeafRef,
    out: &mut W,
    cfg: &CarveConfig,
    written: u64,
    diag: &mut Diagnostics,
) -> Result<u64> {
    let page = match cached.take() {
        Some(p) if p.page_id == leaf.page => p,
        _ => reader.read_page(leaf.page)?,
    };

    let off = page.data_offset_of_slot(leaf.slot)? as usize;
    let h = page.lob_header_at(off)?;
    debug!(
        "leaf: pid={} slot={} off={} len={} type={}",
        leaf.page, leaf.slot, off, h.length, h.rec_type
    );
    if h.rec_type != LOB_TYPE_DATA {
        diag.push(
            leaf.page,
            Some(leaf.slot),
            WarningKind::UnexpectedLeafType { found: h.rec_type },
        );
    }

    let plen = h.payload_len().ok_or_else(|| {
        Error::structure(
            leaf.page,
            format!("leaf slot {} declares length {} below header size", leaf.slot, h.length),
        )
    })?;
    if written + plen as u64 > cfg.max_object_bytes {
        return Err(Error::structure(
            leaf.page,
            format!(
                "object exceeds max_object_bytes {} (set MDF_MAX_OBJECT_BYTES to override)",
                cfg.max_object_bytes
            ),
        ));
    }

    let data = page.bytes_at(off + LOB_REC_HDR_SIZE, plen)?;
    out.write_all(data)?;
    *cached = Some(page);
    Ok(plen as u64)
}

/// Разобрать SMALL_ROOT на смещении off: [hdr 14][size u16][reserved 4][size байт].
pub fn decode_small_root(page: &Page, off: usize, slot: u16) -> Result<Vec<u8>> {
    let h = page.lob_header_at(off)?;
    if h.rec_type != LOB_TYPE_SMALL_ROOT {
        return Err(Error::FormatMismatch {
            page: page.page_id,
            slot: Some(slot),
            expected: "SMALL_ROOT",
            actual: h.rec_type,
        });
    }
    let size_at = off + LOB_REC_HDR_SIZE;
    let size = LittleEndian::read_u16(page.bytes_at(size_at, SMALL_ROOT_SIZE_LEN)?) as usize;
    let data_at = size_at + SMALL_ROOT_SIZE_LEN + SMALL_ROOT_RESERVED_LEN;
    debug!(
        "small root: pid={} slot={} off={} size={}",
        page.page_id, slot, off, size
    );
    Ok(page.bytes_at(data_at, size)?.to_vec())
}
