//! scan: проходы по файлу/странице для триажа.
//!
//! - for_each_page_header / scan_headers: заголовки всех полных страниц файла
//!   (опционально только страницы данных, type == 1).
//! - scan_rows: все записи страницы данных с разметкой live/ghost.

use std::io::{Read, Seek};

use log::{debug, info};
use serde::Serialize;

use crate::consts::{PAGE_SIZE, PAGE_TYPE_DATA};
use crate::error::{Diagnostics, Error, Result, WarningKind};
use crate::page::{reconcile_slots, Page, PageHeader, RowRecord};
use crate::pager::PageReader;

/// Вызвать f(page_no, header) для каждой полной страницы файла.
/// Хвост короче страницы: предупреждение TrailingBytes.
pub fn for_each_page_header<R, F>(
    reader: &mut PageReader<R>,
    data_only: bool,
    mut f: F,
) -> Result<Diagnostics>
where
    R: Read + Seek,
    F: FnMut(u32, &PageHeader) -> Result<()>,
{
    let mut diag = Diagnostics::new();
    let pages = reader.page_count();
    let tail = reader.len() % PAGE_SIZE as u64;
    if pages > u32::MAX as u64 + 1 {
        return Err(Error::structure(0, format!("{} pages exceed 32-bit page ids", pages)));
    }

    for pid in 0..pages {
        let pid = pid as u32;
        let h = reader.read_page_header(pid)?;
        if data_only && h.page_type != PAGE_TYPE_DATA {
            continue;
        }
        f(pid, &h)?;
    }

    if tail != 0 {
        diag.push(pages as u32, None, WarningKind::TrailingBytes { bytes: tail });
    }
    info!("header scan: {} page(s), data_only={}", pages, data_only);
    Ok(diag)
}

/// Собрать заголовки в вектор (page_no, header).
pub fn scan_headers<R: Read + Seek>(
    reader: &mut PageReader<R>,
    data_only: bool,
) -> Result<(Vec<(u32, PageHeader)>, Diagnostics)> {
    let mut out = Vec::new();
    let diag = for_each_page_header(reader, data_only, |pid, h| {
        out.push((pid, h.clone()));
        Ok(())
    })?;
    Ok((out, diag))
}

/// Разбор страницы данных: последовательные записи, slot array, сверка.
#[derive(Debug, Clone, Serialize)]
pub struct RowScan {
    pub page_id: u32,
    pub slot_cnt: u16,
    pub free_data: u16,
    pub slot_array: Vec<u16>,
    /// Границы записей, N+1 шт.
    pub boundaries: Vec<u16>,
    pub records: Vec<RowRecord>,
    pub diagnostics: Diagnostics,
    #[serde(skip)]
    page: Page,
}

impl RowScan {
    /// Сколько записей нашёл последовательный обход.
    pub fn actual_slots(&self) -> usize {
        self.records.len()
    }

    pub fn live(&self) -> impl Iterator<Item = &RowRecord> {
        self.records.iter().filter(|r| !r.deleted)
    }

    pub fn deleted(&self) -> impl Iterator<Item = &RowRecord> {
        self.records.iter().filter(|r| r.deleted)
    }

    pub fn header(&self) -> &PageHeader {
        &self.page.header
    }

    /// Байты записи [offset, offset+length).
    pub fn record_bytes(&self, r: &RowRecord) -> Result<&[u8]> {
        self.page.bytes_at(r.offset as usize, r.length as usize)
    }
}

/// Разобрать страницу данных page_id. Не type 1: FormatMismatch.
pub fn scan_rows<R: Read + Seek>(reader: &mut PageReader<R>, page_id: u32) -> Result<RowScan> {
    let page = reader.read_page(page_id)?;
    if page.header.page_type != PAGE_TYPE_DATA {
        return Err(Error::FormatMismatch {
            page: page_id,
            slot: None,
            expected: "data page (type 1)",
            actual: page.header.page_type as u16,
        });
    }

    let slot_array = page.slot_array()?;
    let boundaries = page.row_boundaries()?;
    let (records, unmatched) = reconcile_slots(&boundaries, &slot_array);

    let mut diagnostics = Diagnostics::new();
    for off in unmatched {
        diagnostics.push(page_id, None, WarningKind::UnmatchedSlotEntry { offset: off });
    }

    debug!(
        "scan_rows: pid={} slotCnt={} freeData={} slotArray={} actualSlots={}",
        page_id,
        page.header.slot_cnt,
        page.header.free_data,
        slot_array.len(),
        records.len()
    );

    Ok(RowScan {
        page_id,
        slot_cnt: page.header.slot_cnt,
        free_data: page.header.free_data,
        slot_array,
        boundaries,
        records,
        diagnostics,
        page,
    })
}
