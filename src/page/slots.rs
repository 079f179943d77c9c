//! page/slots (SlotDirectory): где на странице лежит N-я запись.
//!
//! Два способа получить смещения:
//! - последовательный обход записей от смещения 96, шагая по длине каждой записи
//!   (для LOB-записей длина в заголовке; для строк: конец последней переменной колонки);
//! - slot array в конце страницы: slotCnt u16-смещений, slot 0: последние 2 байта.
//!
//! LOB-записи длиной ровно 14 байт (irregular-заглушки): обход их перешагивает,
//! но в счёт слотов не включает.
//!
//! Для страниц данных оба списка сверяются (reconcile_slots): запись, которой нет в slot
//! array (или на месте которой в slot array 0), считается удалённой (ghost).

use std::io::{Read, Seek};

use log::debug;
use serde::Serialize;

use crate::consts::{
    FIRST_RECORD_OFFSET, IRREGULAR_RECORD_LEN, LOB_REC_HDR_SIZE, PAGE_HDR_SIZE, PAGE_SIZE,
    SLOT_ENTRY_SIZE,
};
use crate::error::{Error, ErrorKind, Result};
use crate::pager::PageReader;
use crate::record::{row_record_len, LobRecordHeader};

use super::Page;

/// Одна запись страницы данных после сверки со slot array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowRecord {
    /// Порядковый номер в последовательном обходе.
    pub index: usize,
    pub offset: u16,
    pub length: u16,
    /// Номер слота, если запись сопоставлена элементу slot array.
    pub slot: Option<u16>,
    pub deleted: bool,
}

impl Page {
    /// Заголовок LOB-записи на in-page смещении off.
    pub fn lob_header_at(&self, off: usize) -> Result<LobRecordHeader> {
        LobRecordHeader::decode(self.bytes_at(off, LOB_REC_HDR_SIZE)?)
    }

    /// Смещение записи slot (LOB-страницы). Slot 0: всегда 96, заголовки не читаются.
    pub fn offset_of_slot(&self, slot: u16) -> Result<u16> {
        if slot == 0 {
            return Ok(FIRST_RECORD_OFFSET);
        }
        let slot_cnt = self.header.slot_cnt;
        let mut off = FIRST_RECORD_OFFSET as usize;
        let mut counted = 0u16;

        while counted < slot_cnt {
            let h = self.lob_header_at(off)?;
            if h.length == IRREGULAR_RECORD_LEN {
                debug!("offset_of_slot: pid={} irregular record at {}", self.page_id, off);
                off += IRREGULAR_RECORD_LEN as usize;
                continue;
            }
            if (h.length as usize) < LOB_REC_HDR_SIZE {
                return Err(Error::structure(
                    self.page_id,
                    format!("record at offset {} declares length {}", off, h.length),
                ));
            }
            off += h.length as usize;
            if off > PAGE_SIZE {
                return Err(Error::structure(
                    self.page_id,
                    format!("record walk ran past page end (offset {})", off),
                ));
            }
            counted += 1;
            if counted == slot {
                return Ok(off as u16);
            }
        }

        Err(Error::structure(
            self.page_id,
            format!("slot {} not reached: slotCnt {} exhausted", slot, slot_cnt),
        ))
    }

    /// Как offset_of_slot, но для slot > 0 дополнительно перешагивает irregular-записи,
    /// стоящие на месте найденного слота. Так адресуются DATA-листья.
    pub fn data_offset_of_slot(&self, slot: u16) -> Result<u16> {
        let mut off = self.offset_of_slot(slot)? as usize;
        if slot != 0 {
            while self.lob_header_at(off)?.length == IRREGULAR_RECORD_LEN {
                off += IRREGULAR_RECORD_LEN as usize;
            }
        }
        Ok(off as u16)
    }

    /// Границы строк страницы данных: [96, end_0, end_1, ...] до freeData.
    /// N записей дают N+1 границу.
    pub fn row_boundaries(&self) -> Result<Vec<u16>> {
        let free = self.header.free_data as usize;
        if free > PAGE_SIZE {
            return Err(Error::structure(
                self.page_id,
                format!("freeData {} beyond page size", free),
            ));
        }

        let mut off = FIRST_RECORD_OFFSET as usize;
        let mut out = vec![FIRST_RECORD_OFFSET];
        while off < free {
            let rec = self.bytes_at(off, PAGE_SIZE - off)?;
            let len = row_record_len(self.page_id, rec, off as u16).map_err(|e| {
                if e.kind() == ErrorKind::Io {
                    Error::structure(self.page_id, format!("row at offset {}: {}", off, e))
                } else {
                    e
                }
            })?;
            if len == 0 {
                return Err(Error::structure(
                    self.page_id,
                    format!("row at offset {} has zero length", off),
                ));
            }
            off += len as usize;
            if off > PAGE_SIZE {
                return Err(Error::structure(
                    self.page_id,
                    format!("row walk ran past page end (offset {})", off),
                ));
            }
            out.push(off as u16);
        }
        Ok(out)
    }

    /// Slot array в порядке слотов (slot 0 первым). 0: удалённый слот.
    pub fn slot_array(&self) -> Result<Vec<u16>> {
        let cnt = self.header.slot_cnt as usize;
        if cnt * SLOT_ENTRY_SIZE > PAGE_SIZE - PAGE_HDR_SIZE {
            return Err(Error::structure(
                self.page_id,
                format!("slotCnt {} does not fit in page", cnt),
            ));
        }
        let mut out = Vec::with_capacity(cnt);
        for i in 0..cnt {
            let pos = PAGE_SIZE - SLOT_ENTRY_SIZE * i - SLOT_ENTRY_SIZE;
            let b = self.bytes_at(pos, SLOT_ENTRY_SIZE)?;
            out.push(u16::from_le_bytes([b[0], b[1]]));
        }
        Ok(out)
    }
}

/// Сверить последовательные записи (boundaries, N+1 шт.) со slot array.
///
/// Идём по обоим спискам синхронно. Совпало, значит запись живая, двигаем оба указателя;
/// не совпало: запись удалена, указатель slot array двигаем только если там 0.
/// Возвращает записи и ненулевые элементы slot array, которым не нашлось записи.
pub fn reconcile_slots(boundaries: &[u16], slot_array: &[u16]) -> (Vec<RowRecord>, Vec<u16>) {
    let n = boundaries.len().saturating_sub(1);
    let mut out = Vec::with_capacity(n);
    let mut i = 0usize;
    let mut j = 0usize;

    let rec = |i: usize, slot: Option<u16>, deleted: bool| RowRecord {
        index: i,
        offset: boundaries[i],
        length: boundaries[i + 1].saturating_sub(boundaries[i]),
        slot,
        deleted,
    };

    while j < slot_array.len() && i < n {
        if boundaries[i] == slot_array[j] {
            out.push(rec(i, Some(j as u16), false));
            j += 1;
        } else if slot_array[j] == 0 {
            out.push(rec(i, Some(j as u16), true));
            j += 1;
        } else {
            out.push(rec(i, None, true));
        }
        i += 1;
    }
    while i < n {
        out.push(rec(i, None, true));
        i += 1;
    }

    let unmatched = slot_array[j..].iter().copied().filter(|&o| o != 0).collect();
    (out, unmatched)
}

// ---------------- reader-level helpers ----------------

/// offsetOfSlot поверх источника: прочитать страницу и найти смещение слота.
pub fn offset_of_slot<R: Read + Seek>(
    reader: &mut PageReader<R>,
    page_id: u32,
    slot: u16,
) -> Result<u16> {
    reader.read_page(page_id)?.offset_of_slot(slot)
}

/// slotOffsets поверх источника: границы строк страницы данных.
pub fn slot_offsets<R: Read + Seek>(reader: &mut PageReader<R>, page_id: u32) -> Result<Vec<u16>> {
    reader.read_page(page_id)?.row_boundaries()
}
