//! record/row: строки данных (record type 1).
//!
//! Длина строки нигде не хранится явно: её конец: конец последней переменной
//! колонки. Разбор:
//!   [status u8][unused u8][offset_to_column_count u16] ... fixed data ...
//!   @offset_to_column_count: [column_count u16][null bitmap 1 + cc/8 B]
//!                            [var_count u16][var_count * u16 end offsets]
//! У смещений переменных колонок старшие 3 бита: флаги (маска 0x1fff).

use byteorder::{ByteOrder, LittleEndian};

use crate::consts::{ROW_HDR_SIZE, VAR_OFFSET_MASK};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRecordHeader {
    pub status: u8,
    pub offset_to_column_count: u16,
}

impl RowRecordHeader {
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < ROW_HDR_SIZE {
            return Err(Error::Truncated {
                what: "row record header",
                need: ROW_HDR_SIZE,
                have: buf.len(),
            });
        }
        Ok(Self {
            status: buf[0],
            offset_to_column_count: LittleEndian::read_u16(&buf[2..4]),
        })
    }

    pub fn encode(&self, buf: &mut [u8]) -> Result<()> {
        if buf.len() < ROW_HDR_SIZE {
            return Err(Error::Truncated {
                what: "row record header",
                need: ROW_HDR_SIZE,
                have: buf.len(),
            });
        }
        buf[0] = self.status;
        buf[1] = 0;
        LittleEndian::write_u16(&mut buf[2..4], self.offset_to_column_count);
        Ok(())
    }
}

/// Разобранная хвостовая часть строки (после fixed data).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLayout {
    pub header: RowRecordHeader,
    pub column_count: u16,
    pub null_bitmap_len: usize,
    /// Смещения концов переменных колонок относительно начала записи, уже без флагов.
    pub var_offsets: Vec<u16>,
}

#[inline]
pub fn null_bitmap_len(column_count: u16) -> usize {
    1 + column_count as usize / 8
}

impl RowLayout {
    /// Разобрать строку, начинающуюся с rec[0]. rec: хвост страницы от начала записи.
    pub fn decode(rec: &[u8]) -> Result<Self> {
        let header = RowRecordHeader::decode(rec)?;
        let mut pos = header.offset_to_column_count as usize;

        let column_count = read_u16_at(rec, pos, "row column count")?;
        pos += 2;
        let nb = null_bitmap_len(column_count);
        pos += nb;

        let var_count = read_u16_at(rec, pos, "row variable column count")?;
        pos += 2;

        let mut var_offsets = Vec::with_capacity(var_count as usize);
        for _ in 0..var_count {
            let raw = read_u16_at(rec, pos, "row variable column offsets")?;
            var_offsets.push(raw & VAR_OFFSET_MASK);
            pos += 2;
        }

        Ok(Self {
            header,
            column_count,
            null_bitmap_len: nb,
            var_offsets,
        })
    }

    /// Полная длина записи = конец последней переменной колонки.
    pub fn record_len(&self) -> Option<u16> {
        self.var_offsets.last().copied()
    }
}

/// Длина строки, начинающейся на in-page смещении `off` страницы `page_id`.
/// При V == 0 конец записи не вывести, это Structure.
pub fn row_record_len(page_id: u32, rec: &[u8], off: u16) -> Result<u16> {
    let layout = RowLayout::decode(rec)?;
    match layout.record_len() {
        Some(len) => Ok(len),
        None => Err(Error::structure(
            page_id,
            format!("row at offset {} has no variable-length columns", off),
        )),
    }
}

#[inline]
fn read_u16_at(buf: &[u8], pos: usize, what: &'static str) -> Result<u16> {
    match buf.get(pos..pos + 2) {
        Some(b) => Ok(LittleEndian::read_u16(b)),
        None => Err(Error::Truncated {
            what,
            need: pos + 2,
            have: buf.len(),
        }),
    }
}
