//! schema: разбор строк одной демонстрационной таблицы.
//!
//! pictures(id int, date char(8), category nchar(16), filename nvarchar(255), data image)
//!
//! Раскладка записи (смещения от начала записи):
//!   4  id u32
//!   8  date, 8 байт ASCII
//!   16 category, 32 байта UTF-16LE
//!   48 column count u16, 50 null bitmap 1 B, 51 var count u16
//!   53 конец filename u16, 55 конец data u16 (старшие 3 бита: флаги)
//!   57 filename UTF-16LE до своего конца
//!   последние 8 байт колонки data: указатель на корень LOB: [page u32][file u16][slot u16]

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use crate::consts::VAR_OFFSET_MASK;
use crate::error::{Error, Result};

const OFF_ID: usize = 4;
const OFF_DATE: usize = 8;
const DATE_LEN: usize = 8;
const OFF_CATEGORY: usize = 16;
const CATEGORY_LEN: usize = 32;
const OFF_VAR_ENDS: usize = 53;
const OFF_FILENAME: usize = 57;
const LOB_POINTER_LEN: usize = 8;

/// Ссылка строки на корневую LOB-запись.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LobPointer {
    pub page: u32,
    pub file_id: u16,
    pub slot: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PictureRow {
    pub id: u32,
    pub date: String,
    pub category: String,
    pub filename: String,
    pub data: LobPointer,
}

fn slice<'a>(rec: &'a [u8], off: usize, len: usize) -> Result<&'a [u8]> {
    rec.get(off..off + len).ok_or(Error::Truncated {
        what: "pictures row",
        need: off + len,
        have: rec.len(),
    })
}

fn utf16le(b: &[u8]) -> String {
    let units: Vec<u16> = b.chunks_exact(2).map(LittleEndian::read_u16).collect();
    String::from_utf16_lossy(&units)
}

/// Разобрать байты одной записи таблицы pictures.
pub fn decode_picture_row(rec: &[u8]) -> Result<PictureRow> {
    let id = LittleEndian::read_u32(slice(rec, OFF_ID, 4)?);
    let date = String::from_utf8_lossy(slice(rec, OFF_DATE, DATE_LEN)?).into_owned();
    let category = utf16le(slice(rec, OFF_CATEGORY, CATEGORY_LEN)?)
        .trim_end_matches(' ')
        .to_string();

    let ends = slice(rec, OFF_VAR_ENDS, 4)?;
    let filename_end = (LittleEndian::read_u16(&ends[0..2]) & VAR_OFFSET_MASK) as usize;
    let data_end = (LittleEndian::read_u16(&ends[2..4]) & VAR_OFFSET_MASK) as usize;

    let filename_len = filename_end.saturating_sub(OFF_FILENAME);
    let filename = utf16le(slice(rec, OFF_FILENAME, filename_len)?);

    let ptr_at = data_end.checked_sub(LOB_POINTER_LEN).ok_or(Error::Truncated {
        what: "pictures row data pointer",
        need: LOB_POINTER_LEN,
        have: data_end,
    })?;
    let p = slice(rec, ptr_at, LOB_POINTER_LEN)?;
    let data = LobPointer {
        page: LittleEndian::read_u32(&p[0..4]),
        file_id: LittleEndian::read_u16(&p[4..6]),
        slot: LittleEndian::read_u16(&p[6..8]),
    };

    Ok(PictureRow {
        id,
        date,
        category,
        filename,
        data,
    })
}
