//! record/lob: LOB-записи (страницы типов 3/4): общий 14-байтовый заголовок,
//! заголовок/ссылки LARGE_ROOT и INTERNAL узлов.
//!
//! Layout (LE):
//!   header   [status u8][unused u8][length u16][blob_id u64][type u16]        14 B
//!   root     [maxlinks u16][curlinks u16][level u16][unused u32]              10 B
//!   root link     [size u32][page u32][file_id u16][slot u16]                 12 B
//!   internal [maxlinks u16][curlinks u16][level u16]                           6 B
//!   internal link [offset u32][unused u32][page u32][file_id u16][slot u16]   16 B

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use crate::consts::{
    LOB_INTERNAL_HDR_SIZE, LOB_INTERNAL_LINK_SIZE, LOB_REC_HDR_SIZE, LOB_ROOT_HDR_SIZE,
    LOB_ROOT_LINK_SIZE, LOB_TYPE_DATA, LOB_TYPE_INTERNAL, LOB_TYPE_LARGE_ROOT,
    LOB_TYPE_SMALL_ROOT,
};
use crate::error::{Error, Result};

#[inline]
fn need(what: &'static str, buf: &[u8], n: usize) -> Result<()> {
    if buf.len() < n {
        return Err(Error::Truncated {
            what,
            need: n,
            have: buf.len(),
        });
    }
    Ok(())
}

/// Имя типа LOB-записи для сообщений.
pub fn lob_type_name(t: u16) -> &'static str {
    match t {
        LOB_TYPE_SMALL_ROOT => "SMALL_ROOT",
        LOB_TYPE_INTERNAL => "INTERNAL",
        LOB_TYPE_DATA => "DATA",
        LOB_TYPE_LARGE_ROOT => "LARGE_ROOT",
        _ => "UNKNOWN",
    }
}

// ---------------- record header ----------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LobRecordHeader {
    pub status: u8,
    /// Полная длина записи, включая эти 14 байт.
    pub length: u16,
    pub blob_id: u64,
    pub rec_type: u16,
}

impl LobRecordHeader {
    pub fn decode(buf: &[u8]) -> Result<Self> {
        need("LOB record header", buf, LOB_REC_HDR_SIZE)?;
        Ok(Self {
            status: buf[0],
            length: LittleEndian::read_u16(&buf[2..4]),
            blob_id: LittleEndian::read_u64(&buf[4..12]),
            rec_type: LittleEndian::read_u16(&buf[12..14]),
        })
    }

    pub fn encode(&self, buf: &mut [u8]) -> Result<()> {
        need("LOB record header", buf, LOB_REC_HDR_SIZE)?;
        buf[0] = self.status;
        buf[1] = 0;
        LittleEndian::write_u16(&mut buf[2..4], self.length);
        LittleEndian::write_u64(&mut buf[4..12], self.blob_id);
        LittleEndian::write_u16(&mut buf[12..14], self.rec_type);
        Ok(())
    }

    /// Длина payload после заголовка (None, если length < 14).
    pub fn payload_len(&self) -> Option<usize> {
        (self.length as usize).checked_sub(LOB_REC_HDR_SIZE)
    }
}

// ---------------- LARGE_ROOT ----------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LobRootHeader {
    pub maxlinks: u16,
    pub curlinks: u16,
    pub level: u16,
    pub unused: u32,
}

impl LobRootHeader {
    pub fn decode(buf: &[u8]) -> Result<Self> {
        need("LARGE_ROOT header", buf, LOB_ROOT_HDR_SIZE)?;
        Ok(Self {
            maxlinks: LittleEndian::read_u16(&buf[0..2]),
            curlinks: LittleEndian::read_u16(&buf[2..4]),
            level: LittleEndian::read_u16(&buf[4..6]),
            unused: LittleEndian::read_u32(&buf[6..10]),
        })
    }

    pub fn encode(&self, buf: &mut [u8]) -> Result<()> {
        need("LARGE_ROOT header", buf, LOB_ROOT_HDR_SIZE)?;
        LittleEndian::write_u16(&mut buf[0..2], self.maxlinks);
        LittleEndian::write_u16(&mut buf[2..4], self.curlinks);
        LittleEndian::write_u16(&mut buf[4..6], self.level);
        LittleEndian::write_u32(&mut buf[6..10], self.unused);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LobRootLink {
    pub size: u32,
    pub page: u32,
    pub file_id: u16,
    pub slot: u16,
}

impl LobRootLink {
    pub fn decode(buf: &[u8]) -> Result<Self> {
        need("LARGE_ROOT link", buf, LOB_ROOT_LINK_SIZE)?;
        Ok(Self {
            size: LittleEndian::read_u32(&buf[0..4]),
            page: LittleEndian::read_u32(&buf[4..8]),
            file_id: LittleEndian::read_u16(&buf[8..10]),
            slot: LittleEndian::read_u16(&buf[10..12]),
        })
    }

    pub fn encode(&self, buf: &mut [u8]) -> Result<()> {
        need("LARGE_ROOT link", buf, LOB_ROOT_LINK_SIZE)?;
        LittleEndian::write_u32(&mut buf[0..4], self.size);
        LittleEndian::write_u32(&mut buf[4..8], self.page);
        LittleEndian::write_u16(&mut buf[8..10], self.file_id);
        LittleEndian::write_u16(&mut buf[10..12], self.slot);
        Ok(())
    }
}

// ---------------- INTERNAL ----------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LobInternalHeader {
    pub maxlinks: u16,
    pub curlinks: u16,
    /// 0: дети являются DATA-листьями, иначе другими INTERNAL узлами.
    pub level: u16,
}

impl LobInternalHeader {
    pub fn decode(buf: &[u8]) -> Result<Self> {
        need("INTERNAL header", buf, LOB_INTERNAL_HDR_SIZE)?;
        Ok(Self {
            maxlinks: LittleEndian::read_u16(&buf[0..2]),
            curlinks: LittleEndian::read_u16(&buf[2..4]),
            level: LittleEndian::read_u16(&buf[4..6]),
        })
    }

    pub fn encode(&self, buf: &mut [u8]) -> Result<()> {
        need("INTERNAL header", buf, LOB_INTERNAL_HDR_SIZE)?;
        LittleEndian::write_u16(&mut buf[0..2], self.maxlinks);
        LittleEndian::write_u16(&mut buf[2..4], self.curlinks);
        LittleEndian::write_u16(&mut buf[4..6], self.level);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LobInternalLink {
    /// Накопленное смещение в объекте до конца этого ребёнка.
    pub offset: u32,
    pub unused: u32,
    pub page: u32,
    pub file_id: u16,
    pub slot: u16,
}

impl LobInternalLink {
    pub fn decode(buf: &[u8]) -> Result<Self> {
        need("INTERNAL link", buf, LOB_INTERNAL_LINK_SIZE)?;
        Ok(Self {
            offset: LittleEndian::read_u32(&buf[0..4]),
            unused: LittleEndian::read_u32(&buf[4..8]),
            page: LittleEndian::read_u32(&buf[8..12]),
            file_id: LittleEndian::read_u16(&buf[12..14]),
            slot: LittleEndian::read_u16(&buf[14..16]),
        })
    }

    pub fn encode(&self, buf: &mut [u8]) -> Result<()> {
        need("INTERNAL link", buf, LOB_INTERNAL_LINK_SIZE)?;
        LittleEndian::write_u32(&mut buf[0..4], self.offset);
        LittleEndian::write_u32(&mut buf[4..8], self.unused);
        LittleEndian::write_u32(&mut buf[8..12], self.page);
        LittleEndian::write_u16(&mut buf[12..14], self.file_id);
        LittleEndian::write_u16(&mut buf[14..16], self.slot);
        Ok(())
    }
}
