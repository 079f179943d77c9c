use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use crate::consts::{PAGE_HDR_SIZE, PAGE_TYPE_DATA};
use crate::error::{Error, Result};
use crate::page::common::*;

/// Заголовок страницы MDF (96 байт).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageHeader {
    pub header_ver: u8,
    pub page_type: u8,
    pub type_flag: u8,
    pub level: u8,
    pub flag: u16,
    pub index_id: i16,
    pub prev_page_id: u32,
    pub prev_file_id: u16,
    pub pminlen: u16,
    pub next_page_id: u32,
    pub next_file_id: u16,
    pub slot_cnt: u16,
    pub obj_id: u32,
    pub free_cnt: u16,
    pub free_data: u16,
    pub page_id: u32,
    pub file_id: u16,
    pub reserved_cnt: u16,
    pub lsn1: u32,
    pub lsn2: u32,
    pub lsn3: u16,
    pub xact_reserved: u16,
    pub xdes_id2: u32,
    pub xdes_id1: u16,
    pub ghost_rec_cnt: u16,
    #[serde(skip_serializing)]
    pub tail: [u8; TAIL_LEN],
}

impl Default for PageHeader {
    fn default() -> Self {
        Self {
            header_ver: 1,
            page_type: 0,
            type_flag: 0,
            level: 0,
            flag: 0,
            index_id: 0,
            prev_page_id: 0,
            prev_file_id: 0,
            pminlen: 0,
            next_page_id: 0,
            next_file_id: 0,
            slot_cnt: 0,
            obj_id: 0,
            free_cnt: 0,
            free_data: PAGE_HDR_SIZE as u16,
            page_id: 0,
            file_id: 1,
            reserved_cnt: 0,
            lsn1: 0,
            lsn2: 0,
            lsn3: 0,
            xact_reserved: 0,
            xdes_id2: 0,
            xdes_id1: 0,
            ghost_rec_cnt: 0,
            tail: [0u8; TAIL_LEN],
        }
    }
}

impl PageHeader {
    #[inline]
    pub fn is_data_page(&self) -> bool {
        self.page_type == PAGE_TYPE_DATA
    }
}

/// Прочитать заголовок страницы из буфера (нужно >= 96 байт).
pub fn page_header_read(buf: &[u8]) -> Result<PageHeader> {
    if buf.len() < PAGE_HDR_SIZE {
        return Err(Error::Truncated {
            what: "page header",
            need: PAGE_HDR_SIZE,
            have: buf.len(),
        });
    }
    let mut tail = [0u8; TAIL_LEN];
    tail.copy_from_slice(&buf[OFF_TAIL..OFF_TAIL + TAIL_LEN]);

    Ok(PageHeader {
        header_ver: buf[OFF_HEADER_VER],
        page_type: buf[OFF_TYPE],
        type_flag: buf[OFF_TYPE_FLAG],
        level: buf[OFF_LEVEL],
        flag: LittleEndian::read_u16(&buf[OFF_FLAG..OFF_FLAG + 2]),
        index_id: LittleEndian::read_i16(&buf[OFF_INDEX_ID..OFF_INDEX_ID + 2]),
        prev_page_id: LittleEndian::read_u32(&buf[OFF_PREV_PAGE_ID..OFF_PREV_PAGE_ID + 4]),
        prev_file_id: LittleEndian::read_u16(&buf[OFF_PREV_FILE_ID..OFF_PREV_FILE_ID + 2]),
        pminlen: LittleEndian::read_u16(&buf[OFF_PMINLEN..OFF_PMINLEN + 2]),
        next_page_id: LittleEndian::read_u32(&buf[OFF_NEXT_PAGE_ID..OFF_NEXT_PAGE_ID + 4]),
        next_file_id: LittleEndian::read_u16(&buf[OFF_NEXT_FILE_ID..OFF_NEXT_FILE_ID + 2]),
        slot_cnt: LittleEndian::read_u16(&buf[OFF_SLOT_CNT..OFF_SLOT_CNT + 2]),
        obj_id: LittleEndian::read_u32(&buf[OFF_OBJ_ID..OFF_OBJ_ID + 4]),
        free_cnt: LittleEndian::read_u16(&buf[OFF_FREE_CNT..OFF_FREE_CNT + 2]),
        free_data: LittleEndian::read_u16(&buf[OFF_FREE_DATA..OFF_FREE_DATA + 2]),
        page_id: LittleEndian::read_u32(&buf[OFF_PAGE_ID..OFF_PAGE_ID + 4]),
        file_id: LittleEndian::read_u16(&buf[OFF_FILE_ID..OFF_FILE_ID + 2]),
        reserved_cnt: LittleEndian::read_u16(&buf[OFF_RESERVED_CNT..OFF_RESERVED_CNT + 2]),
        lsn1: LittleEndian::read_u32(&buf[OFF_LSN1..OFF_LSN1 + 4]),
        lsn2: LittleEndian::read_u32(&buf[OFF_LSN2..OFF_LSN2 + 4]),
        lsn3: LittleEndian::read_u16(&buf[OFF_LSN3..OFF_LSN3 + 2]),
        xact_reserved: LittleEndian::read_u16(&buf[OFF_XACT_RESERVED..OFF_XACT_RESERVED + 2]),
        xdes_id2: LittleEndian::read_u32(&buf[OFF_XDES_ID2..OFF_XDES_ID2 + 4]),
        xdes_id1: LittleEndian::read_u16(&buf[OFF_XDES_ID1..OFF_XDES_ID1 + 2]),
        ghost_rec_cnt: LittleEndian::read_u16(&buf[OFF_GHOST_REC_CNT..OFF_GHOST_REC_CNT + 2]),
        tail,
    })
}

/// Записать заголовок страницы в буфер (синтетические образы, тесты).
pub fn page_header_write(buf: &mut [u8], h: &PageHeader) -> Result<()> {
    if buf.len() < PAGE_HDR_SIZE {
        return Err(Error::Truncated {
            what: "page header",
            need: PAGE_HDR_SIZE,
            have: buf.len(),
        });
    }
    buf[OFF_HEADER_VER] = h.header_ver;
    buf[OFF_TYPE] = h.page_type;
    buf[OFF_TYPE_FLAG] = h.type_flag;
    buf[OFF_LEVEL] = h.level;
    LittleEndian::write_u16(&mut buf[OFF_FLAG..OFF_FLAG + 2], h.flag);
    LittleEndian::write_i16(&mut buf[OFF_INDEX_ID..OFF_INDEX_ID + 2], h.index_id);
    LittleEndian::write_u32(&mut buf[OFF_PREV_PAGE_ID..OFF_PREV_PAGE_ID + 4], h.prev_page_id);
    LittleEndian::write_u16(&mut buf[OFF_PREV_FILE_ID..OFF_PREV_FILE_ID + 2], h.prev_file_id);
    LittleEndian::write_u16(&mut buf[OFF_PMINLEN..OFF_PMINLEN + 2], h.pminlen);
    LittleEndian::write_u32(&mut buf[OFF_NEXT_PAGE_ID..OFF_NEXT_PAGE_ID + 4], h.next_page_id);
    LittleEndian::write_u16(&mut buf[OFF_NEXT_FILE_ID..OFF_NEXT_FILE_ID + 2], h.next_file_id);
    LittleEndian::write_u16(&mut buf[OFF_SLOT_CNT..OFF_SLOT_CNT + 2], h.slot_cnt);
    LittleEndian::write_u32(&mut buf[OFF_OBJ_ID..OFF_OBJ_ID + 4], h.obj_id);
    LittleEndian::write_u16(&mut buf[OFF_FREE_CNT..OFF_FREE_CNT + 2], h.free_cnt);
    LittleEndian::write_u16(&mut buf[OFF_FREE_DATA..OFF_FREE_DATA + 2], h.free_data);
    LittleEndian::write_u32(&mut buf[OFF_PAGE_ID..OFF_PAGE_ID + 4], h.page_id);
    LittleEndian::write_u16(&mut buf[OFF_FILE_ID..OFF_FILE_ID + 2], h.file_id);
    LittleEndian::write_u16(&mut buf[OFF_RESERVED_CNT..OFF_RESERVED_CNT + 2], h.reserved_cnt);
    LittleEndian::write_u32(&mut buf[OFF_LSN1..OFF_LSN1 + 4], h.lsn1);
    LittleEndian::write_u32(&mut buf[OFF_LSN2..OFF_LSN2 + 4], h.lsn2);
    LittleEndian::write_u16(&mut buf[OFF_LSN3..OFF_LSN3 + 2], h.lsn3);
    LittleEndian::write_u16(&mut buf[OFF_XACT_RESERVED..OFF_XACT_RESERVED + 2], h.xact_reserved);
    LittleEndian::write_u32(&mut buf[OFF_XDES_ID2..OFF_XDES_ID2 + 4], h.xdes_id2);
    LittleEndian::write_u16(&mut buf[OFF_XDES_ID1..OFF_XDES_ID1 + 2], h.xdes_id1);
    LittleEndian::write_u16(&mut buf[OFF_GHOST_REC_CNT..OFF_GHOST_REC_CNT + 2], h.ghost_rec_cnt);
    buf[OFF_TAIL..OFF_TAIL + TAIL_LEN].copy_from_slice(&h.tail);
    Ok(())
}
