//! page/common: смещения полей 96-байтового заголовка страницы (little-endian, packed).

pub const OFF_HEADER_VER: usize = 0; // u8
pub const OFF_TYPE: usize = 1; // u8
pub const OFF_TYPE_FLAG: usize = 2; // u8
pub const OFF_LEVEL: usize = 3; // u8
pub const OFF_FLAG: usize = 4; // u16
pub const OFF_INDEX_ID: usize = 6; // i16
pub const OFF_PREV_PAGE_ID: usize = 8; // u32
pub const OFF_PREV_FILE_ID: usize = 12; // u16
pub const OFF_PMINLEN: usize = 14; // u16
pub const OFF_NEXT_PAGE_ID: usize = 16; // u32
pub const OFF_NEXT_FILE_ID: usize = 20; // u16
pub const OFF_SLOT_CNT: usize = 22; // u16
pub const OFF_OBJ_ID: usize = 24; // u32
pub const OFF_FREE_CNT: usize = 28; // u16
pub const OFF_FREE_DATA: usize = 30; // u16
pub const OFF_PAGE_ID: usize = 32; // u32
pub const OFF_FILE_ID: usize = 36; // u16
pub const OFF_RESERVED_CNT: usize = 38; // u16
pub const OFF_LSN1: usize = 40; // u32
pub const OFF_LSN2: usize = 44; // u32
pub const OFF_LSN3: usize = 48; // u16
pub const OFF_XACT_RESERVED: usize = 50; // u16
pub const OFF_XDES_ID2: usize = 52; // u32
pub const OFF_XDES_ID1: usize = 56; // u16
pub const OFF_GHOST_REC_CNT: usize = 58; // u16
/// Неразобранный хвост заголовка [60..96).
pub const OFF_TAIL: usize = 60;
pub const TAIL_LEN: usize = 36;
