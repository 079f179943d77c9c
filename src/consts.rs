//! Константы формата MDF: размер страницы, смещения, коды типов записей.

// -------- Pages --------
pub const PAGE_SIZE: usize = 8192;
pub const PAGE_HDR_SIZE: usize = 96;
/// Первая запись на странице всегда начинается сразу за заголовком.
pub const FIRST_RECORD_OFFSET: u16 = 96;
/// Размер одного элемента slot array (в конце страницы, в обратном порядке).
pub const SLOT_ENTRY_SIZE: usize = 2;

// Типы страниц (поле type заголовка)
pub const PAGE_TYPE_DATA: u8 = 1;
pub const PAGE_TYPE_TEXT_MIX: u8 = 3;
pub const PAGE_TYPE_TEXT_TREE: u8 = 4;

// -------- LOB records (type 3/4 pages) --------
// [status u8][unused u8][length u16][blob_id u64][type u16]
pub const LOB_REC_HDR_SIZE: usize = 14;
/// Запись с length == 14: "irregular" заглушка без payload; при обходе пропускается.
pub const IRREGULAR_RECORD_LEN: u16 = 14;

pub const LOB_TYPE_SMALL_ROOT: u16 = 0;
pub const LOB_TYPE_INTERNAL: u16 = 2;
pub const LOB_TYPE_DATA: u16 = 3;
pub const LOB_TYPE_LARGE_ROOT: u16 = 5;

// LARGE_ROOT: [maxlinks u16][curlinks u16][level u16][unused u32], затем curlinks * 12 байт
pub const LOB_ROOT_HDR_SIZE: usize = 10;
pub const LOB_ROOT_LINK_SIZE: usize = 12;

// INTERNAL: [maxlinks u16][curlinks u16][level u16], затем curlinks * 16 байт
pub const LOB_INTERNAL_HDR_SIZE: usize = 6;
pub const LOB_INTERNAL_LINK_SIZE: usize = 16;

/// Стандартный fan-out внутреннего узла для тела этого размера.
pub const STANDARD_INTERNAL_MAXLINKS: u16 = 501;

/// Единственный файл данных в однофайловой БД.
pub const PRIMARY_FILE_ID: u16 = 1;

// SMALL_ROOT: после заголовка записи [size u16][reserved 4], затем size байт
pub const SMALL_ROOT_SIZE_LEN: usize = 2;
pub const SMALL_ROOT_RESERVED_LEN: usize = 4;

// -------- Row records (type 1) --------
// [status u8][unused u8][offset_to_column_count u16]
pub const ROW_HDR_SIZE: usize = 4;
/// Старшие 3 бита смещения переменной колонки: флаги.
pub const VAR_OFFSET_MASK: u16 = 0x1fff;
