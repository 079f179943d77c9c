//! record: декодеры заголовков записей внутри страницы.
//!
//! - lob.rs: LOB-записи (14-байтовый заголовок, LARGE_ROOT/INTERNAL узлы и их ссылки).
//! - row.rs: строки данных (type 1): заголовок и массив смещений переменных колонок.

pub mod lob;
pub mod row;

pub use lob::{
    lob_type_name, LobInternalHeader, LobInternalLink, LobRecordHeader, LobRootHeader, LobRootLink,
};
pub use row::{row_record_len, RowLayout, RowRecordHeader};
