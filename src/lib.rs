// Базовые модули
pub mod consts;
pub mod error;
pub mod config;

// Страницы и записи
pub mod page;   // src/page/{mod,common,header,slots}.rs
pub mod record; // src/record/{mod,lob,row}.rs
pub mod pager;  // src/pager.rs

// Восстановление
pub mod lob;    // src/lob/{mod,tree,assemble}.rs
pub mod scan;   // src/scan.rs

// Демонстрационная таблица (pictures)
pub mod schema;

// Удобные реэкспорты
pub use config::{CarveBuilder, CarveConfig};
pub use error::{Diagnostics, Error, ErrorKind, Result, Warning, WarningKind};
pub use lob::{
    assemble, assemble_into, extract_large, extract_lob, extract_small, walk_lob_tree, LeafRef,
    LobTree, LobTreeWalker,
};
pub use page::slots::{offset_of_slot, slot_offsets};
pub use page::{Page, PageHeader, RowRecord};
pub use pager::PageReader;
pub use scan::{scan_headers, scan_rows, RowScan};
