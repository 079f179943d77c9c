//! page: разбор страниц MDF.
//!
//! Разделение по подмодулям:
//! - common.rs: смещения полей 96-байтового заголовка.
//! - header.rs: PageHeader, read/write заголовка из/в буфер (bounds-checked).
//! - slots.rs : SlotDirectory, смещения слотов, обход записей, slot array, ghost-сверка.
//!
//! `Page`: неизменяемый снимок одной страницы (заголовок + 8192 байта). Все чтения
//! внутри страницы идут через `Page::bytes_at`, который не даёт выйти за её границы.

pub mod common;
pub mod header;
pub mod slots;

pub use header::{page_header_read, page_header_write, PageHeader};
pub use slots::{reconcile_slots, RowRecord};

use crate::consts::PAGE_SIZE;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct Page {
    pub page_id: u32,
    pub header: PageHeader,
    bytes: Vec<u8>,
}

impl Page {
    /// Разобрать страницу из буфера ровно PAGE_SIZE байт.
    pub fn from_bytes(page_id: u32, bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() != PAGE_SIZE {
            return Err(Error::Truncated {
                what: "page",
                need: PAGE_SIZE,
                have: bytes.len(),
            });
        }
        let header = page_header_read(&bytes)?;
        Ok(Self {
            page_id,
            header,
            bytes,
        })
    }

    /// Срез [off, off+len) внутри страницы; выход за границу: Structure.
    pub fn bytes_at(&self, off: usize, len: usize) -> Result<&[u8]> {
        match off.checked_add(len) {
            Some(end) if end <= self.bytes.len() => Ok(&self.bytes[off..end]),
            _ => Err(Error::structure(
                self.page_id,
                format!("range [{}, +{}) crosses page end", off, len),
            )),
        }
    }
}
