//! pager: произвольный доступ к страницам MDF поверх любого `Read + Seek`.
//!
//! Каждое чтение делает seek на абсолютное смещение: позиция курсора между
//! вызовами не гарантируется и не используется. Страницы не кэшируются.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use log::debug;

use crate::consts::{PAGE_HDR_SIZE, PAGE_SIZE};
use crate::error::Result;
use crate::page::{page_header_read, Page, PageHeader};

pub struct PageReader<R> {
    inner: R,
    len: u64,
}

impl PageReader<File> {
    /// Открыть MDF только на чтение.
    pub fn open(path: &Path) -> Result<Self> {
        let f = OpenOptions::new().read(true).open(path)?;
        Self::new(f)
    }
}

impl<R: Read + Seek> PageReader<R> {
    pub fn new(mut inner: R) -> Result<Self> {
        let len = inner.seek(SeekFrom::End(0))?;
        Ok(Self { inner, len })
    }

    /// Размер источника в байтах.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Число полных страниц.
    pub fn page_count(&self) -> u64 {
        self.len / PAGE_SIZE as u64
    }

    #[inline]
    pub fn page_offset(page_id: u32) -> u64 {
        page_id as u64 * PAGE_SIZE as u64
    }

    /// Прочитать ровно 96 байт заголовка страницы page_id.
    pub fn read_page_header(&mut self, page_id: u32) -> Result<PageHeader> {
        let mut buf = [0u8; PAGE_HDR_SIZE];
        self.inner.seek(SeekFrom::Start(Self::page_offset(page_id)))?;
        self.inner.read_exact(&mut buf)?;
        page_header_read(&buf)
    }

    /// Прочитать страницу целиком.
    pub fn read_page(&mut self, page_id: u32) -> Result<Page> {
        let mut buf = vec![0u8; PAGE_SIZE];
        self.inner.seek(SeekFrom::Start(Self::page_offset(page_id)))?;
        self.inner.read_exact(&mut buf)?;
        let page = Page::from_bytes(page_id, buf)?;
        debug!(
            "read_page: pid={} type={} slotCnt={} freeData={}",
            page_id, page.header.page_type, page.header.slot_cnt, page.header.free_data
        );
        Ok(page)
    }
}
