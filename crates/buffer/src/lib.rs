//! Pager: page cache and durability routing.
//!
//! Translates page numbers to in-memory page images, loading missing pages
//! from the database file on demand, and routes mutated pages either
//! through an attached [`Wal`] or directly to the file when none is
//! attached.
//!
//! # Cache policy
//!
//! Unlike a typical buffer pool, this cache has no eviction: it is a fixed
//! [`common::TABLE_MAX_PAGES`]-entry, direct-mapped table indexed by page
//! number. A request for a page beyond that ceiling fails rather than
//! evicting something else. This is an intentional simplification carried
//! over from the original design, not an oversight — see `DESIGN.md`.

#[cfg(test)]
mod tests;

use common::{DbError, DbResult, PageWriteback, PAGE_SIZE, TABLE_MAX_PAGES};
use std::{
    fs::{File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::Path,
};
use storage::Page;
use wal::Wal;

/// Owns the database file, its page cache, and an optional WAL delegate.
#[derive(Debug)]
pub struct Pager {
    file: File,
    file_length: u64,
    num_pages: u32,
    pages: Vec<Option<Page>>,
    wal: Option<Wal>,
}

impl Pager {
    /// Opens (creating if needed) the database file at `path`.
    ///
    /// Fails if the file's length is not a whole multiple of `PAGE_SIZE`
    /// (a non-empty file that violates this is treated as corrupt).
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        let file_length = file.metadata()?.len();
        if file_length % PAGE_SIZE as u64 != 0 {
            return Err(DbError::Bounds(format!(
                "db file length {file_length} is not a whole number of {PAGE_SIZE}-byte pages"
            )));
        }
        let num_pages = (file_length / PAGE_SIZE as u64) as u32;

        Ok(Self {
            file,
            file_length,
            num_pages,
            pages: vec![None; TABLE_MAX_PAGES],
            wal: None,
        })
    }

    /// Number of pages allocated so far (monotonically non-decreasing).
    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    /// Installs (or detaches, with `None`) the durability delegate.
    pub fn set_wal(&mut self, wal: Option<Wal>) {
        self.wal = wal;
    }

    /// Detaches and returns the durability delegate, if any.
    pub fn take_wal(&mut self) -> Option<Wal> {
        self.wal.take()
    }

    /// Runs the attached WAL's checkpoint against this pager. A no-op if no
    /// WAL is attached.
    ///
    /// Takes the WAL out of `self` for the duration of the call: `checkpoint`
    /// needs `&mut Wal` and `&mut Pager` (as its `PageWriteback` delegate) at
    /// once, and the WAL lives inside this struct.
    pub fn checkpoint_wal(&mut self) -> DbResult<()> {
        let Some(mut wal) = self.wal.take() else {
            return Ok(());
        };
        let result = wal.checkpoint(self);
        self.wal = Some(wal);
        result
    }

    /// Returns the cached image for page `n`, loading it from disk first if
    /// necessary. The returned page is zero-initialized if `n` lies beyond
    /// the current file length.
    pub fn get_page(&mut self, n: u32) -> DbResult<&mut Page> {
        let idx = Self::check_bounds(n)?;

        if self.pages[idx].is_none() {
            let mut file_pages = self.file_length / PAGE_SIZE as u64;
            if self.file_length % PAGE_SIZE as u64 != 0 {
                file_pages += 1;
            }

            let page = if (n as u64) < file_pages {
                let mut buf = [0u8; PAGE_SIZE];
                self.file.seek(SeekFrom::Start(n as u64 * PAGE_SIZE as u64))?;
                self.file.read_exact(&mut buf)?;
                Page::from_bytes(n, buf)
            } else {
                Page::new(n)
            };

            if n >= self.num_pages {
                self.num_pages = n + 1;
            }
            self.pages[idx] = Some(page);
        }

        Ok(self.pages[idx].as_mut().expect("just inserted"))
    }

    /// Routes the cached image for page `n` to the WAL if attached, or
    /// writes it straight to the database file otherwise. Flushing a page
    /// that was never loaded into the cache is an error.
    pub fn flush_page(&mut self, n: u32) -> DbResult<()> {
        let idx = Self::check_bounds(n)?;
        let page = self.pages[idx]
            .as_ref()
            .ok_or_else(|| DbError::Bounds(format!("tried to flush uncached page {n}")))?;

        if let Some(wal) = self.wal.as_mut() {
            wal.log_page(n, page.as_bytes())?;
        } else {
            self.file.seek(SeekFrom::Start(n as u64 * PAGE_SIZE as u64))?;
            self.file.write_all(page.as_bytes())?;
            self.file_length = self.file_length.max((n as u64 + 1) * PAGE_SIZE as u64);
        }
        Ok(())
    }

    /// Flushes every cached page and closes the underlying file.
    pub fn close(mut self) -> DbResult<()> {
        for n in 0..TABLE_MAX_PAGES as u32 {
            if self.pages[n as usize].is_some() {
                self.flush_page(n)?;
            }
        }
        Ok(())
    }

    fn check_bounds(n: u32) -> DbResult<usize> {
        if n as usize >= TABLE_MAX_PAGES {
            return Err(DbError::Bounds(format!(
                "tried to fetch page {n} >= TABLE_MAX_PAGES {TABLE_MAX_PAGES}"
            )));
        }
        Ok(n as usize)
    }
}

impl PageWriteback for Pager {
    fn write_raw_page(&mut self, page_num: u32, data: &[u8; PAGE_SIZE]) -> DbResult<()> {
        self.file
            .seek(SeekFrom::Start(page_num as u64 * PAGE_SIZE as u64))?;
        self.file.write_all(data)?;
        self.file_length = self.file_length.max((page_num as u64 + 1) * PAGE_SIZE as u64);
        Ok(())
    }

    fn refresh_cached_page(&mut self, page_num: u32, data: &[u8; PAGE_SIZE]) -> DbResult<()> {
        if (page_num as usize) < TABLE_MAX_PAGES {
            if let Some(page) = self.pages[page_num as usize].as_mut() {
                page.as_bytes_mut().copy_from_slice(data);
            }
        }
        Ok(())
    }
}
