//! The fixed-size page: the unit of I/O and caching for the whole engine.
//!
//! `Page` is deliberately dumb — a byte array plus bounds-checked typed
//! accessors. It has no notion of B-tree nodes, cells, or headers; `btree`
//! is the single source of truth for how those bytes are interpreted. This
//! mirrors the design note in the spec about keeping page-layout knowledge
//! in one place instead of scattering pointer arithmetic across the crate.


pub use common::PAGE_SIZE;
use common::{DbError, DbResult};

/// One `PAGE_SIZE`-byte block, tagged with the page number it was read from
/// (or allocated at).
#[derive(Debug, Clone)]
pub struct Page {
    pub id: u32,
    data: Box<[u8; PAGE_SIZE]>,
}

impl Page {
    /// A freshly zeroed page.
    pub fn new(id: u32) -> Self {
        Self {
            id,
            data: Box::new([0u8; PAGE_SIZE]),
        }
    }

    /// Wraps an existing `PAGE_SIZE` buffer, e.g. one just read from disk.
    pub fn from_bytes(id: u32, data: [u8; PAGE_SIZE]) -> Self {
        Self {
            id,
            data: Box::new(data),
        }
    }

    pub fn as_bytes(&self) -> &[u8; PAGE_SIZE] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8; PAGE_SIZE] {
        &mut self.data
    }

    fn check_range(offset: usize, len: usize) -> DbResult<()> {
        if offset + len > PAGE_SIZE {
            return Err(DbError::Bounds(format!(
                "page access out of range: offset {offset} len {len} exceeds page size {PAGE_SIZE}"
            )));
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> DbResult<u8> {
        Self::check_range(offset, 1)?;
        Ok(self.data[offset])
    }

    pub fn write_u8(&mut self, offset: usize, value: u8) -> DbResult<()> {
        Self::check_range(offset, 1)?;
        self.data[offset] = value;
        Ok(())
    }

    pub fn read_u32(&self, offset: usize) -> DbResult<u32> {
        Self::check_range(offset, 4)?;
        let bytes: [u8; 4] = self.data[offset..offset + 4]
            .try_into()
            .expect("range checked above");
        Ok(u32::from_le_bytes(bytes))
    }

    pub fn write_u32(&mut self, offset: usize, value: u32) -> DbResult<()> {
        Self::check_range(offset, 4)?;
        self.data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn read_bytes(&self, offset: usize, len: usize) -> DbResult<&[u8]> {
        Self::check_range(offset, len)?;
        Ok(&self.data[offset..offset + len])
    }

    pub fn write_bytes(&mut self, offset: usize, bytes: &[u8]) -> DbResult<()> {
        Self::check_range(offset, bytes.len())?;
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Copies `len` bytes from `src_offset` to `dst_offset` within the same
    /// page. Used by the B-tree to shift cells during insert/delete.
    pub fn copy_within(&mut self, src_offset: usize, dst_offset: usize, len: usize) -> DbResult<()> {
        Self::check_range(src_offset, len)?;
        Self::check_range(dst_offset, len)?;
        self.data.copy_within(src_offset..src_offset + len, dst_offset);
        Ok(())
    }
}

/// Writes a NUL-terminated, fixed-width string into `buf`, truncating to
/// `buf.len() - 1` bytes if necessary (spec.md §4.3 "Truncation").
pub fn write_fixed_str(buf: &mut [u8], s: &str) {
    let max = buf.len() - 1;
    let bytes = s.as_bytes();
    let n = bytes.len().min(max);
    buf[..n].copy_from_slice(&bytes[..n]);
    buf[n] = 0;
    for b in &mut buf[n + 1..] {
        *b = 0;
    }
}

/// Reads a NUL-terminated string out of a fixed-width slot.
pub fn read_fixed_str(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}
