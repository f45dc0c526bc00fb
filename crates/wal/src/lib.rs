//! Write-ahead log: crash-safe, page-level durability.
//!
//! Every mutated page is appended to the WAL as a framed image before the
//! engine considers the mutation durable. On open, the engine checkpoints
//! the WAL into the database file before serving any request, replaying
//! whatever frames survived a previous crash.
//!
//! # Frame format
//!
//! ```text
//! +--------------------+--------------------+---------------------------+
//! | page_num (4 bytes) | checksum (4 bytes) | page image (PAGE_SIZE B)  |
//! +--------------------+--------------------+---------------------------+
//! ```
//!
//! The checksum is a wrapping byte-sum over the page image, not a
//! cryptographic hash — good enough to catch a torn write, no more.


use common::{DbError, DbResult, PageWriteback, PAGE_SIZE};
use std::{
    fs::{File, OpenOptions},
    io::{self, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

const PAGE_NUM_SIZE: usize = 4;
const CHECKSUM_SIZE: usize = 4;
const FRAME_HEADER_SIZE: usize = PAGE_NUM_SIZE + CHECKSUM_SIZE;

/// Write-ahead log for a single database file.
///
/// Owns `<db path>.wal`. Frames are appended in `log_page` and drained by
/// `checkpoint`; there is no in-memory frame index, matching the spec's
/// "frames discovered by sequential scan" design.
#[derive(Debug)]
pub struct Wal {
    path: PathBuf,
    file: File,
}

impl Wal {
    /// Opens (or creates) the WAL file for `db_path`, named `<db_path>.wal`.
    pub fn open(db_path: impl AsRef<Path>) -> DbResult<Self> {
        let path = wal_path(db_path.as_ref());
        let file = open_append(&path)?;
        Ok(Self { path, file })
    }

    /// Appends one frame: header then payload. A successful return is the
    /// durability point for this page's mutation.
    pub fn log_page(&mut self, page_num: u32, image: &[u8; PAGE_SIZE]) -> DbResult<()> {
        let checksum = checksum(image);
        self.file
            .write_all(&page_num.to_le_bytes())
            .map_err(|e| DbError::Wal(format!("failed to write frame header: {e}")))?;
        self.file
            .write_all(&checksum.to_le_bytes())
            .map_err(|e| DbError::Wal(format!("failed to write frame checksum: {e}")))?;
        self.file
            .write_all(image)
            .map_err(|e| DbError::Wal(format!("failed to write frame payload: {e}")))?;
        self.file
            .sync_data()
            .map_err(|e| DbError::Wal(format!("failed to sync wal: {e}")))?;
        Ok(())
    }

    /// Drains every durable frame into `pager`, skipping any frame whose
    /// checksum doesn't match (logged, not fatal), then truncates the log.
    ///
    /// Not incremental: always rescans from the start of the file.
    pub fn checkpoint<P: PageWriteback>(&mut self, pager: &mut P) -> DbResult<()> {
        self.file
            .seek(SeekFrom::Start(0))
            .map_err(|e| DbError::Wal(format!("failed to seek wal: {e}")))?;

        loop {
            let mut header = [0u8; FRAME_HEADER_SIZE];
            match self.file.read_exact(&mut header) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(DbError::Wal(format!("failed to read frame header: {e}"))),
            }
            let page_num = u32::from_le_bytes(header[..PAGE_NUM_SIZE].try_into().unwrap());
            let stored_checksum =
                u32::from_le_bytes(header[PAGE_NUM_SIZE..].try_into().unwrap());

            let mut payload = [0u8; PAGE_SIZE];
            match self.file.read_exact(&mut payload) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    log::warn!(
                        "wal: truncated frame for page {page_num}, stopping replay at this frame"
                    );
                    break;
                }
                Err(e) => return Err(DbError::Wal(format!("failed to read frame payload: {e}"))),
            }

            if checksum(&payload) != stored_checksum {
                log::warn!("wal: checksum mismatch for page {page_num}, skipping frame");
                continue;
            }

            pager.write_raw_page(page_num, &payload)?;
            pager.refresh_cached_page(page_num, &payload)?;
        }

        self.truncate()
    }

    /// Empties the log file in place, keeping the same path.
    fn truncate(&mut self) -> DbResult<()> {
        self.file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| DbError::Wal(format!("failed to truncate wal: {e}")))?;
        Ok(())
    }

    pub fn close(self) -> DbResult<()> {
        Ok(())
    }
}

fn wal_path(db_path: &Path) -> PathBuf {
    let mut os = db_path.as_os_str().to_owned();
    os.push(".wal");
    PathBuf::from(os)
}

fn open_append(path: &Path) -> DbResult<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| DbError::Wal(format!("failed to open wal file: {e}")))
}

/// Wrapping unsigned 32-bit sum over the payload bytes.
fn checksum(data: &[u8]) -> u32 {
    data.iter().fold(0u32, |acc, &b| acc.wrapping_add(b as u32))
}
