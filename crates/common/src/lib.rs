#[cfg(test)]
mod tests;

use std::{io, path::PathBuf};
use thiserror::Error;

/// The fixed page size used throughout the on-disk format.
///
/// Pinned as a compile-time constant rather than a `Config` field: it is
/// part of the persisted file layout, not a runtime tuning knob.
pub const PAGE_SIZE: usize = 4096;

/// Upper bound on the number of pages the pager will cache.
pub const TABLE_MAX_PAGES: usize = 100;

pub const LEAF_NODE_KEY_SIZE: usize = 128;
pub const LEAF_NODE_VALUE_SIZE: usize = 256;

/// Canonical error type shared across the storage engine.
#[derive(Error, Debug)]
pub enum DbError {
    /// Over-length key/value or other input rejected before it reaches disk.
    #[error("validation: {0}")]
    Validation(String),
    /// `Insert` on a key that is already present.
    #[error("key already exists")]
    AlreadyExists,
    /// `Get`/`Update`/`Delete` on a key that is absent.
    #[error("key not found")]
    NotFound,
    /// An internal node would overflow and internal-node splitting is not
    /// implemented; the subtree cannot accept more separator keys.
    #[error("database full: internal node at capacity")]
    Full,
    /// Pager-level bounds violation or a corrupt file length.
    #[error("storage bounds: {0}")]
    Bounds(String),
    #[error("wal: {0}")]
    Wal(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result alias that carries a `DbError`.
pub type DbResult<T> = Result<T, DbError>;

/// The write side of a page cache, as seen by the WAL during checkpoint.
///
/// Exists to let `wal::Wal::checkpoint` write pages straight to the
/// database file and refresh any cached copy without `wal` depending on
/// `buffer` (which itself depends on `wal` to hold the durability
/// delegate). `buffer::Pager` is the only implementor.
pub trait PageWriteback {
    /// Writes `data` directly to the database file at `page_num * PAGE_SIZE`,
    /// bypassing the cache.
    fn write_raw_page(&mut self, page_num: u32, data: &[u8; PAGE_SIZE]) -> DbResult<()>;

    /// If `page_num` is cached, overwrites the cached image with `data` so
    /// readers observe the checkpointed value immediately.
    fn refresh_cached_page(&mut self, page_num: u32, data: &[u8; PAGE_SIZE]) -> DbResult<()>;
}

/// Runtime configuration for the storage engine.
///
/// `page_size` and the pager's page-table capacity are not exposed here:
/// both are frozen parts of the on-disk format (see [`PAGE_SIZE`] and
/// [`TABLE_MAX_PAGES`]).
///
/// # Example
/// ```
/// use common::Config;
/// use std::path::PathBuf;
///
/// let config = Config::builder()
///     .data_dir(PathBuf::from("./my_db"))
///     .wal_enabled(true)
///     .build();
/// ```
#[derive(Clone, Debug, bon::Builder)]
pub struct Config {
    /// Directory the demo CLI resolves relative database paths against.
    #[builder(default = PathBuf::from("./db_data"))]
    pub data_dir: PathBuf,
    /// Controls whether the write-ahead log is attached on open.
    #[builder(default = true)]
    pub wal_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./db_data"),
            wal_enabled: true,
        }
    }
}

/// Initializes the `env_logger` backend for the `log` facade.
///
/// Idempotent: safe to call from multiple integration test binaries in the
/// same process.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(cfg!(test)).try_init();
}

/// Convenient re-exports for downstream crates.
pub mod prelude {
    pub use crate::{Config, DbError, DbResult, LEAF_NODE_KEY_SIZE, LEAF_NODE_VALUE_SIZE,
        PAGE_SIZE, TABLE_MAX_PAGES};
}
