//! `Database`: the façade that ties the pager, WAL, and B-tree together into
//! the four CRUD operations plus an unordered-by-contract full scan.
//!
//! Grounded on `db_open`/`db_insert`/`db_get`/`db_update`/`db_delete`/
//! `db_select_all` from the original C engine: open attaches a WAL and
//! replays it before serving any request, and every mutation finds its
//! cursor with the same `table_find` descent the reads use.


use buffer::Pager;
use common::{Config, DbError, DbResult, LEAF_NODE_KEY_SIZE, LEAF_NODE_VALUE_SIZE};
use std::path::{Path, PathBuf};
use wal::Wal;

/// An open key-value database backed by a single file plus its WAL.
#[derive(Debug)]
pub struct Database {
    pager: Pager,
    path: PathBuf,
}

impl Database {
    /// Opens (or creates) the database file at `path` with default
    /// configuration (WAL attached). See [`Database::open_with_config`] to
    /// control that.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Self::open_with_config(path, &Config::default())
    }

    /// Opens (or creates) the database file at `path`. If
    /// `config.wal_enabled`, also attaches its WAL and replays any frames
    /// left over from a prior crash before serving requests. Ensures page 0
    /// is initialized as a leaf root.
    pub fn open_with_config(path: impl AsRef<Path>, config: &Config) -> DbResult<Self> {
        let path = path.as_ref().to_path_buf();
        log::info!("opening database at {}", path.display());

        let mut pager = Pager::open(&path)?;
        if config.wal_enabled {
            let wal = Wal::open(&path)?;
            pager.set_wal(Some(wal));
            pager.checkpoint_wal()?;
        }

        if pager.num_pages() == 0 {
            btree::init_root(&mut pager)?;
        }

        Ok(Self { pager, path })
    }

    /// Checkpoints the WAL, closes it, and flushes and closes the pager.
    pub fn close(mut self) -> DbResult<()> {
        log::info!("closing database at {}", self.path.display());
        self.pager.checkpoint_wal()?;
        if let Some(wal) = self.pager.take_wal() {
            wal.close()?;
        }
        self.pager.close()
    }

    /// Inserts `(key, value)`. Fails with `AlreadyExists` if `key` is
    /// already present, or `Validation` if either exceeds its fixed-width
    /// slot (127 bytes for a key, 255 for a value, leaving room for the
    /// trailing NUL).
    pub fn insert(&mut self, key: &str, value: &str) -> DbResult<()> {
        validate_key(key)?;
        validate_value(value)?;

        let cursor = btree::find_cursor(&mut self.pager, btree::ROOT_PAGE_NUM, key)?;
        if self.cell_key_equals(&cursor, key)? {
            return Err(DbError::AlreadyExists);
        }
        btree::leaf_insert(&mut self.pager, &cursor, key, value)
    }

    /// Looks up `key`, returning `NotFound` if absent.
    pub fn get(&mut self, key: &str) -> DbResult<String> {
        let cursor = btree::find_cursor(&mut self.pager, btree::ROOT_PAGE_NUM, key)?;
        if !self.cell_key_equals(&cursor, key)? {
            return Err(DbError::NotFound);
        }
        btree::cursor_value(&mut self.pager, &cursor)
    }

    /// Overwrites the value for `key` in place. `NotFound` if absent.
    pub fn update(&mut self, key: &str, value: &str) -> DbResult<()> {
        validate_value(value)?;
        let cursor = btree::find_cursor(&mut self.pager, btree::ROOT_PAGE_NUM, key)?;
        if !self.cell_key_equals(&cursor, key)? {
            return Err(DbError::NotFound);
        }
        btree::update_in_leaf(&mut self.pager, &cursor, value)
    }

    /// Removes `key`. `NotFound` if absent.
    pub fn delete(&mut self, key: &str) -> DbResult<()> {
        let cursor = btree::find_cursor(&mut self.pager, btree::ROOT_PAGE_NUM, key)?;
        if !self.cell_key_equals(&cursor, key)? {
            return Err(DbError::NotFound);
        }
        btree::delete_from_leaf(&mut self.pager, &cursor)
    }

    /// Invokes `f(key, value)` for every record reachable by repeated
    /// `advance_cursor` from `start_cursor`. Per the B-tree's single-leaf
    /// iteration limitation, this only visits the leaf `start_cursor` lands
    /// on — the leftmost leaf before any split, or the root's own
    /// misread cell count after one (see `btree::cursor`).
    pub fn select_all<F: FnMut(&str, &str)>(&mut self, mut f: F) -> DbResult<()> {
        let mut cursor = btree::start_cursor(&mut self.pager, btree::ROOT_PAGE_NUM)?;
        while !cursor.end_of_table {
            let page = self.pager.get_page(cursor.page_num)?;
            let key = btree::node::leaf_key(page, cursor.cell_num)?;
            let value = btree::node::leaf_value(page, cursor.cell_num)?;
            f(&key, &value);
            btree::advance_cursor(&mut self.pager, &mut cursor)?;
        }
        Ok(())
    }

    fn cell_key_equals(&mut self, cursor: &btree::Cursor, key: &str) -> DbResult<bool> {
        let page = self.pager.get_page(cursor.page_num)?;
        let num_cells = btree::node::leaf_num_cells(page)?;
        if cursor.cell_num >= num_cells {
            return Ok(false);
        }
        Ok(btree::node::leaf_key(page, cursor.cell_num)? == key)
    }
}

fn validate_key(key: &str) -> DbResult<()> {
    if key.len() >= LEAF_NODE_KEY_SIZE {
        return Err(DbError::Validation(format!(
            "key of {} bytes exceeds the {}-byte limit",
            key.len(),
            LEAF_NODE_KEY_SIZE - 1
        )));
    }
    Ok(())
}

fn validate_value(value: &str) -> DbResult<()> {
    if value.len() >= LEAF_NODE_VALUE_SIZE {
        return Err(DbError::Validation(format!(
            "value of {} bytes exceeds the {}-byte limit",
            value.len(),
            LEAF_NODE_VALUE_SIZE - 1
        )));
    }
    Ok(())
}
