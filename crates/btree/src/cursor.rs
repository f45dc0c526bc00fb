//! Cursor: a (page, cell) position plus an end-of-table flag.
//!
//! A cursor holds no reference to the pager. It is cheap to copy and is
//! revalidated against the page it names on every access, the same way the
//! original implementation re-fetches the page from the pager instead of
//! caching a pointer into it.

use crate::node;
use buffer::Pager;
use common::DbResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    pub page_num: u32,
    pub cell_num: u32,
    pub end_of_table: bool,
}

/// A cursor positioned at cell 0 of `root_page_num`.
///
/// Reads the root page's cell count as if it were always a leaf. If the
/// root has become an internal node (after a split) this reads its key
/// count instead, since both fields sit at the same offset — a limitation
/// inherited on purpose, not a bug: see `start_cursor` in DESIGN.md.
pub fn start_cursor(pager: &mut Pager, root_page_num: u32) -> DbResult<Cursor> {
    let root = pager.get_page(root_page_num)?;
    let num_cells = node::leaf_num_cells(root)?;
    Ok(Cursor {
        page_num: root_page_num,
        cell_num: 0,
        end_of_table: num_cells == 0,
    })
}

/// Descends from `root_page_num` to the leaf cell where `key` belongs,
/// whether or not it is actually present there.
pub fn find_cursor(pager: &mut Pager, root_page_num: u32, key: &str) -> DbResult<Cursor> {
    let root = pager.get_page(root_page_num)?;
    match node::node_type(root)? {
        node::NodeType::Leaf => leaf_find(pager, root_page_num, key),
        node::NodeType::Internal => {
            let num_keys = node::internal_num_keys(root)?;
            let mut min_index = 0u32;
            let mut max_index = num_keys;
            while min_index != max_index {
                let index = min_index + (max_index - min_index) / 2;
                let key_at_index = node::internal_key(root, index)?;
                if key >= key_at_index.as_str() {
                    min_index = index + 1;
                } else {
                    max_index = index;
                }
            }
            let child_page_num = node::internal_child(root, min_index)?;
            find_cursor(pager, child_page_num, key)
        }
    }
}

fn leaf_find(pager: &mut Pager, page_num: u32, key: &str) -> DbResult<Cursor> {
    let page = pager.get_page(page_num)?;
    let num_cells = node::leaf_num_cells(page)?;

    let mut min_index = 0u32;
    let mut max_index = num_cells;
    while min_index != max_index {
        let index = min_index + (max_index - min_index) / 2;
        let key_at_index = node::leaf_key(page, index)?;
        match key.cmp(key_at_index.as_str()) {
            std::cmp::Ordering::Equal => {
                return Ok(Cursor {
                    page_num,
                    cell_num: index,
                    end_of_table: false,
                })
            }
            std::cmp::Ordering::Less => max_index = index,
            std::cmp::Ordering::Greater => min_index = index + 1,
        }
    }

    Ok(Cursor {
        page_num,
        cell_num: min_index,
        end_of_table: false,
    })
}

/// The value stored at the cursor's current cell.
pub fn cursor_value(pager: &mut Pager, cursor: &Cursor) -> DbResult<String> {
    let page = pager.get_page(cursor.page_num)?;
    node::leaf_value(page, cursor.cell_num)
}

/// Moves to the next cell in the current leaf, setting `end_of_table` at
/// its last cell. Never follows a sibling leaf: see the module doc on
/// [`crate`] for why that is a deliberate limitation, not an oversight.
pub fn advance_cursor(pager: &mut Pager, cursor: &mut Cursor) -> DbResult<()> {
    let page = pager.get_page(cursor.page_num)?;
    let num_cells = node::leaf_num_cells(page)?;
    cursor.cell_num += 1;
    if cursor.cell_num >= num_cells {
        cursor.end_of_table = true;
    }
    Ok(())
}
