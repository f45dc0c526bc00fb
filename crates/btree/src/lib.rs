//! Fixed-layout, single-file B-tree: the on-disk index structure backing
//! the key-value store.
//!
//! Every page is either a leaf (holding sorted key/value cells directly) or
//! an internal node (holding separator keys and child page numbers). There
//! is no payload overflow and no sibling-leaf chaining; see the module docs
//! on [`cursor`] for what that means for iteration.
//!
//! Internal-node splitting is **not implemented**. A tree deep enough to
//! fill an internal node's cell budget returns [`common::DbError::Full`]
//! instead of growing further — a limitation carried over on purpose, not
//! an oversight. See `DESIGN.md`.

pub mod cursor;
pub mod layout;
pub mod node;

pub use cursor::{advance_cursor, cursor_value, find_cursor, start_cursor, Cursor};
pub use layout::NodeType;

#[cfg(test)]
mod tests;

use buffer::Pager;
use common::{DbError, DbResult};
use layout::{INTERNAL_NODE_MAX_CELLS, LEAF_NODE_MAX_CELLS};

/// Root page number. The root is always page 0, fixed for the life of the
/// database file.
pub const ROOT_PAGE_NUM: u32 = 0;

/// Initializes an empty database file: page 0 becomes a leaf root.
pub fn init_root(pager: &mut Pager) -> DbResult<()> {
    let root = pager.get_page(ROOT_PAGE_NUM)?;
    node::leaf_node_init(root)?;
    node::set_is_root(root, true)?;
    pager.flush_page(ROOT_PAGE_NUM)
}

/// Inserts `(key, value)` at the cursor's position, splitting the leaf
/// first if it is already at capacity.
pub fn leaf_insert(pager: &mut Pager, cursor: &Cursor, key: &str, value: &str) -> DbResult<()> {
    let page = pager.get_page(cursor.page_num)?;
    let num_cells = node::leaf_num_cells(page)?;

    if num_cells as usize >= LEAF_NODE_MAX_CELLS {
        return leaf_split_and_insert(pager, cursor, key, value);
    }

    if cursor.cell_num < num_cells {
        let mut i = num_cells;
        while i > cursor.cell_num {
            node::copy_leaf_cell(page, i, i - 1)?;
            i -= 1;
        }
    }

    node::set_leaf_num_cells(page, num_cells + 1)?;
    node::set_leaf_key(page, cursor.cell_num, key)?;
    node::set_leaf_value(page, cursor.cell_num, value)?;
    pager.flush_page(cursor.page_num)
}

/// Splits a full leaf into two and inserts the new cell into whichever
/// half it belongs. Handles both the root-leaf case (a brand new internal
/// root is created) and the non-root case (the new right sibling is
/// registered with the existing parent).
fn leaf_split_and_insert(pager: &mut Pager, cursor: &Cursor, key: &str, value: &str) -> DbResult<()> {
    let old_page = pager.get_page(cursor.page_num)?;
    let was_root = node::is_root(old_page)?;

    if was_root {
        let right_child_page_num = pager.num_pages() + 1;
        create_new_root(pager, right_child_page_num)?;

        let root = pager.get_page(ROOT_PAGE_NUM)?;
        let left_child_page_num = node::internal_child(root, 0)?;
        let right_child_page_num = node::internal_right_child(root)?;

        // Root is always page 0; both new children report it as parent.
        let left_child = pager.get_page(left_child_page_num)?;
        node::set_parent_page_num(left_child, ROOT_PAGE_NUM)?;

        split_leaf_cells(pager, left_child_page_num, right_child_page_num)?;

        let right_child = pager.get_page(right_child_page_num)?;
        let right_first_key = node::leaf_key(right_child, 0)?;
        let root = pager.get_page(ROOT_PAGE_NUM)?;
        node::set_internal_key(root, 0, &right_first_key)?;
        pager.flush_page(ROOT_PAGE_NUM)?;

        let target_page_num = if key < right_first_key.as_str() {
            left_child_page_num
        } else {
            right_child_page_num
        };
        let retry_cursor = find_cursor(pager, target_page_num, key)?;
        return leaf_insert(pager, &retry_cursor, key, value);
    }

    let right_child_page_num = pager.num_pages();
    pager.get_page(right_child_page_num)?;
    split_leaf_cells(pager, cursor.page_num, right_child_page_num)?;

    let left_page = pager.get_page(cursor.page_num)?;
    let parent_page_num = node::parent_page_num(left_page)?;

    let right_child = pager.get_page(right_child_page_num)?;
    let right_first_key = node::leaf_key(right_child, 0)?;

    internal_insert(pager, parent_page_num, right_child_page_num, &right_first_key)?;

    let target_page_num = if key < right_first_key.as_str() {
        cursor.page_num
    } else {
        right_child_page_num
    };
    let retry_cursor = find_cursor(pager, target_page_num, key)?;
    leaf_insert(pager, &retry_cursor, key, value)
}

/// Moves the upper half of `left_page_num`'s cells into a freshly
/// initialized `right_page_num`, leaving both leaves with the same parent.
fn split_leaf_cells(pager: &mut Pager, left_page_num: u32, right_page_num: u32) -> DbResult<()> {
    let left_parent = {
        let left = pager.get_page(left_page_num)?;
        node::parent_page_num(left)?
    };

    let num_cells = {
        let left = pager.get_page(left_page_num)?;
        node::leaf_num_cells(left)?
    };
    let split_index = (num_cells + 1) / 2;

    let right = pager.get_page(right_page_num)?;
    node::leaf_node_init(right)?;

    for i in split_index..num_cells {
        let left = pager.get_page(left_page_num)?;
        let key = node::leaf_key(left, i)?;
        let value = node::leaf_value(left, i)?;
        let right = pager.get_page(right_page_num)?;
        let dest = i - split_index;
        node::set_leaf_key(right, dest, &key)?;
        node::set_leaf_value(right, dest, &value)?;
    }

    let right = pager.get_page(right_page_num)?;
    node::set_leaf_num_cells(right, num_cells - split_index)?;
    node::set_parent_page_num(right, left_parent)?;
    pager.flush_page(right_page_num)?;

    let left = pager.get_page(left_page_num)?;
    node::set_leaf_num_cells(left, split_index)?;
    pager.flush_page(left_page_num)
}

/// Replaces a full leaf root with a fresh internal root: the old root's
/// bytes move to a new left-child page, `right_child_page_num` becomes the
/// right child, and page 0 is reinitialized as the internal root over both.
fn create_new_root(pager: &mut Pager, right_child_page_num: u32) -> DbResult<()> {
    let left_child_page_num = pager.num_pages();

    let old_root_bytes = *pager.get_page(ROOT_PAGE_NUM)?.as_bytes();
    let left_child = pager.get_page(left_child_page_num)?;
    *left_child.as_bytes_mut() = old_root_bytes;
    node::set_is_root(left_child, false)?;
    pager.flush_page(left_child_page_num)?;

    pager.get_page(right_child_page_num)?;

    let root = pager.get_page(ROOT_PAGE_NUM)?;
    node::internal_node_init(root)?;
    node::set_is_root(root, true)?;
    node::set_internal_num_keys(root, 1)?;
    node::set_internal_right_child(root, right_child_page_num)?;
    node::set_internal_cell_child(root, 0, left_child_page_num)?;
    pager.flush_page(ROOT_PAGE_NUM)
}

/// Registers `key` (the smallest key of `child_page_num`) as a new
/// separator in `parent_page_num`'s internal node.
///
/// Internal-node splitting is out of scope: a parent already at
/// `INTERNAL_NODE_MAX_CELLS` returns [`DbError::Full`] instead of growing.
pub fn internal_insert(
    pager: &mut Pager,
    parent_page_num: u32,
    child_page_num: u32,
    key: &str,
) -> DbResult<()> {
    let parent = pager.get_page(parent_page_num)?;
    let num_keys = node::internal_num_keys(parent)?;

    if num_keys as usize >= INTERNAL_NODE_MAX_CELLS {
        log::warn!(
            "internal node {parent_page_num} is at capacity ({INTERNAL_NODE_MAX_CELLS} keys); splitting internal nodes is not supported"
        );
        return Err(DbError::Full);
    }

    let right_child_page_num = node::internal_right_child(parent)?;

    let mut index = 0u32;
    while index < num_keys {
        let key_at_index = node::internal_key(parent, index)?;
        if key < key_at_index.as_str() {
            break;
        }
        index += 1;
    }

    if index == num_keys {
        node::set_internal_cell_child(parent, num_keys, right_child_page_num)?;
        node::set_internal_key(parent, num_keys, key)?;
        node::set_internal_right_child(parent, child_page_num)?;
    } else {
        let mut i = num_keys;
        while i > index {
            node::copy_internal_cell(parent, i, i - 1)?;
            i -= 1;
        }
        node::set_internal_cell_child(parent, index + 1, child_page_num)?;
        node::set_internal_key(parent, index, key)?;
    }

    node::set_internal_num_keys(parent, num_keys + 1)?;
    pager.flush_page(parent_page_num)
}

/// Removes the cell at the cursor's position, shifting later cells left.
/// Fails with [`DbError::NotFound`] if the cursor does not name an actual
/// cell (empty leaf, or a find-cursor past the end).
pub fn delete_from_leaf(pager: &mut Pager, cursor: &Cursor) -> DbResult<()> {
    let page = pager.get_page(cursor.page_num)?;
    if node::node_type(page)? != NodeType::Leaf {
        return Err(DbError::Validation(
            "delete cursor does not name a leaf page".to_string(),
        ));
    }
    let num_cells = node::leaf_num_cells(page)?;
    if cursor.cell_num >= num_cells {
        return Err(DbError::NotFound);
    }

    let mut i = cursor.cell_num;
    while i < num_cells - 1 {
        node::copy_leaf_cell(page, i, i + 1)?;
        i += 1;
    }
    node::set_leaf_num_cells(page, num_cells - 1)?;
    pager.flush_page(cursor.page_num)
}

/// Overwrites the value at the cursor's position in place.
pub fn update_in_leaf(pager: &mut Pager, cursor: &Cursor, value: &str) -> DbResult<()> {
    let page = pager.get_page(cursor.page_num)?;
    let num_cells = node::leaf_num_cells(page)?;
    if cursor.cell_num >= num_cells {
        return Err(DbError::NotFound);
    }
    node::set_leaf_value(page, cursor.cell_num, value)?;
    pager.flush_page(cursor.page_num)
}

/// Dumps the tree shape to the debug log: one line per node with its size,
/// one line per key, indented by depth. Diagnostic only.
pub fn print_tree(pager: &mut Pager, page_num: u32, indent: u32) -> DbResult<()> {
    let pad = "  ".repeat(indent as usize);
    let page = pager.get_page(page_num)?;
    match node::node_type(page)? {
        NodeType::Leaf => {
            let num_cells = node::leaf_num_cells(page)?;
            log::debug!("{pad}- leaf (size {num_cells})");
            for i in 0..num_cells {
                let page = pager.get_page(page_num)?;
                let key = node::leaf_key(page, i)?;
                log::debug!("{pad}  {key}");
            }
        }
        NodeType::Internal => {
            let num_keys = node::internal_num_keys(page)?;
            log::debug!("{pad}- internal (size {num_keys})");
            for i in 0..num_keys {
                let page = pager.get_page(page_num)?;
                let child = node::internal_cell_child(page, i)?;
                print_tree(pager, child, indent + 1)?;
                let page = pager.get_page(page_num)?;
                let key = node::internal_key(page, i)?;
                log::debug!("{pad}  {key}");
            }
            let page = pager.get_page(page_num)?;
            let right_child = node::internal_right_child(page)?;
            print_tree(pager, right_child, indent + 1)?;
        }
    }
    Ok(())
}
