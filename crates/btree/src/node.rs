//! Field accessors for leaf and internal node pages.
//!
//! These functions know the byte offsets from [`layout`] but nothing about
//! cursors, splitting, or the pager; they read and write a single
//! [`storage::Page`] in place.

use crate::layout::*;
use common::{DbResult, LEAF_NODE_KEY_SIZE, LEAF_NODE_VALUE_SIZE};
use storage::{read_fixed_str, write_fixed_str, Page};

pub fn node_type(page: &Page) -> DbResult<NodeType> {
    NodeType::try_from(page.read_u8(NODE_TYPE_OFFSET)?)
}

pub fn set_node_type(page: &mut Page, node_type: NodeType) -> DbResult<()> {
    page.write_u8(NODE_TYPE_OFFSET, node_type as u8)
}

pub fn is_root(page: &Page) -> DbResult<bool> {
    Ok(page.read_u8(IS_ROOT_OFFSET)? != 0)
}

pub fn set_is_root(page: &mut Page, is_root: bool) -> DbResult<()> {
    page.write_u8(IS_ROOT_OFFSET, is_root as u8)
}

pub fn parent_page_num(page: &Page) -> DbResult<u32> {
    page.read_u32(PARENT_POINTER_OFFSET)
}

pub fn set_parent_page_num(page: &mut Page, parent: u32) -> DbResult<()> {
    page.write_u32(PARENT_POINTER_OFFSET, parent)
}

// Leaf node fields.

pub fn leaf_num_cells(page: &Page) -> DbResult<u32> {
    page.read_u32(LEAF_NODE_NUM_CELLS_OFFSET)
}

pub fn set_leaf_num_cells(page: &mut Page, count: u32) -> DbResult<()> {
    page.write_u32(LEAF_NODE_NUM_CELLS_OFFSET, count)
}

pub fn leaf_key(page: &Page, cell_num: u32) -> DbResult<String> {
    let offset = leaf_cell_offset(cell_num);
    Ok(read_fixed_str(page.read_bytes(offset, LEAF_NODE_KEY_SIZE)?))
}

pub fn leaf_value(page: &Page, cell_num: u32) -> DbResult<String> {
    let offset = leaf_cell_offset(cell_num) + LEAF_NODE_KEY_SIZE;
    Ok(read_fixed_str(page.read_bytes(offset, LEAF_NODE_VALUE_SIZE)?))
}

pub fn set_leaf_key(page: &mut Page, cell_num: u32, key: &str) -> DbResult<()> {
    let mut buf = [0u8; LEAF_NODE_KEY_SIZE];
    write_fixed_str(&mut buf, key);
    page.write_bytes(leaf_cell_offset(cell_num), &buf)
}

pub fn set_leaf_value(page: &mut Page, cell_num: u32, value: &str) -> DbResult<()> {
    let mut buf = [0u8; LEAF_NODE_VALUE_SIZE];
    write_fixed_str(&mut buf, value);
    page.write_bytes(leaf_cell_offset(cell_num) + LEAF_NODE_KEY_SIZE, &buf)
}

/// Copies cell `src` onto cell `dest` within the same leaf page.
pub fn copy_leaf_cell(page: &mut Page, dest: u32, src: u32) -> DbResult<()> {
    page.copy_within(leaf_cell_offset(src), leaf_cell_offset(dest), LEAF_NODE_CELL_SIZE)
}

pub fn leaf_node_init(page: &mut Page) -> DbResult<()> {
    set_node_type(page, NodeType::Leaf)?;
    set_is_root(page, false)?;
    set_leaf_num_cells(page, 0)?;
    set_parent_page_num(page, 0)
}

// Internal node fields.

pub fn internal_num_keys(page: &Page) -> DbResult<u32> {
    page.read_u32(INTERNAL_NODE_NUM_KEYS_OFFSET)
}

pub fn set_internal_num_keys(page: &mut Page, count: u32) -> DbResult<()> {
    page.write_u32(INTERNAL_NODE_NUM_KEYS_OFFSET, count)
}

pub fn internal_right_child(page: &Page) -> DbResult<u32> {
    page.read_u32(INTERNAL_NODE_RIGHT_CHILD_OFFSET)
}

pub fn set_internal_right_child(page: &mut Page, child: u32) -> DbResult<()> {
    page.write_u32(INTERNAL_NODE_RIGHT_CHILD_OFFSET, child)
}

/// The child pointer stored directly in cell `cell_num` (not the rightmost
/// child, which lives in its own header field).
pub fn internal_cell_child(page: &Page, cell_num: u32) -> DbResult<u32> {
    page.read_u32(internal_cell_offset(cell_num))
}

pub fn set_internal_cell_child(page: &mut Page, cell_num: u32, child: u32) -> DbResult<()> {
    page.write_u32(internal_cell_offset(cell_num), child)
}

pub fn internal_key(page: &Page, cell_num: u32) -> DbResult<String> {
    let offset = internal_cell_offset(cell_num) + INTERNAL_NODE_CHILD_SIZE;
    Ok(read_fixed_str(page.read_bytes(offset, INTERNAL_NODE_KEY_SIZE)?))
}

pub fn set_internal_key(page: &mut Page, cell_num: u32, key: &str) -> DbResult<()> {
    let mut buf = [0u8; INTERNAL_NODE_KEY_SIZE];
    write_fixed_str(&mut buf, key);
    page.write_bytes(internal_cell_offset(cell_num) + INTERNAL_NODE_CHILD_SIZE, &buf)
}

pub fn copy_internal_cell(page: &mut Page, dest: u32, src: u32) -> DbResult<()> {
    page.copy_within(
        internal_cell_offset(src),
        internal_cell_offset(dest),
        INTERNAL_NODE_CELL_SIZE,
    )
}

/// The `child_num`-th child of an internal node: the rightmost child when
/// `child_num == num_keys`, otherwise the cell's own child pointer.
pub fn internal_child(page: &Page, child_num: u32) -> DbResult<u32> {
    let num_keys = internal_num_keys(page)?;
    if child_num > num_keys {
        return Err(common::DbError::Bounds(format!(
            "child index {child_num} out of range for internal node with {num_keys} keys"
        )));
    }
    if child_num == num_keys {
        internal_right_child(page)
    } else {
        internal_cell_child(page, child_num)
    }
}

pub fn internal_node_init(page: &mut Page) -> DbResult<()> {
    set_node_type(page, NodeType::Internal)?;
    set_is_root(page, false)?;
    set_internal_num_keys(page, 0)?;
    set_parent_page_num(page, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_round_trips_key_and_value() {
        let mut page = Page::new(0);
        leaf_node_init(&mut page).unwrap();
        set_leaf_num_cells(&mut page, 1).unwrap();
        set_leaf_key(&mut page, 0, "alpha").unwrap();
        set_leaf_value(&mut page, 0, "one").unwrap();

        assert_eq!(leaf_key(&page, 0).unwrap(), "alpha");
        assert_eq!(leaf_value(&page, 0).unwrap(), "one");
        assert_eq!(leaf_num_cells(&page).unwrap(), 1);
    }

    #[test]
    fn internal_child_falls_back_to_right_child_at_num_keys() {
        let mut page = Page::new(0);
        internal_node_init(&mut page).unwrap();
        set_internal_num_keys(&mut page, 1).unwrap();
        set_internal_cell_child(&mut page, 0, 7).unwrap();
        set_internal_right_child(&mut page, 9).unwrap();

        assert_eq!(internal_child(&page, 0).unwrap(), 7);
        assert_eq!(internal_child(&page, 1).unwrap(), 9);
        assert!(internal_child(&page, 2).is_err());
    }

    #[test]
    fn node_type_round_trips() {
        let mut page = Page::new(0);
        set_node_type(&mut page, NodeType::Internal).unwrap();
        assert_eq!(node_type(&page).unwrap(), NodeType::Internal);
        set_node_type(&mut page, NodeType::Leaf).unwrap();
        assert_eq!(node_type(&page).unwrap(), NodeType::Leaf);
    }
}
