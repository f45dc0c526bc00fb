use super::*;
use layout::LEAF_NODE_MAX_CELLS;
use tempfile::tempdir;

fn fresh_pager() -> Pager {
    let dir = tempdir().unwrap();
    let mut pager = Pager::open(dir.path().join("t.db")).unwrap();
    init_root(&mut pager).unwrap();
    pager
}

fn insert(pager: &mut Pager, key: &str, value: &str) {
    let cursor = find_cursor(pager, ROOT_PAGE_NUM, key).unwrap();
    leaf_insert(pager, &cursor, key, value).unwrap();
}

fn get(pager: &mut Pager, key: &str) -> Option<String> {
    let cursor = find_cursor(pager, ROOT_PAGE_NUM, key).unwrap();
    let page = pager.get_page(cursor.page_num).unwrap();
    if cursor.cell_num < node::leaf_num_cells(page).unwrap()
        && node::leaf_key(page, cursor.cell_num).unwrap() == key
    {
        Some(node::leaf_value(page, cursor.cell_num).unwrap())
    } else {
        None
    }
}

#[test]
fn insert_and_get_single_key() {
    let mut pager = fresh_pager();
    insert(&mut pager, "alpha", "1");
    assert_eq!(get(&mut pager, "alpha"), Some("1".to_string()));
    assert_eq!(get(&mut pager, "missing"), None);
}

#[test]
fn keeps_leaf_sorted_regardless_of_insertion_order() {
    let mut pager = fresh_pager();
    for key in ["delta", "alpha", "charlie", "bravo"] {
        insert(&mut pager, key, key);
    }

    let page = pager.get_page(ROOT_PAGE_NUM).unwrap();
    let num_cells = node::leaf_num_cells(page).unwrap();
    let mut keys = Vec::new();
    for i in 0..num_cells {
        keys.push(node::leaf_key(pager.get_page(ROOT_PAGE_NUM).unwrap(), i).unwrap());
    }
    assert_eq!(keys, vec!["alpha", "bravo", "charlie", "delta"]);
}

#[test]
fn eleventh_insert_splits_root_into_internal_node() {
    let mut pager = fresh_pager();
    assert_eq!(LEAF_NODE_MAX_CELLS, 10);

    for i in 0..LEAF_NODE_MAX_CELLS {
        let key = format!("key{i:03}");
        insert(&mut pager, &key, "v");
    }
    let root = pager.get_page(ROOT_PAGE_NUM).unwrap();
    assert_eq!(node::node_type(root).unwrap(), NodeType::Leaf);

    insert(&mut pager, "key010", "v");
    let root = pager.get_page(ROOT_PAGE_NUM).unwrap();
    assert_eq!(node::node_type(root).unwrap(), NodeType::Internal);
    assert_eq!(node::internal_num_keys(root).unwrap(), 1);

    for i in 0..=LEAF_NODE_MAX_CELLS {
        let key = format!("key{i:03}");
        assert_eq!(get(&mut pager, &key), Some("v".to_string()));
    }
}

#[test]
fn reverse_order_insert_still_splits_correctly() {
    let mut pager = fresh_pager();
    for i in (0..=LEAF_NODE_MAX_CELLS).rev() {
        let key = format!("key{i:03}");
        insert(&mut pager, &key, "v");
    }
    for i in 0..=LEAF_NODE_MAX_CELLS {
        let key = format!("key{i:03}");
        assert_eq!(get(&mut pager, &key), Some("v".to_string()));
    }
}

#[test]
fn delete_removes_key_and_shifts_remaining_cells() {
    let mut pager = fresh_pager();
    for key in ["alpha", "bravo", "charlie"] {
        insert(&mut pager, key, key);
    }

    let cursor = find_cursor(&mut pager, ROOT_PAGE_NUM, "bravo").unwrap();
    delete_from_leaf(&mut pager, &cursor).unwrap();

    assert_eq!(get(&mut pager, "bravo"), None);
    assert_eq!(get(&mut pager, "alpha"), Some("alpha".to_string()));
    assert_eq!(get(&mut pager, "charlie"), Some("charlie".to_string()));

    let page = pager.get_page(ROOT_PAGE_NUM).unwrap();
    assert_eq!(node::leaf_num_cells(page).unwrap(), 2);
}

#[test]
fn delete_past_end_of_leaf_is_not_found() {
    let mut pager = fresh_pager();
    insert(&mut pager, "alpha", "1");
    let cursor = Cursor {
        page_num: ROOT_PAGE_NUM,
        cell_num: 5,
        end_of_table: false,
    };
    assert!(matches!(
        delete_from_leaf(&mut pager, &cursor),
        Err(DbError::NotFound)
    ));
}

#[test]
fn update_overwrites_value_in_place() {
    let mut pager = fresh_pager();
    insert(&mut pager, "alpha", "1");
    let cursor = find_cursor(&mut pager, ROOT_PAGE_NUM, "alpha").unwrap();
    update_in_leaf(&mut pager, &cursor, "2").unwrap();
    assert_eq!(get(&mut pager, "alpha"), Some("2".to_string()));
}

#[test]
fn select_all_via_cursor_stops_at_leaf_boundary_after_split() {
    let mut pager = fresh_pager();
    for i in 0..=LEAF_NODE_MAX_CELLS {
        let key = format!("key{i:03}");
        insert(&mut pager, &key, "v");
    }

    let mut cursor = start_cursor(&mut pager, ROOT_PAGE_NUM).unwrap();
    let mut seen = 0usize;
    while !cursor.end_of_table {
        cursor_value(&mut pager, &cursor).unwrap();
        advance_cursor(&mut pager, &mut cursor).unwrap();
        seen += 1;
    }

    // StartCursor reads the root's cell-count field directly; after a
    // split the root is internal, so this sees only the left child's
    // share of the keys, not the whole table. This mirrors the documented
    // single-leaf iteration limitation.
    assert!(seen < LEAF_NODE_MAX_CELLS + 1);
    assert!(seen > 0);
}

#[test]
fn internal_insert_fails_full_at_capacity() {
    let mut pager = fresh_pager();
    let parent = pager.get_page(1).unwrap();
    node::internal_node_init(parent).unwrap();
    node::set_internal_num_keys(parent, layout::INTERNAL_NODE_MAX_CELLS as u32).unwrap();
    node::set_internal_right_child(parent, 2).unwrap();

    let err = internal_insert(&mut pager, 1, 3, "zzz").unwrap_err();
    assert!(matches!(err, DbError::Full));
}

#[test]
fn print_tree_does_not_error_on_split_tree() {
    let mut pager = fresh_pager();
    for i in 0..=LEAF_NODE_MAX_CELLS {
        let key = format!("key{i:03}");
        insert(&mut pager, &key, "v");
    }
    print_tree(&mut pager, ROOT_PAGE_NUM, 0).unwrap();
}
