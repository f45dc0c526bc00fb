use super::*;
use tempfile::tempdir;

#[test]
fn open_on_fresh_file_has_zero_pages() {
    let dir = tempdir().unwrap();
    let pager = Pager::open(dir.path().join("t.db")).unwrap();
    assert_eq!(pager.num_pages(), 0);
}

#[test]
fn open_rejects_truncated_file_length() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.db");
    std::fs::write(&path, vec![0u8; PAGE_SIZE + 10]).unwrap();
    assert!(matches!(Pager::open(&path), Err(DbError::Bounds(_))));
}

#[test]
fn get_page_beyond_file_is_zeroed_and_bumps_num_pages() {
    let dir = tempdir().unwrap();
    let mut pager = Pager::open(dir.path().join("t.db")).unwrap();
    let page = pager.get_page(3).unwrap();
    assert!(page.as_bytes().iter().all(|&b| b == 0));
    assert_eq!(pager.num_pages(), 4);
}

#[test]
fn get_page_out_of_bounds_is_an_error() {
    let dir = tempdir().unwrap();
    let mut pager = Pager::open(dir.path().join("t.db")).unwrap();
    let err = pager.get_page(TABLE_MAX_PAGES as u32).unwrap_err();
    assert!(matches!(err, DbError::Bounds(_)));
}

#[test]
fn flush_without_wal_writes_through_to_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.db");
    {
        let mut pager = Pager::open(&path).unwrap();
        let page = pager.get_page(0).unwrap();
        page.write_bytes(0, b"hello").unwrap();
        pager.flush_page(0).unwrap();
    }

    let mut pager = Pager::open(&path).unwrap();
    let page = pager.get_page(0).unwrap();
    assert_eq!(page.read_bytes(0, 5).unwrap(), b"hello");
}

#[test]
fn flush_of_uncached_page_is_an_error() {
    let dir = tempdir().unwrap();
    let mut pager = Pager::open(dir.path().join("t.db")).unwrap();
    assert!(pager.flush_page(5).is_err());
}

#[test]
fn flush_with_wal_routes_through_wal_not_direct_write() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.db");
    let mut pager = Pager::open(&path).unwrap();
    pager.set_wal(Some(Wal::open(&path).unwrap()));

    let page = pager.get_page(0).unwrap();
    page.write_bytes(0, b"wal-routed").unwrap();
    pager.flush_page(0).unwrap();

    // The db file itself was never touched directly.
    let on_disk_len = std::fs::metadata(&path).unwrap().len();
    assert_eq!(on_disk_len, 0);

    let wal_path = {
        let mut os = path.as_os_str().to_owned();
        os.push(".wal");
        std::path::PathBuf::from(os)
    };
    assert!(std::fs::metadata(&wal_path).unwrap().len() > 0);
}

#[test]
fn checkpoint_wal_is_a_no_op_without_a_wal() {
    let dir = tempdir().unwrap();
    let mut pager = Pager::open(dir.path().join("t.db")).unwrap();
    pager.checkpoint_wal().unwrap();
}

#[test]
fn checkpoint_wal_drains_logged_pages_into_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.db");
    let mut pager = Pager::open(&path).unwrap();
    pager.set_wal(Some(Wal::open(&path).unwrap()));

    pager.get_page(0).unwrap().write_bytes(0, b"one").unwrap();
    pager.flush_page(0).unwrap();

    pager.checkpoint_wal().unwrap();

    pager.take_wal().unwrap().close().unwrap();

    let mut reopened = Pager::open(&path).unwrap();
    assert_eq!(reopened.get_page(0).unwrap().read_bytes(0, 3).unwrap(), b"one");
}

#[test]
fn close_flushes_every_cached_page() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.db");
    let mut pager = Pager::open(&path).unwrap();
    pager.get_page(0).unwrap().write_bytes(0, b"a").unwrap();
    pager.get_page(2).unwrap().write_bytes(0, b"c").unwrap();
    pager.close().unwrap();

    let mut pager = Pager::open(&path).unwrap();
    assert_eq!(pager.get_page(0).unwrap().read_bytes(0, 1).unwrap(), b"a");
    assert_eq!(pager.get_page(2).unwrap().read_bytes(0, 1).unwrap(), b"c");
}
