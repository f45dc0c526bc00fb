use super::*;
use std::io;

#[test]
fn config_defaults_are_sane() {
    let cfg = Config::default();
    assert!(cfg.wal_enabled);
    assert_eq!(cfg.data_dir, PathBuf::from("./db_data"));
}

#[test]
fn db_error_formats_cleanly() {
    let err = DbError::Bounds("page 101 >= 100".into());
    assert!(format!("{err}").contains("101"));
}

#[test]
fn io_error_converts() {
    let e = io::Error::other("oops");
    let db_err: DbError = e.into();
    assert!(matches!(db_err, DbError::Io(_)));
}
