use dojo_core::db::migrations::latest_version;
use dojo_core::db::{open_db, open_db_in_memory, DbError};
use dojo_core::{DojoService, SqliteDojoRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "dojos");
    assert_table_exists(&conn, "members");
    assert_index_exists(&conn, "idx_members_dojo_uuid");
}

#[test]
fn reopening_file_database_keeps_data_and_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dojo.sqlite3");

    let conn_first = open_db(&path).unwrap();
    let id = {
        let service = DojoService::new(SqliteDojoRepository::try_new(&conn_first).unwrap());
        service.create("Persisted", Some("Osaka".to_string())).unwrap()
    };
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let service = DojoService::new(SqliteDojoRepository::try_new(&conn_second).unwrap());
    let loaded = service.get(id).unwrap().unwrap();
    assert_eq!(loaded.name, "Persisted");
    assert_eq!(loaded.location.as_deref(), Some("Osaka"));
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert_master_entry(conn, "table", table_name);
}

fn assert_index_exists(conn: &Connection, index_name: &str) {
    assert_master_entry(conn, "index", index_name);
}

fn assert_master_entry(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
