use dojo_core::db::open_db_in_memory;
use dojo_core::{Dojo, DojoRepository, Member, MemberRepository, RepoError, SqliteDojoRepository};
use rusqlite::Connection;

#[test]
fn try_new_rejects_connection_missing_members_table() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE members;").unwrap();

    let err = SqliteDojoRepository::try_new(&conn).err().unwrap();
    assert!(matches!(err, RepoError::MissingRequiredTable("members")));
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteDojoRepository::try_new(&conn).err().unwrap();
    assert!(matches!(err, RepoError::UninitializedConnection { .. }));
}

#[test]
fn failed_delete_rolls_back_member_detach() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDojoRepository::try_new(&conn).unwrap();

    let dojo = Dojo::new("Locked", None);
    repo.create_dojo(&dojo).unwrap();
    let member = Member::guest("Stuck", Some(dojo.id));
    repo.create_member(&member).unwrap();

    conn.execute_batch(
        "CREATE TRIGGER block_dojo_delete BEFORE DELETE ON dojos
         BEGIN
             SELECT RAISE(ABORT, 'dojo delete blocked');
         END;",
    )
    .unwrap();

    let err = repo.remove_dojo(dojo.id).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));

    let loaded = repo.get_member(member.id).unwrap().unwrap();
    assert_eq!(loaded.dojo_id, Some(dojo.id));
    assert!(repo.get_dojo(dojo.id).unwrap().is_some());

    conn.execute_batch("DROP TRIGGER block_dojo_delete;").unwrap();
    assert_eq!(repo.remove_dojo(dojo.id).unwrap(), 1);
    assert_eq!(repo.get_member(member.id).unwrap().unwrap().dojo_id, None);
}

#[test]
fn corrupted_uuid_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDojoRepository::try_new(&conn).unwrap();
    repo.create_dojo(&Dojo::new("Broken", None)).unwrap();

    conn.execute_batch("UPDATE dojos SET uuid = 'not-a-uuid';")
        .unwrap();

    let err = repo.list_dojos().unwrap_err();
    match err {
        RepoError::InvalidData(message) => assert!(message.contains("dojos.uuid")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn list_guests_uses_insertion_order_and_includes_archived() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDojoRepository::try_new(&conn).unwrap();

    let first = Member::guest("First", None);
    let regular = Member::new("Regular", None, false);
    let mut archived = Member::guest("Archived", None);
    archived.archived = true;
    for member in [&first, &regular, &archived] {
        repo.create_member(member).unwrap();
    }

    let guests = repo.list_guests().unwrap();
    let ids = guests.iter().map(|member| member.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![first.id, archived.id]);
    assert!(guests[1].archived);
}
