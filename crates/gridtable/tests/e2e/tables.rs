//! Table lifecycle and metadata persistence.

use crate::{dump, insert, open_store, reopen, row, sheet_rows, MEMBER_COLUMNS};
use gridtable::{Error, GridService, SchemaState};
use pretty_assertions::assert_eq;

#[test]
fn test_fresh_table_is_empty() {
    let (_grid, store) = open_store();
    store.create_table("member", MEMBER_COLUMNS).unwrap();

    assert!(dump(&store, "member").is_empty());
}

#[test]
fn test_create_twice_does_not_duplicate() {
    let (grid, store) = open_store();
    store.create_table("member", MEMBER_COLUMNS).unwrap();
    insert(&store, "member", &[&["Aiko", "Japan", "Tokyo", "111"]]);

    store.create_table("member", MEMBER_COLUMNS).unwrap();

    assert_eq!(grid.sheet_names().unwrap(), vec!["#meta", "member"]);
    assert_eq!(
        sheet_rows(&grid, "member"),
        vec![
            row(&MEMBER_COLUMNS),
            row(&["Aiko", "Japan", "Tokyo", "111"]),
        ]
    );
}

#[test]
fn test_drop_table() {
    let (grid, store) = open_store();
    store.create_table("member", MEMBER_COLUMNS).unwrap();

    assert!(store.drop_table("member").unwrap());
    assert!(grid.find_sheet_id("member").unwrap().is_none());
    assert!(store.table("member").is_none());
    assert!(matches!(store.query("member"), Err(Error::NotFound(_))));

    // Dropping again is a no-op
    assert!(!store.drop_table("member").unwrap());
}

#[test]
fn test_drop_after_sheet_vanished() {
    let (grid, store) = open_store();
    store.create_table("member", MEMBER_COLUMNS).unwrap();
    grid.delete_sheet("member").unwrap();

    assert!(!store.drop_table("member").unwrap());
    assert!(store.table("member").is_none());
}

#[test]
fn test_column_lookup() {
    let (_grid, store) = open_store();
    let table = store.create_table("member", MEMBER_COLUMNS).unwrap();

    assert_eq!(table.column_index("address1").unwrap(), 2);
    assert!(matches!(table.column_index("Address1"), Err(Error::NotFound(_))));
    assert_eq!(table.range_address(2, 10), "member!A2:D10");
}

#[test]
fn test_reopen_reads_persisted_state() {
    let (grid, store) = open_store();
    store.create_table("member", MEMBER_COLUMNS).unwrap();
    insert(&store, "member", &[&["Aiko", "Japan", "Tokyo", "111"]]);
    store
        .migrate("member", ["name", "tel"], 3)
        .execute(gridtable::carry_by_name)
        .unwrap();
    store.set_description("members").unwrap();

    let reopened = reopen(&grid);
    assert_eq!(reopened.schema_version(), 3);
    assert_eq!(reopened.schema_state(), SchemaState::Versioned(3));
    assert_eq!(reopened.metadata().description(), "members");

    // Registries are per handle
    assert!(reopened.table("member").is_none());
    let table = reopened.load_table("member").unwrap();
    assert_eq!(table.columns(), &["name", "tel"]);
    assert_eq!(dump(&reopened, "member"), vec![(1, row(&["Aiko", "111"]))]);
}

#[test]
fn test_independent_stores_do_not_interfere() {
    let (_grid_a, a) = open_store();
    let (_grid_b, b) = open_store();

    a.create_table("member", MEMBER_COLUMNS).unwrap();
    assert!(b.table("member").is_none());
    assert_eq!(a.table_names(), vec!["member"]);
    assert!(b.table_names().is_empty());
}

#[test]
fn test_drop_table_created_by_another_handle() {
    let (grid, store) = open_store();
    store.create_table("member", MEMBER_COLUMNS).unwrap();
    insert(&store, "member", &[&["Aiko", "Japan", "Tokyo", "111"]]);

    let other = reopen(&grid);
    assert!(other.table("member").is_none());
    assert!(other.drop_table("member").unwrap());

    assert!(grid.find_sheet_id("member").unwrap().is_none());
    assert_eq!(grid.sheet_names().unwrap(), vec!["#meta"]);
}

#[test]
fn test_truncate_table_created_by_another_handle() {
    let (grid, store) = open_store();
    store.create_table("member", MEMBER_COLUMNS).unwrap();
    insert(&store, "member", &[&["Aiko", "Japan", "Tokyo", "111"]]);

    let other = reopen(&grid);
    assert!(other.truncate("member").unwrap().execute().unwrap());

    assert_eq!(sheet_rows(&grid, "member"), vec![row(&MEMBER_COLUMNS)]);
    assert!(dump(&store, "member").is_empty());
    assert!(!other.truncate("ghost").unwrap().execute().unwrap());
}

#[test]
fn test_recreate_with_fewer_columns() {
    let (grid, store) = open_store();
    store.create_table("member", MEMBER_COLUMNS).unwrap();
    store.create_table("member", ["name", "tel"]).unwrap();

    assert_eq!(sheet_rows(&grid, "member"), vec![row(&["name", "tel"])]);
    let loaded = reopen(&grid).load_table("member").unwrap();
    assert_eq!(loaded.columns(), &["name", "tel"]);
}

#[test]
fn test_table_names_are_case_sensitive() {
    let (grid, store) = open_store();
    store.create_table("member", MEMBER_COLUMNS).unwrap();
    store.create_table("Member", ["name"]).unwrap();

    assert_eq!(grid.sheet_names().unwrap(), vec!["#meta", "member", "Member"]);
    assert_eq!(store.table_names(), vec!["Member", "member"]);
    assert_eq!(store.table("member").unwrap().column_count(), 4);
    assert_eq!(store.table("Member").unwrap().column_count(), 1);
}
