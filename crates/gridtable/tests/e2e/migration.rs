//! Schema migration.

use std::sync::Arc;

use crate::{dump, insert, open_store, reopen, row, sheet_rows, HookGrid, MEMBER_COLUMNS};
use gridtable::{
    CellValue, Error, GridError, GridService, MigrationStep, Record, SchemaState, Store,
    StoreConfig,
};
use pretty_assertions::assert_eq;

const NEW_COLUMNS: [&str; 5] = ["name", "country", "address1", "tel", "score"];

fn member_store() -> (std::sync::Arc<gridtable::MemoryGrid>, gridtable::Store) {
    let (grid, store) = open_store();
    store.create_table("member", MEMBER_COLUMNS).unwrap();
    insert(&store, "member", &[&["Aiko", "Japan", "Tokyo", "111"]]);
    (grid, store)
}

fn add_score(_table: &gridtable::Table, _columns: &[String], records: Vec<Record>) -> Vec<Record> {
    records
        .into_iter()
        .map(|record| {
            let row_index = record.row_index();
            let mut values = record.into_values();
            values.push(CellValue::from(99.9));
            Record::new(values).with_row_index(row_index)
        })
        .collect()
}

#[test]
fn test_add_column() {
    let (grid, store) = member_store();
    let before = grid.round_trips();

    let table = store
        .migrate("member", NEW_COLUMNS, 2)
        .execute(add_score)
        .unwrap()
        .unwrap();

    // inspect, read, one write batch
    assert_eq!(grid.round_trips(), before + 3);
    assert_eq!(table.columns(), &NEW_COLUMNS);
    assert_eq!(store.table("member").unwrap(), table);
    assert_eq!(store.schema_version(), 2);

    let records = store.query("member").unwrap().execute().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get_str(0).unwrap(), "Aiko");
    assert_eq!(records[0].get_float(4).unwrap(), 99.9);

    assert_eq!(
        sheet_rows(&grid, "#meta")[3],
        row(&["schemaVersion", "2"])
    );
    assert_eq!(reopen(&grid).schema_version(), 2);
}

#[test]
fn test_drop_column_clears_old_cells() {
    let (grid, store) = member_store();

    store
        .migrate("member", ["tel", "name"], 2)
        .execute(gridtable::carry_by_name)
        .unwrap();

    assert_eq!(
        sheet_rows(&grid, "member"),
        vec![row(&["tel", "name"]), row(&["111", "Aiko"])]
    );
}

#[test]
fn test_multiple_rows_keep_order() {
    let (_grid, store) = member_store();
    insert(
        &store,
        "member",
        &[&["Bob", "UK", "London", "222"], &["Chen", "China", "Beijing", "333"]],
    );

    store
        .migrate("member", NEW_COLUMNS, 2)
        .execute(add_score)
        .unwrap();

    let names: Vec<String> = dump(&store, "member").into_iter().map(|(_, v)| v[0].clone()).collect();
    assert_eq!(names, vec!["Aiko", "Bob", "Chen"]);
}

#[test]
fn test_state_is_migrating_while_transform_runs() {
    let (_grid, store) = member_store();

    store
        .migrate("member", NEW_COLUMNS, 5)
        .execute(|table, columns, records| {
            assert_eq!(store.schema_state(), SchemaState::Migrating { from: 1, to: 5 });
            add_score(table, columns, records)
        })
        .unwrap();

    assert_eq!(store.schema_state(), SchemaState::Versioned(5));
}

#[test]
fn test_mismatched_transform_writes_nothing() {
    let (grid, store) = member_store();
    let rows_before = sheet_rows(&grid, "member");

    let wrong_width = store
        .migrate("member", NEW_COLUMNS, 2)
        .execute(|_, _, records| records);
    assert!(matches!(wrong_width, Err(Error::SchemaMismatch(_))));

    let dropped_row = store
        .migrate("member", NEW_COLUMNS, 2)
        .execute(|_, _, _| Vec::new());
    assert!(matches!(dropped_row, Err(Error::SchemaMismatch(_))));

    assert_eq!(sheet_rows(&grid, "member"), rows_before);
    assert_eq!(store.schema_state(), SchemaState::Versioned(1));
    assert_eq!(store.table("member").unwrap().column_count(), 4);
}

#[test]
fn test_failed_batch_keeps_registry_and_version() {
    let (grid, store) = member_store();
    let rows_before = sheet_rows(&grid, "member");
    // inspect and read succeed, the write batch fails
    grid.fail_after(2);

    let err = store
        .migrate("member", NEW_COLUMNS, 2)
        .execute(add_score)
        .unwrap_err();
    grid.heal();

    assert!(err.is_remote());
    assert!(matches!(
        err,
        Error::Migration {
            step: MigrationStep::WriteBatch,
            source: GridError::Unavailable(_),
        }
    ));
    assert_eq!(store.schema_version(), 1);
    assert_eq!(store.table("member").unwrap().column_count(), 4);
    assert_eq!(sheet_rows(&grid, "member"), rows_before);
    assert_eq!(reopen(&grid).schema_version(), 1);
}

#[test]
fn test_failed_read_names_the_step() {
    let (grid, store) = member_store();
    grid.fail_after(1);

    let err = store
        .migrate("member", NEW_COLUMNS, 2)
        .execute(add_score)
        .unwrap_err();
    grid.heal();

    assert!(matches!(
        err,
        Error::Migration {
            step: MigrationStep::ReadRows,
            ..
        }
    ));
    assert_eq!(store.schema_state(), SchemaState::Versioned(1));
}

#[test]
fn test_validation_errors() {
    let (grid, store) = member_store();
    let before = grid.round_trips();

    assert!(matches!(
        store.migrate("ghost", NEW_COLUMNS, 2).execute(add_score),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        store.migrate("member", NEW_COLUMNS, 1).execute(add_score),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        store.migrate("member", ["a", "a"], 2).execute(add_score),
        Err(Error::InvalidArgument(_))
    ));
    assert_eq!(grid.round_trips(), before);
}

#[test]
fn test_table_without_sheet_is_skipped() {
    let (grid, store) = member_store();
    grid.delete_sheet("member").unwrap();

    let result = store
        .migrate("member", NEW_COLUMNS, 2)
        .execute(add_score)
        .unwrap();

    assert!(result.is_none());
    assert_eq!(store.schema_version(), 1);
    assert_eq!(store.table("member").unwrap().column_count(), 4);
}

fn hooked_member_store() -> (Arc<HookGrid>, Store) {
    let grid = Arc::new(HookGrid::new());
    let store = Store::open(grid.clone(), StoreConfig::new("test")).unwrap();
    store.create_table("member", MEMBER_COLUMNS).unwrap();
    insert(&store, "member", &[&["Aiko", "Japan", "Tokyo", "111"]]);
    (grid, store)
}

#[test]
fn test_migration_during_description_write_keeps_version() {
    let (grid, store) = hooked_member_store();

    let migrating = store.clone();
    grid.before_next_batch(move || {
        migrating
            .migrate("member", NEW_COLUMNS, 2)
            .execute(add_score)
            .unwrap();
    });
    store.set_description("members").unwrap();

    assert_eq!(store.schema_state(), SchemaState::Versioned(2));
    assert_eq!(store.metadata().description(), "members");
    assert_eq!(store.table("member").unwrap().columns(), &NEW_COLUMNS);

    let reopened = Store::open(grid, StoreConfig::new("test")).unwrap();
    assert_eq!(reopened.schema_version(), 2);
    assert_eq!(reopened.metadata().description(), "members");
}

#[test]
fn test_description_write_during_migration_is_kept() {
    let (grid, store) = hooked_member_store();

    let describing = store.clone();
    grid.before_next_batch(move || describing.set_description("members").unwrap());
    store
        .migrate("member", NEW_COLUMNS, 2)
        .execute(add_score)
        .unwrap();

    assert_eq!(store.schema_version(), 2);
    assert_eq!(store.metadata().description(), "members");

    let reopened = Store::open(grid, StoreConfig::new("test")).unwrap();
    assert_eq!(reopened.schema_version(), 2);
    assert_eq!(reopened.metadata().description(), "members");
}
