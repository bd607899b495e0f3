//! Insert, update, delete and truncate through the store.

use crate::{dump, insert, open_store, row, sheet_rows};
use gridtable::{CellValue, Error, GridError, Record};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn abc() -> (std::sync::Arc<gridtable::MemoryGrid>, gridtable::Store) {
    let (grid, store) = open_store();
    store.create_table("t", ["name", "n"]).unwrap();
    insert(&store, "t", &[&["A", "1"], &["B", "2"], &["C", "3"]]);
    (grid, store)
}

#[test]
fn test_insert_preserves_order_and_numbers_from_one() {
    let (_grid, store) = abc();
    assert_eq!(
        dump(&store, "t"),
        vec![
            (1, row(&["A", "1"])),
            (2, row(&["B", "2"])),
            (3, row(&["C", "3"])),
        ]
    );
}

#[test]
fn test_typed_values_come_back_as_text() {
    let (_grid, store) = open_store();
    store.create_table("t", ["name", "score"]).unwrap();
    store
        .update("t")
        .unwrap()
        .insert(Record::new([CellValue::from("Aiko"), CellValue::from(99.9)]))
        .execute()
        .unwrap();

    let records = store.query("t").unwrap().execute().unwrap();
    let record = &records[0];
    assert_eq!(record.get(1).unwrap(), &CellValue::string("99.9"));
    assert_eq!(record.get_float(1).unwrap(), 99.9);
    assert!(matches!(record.get_int(0), Err(Error::Format { .. })));
}

#[test]
fn test_delete_middle_row_renumbers() {
    let (grid, store) = abc();

    let deleted = store.delete("t").unwrap().row(2).execute().unwrap();
    assert_eq!(deleted, 1);

    assert_eq!(
        dump(&store, "t"),
        vec![(1, row(&["A", "1"])), (2, row(&["C", "3"]))]
    );
    // No blank row is left behind and the header is untouched
    assert_eq!(
        sheet_rows(&grid, "t"),
        vec![row(&["name", "n"]), row(&["A", "1"]), row(&["C", "3"])]
    );

    // Index lookup agrees with the scan
    let found = store.query("t").unwrap().find_by_index(2).execute().unwrap();
    assert_eq!(found[0].get_str(0).unwrap(), "C");
}

#[test]
fn test_delete_by_records_in_any_order() {
    let (grid, store) = abc();
    let records = store.query("t").unwrap().execute().unwrap();
    let before = grid.round_trips();

    store
        .delete("t")
        .unwrap()
        .records([&records[0], &records[2]])
        .execute()
        .unwrap();

    assert_eq!(grid.round_trips(), before + 1);
    assert_eq!(dump(&store, "t"), vec![(1, row(&["B", "2"]))]);
}

#[test]
fn test_update_then_insert_in_one_batch() {
    let (grid, store) = abc();
    let mut record = store.query("t").unwrap().find_by_index(1).execute().unwrap().remove(0);
    record.set_values(["A2", "10"]);
    let before = grid.round_trips();

    let written = store
        .update("t")
        .unwrap()
        .update(record)
        .insert(Record::new(["D", "4"]))
        .execute()
        .unwrap();

    // row count read, one batch
    assert_eq!(written, 2);
    assert_eq!(grid.round_trips(), before + 2);
    assert_eq!(dump(&store, "t")[0], (1, row(&["A2", "10"])));
    assert_eq!(dump(&store, "t")[3], (4, row(&["D", "4"])));
}

#[test]
fn test_update_past_last_row_keeps_rows_dense() {
    let (grid, store) = abc();

    let result = store
        .update("t")
        .unwrap()
        .update(Record::new(["Z", "26"]).with_row_index(10))
        .execute();
    assert!(matches!(result, Err(Error::IndexOutOfRange(10))));

    assert_eq!(
        sheet_rows(&grid, "t"),
        vec![
            row(&["name", "n"]),
            row(&["A", "1"]),
            row(&["B", "2"]),
            row(&["C", "3"]),
        ]
    );

    // Scan and index lookup still agree on every row
    for (row_index, values) in dump(&store, "t") {
        let found = store
            .query("t")
            .unwrap()
            .find_by_index(row_index)
            .execute()
            .unwrap();
        assert_eq!(found[0].get_str(0).unwrap(), values[0]);
    }
}

#[test]
fn test_wrong_width_is_rejected_before_sending() {
    let (grid, store) = abc();
    let before = grid.round_trips();

    let result = store
        .update("t")
        .unwrap()
        .insert(Record::new(["E", "5", "extra"]))
        .execute();

    assert!(matches!(result, Err(Error::SchemaMismatch(_))));
    assert_eq!(grid.round_trips(), before);
}

#[test]
fn test_truncate() {
    let (grid, store) = abc();

    assert!(store.truncate("t").unwrap().execute().unwrap());
    assert!(dump(&store, "t").is_empty());
    assert_eq!(sheet_rows(&grid, "t"), vec![row(&["name", "n"])]);
    assert_eq!(store.table("t").unwrap().columns(), &["name", "n"]);
}

#[test]
fn test_remote_failure_is_propagated() {
    let (grid, store) = abc();
    grid.fail_after(0);

    let err = store.delete("t").unwrap().row(1).execute().unwrap_err();
    assert!(matches!(err, Error::Remote(GridError::Unavailable(_))));

    grid.heal();
    assert_eq!(dump(&store, "t").len(), 3);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_delete_matches_model(
        count in 1usize..12,
        targets in proptest::collection::vec(1u32..14, 0..8),
    ) {
        let (_grid, store) = open_store();
        store.create_table("t", ["v"]).unwrap();

        let names: Vec<String> = (0..count).map(|i| format!("r{}", i)).collect();
        store
            .update("t")
            .unwrap()
            .insert_all(names.iter().map(|n| Record::new([n.as_str()])))
            .execute()
            .unwrap();

        let mut request = store.delete("t").unwrap();
        for &target in &targets {
            request = request.row(target);
        }
        request.execute().unwrap();

        let expected: Vec<(u32, Vec<String>)> = names
            .iter()
            .enumerate()
            .filter(|(i, _)| !targets.contains(&(*i as u32 + 1)))
            .zip(1u32..)
            .map(|((_, name), index)| (index, vec![name.clone()]))
            .collect();
        prop_assert_eq!(dump(&store, "t"), expected);
    }
}
