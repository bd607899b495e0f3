//! Sharing one store between threads.

use std::thread;

use crate::{open_store, MEMBER_COLUMNS};
use gridtable::Record;

#[test]
fn test_concurrent_inserts_all_land() {
    let (_grid, store) = open_store();
    store.create_table("member", MEMBER_COLUMNS).unwrap();

    thread::scope(|s| {
        for worker in 0..4 {
            let store = store.clone();
            s.spawn(move || {
                for i in 0..10 {
                    let name = format!("w{}-{}", worker, i);
                    store
                        .update("member")
                        .unwrap()
                        .insert(Record::new([name.as_str(), "JP", "Tokyo", "1"]))
                        .execute()
                        .unwrap();
                }
            });
        }
    });

    let records = store.query("member").unwrap().execute().unwrap();
    assert_eq!(records.len(), 40);
    let indices: Vec<u32> = records.iter().map(Record::row_index).collect();
    assert_eq!(indices, (1..=40).collect::<Vec<_>>());

    // Each worker's rows keep their relative order
    for worker in 0..4 {
        let prefix = format!("w{}-", worker);
        let mine: Vec<String> = records
            .iter()
            .map(|r| r.get_str(0).unwrap())
            .filter(|n| n.starts_with(&prefix))
            .collect();
        let expected: Vec<String> = (0..10).map(|i| format!("w{}-{}", worker, i)).collect();
        assert_eq!(mine, expected);
    }
}

#[test]
fn test_concurrent_table_creation() {
    let (grid, store) = open_store();

    thread::scope(|s| {
        for i in 0..6 {
            let store = &store;
            s.spawn(move || {
                store.create_table(format!("t{}", i), ["a"]).unwrap();
            });
        }
    });

    assert_eq!(store.table_names().len(), 6);
    assert_eq!(gridtable::GridService::sheet_names(grid.as_ref()).unwrap().len(), 7);
}
