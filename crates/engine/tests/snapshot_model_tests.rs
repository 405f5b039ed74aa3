//! Property tests: snapshot scans agree with a straightforward model
//!
//! Each row gets one column with a random history of committed PUTs and
//! DELETEs, and maybe an in-flight lock. The model replays the history up to
//! the snapshot timestamp.

mod common;

use common::{rows_of, values_of, Fixture};
use proptest::prelude::*;
use strata_core::Scan;
use strata_engine::{with_snapshot, RowResult};

#[derive(Debug, Clone)]
struct RowHistory {
    /// true = PUT, false = DELETE; op i starts at 4i+1 and commits at 4i+2
    ops: Vec<bool>,
    lock_ts: Option<u64>,
}

fn row_history() -> impl Strategy<Value = RowHistory> {
    (
        prop::collection::vec(any::<bool>(), 0..5),
        prop::option::of(1u64..30),
    )
        .prop_map(|(ops, lock_ts)| RowHistory { ops, lock_ts })
}

#[derive(Debug, PartialEq)]
enum Expected {
    Conflict,
    Value(String),
}

fn expected_at(history: &RowHistory, ts: u64) -> Option<Expected> {
    if history.lock_ts.map_or(false, |l| l <= ts) {
        return Some(Expected::Conflict);
    }
    let visible = history
        .ops
        .iter()
        .enumerate()
        .filter(|(i, _)| commit_ts(*i) <= ts)
        .last()?;
    match visible {
        (i, &true) => Some(Expected::Value(format!("v{}", i))),
        (_, &false) => None,
    }
}

fn start_ts(i: usize) -> u64 {
    4 * i as u64 + 1
}

fn commit_ts(i: usize) -> u64 {
    4 * i as u64 + 2
}

fn load(fx: &Fixture, rows: &[RowHistory]) {
    for (r, history) in rows.iter().enumerate() {
        let row = format!("row{:02}", r);
        for (i, is_put) in history.ops.iter().enumerate() {
            if *is_put {
                fx.commit_put(&row, "q", start_ts(i), commit_ts(i), &format!("v{}", i));
            } else {
                fx.commit_delete(&row, "q", start_ts(i), commit_ts(i));
            }
        }
        if let Some(lock_ts) = history.lock_ts {
            fx.lock(&row, "q", lock_ts);
        }
    }
}

proptest! {
    #[test]
    fn prop_scan_matches_model(
        rows in prop::collection::vec(row_history(), 1..12),
        ts in 0u64..30,
        limit in 1usize..5,
    ) {
        let fx = Fixture::new();
        load(&fx, &rows);

        let mut scanner = fx.txn.scan_open(&with_snapshot(Scan::new(), ts)).unwrap();
        let mut results = Vec::new();
        while scanner.next(&mut results, limit).unwrap() {}

        let expected: Vec<(String, Expected)> = rows
            .iter()
            .enumerate()
            .filter_map(|(r, h)| expected_at(h, ts).map(|e| (format!("row{:02}", r), e)))
            .collect();

        prop_assert_eq!(
            rows_of(&results),
            expected.iter().map(|(row, _)| row.clone()).collect::<Vec<_>>()
        );
        for (result, (_, want)) in results.iter().zip(&expected) {
            match want {
                Expected::Conflict => prop_assert!(result.is_conflict()),
                Expected::Value(v) => prop_assert_eq!(values_of(result), vec![v.clone()]),
            }
        }
        prop_assert_eq!(fx.region.open_scanner_count(), 0);
    }

    #[test]
    fn prop_conflict_rows_hold_only_locks(
        rows in prop::collection::vec(row_history(), 1..12),
        ts in 0u64..30,
    ) {
        let fx = Fixture::new();
        load(&fx, &rows);

        for result in fx.scan_all(ts) {
            if let RowResult::Conflict(cells) = &result {
                prop_assert!(!cells.is_empty());
                for cell in cells {
                    prop_assert_eq!(cell.family.as_slice(), b"L");
                    prop_assert!(cell.timestamp <= ts);
                }
            }
        }
    }

    #[test]
    fn prop_page_size_does_not_change_rows(
        rows in prop::collection::vec(row_history(), 1..12),
        ts in 0u64..30,
        limit in 1usize..6,
    ) {
        let fx = Fixture::new();
        load(&fx, &rows);

        let mut scanner = fx.txn.scan_open(&with_snapshot(Scan::new(), ts)).unwrap();
        let mut paged = Vec::new();
        loop {
            let page = scanner.next_page(limit).unwrap();
            prop_assert!(page.rows.len() <= limit);
            paged.extend(page.rows);
            if !page.more {
                break;
            }
        }

        let mut scanner = fx.txn.scan_open(&with_snapshot(Scan::new(), ts)).unwrap();
        let mut whole = Vec::new();
        prop_assert!(!scanner.next(&mut whole, usize::MAX).unwrap());
        prop_assert_eq!(paged, whole);
    }
}
