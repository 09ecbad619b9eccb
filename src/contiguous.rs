//! C6 — the contiguous-set finder: consumes a C5 range-scan lazily and
//! returns the earliest (or latest) touching chain whose summed duration
//! meets a threshold. Grounded in `availability.rs`'s sweep-accumulator
//! shape (`compute_saturated_spans`), reworked per design note §9 from "sweep
//! everything, return saturated spans" into a streaming accumulator over a
//! pull iterator — no channel pipeline, one pass.

use crate::interval::Interval;
use crate::scan::{Direction, RangeScan};

/// Consume `scan` and return the first maximal touching chain whose summed
/// duration is `>= min_duration`, or an empty `Vec` if the scan is
/// exhausted first (spec §4.5). Infallible beyond `RangeScan` construction,
/// which already happened by the time this is called.
pub(crate) fn find_set<P: Clone>(scan: RangeScan<P>, min_duration: i64) -> Vec<Interval<P>> {
    let direction = scan.direction();
    let mut set: Vec<Interval<P>> = Vec::new();
    let mut found_duration: i64 = 0;

    for iv in scan {
        if found_duration >= min_duration {
            return set;
        }

        if let Some(last) = set.last() {
            let touching = match direction {
                Direction::Forward => iv.start <= last.end,
                Direction::Reverse => iv.end >= last.start,
            };
            if !touching {
                set.clear();
                found_duration = 0;
            }
        }

        found_duration += iv.duration();
        set.push(iv);
    }

    if found_duration >= min_duration {
        set
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    const H: i64 = 3_600_000_000_000;
    const M: i64 = 60_000_000_000;

    /// Builds the store from spec.md §8's end-to-end scenario.
    fn scenario_store() -> Store<()> {
        let store: Store<()> = Store::open();
        let mut tx = store.new_tx(true);
        let rows: &[(u64, i64, i64, f64)] = &[
            (5, 8 * H, 9 * H, 1.0),
            (10, 9 * H, 10 * H, 2.0),
            (20, 10 * H, 11 * H, 3.0),
            (30, 11 * H, 12 * H, 2.0),
            (40, 12 * H, 12 * H + 45 * M, 1.0),
            (50, 13 * H, 14 * H, 1.0),
            (60, 14 * H, 15 * H, 1.0),
        ];
        for &(id, start, end, priority) in rows {
            tx.add(Interval::new(id, start, end, priority, None).unwrap()).unwrap();
        }
        tx.commit().unwrap();
        store
    }

    #[test]
    fn scenario_1_forward_find_set() {
        let store = scenario_store();
        let tx = store.new_tx(false);
        let got = tx.find_set(true, 8 * H, 15 * H, 90 * M, 1.0).unwrap();
        assert_eq!(got.len(), 3);
        assert_eq!(got[0].id, 40);
        assert_eq!(got[1].id, 0);
        assert_eq!(got[1].start, 12 * H + 45 * M);
        assert_eq!(got[1].end, 13 * H);
        assert_eq!(got[2].id, 50);
        let total: i64 = got.iter().map(|i| i.duration()).sum();
        assert_eq!(total, 120 * M);
    }

    #[test]
    fn scenario_2_reverse_find_set() {
        let store = scenario_store();
        let tx = store.new_tx(false);
        let got = tx.find_set(false, 8 * H, 15 * H, 90 * M, 1.0).unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].id, 60);
        assert_eq!(got[1].id, 50);
        let total: i64 = got.iter().map(|i| i.duration()).sum();
        assert_eq!(total, 120 * M);
    }

    #[test]
    fn scenario_3_find_fwd_all_priorities() {
        let store = scenario_store();
        let tx = store.new_tx(false);
        let got = tx.find_fwd(9 * H + 30 * M, 11 * H + 30 * M, 99.0).unwrap();
        let ids: Vec<u64> = got.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[test]
    fn scenario_4_find_fwd_priority_cap_skips_one() {
        let store = scenario_store();
        let tx = store.new_tx(false);
        let got = tx.find_fwd(9 * H + 30 * M, 11 * H + 30 * M, 2.0).unwrap();
        let ids: Vec<u64> = got.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![10, 30]);
    }

    #[test]
    fn scenario_5_add_conflicting_interval_fails() {
        let store = scenario_store();
        let mut tx = store.new_tx(true);
        let iv = Interval::new(70, 10 * H + 30 * M, 11 * H + 30 * M, 1.0, None).unwrap();
        let err = tx.add(iv).unwrap_err();
        assert!(matches!(err, crate::error::Error::Conflict { .. }));
    }

    #[test]
    fn scenario_6_filling_gap_extends_chain() {
        let store = scenario_store();
        let mut tx = store.new_tx(true);
        let iv = Interval::new(80, 12 * H + 45 * M, 13 * H, 1.0, None).unwrap();
        tx.add(iv).unwrap();
        tx.commit().unwrap();

        let tx2 = store.new_tx(false);
        let got = tx2.find_set(true, 8 * H, 15 * H, 90 * M, 1.0).unwrap();
        assert_eq!(got.first().unwrap().start, 12 * H);
        assert_eq!(got.last().unwrap().end, 14 * H);
        assert!(got.iter().all(|i| i.id != 0), "no synthetic interval should remain in the filled chain");
    }

    #[test]
    fn not_found_returns_empty() {
        let store: Store<()> = Store::open();
        let tx = store.new_tx(false);
        let got = tx.find_set(true, 0, H, 2 * H, 99.0).unwrap();
        assert!(got.is_empty());
    }

    #[test]
    fn add_then_delete_is_observationally_equivalent_to_pre_state() {
        let store: Store<()> = Store::open();
        let mut tx = store.new_tx(true);
        let iv = Interval::new(1, 0, H, 1.0, None).unwrap();
        tx.add(iv.clone()).unwrap();
        tx.delete(&iv).unwrap();
        tx.commit().unwrap();

        let tx2 = store.new_tx(false);
        let got = tx2.find_fwd(0, H, 99.0).unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].id, 0, "only the synthetic free gap should remain");
    }
}
