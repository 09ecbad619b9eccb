//! End-to-end lifecycle: open a store, add intervals across write
//! transactions, run forward/reverse range scans and contiguous-set
//! queries, delete, and verify visibility follows commit order.

use timecore::{Error, Interval, Store};

const H: i64 = 3_600_000_000_000;
const M: i64 = 60_000_000_000;

#[test]
fn open_add_commit_find_set_delete_commit() {
    let store: Store<&'static str> = Store::open();

    let mut tx = store.new_tx(true);
    tx.add(Interval::new(1, 8 * H, 9 * H, 1.0, Some("standup")).unwrap()).unwrap();
    tx.add(Interval::new(2, 9 * H, 10 * H, 1.0, Some("1:1")).unwrap()).unwrap();
    tx.add(Interval::new(3, 11 * H, 12 * H, 1.0, Some("review")).unwrap()).unwrap();
    tx.commit().unwrap();

    let tx = store.new_tx(false);
    let found = tx.find_set(true, 8 * H, 12 * H, 2 * H, 1.0).unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].id, 1);
    assert_eq!(found[1].id, 2);
    tx.commit().unwrap();

    let mut tx = store.new_tx(true);
    let victim = Interval::new(2, 9 * H, 10 * H, 1.0, Some("1:1")).unwrap();
    tx.delete(&victim).unwrap();
    tx.commit().unwrap();

    let tx = store.new_tx(false);
    let all = tx.find_fwd(8 * H, 12 * H, 99.0).unwrap();
    let ids: Vec<u64> = all.iter().map(|iv| iv.id).collect();
    assert_eq!(ids, vec![1, 0, 3]);
    tx.commit().unwrap();
}

#[test]
fn write_transactions_serialize_and_readers_see_a_stable_snapshot() {
    let store: Store<()> = Store::open();

    let mut setup = store.new_tx(true);
    setup.add(Interval::new(1, 0, H, 1.0, None).unwrap()).unwrap();
    setup.commit().unwrap();

    let reader = store.new_tx(false);
    let before = reader.find_fwd(0, 2 * H, 99.0).unwrap();
    assert_eq!(before.len(), 2);

    let mut writer = store.new_tx(true);
    writer.add(Interval::new(2, H, 2 * H, 1.0, None).unwrap()).unwrap();
    writer.commit().unwrap();

    let still_before = reader.find_fwd(0, 2 * H, 99.0).unwrap();
    assert_eq!(still_before.len(), 2, "a transaction opened before a commit must not see its effects");
    reader.commit().unwrap();

    let fresh = store.new_tx(false);
    let after = fresh.find_fwd(0, 2 * H, 99.0).unwrap();
    assert_eq!(after.len(), 2);
    assert_eq!(after[0].id, 1);
    assert_eq!(after[1].id, 2);
}

#[test]
fn add_conflict_leaves_transaction_open_for_further_use() {
    let store: Store<()> = Store::open();
    let mut tx = store.new_tx(true);
    tx.add(Interval::new(1, 0, H, 1.0, None).unwrap()).unwrap();

    let err = tx.add(Interval::new(2, 30 * M, 90 * M, 1.0, None).unwrap()).unwrap_err();
    assert!(matches!(err, Error::Conflict { with: 1 }));

    // the failed add did not close the transaction
    tx.add(Interval::new(3, H, 2 * H, 1.0, None).unwrap()).unwrap();
    tx.commit().unwrap();

    let check = store.new_tx(false);
    let ids: Vec<u64> = check.find_fwd(0, 2 * H, 99.0).unwrap().iter().map(|iv| iv.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn operations_after_commit_fail_with_tx_closed() {
    let store: Store<()> = Store::open();
    let mut tx = store.new_tx(true);
    tx.commit().unwrap();
    let err = tx.add(Interval::new(1, 0, H, 1.0, None).unwrap()).unwrap_err();
    assert!(matches!(err, Error::TxClosed));
}

#[test]
fn forward_and_reverse_iterators_agree_on_multiset() {
    let store: Store<()> = Store::open();
    let mut tx = store.new_tx(true);
    tx.add(Interval::new(1, 0, H, 1.0, None).unwrap()).unwrap();
    tx.add(Interval::new(2, 2 * H, 3 * H, 1.0, None).unwrap()).unwrap();
    tx.add(Interval::new(3, 5 * H, 6 * H, 1.0, None).unwrap()).unwrap();
    tx.commit().unwrap();

    let tx = store.new_tx(false);
    let fwd: Vec<_> = tx.find_fwd_iter(0, 6 * H, 99.0).unwrap().collect();

    let mut rev: Vec<_> = tx.find_rev_iter(0, 6 * H, 99.0).unwrap().collect();
    rev.reverse();

    assert_eq!(fwd.len(), rev.len());
    for (a, b) in fwd.iter().zip(rev.iter()) {
        assert_eq!((a.id, a.start, a.end), (b.id, b.start, b.end));
    }
}
