use serde_json::json;

use super::*;

fn add(buf: &mut HistoryBuffer, key: u64) -> u64 {
    buf.push(HistoryEntryKind::AddObject, vec![ObjectKey(key)])
}

#[test]
fn push_assigns_increasing_sequence_numbers() {
    let mut buf = HistoryBuffer::new();
    let a = add(&mut buf, 1);
    let b = add(&mut buf, 2);
    assert!(b > a);
    assert_eq!(buf.len(), 2);
    assert_eq!(buf.last().unwrap().affected, vec![ObjectKey(2)]);
}

#[test]
fn pop_is_lifo() {
    let mut buf = HistoryBuffer::new();
    for k in 1..=3 {
        add(&mut buf, k);
    }
    let popped: Vec<_> = std::iter::from_fn(|| buf.pop()).map(|e| e.affected[0]).collect();
    assert_eq!(popped, vec![ObjectKey(3), ObjectKey(2), ObjectKey(1)]);
    assert!(buf.pop().is_none());
}

#[test]
fn default_capacity_is_one_thousand() {
    assert_eq!(HistoryBuffer::default().capacity(), 1000);
}

#[test]
fn overflow_evicts_oldest_and_keeps_order() {
    let mut buf = HistoryBuffer::new();
    for k in 1..=1001 {
        add(&mut buf, k);
    }
    assert_eq!(buf.len(), 1000);
    let keys: Vec<u64> = buf.iter().map(|e| e.affected[0].0).collect();
    assert_eq!(keys.first(), Some(&2));
    assert_eq!(keys.last(), Some(&1001));
    assert!(keys.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn get_finds_retained_entries_only() {
    let mut buf = HistoryBuffer::with_capacity(2);
    let first = add(&mut buf, 1);
    let second = add(&mut buf, 2);
    let third = add(&mut buf, 3);
    assert!(buf.get(first).is_none());
    assert_eq!(buf.get(second).unwrap().affected, vec![ObjectKey(2)]);
    assert_eq!(buf.get(third).unwrap().seq, third);
}

#[test]
fn sequence_keeps_growing_after_clear() {
    let mut buf = HistoryBuffer::new();
    let a = add(&mut buf, 1);
    buf.clear();
    assert!(buf.is_empty());
    assert!(add(&mut buf, 2) > a);
}

#[test]
fn change_entries_carry_property_changes() {
    let mut buf = HistoryBuffer::new();
    let change = PropertyChange {
        key: ObjectKey(5),
        property: "x".into(),
        before: json!(10),
        after: json!(12),
    };
    buf.push(HistoryEntryKind::ChangeObject { changes: vec![change.clone()] }, vec![ObjectKey(5)]);
    let Some(HistoryEntry { kind: HistoryEntryKind::ChangeObject { changes }, .. }) = buf.pop() else {
        panic!("expected a change entry");
    };
    assert_eq!(changes, vec![change]);
}

#[test]
fn zero_capacity_is_clamped() {
    let mut buf = HistoryBuffer::with_capacity(0);
    add(&mut buf, 1);
    add(&mut buf, 2);
    assert_eq!(buf.len(), 1);
    assert_eq!(buf.last().unwrap().affected, vec![ObjectKey(2)]);
}
