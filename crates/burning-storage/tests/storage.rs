//! Storage behavior under transactions

use burning_storage::{
    FuelTable, Quantity, ResourceKind, SimpleStorage, Storage, StorageListener, StorageSnapshot,
    TransactionManager,
};
use std::cell::RefCell;
use std::rc::Rc;

fn peat() -> ResourceKind {
    ResourceKind::new("peat")
}

/// peat burns for 1000 ticks, coal for 1200
fn lookup() -> FuelTable {
    [(peat(), 1000), (ResourceKind::coal(), 1200)]
        .into_iter()
        .collect()
}

#[test]
fn test_uncommitted_insert_rolls_back() {
    let lookup = lookup();
    let manager = TransactionManager::new();
    let storage = SimpleStorage::new(peat());

    {
        let tx = manager.open_outer();
        storage.insert(&Quantity::one_of(peat()), &lookup, &tx);
        assert_eq!(storage.current(), 1000);
    }

    assert_eq!(storage.current_quantity(&lookup).value(&lookup), 0.0);
    assert_eq!(storage.max(), 0);
}

#[test]
fn test_committed_insert_persists() {
    let lookup = lookup();
    let manager = TransactionManager::new();
    let storage = SimpleStorage::new(peat());

    let tx = manager.open_outer();
    storage.insert(&Quantity::one_of(peat()), &lookup, &tx);
    tx.commit();

    assert_eq!(storage.current_quantity(&lookup), Quantity::one_of(peat()));
}

#[test]
fn test_coal_half_then_empty() {
    let lookup = FuelTable::vanilla();
    let manager = TransactionManager::new();
    let storage = SimpleStorage::new(ResourceKind::coal());
    let coal = Quantity::zero_of(ResourceKind::coal());

    let tx = manager.open_outer();
    storage.insert(&coal.one(), &lookup, &tx);
    storage.extract(&coal.with_value(800, &lookup), &lookup, &tx);
    tx.commit();
    assert_eq!(storage.current_quantity(&lookup), coal.with_value(800, &lookup));

    let tx = manager.open_outer();
    let rest = storage.extract(&coal.with_value(800, &lookup), &lookup, &tx);
    tx.commit();
    assert_eq!(rest.ticks(&lookup), 800);
    assert!(storage.current_quantity(&lookup).is_zero());
}

#[test]
fn test_kind_switches_on_overflow() {
    let lookup = lookup();
    let manager = TransactionManager::new();
    let storage = SimpleStorage::new(peat());
    let coal = Quantity::zero_of(ResourceKind::coal());

    let tx = manager.open_outer();
    storage.insert(&Quantity::one_of(peat()), &lookup, &tx);
    let accepted = storage.insert(&coal.with_value(600, &lookup), &lookup, &tx);
    tx.commit();

    assert_eq!(accepted.kind(), &ResourceKind::coal());
    assert_eq!(accepted.ticks(&lookup), 200);
    assert_eq!(storage.current(), 1200);
    assert_eq!(storage.max(), 1200);
    assert_eq!(storage.current_quantity(&lookup), coal.one());
}

#[test]
fn test_kind_switch_rolls_back() {
    let lookup = lookup();
    let manager = TransactionManager::new();
    let storage = SimpleStorage::new(peat());

    let tx = manager.open_outer();
    storage.insert(&Quantity::one_of(peat()), &lookup, &tx);
    {
        let nested = tx.open_nested();
        storage.insert(&Quantity::one_of(ResourceKind::coal()), &lookup, &nested);
        assert_eq!(storage.zero().kind(), &ResourceKind::coal());
    }
    tx.commit();

    assert_eq!(storage.zero().kind(), &peat());
    assert_eq!(storage.current(), 1000);
    assert_eq!(storage.max(), 1000);
}

#[test]
#[should_panic(expected = "not the innermost")]
fn test_insert_through_outer_scope_panics() {
    let lookup = lookup();
    let manager = TransactionManager::new();
    let storage = SimpleStorage::new(peat());

    let tx = manager.open_outer();
    let _nested = tx.open_nested();
    storage.insert(&Quantity::one_of(peat()), &lookup, &tx);
}

#[derive(Default)]
struct Recorder {
    seen: RefCell<Vec<StorageSnapshot>>,
}

impl StorageListener for Recorder {
    fn on_commit(&self, state: &StorageSnapshot) {
        self.seen.borrow_mut().push(state.clone());
    }
}

#[test]
fn test_listeners_see_final_commits_only() {
    let lookup = lookup();
    let manager = TransactionManager::new();
    let storage = SimpleStorage::new(peat());
    let recorder = Rc::new(Recorder::default());
    let listener: Rc<dyn StorageListener> = recorder.clone();
    storage.add_listener(listener.clone());

    let tx = manager.open_outer();
    storage.insert(&Quantity::one_of(peat()), &lookup, &tx);
    drop(tx);
    assert!(recorder.seen.borrow().is_empty());

    let tx = manager.open_outer();
    for _ in 0..2 {
        let nested = tx.open_nested();
        storage.insert(&Quantity::zero_of(peat()).with_value(300, &lookup), &lookup, &nested);
        nested.commit();
    }
    tx.commit();

    assert_eq!(recorder.seen.borrow().len(), 1);
    let state = recorder.seen.borrow()[0].clone();
    assert_eq!(state.current, 600);
    assert!(state.is_burning());

    assert!(storage.remove_listener(&listener));
    assert!(!storage.remove_listener(&listener));
    let tx = manager.open_outer();
    storage.insert(&Quantity::one_of(peat()), &lookup, &tx);
    tx.commit();
    assert_eq!(recorder.seen.borrow().len(), 1);
}

#[test]
fn test_snapshot_json_shape() {
    let storage = SimpleStorage::new(ResourceKind::coal());
    storage.set_max(1600);
    storage.set_current(400);

    let json = serde_json::to_value(storage.create_snapshot()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "current": 400,
            "max": 1600,
            "zero": { "fraction": 0.0, "kind": "coal" }
        })
    );
}
