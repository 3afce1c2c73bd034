//! Integration tests for the sparse set
//!
//! Tests dense packing, swap-pop erasure, and full-key membership.

use tessera_foundation::{Entity, ErrorKind};
use tessera_storage::SparseSet;

#[test]
fn packed_array_is_dense() {
    let mut set = SparseSet::new();
    for key in [1_000usize, 5, 77, 300_000] {
        set.insert(key).unwrap();
    }

    assert_eq!(set.len(), 4);
    assert_eq!(set.as_slice(), &[1_000, 5, 77, 300_000]);
    assert!(set.iter().all(|key| set.contains(key)));
}

#[test]
fn erase_moves_last_key_into_hole() {
    let mut set = SparseSet::new();
    for key in 0u32..5 {
        set.insert(key).unwrap();
    }

    let hole = set.erase(0).unwrap();
    assert_eq!(hole, 0);
    assert_eq!(set.get(0), Some(4));
    assert_eq!(set.index(4), Some(0));
    assert_eq!(set.len(), 4);
}

#[test]
fn insert_erase_insert_again() {
    let mut set = SparseSet::new();
    set.insert(9u32).unwrap();
    set.erase(9).unwrap();
    assert!(!set.contains(9));
    assert_eq!(set.insert(9).unwrap(), 0);
}

#[test]
fn duplicate_and_missing_keys() {
    let mut set: SparseSet<u32> = SparseSet::new();
    set.insert(1).unwrap();

    assert!(matches!(
        set.insert(1).unwrap_err().kind,
        ErrorKind::KeyAlreadyPresent { key: 1 }
    ));
    assert!(matches!(
        set.erase(2).unwrap_err().kind,
        ErrorKind::KeyNotFound { key: 2 }
    ));
}

#[test]
fn entity_keys_compare_generation() {
    let mut set = SparseSet::new();
    set.insert(Entity::new(4, 0)).unwrap();

    assert!(set.contains(Entity::new(4, 0)));
    assert!(!set.contains(Entity::new(4, 1)));
    assert_eq!(set.occupant(Entity::new(4, 1)), Some(Entity::new(4, 0)));
    assert_eq!(set.occupant(Entity::new(5, 0)), None);
}
