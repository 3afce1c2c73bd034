//! Integration tests for views
//!
//! Tests intersection, driver selection, bidirectional iteration, and mutable views.

use tessera_foundation::{Entity, ErrorKind};
use tessera_storage::Registry;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Position(i32, i32);

#[derive(Debug, Clone, Copy, PartialEq)]
struct Velocity(i32, i32);

#[derive(Debug, Clone, Copy, PartialEq)]
struct Sleeping;

fn sorted(mut entities: Vec<Entity>) -> Vec<Entity> {
    entities.sort();
    entities
}

// =============================================================================
// Shared Views
// =============================================================================

#[test]
fn view_lists_entities_with_all_types() {
    let mut registry = Registry::new();
    let moving = registry.create();
    let still = registry.create();
    let ghost = registry.create();
    registry.emplace(moving, Position(0, 0));
    registry.emplace(moving, Velocity(1, 1));
    registry.emplace(still, Position(5, 5));
    registry.emplace(ghost, Velocity(9, 9));

    let view = registry.view::<(Position, Velocity)>();
    assert_eq!(view.iter().collect::<Vec<_>>(), vec![moving]);
    assert!(view.contains(moving));
    assert!(!view.contains(still));
    assert!(!view.contains(ghost));
}

#[test]
fn view_is_order_independent() {
    let mut registry = Registry::new();
    for i in 0..10 {
        let e = registry.create();
        if i % 2 == 0 {
            registry.emplace(e, Position(i, 0));
        }
        if i % 3 == 0 {
            registry.emplace(e, Velocity(0, i));
        }
    }

    let ab = sorted(registry.view::<(Position, Velocity)>().iter().collect());
    let ba = sorted(registry.view::<(Velocity, Position)>().iter().collect());
    assert_eq!(ab, ba);
    assert_eq!(ab.len(), 2);
}

#[test]
fn for_loop_over_view() {
    let mut registry = Registry::new();
    for i in 0..4 {
        let e = registry.create();
        registry.emplace(e, Position(i, i));
    }

    let view = registry.view::<(Position,)>();
    let mut total = 0;
    for e in view {
        total += view.get(e).0.0;
    }
    assert_eq!(total, 6);
}

#[test]
fn view_with_unknown_type_is_empty() {
    let mut registry = Registry::new();
    let e = registry.create();
    registry.emplace(e, Position(0, 0));

    let view = registry.view::<(Position, Sleeping)>();
    assert!(view.is_empty());
    assert_eq!(view.iter().next_back(), None);
    // The shared view never creates pools.
    assert!(registry.pool::<Sleeping>().is_none());
}

#[test]
#[should_panic(expected = "Sleeping")]
fn get_names_missing_component() {
    let mut registry = Registry::new();
    let e = registry.create();
    registry.emplace(e, Position(0, 0));
    registry.register::<Sleeping>();

    let _ = registry.view::<(Position, Sleeping)>().get(e);
}

#[test]
fn components_iterator_yields_items() {
    let mut registry = Registry::new();
    let e = registry.create();
    registry.emplace(e, Position(3, 4));
    registry.emplace(e, Velocity(1, 0));

    let items: Vec<_> = registry.view::<(Position, Velocity)>().components().collect();
    assert_eq!(items, vec![(e, (&Position(3, 4), &Velocity(1, 0)))]);
}

// =============================================================================
// Mutable Views
// =============================================================================

#[test]
fn view_mut_moves_entities() {
    let mut registry = Registry::new();
    let a = registry.create();
    let b = registry.create();
    registry.emplace(a, Position(0, 0));
    registry.emplace(a, Velocity(2, 3));
    registry.emplace(b, Position(10, 10));

    for _ in 0..3 {
        registry
            .view_mut::<(Position, Velocity)>()
            .for_each(|_, (position, velocity)| {
                position.0 += velocity.0;
                position.1 += velocity.1;
            });
    }

    assert_eq!(registry.get::<Position>(a), &Position(6, 9));
    assert_eq!(registry.get::<Position>(b), &Position(10, 10));
}

#[test]
fn view_mut_skips_destroyed_entities() {
    let mut registry = Registry::new();
    let alive = registry.create();
    let dead = registry.create();
    for e in [alive, dead] {
        registry.emplace(e, Position(0, 0));
    }
    registry.destroy(dead);

    let mut visited = Vec::new();
    registry
        .view_mut::<(Position,)>()
        .for_each(|e, (position,)| {
            position.0 = 1;
            visited.push(e);
        });
    assert_eq!(visited, vec![alive]);
}

#[test]
fn view_mut_duplicate_type_fails() {
    let mut registry = Registry::new();
    let err = registry
        .try_view_mut::<(Velocity, Position, Velocity)>()
        .unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::DuplicateViewComponent { component } if component.ends_with("Velocity")
    ));
}
