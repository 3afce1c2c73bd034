//! Integration tests for the registry
//!
//! Tests lazy pools, component attach/detach, lifecycle cleanup, and error reporting.

use tessera_foundation::{Entity, ErrorKind};
use tessera_storage::{Registry, RegistryConfig};

#[derive(Debug, Clone, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, PartialEq)]
struct Health(i32);

#[derive(Debug, Clone, PartialEq)]
struct Player;

// =============================================================================
// Component Operations
// =============================================================================

#[test]
fn attach_read_write_detach() {
    let mut registry = Registry::new();
    let e = registry.create();

    registry.emplace(e, Position { x: 1.0, y: 2.0 });
    registry.emplace(e, Health(10));

    registry.get_mut::<Health>(e).0 -= 3;
    assert_eq!(registry.get::<Health>(e), &Health(7));
    assert_eq!(registry.get::<Position>(e), &Position { x: 1.0, y: 2.0 });

    assert_eq!(registry.remove::<Health>(e), Health(7));
    assert!(!registry.has::<Health>(e));
    assert!(registry.has::<Position>(e));
}

#[test]
fn try_variants_return_none() {
    let mut registry = Registry::new();
    let e = registry.create();

    assert_eq!(registry.try_get::<Health>(e), None);
    assert_eq!(registry.try_get_mut::<Health>(e), None);
    assert_eq!(registry.try_remove::<Health>(e), None);

    let bogus = Entity::new(99, 0);
    assert_eq!(registry.try_get::<Health>(bogus), None);
    assert!(!registry.has::<Health>(bogus));
}

#[test]
fn erase_reports_why() {
    let mut registry = Registry::new();
    let e = registry.create();

    let err = registry.erase::<Health>(e).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ComponentNotFound { .. }));
    assert!(format!("{err}").contains("Health"));

    registry.destroy(e);
    let err = registry.erase::<Health>(e).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::StaleEntity(_)));

    let err = registry.erase::<Health>(Entity::new(77, 0)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::EntityNotFound(_)));
}

#[test]
#[should_panic(expected = "component already present")]
fn emplace_twice_panics() {
    let mut registry = Registry::new();
    let e = registry.create();
    registry.emplace(e, Player);
    registry.emplace(e, Player);
}

#[test]
#[should_panic(expected = "stale entity reference")]
fn set_on_stale_entity_panics() {
    let mut registry = Registry::new();
    let e = registry.create();
    registry.destroy(e);
    registry.create();
    registry.set(e, Player);
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn destroy_then_despawn_semantics() {
    let mut registry = Registry::new();
    let kept = registry.create();
    let despawned = registry.create();
    registry.emplace(kept, Health(1));
    registry.emplace(despawned, Health(2));
    registry.emplace(despawned, Player);

    assert_eq!(registry.despawn(despawned), 2);
    assert_eq!(registry.len_of::<Health>(), 1);
    assert_eq!(registry.len_of::<Player>(), 0);

    registry.destroy(kept);
    // Plain destroy leaves the component in place, but out of reach.
    assert_eq!(registry.len_of::<Health>(), 1);
    assert_eq!(registry.try_get::<Health>(kept), None);
}

#[test]
fn recycled_index_starts_without_components() {
    let mut registry = Registry::new();
    let old = registry.create();
    registry.emplace(old, Health(5));
    registry.emplace(old, Player);
    registry.destroy(old);

    let new = registry.create();
    assert_eq!(new.index, old.index);
    assert!(registry.orphan(new));

    registry.set(new, Health(9));
    assert_eq!(registry.get::<Health>(new), &Health(9));
    assert_eq!(registry.len_of::<Health>(), 1);
    // The stale Player is still parked in its pool until that slot is reused.
    assert_eq!(registry.len_of::<Player>(), 1);
    assert!(!registry.has::<Player>(new));
}

#[test]
fn leftover_component_does_not_survive_generation_wrap() {
    let mut registry = Registry::new();
    let old = registry.create();
    registry.emplace(old, Health(7));
    registry.destroy(old);

    let mut e = registry.create();
    for _ in 0..4095 {
        registry.destroy(e);
        e = registry.create();
    }

    // Same index and generation as `old`: the handle itself repeats.
    assert_eq!(e, old);
    assert!(registry.orphan(e));
    assert_eq!(registry.try_get::<Health>(e), None);
    assert_eq!(registry.len_of::<Health>(), 0);
    assert_eq!(registry.view::<(Health,)>().iter().count(), 0);
}

#[test]
fn clear_resets_entities_but_keeps_types() {
    let mut registry = Registry::new();
    let health = registry.register::<Health>();
    let e = registry.create();
    registry.emplace(e, Health(1));

    registry.clear();

    assert_eq!(registry.alive(), 0);
    assert_eq!(registry.entities().count(), 0);
    assert_eq!(registry.component_id::<Health>(), Some(health));
    assert_eq!(registry.len_of::<Health>(), 0);
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn preallocated_registry_behaves_normally() {
    let mut registry = Registry::with_config(RegistryConfig::preallocated(256));
    let entities: Vec<Entity> = (0..300).map(|_| registry.create()).collect();
    for &e in &entities {
        registry.emplace(e, Position { x: 0.0, y: 0.0 });
    }
    assert_eq!(registry.len_of::<Position>(), 300);
    assert_eq!(registry.allocator().len(), 300);
}

#[test]
fn entity_limit_from_config() {
    let mut registry = Registry::with_config(RegistryConfig::default().with_max_entities(1));
    registry.create();
    assert!(matches!(
        registry.try_create().unwrap_err().kind,
        ErrorKind::CapacityExhausted { limit: 1 }
    ));
}

#[test]
fn component_table_is_visible() {
    let mut registry = Registry::new();
    registry.register::<Player>();
    registry.register::<Health>();

    let names: Vec<&str> = registry.components().iter().map(|info| info.name).collect();
    assert!(names[0].ends_with("Player"));
    assert!(names[1].ends_with("Health"));
}
