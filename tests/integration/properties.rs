//! Property tests over randomized registry operations.

use std::collections::HashMap;

use proptest::prelude::*;
use tessera::foundation::Entity;
use tessera::storage::Registry;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Red(u32);

#[derive(Debug, Clone, Copy, PartialEq)]
struct Blue(u32);

#[derive(Debug, Clone)]
enum Op {
    Create,
    Destroy(usize),
    Despawn(usize),
    AttachRed(usize, u32),
    AttachBlue(usize, u32),
    DetachRed(usize),
    DetachBlue(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Create),
        1 => any::<usize>().prop_map(Op::Destroy),
        1 => any::<usize>().prop_map(Op::Despawn),
        3 => (any::<usize>(), any::<u32>()).prop_map(|(i, v)| Op::AttachRed(i, v)),
        3 => (any::<usize>(), any::<u32>()).prop_map(|(i, v)| Op::AttachBlue(i, v)),
        1 => any::<usize>().prop_map(Op::DetachRed),
        1 => any::<usize>().prop_map(Op::DetachBlue),
    ]
}

/// Reference model: live handles and their components.
#[derive(Default)]
struct Model {
    live: Vec<Entity>,
    red: HashMap<Entity, u32>,
    blue: HashMap<Entity, u32>,
}

impl Model {
    fn pick(&self, i: usize) -> Option<Entity> {
        (!self.live.is_empty()).then(|| self.live[i % self.live.len()])
    }

    fn kill(&mut self, e: Entity) {
        self.live.retain(|&x| x != e);
        self.red.remove(&e);
        self.blue.remove(&e);
    }
}

proptest! {
    #[test]
    fn registry_matches_model(ops in prop::collection::vec(op(), 1..300)) {
        let mut registry = Registry::new();
        let mut model = Model::default();
        let mut dead: Vec<Entity> = Vec::new();

        for op in ops {
            match op {
                Op::Create => {
                    let e = registry.create();
                    prop_assert!(!model.live.contains(&e));
                    model.live.push(e);
                }
                Op::Destroy(i) => if let Some(e) = model.pick(i) {
                    registry.destroy(e);
                    model.kill(e);
                    dead.push(e);
                },
                Op::Despawn(i) => if let Some(e) = model.pick(i) {
                    registry.despawn(e);
                    model.kill(e);
                    dead.push(e);
                },
                Op::AttachRed(i, v) => if let Some(e) = model.pick(i) {
                    registry.set(e, Red(v));
                    model.red.insert(e, v);
                },
                Op::AttachBlue(i, v) => if let Some(e) = model.pick(i) {
                    registry.set(e, Blue(v));
                    model.blue.insert(e, v);
                },
                Op::DetachRed(i) => if let Some(e) = model.pick(i) {
                    prop_assert_eq!(registry.try_remove::<Red>(e).map(|r| r.0), model.red.remove(&e));
                },
                Op::DetachBlue(i) => if let Some(e) = model.pick(i) {
                    prop_assert_eq!(registry.try_remove::<Blue>(e).map(|b| b.0), model.blue.remove(&e));
                },
            }

            prop_assert_eq!(registry.alive(), model.live.len());
            for &e in &model.live {
                prop_assert!(registry.valid(e));
                prop_assert_eq!(registry.try_get::<Red>(e).map(|r| r.0), model.red.get(&e).copied());
                prop_assert_eq!(registry.try_get::<Blue>(e).map(|b| b.0), model.blue.get(&e).copied());
            }
            for &e in &dead {
                if !model.live.contains(&e) {
                    prop_assert!(!registry.has::<Red>(e));
                }
            }
        }

        let mut viewed: Vec<Entity> = registry.view::<(Red, Blue)>().iter().collect();
        viewed.sort();
        let mut expected: Vec<Entity> = model
            .live
            .iter()
            .copied()
            .filter(|e| model.red.contains_key(e) && model.blue.contains_key(e))
            .collect();
        expected.sort();
        prop_assert_eq!(viewed, expected);
    }
}
