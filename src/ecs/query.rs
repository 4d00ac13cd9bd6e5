//! Multi-type entity queries.
//!
//! A query names its component types as a tuple, `(Collider, Transform)`.
//! The join walks the first type's storage in insertion order and keeps the
//! entities every other storage contains, so the result order is always the
//! first-listed type's order. Storages are resolved once per query; each
//! membership test is a sparse-array lookup.

use std::any::type_name;

use super::{Component, EcsResult, Entity, Registry};

/// A fixed list of component types that can be joined on.
pub trait ComponentSet {
    /// Type names, in listed order.
    fn type_names() -> Vec<&'static str>;

    fn collect_linked(registry: &Registry) -> Vec<Entity>;

    fn count_linked(registry: &Registry) -> usize;
}

/// A component set whose members can all be default-created together.
pub trait ComponentBundle: ComponentSet {
    fn create_all(registry: &mut Registry, entity: Entity) -> EcsResult<()>;
}

// A single-type query is that storage's entity list.
impl<A: Component> ComponentSet for (A,) {
    fn type_names() -> Vec<&'static str> {
        vec![type_name::<A>()]
    }

    fn collect_linked(registry: &Registry) -> Vec<Entity> {
        registry.entity_container::<A>()
    }

    fn count_linked(registry: &Registry) -> usize {
        registry.storage::<A>().map_or(0, |storage| storage.len())
    }
}

impl<A: Component + Default> ComponentBundle for (A,) {
    fn create_all(registry: &mut Registry, entity: Entity) -> EcsResult<()> {
        registry.create_component::<A>(entity)?;
        Ok(())
    }
}

macro_rules! impl_component_set {
    (($head:ident, $head_storage:ident) $(, ($ty:ident, $storage:ident))+) => {
        impl<$head: Component, $($ty: Component),+> ComponentSet for ($head, $($ty),+) {
            fn type_names() -> Vec<&'static str> {
                vec![type_name::<$head>() $(, type_name::<$ty>())+]
            }

            fn collect_linked(registry: &Registry) -> Vec<Entity> {
                let (Some($head_storage), $(Some($storage)),+) =
                    (registry.storage::<$head>(), $(registry.storage::<$ty>()),+)
                else {
                    return Vec::new();
                };
                if $head_storage.is_empty() $(|| $storage.is_empty())+ {
                    return Vec::new();
                }
                $head_storage
                    .entities()
                    .iter()
                    .copied()
                    .filter(|&entity| $($storage.has(entity))&&+)
                    .collect()
            }

            fn count_linked(registry: &Registry) -> usize {
                let (Some($head_storage), $(Some($storage)),+) =
                    (registry.storage::<$head>(), $(registry.storage::<$ty>()),+)
                else {
                    return 0;
                };
                $head_storage
                    .entities()
                    .iter()
                    .filter(|&&entity| $($storage.has(entity))&&+)
                    .count()
            }
        }

        impl<$head: Component + Default, $($ty: Component + Default),+> ComponentBundle
            for ($head, $($ty),+)
        {
            fn create_all(registry: &mut Registry, entity: Entity) -> EcsResult<()> {
                registry.create_component::<$head>(entity)?;
                $(registry.create_component::<$ty>(entity)?;)+
                Ok(())
            }
        }
    };
}

impl_component_set!((A, a), (B, b));
impl_component_set!((A, a), (B, b), (C, c));
impl_component_set!((A, a), (B, b), (C, c), (D, d));
impl_component_set!((A, a), (B, b), (C, c), (D, d), (E, e));
impl_component_set!((A, a), (B, b), (C, c), (D, d), (E, e), (F, f));
impl_component_set!((A, a), (B, b), (C, c), (D, d), (E, e), (F, f), (G, g));
impl_component_set!((A, a), (B, b), (C, c), (D, d), (E, e), (F, f), (G, g), (H, h));

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Collider;
    impl Component for Collider {}

    #[derive(Debug, Default)]
    struct Transform;
    impl Component for Transform {}

    #[derive(Debug, Default)]
    struct Move;
    impl Component for Move {}

    fn spawn(registry: &mut Registry, count: usize) -> Vec<Entity> {
        (0..count).map(|_| registry.create_entity().unwrap()).collect()
    }

    #[test]
    fn collider_transform_move_scenario() {
        let mut registry = Registry::new();
        let entities = spawn(&mut registry, 4);
        let (e1, e2, e3) = (entities[1], entities[2], entities[3]);
        for &entity in &[e1, e2, e3] {
            registry
                .create_components::<(Collider, Transform)>(entity)
                .unwrap();
        }
        registry.create_component::<Move>(e2).unwrap();

        assert_eq!(
            registry.collect_linked::<(Collider, Transform)>(),
            vec![e1, e2, e3]
        );
        assert_eq!(
            registry.collect_linked::<(Collider, Transform, Move)>(),
            vec![e2]
        );

        registry.remove_component::<Move>(e2).unwrap();
        assert!(registry
            .collect_linked::<(Collider, Transform, Move)>()
            .is_empty());
    }

    #[test]
    fn order_follows_first_listed_type() {
        let mut registry = Registry::new();
        let entities = spawn(&mut registry, 3);
        for &entity in entities.iter().rev() {
            registry.create_component::<Transform>(entity).unwrap();
        }
        for &entity in &entities {
            registry.create_component::<Collider>(entity).unwrap();
        }

        assert_eq!(
            registry.collect_linked::<(Collider, Transform)>(),
            entities
        );
        let reversed: Vec<_> = entities.iter().rev().copied().collect();
        assert_eq!(
            registry.collect_linked::<(Transform, Collider)>(),
            reversed
        );
    }

    #[test]
    fn empty_or_unknown_storage_yields_empty_result() {
        let mut registry = Registry::new();
        let entity = registry.create_entity().unwrap();
        registry.create_component::<Collider>(entity).unwrap();

        assert!(registry.collect_linked::<(Collider, Move)>().is_empty());
        assert_eq!(registry.count_linked::<(Collider, Move)>(), 0);

        registry.create_component::<Move>(entity).unwrap();
        registry.remove_component::<Move>(entity).unwrap();
        assert!(registry.collect_linked::<(Collider, Move)>().is_empty());
    }

    #[test]
    fn single_type_query_is_the_storage_order() {
        let mut registry = Registry::new();
        let entities = spawn(&mut registry, 5);
        for &entity in [4, 0, 2].iter().map(|&i| &entities[i]) {
            registry.create_component::<Move>(entity).unwrap();
        }
        assert_eq!(
            registry.collect_linked::<(Move,)>(),
            registry.entity_container::<Move>()
        );
        assert_eq!(registry.count_linked::<(Move,)>(), 3);
    }

    #[test]
    fn type_names_follow_listed_order() {
        let names = <(Collider, Move)>::type_names();
        assert_eq!(names.len(), 2);
        assert!(names[0].ends_with("Collider"));
        assert!(names[1].ends_with("Move"));
        assert!(<(Transform,)>::type_names()[0].ends_with("Transform"));
    }
}
