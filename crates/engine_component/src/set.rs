//! Statically typed groups of component kinds.
//!
//! A [`ComponentSet`] is a tuple of component types, `()` through eight
//! elements. Systems use one as their signature; entities use one for the
//! bulk helpers [`Entity::has_all`] and [`Entity::add_all`].

use crate::bitset::ComponentBitSet;
use crate::component::{Component, ComponentTypeId, is_a, view_as, view_as_mut};
use crate::entity::{Entity, KindMatcher};

/// A tuple of component kinds that can be fetched from an entity together.
pub trait ComponentSet: 'static {
    /// Shared references to every member, in tuple order.
    type Refs<'a>;
    /// Exclusive references to every member, in tuple order.
    type Muts<'a>;

    /// Returns the kind ids of every member, in tuple order.
    fn ids() -> Vec<ComponentTypeId>;

    /// Returns the membership mask an entity must contain to match.
    fn mask() -> ComponentBitSet {
        ComponentBitSet::from_ids(Self::ids())
    }

    /// Borrow every member by exact kind.
    fn fetch(entity: &Entity) -> Option<Self::Refs<'_>>;

    /// Mutably borrow every member by exact kind.
    ///
    /// Returns `None` if any member is missing or if the tuple names the same
    /// kind twice.
    fn fetch_mut(entity: &mut Entity) -> Option<Self::Muts<'_>>;

    /// Returns `true` if every member can be matched, exactly or as a base
    /// kind, by its own attached component. Matches iff
    /// [`fetch_bases_mut`](ComponentSet::fetch_bases_mut) succeeds.
    fn has_bases(entity: &Entity) -> bool;

    /// Borrow every member, accepting components that expose it as a base
    /// kind. The first matching component in kind-id order wins.
    fn fetch_bases(entity: &Entity) -> Option<Self::Refs<'_>>;

    /// Mutable counterpart of [`ComponentSet::fetch_bases`]. Each member is
    /// served by a distinct component.
    fn fetch_bases_mut(entity: &mut Entity) -> Option<Self::Muts<'_>>;
}

/// A [`ComponentSet`] whose members can all be default-constructed.
pub trait DefaultComponents: ComponentSet {
    /// Attach a default instance of every member the entity lacks.
    fn add_defaults(entity: &mut Entity);
}

impl ComponentSet for () {
    type Refs<'a> = ();
    type Muts<'a> = ();

    fn ids() -> Vec<ComponentTypeId> {
        Vec::new()
    }

    fn fetch(_entity: &Entity) -> Option<Self::Refs<'_>> {
        Some(())
    }

    fn fetch_mut(_entity: &mut Entity) -> Option<Self::Muts<'_>> {
        Some(())
    }

    fn has_bases(_entity: &Entity) -> bool {
        true
    }

    fn fetch_bases(_entity: &Entity) -> Option<Self::Refs<'_>> {
        Some(())
    }

    fn fetch_bases_mut(_entity: &mut Entity) -> Option<Self::Muts<'_>> {
        Some(())
    }
}

impl DefaultComponents for () {
    fn add_defaults(_entity: &mut Entity) {}
}

macro_rules! impl_component_set {
    ($($name:ident),+) => {
        impl<$($name: Component),+> ComponentSet for ($($name,)+) {
            type Refs<'a> = ($(&'a $name,)+);
            type Muts<'a> = ($(&'a mut $name,)+);

            fn ids() -> Vec<ComponentTypeId> {
                vec![$(ComponentTypeId::of::<$name>()),+]
            }

            fn fetch(entity: &Entity) -> Option<Self::Refs<'_>> {
                Some(($(entity.try_get::<$name>()?,)+))
            }

            #[allow(non_snake_case)]
            fn fetch_mut(entity: &mut Entity) -> Option<Self::Muts<'_>> {
                let [$($name),+] = entity.disjoint_mut([$(ComponentTypeId::of::<$name>()),+])?;
                Some(($($name.downcast_mut::<$name>()?,)+))
            }

            fn has_bases(entity: &Entity) -> bool {
                entity.has_disjoint_matches(&[$(is_a::<$name> as KindMatcher),+])
            }

            fn fetch_bases(entity: &Entity) -> Option<Self::Refs<'_>> {
                Some(($(entity.components().find_map(|c| view_as::<$name>(c))?,)+))
            }

            #[allow(non_snake_case)]
            fn fetch_bases_mut(entity: &mut Entity) -> Option<Self::Muts<'_>> {
                let [$($name),+] = entity.disjoint_matching_mut([$(is_a::<$name> as KindMatcher),+])?;
                Some(($(view_as_mut::<$name>($name)?,)+))
            }
        }

        impl<$($name: Component + Default),+> DefaultComponents for ($($name,)+) {
            fn add_defaults(entity: &mut Entity) {
                $(entity.add_if_missing($name::default());)+
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
impl_component_set!(A, B, C, D, E, F, G);
impl_component_set!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntityStore, impl_component};

    #[derive(Debug, Default, PartialEq)]
    struct Position(f32);
    impl_component!(Position);

    #[derive(Debug, Default, PartialEq)]
    struct Speed(f32);
    impl_component!(Speed);

    #[derive(Debug, Default)]
    struct Shape {
        sides: u32,
    }
    impl_component!(Shape);

    struct Square {
        shape: Shape,
        side: f32,
    }
    impl_component!(Square: Shape => shape);

    #[test]
    fn test_mask_matches_members() {
        let mask = <(Position, Speed)>::mask();
        assert_eq!(mask.count(), 2);
        assert!(mask.contains(ComponentTypeId::of::<Position>()));
        assert!(mask.contains(ComponentTypeId::of::<Speed>()));
        assert!(<()>::mask().is_empty());
    }

    #[test]
    fn test_fetch_mut_gives_disjoint_borrows() {
        let mut store = EntityStore::new();
        let entity = store.create();
        entity.add(Position(1.0));
        entity.add(Speed(2.0));

        let (position, speed) = <(Position, Speed)>::fetch_mut(entity).unwrap();
        position.0 += speed.0;
        assert_eq!(entity.get::<Position>(), &Position(3.0));
    }

    #[test]
    fn test_fetch_requires_every_member() {
        let mut store = EntityStore::new();
        let entity = store.create();
        entity.add(Position(1.0));
        assert!(<(Position, Speed)>::fetch(entity).is_none());
        assert!(<(Position, Speed)>::fetch_mut(entity).is_none());
        assert!(<(Position,)>::fetch(entity).is_some());
    }

    #[test]
    fn test_repeated_member_cannot_be_fetched_mutably() {
        let mut store = EntityStore::new();
        let entity = store.create();
        entity.add(Position(1.0));
        assert!(<(Position, Position)>::fetch_mut(entity).is_none());
    }

    #[test]
    fn test_fetch_bases_through_derived_component() {
        let mut store = EntityStore::new();
        let entity = store.create();
        entity.add(Square {
            shape: Shape { sides: 4 },
            side: 2.0,
        });

        assert!(!entity.has::<Shape>());
        assert!(<(Shape,)>::has_bases(entity));
        assert!(<(Shape,)>::fetch(entity).is_none());
        let (shape,) = <(Shape,)>::fetch_bases(entity).unwrap();
        assert_eq!(shape.sides, 4);

        let (shape,) = <(Shape,)>::fetch_bases_mut(entity).unwrap();
        shape.sides = 5;
        assert_eq!(entity.get::<Square>().shape.sides, 5);
        assert_eq!(entity.get::<Square>().side, 2.0);
    }

    #[test]
    fn test_fetch_bases_mut_with_overlapping_kinds() {
        struct Polygon {
            sides: u32,
        }
        impl_component!(Polygon);

        struct Triangle {
            polygon: Polygon,
        }
        impl_component!(Triangle: Polygon => polygon);

        // Triangle sorts ahead of Polygon.
        let _ = ComponentTypeId::of::<Triangle>();
        let mut store = EntityStore::new();
        let entity = store.create();
        entity.add(Polygon { sides: 4 });
        entity.add(Triangle {
            polygon: Polygon { sides: 3 },
        });

        assert!(<(Polygon, Triangle)>::has_bases(entity));
        let (polygon, triangle) = <(Polygon, Triangle)>::fetch_bases_mut(entity).unwrap();
        polygon.sides += 1;
        triangle.polygon.sides -= 1;
        assert_eq!(entity.get::<Polygon>().sides, 5);
        assert_eq!(entity.get::<Triangle>().polygon.sides, 2);
    }

    #[test]
    fn test_has_bases_rejects_one_component_for_two_slots() {
        let mut store = EntityStore::new();
        let entity = store.create();
        entity.add(Square {
            shape: Shape { sides: 4 },
            side: 1.0,
        });
        assert!(<(Shape,)>::has_bases(entity));
        assert!(!<(Shape, Square)>::has_bases(entity));
        assert!(<(Shape, Square)>::fetch_bases_mut(entity).is_none());
    }

    #[test]
    fn test_add_defaults_keeps_existing_values() {
        let mut store = EntityStore::new();
        let entity = store.create();
        entity.add(Speed(9.0));
        <(Position, Speed)>::add_defaults(entity);
        assert_eq!(entity.get::<Position>(), &Position(0.0));
        assert_eq!(entity.get::<Speed>(), &Speed(9.0));
    }
}
