//! System traits.
//!
//! A system declares a [`ComponentSet`] signature. Its per-entity hook fires
//! for every entity whose membership bitset contains the whole signature;
//! extra components on the entity do not matter. In derived mode
//! ([`System::include_derived`]) a member also counts as present when some
//! attached component exposes it as a base kind.
//!
//! The [`SystemManager`](crate::SystemManager) stores systems behind the
//! object-safe [`UpdateRunner`] / [`RenderRunner`] traits, with the signature
//! mask computed once at registration.

use std::marker::PhantomData;

use engine_component::{ComponentBitSet, ComponentSet, Entity, EntityId};

use crate::context::{RenderContext, SystemContext};

/// A behaviour unit run during the update pass.
///
/// # Examples
///
/// ```rust
/// use engine_component::{EntityId, impl_component};
/// use engine_system::{System, SystemContext};
///
/// struct Position(f32);
/// impl_component!(Position);
/// struct Speed(f32);
/// impl_component!(Speed);
///
/// struct Move;
///
/// impl System for Move {
///     type Signature = (Position, Speed);
///
///     fn for_each_with(
///         &mut self,
///         _entity: EntityId,
///         (position, speed): (&mut Position, &mut Speed),
///         ctx: &mut SystemContext<'_>,
///     ) {
///         position.0 += speed.0 * ctx.dt;
///     }
/// }
/// ```
pub trait System: 'static {
    /// Component kinds an entity must carry for the per-entity hook to fire.
    type Signature: ComponentSet;

    /// Display name used in logs.
    fn name(&self) -> String {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Gate for the whole pass. When `false`, neither `once` nor the
    /// per-entity hook run this frame.
    fn should_run(&mut self, dt: f32) -> bool {
        let _ = dt;
        true
    }

    /// Called once per frame before any per-entity call.
    fn once(&mut self, ctx: &mut SystemContext<'_>) {
        let _ = ctx;
    }

    /// Match signature members through base kinds as well as exact kinds.
    fn include_derived(&self) -> bool {
        false
    }

    /// Per-entity hook, given the signature's components.
    ///
    /// The entity itself is lent out while this runs; flag or remove it
    /// through `ctx.store` by `entity` id.
    fn for_each_with(
        &mut self,
        entity: EntityId,
        components: <Self::Signature as ComponentSet>::Muts<'_>,
        ctx: &mut SystemContext<'_>,
    ) {
        let _ = (entity, components, ctx);
    }

    /// Per-entity hook with full access to the entity. The default fetches
    /// the signature and forwards to [`System::for_each_with`].
    fn for_each(&mut self, entity: &mut Entity, ctx: &mut SystemContext<'_>) {
        let id = entity.id();
        let components = if self.include_derived() {
            Self::Signature::fetch_bases_mut(entity)
        } else {
            Self::Signature::fetch_mut(entity)
        };
        if let Some(components) = components {
            self.for_each_with(id, components, ctx);
        }
    }
}

/// A behaviour unit run during the render pass. Entities are read-only.
pub trait RenderSystem: 'static {
    /// Component kinds an entity must carry to be drawn by this system.
    type Signature: ComponentSet;

    /// Display name used in logs.
    fn name(&self) -> String {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Gate for the whole render pass of this system.
    fn should_run(&mut self, dt: f32) -> bool {
        let _ = dt;
        true
    }

    /// Called once per frame before any per-entity call.
    fn once(&mut self, ctx: &RenderContext<'_>) {
        let _ = ctx;
    }

    /// Match signature members through base kinds as well.
    fn include_derived(&self) -> bool {
        false
    }

    /// Per-entity hook, given the signature's components.
    fn for_each_with(
        &mut self,
        entity: &Entity,
        components: <Self::Signature as ComponentSet>::Refs<'_>,
        ctx: &RenderContext<'_>,
    ) {
        let _ = (entity, components, ctx);
    }

    /// Per-entity hook with the whole entity. The default fetches the
    /// signature and forwards to [`RenderSystem::for_each_with`].
    fn for_each(&mut self, entity: &Entity, ctx: &RenderContext<'_>) {
        let components = if self.include_derived() {
            Self::Signature::fetch_bases(entity)
        } else {
            Self::Signature::fetch(entity)
        };
        if let Some(components) = components {
            self.for_each_with(entity, components, ctx);
        }
    }
}

/// Object-safe view of an update system, as stored by the manager.
pub trait UpdateRunner {
    fn name(&self) -> &str;
    fn should_run(&mut self, dt: f32) -> bool;
    fn once(&mut self, ctx: &mut SystemContext<'_>);
    /// Whether the per-entity hook exists at all.
    fn visits_entities(&self) -> bool;
    fn matches(&self, entity: &Entity) -> bool;
    fn run_for(&mut self, entity: &mut Entity, ctx: &mut SystemContext<'_>);
}

/// Object-safe view of a render system.
pub trait RenderRunner {
    fn name(&self) -> &str;
    fn should_run(&mut self, dt: f32) -> bool;
    fn once(&mut self, ctx: &RenderContext<'_>);
    fn visits_entities(&self) -> bool;
    fn matches(&self, entity: &Entity) -> bool;
    fn run_for(&mut self, entity: &Entity, ctx: &RenderContext<'_>);
}

/// How a registered system decides whether an entity matches.
#[derive(Debug, Clone, Copy)]
enum Matcher<S: ComponentSet> {
    Exact(ComponentBitSet),
    Derived(PhantomData<fn() -> S>),
}

impl<S: ComponentSet> Matcher<S> {
    fn new(derived: bool) -> Self {
        if derived {
            Self::Derived(PhantomData)
        } else {
            Self::Exact(S::mask())
        }
    }

    fn matches(&self, entity: &Entity) -> bool {
        match self {
            Self::Exact(mask) => entity.membership().contains_all(mask),
            Self::Derived(_) => S::has_bases(entity),
        }
    }
}

pub(crate) struct Registered<T, S: ComponentSet> {
    name: String,
    system: T,
    matcher: Matcher<S>,
}

impl<T: System> Registered<T, T::Signature> {
    pub(crate) fn update(system: T) -> Self {
        Self {
            name: system.name(),
            matcher: Matcher::new(system.include_derived()),
            system,
        }
    }
}

impl<T: RenderSystem> Registered<T, T::Signature> {
    pub(crate) fn render(system: T) -> Self {
        Self {
            name: system.name(),
            matcher: Matcher::new(system.include_derived()),
            system,
        }
    }
}

impl<T: System> UpdateRunner for Registered<T, T::Signature> {
    fn name(&self) -> &str {
        &self.name
    }

    fn should_run(&mut self, dt: f32) -> bool {
        self.system.should_run(dt)
    }

    fn once(&mut self, ctx: &mut SystemContext<'_>) {
        self.system.once(ctx);
    }

    fn visits_entities(&self) -> bool {
        true
    }

    fn matches(&self, entity: &Entity) -> bool {
        self.matcher.matches(entity)
    }

    fn run_for(&mut self, entity: &mut Entity, ctx: &mut SystemContext<'_>) {
        self.system.for_each(entity, ctx);
    }
}

impl<T: RenderSystem> RenderRunner for Registered<T, T::Signature> {
    fn name(&self) -> &str {
        &self.name
    }

    fn should_run(&mut self, dt: f32) -> bool {
        self.system.should_run(dt)
    }

    fn once(&mut self, ctx: &RenderContext<'_>) {
        self.system.once(ctx);
    }

    fn visits_entities(&self) -> bool {
        true
    }

    fn matches(&self, entity: &Entity) -> bool {
        self.matcher.matches(entity)
    }

    fn run_for(&mut self, entity: &Entity, ctx: &RenderContext<'_>) {
        self.system.for_each(entity, ctx);
    }
}

/// A closure run once per update pass.
pub(crate) struct UpdateCallback<F> {
    pub(crate) name: String,
    pub(crate) callback: F,
}

impl<F> UpdateRunner for UpdateCallback<F>
where
    F: FnMut(&mut SystemContext<'_>),
{
    fn name(&self) -> &str {
        &self.name
    }

    fn should_run(&mut self, _dt: f32) -> bool {
        true
    }

    fn once(&mut self, ctx: &mut SystemContext<'_>) {
        (self.callback)(ctx);
    }

    fn visits_entities(&self) -> bool {
        false
    }

    fn matches(&self, _entity: &Entity) -> bool {
        false
    }

    fn run_for(&mut self, _entity: &mut Entity, _ctx: &mut SystemContext<'_>) {}
}

/// A closure run once per render pass.
pub(crate) struct RenderCallback<F> {
    pub(crate) name: String,
    pub(crate) callback: F,
}

impl<F> RenderRunner for RenderCallback<F>
where
    F: FnMut(&RenderContext<'_>),
{
    fn name(&self) -> &str {
        &self.name
    }

    fn should_run(&mut self, _dt: f32) -> bool {
        true
    }

    fn once(&mut self, ctx: &RenderContext<'_>) {
        (self.callback)(ctx);
    }

    fn visits_entities(&self) -> bool {
        false
    }

    fn matches(&self, _entity: &Entity) -> bool {
        false
    }

    fn run_for(&mut self, _entity: &Entity, _ctx: &RenderContext<'_>) {}
}

/// Strip module paths from a type name, keeping generic arguments.
///
/// `engine_system::developer::EnforceSingleton<game::Ball>` becomes
/// `EnforceSingleton<Ball>`.
#[must_use]
pub fn short_type_name(full: &str) -> String {
    let mut short = String::with_capacity(full.len());
    let mut segment = String::new();
    for ch in full.chars() {
        if matches!(ch, '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | '&' | ';') {
            short.push_str(segment.rsplit("::").next().unwrap_or(&segment));
            segment.clear();
            short.push(ch);
        } else {
            segment.push(ch);
        }
    }
    short.push_str(segment.rsplit("::").next().unwrap_or(&segment));
    if short.contains("{{closure}}") {
        return "<closure>".to_string();
    }
    short
}
