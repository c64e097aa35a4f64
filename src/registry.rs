//! Bindings between interceptors and the units they apply to.

use std::collections::HashMap;

use crate::{
    key::{InterceptorId, UnitId},
    unit::Unit,
};

/// The target a binding applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundTarget {
    /// Every unit.
    Global,
    /// One unit, named by its identifier.
    Unit(UnitId),
}

/// One recorded fact: this interceptor applies to that target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Binding {
    target: BoundTarget,
    interceptor: InterceptorId,
}

impl Binding {
    pub fn new(target: BoundTarget, interceptor: InterceptorId) -> Self {
        Self {
            target,
            interceptor,
        }
    }

    /// Binds `interceptor` to every unit.
    pub fn global(interceptor: InterceptorId) -> Self {
        Self::new(BoundTarget::Global, interceptor)
    }

    /// Binds `interceptor` to the unit identified by `unit`.
    pub fn unit(unit: UnitId, interceptor: InterceptorId) -> Self {
        Self::new(BoundTarget::Unit(unit), interceptor)
    }

    /// Binds `interceptor` to the unit implemented by `M`.
    pub fn for_unit<M: Unit>(interceptor: InterceptorId) -> Self {
        Self::unit(UnitId::of::<M>(), interceptor)
    }

    pub fn target(&self) -> BoundTarget {
        self.target
    }

    pub fn interceptor(&self) -> InterceptorId {
        self.interceptor
    }
}

/// Append-only index from binding target to the interceptors bound to it.
///
/// The registry stores identifiers, never instances; materialization is the
/// resolver's business. Within a target, registration order is the order
/// hooks will later run in.
#[derive(Debug, Default)]
pub struct InterceptorRegistry {
    index: HashMap<BoundTarget, Vec<InterceptorId>>,
}

impl InterceptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records bindings. Later calls append to a target's existing list
    /// rather than replace it, and duplicates are kept as given.
    pub fn register<B>(&mut self, bindings: B)
    where
        B: IntoIterator<Item = Binding>,
    {
        for binding in bindings {
            self.index
                .entry(binding.target())
                .or_default()
                .push(binding.interceptor());
        }
    }

    /// The interceptors that apply to `unit`: global ones first, then the
    /// ones bound to it specifically, each in registration order.
    pub fn effective_interceptors(&self, unit: &UnitId) -> Vec<InterceptorId> {
        let mut effective = Vec::new();
        if let Some(global) = self.index.get(&BoundTarget::Global) {
            effective.extend_from_slice(global);
        }
        if let Some(specific) = self.index.get(&BoundTarget::Unit(*unit)) {
            effective.extend_from_slice(specific);
        }
        effective
    }

    /// Whether anything at all applies to `unit`. Does not allocate.
    pub fn has_interceptors(&self, unit: &UnitId) -> bool {
        let bound = |target: &BoundTarget| self.index.get(target).is_some_and(|ids| !ids.is_empty());
        bound(&BoundTarget::Global) || bound(&BoundTarget::Unit(*unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UnitA;
    struct UnitB;
    struct First;
    struct Second;
    struct Third;

    #[test]
    fn global_interceptors_come_before_specific_ones() {
        let mut registry = InterceptorRegistry::new();
        registry.register([
            Binding::unit(UnitId::of::<UnitA>(), InterceptorId::of::<Second>()),
            Binding::global(InterceptorId::of::<First>()),
            Binding::unit(UnitId::of::<UnitA>(), InterceptorId::of::<Third>()),
        ]);

        assert_eq!(
            registry.effective_interceptors(&UnitId::of::<UnitA>()),
            vec![
                InterceptorId::of::<First>(),
                InterceptorId::of::<Second>(),
                InterceptorId::of::<Third>(),
            ]
        );
    }

    #[test]
    fn later_registrations_append() {
        let mut registry = InterceptorRegistry::new();
        registry.register([Binding::global(InterceptorId::of::<First>())]);
        registry.register([Binding::global(InterceptorId::of::<Second>())]);
        registry.register([Binding::global(InterceptorId::of::<First>())]);

        // Duplicates are the caller's decision to make.
        assert_eq!(
            registry.effective_interceptors(&UnitId::of::<UnitA>()),
            vec![
                InterceptorId::of::<First>(),
                InterceptorId::of::<Second>(),
                InterceptorId::of::<First>(),
            ]
        );
    }

    #[test]
    fn targets_do_not_leak_into_each_other() {
        let mut registry = InterceptorRegistry::new();
        registry.register([Binding::unit(
            UnitId::of::<UnitA>(),
            InterceptorId::of::<First>(),
        )]);

        assert!(registry.effective_interceptors(&UnitId::of::<UnitB>()).is_empty());
        assert!(registry.has_interceptors(&UnitId::of::<UnitA>()));
        assert!(!registry.has_interceptors(&UnitId::of::<UnitB>()));
    }

    #[test]
    fn empty_registry_reports_nothing() {
        let registry = InterceptorRegistry::new();
        assert!(registry.effective_interceptors(&UnitId::of::<UnitA>()).is_empty());
        assert!(!registry.has_interceptors(&UnitId::of::<UnitA>()));
    }
}
