//! Turning identifiers into ready-to-run callables.

use std::sync::Arc;

use crate::{
    error::{InterceptorUnavailable, ResolveError},
    key::{InterceptorId, ShapeIndex, UnitId, UnitMeta},
    provider::{AnyInterceptor, AnyUnit, Provider},
    registry::InterceptorRegistry,
    unit::{DynUnit, Unit},
};

/// What to do when a bound interceptor cannot be produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OnUnavailable {
    /// Drop it from the chain and keep going. Every drop is reported
    /// through `tracing` at warn level, never silently.
    #[default]
    Skip,
    /// Abort the resolution with [`ResolveError::Interceptor`].
    Fail,
}

/// Resolves units and wraps them with their effective interceptors.
///
/// The resolver owns no instances. It classifies an identifier against the
/// shape index, fetches the base unit from the provider, asks the registry
/// which interceptors apply, materializes them, and hands back the wrapped
/// callable. All of that is read-only, so one resolver can serve any number
/// of threads.
pub struct Resolver<P> {
    provider: Arc<P>,
    shapes: Arc<ShapeIndex>,
    registry: Arc<InterceptorRegistry>,
    on_unavailable: OnUnavailable,
}

impl<P> Clone for Resolver<P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            shapes: self.shapes.clone(),
            registry: self.registry.clone(),
            on_unavailable: self.on_unavailable,
        }
    }
}

impl<P: Provider> Resolver<P> {
    pub fn new(
        provider: Arc<P>,
        shapes: Arc<ShapeIndex>,
        registry: Arc<InterceptorRegistry>,
    ) -> Self {
        Self {
            provider,
            shapes,
            registry,
            on_unavailable: OnUnavailable::default(),
        }
    }

    /// Sets the policy for interceptors that cannot be produced.
    pub fn on_unavailable(mut self, policy: OnUnavailable) -> Self {
        self.on_unavailable = policy;
        self
    }

    /// Resolves the unit implemented by `M`, wrapped with whatever applies
    /// to it.
    pub fn resolve<M: Unit>(&self) -> Result<DynUnit<M::Input, M::Output>, ResolveError> {
        let id = UnitId::of::<M>();
        let resolved = self.resolve_dyn(&id)?;
        resolved
            .downcast::<M::Input, M::Output>()
            .ok_or(ResolveError::ShapeMismatch { id })
    }

    /// Resolves whichever unit the provider has for the `I -> O`
    /// transformation, without naming its implementation.
    pub fn resolve_transform<I, O>(&self) -> Result<DynUnit<I, O>, ResolveError>
    where
        I: Send + 'static,
        O: Send + 'static,
    {
        let id = UnitId::transform::<I, O>();
        let resolved = self.resolve_dyn(&id)?;
        resolved
            .downcast::<I, O>()
            .ok_or(ResolveError::ShapeMismatch { id })
    }

    /// Resolution by dynamic identifier, returning the erased instance.
    pub fn resolve_dyn(&self, id: &UnitId) -> Result<AnyUnit, ResolveError> {
        if !self.shapes.recognizes(id) {
            return Err(ResolveError::ShapeNotRecognized { id: *id });
        }

        let base = self
            .provider
            .unit(id)
            .ok_or(ResolveError::UnitNotFound { id: *id })?;

        // Interceptors bind to what the instance is, not to what the
        // caller asked for; a shape lookup still lands on the concrete
        // unit's bindings.
        let meta = base.meta();

        let bound = self.registry.effective_interceptors(&meta.id());
        if bound.is_empty() {
            tracing::debug!(unit = %meta.id(), "resolved without interceptors");
            return Ok(base);
        }

        let mut applied = Vec::with_capacity(bound.len());
        for interceptor in bound {
            let target = interceptor.instantiate(meta.args());
            match self.materialize(&target, &meta) {
                Ok(instance) => applied.push(instance),
                Err(cause) => match self.on_unavailable {
                    OnUnavailable::Skip => {
                        tracing::warn!(
                            unit = %meta.id(),
                            interceptor = %interceptor,
                            error = %cause,
                            "skipping unavailable interceptor",
                        );
                    }
                    OnUnavailable::Fail => {
                        return Err(ResolveError::Interceptor {
                            unit: meta.id(),
                            interceptor,
                            source: cause,
                        });
                    }
                },
            }
        }

        tracing::debug!(
            unit = %meta.id(),
            interceptors = applied.len(),
            "resolved with interceptors",
        );
        Ok(base.wrap(applied))
    }

    fn materialize(
        &self,
        id: &InterceptorId,
        meta: &UnitMeta,
    ) -> Result<AnyInterceptor, InterceptorUnavailable> {
        let instance = match self.provider.interceptor(id) {
            Some(instance) => instance,
            None => self.provider.construct(id, &meta.args())?,
        };

        if instance.args() != meta.args() {
            return Err(InterceptorUnavailable::ArgsMismatch {
                id: *id,
                expected: meta.args(),
                found: instance.args(),
            });
        }

        Ok(instance)
    }
}
