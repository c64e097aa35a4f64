//! A ready-made in-memory provider, filled once at startup.

use std::{collections::HashMap, sync::Arc};

use crate::{
    error::{BoxError, InterceptorUnavailable},
    interceptor::{DynInterceptor, Interceptor},
    key::{InterceptorId, ShapeArgs, ShapeIndex, UnitId},
    provider::{AnyInterceptor, AnyUnit, Provider},
    registry::{Binding, BoundTarget},
    unit::Unit,
};

type InterceptorFactory = Box<dyn Fn() -> Result<AnyInterceptor, BoxError> + Send + Sync>;

/// In-memory [`Provider`]: pre-built units and interceptors plus
/// construct-on-demand factories, all registered through
/// [`Catalog::builder`] before anything resolves.
pub struct Catalog {
    units: HashMap<UnitId, AnyUnit>,
    by_args: HashMap<ShapeArgs, UnitId>,
    newest: Option<UnitId>,
    interceptors: HashMap<InterceptorId, AnyInterceptor>,
    factories: HashMap<InterceptorId, InterceptorFactory>,
    shapes: Arc<ShapeIndex>,
    bindings: Vec<Binding>,
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Every unit shape this catalog knows. This is the index a resolver
    /// classifies identifiers against.
    pub fn shape_index(&self) -> Arc<ShapeIndex> {
        self.shapes.clone()
    }

    /// The bindings declared while building, in declaration order, ready to
    /// feed into an `InterceptorRegistry`.
    pub fn bindings(&self) -> impl Iterator<Item = Binding> + '_ {
        self.bindings.iter().copied()
    }
}

impl Provider for Catalog {
    fn unit(&self, id: &UnitId) -> Option<AnyUnit> {
        match id {
            UnitId::Concrete(_) => self.units.get(id).cloned(),
            UnitId::Shape(Some(args)) => self
                .by_args
                .get(args)
                .and_then(|unit| self.units.get(unit))
                .cloned(),
            UnitId::Shape(None) => self
                .newest
                .as_ref()
                .and_then(|unit| self.units.get(unit))
                .cloned(),
        }
    }

    fn interceptor(&self, id: &InterceptorId) -> Option<AnyInterceptor> {
        self.interceptors.get(id).cloned()
    }

    fn construct(
        &self,
        id: &InterceptorId,
        args: &ShapeArgs,
    ) -> Result<AnyInterceptor, InterceptorUnavailable> {
        let factory = self
            .factories
            .get(id)
            .ok_or(InterceptorUnavailable::NoFactory { id: *id })?;

        let built = factory().map_err(|source| InterceptorUnavailable::Construction {
            id: *id,
            source,
        })?;

        // A factory mis-registered under the wrong shape surfaces here
        // rather than as a silent downcast failure later.
        if built.args() != *args {
            return Err(InterceptorUnavailable::ArgsMismatch {
                id: *id,
                expected: *args,
                found: built.args(),
            });
        }

        Ok(built)
    }
}

/// Builder for [`Catalog`]. All registration happens here; the catalog
/// itself is immutable and shareable.
#[derive(Default)]
pub struct CatalogBuilder {
    units: HashMap<UnitId, AnyUnit>,
    by_args: HashMap<ShapeArgs, UnitId>,
    newest: Option<UnitId>,
    interceptors: HashMap<InterceptorId, AnyInterceptor>,
    factories: HashMap<InterceptorId, InterceptorFactory>,
    shapes: ShapeIndex,
    bindings: Vec<Binding>,
}

impl CatalogBuilder {
    /// Registers a unit instance under its concrete identity and its shape.
    /// When several units share a shape, the newest one answers shape
    /// lookups.
    pub fn unit<M: Unit>(mut self, unit: M) -> Self {
        let erased = AnyUnit::new(unit);
        let meta = erased.meta();
        self.shapes.insert::<M>();
        self.by_args.insert(meta.args(), meta.id());
        self.newest = Some(meta.id());
        tracing::debug!(unit = %meta.id(), shape = %meta.args(), "registered unit");
        self.units.insert(meta.id(), erased);
        self
    }

    /// Registers a pre-built interceptor under its own type's identifier.
    pub fn interceptor<I, O, T>(mut self, interceptor: T) -> Self
    where
        T: Interceptor<I, O>,
        I: Send + 'static,
        O: Send + 'static,
    {
        let erased = AnyInterceptor::new::<I, O, T>(interceptor);
        tracing::debug!(interceptor = %erased.id(), shape = %erased.args(), "registered interceptor");
        self.interceptors.insert(erased.id(), erased);
        self
    }

    /// Registers a factory producing `id` at the `(I, O)` shape. An open
    /// identifier is stored already instantiated against those types, which
    /// is the exact key the resolver will construct it under.
    pub fn factory<I, O, F>(mut self, id: InterceptorId, factory: F) -> Self
    where
        I: Send + 'static,
        O: Send + 'static,
        F: Fn() -> Result<DynInterceptor<I, O>, BoxError> + Send + Sync + 'static,
    {
        let key = id.instantiate(ShapeArgs::of::<I, O>());
        tracing::debug!(interceptor = %key, "registered interceptor factory");
        self.factories.insert(
            key,
            Box::new(move || factory().map(|built| AnyInterceptor::from_dyn(key, built))),
        );
        self
    }

    /// Declares that `interceptor` applies to `target`.
    pub fn bind(mut self, target: BoundTarget, interceptor: InterceptorId) -> Self {
        self.bindings.push(Binding::new(target, interceptor));
        self
    }

    /// Declares that `interceptor` applies to every unit.
    pub fn bind_global(self, interceptor: InterceptorId) -> Self {
        self.bind(BoundTarget::Global, interceptor)
    }

    /// Declares that `interceptor` applies to the unit implemented by `M`.
    pub fn bind_unit<M: Unit>(self, interceptor: InterceptorId) -> Self {
        self.bind(BoundTarget::Unit(UnitId::of::<M>()), interceptor)
    }

    pub fn build(self) -> Catalog {
        Catalog {
            units: self.units,
            by_args: self.by_args,
            newest: self.newest,
            interceptors: self.interceptors,
            factories: self.factories,
            shapes: Arc::new(self.shapes),
            bindings: self.bindings,
        }
    }
}
