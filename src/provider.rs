//! The instance source and the type-erased values it hands out.

use std::{any::Any, fmt, sync::Arc};

use crate::{
    decorate,
    error::InterceptorUnavailable,
    interceptor::{DynInterceptor, Interceptor},
    key::{InterceptorId, ShapeArgs, UnitId, UnitMeta},
    unit::{DynUnit, Unit},
};

/// Where the resolver gets instances from.
///
/// A provider only hands instances out; ownership and lifetime of what it
/// returns stay on its side of the fence. `unit` and `interceptor` look up
/// something that already exists, `construct` builds an interceptor fresh
/// against the unit's type arguments.
pub trait Provider: Send + Sync + 'static {
    fn unit(&self, id: &UnitId) -> Option<AnyUnit>;

    fn interceptor(&self, id: &InterceptorId) -> Option<AnyInterceptor>;

    fn construct(
        &self,
        id: &InterceptorId,
        args: &ShapeArgs,
    ) -> Result<AnyInterceptor, InterceptorUnavailable>;
}

/// A unit instance with its type erased, paired with its own metadata.
///
/// The metadata always describes the payload; both are captured together
/// from the same concrete type, so they cannot drift apart.
#[derive(Clone)]
pub struct AnyUnit {
    cell: Arc<dyn ErasedUnit>,
}

impl AnyUnit {
    pub fn new<M: Unit>(unit: M) -> Self {
        Self {
            cell: Arc::new(UnitCell {
                meta: UnitMeta::of::<M>(),
                unit: Arc::new(unit) as DynUnit<M::Input, M::Output>,
            }),
        }
    }

    pub fn meta(&self) -> UnitMeta {
        self.cell.meta()
    }

    pub fn id(&self) -> UnitId {
        self.cell.meta().id()
    }

    /// Recovers the typed callable, or `None` when `(I, O)` is not the
    /// shape this instance actually transforms.
    pub fn downcast<I, O>(&self) -> Option<DynUnit<I, O>>
    where
        I: Send + 'static,
        O: Send + 'static,
    {
        self.cell
            .as_any()
            .downcast_ref::<UnitCell<I, O>>()
            .map(|cell| cell.unit.clone())
    }

    /// Wraps the payload with `interceptors`, keeping the identity of this
    /// instance. The chain must already agree with the unit's shape.
    pub(crate) fn wrap(&self, interceptors: Vec<AnyInterceptor>) -> AnyUnit {
        self.cell.wrap(interceptors)
    }
}

impl fmt::Debug for AnyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnyUnit({})", self.id())
    }
}

trait ErasedUnit: Send + Sync + 'static {
    fn meta(&self) -> UnitMeta;

    fn as_any(&self) -> &(dyn Any + Send + Sync);

    fn wrap(&self, interceptors: Vec<AnyInterceptor>) -> AnyUnit;
}

struct UnitCell<I, O> {
    meta: UnitMeta,
    unit: DynUnit<I, O>,
}

impl<I, O> ErasedUnit for UnitCell<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    fn meta(&self) -> UnitMeta {
        self.meta
    }

    fn as_any(&self) -> &(dyn Any + Send + Sync) {
        self
    }

    fn wrap(&self, interceptors: Vec<AnyInterceptor>) -> AnyUnit {
        // Shape agreement was checked upstream; anything foreign would
        // fail its downcast and fall out of the chain here.
        let chain: Vec<DynInterceptor<I, O>> = interceptors
            .iter()
            .filter_map(|interceptor| interceptor.downcast::<I, O>())
            .collect();

        AnyUnit {
            cell: Arc::new(UnitCell {
                meta: self.meta,
                unit: decorate::wrap(self.unit.clone(), chain),
            }),
        }
    }
}

/// An interceptor instance with its type erased, paired with the identifier
/// it was registered under and the shape it hooks.
#[derive(Clone)]
pub struct AnyInterceptor {
    cell: Arc<dyn ErasedInterceptor>,
}

impl AnyInterceptor {
    /// Erases a concrete interceptor under its own type's identifier.
    pub fn new<I, O, T>(interceptor: T) -> Self
    where
        T: Interceptor<I, O>,
        I: Send + 'static,
        O: Send + 'static,
    {
        Self::from_dyn(InterceptorId::of::<T>(), Arc::new(interceptor))
    }

    /// Erases an already shared interceptor under an explicit identifier.
    /// This is how factory output is labeled with the bound kind it was
    /// built for.
    pub fn from_dyn<I, O>(id: InterceptorId, interceptor: DynInterceptor<I, O>) -> Self
    where
        I: Send + 'static,
        O: Send + 'static,
    {
        Self {
            cell: Arc::new(InterceptorCell {
                id,
                args: ShapeArgs::of::<I, O>(),
                interceptor,
            }),
        }
    }

    pub fn id(&self) -> InterceptorId {
        self.cell.id()
    }

    /// The shape this instance hooks, captured from its real types.
    pub fn args(&self) -> ShapeArgs {
        self.cell.args()
    }

    pub(crate) fn downcast<I, O>(&self) -> Option<DynInterceptor<I, O>>
    where
        I: Send + 'static,
        O: Send + 'static,
    {
        self.cell
            .as_any()
            .downcast_ref::<InterceptorCell<I, O>>()
            .map(|cell| cell.interceptor.clone())
    }
}

impl fmt::Debug for AnyInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnyInterceptor({})", self.id())
    }
}

trait ErasedInterceptor: Send + Sync + 'static {
    fn id(&self) -> InterceptorId;

    fn args(&self) -> ShapeArgs;

    fn as_any(&self) -> &(dyn Any + Send + Sync);
}

struct InterceptorCell<I, O> {
    id: InterceptorId,
    args: ShapeArgs,
    interceptor: DynInterceptor<I, O>,
}

impl<I, O> ErasedInterceptor for InterceptorCell<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    fn id(&self) -> InterceptorId {
        self.id
    }

    fn args(&self) -> ShapeArgs {
        self.args
    }

    fn as_any(&self) -> &(dyn Any + Send + Sync) {
        self
    }
}
