//! interpose: interceptor-aware resolution for async transformation units.
//!
//! Units transform an input into an output and hand control to a
//! continuation. Interceptors hook the moments before and after a unit
//! runs. This crate keeps the two apart until resolution time: bindings are
//! recorded in a registry, instances live in a provider, and a [`Resolver`]
//! assembles the wrapped callable on demand.
//!
//! ```
//! use std::sync::Arc;
//!
//! use interpose::{
//!     ActionUnit, Catalog, InterceptorId, InterceptorRegistry, Logging, LoggingInterceptor,
//!     Next, Resolver,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Catalog::builder()
//!     .unit(ActionUnit::<i32, i32, _>::new(|n| println!("seen {n}")))
//!     .factory::<i32, i32, _>(InterceptorId::open::<Logging>(), || {
//!         Ok(Arc::new(LoggingInterceptor::new()))
//!     })
//!     .bind_global(InterceptorId::open::<Logging>())
//!     .build();
//!
//! let mut registry = InterceptorRegistry::new();
//! registry.register(catalog.bindings());
//!
//! let catalog = Arc::new(catalog);
//! let resolver = Resolver::new(catalog.clone(), catalog.shape_index(), Arc::new(registry));
//!
//! // The unit's implementation type carries a closure, so ask by shape.
//! let unit = resolver.resolve_transform::<i32, i32>()?;
//! let doubled = futures::executor::block_on(
//!     unit.run(21, Next::new(|n: i32| async move { Ok(n * 2) })),
//! )?;
//! assert_eq!(doubled, 42);
//! # Ok(())
//! # }
//! ```
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::panic,
    clippy::todo,
    clippy::panic_in_result_fn,
    // missing_docs
)]
#![forbid(unsafe_code)]

mod catalog;
mod decorate;
mod error;
mod interceptor;
mod key;
mod logging;
mod provider;
mod registry;
mod resolver;
mod unit;

pub use catalog::{Catalog, CatalogBuilder};
pub use decorate::{wrap, Intercepted};
pub use error::{
    BoxError, ExecError, ExecResult, InterceptorUnavailable, RecoveredOutput, ResolveError,
};
pub use interceptor::{DynInterceptor, Interceptor};
pub use key::{InterceptorId, ShapeArgs, ShapeIndex, TypeKey, UnitId, UnitMeta};
pub use logging::{Logging, LoggingInterceptor};
pub use provider::{AnyInterceptor, AnyUnit, Provider};
pub use registry::{Binding, BoundTarget, InterceptorRegistry};
pub use resolver::{OnUnavailable, Resolver};
pub use unit::{ActionUnit, DynUnit, Next, Unit};
