//! The interceptor contract: hooks around a unit's execution.

use std::{any::type_name, sync::Arc};

use futures::future::{ready, BoxFuture};

use crate::error::BoxError;

/// Hooks that run around a unit transforming `I` into `O`.
///
/// Both hooks default to no-ops, so an implementation overrides only the
/// side it cares about. Hooks observe values by reference and cannot swap
/// them out; state between `before` and `after` lives in the interceptor
/// itself.
pub trait Interceptor<I, O>: Send + Sync + 'static {
    /// Name used in logs and hook failure reports.
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }

    /// Runs before the unit, with the input about to be processed.
    ///
    /// An error here aborts the invocation: later hooks and the unit
    /// itself never run.
    fn before<'a>(&'a self, _input: &'a I) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(ready(Ok::<_, BoxError>(())))
    }

    /// Runs after the unit, with the output it produced.
    fn after<'a>(&'a self, _output: &'a O) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(ready(Ok::<_, BoxError>(())))
    }
}

/// A shared, type-erased interceptor.
pub type DynInterceptor<I, O> = Arc<dyn Interceptor<I, O>>;
