//! Wrapping a unit with an ordered interceptor chain.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::{
    error::{ExecError, ExecResult, RecoveredOutput},
    interceptor::DynInterceptor,
    unit::{DynUnit, Next, Unit},
};

/// Wraps `inner` with `interceptors`, preserving their order.
///
/// Every before hook runs ahead of the unit and every after hook runs
/// behind it, both walking the chain front to back. An empty chain returns
/// `inner` untouched, not a hollow wrapper.
pub fn wrap<I, O>(inner: DynUnit<I, O>, interceptors: Vec<DynInterceptor<I, O>>) -> DynUnit<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    if interceptors.is_empty() {
        return inner;
    }

    Arc::new(Intercepted {
        inner,
        interceptors: interceptors.into_boxed_slice(),
    })
}

/// A unit with an interceptor chain around it. Built by [`wrap`].
pub struct Intercepted<I, O> {
    inner: DynUnit<I, O>,
    interceptors: Box<[DynInterceptor<I, O>]>,
}

impl<I, O> Unit for Intercepted<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    type Input = I;
    type Output = O;

    fn run(&self, input: I, next: Next<I, O>) -> BoxFuture<'_, ExecResult<O>> {
        Box::pin(async move {
            for interceptor in self.interceptors.iter() {
                let hook = interceptor.before(&input).await;
                hook.map_err(|source| ExecError::BeforeHook {
                    interceptor: interceptor.name(),
                    source,
                })?;
            }

            let output = self.inner.run(input, next).await?;

            // Same front-to-back order as the before hooks.
            for interceptor in self.interceptors.iter() {
                let hook = interceptor.after(&output).await;
                if let Err(source) = hook {
                    return Err(ExecError::AfterHook {
                        interceptor: interceptor.name(),
                        source,
                        output: RecoveredOutput::new(output),
                    });
                }
            }

            Ok(output)
        })
    }
}
