//! The unit contract: one async transformation step with a continuation.

use std::{fmt, future::Future, marker::PhantomData, sync::Arc};

use futures::future::BoxFuture;

use crate::error::ExecResult;

/// An asynchronous transformation step.
///
/// A unit receives an input, may hand a value to the continuation, and
/// produces an output. It stays oblivious to whatever interceptors end up
/// wrapped around it.
pub trait Unit: Send + Sync + 'static {
    type Input: Send + 'static;
    type Output: Send + 'static;

    fn run(
        &self,
        input: Self::Input,
        next: Next<Self::Input, Self::Output>,
    ) -> BoxFuture<'_, ExecResult<Self::Output>>;
}

/// A shared, type-erased unit callable.
pub type DynUnit<I, O> = Arc<dyn Unit<Input = I, Output = O>>;

/// The continuation handed to a unit: the rest of the pipeline.
pub struct Next<I, O> {
    handler: Box<dyn FnOnce(I) -> BoxFuture<'static, ExecResult<O>> + Send>,
}

impl<I, O> Next<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce(I) -> Fut + Send + 'static,
        Fut: Future<Output = ExecResult<O>> + Send + 'static,
    {
        Self {
            handler: Box::new(move |input| -> BoxFuture<'static, ExecResult<O>> {
                Box::pin(f(input))
            }),
        }
    }

    /// A continuation that ignores its input and completes with `value`.
    pub fn ready(value: O) -> Self {
        Self::new(move |_| futures::future::ready(Ok(value)))
    }

    pub async fn run(self, input: I) -> ExecResult<O> {
        (self.handler)(input).await
    }
}

impl<I, O> fmt::Debug for Next<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Next(..)")
    }
}

/// Unit that observes each input with a plain function, then hands the
/// value to the continuation unchanged.
pub struct ActionUnit<I, O, F> {
    action: F,
    phantom: PhantomData<fn(I) -> O>,
}

impl<I, O, F> ActionUnit<I, O, F>
where
    F: Fn(&I) + Send + Sync + 'static,
    I: Send + 'static,
    O: Send + 'static,
{
    pub fn new(action: F) -> Self {
        Self {
            action,
            phantom: PhantomData,
        }
    }
}

impl<I, O, F> Unit for ActionUnit<I, O, F>
where
    F: Fn(&I) + Send + Sync + 'static,
    I: Send + 'static,
    O: Send + 'static,
{
    type Input = I;
    type Output = O;

    fn run(&self, input: I, next: Next<I, O>) -> BoxFuture<'_, ExecResult<O>> {
        Box::pin(async move {
            (self.action)(&input);
            next.run(input).await
        })
    }
}
