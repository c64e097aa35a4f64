//! A ready-made interceptor kind that logs unit execution and timing.

use std::{any::type_name, marker::PhantomData, sync::Mutex, time::Instant};

use futures::future::{ready, BoxFuture};

use crate::{error::BoxError, interceptor::Interceptor};

/// Marker for the open logging kind.
///
/// Bind it with `InterceptorId::open::<Logging>()` and register a factory
/// per shape; the resolver closes the identifier against each unit it
/// decorates.
#[derive(Debug, Clone, Copy)]
pub struct Logging;

/// Logs when a unit starts and finishes, with the elapsed time in between.
///
/// The start instant is kept in the interceptor, so one instance should
/// wrap one unit rather than be shared across concurrent pipelines.
pub struct LoggingInterceptor<I, O> {
    started: Mutex<Option<Instant>>,
    phantom: PhantomData<fn(I) -> O>,
}

impl<I, O> LoggingInterceptor<I, O> {
    pub fn new() -> Self {
        Self {
            started: Mutex::new(None),
            phantom: PhantomData,
        }
    }
}

impl<I, O> Default for LoggingInterceptor<I, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, O> Interceptor<I, O> for LoggingInterceptor<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    fn before<'a>(&'a self, _input: &'a I) -> BoxFuture<'a, Result<(), BoxError>> {
        if let Ok(mut started) = self.started.lock() {
            *started = Some(Instant::now());
        }
        tracing::info!(
            input = type_name::<I>(),
            output = type_name::<O>(),
            "unit starting"
        );
        Box::pin(ready(Ok::<_, BoxError>(())))
    }

    fn after<'a>(&'a self, _output: &'a O) -> BoxFuture<'a, Result<(), BoxError>> {
        let started = self.started.lock().ok().and_then(|mut slot| slot.take());
        match started {
            Some(started) => tracing::info!(
                input = type_name::<I>(),
                output = type_name::<O>(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "unit finished"
            ),
            None => tracing::info!(
                input = type_name::<I>(),
                output = type_name::<O>(),
                "unit finished"
            ),
        }
        Box::pin(ready(Ok::<_, BoxError>(())))
    }
}
