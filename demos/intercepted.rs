//! End-to-end wiring: a catalog, a registry, a resolver, and one wrapped
//! invocation with global logging plus a unit-specific counter.
//!
//! Run with `cargo run --example intercepted`.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use futures::future::{ready, BoxFuture};
use interpose::{
    BoxError, Catalog, ExecResult, Interceptor, InterceptorId, InterceptorRegistry, Logging,
    LoggingInterceptor, Next, Resolver, Unit,
};

/// Doubles its input, by way of the continuation.
struct Doubler;

impl Unit for Doubler {
    type Input = i32;
    type Output = i32;

    fn run(&self, input: i32, next: Next<i32, i32>) -> BoxFuture<'_, ExecResult<i32>> {
        Box::pin(next.run(input * 2))
    }
}

/// Counts how often the unit it wraps has run.
#[derive(Default)]
struct Counting {
    runs: AtomicUsize,
}

impl Interceptor<i32, i32> for Counting {
    fn name(&self) -> &'static str {
        "Counting"
    }

    fn after<'a>(&'a self, _output: &'a i32) -> BoxFuture<'a, Result<(), BoxError>> {
        let runs = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(runs, "counted a run");
        Box::pin(ready(Ok::<_, BoxError>(())))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let catalog = Catalog::builder()
        .unit(Doubler)
        .interceptor(Counting::default())
        .factory::<i32, i32, _>(InterceptorId::open::<Logging>(), || {
            Ok(Arc::new(LoggingInterceptor::new()))
        })
        .bind_global(InterceptorId::open::<Logging>())
        .bind_unit::<Doubler>(InterceptorId::of::<Counting>())
        .build();

    let mut registry = InterceptorRegistry::new();
    registry.register(catalog.bindings());

    let shapes = catalog.shape_index();
    let resolver = Resolver::new(Arc::new(catalog), shapes, Arc::new(registry));

    let unit = resolver.resolve::<Doubler>()?;
    let out = unit
        .run(21, Next::new(|n: i32| async move { Ok(n) }))
        .await?;

    tracing::info!(out, "pipeline finished");
    Ok(())
}
