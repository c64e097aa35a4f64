#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use futures::future::{ready, BoxFuture};
use interpose::{BoxError, ExecError, ExecResult, Interceptor, Next, Unit};

/// Shared, ordered record of everything a pipeline touched.
#[derive(Clone, Default)]
pub struct Trace(Arc<Mutex<Vec<String>>>);

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

/// Unit that records its visit and forwards the input unchanged.
pub struct RelayUnit {
    trace: Trace,
}

impl RelayUnit {
    pub fn new(trace: Trace) -> Self {
        Self { trace }
    }
}

impl Unit for RelayUnit {
    type Input = i32;
    type Output = i32;

    fn run(&self, input: i32, next: Next<i32, i32>) -> BoxFuture<'_, ExecResult<i32>> {
        Box::pin(async move {
            self.trace.push(format!("inner({input})"));
            next.run(input).await
        })
    }
}

/// Unit that always fails on its own.
pub struct FailingUnit;

impl Unit for FailingUnit {
    type Input = i32;
    type Output = i32;

    fn run(&self, _input: i32, _next: Next<i32, i32>) -> BoxFuture<'_, ExecResult<i32>> {
        let result: ExecResult<i32> = Err(ExecError::unit("unit blew up"));
        Box::pin(ready(result))
    }
}

/// Unit over strings, for shape mismatch scenarios.
pub struct ShoutUnit;

impl Unit for ShoutUnit {
    type Input = String;
    type Output = String;

    fn run(&self, input: String, next: Next<String, String>) -> BoxFuture<'_, ExecResult<String>> {
        Box::pin(next.run(input.to_uppercase()))
    }
}

/// Interceptor recording both hooks under a caller-chosen label. Meant for
/// direct wrapping; instances share a type, so they cannot be told apart by
/// identifier.
pub struct Recording {
    label: &'static str,
    trace: Trace,
}

impl Recording {
    pub fn new(label: &'static str, trace: Trace) -> Self {
        Self { label, trace }
    }
}

impl Interceptor<i32, i32> for Recording {
    fn name(&self) -> &'static str {
        self.label
    }

    fn before<'a>(&'a self, input: &'a i32) -> BoxFuture<'a, Result<(), BoxError>> {
        self.trace.push(format!("{}.before({input})", self.label));
        Box::pin(ready(Ok::<_, BoxError>(())))
    }

    fn after<'a>(&'a self, output: &'a i32) -> BoxFuture<'a, Result<(), BoxError>> {
        self.trace.push(format!("{}.after({output})", self.label));
        Box::pin(ready(Ok::<_, BoxError>(())))
    }
}

/// Like [`Recording`], but a distinct type so it gets its own identifier.
pub struct LoggingProbe {
    trace: Trace,
}

impl LoggingProbe {
    pub fn new(trace: Trace) -> Self {
        Self { trace }
    }
}

impl Interceptor<i32, i32> for LoggingProbe {
    fn name(&self) -> &'static str {
        "Logging"
    }

    fn before<'a>(&'a self, input: &'a i32) -> BoxFuture<'a, Result<(), BoxError>> {
        self.trace.push(format!("Logging.before({input})"));
        Box::pin(ready(Ok::<_, BoxError>(())))
    }

    fn after<'a>(&'a self, output: &'a i32) -> BoxFuture<'a, Result<(), BoxError>> {
        self.trace.push(format!("Logging.after({output})"));
        Box::pin(ready(Ok::<_, BoxError>(())))
    }
}

/// Counts hook invocations and records them in the shared trace.
pub struct CountingProbe {
    trace: Trace,
    counters: Arc<Counters>,
}

impl CountingProbe {
    pub fn new(trace: Trace, counters: Arc<Counters>) -> Self {
        Self { trace, counters }
    }
}

#[derive(Default)]
pub struct Counters {
    pub before: AtomicUsize,
    pub after: AtomicUsize,
}

impl Interceptor<i32, i32> for CountingProbe {
    fn name(&self) -> &'static str {
        "Counting"
    }

    fn before<'a>(&'a self, input: &'a i32) -> BoxFuture<'a, Result<(), BoxError>> {
        self.counters.before.fetch_add(1, Ordering::SeqCst);
        self.trace.push(format!("Counting.before({input})"));
        Box::pin(ready(Ok::<_, BoxError>(())))
    }

    fn after<'a>(&'a self, output: &'a i32) -> BoxFuture<'a, Result<(), BoxError>> {
        self.counters.after.fetch_add(1, Ordering::SeqCst);
        self.trace.push(format!("Counting.after({output})"));
        Box::pin(ready(Ok::<_, BoxError>(())))
    }
}

#[derive(Clone, Copy)]
pub enum FailHook {
    Before,
    After,
}

/// Interceptor that records its hooks and then fails at the chosen one.
pub struct Failing {
    label: &'static str,
    hook: FailHook,
    trace: Trace,
}

impl Failing {
    pub fn new(label: &'static str, hook: FailHook, trace: Trace) -> Self {
        Self { label, hook, trace }
    }
}

impl Interceptor<i32, i32> for Failing {
    fn name(&self) -> &'static str {
        self.label
    }

    fn before<'a>(&'a self, input: &'a i32) -> BoxFuture<'a, Result<(), BoxError>> {
        self.trace.push(format!("{}.before({input})", self.label));
        let result: Result<(), BoxError> = match self.hook {
            FailHook::Before => Err("before hook failed".into()),
            FailHook::After => Ok(()),
        };
        Box::pin(ready(result))
    }

    fn after<'a>(&'a self, output: &'a i32) -> BoxFuture<'a, Result<(), BoxError>> {
        self.trace.push(format!("{}.after({output})", self.label));
        let result: Result<(), BoxError> = match self.hook {
            FailHook::After => Err("after hook failed".into()),
            FailHook::Before => Ok(()),
        };
        Box::pin(ready(result))
    }
}

/// Interceptor that never overrides anything, exercising the default
/// no-op hooks.
pub struct Quiet;

impl Interceptor<i32, i32> for Quiet {}

/// Interceptor over strings, the wrong shape for the i32 units above.
pub struct WrongShape;

impl Interceptor<String, String> for WrongShape {}
