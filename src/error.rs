//! Everything that can go wrong, split by when it goes wrong.

use std::{any::Any, fmt};

use thiserror::Error;

use crate::key::{InterceptorId, ShapeArgs, UnitId};

/// Boxed error used at the hook and unit boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result of running a unit or a wrapped chain.
pub type ExecResult<T> = Result<T, ExecError>;

/// Failure while turning an identifier into a ready-to-run callable.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ResolveError {
    /// The identifier does not name anything the shape index knows about.
    #[error("`{id}` does not identify a known unit")]
    ShapeNotRecognized { id: UnitId },
    /// The identifier is a unit, but the provider has no instance for it.
    #[error("no unit instance is available for `{id}`")]
    UnitNotFound { id: UnitId },
    /// The instance that came back does not transform the requested types.
    #[error("the unit resolved for `{id}` does not have the requested shape")]
    ShapeMismatch { id: UnitId },
    /// A bound interceptor could not be produced and the resolver is
    /// configured to fail rather than skip.
    #[error("interceptor `{interceptor}` is unavailable for unit `{unit}`")]
    Interceptor {
        unit: UnitId,
        interceptor: InterceptorId,
        #[source]
        source: InterceptorUnavailable,
    },
}

/// Why a single interceptor could not be materialized.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum InterceptorUnavailable {
    /// No pre-built instance and no factory registered under the identifier.
    #[error("`{id}` is not registered and no factory is known for it")]
    NoFactory { id: InterceptorId },
    /// A factory was found but returned an error.
    #[error("constructing `{id}` failed")]
    Construction {
        id: InterceptorId,
        #[source]
        source: BoxError,
    },
    /// The instance exists but hooks different types than the unit carries.
    #[error("`{id}` hooks `{found}` but the unit transforms `{expected}`")]
    ArgsMismatch {
        id: InterceptorId,
        expected: ShapeArgs,
        found: ShapeArgs,
    },
}

/// Failure while executing a wrapped unit.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ExecError {
    /// A before hook failed; the unit never ran.
    #[error("interceptor `{interceptor}` failed in its before hook")]
    BeforeHook {
        interceptor: &'static str,
        #[source]
        source: BoxError,
    },
    /// An after hook failed. The unit already produced its output, so the
    /// value rides along instead of being dropped on the floor.
    #[error("interceptor `{interceptor}` failed in its after hook")]
    AfterHook {
        interceptor: &'static str,
        #[source]
        source: BoxError,
        output: RecoveredOutput,
    },
    /// The unit itself failed.
    #[error("unit execution failed")]
    Unit(#[source] BoxError),
}

impl ExecError {
    /// Wraps a unit's own failure.
    pub fn unit(err: impl Into<BoxError>) -> Self {
        Self::Unit(err.into())
    }
}

/// Output produced by a unit whose after hook then failed.
///
/// Whether a hook failure voids the output is the caller's call to make,
/// so the value is handed back erased rather than discarded.
pub struct RecoveredOutput(Box<dyn Any + Send>);

impl RecoveredOutput {
    pub(crate) fn new<T: Send + 'static>(value: T) -> Self {
        Self(Box::new(value))
    }

    /// Recovers the output if `T` is what the unit produced.
    pub fn downcast<T: 'static>(self) -> Result<T, Self> {
        match self.0.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(other) => Err(Self(other)),
        }
    }
}

impl fmt::Debug for RecoveredOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RecoveredOutput(..)")
    }
}
