//! Error types for the harness

use thiserror::Error;

/// Convenience Result type for harness operations
pub type Result<T> = std::result::Result<T, RigError>;

#[derive(Error, Debug)]
pub enum RigError {
    #[error("resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Raised by the auto-mocking container when a requested type cannot be
/// constructed. Always fatal to the test case: it indicates harness misuse,
/// not a failure of the code under test.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// A concrete-type dependency chain looped back on itself.
    #[error("circular dependency detected while resolving `{0}`")]
    Cycle(&'static str),

    /// A component asked for a constant that was never registered.
    #[error("no constant registered for `{0}`; call set_constant before the first resolution that needs it")]
    MissingConstant(&'static str),

    /// A registry entry did not hold the type its key promised. Keys are
    /// `TypeId`s, so this is unreachable short of registry corruption.
    #[error("registry entry for `{0}` holds an unexpected type")]
    TypeMismatch(&'static str),
}
