//! testrig - Per-test fixture harness
//!
//! The base layer unit tests build on. Per test case it provides:
//! - an auto-mocking container that lazily resolves the subject under test,
//!   standing a recording double in for every unregistered dependency seam
//! - a private scratch directory, cleaned up best-effort at teardown
//! - process-wide unique and randomized ids for collision-free fixtures
//! - platform gating that reports a skip instead of a failure
//! - assertions over the recorded event-publication channel

// Production-ready clippy configuration
#![warn(clippy::pedantic)]
#![warn(clippy::perf)]
#![warn(clippy::suspicious)]
// Allow documentation lints - internal code, not public API
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
// Allow some pedantic lints that are too strict for this codebase
#![allow(clippy::module_name_repetitions)]

pub mod container;
pub mod context;
pub mod doubles;
pub mod error;
pub mod events;
pub mod ident;
pub mod logging;
pub mod platform;
pub mod scratch;

pub use container::{AutoMocker, Mockable, Resolve};
pub use context::{AppDirs, AppDirsDouble, Outcome, TestContext, run_case};
pub use doubles::{Call, CallLog};
pub use error::{ResolutionError, Result, RigError};
pub use events::{Event, EventAggregator, EventAggregatorDouble};
pub use platform::{Platform, SkipSignal, skip};
pub use scratch::ScratchDir;
