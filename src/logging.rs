//! Test-scoped logging
//!
//! Each test case gets its own tracing dispatcher writing to libtest's
//! captured output at TRACE, so per-test diagnostics never pollute global
//! logs. Reconfiguration happens at every setup; last writer wins, which is
//! acceptable because the configuration is idempotent. Filtering follows the
//! `TESTRIG_LOG` environment variable (`EnvFilter` syntax), defaulting to
//! `trace`.

use tracing::Dispatch;
use tracing_subscriber::EnvFilter;

/// Environment variable controlling the per-test log filter.
pub const LOG_FILTER_ENV: &str = "TESTRIG_LOG";

/// Build the dispatcher a test case's body runs under.
#[must_use]
pub fn test_dispatcher() -> Dispatch {
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("trace"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_test_writer()
        .finish();
    Dispatch::new(subscriber)
}

/// Handle to the test-scoped logging configuration.
///
/// Injected as a constant into every test's container, so any resolved
/// component that depends on the logging handle receives the same test-scoped
/// instance.
#[derive(Clone)]
pub struct TestLogger {
    dispatch: Dispatch,
}

impl TestLogger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            dispatch: test_dispatcher(),
        }
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Emit a trace-level diagnostic through the test-scoped dispatcher.
    pub fn trace(&self, message: &str) {
        tracing::dispatcher::with_default(&self.dispatch, || {
            tracing::trace!("{message}");
        });
    }
}

impl Default for TestLogger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatcher_builds_without_env_configuration() {
        let _dispatch = test_dispatcher();
    }

    #[test]
    fn test_logger_traces_through_its_own_dispatch() {
        let logger = TestLogger::new();
        logger.trace("scoped diagnostic");
    }
}
