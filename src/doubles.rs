//! Call-recording adapter for hand-rolled test doubles
//!
//! Doubles embed a [`CallLog`] and record each invocation; tests verify
//! interactions by querying it afterward. This is the lightweight recorder
//! the auto-mocking container's substitutes are built from.

use parking_lot::Mutex;

/// One recorded invocation: the method name plus a rendering of its
/// interesting arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub method: &'static str,
    pub detail: String,
}

/// An append-only log of invocations on a double.
#[derive(Debug, Default)]
pub struct CallLog {
    calls: Mutex<Vec<Call>>,
}

impl CallLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an invocation of `method`.
    pub fn record(&self, method: &'static str, detail: impl Into<String>) {
        self.calls.lock().push(Call {
            method,
            detail: detail.into(),
        });
    }

    /// Number of recorded invocations of `method`.
    pub fn count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.method == method)
            .count()
    }

    pub fn was_called(&self, method: &str) -> bool {
        self.count(method) > 0
    }

    /// The most recent invocation of `method`, if any.
    pub fn last(&self, method: &str) -> Option<Call> {
        self.calls
            .lock()
            .iter()
            .rev()
            .find(|call| call.method == method)
            .cloned()
    }

    /// Total invocations across all methods.
    pub fn total(&self) -> usize {
        self.calls.lock().len()
    }

    /// All recorded invocations, in order.
    pub fn snapshot(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}
