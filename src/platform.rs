//! Platform gating and the skip signal
//!
//! A test declares the environment it applies to at the top of its body; when
//! the host does not match, the body is abandoned through [`SkipSignal`] and
//! the case runner reports the test as skipped (never failed). The signal is
//! a typed panic payload, so generic error handling cannot swallow it; only
//! [`crate::run_case`] consumes it.

use std::panic::panic_any;

/// Control-flow payload marking a test as not applicable. Not an error.
#[derive(Debug, Clone)]
pub struct SkipSignal {
    pub reason: String,
}

/// Abandon the current test body, reporting it as skipped with `reason`.
pub fn skip(reason: impl Into<String>) -> ! {
    panic_any(SkipSignal {
        reason: reason.into(),
    });
}

/// Execution environments a test can gate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
    /// Any Unix-family platform (Linux, macOS, BSDs, ...).
    Unix,
}

impl Platform {
    /// The platform this process is running on. `Unix` is never returned
    /// directly; it only matches as a gate.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Linux
        }
    }

    /// Whether the current process satisfies this gate.
    #[must_use]
    pub fn matches_current(self) -> bool {
        match self {
            Self::Unix => cfg!(unix),
            other => other == Self::current(),
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Self::Windows => "Windows",
            Self::Linux => "Linux",
            Self::MacOs => "macOS",
            Self::Unix => "a Unix platform",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.noun())
    }
}

/// Skip the test unless it is running on `platform`.
pub fn require(platform: Platform) {
    if !platform.matches_current() {
        skip(format!("requires {platform}"));
    }
}

pub fn require_windows() {
    require(Platform::Windows);
}

pub fn require_unix() {
    require(Platform::Unix);
}

pub fn require_linux() {
    require(Platform::Linux);
}

/// Skip the test when `cond` holds.
#[macro_export]
macro_rules! skip_if {
    ($cond:expr, $reason:expr) => {
        if $cond {
            $crate::platform::skip($reason);
        }
    };
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;

    #[test]
    fn current_platform_matches_itself() {
        assert!(Platform::current().matches_current());
    }

    #[test]
    fn unix_gate_follows_cfg() {
        assert_eq!(Platform::Unix.matches_current(), cfg!(unix));
    }

    #[test]
    fn mismatched_gate_raises_a_skip_signal() {
        let unsupported = if cfg!(windows) {
            Platform::Linux
        } else {
            Platform::Windows
        };

        let payload = catch_unwind(AssertUnwindSafe(|| require(unsupported)))
            .expect_err("gate should not pass");
        let signal = payload
            .downcast::<SkipSignal>()
            .expect("payload should be a skip signal");
        assert!(signal.reason.contains("requires"));
    }

    #[test]
    fn matching_gate_is_a_no_op() {
        require(Platform::current());
    }

    #[test]
    fn skip_if_macro_forwards_the_reason() {
        let payload =
            catch_unwind(AssertUnwindSafe(|| skip_if!(true, "docker only"))).unwrap_err();
        let signal = payload.downcast::<SkipSignal>().unwrap();
        assert_eq!(signal.reason, "docker only");
    }
}
