//! Per-test context and lifecycle runner
//!
//! [`TestContext`] owns everything one test case needs: the scratch
//! directory, the auto-mocking container, and the lazily resolved subject
//! under test. [`run_case`] is the setup/teardown wrapper a `#[test]` body
//! runs inside: setup fully completes before the body, teardown runs exactly
//! once regardless of outcome, and a [`SkipSignal`] raised by a platform gate
//! turns into [`Outcome::Skipped`] instead of a failure.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::container::{AutoMocker, Mockable, Resolve};
use crate::error::Result;
use crate::events::{EventAggregator, EventAggregatorDouble};
use crate::logging::TestLogger;
use crate::platform::SkipSignal;
use crate::scratch::ScratchDir;

/// Where an application keeps its persistent data. Components under test
/// depend on this seam instead of hardcoding real user directories.
pub trait AppDirs: Send + Sync {
    fn app_data_dir(&self) -> PathBuf;
}

/// Recording double for [`AppDirs`]; answers with a configured path, falling
/// back to the system temp dir.
#[derive(Default)]
pub struct AppDirsDouble {
    app_data: Mutex<Option<PathBuf>>,
}

impl AppDirsDouble {
    pub fn set_app_data_dir(&self, path: PathBuf) {
        *self.app_data.lock() = Some(path);
    }
}

impl AppDirs for AppDirsDouble {
    fn app_data_dir(&self) -> PathBuf {
        self.app_data.lock().clone().unwrap_or_else(std::env::temp_dir)
    }
}

impl Mockable for dyn AppDirs {
    type Double = AppDirsDouble;
    fn from_double(double: Arc<AppDirsDouble>) -> Arc<dyn AppDirs> {
        double
    }
}

/// Everything one test case owns: scratch directory, container, and the
/// cached subject under test. Created at setup, dropped at teardown; never
/// shared across cases.
pub struct TestContext<S: Resolve> {
    scratch: ScratchDir,
    mocker: AutoMocker,
    logger: Arc<TestLogger>,
    subject: OnceLock<Arc<S>>,
}

impl<S: Resolve> TestContext<S> {
    /// Allocate the scratch directory and a fresh container, and register the
    /// harness's standard constants (the test-scoped logger).
    pub fn new() -> Result<Self> {
        let scratch = ScratchDir::allocate()?;
        let mocker = AutoMocker::new();
        let logger = mocker.set_constant(Arc::new(TestLogger::new()));
        Ok(Self {
            scratch,
            mocker,
            logger,
            subject: OnceLock::new(),
        })
    }

    /// The subject under test, resolved through the container on first access
    /// and cached for the test's duration.
    pub fn subject(&self) -> Result<Arc<S>> {
        if let Some(cached) = self.subject.get() {
            return Ok(Arc::clone(cached));
        }
        let resolved = self.mocker.resolve::<S>()?;
        let _ = self.subject.set(Arc::clone(&resolved));
        Ok(resolved)
    }

    pub fn mocker(&self) -> &AutoMocker {
        &self.mocker
    }

    pub fn scratch(&self) -> &ScratchDir {
        &self.scratch
    }

    pub fn logger(&self) -> &Arc<TestLogger> {
        &self.logger
    }

    /// Pin a dependency to a fixed instance before the subject is resolved.
    pub fn set_constant<T: ?Sized + Send + Sync + 'static>(&self, value: Arc<T>) -> Arc<T> {
        self.mocker.set_constant(value)
    }

    /// The recording double for seam `D`, shared with the resolved subject.
    pub fn substitute<D: ?Sized + Mockable>(&self) -> Arc<D::Double> {
        self.mocker.substitute::<D>()
    }

    /// The double standing in for the event-publication channel.
    pub fn events(&self) -> Arc<EventAggregatorDouble> {
        self.mocker.substitute::<dyn EventAggregator>()
    }

    /// Assert that exactly one event of type `E` was published.
    pub fn assert_event_published<E: Any>(&self) {
        self.events().assert_published_times::<E>(1);
    }

    /// Assert that exactly `times` events of type `E` were published.
    pub fn assert_event_published_times<E: Any>(&self, times: usize) {
        self.events().assert_published_times::<E>(times);
    }

    /// Assert that no event of type `E` was published.
    pub fn assert_event_not_published<E: Any>(&self) {
        self.events().assert_not_published::<E>();
    }

    /// Point the [`AppDirs`] seam at the scratch dir's virtual app-data
    /// directory, so the subject "persists" into the test's private area.
    pub fn with_temp_as_app_data(&self) -> Result<Arc<AppDirsDouble>> {
        let dir = self.scratch.app_data_dir()?;
        let double = self.mocker.substitute::<dyn AppDirs>();
        double.set_app_data_dir(dir);
        Ok(double)
    }
}

/// How a test case ended, as far as the harness is concerned. Failures are
/// not represented here: a failing body unwinds past [`run_case`] and the
/// host runner records it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Skipped(String),
}

impl Outcome {
    #[must_use]
    pub fn skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    #[must_use]
    pub fn skip_reason(&self) -> Option<&str> {
        match self {
            Self::Skipped(reason) => Some(reason),
            Self::Passed => None,
        }
    }
}

/// Run one test case under the harness lifecycle.
///
/// Setup allocates the scratch directory and container; the body runs under
/// the test-scoped logging dispatcher; teardown (dropping the context, which
/// deletes the scratch directory best-effort) runs exactly once whether the
/// body returns, panics, or skips. A [`SkipSignal`] payload is consumed and
/// reported as [`Outcome::Skipped`]; any other panic resumes unwinding so the
/// host runner records a failure.
pub fn run_case<S, F>(body: F) -> Outcome
where
    S: Resolve,
    F: FnOnce(&TestContext<S>),
{
    let cx = match TestContext::<S>::new() {
        Ok(cx) => cx,
        Err(err) => panic!("test setup failed: {err}"),
    };

    let dispatch = cx.logger.dispatch().clone();
    let result = catch_unwind(AssertUnwindSafe(|| {
        tracing::dispatcher::with_default(&dispatch, || body(&cx));
    }));

    // Teardown before any failure propagates.
    drop(cx);

    match result {
        Ok(()) => Outcome::Passed,
        Err(payload) => match payload.downcast::<SkipSignal>() {
            Ok(signal) => {
                eprintln!("test skipped: {}", signal.reason);
                Outcome::Skipped(signal.reason)
            }
            Err(other) => resume_unwind(other),
        },
    }
}
