//! Platform gating through the case runner: a mismatched gate reports a
//! skip, never a failure, and teardown still runs.

use testrig::container::{AutoMocker, Resolve};
use testrig::error::ResolutionError;
use testrig::platform::{self, Platform};
use testrig::{Outcome, run_case, skip_if};

struct NullSubject;

impl Resolve for NullSubject {
    fn build(_rig: &AutoMocker) -> Result<Self, ResolutionError> {
        Ok(Self)
    }
}

fn foreign_platform() -> Platform {
    if cfg!(windows) {
        Platform::Linux
    } else {
        Platform::Windows
    }
}

#[test]
fn gate_on_the_current_platform_lets_the_body_run() {
    let mut body_ran = false;
    let outcome = run_case::<NullSubject, _>(|_cx| {
        platform::require(Platform::current());
        body_ran = true;
    });
    assert_eq!(outcome, Outcome::Passed);
    assert!(body_ran);
}

#[test]
fn mismatched_gate_skips_with_a_readable_reason() {
    let gate = foreign_platform();
    let outcome = run_case::<NullSubject, _>(move |_cx| {
        platform::require(gate);
        unreachable!("body must not continue past a failed gate");
    });

    let reason = outcome.skip_reason().expect("case should be skipped");
    assert!(reason.contains("requires"));
}

#[test]
fn skip_if_macro_short_circuits_the_body() {
    let outcome = run_case::<NullSubject, _>(|_cx| {
        skip_if!(true, "needs a display server");
        unreachable!();
    });
    assert_eq!(outcome, Outcome::Skipped("needs a display server".to_string()));
}

#[test]
fn unix_gate_matches_on_unix_hosts() {
    let outcome = run_case::<NullSubject, _>(|_cx| {
        platform::require_unix();
    });
    assert_eq!(outcome.skipped(), !cfg!(unix));
}
