//! Lifecycle events a test execution engine reports, and the observers of them.
//!
//! Every method returns `()`. A sink that cannot process an event must
//! swallow the problem; an observer never fails the run it is watching.

pub mod fanout;

pub use fanout::Fanout;

use crate::identity::{ErrorInfo, TestIdentity};
use crate::outcome::Numeric;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// An observer of test lifecycle events.
pub trait EventSink {
    fn start_test(&mut self, test: &TestIdentity);

    /// A named numeric measurement attached to a completed test.
    fn add_measurement(&mut self, test: &TestIdentity, name: &str, value: Numeric);

    /// `err` is `None` when the sub-test passed.
    fn add_subtest(&mut self, test: &TestIdentity, subtest: &TestIdentity, err: Option<&ErrorInfo>);

    fn add_success(&mut self, test: &TestIdentity);

    fn add_error(&mut self, test: &TestIdentity, err: &ErrorInfo);

    fn add_failure(&mut self, test: &TestIdentity, err: &ErrorInfo);

    fn add_skip(&mut self, test: &TestIdentity, reason: &str);

    fn add_expected_failure(&mut self, test: &TestIdentity, err: &ErrorInfo);

    fn add_unexpected_success(&mut self, test: &TestIdentity);
}

/// Lock an observer, recovering the inner value if a previous holder panicked.
pub(crate) fn lock_sink<T: ?Sized>(sink: &Mutex<T>) -> MutexGuard<'_, T> {
    sink.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Shared observers: the dispatcher holds one handle, the caller keeps another
/// to read state back after the run.
impl<T: EventSink + ?Sized> EventSink for Arc<Mutex<T>> {
    fn start_test(&mut self, test: &TestIdentity) {
        lock_sink(self).start_test(test);
    }

    fn add_measurement(&mut self, test: &TestIdentity, name: &str, value: Numeric) {
        lock_sink(self).add_measurement(test, name, value);
    }

    fn add_subtest(&mut self, test: &TestIdentity, subtest: &TestIdentity, err: Option<&ErrorInfo>) {
        lock_sink(self).add_subtest(test, subtest, err);
    }

    fn add_success(&mut self, test: &TestIdentity) {
        lock_sink(self).add_success(test);
    }

    fn add_error(&mut self, test: &TestIdentity, err: &ErrorInfo) {
        lock_sink(self).add_error(test, err);
    }

    fn add_failure(&mut self, test: &TestIdentity, err: &ErrorInfo) {
        lock_sink(self).add_failure(test, err);
    }

    fn add_skip(&mut self, test: &TestIdentity, reason: &str) {
        lock_sink(self).add_skip(test, reason);
    }

    fn add_expected_failure(&mut self, test: &TestIdentity, err: &ErrorInfo) {
        lock_sink(self).add_expected_failure(test, err);
    }

    fn add_unexpected_success(&mut self, test: &TestIdentity) {
        lock_sink(self).add_unexpected_success(test);
    }
}
