use super::EventSink;
use crate::identity::{ErrorInfo, TestIdentity};
use crate::outcome::Numeric;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

type BoxedSink = Box<dyn EventSink + Send>;

/// Forwards every event to each registered sink, in registration order.
///
/// Each delegate call is isolated: a sink that panics is logged and skipped
/// for that event, and the remaining sinks still see it.
#[derive(Default)]
pub struct Fanout {
    sinks: Vec<BoxedSink>,
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: impl EventSink + Send + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn with(mut self, sink: impl EventSink + Send + 'static) -> Self {
        self.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    fn each(&mut self, event: &'static str, mut f: impl FnMut(&mut (dyn EventSink + Send))) {
        for (index, sink) in self.sinks.iter_mut().enumerate() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| f(sink.as_mut())));
            if let Err(payload) = outcome {
                tracing::error!(
                    event,
                    sink = index,
                    panic = %panic_message(payload.as_ref()),
                    "event sink panicked; continuing with remaining sinks"
                );
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}

impl EventSink for Fanout {
    fn start_test(&mut self, test: &TestIdentity) {
        self.each("start_test", |s| s.start_test(test));
    }

    fn add_measurement(&mut self, test: &TestIdentity, name: &str, value: Numeric) {
        self.each("add_measurement", |s| s.add_measurement(test, name, value));
    }

    fn add_subtest(&mut self, test: &TestIdentity, subtest: &TestIdentity, err: Option<&ErrorInfo>) {
        self.each("add_subtest", |s| s.add_subtest(test, subtest, err));
    }

    fn add_success(&mut self, test: &TestIdentity) {
        self.each("add_success", |s| s.add_success(test));
    }

    fn add_error(&mut self, test: &TestIdentity, err: &ErrorInfo) {
        self.each("add_error", |s| s.add_error(test, err));
    }

    fn add_failure(&mut self, test: &TestIdentity, err: &ErrorInfo) {
        self.each("add_failure", |s| s.add_failure(test, err));
    }

    fn add_skip(&mut self, test: &TestIdentity, reason: &str) {
        self.each("add_skip", |s| s.add_skip(test, reason));
    }

    fn add_expected_failure(&mut self, test: &TestIdentity, err: &ErrorInfo) {
        self.each("add_expected_failure", |s| s.add_expected_failure(test, err));
    }

    fn add_unexpected_success(&mut self, test: &TestIdentity) {
        self.each("add_unexpected_success", |s| s.add_unexpected_success(test));
    }
}
