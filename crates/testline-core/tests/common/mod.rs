#![allow(dead_code)]

use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use testline_core::{
    ErrorInfo, MeasuredCase, MeasurementCarrier, NativeResult, ResultAdapter, TestIdentity,
};
use tracing_subscriber::fmt::MakeWriter;

pub type Body = fn(&mut MeasuredCase) -> Result<(), ErrorInfo>;

/// Shared in-memory stream, usable as console output and as a log sink.
#[derive(Clone, Default)]
pub struct MockWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MockWriter {
    pub fn contents(&self) -> String {
        String::from_utf8(self.buf.lock().unwrap().clone()).unwrap()
    }
}

impl std::io::Write for MockWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for MockWriter {
    type Writer = MockWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Minimal sequential engine: set up, start, run the body, report the outcome.
/// Stops early once the native result asks it to.
pub fn run_suite<N: NativeResult>(
    adapter: &mut ResultAdapter<N, MockWriter>,
    class: &str,
    cases: &[(&str, Body)],
) {
    for (name, body) in cases {
        if adapter.native().should_stop() {
            break;
        }
        let mut case = MeasuredCase::new(TestIdentity::new(format!("{} ({})", name, class)));
        case.set_up_measurements();
        adapter.start_test(&case);
        match body(&mut case) {
            Ok(()) => adapter.add_success(&mut case),
            Err(e) if e.is_failure() => adapter.add_failure(&mut case, &e),
            Err(e) => adapter.add_error(&mut case, &e),
        }
    }
}

pub fn check_eq<T: PartialEq + Debug>(expected: T, actual: T) -> Result<(), ErrorInfo> {
    if expected == actual {
        Ok(())
    } else {
        Err(ErrorInfo::failure(format!("{:?} != {:?}", expected, actual)))
    }
}

fn test_something(_: &mut MeasuredCase) -> Result<(), ErrorInfo> {
    check_eq(4, 2 * 2)
}

fn test_something_failed(_: &mut MeasuredCase) -> Result<(), ErrorInfo> {
    check_eq(5, 2 * 2)
}

fn test_something_error(_: &mut MeasuredCase) -> Result<(), ErrorInfo> {
    Err(ErrorInfo::error("oops"))
}

pub fn basic_suite() -> Vec<(&'static str, Body)> {
    vec![
        ("testSomething", test_something as Body),
        ("testSomethingFailed", test_something_failed as Body),
        ("testSomethingError", test_something_error as Body),
    ]
}
