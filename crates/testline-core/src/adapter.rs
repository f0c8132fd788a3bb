//! Binds an execution engine's native result hooks to the event fan-out.
//!
//! Each native call is forwarded to the observers first and then to the
//! engine's own bookkeeping, so run/failed/errored counts and the exit status
//! stay whatever the engine would have computed without us. Terminal calls
//! then drain the finished test's measurements into the same event stream.

use crate::config::ReportConfig;
use crate::errors::ReportError;
use crate::events::{lock_sink, EventSink, Fanout};
use crate::identity::{ErrorInfo, TestIdentity};
use crate::measure::{self, TestCase};
use crate::outcome::Numeric;
use crate::report::console::ConsoleReporter;
use crate::report::recorder::{AggregateRecorder, AggregateReport};
use crate::report::{SEPARATOR_HEAVY, SEPARATOR_LIGHT};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// The engine-side result object: its bookkeeping and what the end-of-run
/// printer reads back from it.
pub trait NativeResult {
    fn start_test(&mut self, test: &TestIdentity);
    fn add_subtest(&mut self, test: &TestIdentity, subtest: &TestIdentity, err: Option<&ErrorInfo>);
    fn add_success(&mut self, test: &TestIdentity);
    fn add_error(&mut self, test: &TestIdentity, err: &ErrorInfo);
    fn add_failure(&mut self, test: &TestIdentity, err: &ErrorInfo);
    fn add_skip(&mut self, test: &TestIdentity, reason: &str);
    fn add_expected_failure(&mut self, test: &TestIdentity, err: &ErrorInfo);
    fn add_unexpected_success(&mut self, test: &TestIdentity);

    /// Whether console labels should carry the docstring's first line.
    fn descriptions(&self) -> bool;

    fn tests_run(&self) -> usize;
    fn errors(&self) -> &[(TestIdentity, String)];
    fn failures(&self) -> &[(TestIdentity, String)];
    fn unexpected_successes(&self) -> &[TestIdentity];

    /// Whether the engine should run no further tests.
    fn should_stop(&self) -> bool {
        false
    }

    fn was_successful(&self) -> bool {
        self.errors().is_empty()
            && self.failures().is_empty()
            && self.unexpected_successes().is_empty()
    }
}

/// Stock bookkeeping for engines that have none of their own.
#[derive(Debug, Default)]
pub struct RunTally {
    descriptions: bool,
    tests_run: usize,
    failfast: bool,
    should_stop: bool,
    errors: Vec<(TestIdentity, String)>,
    failures: Vec<(TestIdentity, String)>,
    skipped: Vec<(TestIdentity, String)>,
    expected_failures: Vec<(TestIdentity, String)>,
    unexpected_successes: Vec<TestIdentity>,
}

impl RunTally {
    pub fn new(descriptions: bool) -> Self {
        Self {
            descriptions,
            ..Self::default()
        }
    }

    /// Stop the run at the first error, failure or unexpected success.
    pub fn failfast(mut self) -> Self {
        self.failfast = true;
        self
    }

    pub fn skipped(&self) -> &[(TestIdentity, String)] {
        &self.skipped
    }

    pub fn expected_failures(&self) -> &[(TestIdentity, String)] {
        &self.expected_failures
    }

    /// Ask the engine to stop after the current test.
    pub fn stop(&mut self) {
        self.should_stop = true;
    }

    fn note_bad_outcome(&mut self) {
        if self.failfast {
            self.stop();
        }
    }
}

impl NativeResult for RunTally {
    fn start_test(&mut self, _test: &TestIdentity) {
        self.tests_run += 1;
    }

    fn add_subtest(&mut self, _test: &TestIdentity, subtest: &TestIdentity, err: Option<&ErrorInfo>) {
        if let Some(err) = err {
            let entry = (subtest.clone(), err.to_string());
            if err.is_failure() {
                self.failures.push(entry);
            } else {
                self.errors.push(entry);
            }
            self.note_bad_outcome();
        }
    }

    fn add_success(&mut self, _test: &TestIdentity) {}

    fn add_error(&mut self, test: &TestIdentity, err: &ErrorInfo) {
        self.errors.push((test.clone(), err.to_string()));
        self.note_bad_outcome();
    }

    fn add_failure(&mut self, test: &TestIdentity, err: &ErrorInfo) {
        self.failures.push((test.clone(), err.to_string()));
        self.note_bad_outcome();
    }

    fn add_skip(&mut self, test: &TestIdentity, reason: &str) {
        self.skipped.push((test.clone(), reason.to_string()));
    }

    fn add_expected_failure(&mut self, test: &TestIdentity, err: &ErrorInfo) {
        self.expected_failures.push((test.clone(), err.to_string()));
    }

    fn add_unexpected_success(&mut self, test: &TestIdentity) {
        self.unexpected_successes.push(test.clone());
        self.note_bad_outcome();
    }

    fn descriptions(&self) -> bool {
        self.descriptions
    }

    fn tests_run(&self) -> usize {
        self.tests_run
    }

    fn errors(&self) -> &[(TestIdentity, String)] {
        &self.errors
    }

    fn failures(&self) -> &[(TestIdentity, String)] {
        &self.failures
    }

    fn should_stop(&self) -> bool {
        self.should_stop
    }

    fn unexpected_successes(&self) -> &[TestIdentity] {
        &self.unexpected_successes
    }
}

/// Result object handed to the execution engine.
pub struct ResultAdapter<N: NativeResult = RunTally, W: Write + Send + 'static = io::Stderr> {
    native: N,
    fanout: Fanout,
    console: Arc<Mutex<ConsoleReporter<W>>>,
    recorder: Arc<Mutex<AggregateRecorder>>,
    config: ReportConfig,
}

impl<N: NativeResult, W: Write + Send + 'static> ResultAdapter<N, W> {
    pub fn new(native: N, stream: W) -> Self {
        Self::with_config(native, stream, ReportConfig::default())
    }

    pub fn with_config(native: N, stream: W, config: ReportConfig) -> Self {
        let descriptions = config.descriptions.unwrap_or_else(|| native.descriptions());
        let console = Arc::new(Mutex::new(ConsoleReporter::new(stream, descriptions)));
        let recorder = Arc::new(Mutex::new(AggregateRecorder::new()));
        let fanout = Fanout::new().with(console.clone()).with(recorder.clone());
        Self {
            native,
            fanout,
            console,
            recorder,
            config,
        }
    }

    /// Register an extra observer after the console and the recorder.
    pub fn attach(&mut self, sink: impl EventSink + Send + 'static) {
        self.fanout.push(sink);
    }

    pub fn native(&self) -> &N {
        &self.native
    }

    pub fn native_mut(&mut self) -> &mut N {
        &mut self.native
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn start_test<T: TestCase + ?Sized>(&mut self, test: &T) {
        let id = test.identity();
        tracing::trace!(test = %id, "test started");
        self.native.start_test(id);
        self.fanout.start_test(id);
    }

    pub fn add_subtest<T: TestCase + ?Sized>(
        &mut self,
        test: &T,
        subtest: &TestIdentity,
        err: Option<&ErrorInfo>,
    ) {
        self.fanout.add_subtest(test.identity(), subtest, err);
        self.native.add_subtest(test.identity(), subtest, err);
    }

    pub fn add_success<T: TestCase + ?Sized>(&mut self, test: &mut T) {
        self.fanout.add_success(test.identity());
        self.native.add_success(test.identity());
        self.collect_measurements(test);
    }

    pub fn add_error<T: TestCase + ?Sized>(&mut self, test: &mut T, err: &ErrorInfo) {
        self.fanout.add_error(test.identity(), err);
        self.native.add_error(test.identity(), err);
        self.collect_measurements(test);
    }

    pub fn add_failure<T: TestCase + ?Sized>(&mut self, test: &mut T, err: &ErrorInfo) {
        self.fanout.add_failure(test.identity(), err);
        self.native.add_failure(test.identity(), err);
        self.collect_measurements(test);
    }

    pub fn add_skip<T: TestCase + ?Sized>(&mut self, test: &mut T, reason: &str) {
        self.fanout.add_skip(test.identity(), reason);
        self.native.add_skip(test.identity(), reason);
        self.collect_measurements(test);
    }

    pub fn add_expected_failure<T: TestCase + ?Sized>(&mut self, test: &mut T, err: &ErrorInfo) {
        self.fanout.add_expected_failure(test.identity(), err);
        self.native.add_expected_failure(test.identity(), err);
        self.collect_measurements(test);
    }

    pub fn add_unexpected_success<T: TestCase + ?Sized>(&mut self, test: &mut T) {
        self.fanout.add_unexpected_success(test.identity());
        self.native.add_unexpected_success(test.identity());
        self.collect_measurements(test);
    }

    /// Surface a measurement for a test directly, bypassing its store.
    /// Invalid names and values are logged and reach no observer.
    pub fn add_measurement(&mut self, test: &TestIdentity, name: &str, value: Numeric) {
        if let Err(e) = measure::validate(name, value) {
            tracing::warn!(test = %test, error = %e, "dropping measurement");
            return;
        }
        self.fanout.add_measurement(test, name, value);
    }

    fn collect_measurements<T: TestCase + ?Sized>(&mut self, test: &mut T) {
        let mut store = test.take_measurements();
        for (name, value) in store.drain() {
            self.add_measurement(test.identity(), &name, value);
        }
    }

    pub fn report(&self) -> AggregateReport {
        lock_sink(&self.recorder).report()
    }

    /// Read access to the console reporter and its stream.
    pub fn with_console<R>(&self, f: impl FnOnce(&ConsoleReporter<W>) -> R) -> R {
        f(&lock_sink(&self.console))
    }

    /// End-of-run listing: error and failure detail blocks, unexpected
    /// successes, then the aggregate report as indented JSON.
    pub fn print_errors(&self) -> Result<(), ReportError> {
        let mut console = lock_sink(&self.console);
        let out = console.get_mut();
        writeln!(out)?;
        out.flush()?;
        print_error_list(out, "ERROR", self.native.errors())?;
        print_error_list(out, "FAIL", self.native.failures())?;

        let unexpected = self.native.unexpected_successes();
        if !unexpected.is_empty() {
            writeln!(out, "{}", SEPARATOR_HEAVY)?;
            for test in unexpected {
                writeln!(out, "UNEXPECTED SUCCESS: {}", test)?;
            }
            out.flush()?;
        }

        if self.config.print_report {
            let json = self.report().to_json_pretty(self.config.json_indent)?;
            writeln!(out, "{}", json)?;
        }
        out.flush()?;
        Ok(())
    }
}

fn print_error_list(
    out: &mut impl Write,
    flavour: &str,
    errors: &[(TestIdentity, String)],
) -> io::Result<()> {
    for (test, err) in errors {
        writeln!(out, "{}", SEPARATOR_HEAVY)?;
        writeln!(out, "{}: {}", flavour, test)?;
        writeln!(out, "{}", SEPARATOR_LIGHT)?;
        writeln!(out, "{}", err)?;
        out.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::SubTestParams;
    use crate::measure::{MeasuredCase, MeasurementCarrier};
    use crate::outcome::Outcome;

    fn adapter() -> ResultAdapter<RunTally, Vec<u8>> {
        ResultAdapter::new(RunTally::new(false), Vec::new())
    }

    #[test]
    fn native_bookkeeping_stays_correct() {
        let mut a = adapter();
        let mut ok = TestIdentity::new("ok");
        let mut bad = TestIdentity::new("bad");
        let mut boom = TestIdentity::new("boom");

        a.start_test(&ok);
        a.add_success(&mut ok);
        a.start_test(&bad);
        a.add_failure(&mut bad, &ErrorInfo::failure("5 != 4"));
        a.start_test(&boom);
        a.add_error(&mut boom, &ErrorInfo::error("oops"));

        let native = a.native();
        assert_eq!(native.tests_run(), 3);
        assert_eq!(native.failures().len(), 1);
        assert_eq!(native.errors().len(), 1);
        assert!(!native.was_successful());
    }

    #[test]
    fn terminal_events_drain_measurements_after_outcome() {
        let mut a = adapter();
        let mut case = MeasuredCase::new(TestIdentity::new("t"));
        case.set_up_measurements();
        case.record_measurement("speed", 66).unwrap();

        a.start_test(&case);
        a.add_success(&mut case);
        assert!(case.measurements().is_empty());

        let report = a.report();
        assert_eq!(report.stats.count(Outcome::Ok), 1);
        assert_eq!(report.stats.measurement("speed"), Some(Numeric::Int(66)));
        assert_eq!(report.raw_results[0].key, "t");
        assert_eq!(report.raw_results[1].key, "t.speed");
    }

    #[test]
    fn subtest_does_not_drain_measurements() {
        let mut a = adapter();
        let mut case = MeasuredCase::new(TestIdentity::new("t"));
        case.record_measurement("speed", 1).unwrap();
        let sub = case.identity().subtest(&SubTestParams::new().param("i", 0));

        a.start_test(&case);
        a.add_subtest(&case, &sub, Some(&ErrorInfo::failure("no")));
        assert_eq!(case.measurements().len(), 1);
        assert_eq!(a.native().failures().len(), 1);
        assert_eq!(a.native().failures()[0].0.description(), "t (i=0)");
    }

    #[test]
    fn config_descriptions_override_native() {
        let cfg = ReportConfig {
            descriptions: Some(true),
            ..ReportConfig::default()
        };
        let a = ResultAdapter::with_config(RunTally::new(false), Vec::new(), cfg);
        assert_eq!(a.config().descriptions, Some(true));
        assert!(a.with_console(|c| c.descriptions()));
        assert!(!adapter().with_console(|c| c.descriptions()));
    }

    #[test]
    fn print_errors_without_report() {
        let cfg = ReportConfig {
            print_report: false,
            ..ReportConfig::default()
        };
        let mut a = ResultAdapter::with_config(RunTally::new(false), Vec::new(), cfg);
        let mut t = TestIdentity::new("t");
        a.start_test(&t);
        a.add_unexpected_success(&mut t);
        a.print_errors().unwrap();

        let out = a.with_console(|c| String::from_utf8(c.get_ref().clone()).unwrap());
        assert_eq!(
            out,
            format!(
                "t ... unexpected success\n\n{}\nUNEXPECTED SUCCESS: t\n",
                SEPARATOR_HEAVY
            )
        );
    }
}
