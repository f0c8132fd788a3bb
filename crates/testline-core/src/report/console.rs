use crate::events::EventSink;
use crate::identity::{ErrorInfo, TestIdentity};
use crate::outcome::{skip_status, Numeric};
use std::io::{self, Write};

/// Prints one status line per test, with sub-test and measurement lines
/// indented or re-labelled beneath it.
///
/// `start_test` leaves the cursor mid-line after `"<test> ... "`; the next
/// status word completes that line. Anything reported after the line is
/// complete re-emits the label first.
pub struct ConsoleReporter<W: Write> {
    out: W,
    descriptions: bool,
    at_line_start: bool,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, descriptions: bool) -> Self {
        Self {
            out,
            descriptions,
            at_line_start: true,
        }
    }

    pub fn descriptions(&self) -> bool {
        self.descriptions
    }

    pub fn set_descriptions(&mut self, descriptions: bool) {
        self.descriptions = descriptions;
    }

    pub fn at_line_start(&self) -> bool {
        self.at_line_start
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn describe(&self, test: &TestIdentity) -> String {
        match test.short_description() {
            Some(doc) if self.descriptions => format!("{}\n{}", test, doc),
            _ => test.to_string(),
        }
    }

    fn write_status(&mut self, test: &TestIdentity, status: &str, suffix: &str) {
        let subtest = test.is_subtest();
        let mut line = String::new();
        if subtest || self.at_line_start {
            if !self.at_line_start {
                line.push('\n');
            }
            if subtest {
                line.push_str("  ");
            }
            line.push_str(&self.describe(test));
            line.push_str(suffix);
            line.push_str(" ... ");
        }
        line.push_str(status);
        line.push('\n');
        self.emit(&line);
        self.at_line_start = true;
    }

    fn write_line(&mut self, text: &str) {
        self.emit(&format!("{}\n", text));
        self.at_line_start = true;
    }

    fn emit(&mut self, text: &str) {
        let res = self
            .out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush());
        if let Err(e) = res {
            log_write_error(&e);
        }
    }
}

fn log_write_error(e: &io::Error) {
    tracing::warn!(error = %e, "console reporter failed to write; output dropped");
}

impl<W: Write> EventSink for ConsoleReporter<W> {
    fn start_test(&mut self, test: &TestIdentity) {
        let label = format!("{} ... ", self.describe(test));
        self.emit(&label);
        self.at_line_start = false;
    }

    fn add_measurement(&mut self, test: &TestIdentity, name: &str, value: Numeric) {
        self.write_status(test, &value.to_string(), &format!(".{}", name));
    }

    fn add_subtest(&mut self, _test: &TestIdentity, subtest: &TestIdentity, err: Option<&ErrorInfo>) {
        if let Some(err) = err {
            let status = if err.is_failure() { "FAIL" } else { "ERROR" };
            self.write_status(subtest, status, "");
        }
    }

    fn add_success(&mut self, test: &TestIdentity) {
        self.write_status(test, "ok", "");
    }

    fn add_error(&mut self, test: &TestIdentity, _err: &ErrorInfo) {
        self.write_status(test, "ERROR", "");
    }

    fn add_failure(&mut self, test: &TestIdentity, _err: &ErrorInfo) {
        self.write_status(test, "FAIL", "");
    }

    fn add_skip(&mut self, test: &TestIdentity, reason: &str) {
        self.write_status(test, &skip_status(reason), "");
    }

    fn add_expected_failure(&mut self, _test: &TestIdentity, _err: &ErrorInfo) {
        self.write_line("expected failure");
    }

    fn add_unexpected_success(&mut self, _test: &TestIdentity) {
        self.write_line("unexpected success");
    }
}
