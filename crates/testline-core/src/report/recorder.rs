//! Aggregate report: per-category counts plus a flat record of every result.
//!
//! Fixed outcome counters and measurement totals live in separate maps and
//! are only merged when `stats` is serialized, so a measurement can never
//! bump an outcome counter.

use crate::events::EventSink;
use crate::identity::{ErrorInfo, TestIdentity};
use crate::measure::{self, NAME_SEPARATOR};
use crate::outcome::{skip_status, Numeric, Outcome};
use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Running totals. Always carries the six fixed categories.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stats {
    counts: [u64; 6],
    measurements: IndexMap<String, Numeric>,
}

impl Stats {
    pub fn count(&self, outcome: Outcome) -> u64 {
        self.counts[outcome.index()]
    }

    /// Sum of every value recorded under a measurement name.
    pub fn measurement(&self, name: &str) -> Option<Numeric> {
        self.measurements.get(name).copied()
    }

    /// Look up any category by its `stats` key.
    pub fn get(&self, category: &str) -> Option<Numeric> {
        match Outcome::from_name(category) {
            Some(o) => Some(Numeric::Int(i64::try_from(self.count(o)).unwrap_or(i64::MAX))),
            None => self.measurement(category),
        }
    }

    /// Number of outcome events, ignoring measurements.
    pub fn total_outcomes(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn measurement_names(&self) -> impl Iterator<Item = &str> {
        self.measurements.keys().map(String::as_str)
    }

    fn bump(&mut self, outcome: Outcome) {
        self.counts[outcome.index()] += 1;
    }

    fn accumulate(&mut self, name: &str, value: Numeric) {
        let total = self.measurements.entry(name.to_string()).or_default();
        *total = *total + value;
    }
}

impl Serialize for Stats {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(Some(self.counts.len() + self.measurements.len()))?;
        for o in Outcome::ALL {
            map.serialize_entry(o.as_str(), &self.count(o))?;
        }
        for (name, total) in &self.measurements {
            map.serialize_entry(name, total)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Status(String),
    Number(Numeric),
}

impl Serialize for RawValue {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            RawValue::Status(status) => s.serialize_str(status),
            RawValue::Number(n) => n.serialize(s),
        }
    }
}

/// One entry of `raw_results`, serialized as a single-key object.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResult {
    pub key: String,
    pub value: RawValue,
}

impl RawResult {
    pub fn status(key: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: RawValue::Status(status.into()),
        }
    }

    pub fn number(key: impl Into<String>, value: Numeric) -> Self {
        Self {
            key: key.into(),
            value: RawValue::Number(value),
        }
    }
}

impl Serialize for RawResult {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(Some(1))?;
        map.serialize_entry(&self.key, &self.value)?;
        map.end()
    }
}

/// Snapshot handed to callers; `{ "stats": {...}, "raw_results": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateReport {
    pub stats: Stats,
    pub raw_results: Vec<RawResult>,
}

impl AggregateReport {
    /// Render with `indent` spaces per nesting level.
    pub fn to_json_pretty(&self, indent: usize) -> serde_json::Result<String> {
        let indent = " ".repeat(indent);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        // serde_json only ever emits UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Folds the event stream into an [`AggregateReport`].
#[derive(Debug, Default)]
pub struct AggregateRecorder {
    report: AggregateReport,
}

impl AggregateRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state as an owned snapshot. Does not touch the recorder.
    pub fn report(&self) -> AggregateReport {
        self.report.clone()
    }

    pub fn stats(&self) -> &Stats {
        &self.report.stats
    }

    pub fn raw_results(&self) -> &[RawResult] {
        &self.report.raw_results
    }

    fn record(&mut self, outcome: Outcome, test: &TestIdentity, status: String) {
        tracing::debug!(test = %test, category = %outcome, "recorded outcome");
        self.report.stats.bump(outcome);
        self.report
            .raw_results
            .push(RawResult::status(test.description(), status));
    }
}

impl EventSink for AggregateRecorder {
    fn start_test(&mut self, _test: &TestIdentity) {}

    fn add_measurement(&mut self, test: &TestIdentity, name: &str, value: Numeric) {
        if let Err(e) = measure::validate(name, value) {
            tracing::warn!(test = %test, error = %e, "dropping measurement");
            return;
        }
        tracing::trace!(test = %test, name, %value, "recorded measurement");
        self.report.stats.accumulate(name, value);
        let key = format!("{}{}{}", test.description(), NAME_SEPARATOR, name);
        self.report.raw_results.push(RawResult::number(key, value));
    }

    fn add_subtest(&mut self, _test: &TestIdentity, subtest: &TestIdentity, err: Option<&ErrorInfo>) {
        match err {
            None => self.add_success(subtest),
            Some(err) => self.add_failure(subtest, err),
        }
    }

    fn add_success(&mut self, test: &TestIdentity) {
        self.record(Outcome::Ok, test, "ok".into());
    }

    fn add_error(&mut self, test: &TestIdentity, _err: &ErrorInfo) {
        self.record(Outcome::Error, test, "ERROR".into());
    }

    fn add_failure(&mut self, test: &TestIdentity, _err: &ErrorInfo) {
        self.record(Outcome::Fail, test, "FAIL".into());
    }

    fn add_skip(&mut self, test: &TestIdentity, reason: &str) {
        self.record(Outcome::Skip, test, skip_status(reason));
    }

    fn add_expected_failure(&mut self, test: &TestIdentity, _err: &ErrorInfo) {
        self.record(Outcome::ExpectedFail, test, "expected fail".into());
    }

    fn add_unexpected_success(&mut self, test: &TestIdentity) {
        self.record(Outcome::UnexpectedSuccess, test, "unexpected success".into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::SubTestParams;
    use serde_json::json;

    #[test]
    fn empty_report_has_all_fixed_categories() {
        let rec = AggregateRecorder::new();
        assert_eq!(
            rec.report().to_value(),
            json!({
                "stats": {
                    "ok": 0, "error": 0, "fail": 0, "skip": 0,
                    "expected fail": 0, "unexpected success": 0
                },
                "raw_results": []
            })
        );
    }

    #[test]
    fn measurement_registers_category_and_keyed_entry() {
        let mut rec = AggregateRecorder::new();
        let t = TestIdentity::new("test_car (m.C)");
        rec.add_measurement(&t, "speed", Numeric::Int(66));

        let report = rec.report();
        assert_eq!(report.stats.get("speed"), Some(Numeric::Int(66)));
        assert_eq!(report.stats.total_outcomes(), 0);
        assert_eq!(
            report.raw_results,
            vec![RawResult::number("test_car (m.C).speed", Numeric::Int(66))]
        );
    }

    #[test]
    fn measurements_accumulate_across_tests() {
        let mut rec = AggregateRecorder::new();
        rec.add_measurement(&TestIdentity::new("a"), "gas", Numeric::Int(40));
        rec.add_measurement(&TestIdentity::new("b"), "gas", Numeric::Float(2.5));
        assert_eq!(rec.stats().measurement("gas"), Some(Numeric::Float(42.5)));
        assert_eq!(rec.raw_results().len(), 2);
    }

    #[test]
    fn reserved_or_malformed_measurement_is_dropped() {
        let mut rec = AggregateRecorder::new();
        let t = TestIdentity::new("t");
        rec.add_measurement(&t, "ok", Numeric::Int(5));
        rec.add_measurement(&t, "a.b", Numeric::Int(5));
        rec.add_measurement(&t, "inf", Numeric::Float(f64::INFINITY));

        assert_eq!(rec.stats().count(Outcome::Ok), 0);
        assert_eq!(rec.stats().measurement_names().count(), 0);
        assert!(rec.raw_results().is_empty());
    }

    #[test]
    fn subtest_outcome_uses_subtest_identity() {
        let mut rec = AggregateRecorder::new();
        let parent = TestIdentity::new("test_loop (m.C)");
        let sub = parent.subtest(&SubTestParams::new().param("i", 1));
        rec.add_subtest(&parent, &sub, Some(&ErrorInfo::error("boom")));
        rec.add_subtest(&parent, &parent.subtest(&SubTestParams::new().param("i", 2)), None);
        rec.add_failure(&parent, &ErrorInfo::failure("x"));

        assert_eq!(rec.stats().count(Outcome::Fail), 2);
        assert_eq!(rec.stats().count(Outcome::Ok), 1);
        assert_eq!(
            rec.raw_results()[0],
            RawResult::status("test_loop (m.C) (i=1)", "FAIL")
        );
        assert_eq!(
            rec.raw_results()[1],
            RawResult::status("test_loop (m.C) (i=2)", "ok")
        );
    }

    #[test]
    fn status_words() {
        let mut rec = AggregateRecorder::new();
        let t = TestIdentity::new("t");
        rec.add_skip(&t, "slow");
        rec.add_expected_failure(&t, &ErrorInfo::failure("x"));
        rec.add_unexpected_success(&t);
        let statuses: Vec<_> = rec
            .raw_results()
            .iter()
            .map(|r| r.value.clone())
            .collect();
        assert_eq!(
            statuses,
            vec![
                RawValue::Status("skipped 'slow'".into()),
                RawValue::Status("expected fail".into()),
                RawValue::Status("unexpected success".into()),
            ]
        );
    }

    #[test]
    fn report_generation_is_idempotent() {
        let mut rec = AggregateRecorder::new();
        rec.add_success(&TestIdentity::new("t"));
        let first = rec.report();
        let second = rec.report();
        assert_eq!(first, second);
        assert_eq!(first.to_value(), second.to_value());
    }

    #[test]
    fn pretty_json_uses_configured_indent() {
        let mut rec = AggregateRecorder::new();
        rec.add_success(&TestIdentity::new("t"));
        rec.add_measurement(&TestIdentity::new("t"), "speed", Numeric::Int(66));

        let text = rec.report().to_json_pretty(4).unwrap();
        let expected = r#"{
    "stats": {
        "ok": 1,
        "error": 0,
        "fail": 0,
        "skip": 0,
        "expected fail": 0,
        "unexpected success": 0,
        "speed": 66
    },
    "raw_results": [
        {
            "t": "ok"
        },
        {
            "t.speed": 66
        }
    ]
}"#;
        assert_eq!(text, expected);
        assert!(rec.report().to_json_pretty(2).unwrap().contains("\n  \"stats\""));
    }
}
