//! Structured result collection for unit-test runs.
//!
//! An execution engine drives a [`ResultAdapter`] through its native result
//! hooks. The adapter fans every lifecycle event out to a console progress
//! printer and an aggregate recorder, and folds per-test numeric measurements
//! back into the same event stream once a test completes.

pub mod adapter;
pub mod config;
pub mod errors;
pub mod events;
pub mod identity;
pub mod measure;
pub mod outcome;
pub mod report;

pub use adapter::{NativeResult, ResultAdapter, RunTally};
pub use config::{load_config, ReportConfig};
pub use errors::{ConfigError, MeasurementError, ReportError};
pub use events::{EventSink, Fanout};
pub use identity::{ErrorInfo, ErrorKind, SubTestParams, TestIdentity};
pub use measure::{MeasuredCase, MeasurementCarrier, MeasurementStore, TestCase};
pub use outcome::{Numeric, Outcome};
pub use report::console::ConsoleReporter;
pub use report::recorder::{AggregateRecorder, AggregateReport, RawResult, RawValue, Stats};
