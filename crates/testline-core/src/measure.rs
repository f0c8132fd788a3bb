//! Per-test numeric measurements.
//!
//! A test records named values while it runs; the result adapter drains them
//! once the test completes and re-emits each one as an ordinary event.

use crate::errors::MeasurementError;
use crate::identity::TestIdentity;
use crate::outcome::{Numeric, Outcome};
use indexmap::IndexMap;

/// Separator between a test description and a measurement name in raw-result keys.
pub const NAME_SEPARATOR: char = '.';

/// Check a measurement before it enters a store or a report.
pub fn validate(name: &str, value: Numeric) -> Result<(), MeasurementError> {
    if name.is_empty() {
        return Err(MeasurementError::EmptyName);
    }
    if Outcome::from_name(name).is_some() {
        return Err(MeasurementError::ReservedName(name.to_string()));
    }
    if name.contains(NAME_SEPARATOR) {
        return Err(MeasurementError::InvalidName {
            name: name.to_string(),
            reason: "contains the '.' key separator",
        });
    }
    if name.chars().any(char::is_control) {
        return Err(MeasurementError::InvalidName {
            name: name.to_string(),
            reason: "contains control characters",
        });
    }
    if !value.is_finite() {
        return Err(MeasurementError::NonFinite {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Named values owned by one test instance for the duration of its run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementStore {
    entries: IndexMap<String, Numeric>,
}

impl MeasurementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `name`. Re-recording a name overwrites the value
    /// but keeps its original position.
    pub fn record(&mut self, name: &str, value: impl Into<Numeric>) -> Result<(), MeasurementError> {
        let value = value.into();
        validate(name, value)?;
        self.entries.insert(name.to_string(), value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Numeric> {
        self.entries.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Numeric)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn drain(&mut self) -> impl Iterator<Item = (String, Numeric)> + '_ {
        self.entries.drain(..)
    }
}

/// What the result adapter needs from a running test.
pub trait TestCase {
    fn identity(&self) -> &TestIdentity;

    /// Hand off measurements gathered during the run. Tests that never
    /// measure anything keep the default.
    fn take_measurements(&mut self) -> MeasurementStore {
        MeasurementStore::default()
    }
}

/// Lets a test accumulate named measurements during its run.
pub trait MeasurementCarrier {
    fn measurement_store(&mut self) -> &mut MeasurementStore;

    /// Called at test setup.
    fn set_up_measurements(&mut self) {
        *self.measurement_store() = MeasurementStore::default();
    }

    fn record_measurement<V>(&mut self, name: &str, value: V) -> Result<(), MeasurementError>
    where
        V: Into<Numeric>,
        Self: Sized,
    {
        self.measurement_store().record(name, value)
    }
}

/// A test-case value that carries measurements.
#[derive(Debug, Clone)]
pub struct MeasuredCase {
    identity: TestIdentity,
    store: MeasurementStore,
}

impl MeasuredCase {
    pub fn new(identity: TestIdentity) -> Self {
        Self {
            identity,
            store: MeasurementStore::default(),
        }
    }

    pub fn measurements(&self) -> &MeasurementStore {
        &self.store
    }
}

impl MeasurementCarrier for MeasuredCase {
    fn measurement_store(&mut self) -> &mut MeasurementStore {
        &mut self.store
    }
}

impl TestCase for MeasuredCase {
    fn identity(&self) -> &TestIdentity {
        &self.identity
    }

    fn take_measurements(&mut self) -> MeasurementStore {
        std::mem::take(&mut self.store)
    }
}

impl TestCase for TestIdentity {
    fn identity(&self) -> &TestIdentity {
        self
    }
}
