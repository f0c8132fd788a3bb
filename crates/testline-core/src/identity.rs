//! Test identities and error payloads carried by lifecycle events.

use std::fmt;

/// Stable, human-readable description of a test or sub-test.
///
/// The description is the aggregation key. Two tests with the same
/// description are indistinguishable to the recorder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TestIdentity {
    description: String,
    doc: Option<String>,
    subtest: bool,
}

impl TestIdentity {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            doc: None,
            subtest: false,
        }
    }

    /// Attach a docstring; its first line is shown when descriptions are enabled.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Derive the identity of a sub-test of this test.
    pub fn subtest(&self, params: &SubTestParams) -> Self {
        Self {
            description: format!("{} {}", self.description, params.describe()),
            doc: self.doc.clone(),
            subtest: true,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_subtest(&self) -> bool {
        self.subtest
    }

    /// First non-empty line of the docstring.
    pub fn short_description(&self) -> Option<&str> {
        self.doc
            .as_deref()
            .and_then(|d| d.lines().map(str::trim).find(|l| !l.is_empty()))
    }
}

impl fmt::Display for TestIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Parameters that distinguish one sub-test from its siblings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubTestParams {
    pub message: Option<String>,
    pub params: Vec<(String, String)>,
}

impl SubTestParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// `[msg] (k=v, k2=v2)`, or `(<subtest>)` when nothing was given.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(msg) = &self.message {
            parts.push(format!("[{}]", msg));
        }
        if !self.params.is_empty() {
            let joined = self
                .params
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(", ");
            parts.push(format!("({})", joined));
        }
        if parts.is_empty() {
            "(<subtest>)".to_string()
        } else {
            parts.join(" ")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An assertion did not hold.
    Failure,
    /// Anything else raised out of the test body.
    Error,
}

/// Error payload attached to error, failure and failed sub-test events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
    /// Formatted traceback or backtrace, when the engine has one.
    pub detail: Option<String>,
}

impl ErrorInfo {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Failure,
            message: message.into(),
            detail: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Error,
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn is_failure(&self) -> bool {
        self.kind == ErrorKind::Failure
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(detail) = &self.detail {
            return f.write_str(detail);
        }
        let label = match self.kind {
            ErrorKind::Failure => "Failure",
            ErrorKind::Error => "Error",
        };
        write!(f, "{}: {}", label, self.message)
    }
}
