//! Validation report
//!
//! Every problem found while resolving one step is collected here; the
//! engine decides success or failure only once all parameters have been
//! processed.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use step_meta::ParamType;

use crate::layer::LayerKind;

/// The rule a violation broke
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ViolationKind {
    /// One layer named the parameter under several keys
    ConfigurationAmbiguity { keys: Vec<String>, layer: LayerKind },
    /// The value cannot be converted to the declared type
    TypeMismatch { expected: ParamType },
    /// Required parameter absent after full resolution
    MissingMandatory,
    /// Value outside the declared set of possible values
    NotAllowed { allowed: Vec<Value> },
    /// Key matching no parameter, reported in strict mode only
    Unknown { layer: LayerKind },
}

impl ViolationKind {
    /// Short rule label, e.g. for tables.
    pub fn label(&self) -> &'static str {
        match self {
            ViolationKind::ConfigurationAmbiguity { .. } => "ambiguous",
            ViolationKind::TypeMismatch { .. } => "wrong-type",
            ViolationKind::MissingMandatory => "missing-mandatory",
            ViolationKind::NotAllowed { .. } => "not-allowed",
            ViolationKind::Unknown { .. } => "unknown",
        }
    }
}

/// One problem with one parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Canonical name, or the key as written for unknown keys
    pub parameter: String,
    #[serde(flatten)]
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn new(parameter: impl Into<String>, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.label(), self.message)
    }
}

/// Ordered list of violations for one step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    step: String,
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn new(step: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            violations: Vec::new(),
        }
    }

    pub fn step(&self) -> &str {
        &self.step
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// No violations recorded.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Violations concerning one parameter.
    pub fn for_parameter<'a>(&'a self, parameter: &'a str) -> impl Iterator<Item = &'a Violation> {
        self.violations.iter().filter(move |v| v.parameter == parameter)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.violations.len() == 1 { "problem" } else { "problems" };
        write!(
            f,
            "Configuration of step {} is invalid ({} {noun})",
            self.step,
            self.violations.len()
        )?;
        for violation in &self.violations {
            write!(f, "\n  - {violation}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ValidationReport {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}
