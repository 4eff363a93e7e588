//! Error taxonomy for argument checking.
//!
//! Errors fall into three families:
//! - definition-time errors, raised while wrapping a function
//!   ([`ArgCheckError::AnnotationCompilation`], [`ArgCheckError::SignatureDefinition`]);
//! - call-time violations, raised before the wrapped function runs
//!   ([`ArgCheckError::BindingRejection`] and the three `*Violation` variants);
//! - [`ArgCheckError::CheckExecution`], raised when a check cannot be carried
//!   out on the value it was given.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;
use strum::Display;
use thiserror::Error;

use crate::value::{Value, ValueType};

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ArgCheckError>;

// ═══════════════════════════════════════════════════════════════════════════
// PARAMETER AND ARGUMENT LOCATORS
// ═══════════════════════════════════════════════════════════════════════════

/// A declared parameter, located by its index in the signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclParam {
    pub index: usize,
    pub name: String,
}

impl DeclParam {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }
}

impl fmt::Display for DeclParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]={}", self.index, Value::from(self.name.as_str()))
    }
}

/// Where a bound value came from in the call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgSlot {
    /// Passed at this position.
    Position(usize),
    /// Passed under this keyword.
    Keyword(String),
    /// Omitted; the declared default was used.
    Default,
}

impl fmt::Display for ArgSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position(i) => write!(f, "{i}"),
            Self::Keyword(k) => write!(f, "{}", Value::from(k.as_str())),
            Self::Default => write!(f, "default"),
        }
    }
}

/// A value supplied for a parameter, together with its slot in the call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallArg {
    pub slot: ArgSlot,
    pub value: Value,
}

impl CallArg {
    pub fn new(slot: ArgSlot, value: &Value) -> Self {
        Self {
            slot,
            value: value.clone(),
        }
    }
}

impl fmt::Display for CallArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]={}", self.slot, self.value)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// BINDING REJECTIONS
// ═══════════════════════════════════════════════════════════════════════════

/// Why a call's arguments could not be mapped onto the declared parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingRejection {
    #[error("missing a required argument: '{name}'")]
    MissingArgument { name: String },

    #[error("missing a required keyword-only argument: '{name}'")]
    MissingKeywordOnly { name: String },

    #[error("too many positional arguments")]
    TooManyPositional { expected: usize, received: usize },

    #[error("got an unexpected keyword argument '{name}'")]
    UnexpectedKeyword { name: String },

    #[error("multiple values for argument '{name}'")]
    MultipleValues { name: String },

    #[error("'{name}' parameter is positional only, but was passed as a keyword")]
    PositionalOnlyAsKeyword { name: String },
}

impl BindingRejection {
    /// The parameter or keyword the rejection is about, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::MissingArgument { name }
            | Self::MissingKeywordOnly { name }
            | Self::UnexpectedKeyword { name }
            | Self::MultipleValues { name }
            | Self::PositionalOnlyAsKeyword { name } => Some(name),
            Self::TooManyPositional { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_arity_mismatch(&self) -> bool {
        matches!(
            self,
            Self::MissingArgument { .. }
                | Self::MissingKeywordOnly { .. }
                | Self::TooManyPositional { .. }
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// MAIN ERROR TYPE
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArgCheckError {
    /// An annotation could not be turned into checks.
    #[error(
        "unable to compile type annotation `{annotation}` into checks for param {param} of `{function}`: {problem}"
    )]
    AnnotationCompilation {
        function: String,
        param: DeclParam,
        annotation: String,
        problem: String,
    },

    /// The parameter list itself is malformed.
    #[error("invalid signature for `{function}`: {problem}")]
    SignatureDefinition { function: String, problem: String },

    #[error("unable to bind function call argument for `{function}`: {reason}")]
    BindingRejection {
        function: String,
        reason: BindingRejection,
    },

    /// A check could not be evaluated against the value it was given.
    #[error(
        "operation `{operation}` failed for param {param} during check `{check}` for this value: {value}"
    )]
    CheckExecution {
        param: DeclParam,
        arg: CallArg,
        check: String,
        operation: String,
        value: Value,
    },

    #[error(
        "violation of type check `{check}` for param {param} (declared={declared}; received={received}): {arg}"
    )]
    TypeCheckViolation {
        param: DeclParam,
        arg: CallArg,
        check: String,
        declared: String,
        received: ValueType,
    },

    #[error("violation of value-constraint check `{check}` for param {param}: {arg}")]
    ValueCheckViolation {
        param: DeclParam,
        arg: CallArg,
        check: String,
    },

    #[error(
        "violation of sequence check `{check}` for param {param}: {arg} (at sequence element [{index}]={element})"
    )]
    ElementCheckViolation {
        param: DeclParam,
        arg: CallArg,
        check: String,
        index: usize,
        element: Value,
    },

    /// Several violations gathered under the collect-all policy.
    #[error("{} argument check violations: {}", .0.len(), .0.iter().join("; "))]
    Multiple(Vec<ArgCheckError>),
}

/// Discriminant of [`ArgCheckError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    AnnotationCompilation,
    SignatureDefinition,
    BindingRejection,
    CheckExecution,
    TypeCheckViolation,
    ValueCheckViolation,
    ElementCheckViolation,
    Multiple,
}

/// The four kinds of call-time violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    BindingRejection,
    TypeCheckViolation,
    ElementCheckViolation,
    ValueCheckViolation,
}

/// A flat, serializable account of one call-time violation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViolationRecord {
    pub kind: ViolationKind,
    pub parameter_name: Option<String>,
    pub offending_value: Option<Value>,
    pub offending_index: Option<usize>,
    pub element: Option<Value>,
    pub constraint_description: String,
}

impl ViolationRecord {
    /// Render as a JSON object.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl ArgCheckError {
    // ═══════════════════════════════════════════════════════════════════════
    // CONSTRUCTORS
    // ═══════════════════════════════════════════════════════════════════════

    pub fn signature(function: &str, problem: impl Into<String>) -> Self {
        Self::SignatureDefinition {
            function: function.to_string(),
            problem: problem.into(),
        }
    }

    pub fn binding(function: &str, reason: BindingRejection) -> Self {
        Self::BindingRejection {
            function: function.to_string(),
            reason,
        }
    }

    /// Fold a list of violations into one error: `None` when empty, the
    /// violation itself when alone, otherwise [`ArgCheckError::Multiple`].
    #[must_use]
    pub fn combine(mut errors: Vec<Self>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Multiple(errors)),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // CLASSIFICATION
    // ═══════════════════════════════════════════════════════════════════════

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AnnotationCompilation { .. } => ErrorKind::AnnotationCompilation,
            Self::SignatureDefinition { .. } => ErrorKind::SignatureDefinition,
            Self::BindingRejection { .. } => ErrorKind::BindingRejection,
            Self::CheckExecution { .. } => ErrorKind::CheckExecution,
            Self::TypeCheckViolation { .. } => ErrorKind::TypeCheckViolation,
            Self::ValueCheckViolation { .. } => ErrorKind::ValueCheckViolation,
            Self::ElementCheckViolation { .. } => ErrorKind::ElementCheckViolation,
            Self::Multiple(_) => ErrorKind::Multiple,
        }
    }

    /// The violation kind, for the four call-time violations.
    #[must_use]
    pub const fn violation_kind(&self) -> Option<ViolationKind> {
        match self {
            Self::BindingRejection { .. } => Some(ViolationKind::BindingRejection),
            Self::TypeCheckViolation { .. } => Some(ViolationKind::TypeCheckViolation),
            Self::ValueCheckViolation { .. } => Some(ViolationKind::ValueCheckViolation),
            Self::ElementCheckViolation { .. } => Some(ViolationKind::ElementCheckViolation),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_violation(&self) -> bool {
        self.violation_kind().is_some()
    }

    /// Raised while wrapping a function rather than while calling it.
    #[must_use]
    pub const fn is_definition_error(&self) -> bool {
        matches!(
            self,
            Self::AnnotationCompilation { .. } | Self::SignatureDefinition { .. }
        )
    }

    #[must_use]
    pub const fn is_binding_rejection(&self) -> bool {
        matches!(self, Self::BindingRejection { .. })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════

    #[must_use]
    pub fn parameter_name(&self) -> Option<&str> {
        match self {
            Self::AnnotationCompilation { param, .. }
            | Self::CheckExecution { param, .. }
            | Self::TypeCheckViolation { param, .. }
            | Self::ValueCheckViolation { param, .. }
            | Self::ElementCheckViolation { param, .. } => Some(&param.name),
            Self::BindingRejection { reason, .. } => reason.name(),
            Self::SignatureDefinition { .. } | Self::Multiple(_) => None,
        }
    }

    /// The argument value that was rejected.
    #[must_use]
    pub const fn offending_value(&self) -> Option<&Value> {
        match self {
            Self::CheckExecution { arg, .. }
            | Self::TypeCheckViolation { arg, .. }
            | Self::ValueCheckViolation { arg, .. }
            | Self::ElementCheckViolation { arg, .. } => Some(&arg.value),
            _ => None,
        }
    }

    /// Where the rejected argument sat in the call.
    #[must_use]
    pub const fn offending_slot(&self) -> Option<&ArgSlot> {
        match self {
            Self::CheckExecution { arg, .. }
            | Self::TypeCheckViolation { arg, .. }
            | Self::ValueCheckViolation { arg, .. }
            | Self::ElementCheckViolation { arg, .. } => Some(&arg.slot),
            _ => None,
        }
    }

    /// Index of the failing element, for element violations.
    #[must_use]
    pub const fn offending_index(&self) -> Option<usize> {
        match self {
            Self::ElementCheckViolation { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Description of the check that failed or could not run.
    #[must_use]
    pub fn check_description(&self) -> Option<&str> {
        match self {
            Self::CheckExecution { check, .. }
            | Self::TypeCheckViolation { check, .. }
            | Self::ValueCheckViolation { check, .. }
            | Self::ElementCheckViolation { check, .. } => Some(check),
            _ => None,
        }
    }

    /// The gathered violations of a [`ArgCheckError::Multiple`], or `self` alone.
    #[must_use]
    pub fn violations(&self) -> Vec<&Self> {
        match self {
            Self::Multiple(errors) => errors.iter().collect(),
            other => vec![other],
        }
    }

    /// Flatten a single call-time violation into a [`ViolationRecord`].
    #[must_use]
    pub fn violation_record(&self) -> Option<ViolationRecord> {
        let kind = self.violation_kind()?;
        let constraint_description = match self {
            Self::BindingRejection { reason, .. } => reason.to_string(),
            other => other.check_description()?.to_string(),
        };
        let element = match self {
            Self::ElementCheckViolation { element, .. } => Some(element.clone()),
            _ => None,
        };
        Some(ViolationRecord {
            kind,
            parameter_name: self.parameter_name().map(str::to_string),
            offending_value: self.offending_value().cloned(),
            offending_index: self.offending_index(),
            element,
            constraint_description,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ═══════════════════════════════════════════════════════════════════════════
