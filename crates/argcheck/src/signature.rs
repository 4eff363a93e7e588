//! Function signatures as declared by the author of a validated function.

use std::fmt;

use serde::Serialize;
use strum::{Display, EnumIter};

use crate::annotation::Annotation;
use crate::value::Value;

/// How a parameter accepts its argument.
///
/// Variants are ordered the way parameters must appear in a signature.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, Serialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ParamKind {
    PositionalOnly,
    PositionalOrKeyword,
    VarPositional,
    KeywordOnly,
    VarKeyword,
}

impl ParamKind {
    /// Can receive an argument by position.
    #[must_use]
    pub const fn is_positional(self) -> bool {
        matches!(self, Self::PositionalOnly | Self::PositionalOrKeyword)
    }

    #[must_use]
    pub const fn is_variadic(self) -> bool {
        matches!(self, Self::VarPositional | Self::VarKeyword)
    }
}

/// One declared parameter.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
    pub default: Option<Value>,
    pub annotation: Option<Annotation>,
}

impl Param {
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            annotation: None,
        }
    }

    /// A positional-or-keyword parameter.
    pub fn positional(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::PositionalOrKeyword)
    }

    pub fn positional_only(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::PositionalOnly)
    }

    pub fn keyword_only(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::KeywordOnly)
    }

    /// Collects surplus positional arguments (`*name`).
    pub fn var_positional(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::VarPositional)
    }

    /// Collects surplus keyword arguments (`**name`).
    pub fn var_keyword(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::VarKeyword)
    }

    #[must_use]
    pub fn annotated(mut self, annotation: impl Into<Annotation>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ParamKind::VarPositional => write!(f, "*")?,
            ParamKind::VarKeyword => write!(f, "**")?,
            _ => {}
        }
        write!(f, "{}", self.name)?;
        match (&self.annotation, &self.default) {
            (Some(annotation), Some(default)) => write!(f, ": {annotation} = {default}"),
            (Some(annotation), None) => write!(f, ": {annotation}"),
            (None, Some(default)) => write!(f, "={default}"),
            (None, None) => Ok(()),
        }
    }
}

/// The declared name and parameter list of a function.
#[derive(Debug, Clone)]
pub struct FunctionSignature {
    pub name: String,
    pub params: Vec<Param>,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let has_var_positional = self
            .params
            .iter()
            .any(|p| p.kind == ParamKind::VarPositional);
        let mut parts: Vec<String> = Vec::with_capacity(self.params.len() + 2);
        let mut previous: Option<ParamKind> = None;

        for param in &self.params {
            if previous == Some(ParamKind::PositionalOnly) && param.kind != ParamKind::PositionalOnly
            {
                parts.push("/".to_string());
            }
            if param.kind == ParamKind::KeywordOnly
                && !has_var_positional
                && previous.map_or(true, |kind| kind < ParamKind::KeywordOnly)
            {
                parts.push("*".to_string());
            }
            parts.push(param.to_string());
            previous = Some(param.kind);
        }
        if previous == Some(ParamKind::PositionalOnly) {
            parts.push("/".to_string());
        }
        write!(f, "{}({})", self.name, parts.join(", "))
    }
}
