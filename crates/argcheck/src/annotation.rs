//! Declared-type and constraint metadata attached to a parameter.

use std::fmt;
use std::sync::Arc;

use itertools::Itertools;

use crate::checks::{Predicate, SharedPredicate};
use crate::value::ValueType;

/// A parameter annotation: a declared type, optionally carrying constraint
/// metadata.
#[derive(Debug, Clone)]
pub enum Annotation {
    /// A base type, e.g. `int`.
    Type(ValueType),
    /// Some ordered sequence; element types are unconstrained.
    Sequence,
    /// An ordered sequence whose elements all conform to the inner type.
    SequenceOf(Box<Annotation>),
    /// A type plus side-channel constraint metadata.
    Annotated(Box<Annotation>, Vec<Metadata>),
}

impl Annotation {
    pub fn sequence_of(element: impl Into<Self>) -> Self {
        Self::SequenceOf(Box::new(element.into()))
    }

    /// Attach one more piece of metadata, extending an existing `Annotated`
    /// rather than nesting a new one.
    #[must_use]
    pub fn with(self, metadata: impl Into<Metadata>) -> Self {
        match self {
            Self::Annotated(inner, mut existing) => {
                existing.push(metadata.into());
                Self::Annotated(inner, existing)
            }
            other => Self::Annotated(Box::new(other), vec![metadata.into()]),
        }
    }

    /// Wrap `self` in `Annotated` with an explicit metadata list.
    #[must_use]
    pub fn annotated(self, metadata: Vec<Metadata>) -> Self {
        Self::Annotated(Box::new(self), metadata)
    }
}

impl From<ValueType> for Annotation {
    fn from(ty: ValueType) -> Self {
        Self::Type(ty)
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(ty) => write!(f, "{ty}"),
            Self::Sequence => write!(f, "Sequence"),
            Self::SequenceOf(inner) => write!(f, "Sequence[{inner}]"),
            Self::Annotated(inner, metadata) => {
                write!(f, "Annotated[{inner}")?;
                for m in metadata {
                    write!(f, ", {m}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// One entry of an `Annotated` metadata list.
#[derive(Clone)]
pub enum Metadata {
    Check(SharedPredicate),
    /// A nested list of metadata, flattened in order when compiled.
    Group(Vec<Metadata>),
}

impl Metadata {
    pub fn check(predicate: impl Predicate + 'static) -> Self {
        Self::Check(Arc::new(predicate))
    }

    /// Flatten into the ordered sequence of predicates this metadata stands for.
    #[must_use]
    pub fn flatten(&self) -> Vec<SharedPredicate> {
        match self {
            Self::Check(predicate) => vec![Arc::clone(predicate)],
            Self::Group(items) => items.iter().flat_map(Self::flatten).collect(),
        }
    }
}

impl<P: Predicate + 'static> From<P> for Metadata {
    fn from(predicate: P) -> Self {
        Self::check(predicate)
    }
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Check(predicate) => f.write_str(&predicate.describe()),
            Self::Group(items) => write!(f, "[{}]", items.iter().join(", ")),
        }
    }
}
