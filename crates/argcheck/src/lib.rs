//! # argcheck
//!
//! Declarative validation of function-call arguments.
//!
//! A function declares its parameters once, with optional type annotations
//! and constraint metadata. Wrapping it with [`validate_call`] compiles that
//! declaration into an immutable plan; every call through the wrapper is then
//! bound, type-checked and value-checked before the function body runs.
//!
//! ```
//! use argcheck::{
//!     validate_call, Annotation, BoundArguments, CallArgs, EachAll, ErrorKind,
//!     FunctionSignature, IsMonotonicIncr, IsNotEmpty, IsPositive, Param, Value, ValueType,
//! };
//!
//! let signature = FunctionSignature::new("make_layers")
//!     .param(
//!         Param::positional("a")
//!             .annotated(Annotation::from(ValueType::Int).with(IsPositive))
//!             .with_default(3),
//!     )
//!     .param(
//!         Param::positional("sizes")
//!             .annotated(
//!                 Annotation::sequence_of(ValueType::Int)
//!                     .with(IsNotEmpty)
//!                     .with(IsMonotonicIncr)
//!                     .with(EachAll::new(IsPositive)),
//!             )
//!             .with_default(Value::list([64, 128, 256])),
//!     );
//!
//! let make_layers = validate_call(signature, |args: &BoundArguments<'_>| args.value("a"))?;
//!
//! assert_eq!(make_layers.call(CallArgs::new())?, Some(Value::from(3)));
//!
//! let err = make_layers
//!     .call(CallArgs::new().kwarg("sizes", Value::list([0])))
//!     .unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::ElementCheckViolation);
//! assert_eq!(err.offending_index(), Some(0));
//! # Ok::<(), argcheck::ArgCheckError>(())
//! ```
//!
//! ## Error Handling
//!
//! Definition problems surface from [`validate_call`]; call problems surface
//! from [`ValidatedFn::call`]. Both are [`ArgCheckError`]s, discriminated by
//! [`ArgCheckError::kind`].

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod annotation;
pub mod binder;
pub mod checks;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod signature;
pub mod type_check;
pub mod validate;
pub mod value;
pub mod value_check;

pub use annotation::{Annotation, Metadata};
pub use binder::{bind, Binding, BoundArgument, BoundArguments, CallArgs};
pub use checks::{
    EachAll, FnPredicate, IsMonotonicIncr, IsNotEmpty, IsPositive, IsTypeEqualTo,
    IsTypeOfSequence, Predicate, PredicateFault, SharedPredicate, Verdict,
};
pub use config::{CheckConfig, ConfigError, ViolationPolicy};
pub use descriptor::{DescriptorSet, ParameterDescriptor};
pub use error::{
    ArgCheckError, ArgSlot, BindingRejection, CallArg, DeclParam, ErrorKind, Result,
    ViolationKind, ViolationRecord,
};
pub use signature::{FunctionSignature, Param, ParamKind};
pub use type_check::{DeclaredType, TypeSpec};
pub use validate::{validate_call, validate_call_with, ValidatedFn};
pub use value::{Value, ValueType};
