//! The validating wrapper.
//!
//! [`validate_call`] compiles a signature once and returns a [`ValidatedFn`].
//! Each call through it binds the arguments, type-checks and value-checks
//! every bound parameter in declaration order, and only then runs the
//! wrapped function.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::binder::{bind, BoundArgument, BoundArguments, CallArgs};
use crate::config::{CheckConfig, ViolationPolicy};
use crate::descriptor::{DescriptorSet, ParameterDescriptor};
use crate::error::{ArgCheckError, ArgSlot, Result};
use crate::signature::FunctionSignature;
use crate::type_check::check_declared_type;
use crate::value::Value;
use crate::value_check::check_constraints;

/// A function wrapped with argument validation.
///
/// Cloning is cheap: the compiled descriptors are shared.
#[derive(Clone)]
pub struct ValidatedFn<F> {
    signature: Arc<FunctionSignature>,
    descriptors: Arc<DescriptorSet>,
    config: CheckConfig,
    func: F,
}

/// Wrap `func` with the default configuration.
///
/// # Errors
///
/// Returns a definition-time error if `signature` is malformed.
pub fn validate_call<F, R>(signature: FunctionSignature, func: F) -> Result<ValidatedFn<F>>
where
    F: Fn(&BoundArguments<'_>) -> R,
{
    validate_call_with(signature, CheckConfig::default(), func)
}

/// Wrap `func` with an explicit configuration.
///
/// # Errors
///
/// Returns a definition-time error if `signature` is malformed.
pub fn validate_call_with<F, R>(
    signature: FunctionSignature,
    config: CheckConfig,
    func: F,
) -> Result<ValidatedFn<F>>
where
    F: Fn(&BoundArguments<'_>) -> R,
{
    let descriptors = DescriptorSet::build(&signature).inspect_err(|e| {
        debug!(function = %signature.name, error = %e, "rejected function declaration");
    })?;

    debug!(
        function = %signature.name,
        params = descriptors.len(),
        policy = %config.policy,
        "wrapped function for argument validation"
    );

    Ok(ValidatedFn {
        signature: Arc::new(signature),
        descriptors: Arc::new(descriptors),
        config,
        func,
    })
}

impl<F> ValidatedFn<F> {
    /// The signature the wrapped function was declared with.
    #[must_use]
    pub fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    #[must_use]
    pub fn descriptors(&self) -> &DescriptorSet {
        &self.descriptors
    }

    #[must_use]
    pub const fn config(&self) -> &CheckConfig {
        &self.config
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.signature.name
    }

    /// Validate `args` and, if every check passes, call the wrapped function.
    ///
    /// # Errors
    ///
    /// Returns the binding rejection or check violation that stopped the
    /// call; the wrapped function is not run in that case.
    pub fn call<R>(&self, args: CallArgs) -> Result<R>
    where
        F: Fn(&BoundArguments<'_>) -> R,
    {
        let bound = bind(&self.descriptors, &args).inspect_err(|e| self.log_rejection(e))?;

        trace!(
            function = %self.name(),
            positional = args.positional.len(),
            keywords = args.keywords.len(),
            "bound call arguments"
        );

        self.check_bound(&bound)
            .inspect_err(|e| self.log_rejection(e))?;

        Ok((self.func)(&bound))
    }

    fn check_bound(&self, bound: &BoundArguments<'_>) -> Result<()> {
        match self.config.policy {
            ViolationPolicy::FailFast => bound.iter().try_for_each(check_argument),
            ViolationPolicy::CollectAll => {
                let mut violations = Vec::new();
                for argument in bound {
                    match check_argument(argument) {
                        Ok(()) => {}
                        Err(e) if e.is_violation() => violations.push(e),
                        Err(e) => return Err(e),
                    }
                }
                ArgCheckError::combine(violations).map_or(Ok(()), Err)
            }
        }
    }

    fn log_rejection(&self, error: &ArgCheckError) {
        let value = error
            .offending_value()
            .map(|v| v.truncated_repr(self.config.max_repr_len));
        debug!(
            function = %self.name(),
            kind = %error.kind(),
            param = error.parameter_name(),
            value = value.as_deref(),
            "call rejected"
        );
    }
}

impl<F> std::fmt::Debug for ValidatedFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatedFn")
            .field("signature", &self.signature.to_string())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Type check, then value checks, for every value bound to one parameter.
fn check_argument(argument: &BoundArgument<'_>) -> Result<()> {
    let parameter = argument.parameter;
    if parameter.is_unchecked() {
        return Ok(());
    }
    argument
        .checked_values()
        .into_iter()
        .try_for_each(|(slot, value)| check_value(parameter, &slot, value))
}

fn check_value(parameter: &ParameterDescriptor, slot: &ArgSlot, value: &Value) -> Result<()> {
    let param = parameter.decl_param();
    if let Some(declared) = &parameter.declared_type {
        check_declared_type(&param, declared, slot, value)?;
    }
    check_constraints(&param, &parameter.constraints, slot, value)
}
