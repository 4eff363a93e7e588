//! Evaluation of a parameter's constraint list against one value.

use crate::checks::{SharedPredicate, Verdict};
use crate::error::{ArgCheckError, ArgSlot, CallArg, DeclParam, Result};
use crate::type_check::execution_error;
use crate::value::Value;

/// Evaluate `constraints` in order, stopping at the first that does not pass.
///
/// # Errors
///
/// - `ValueCheckViolation` when a constraint fails on the value as a whole
/// - `ElementCheckViolation` when a constraint fails on one element
/// - `CheckExecution` when a constraint cannot be evaluated
pub fn check_constraints(
    param: &DeclParam,
    constraints: &[SharedPredicate],
    slot: &ArgSlot,
    value: &Value,
) -> Result<()> {
    constraints.iter().try_for_each(|check| match check.evaluate(value) {
        Ok(Verdict::Pass) => Ok(()),
        Ok(Verdict::Fail) => Err(ArgCheckError::ValueCheckViolation {
            param: param.clone(),
            arg: CallArg::new(slot.clone(), value),
            check: check.describe(),
        }),
        Ok(Verdict::FailAt { index, element }) => Err(ArgCheckError::ElementCheckViolation {
            param: param.clone(),
            arg: CallArg::new(slot.clone(), value),
            check: check.describe(),
            index,
            element,
        }),
        Err(fault) => Err(execution_error(param, slot, value, check, fault)),
    })
}
