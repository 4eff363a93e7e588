//! Runtime type conformance.
//!
//! A declared type compiles to a structural check on the value itself and,
//! for `Sequence[T]`, an element-wise check that every item conforms to `T`.
//! The two are reported differently: a wrong outer shape is a type
//! violation, a wrong element is an element violation.

use std::fmt;
use std::sync::Arc;

use crate::checks::{
    EachAll, IsTypeEqualTo, IsTypeOfSequence, Predicate, PredicateFault, SharedPredicate, Verdict,
};
use crate::error::{ArgCheckError, ArgSlot, CallArg, DeclParam, Result};
use crate::value::{Value, ValueType};

/// A declared type with no constraint metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSpec {
    Exact(ValueType),
    Sequence,
    SequenceOf(Box<TypeSpec>),
}

impl TypeSpec {
    /// Full recursive conformance, elements included.
    #[must_use]
    pub fn conforms(&self, value: &Value) -> bool {
        match self {
            Self::Exact(ty) => value.type_of().conforms_to(*ty),
            Self::Sequence => value.type_of().is_sequence(),
            Self::SequenceOf(element) => value
                .as_sequence()
                .is_some_and(|items| items.iter().all(|item| element.conforms(item))),
        }
    }

    fn structural_check(&self) -> SharedPredicate {
        match self {
            Self::Exact(ty) => Arc::new(IsTypeEqualTo(*ty)),
            Self::Sequence | Self::SequenceOf(_) => Arc::new(IsTypeOfSequence::new(self)),
        }
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(ty) => write!(f, "{ty}"),
            Self::Sequence => write!(f, "Sequence"),
            Self::SequenceOf(element) => write!(f, "Sequence[{element}]"),
        }
    }
}

/// Used as the per-element check of a nested sequence type.
impl Predicate for TypeSpec {
    fn describe(&self) -> String {
        self.structural_check().describe()
    }

    fn test(&self, value: &Value) -> std::result::Result<bool, PredicateFault> {
        Ok(self.conforms(value))
    }
}

/// A compiled declared type.
#[derive(Debug, Clone)]
pub struct DeclaredType {
    spec: TypeSpec,
    structural: SharedPredicate,
    elements: Option<SharedPredicate>,
}

impl DeclaredType {
    pub fn new(spec: TypeSpec) -> Self {
        let structural = spec.structural_check();
        let elements = match &spec {
            TypeSpec::SequenceOf(element) => {
                let per_element: SharedPredicate = match element.as_ref() {
                    TypeSpec::Exact(ty) => Arc::new(IsTypeEqualTo(*ty)),
                    nested => Arc::new(nested.clone()),
                };
                Some(Arc::new(EachAll::from_shared(per_element)) as SharedPredicate)
            }
            TypeSpec::Exact(_) | TypeSpec::Sequence => None,
        };
        Self {
            spec,
            structural,
            elements,
        }
    }

    #[must_use]
    pub const fn spec(&self) -> &TypeSpec {
        &self.spec
    }

    /// Checks in the order they run: structural, then element-wise.
    pub fn checks(&self) -> impl Iterator<Item = &SharedPredicate> {
        std::iter::once(&self.structural).chain(self.elements.as_ref())
    }
}

/// Verify that `value` conforms to `declared`.
///
/// # Errors
///
/// - `TypeCheckViolation` if the value has the wrong shape
/// - `ElementCheckViolation` if an element of a sequence has the wrong type
/// - `CheckExecution` if a check could not be evaluated
pub fn check_declared_type(
    param: &DeclParam,
    declared: &DeclaredType,
    slot: &ArgSlot,
    value: &Value,
) -> Result<()> {
    match declared.structural.test(value) {
        Ok(true) => {}
        Ok(false) => {
            return Err(ArgCheckError::TypeCheckViolation {
                param: param.clone(),
                arg: CallArg::new(slot.clone(), value),
                check: declared.structural.describe(),
                declared: declared.spec.to_string(),
                received: value.type_of(),
            })
        }
        Err(fault) => {
            return Err(execution_error(
                param,
                slot,
                value,
                &declared.structural,
                fault,
            ))
        }
    }

    let Some(elements) = &declared.elements else {
        return Ok(());
    };
    match elements.evaluate(value) {
        Ok(Verdict::Pass) => Ok(()),
        Ok(Verdict::FailAt { index, element }) => Err(ArgCheckError::ElementCheckViolation {
            param: param.clone(),
            arg: CallArg::new(slot.clone(), value),
            check: elements.describe(),
            index,
            element,
        }),
        Ok(Verdict::Fail) => Err(ArgCheckError::TypeCheckViolation {
            param: param.clone(),
            arg: CallArg::new(slot.clone(), value),
            check: elements.describe(),
            declared: declared.spec.to_string(),
            received: value.type_of(),
        }),
        Err(fault) => Err(execution_error(param, slot, value, elements, fault)),
    }
}

pub(crate) fn execution_error(
    param: &DeclParam,
    slot: &ArgSlot,
    value: &Value,
    check: &SharedPredicate,
    fault: PredicateFault,
) -> ArgCheckError {
    ArgCheckError::CheckExecution {
        param: param.clone(),
        arg: CallArg::new(slot.clone(), value),
        check: check.describe(),
        operation: fault.operation,
        value: fault.value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn param() -> DeclParam {
        DeclParam::new(0, "sizes")
    }

    fn seq_of_int() -> DeclaredType {
        DeclaredType::new(TypeSpec::SequenceOf(Box::new(TypeSpec::Exact(ValueType::Int))))
    }

    #[test]
    fn test_exact_type_accepts_subtype() {
        let declared = DeclaredType::new(TypeSpec::Exact(ValueType::Int));
        let result = check_declared_type(&param(), &declared, &ArgSlot::Position(0), &Value::from(true));
        assert!(result.is_ok());
    }

    #[test]
    fn test_exact_type_mismatch_is_type_violation() {
        let declared = DeclaredType::new(TypeSpec::Exact(ValueType::Int));
        let err = check_declared_type(&param(), &declared, &ArgSlot::Position(0), &Value::from("x"))
            .err();
        assert_eq!(err.as_ref().map(ArgCheckError::kind), Some(ErrorKind::TypeCheckViolation));
        assert!(err.is_some_and(|e| e
            .to_string()
            .contains("(declared=int; received=str)")));
    }

    #[test]
    fn test_sequence_of_wrong_shape_is_type_violation() {
        let err = check_declared_type(&param(), &seq_of_int(), &ArgSlot::Default, &Value::from(5))
            .err();
        assert_eq!(err.map(|e| e.kind()), Some(ErrorKind::TypeCheckViolation));
    }

    #[test]
    fn test_text_is_not_a_sequence() {
        let declared = DeclaredType::new(TypeSpec::Sequence);
        let err = check_declared_type(&param(), &declared, &ArgSlot::Default, &Value::from("abc"))
            .err();
        assert_eq!(err.map(|e| e.kind()), Some(ErrorKind::TypeCheckViolation));
    }

    #[test]
    fn test_sequence_of_wrong_element_is_element_violation() {
        let value = Value::list([Value::from(1), Value::from(2.5)]);
        let err = check_declared_type(&param(), &seq_of_int(), &ArgSlot::Position(2), &value).err();
        assert_eq!(err.as_ref().map(ArgCheckError::kind), Some(ErrorKind::ElementCheckViolation));
        assert_eq!(err.and_then(|e| e.offending_index()), Some(1));
    }

    #[test]
    fn test_tuple_of_ints_conforms() {
        let result =
            check_declared_type(&param(), &seq_of_int(), &ArgSlot::Position(0), &Value::tuple([1, 2]));
        assert!(result.is_ok());
    }

    #[test]
    fn test_nested_sequences_check_inner_elements() {
        let spec = TypeSpec::SequenceOf(Box::new(TypeSpec::SequenceOf(Box::new(
            TypeSpec::Exact(ValueType::Int),
        ))));
        let declared = DeclaredType::new(spec);
        let good = Value::list([Value::list([1]), Value::tuple([2, 3])]);
        assert!(check_declared_type(&param(), &declared, &ArgSlot::Default, &good).is_ok());

        let bad = Value::list([Value::list([1]), Value::list([Value::from("x")])]);
        let err = check_declared_type(&param(), &declared, &ArgSlot::Default, &bad).err();
        assert_eq!(err.and_then(|e| e.offending_index()), Some(1));
    }

    #[test]
    fn test_declared_type_check_order_and_descriptions() {
        let descriptions: Vec<String> = seq_of_int().checks().map(|c| c.describe()).collect();
        assert_eq!(
            descriptions,
            vec![
                "isTypeOfSequence(type_declared=Sequence[int])",
                "eachAll(check_applied_to_each=isTypeEqualTo(type_declared=int))",
            ]
        );
    }
}
