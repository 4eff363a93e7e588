//! Predicates attached to parameters, and the leaf checks shipped with the crate.
//!
//! A predicate takes one value and answers pass or fail. It may also report a
//! [`PredicateFault`] when it cannot be evaluated against the value at all
//! (asking whether text is positive, say). Faults are contract violations of
//! the caller's declaration, never an ordinary failed check.

use std::fmt;
use std::sync::Arc;

use itertools::Itertools;

use crate::value::{Value, ValueType};

/// Shared, thread-safe handle to a predicate.
pub type SharedPredicate = Arc<dyn Predicate>;

/// An operation a predicate could not carry out on a value.
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateFault {
    pub operation: String,
    pub value: Value,
}

impl PredicateFault {
    pub fn new(operation: impl Into<String>, value: &Value) -> Self {
        Self {
            operation: operation.into(),
            value: value.clone(),
        }
    }
}

impl fmt::Display for PredicateFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "operation `{}` failed for this value: {}",
            self.operation, self.value
        )
    }
}

/// Outcome of evaluating a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Pass,
    /// The value as a whole failed.
    Fail,
    /// One element of a container failed.
    FailAt { index: usize, element: Value },
}

impl Verdict {
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl From<bool> for Verdict {
    fn from(passed: bool) -> Self {
        if passed {
            Self::Pass
        } else {
            Self::Fail
        }
    }
}

/// The one-value-in, pass-or-fail contract every check satisfies.
pub trait Predicate: Send + Sync {
    /// Human-readable statement of what is required, e.g. `isPositive()`.
    fn describe(&self) -> String;

    fn test(&self, value: &Value) -> Result<bool, PredicateFault>;

    /// Evaluate with element-level detail. Composed predicates that look
    /// inside containers override this to report the failing element.
    fn evaluate(&self, value: &Value) -> Result<Verdict, PredicateFault> {
        self.test(value).map(Verdict::from)
    }
}

impl fmt::Debug for dyn Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TYPE LEAVES
// ═══════════════════════════════════════════════════════════════════════════

/// The value's runtime type equals (or is a recognized subtype of) a base type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsTypeEqualTo(pub ValueType);

impl Predicate for IsTypeEqualTo {
    fn describe(&self) -> String {
        format!("isTypeEqualTo(type_declared={})", self.0)
    }

    fn test(&self, value: &Value) -> Result<bool, PredicateFault> {
        Ok(value.type_of().conforms_to(self.0))
    }
}

/// The value is some ordered, indexable sequence. Element types are not
/// inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsTypeOfSequence {
    declared: String,
}

impl IsTypeOfSequence {
    /// `declared` is the rendering of the declared type, used in diagnostics.
    pub fn new(declared: impl fmt::Display) -> Self {
        Self {
            declared: declared.to_string(),
        }
    }
}

impl Predicate for IsTypeOfSequence {
    fn describe(&self) -> String {
        format!("isTypeOfSequence(type_declared={})", self.declared)
    }

    fn test(&self, value: &Value) -> Result<bool, PredicateFault> {
        Ok(value.type_of().is_sequence())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// VALUE LEAVES
// ═══════════════════════════════════════════════════════════════════════════

/// `x > 0` for any numeric value.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsPositive;

impl Predicate for IsPositive {
    fn describe(&self) -> String {
        "isPositive()".to_string()
    }

    fn test(&self, value: &Value) -> Result<bool, PredicateFault> {
        match value {
            Value::Bool(_) | Value::Int(_) | Value::Float(_) => Ok(value
                .compare(&Value::Int(0))
                .is_some_and(std::cmp::Ordering::is_gt)),
            _ => Err(PredicateFault::new("x > 0", value)),
        }
    }
}

/// `len(x) > 0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsNotEmpty;

impl Predicate for IsNotEmpty {
    fn describe(&self) -> String {
        "isNotEmpty()".to_string()
    }

    fn test(&self, value: &Value) -> Result<bool, PredicateFault> {
        value
            .len()
            .map(|len| len > 0)
            .ok_or_else(|| PredicateFault::new("len(x)", value))
    }
}

/// Every element is strictly greater than the one before it.
///
/// Empty and single-element sequences pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsMonotonicIncr;

impl Predicate for IsMonotonicIncr {
    fn describe(&self) -> String {
        "isMonotonicIncr()".to_string()
    }

    fn test(&self, value: &Value) -> Result<bool, PredicateFault> {
        let items = value
            .as_sequence()
            .ok_or_else(|| PredicateFault::new("len(x)", value))?;

        for (prev, next) in items.iter().tuple_windows() {
            match next.compare(prev) {
                Some(ordering) if ordering.is_gt() => {}
                Some(_) => return Ok(false),
                None => return Err(PredicateFault::new("x[i+1] > x[i]", value)),
            }
        }
        Ok(true)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// COMBINATORS
// ═══════════════════════════════════════════════════════════════════════════

/// Applies an inner predicate to each element of an iterable value and
/// requires all of them to pass.
#[derive(Clone)]
pub struct EachAll {
    inner: SharedPredicate,
}

impl EachAll {
    pub fn new(inner: impl Predicate + 'static) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn from_shared(inner: SharedPredicate) -> Self {
        Self { inner }
    }

    #[must_use]
    pub fn inner(&self) -> &SharedPredicate {
        &self.inner
    }
}

impl fmt::Debug for EachAll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl Predicate for EachAll {
    fn describe(&self) -> String {
        format!("eachAll(check_applied_to_each={})", self.inner.describe())
    }

    fn test(&self, value: &Value) -> Result<bool, PredicateFault> {
        self.evaluate(value).map(|verdict| verdict.is_pass())
    }

    fn evaluate(&self, value: &Value) -> Result<Verdict, PredicateFault> {
        let items = value
            .iter_items()
            .ok_or_else(|| PredicateFault::new("for elem in x", value))?;

        for (index, element) in items.into_iter().enumerate() {
            if !self.inner.test(&element)? {
                return Ok(Verdict::FailAt { index, element });
            }
        }
        Ok(Verdict::Pass)
    }
}

/// An ad hoc predicate built from a closure.
pub struct FnPredicate<F> {
    name: String,
    func: F,
}

impl<F> FnPredicate<F>
where
    F: Fn(&Value) -> Result<bool, PredicateFault> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Predicate for FnPredicate<F>
where
    F: Fn(&Value) -> Result<bool, PredicateFault> + Send + Sync,
{
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn test(&self, value: &Value) -> Result<bool, PredicateFault> {
        (self.func)(value)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_positive() {
        assert_eq!(IsPositive.test(&Value::from(3)), Ok(true));
        assert_eq!(IsPositive.test(&Value::from(0)), Ok(false));
        assert_eq!(IsPositive.test(&Value::from(-0.5)), Ok(false));
        assert_eq!(IsPositive.test(&Value::from(true)), Ok(true));
    }

    #[test]
    fn test_is_positive_faults_on_text() {
        let fault = IsPositive.test(&Value::from("hello"));
        assert_eq!(fault, Err(PredicateFault::new("x > 0", &Value::from("hello"))));
    }

    #[test]
    fn test_is_positive_rejects_nan() {
        assert_eq!(IsPositive.test(&Value::from(f64::NAN)), Ok(false));
    }

    #[test]
    fn test_is_not_empty() {
        assert_eq!(IsNotEmpty.test(&Value::list(Vec::<i64>::new())), Ok(false));
        assert_eq!(IsNotEmpty.test(&Value::from("x")), Ok(true));
        assert!(IsNotEmpty.test(&Value::from(1)).is_err());
    }

    #[test]
    fn test_is_monotonic_incr_is_strict() {
        assert_eq!(IsMonotonicIncr.test(&Value::list([1, 2, 3])), Ok(true));
        assert_eq!(IsMonotonicIncr.test(&Value::list([5, 5])), Ok(false));
        assert_eq!(IsMonotonicIncr.test(&Value::list([3, 2])), Ok(false));
        assert_eq!(IsMonotonicIncr.test(&Value::list(Vec::<i64>::new())), Ok(true));
        assert_eq!(IsMonotonicIncr.test(&Value::list([7])), Ok(true));
    }

    #[test]
    fn test_is_monotonic_incr_faults_on_incomparable_elements() {
        let value = Value::list([Value::from(1), Value::from("a")]);
        let fault = IsMonotonicIncr.test(&value).err();
        assert_eq!(fault.map(|f| f.operation), Some("x[i+1] > x[i]".to_string()));
    }

    #[test]
    fn test_each_all_reports_first_failing_element() {
        let check = EachAll::new(IsPositive);
        let verdict = check.evaluate(&Value::list([4, 0, -1]));
        assert_eq!(
            verdict,
            Ok(Verdict::FailAt {
                index: 1,
                element: Value::from(0)
            })
        );
        assert_eq!(check.test(&Value::list([1, 2])), Ok(true));
    }

    #[test]
    fn test_each_all_faults_on_non_iterable() {
        let fault = EachAll::new(IsPositive).evaluate(&Value::from(5)).err();
        assert_eq!(fault.map(|f| f.operation), Some("for elem in x".to_string()));
    }

    #[test]
    fn test_each_all_propagates_inner_fault() {
        let fault = EachAll::new(IsPositive)
            .evaluate(&Value::list([Value::from(1), Value::from("x")]))
            .err();
        assert_eq!(fault.map(|f| f.value), Some(Value::from("x")));
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(
            EachAll::new(IsPositive).describe(),
            "eachAll(check_applied_to_each=isPositive())"
        );
        assert_eq!(
            IsTypeEqualTo(ValueType::Int).describe(),
            "isTypeEqualTo(type_declared=int)"
        );
        assert_eq!(
            IsTypeOfSequence::new("Sequence[int]").describe(),
            "isTypeOfSequence(type_declared=Sequence[int])"
        );
    }

    #[test]
    fn test_type_leaves() {
        assert_eq!(IsTypeEqualTo(ValueType::Int).test(&Value::from(true)), Ok(true));
        assert_eq!(IsTypeEqualTo(ValueType::Int).test(&Value::from("1")), Ok(false));
        let seq = IsTypeOfSequence::new("Sequence");
        assert_eq!(seq.test(&Value::tuple([1])), Ok(true));
        assert_eq!(seq.test(&Value::from("abc")), Ok(false));
    }

    #[test]
    fn test_fn_predicate() {
        let even = FnPredicate::new("isEven()", |v: &Value| {
            v.as_int()
                .map(|i| i % 2 == 0)
                .ok_or_else(|| PredicateFault::new("x % 2", v))
        });
        assert_eq!(even.describe(), "isEven()");
        assert_eq!(even.test(&Value::from(4)), Ok(true));
        assert!(even.test(&Value::None).is_err());
    }
}
