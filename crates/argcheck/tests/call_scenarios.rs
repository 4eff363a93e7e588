//! Call scenarios: valid and invalid arguments passed to wrapped functions.
//!
//! Every wrapped function returns the value bound to its first declared
//! parameter (or `None` when it declares none), so a successful call can be
//! checked against the argument that was passed in.
//!
//! Run with: cargo test --package argcheck --test call_scenarios

#![allow(
    clippy::uninlined_format_args,
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::redundant_closure_for_method_calls,
    clippy::useless_vec,
    clippy::doc_markdown
)]

use argcheck::{
    validate_call, Annotation, ArgCheckError, ArgSlot, BindingRejection, BoundArguments,
    CallArgs, EachAll, ErrorKind, FunctionSignature, IsMonotonicIncr, IsNotEmpty, IsPositive,
    Metadata, Param, ValidatedFn, Value, ValueType,
};

type EchoFn = fn(&BoundArguments<'_>) -> Option<Value>;

/// Returns the value bound to the first declared parameter.
fn echo_first(args: &BoundArguments<'_>) -> Option<Value> {
    args.iter().next().map(|a| a.value())
}

fn wrap(signature: FunctionSignature) -> ValidatedFn<EchoFn> {
    validate_call(signature, echo_first as EchoFn).expect("signature should compile")
}

fn int() -> Annotation {
    Annotation::from(ValueType::Int)
}

fn positive_int() -> Annotation {
    int().with(IsPositive)
}

fn sizes_annotation() -> Annotation {
    Annotation::sequence_of(ValueType::Int).annotated(vec![Metadata::Group(vec![
        IsNotEmpty.into(),
        IsMonotonicIncr.into(),
        EachAll::new(IsPositive).into(),
    ])])
}

// ═══════════════════════════════════════════════════════════════════════════
// FUNCTIONS UNDER TEST
// ═══════════════════════════════════════════════════════════════════════════

fn params_0_no_annots() -> ValidatedFn<EchoFn> {
    wrap(FunctionSignature::new("deco_0_params_no_annots"))
}

fn params_1_no_annots() -> ValidatedFn<EchoFn> {
    wrap(FunctionSignature::new("deco_1_params_no_annots").param(Param::positional("param")))
}

fn params_2_no_annots() -> ValidatedFn<EchoFn> {
    wrap(
        FunctionSignature::new("deco_2_params_no_annots")
            .param(Param::positional("param_1"))
            .param(Param::positional("param_2")),
    )
}

fn params_2_annot_1_int() -> ValidatedFn<EchoFn> {
    wrap(
        FunctionSignature::new("deco_2_params_annot_1_int")
            .param(Param::positional("param_1").annotated(int()))
            .param(Param::positional("param_2")),
    )
}

fn params_2_annot_2_int() -> ValidatedFn<EchoFn> {
    wrap(
        FunctionSignature::new("deco_2_params_annot_2_int")
            .param(Param::positional("param_1"))
            .param(Param::positional("param_2").annotated(int())),
    )
}

fn annot_int_dflt_int() -> ValidatedFn<EchoFn> {
    wrap(
        FunctionSignature::new("deco_1_params_annot_int_dflt_int")
            .param(Param::positional("param").annotated(int()).with_default(33)),
    )
}

fn annot_int_dflt_str() -> ValidatedFn<EchoFn> {
    wrap(
        FunctionSignature::new("deco_1_params_annot_int_dflt_str")
            .param(Param::positional("param").annotated(int()).with_default("hello")),
    )
}

fn make_layers() -> ValidatedFn<EchoFn> {
    wrap(
        FunctionSignature::new("make_layers")
            .param(Param::positional("a").annotated(positive_int()).with_default(3))
            .param(Param::positional("b").annotated(positive_int()).with_default(1))
            .param(
                Param::positional("sizes")
                    .annotated(sizes_annotation())
                    .with_default(Value::list([64, 128, 256, 512])),
            ),
    )
}

fn binding_reason(err: &ArgCheckError) -> Option<&BindingRejection> {
    match err {
        ArgCheckError::BindingRejection { reason, .. } => Some(reason),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// UNANNOTATED PARAMETERS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn zero_params_zero_args_returns_none() {
    assert_eq!(params_0_no_annots().call(CallArgs::new()), Ok(None));
}

#[test]
fn one_param_one_arg_echoes() {
    let result = params_1_no_annots().call(CallArgs::new().arg(8_675_309));
    assert_eq!(result, Ok(Some(Value::from(8_675_309))));
}

#[test]
fn two_params_two_args_echoes_first() {
    let result = params_2_no_annots().call(CallArgs::new().arg(11).arg(22));
    assert_eq!(result, Ok(Some(Value::from(11))));
}

#[test]
fn two_params_too_few_args_is_binding_rejection() {
    let err = params_2_no_annots()
        .call(CallArgs::new().arg(1))
        .expect_err("call should be rejected");
    assert_eq!(
        binding_reason(&err),
        Some(&BindingRejection::MissingArgument {
            name: "param_2".into()
        })
    );
    assert_eq!(
        err.to_string(),
        "unable to bind function call argument for `deco_2_params_no_annots`: \
         missing a required argument: 'param_2'"
    );
}

#[test]
fn two_params_too_many_args_is_binding_rejection() {
    let err = params_2_no_annots()
        .call(CallArgs::new().arg(1).arg(2).arg(3))
        .expect_err("call should be rejected");
    assert!(binding_reason(&err).is_some_and(|r| r.is_arity_mismatch()));
    assert!(err.to_string().ends_with("too many positional arguments"));
}

#[test]
fn undeclared_keyword_is_binding_rejection() {
    let err = params_1_no_annots()
        .call(CallArgs::new().arg(1).kwarg("undeclared_kwd", 2))
        .expect_err("call should be rejected");
    assert_eq!(err.kind(), ErrorKind::BindingRejection);
    assert!(err
        .to_string()
        .ends_with("got an unexpected keyword argument 'undeclared_kwd'"));
}

// ═══════════════════════════════════════════════════════════════════════════
// TYPE ANNOTATIONS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn annotated_first_param_accepts_int() {
    let result = params_2_annot_1_int().call(CallArgs::new().arg(5).arg(6));
    assert_eq!(result, Ok(Some(Value::from(5))));
}

#[test]
fn unannotated_second_param_accepts_anything() {
    let result = params_2_annot_1_int().call(CallArgs::new().arg(5).arg("hello"));
    assert_eq!(result, Ok(Some(Value::from(5))));
}

#[test]
fn annotated_first_param_rejects_str() {
    let err = params_2_annot_1_int()
        .call(CallArgs::new().arg("hello").arg(6))
        .expect_err("call should be rejected");
    assert_eq!(
        err.to_string(),
        "violation of type check `isTypeEqualTo(type_declared=int)` for param \
         [0]='param_1' (declared=int; received=str): [0]='hello'"
    );
}

#[test]
fn annotated_second_param_rejects_str() {
    let err = params_2_annot_2_int()
        .call(CallArgs::new().arg(5).arg("hello"))
        .expect_err("call should be rejected");
    assert_eq!(
        err.to_string(),
        "violation of type check `isTypeEqualTo(type_declared=int)` for param \
         [1]='param_2' (declared=int; received=str): [1]='hello'"
    );
}

#[test]
fn annotated_second_param_does_not_constrain_first() {
    let result = params_2_annot_2_int().call(CallArgs::new().arg("hello").arg(6));
    assert_eq!(result, Ok(Some(Value::from("hello"))));
}

#[test]
fn keyword_argument_is_reported_by_keyword() {
    let err = params_2_annot_2_int()
        .call(CallArgs::new().arg(5).kwarg("param_2", "hello"))
        .expect_err("call should be rejected");
    assert_eq!(err.offending_slot(), Some(&ArgSlot::Keyword("param_2".into())));
    assert!(err.to_string().ends_with("['param_2']='hello'"));
}

// ═══════════════════════════════════════════════════════════════════════════
// DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn default_int_overridden_by_argument() {
    let result = annot_int_dflt_int().call(CallArgs::new().arg(7));
    assert_eq!(result, Ok(Some(Value::from(7))));
}

#[test]
fn default_int_used_when_omitted() {
    assert_eq!(annot_int_dflt_int().call(CallArgs::new()), Ok(Some(Value::from(33))));
}

#[test]
fn default_int_param_rejects_str_argument() {
    let err = annot_int_dflt_int()
        .call(CallArgs::new().arg("hello"))
        .expect_err("call should be rejected");
    assert_eq!(err.kind(), ErrorKind::TypeCheckViolation);
    assert_eq!(err.parameter_name(), Some("param"));
}

#[test]
fn default_violating_its_annotation_is_checked() {
    let err = annot_int_dflt_str()
        .call(CallArgs::new())
        .expect_err("default should be checked");
    assert_eq!(err.kind(), ErrorKind::TypeCheckViolation);
    assert_eq!(err.offending_slot(), Some(&ArgSlot::Default));
    assert_eq!(err.offending_value(), Some(&Value::from("hello")));
}

#[test]
fn default_violation_matches_explicit_violation_kind() {
    let implicit = annot_int_dflt_str().call(CallArgs::new()).map_err(|e| e.kind());
    let explicit = annot_int_dflt_str()
        .call(CallArgs::new().arg("hello"))
        .map_err(|e| e.kind());
    assert_eq!(implicit, explicit);
}

// ═══════════════════════════════════════════════════════════════════════════
// SEQUENCE CONSTRAINTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn layers_with_no_arguments_use_defaults() {
    assert_eq!(make_layers().call(CallArgs::new()), Ok(Some(Value::from(3))));
}

#[test]
fn layers_with_empty_sizes_is_value_violation() {
    let err = make_layers()
        .call(CallArgs::new().kwarg("sizes", Value::list(Vec::<i64>::new())))
        .expect_err("empty sizes should be rejected");
    assert_eq!(err.kind(), ErrorKind::ValueCheckViolation);
    assert_eq!(err.check_description(), Some("isNotEmpty()"));
    assert_eq!(err.offending_index(), None);
}

#[test]
fn layers_with_zero_size_is_element_violation() {
    let err = make_layers()
        .call(CallArgs::new().kwarg("sizes", Value::list([0])))
        .expect_err("zero size should be rejected");
    assert_eq!(err.kind(), ErrorKind::ElementCheckViolation);
    assert_eq!(err.offending_index(), Some(0));
    assert_eq!(
        err.to_string(),
        "violation of sequence check `eachAll(check_applied_to_each=isPositive())` for param \
         [2]='sizes': ['sizes']=[0] (at sequence element [0]=0)"
    );
}

#[test]
fn layers_with_repeated_sizes_is_value_violation() {
    let err = make_layers()
        .call(CallArgs::new().kwarg("sizes", Value::list([5, 5, 5, 5, 5, 5, 5])))
        .expect_err("non-increasing sizes should be rejected");
    assert_eq!(err.kind(), ErrorKind::ValueCheckViolation);
    assert_eq!(err.check_description(), Some("isMonotonicIncr()"));
}

#[test]
fn layers_with_all_positional_arguments_echo_first() {
    let result = make_layers().call(
        CallArgs::new()
            .arg(425)
            .arg(241)
            .arg(Value::list([470, 471, 472, 473, 474])),
    );
    assert_eq!(result, Ok(Some(Value::from(425))));
}

#[test]
fn layers_with_float_size_is_element_type_violation() {
    let err = make_layers()
        .call(CallArgs::new().kwarg("sizes", Value::list([Value::from(1), Value::from(2.5)])))
        .expect_err("float element should be rejected");
    assert_eq!(err.kind(), ErrorKind::ElementCheckViolation);
    assert_eq!(err.offending_index(), Some(1));
    assert_eq!(
        err.check_description(),
        Some("eachAll(check_applied_to_each=isTypeEqualTo(type_declared=int))")
    );
}

#[test]
fn layers_with_scalar_sizes_is_type_violation() {
    let err = make_layers()
        .call(CallArgs::new().kwarg("sizes", 64))
        .expect_err("scalar sizes should be rejected");
    assert_eq!(err.kind(), ErrorKind::TypeCheckViolation);
    assert!(err.to_string().contains("(declared=Sequence[int]; received=int)"));
}

#[test]
fn layers_with_non_positive_first_argument() {
    let err = make_layers()
        .call(CallArgs::new().arg(0))
        .expect_err("zero should be rejected");
    assert_eq!(err.kind(), ErrorKind::ValueCheckViolation);
    assert_eq!(err.parameter_name(), Some("a"));
}

#[test]
fn predicate_fault_is_execution_error_not_violation() {
    let wrapped = wrap(
        FunctionSignature::new("f").param(Param::positional("x").annotated(
            Annotation::from(ValueType::Str).with(IsPositive),
        )),
    );
    let err = wrapped
        .call(CallArgs::new().arg("hello"))
        .expect_err("fault should be reported");
    assert_eq!(err.kind(), ErrorKind::CheckExecution);
    assert!(!err.is_violation());
    assert_eq!(
        err.to_string(),
        "operation `x > 0` failed for param [0]='x' during check `isPositive()` for this value: 'hello'"
    );
}

#[test]
fn violation_record_describes_failure() {
    let err = make_layers()
        .call(CallArgs::new().kwarg("sizes", Value::list([3, 2])))
        .expect_err("decreasing sizes should be rejected");
    let record = err.violation_record().expect("violation should have a record");
    assert_eq!(record.parameter_name.as_deref(), Some("sizes"));
    assert_eq!(record.offending_value, Some(Value::list([3, 2])));
    assert_eq!(record.constraint_description, "isMonotonicIncr()");
}
