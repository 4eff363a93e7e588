//! Mapping a call's actual arguments onto declared parameters.
//!
//! Binding follows the rules of an ordinary call: positional arguments fill
//! positional parameters left to right, surplus positionals go to `*args`,
//! keywords fill parameters by name, surplus keywords go to `**kwargs`, and
//! omitted parameters take their defaults.

use im::{OrdMap, Vector};

use crate::descriptor::{DescriptorSet, ParameterDescriptor};
use crate::error::{ArgCheckError, ArgSlot, BindingRejection, Result};
use crate::signature::ParamKind;
use crate::value::Value;

// ═══════════════════════════════════════════════════════════════════════════
// CALL ARGUMENTS
// ═══════════════════════════════════════════════════════════════════════════

/// The actual arguments of one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    pub positional: Vec<Value>,
    /// Keyword arguments in call order.
    pub keywords: Vec<(String, Value)>,
}

impl CallArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Append a keyword argument.
    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keywords.push((name.into(), value.into()));
        self
    }

    fn keyword(&self, name: &str) -> Option<&Value> {
        self.keywords
            .iter()
            .find_map(|(k, v)| (k == name).then_some(v))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// BOUND ARGUMENTS
// ═══════════════════════════════════════════════════════════════════════════

/// What a parameter received.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Single { slot: ArgSlot, value: Value },
    /// Surplus positional arguments, with their call positions.
    VarPositional(Vec<(usize, Value)>),
    /// Surplus keyword arguments, in call order.
    VarKeyword(Vec<(String, Value)>),
}

/// One parameter together with the value bound to it for this call.
#[derive(Debug, Clone)]
pub struct BoundArgument<'a> {
    pub parameter: &'a ParameterDescriptor,
    pub binding: Binding,
}

impl BoundArgument<'_> {
    /// The bound value. Variadic parameters yield a tuple or a dict.
    #[must_use]
    pub fn value(&self) -> Value {
        match &self.binding {
            Binding::Single { value, .. } => value.clone(),
            Binding::VarPositional(items) => {
                Value::Tuple(items.iter().map(|(_, v)| v.clone()).collect::<Vector<_>>())
            }
            Binding::VarKeyword(items) => Value::Dict(items.iter().cloned().collect::<OrdMap<_, _>>()),
        }
    }

    /// Whether the value came from the declared default.
    #[must_use]
    pub fn is_default(&self) -> bool {
        matches!(
            self.binding,
            Binding::Single {
                slot: ArgSlot::Default,
                ..
            }
        )
    }

    /// The individual values checked against the parameter's annotation,
    /// each with its slot in the call. Variadic parameters check every
    /// collected argument on its own.
    #[must_use]
    pub fn checked_values(&self) -> Vec<(ArgSlot, &Value)> {
        match &self.binding {
            Binding::Single { slot, value } => vec![(slot.clone(), value)],
            Binding::VarPositional(items) => items
                .iter()
                .map(|(position, value)| (ArgSlot::Position(*position), value))
                .collect(),
            Binding::VarKeyword(items) => items
                .iter()
                .map(|(keyword, value)| (ArgSlot::Keyword(keyword.clone()), value))
                .collect(),
        }
    }
}

/// The complete binding of one call, in parameter declaration order.
#[derive(Debug, Clone)]
pub struct BoundArguments<'a> {
    arguments: Vec<BoundArgument<'a>>,
}

impl<'a> BoundArguments<'a> {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BoundArgument<'a>> {
        self.arguments.iter().find(|a| a.parameter.name == name)
    }

    /// The value bound to `name`, if such a parameter exists.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<Value> {
        self.get(name).map(BoundArgument::value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundArgument<'a>> {
        self.arguments.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// `(name, value)` pairs, variadics collapsed to a tuple or dict.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, Value)> {
        self.arguments
            .iter()
            .map(|a| (a.parameter.name.clone(), a.value()))
            .collect()
    }
}

impl<'s, 'a> IntoIterator for &'s BoundArguments<'a> {
    type Item = &'s BoundArgument<'a>;
    type IntoIter = std::slice::Iter<'s, BoundArgument<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.arguments.iter()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// BINDING
// ═══════════════════════════════════════════════════════════════════════════

/// Bind `args` to the parameters of `descriptors`, applying defaults.
///
/// # Errors
///
/// Returns `BindingRejection` for too many or too few arguments, unknown
/// keywords, and arguments supplied twice.
pub fn bind<'a>(descriptors: &'a DescriptorSet, args: &CallArgs) -> Result<BoundArguments<'a>> {
    let reject = |reason: BindingRejection| ArgCheckError::binding(descriptors.function(), reason);

    for (i, (name, _)) in args.keywords.iter().enumerate() {
        if args.keywords[..i].iter().any(|(earlier, _)| earlier == name) {
            return Err(reject(BindingRejection::MultipleValues { name: name.clone() }));
        }
    }

    let params = descriptors.params();
    let mut bound: Vec<Option<Binding>> = vec![None; params.len()];

    // Positional phase.
    let mut positional = args.positional.iter().enumerate().peekable();
    let mut param_iter = params.iter().enumerate();
    while positional.peek().is_some() {
        let Some((slot_index, param)) = param_iter.next() else {
            return Err(reject(too_many_positional(params, args)));
        };
        match param.kind {
            ParamKind::KeywordOnly | ParamKind::VarKeyword => {
                return Err(reject(too_many_positional(params, args)));
            }
            ParamKind::VarPositional => {
                let rest = positional.by_ref().map(|(i, v)| (i, v.clone())).collect();
                bound[slot_index] = Some(Binding::VarPositional(rest));
            }
            ParamKind::PositionalOnly | ParamKind::PositionalOrKeyword => {
                if param.kind == ParamKind::PositionalOrKeyword && args.keyword(&param.name).is_some() {
                    return Err(reject(BindingRejection::MultipleValues {
                        name: param.name.clone(),
                    }));
                }
                if let Some((position, value)) = positional.next() {
                    bound[slot_index] = Some(Binding::Single {
                        slot: ArgSlot::Position(position),
                        value: value.clone(),
                    });
                }
            }
        }
    }

    // Keyword and default phase.
    let accepts_any_keyword = descriptors.var_keyword().is_some();
    let mut consumed_keywords: Vec<&str> = Vec::new();
    for (slot_index, param) in params.iter().enumerate() {
        if bound[slot_index].is_some() {
            continue;
        }
        match param.kind {
            ParamKind::VarPositional => {
                bound[slot_index] = Some(Binding::VarPositional(Vec::new()));
            }
            ParamKind::VarKeyword => {}
            ParamKind::PositionalOnly => {
                if !accepts_any_keyword && args.keyword(&param.name).is_some() {
                    return Err(reject(BindingRejection::PositionalOnlyAsKeyword {
                        name: param.name.clone(),
                    }));
                }
                bound[slot_index] = Some(default_or_missing(param).map_err(reject)?);
            }
            ParamKind::PositionalOrKeyword | ParamKind::KeywordOnly => {
                let binding = match args.keyword(&param.name) {
                    Some(value) => {
                        consumed_keywords.push(param.name.as_str());
                        Binding::Single {
                            slot: ArgSlot::Keyword(param.name.clone()),
                            value: value.clone(),
                        }
                    }
                    None => default_or_missing(param).map_err(reject)?,
                };
                bound[slot_index] = Some(binding);
            }
        }
    }

    // Surplus keywords.
    let surplus: Vec<(String, Value)> = args
        .keywords
        .iter()
        .filter(|(name, _)| !consumed_keywords.contains(&name.as_str()))
        .cloned()
        .collect();
    match descriptors.var_keyword() {
        Some(var_keyword) => {
            if let Some(slot) = bound.get_mut(var_keyword.index) {
                *slot = Some(Binding::VarKeyword(surplus));
            }
        }
        None => {
            if let Some((name, _)) = surplus.into_iter().next() {
                return Err(reject(BindingRejection::UnexpectedKeyword { name }));
            }
        }
    }

    let arguments = params
        .iter()
        .zip(bound)
        .filter_map(|(parameter, binding)| binding.map(|binding| BoundArgument { parameter, binding }))
        .collect();
    Ok(BoundArguments { arguments })
}

fn default_or_missing(param: &ParameterDescriptor) -> std::result::Result<Binding, BindingRejection> {
    match &param.default {
        Some(default) => Ok(Binding::Single {
            slot: ArgSlot::Default,
            value: default.clone(),
        }),
        None if param.kind == ParamKind::KeywordOnly => Err(BindingRejection::MissingKeywordOnly {
            name: param.name.clone(),
        }),
        None => Err(BindingRejection::MissingArgument {
            name: param.name.clone(),
        }),
    }
}

fn too_many_positional(params: &[ParameterDescriptor], args: &CallArgs) -> BindingRejection {
    BindingRejection::TooManyPositional {
        expected: params.iter().filter(|p| p.kind.is_positional()).count(),
        received: args.positional.len(),
    }
}
