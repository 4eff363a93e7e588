//! Compilation of a declared signature into an immutable checking plan.
//!
//! Runs once per wrapped function. Every signature and annotation problem is
//! reported here, so a call never has to look at the declaration again.

use std::collections::HashSet;

use tracing::trace;

use crate::annotation::{Annotation, Metadata};
use crate::checks::SharedPredicate;
use crate::error::{ArgCheckError, DeclParam, Result};
use crate::signature::{FunctionSignature, Param, ParamKind};
use crate::type_check::{DeclaredType, TypeSpec};
use crate::value::Value;

/// The compiled form of one declared parameter.
#[derive(Debug, Clone)]
pub struct ParameterDescriptor {
    pub index: usize,
    pub name: String,
    pub kind: ParamKind,
    pub default: Option<Value>,
    /// `None` means the parameter is never type-checked.
    pub declared_type: Option<DeclaredType>,
    /// Value constraints, in the order they are evaluated.
    pub constraints: Vec<SharedPredicate>,
}

impl ParameterDescriptor {
    #[must_use]
    pub const fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// A parameter with neither a declared type nor constraints.
    #[must_use]
    pub fn is_unchecked(&self) -> bool {
        self.declared_type.is_none() && self.constraints.is_empty()
    }

    #[must_use]
    pub fn decl_param(&self) -> DeclParam {
        DeclParam::new(self.index, self.name.as_str())
    }
}

/// The ordered descriptors of one function.
#[derive(Debug, Clone)]
pub struct DescriptorSet {
    function: String,
    params: Vec<ParameterDescriptor>,
}

impl DescriptorSet {
    /// Validate `signature` and compile every annotation in it.
    ///
    /// # Errors
    ///
    /// - `SignatureDefinition` for a parameter list no function could declare
    /// - `AnnotationCompilation` for malformed annotation metadata
    pub fn build(signature: &FunctionSignature) -> Result<Self> {
        validate_shape(signature)?;

        let params = signature
            .params()
            .iter()
            .enumerate()
            .map(|(index, param)| compile_param(&signature.name, index, param))
            .collect::<Result<Vec<_>>>()?;

        trace!(
            function = %signature.name,
            checked = params.iter().filter(|p| !p.is_unchecked()).count(),
            "compiled parameter descriptors"
        );

        Ok(Self {
            function: signature.name.clone(),
            params,
        })
    }

    #[must_use]
    pub fn function(&self) -> &str {
        &self.function
    }

    #[must_use]
    pub fn params(&self) -> &[ParameterDescriptor] {
        &self.params
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.params.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub(crate) fn var_keyword(&self) -> Option<&ParameterDescriptor> {
        self.params.iter().find(|p| p.kind == ParamKind::VarKeyword)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SIGNATURE SHAPE
// ═══════════════════════════════════════════════════════════════════════════

fn validate_shape(signature: &FunctionSignature) -> Result<()> {
    let function = signature.name.as_str();
    let mut seen = HashSet::new();
    let mut previous: Option<ParamKind> = None;
    let mut positional_default_seen = false;

    for param in signature.params() {
        if !seen.insert(param.name.as_str()) {
            return Err(ArgCheckError::signature(
                function,
                format!("duplicate parameter name '{}'", param.name),
            ));
        }

        if let Some(prev) = previous {
            if param.kind < prev {
                return Err(ArgCheckError::signature(
                    function,
                    format!(
                        "{} parameter '{}' cannot follow a {prev} parameter",
                        param.kind, param.name
                    ),
                ));
            }
            if param.kind == prev && param.kind.is_variadic() {
                return Err(ArgCheckError::signature(
                    function,
                    format!("more than one {} parameter", param.kind),
                ));
            }
        }

        if param.kind.is_variadic() && param.default.is_some() {
            return Err(ArgCheckError::signature(
                function,
                format!("variadic parameter '{}' cannot have a default", param.name),
            ));
        }

        if param.kind.is_positional() {
            if param.default.is_some() {
                positional_default_seen = true;
            } else if positional_default_seen {
                return Err(ArgCheckError::signature(
                    function,
                    format!(
                        "parameter '{}' without a default follows a parameter with a default",
                        param.name
                    ),
                ));
            }
        }

        previous = Some(param.kind);
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
// ANNOTATION COMPILATION
// ═══════════════════════════════════════════════════════════════════════════

fn compile_param(function: &str, index: usize, param: &Param) -> Result<ParameterDescriptor> {
    let (declared_type, constraints) = match &param.annotation {
        None => (None, Vec::new()),
        Some(annotation) => {
            let (spec, constraints) = compile_annotation(annotation).map_err(|problem| {
                ArgCheckError::AnnotationCompilation {
                    function: function.to_string(),
                    param: DeclParam::new(index, param.name.as_str()),
                    annotation: annotation.to_string(),
                    problem,
                }
            })?;
            (Some(DeclaredType::new(spec)), constraints)
        }
    };

    Ok(ParameterDescriptor {
        index,
        name: param.name.clone(),
        kind: param.kind,
        default: param.default.clone(),
        declared_type,
        constraints,
    })
}

/// Split an annotation into its declared type and flattened constraints.
///
/// Nested `Annotated` layers concatenate: the innermost metadata comes first.
fn compile_annotation(
    annotation: &Annotation,
) -> std::result::Result<(TypeSpec, Vec<SharedPredicate>), String> {
    match annotation {
        Annotation::Annotated(inner, metadata) => {
            if metadata.is_empty() {
                return Err("Annotated requires at least one metadata entry".to_string());
            }
            let (spec, mut constraints) = compile_annotation(inner)?;
            constraints.extend(metadata.iter().flat_map(Metadata::flatten));
            Ok((spec, constraints))
        }
        other => compile_type(other).map(|spec| (spec, Vec::new())),
    }
}

fn compile_type(annotation: &Annotation) -> std::result::Result<TypeSpec, String> {
    match annotation {
        Annotation::Type(ty) => Ok(TypeSpec::Exact(*ty)),
        Annotation::Sequence => Ok(TypeSpec::Sequence),
        Annotation::SequenceOf(element) => compile_type(element)
            .map(|spec| TypeSpec::SequenceOf(Box::new(spec)))
            .map_err(|_| {
                format!(
                    "sequence element type `{element}` cannot carry metadata; \
                     attach an eachAll check to the sequence instead"
                )
            }),
        Annotation::Annotated(..) => Err("unexpected metadata in a type position".to_string()),
    }
}
