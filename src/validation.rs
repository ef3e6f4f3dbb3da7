//! Validator chains.
//!
//! Validators are plain records carrying their own parameters. They are
//! accumulated per property and evaluated against the live value whenever a
//! validation is requested, every validator of every property, in order.

use tracing::debug;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;
use std::sync::Arc;

use crate::coercion::BuiltinType;
use crate::error::{PropmodelError, Result};
use crate::slot::PropertyHasher;
use crate::value::{NIL, Value};

/// A custom rule, called with the property name and its current value.
/// `Some(rejection)` is a failure.
pub type CustomCheck = Arc<dyn Fn(&str, &Value) -> Option<Rejection> + Send + Sync>;

// ------------- ValueSource -------------
/// Where a chain reads the current value of a property from.
pub trait ValueSource {
    fn value_of(&self, name: &str) -> &Value;
}

impl<S: BuildHasher> ValueSource for HashMap<String, Value, S> {
    fn value_of(&self, name: &str) -> &Value {
        self.get(name).unwrap_or(&NIL)
    }
}

impl ValueSource for BTreeMap<String, Value> {
    fn value_of(&self, name: &str) -> &Value {
        self.get(name).unwrap_or(&NIL)
    }
}

// ------------- ValidationFailure -------------
#[derive(Debug, Clone, PartialEq)]
pub enum FailureKind {
    Required,
    TooLong { max: usize, actual: usize },
    WrongType { expected: BuiltinType },
    /// Whatever structured detail the custom check attached, if any.
    Custom { detail: Option<Value> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationFailure {
    pub property: String,
    pub kind: FailureKind,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(property: impl Into<String>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// What a custom check returns for a rejected value. Plain messages convert
/// into one; `with_detail` attaches a structured value for callers to inspect.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub message: String,
    pub detail: Option<Value>,
}

impl Rejection {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }
    pub fn with_detail(mut self, detail: impl Into<Value>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl From<String> for Rejection {
    fn from(message: String) -> Self {
        Rejection::new(message)
    }
}
impl From<&str> for Rejection {
    fn from(message: &str) -> Self {
        Rejection::new(message)
    }
}

// ------------- Validator -------------
#[derive(Clone)]
pub enum Validator {
    Required,
    MaxLength(usize),
    Custom(CustomCheck),
}

impl Validator {
    pub fn custom<F, R>(check: F) -> Self
    where
        F: Fn(&str, &Value) -> Option<R> + Send + Sync + 'static,
        R: Into<Rejection>,
    {
        Validator::Custom(Arc::new(move |name: &str, value: &Value| -> Option<Rejection> {
            check(name, value).map(Into::into)
        }))
    }

    pub fn check(&self, name: &str, value: &Value) -> Option<ValidationFailure> {
        match self {
            Validator::Required => validate_required([(name, value)]).pop(),
            Validator::MaxLength(max) => validate_length(name, value, Some(*max)),
            Validator::Custom(check) => check(name, value).map(|rejection| {
                ValidationFailure::new(
                    name,
                    FailureKind::Custom {
                        detail: rejection.detail,
                    },
                    rejection.message,
                )
            }),
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Validator::Required => write!(f, "Required"),
            Validator::MaxLength(max) => write!(f, "MaxLength({})", max),
            Validator::Custom(_) => write!(f, "Custom"),
        }
    }
}

// ------------- ValidatorChain -------------
#[derive(Debug, Clone, Default)]
pub struct ValidatorChain {
    // property names in the order their first validator arrived
    order: Vec<String>,
    validators: HashMap<String, Vec<Validator>, PropertyHasher>,
}

impl ValidatorChain {
    pub fn new() -> Self {
        Self::default()
    }
    /// Appends to the property's chain, earlier validators are kept.
    pub fn add_validator(&mut self, name: &str, validator: Validator) {
        debug!(property = name, validator = ?validator, "added validator");
        let chain = self.validators.entry(name.to_owned()).or_insert_with(|| {
            self.order.push(name.to_owned());
            Vec::new()
        });
        chain.push(validator);
    }
    pub fn validators_for(&self, name: &str) -> &[Validator] {
        self.validators.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
    pub fn len(&self) -> usize {
        self.validators.values().map(Vec::len).sum()
    }
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
    /// Runs every chain and returns all failures, empty when valid.
    pub fn validate<V: ValueSource + ?Sized>(&self, source: &V) -> Vec<ValidationFailure> {
        let mut failures = Vec::new();
        for name in &self.order {
            let value = source.value_of(name);
            failures.extend(
                self.validators_for(name)
                    .iter()
                    .filter_map(|validator| validator.check(name, value)),
            );
        }
        if !failures.is_empty() {
            debug!(failures = failures.len(), "validation failed");
        }
        failures
    }
    pub fn validate_strict<V: ValueSource + ?Sized>(&self, source: &V) -> Result<()> {
        into_result(self.validate(source))
    }
    pub fn is_valid<V: ValueSource + ?Sized>(&self, source: &V) -> bool {
        self.validate(source).is_empty()
    }
}

fn into_result(failures: Vec<ValidationFailure>) -> Result<()> {
    if failures.is_empty() {
        Ok(())
    } else {
        Err(PropmodelError::Validation(failures))
    }
}

// Empty lists and non-text scalars are never blank, only the absence of a
// value or text and symbols without visible characters are.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Nil => true,
        Value::Text(s) => s.trim().is_empty(),
        Value::Symbol(s) => s.as_str().trim().is_empty(),
        _ => false,
    }
}

fn length_of(value: &Value) -> usize {
    match value {
        Value::Text(s) => s.chars().count(),
        Value::Symbol(s) => s.as_str().chars().count(),
        Value::List(items) => items.len(),
        Value::Custom(data) => data
            .data_length()
            .unwrap_or_else(|| data.to_string().chars().count()),
        other => other.to_string().chars().count(),
    }
}

// ------------- Standalone rules -------------

/// One failure per nil or blank value.
pub fn validate_required<'a, I>(pairs: I) -> Vec<ValidationFailure>
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    pairs
        .into_iter()
        .filter(|(_, value)| is_blank(value))
        .map(|(name, _)| {
            ValidationFailure::new(
                name,
                FailureKind::Required,
                format!("{} must not be nil or blank", name),
            )
        })
        .collect()
}

pub fn validate_required_strict<'a, I>(pairs: I) -> Result<()>
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    into_result(validate_required(pairs))
}

pub fn is_required_valid<'a, I>(pairs: I) -> bool
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    validate_required(pairs).is_empty()
}

/// A zero or missing bound disables the check, as does a nil value.
pub fn validate_length(name: &str, value: &Value, max_length: Option<usize>) -> Option<ValidationFailure> {
    let max = max_length.filter(|max| *max > 0)?;
    if value.is_nil() {
        return None;
    }
    let actual = length_of(value);
    (actual > max).then(|| {
        ValidationFailure::new(
            name,
            FailureKind::TooLong { max, actual },
            format!("{} must be less than {} characters", name, max),
        )
    })
}

pub fn validate_length_strict(name: &str, value: &Value, max_length: Option<usize>) -> Result<()> {
    into_result(validate_length(name, value, max_length).into_iter().collect())
}

pub fn is_length_valid(name: &str, value: &Value, max_length: Option<usize>) -> bool {
    validate_length(name, value, max_length).is_none()
}

/// Passes when the value is nil or would coerce to `kind`.
pub fn validate_type(name: &str, value: &Value, kind: BuiltinType) -> Option<ValidationFailure> {
    if value.is_nil() {
        return None;
    }
    kind.convert(value).err().map(|reason| {
        ValidationFailure::new(
            name,
            FailureKind::WrongType { expected: kind },
            format!("{} must be of type {}: {}", name, kind, reason),
        )
    })
}

pub fn validate_type_strict(name: &str, value: &Value, kind: BuiltinType) -> Result<()> {
    into_result(validate_type(name, value, kind).into_iter().collect())
}

pub fn is_type_valid(name: &str, value: &Value, kind: BuiltinType) -> bool {
    validate_type(name, value, kind).is_none()
}
