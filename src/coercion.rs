//! Property type coercion.
//!
//! A [`TypeSpec`] names the target of a property. When it is registered with
//! a [`TypeCoercionRegistry`] it is turned, once, into a [`Coercer`]: a single
//! closure from raw to coerced value that every assignment goes through.
//! `Nil` is never coerced, so "no value" stays distinguishable from a value.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{debug, trace};

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{PropmodelError, Result};
use crate::slot::PropertyHasher;
use crate::value::{Constructible, Decimal, Symbol, Value};

/// A conversion as supplied by a constructible type or a custom function.
pub type Conversion = Arc<dyn Fn(&Value) -> std::result::Result<Value, String> + Send + Sync>;

/// The stored, property bound form of a [`TypeSpec`].
pub type Coercer = Arc<dyn Fn(&Value) -> Result<Value> + Send + Sync>;

// date layouts tried in order, the first one that parses wins
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%d %B %Y",
    "%B %d, %Y",
    "%B %d %Y",
];
const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

// ------------- BuiltinType -------------
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Integer,
    Float,
    Decimal,
    Text,
    Symbol,
    Date,
    List,
}

impl BuiltinType {
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinType::Integer => "integer",
            BuiltinType::Float => "float",
            BuiltinType::Decimal => "decimal",
            BuiltinType::Text => "text",
            BuiltinType::Symbol => "symbol",
            BuiltinType::Date => "date",
            BuiltinType::List => "list",
        }
    }

    /// Converts a non-nil raw value to this type.
    pub fn convert(&self, raw: &Value) -> std::result::Result<Value, String> {
        match self {
            BuiltinType::Integer => to_integer(raw),
            BuiltinType::Float => to_float(raw),
            BuiltinType::Decimal => to_decimal(raw),
            BuiltinType::Text => match raw {
                Value::Text(_) => Ok(raw.clone()),
                other => Ok(Value::Text(other.to_string())),
            },
            BuiltinType::Symbol => match raw {
                Value::Symbol(_) => Ok(raw.clone()),
                Value::Text(s) => Ok(Value::Symbol(Symbol::normalize(s))),
                other => Ok(Value::Symbol(Symbol::new(other.to_string()))),
            },
            BuiltinType::Date => match raw {
                Value::Date(_) => Ok(raw.clone()),
                Value::Text(s) => parse_date(s).map(Value::Date),
                other => parse_date(&other.to_string()).map(Value::Date),
            },
            BuiltinType::List => match raw {
                Value::List(_) => Ok(raw.clone()),
                other => Ok(Value::List(vec![other.clone()])),
            },
        }
    }
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for BuiltinType {
    type Err = PropmodelError;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "integer" | "int" => Ok(BuiltinType::Integer),
            "float" => Ok(BuiltinType::Float),
            "decimal" => Ok(BuiltinType::Decimal),
            "string" | "text" => Ok(BuiltinType::Text),
            "symbol" => Ok(BuiltinType::Symbol),
            "date" => Ok(BuiltinType::Date),
            "array" | "list" => Ok(BuiltinType::List),
            other => Err(PropmodelError::Config(format!("unknown property type '{}'", other))),
        }
    }
}

fn to_integer(raw: &Value) -> std::result::Result<Value, String> {
    match raw {
        Value::Integer(_) => Ok(raw.clone()),
        Value::Float(x) => {
            // the upper bound is exclusive since i64::MAX rounds up to 2^63 as a float
            if x.is_finite() && *x >= i64::MIN as f64 && *x < i64::MAX as f64 {
                Ok(Value::Integer(x.trunc() as i64))
            } else {
                Err(format!("{} is out of integer range", x))
            }
        }
        Value::Decimal(d) => {
            let digits = integer_digits(d);
            // i64 has at most 19 integer digits, below one the value truncates to zero
            if digits > 19 {
                return Err(format!("{} is out of integer range", d));
            }
            if digits <= 0 {
                return Ok(Value::Integer(0));
            }
            d.with_scale(0)
                .to_string()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| format!("{} is out of integer range", d))
        }
        Value::Text(s) => parse_integer(s).map(Value::Integer),
        other => Err(format!("{} is not convertible to integer", other.type_name())),
    }
}

fn parse_integer(text: &str) -> std::result::Result<i64, String> {
    let invalid = || format!("invalid value for integer: {:?}", text);
    let trimmed = text.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let (radix, digits) = match body.get(..2) {
        Some("0x") | Some("0X") => (16, &body[2..]),
        Some("0o") | Some("0O") => (8, &body[2..]),
        Some("0b") | Some("0B") => (2, &body[2..]),
        _ => (10, body),
    };
    if !separated_digits(digits, |c| c.is_digit(radix)) {
        return Err(invalid());
    }
    let mut cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    if negative {
        cleaned.insert(0, '-');
    }
    i64::from_str_radix(&cleaned, radix).map_err(|_| invalid())
}

fn to_float(raw: &Value) -> std::result::Result<Value, String> {
    match raw {
        Value::Float(_) => Ok(raw.clone()),
        Value::Integer(i) => Ok(Value::Float(*i as f64)),
        Value::Decimal(d) => {
            // f64 tops out around 1.8e308
            if integer_digits(d) > 309 {
                return Err(format!("{} is out of float range", d));
            }
            match d.to_string().parse::<f64>() {
                Ok(x) if x.is_finite() => Ok(Value::Float(x)),
                _ => Err(format!("{} is out of float range", d)),
            }
        }
        Value::Text(s) => parse_float(s).map(Value::Float),
        other => Err(format!("{} is not convertible to float", other.type_name())),
    }
}

// digits left of the decimal point, zero or negative for magnitudes below one
fn integer_digits(d: &Decimal) -> i64 {
    let (_, scale) = d.as_bigint_and_exponent();
    (d.digits() as i64).saturating_sub(scale)
}

fn parse_float(text: &str) -> std::result::Result<f64, String> {
    let invalid = || format!("invalid value for float: {:?}", text);
    let trimmed = text.trim();
    // rejects the "inf" and "NaN" spellings that f64::from_str would take
    let numeric = |c: char| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-');
    if !separated_digits(trimmed, numeric) || !trimmed.chars().any(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let cleaned: String = trimmed.chars().filter(|c| *c != '_').collect();
    cleaned.parse::<f64>().map_err(|_| invalid())
}

// non-empty, only allowed characters, underscores strictly between them
fn separated_digits(digits: &str, allowed: impl Fn(char) -> bool) -> bool {
    !digits.is_empty()
        && !digits.starts_with('_')
        && !digits.ends_with('_')
        && !digits.contains("__")
        && digits.chars().all(|c| c == '_' || allowed(c))
}

fn to_decimal(raw: &Value) -> std::result::Result<Value, String> {
    match raw {
        Value::Decimal(_) => Ok(raw.clone()),
        Value::Integer(i) => Ok(Value::Decimal(Decimal::from(*i))),
        Value::Float(x) if x.is_finite() => Decimal::from_str(&format!("{:?}", x))
            .map(Value::Decimal)
            .ok_or_else(|| format!("{} is not a finite decimal", x)),
        Value::Text(s) => Decimal::from_str(s.trim())
            .map(Value::Decimal)
            .ok_or_else(|| format!("invalid value for decimal: {:?}", s)),
        other => Err(format!("{} is not convertible to decimal", other.inspect())),
    }
}

fn parse_date(text: &str) -> std::result::Result<NaiveDate, String> {
    let trimmed = text.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }
    if let Ok(moment) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(moment.date_naive());
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(moment) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(moment.date());
        }
    }
    Err(format!("invalid date: {:?}", text))
}

// ------------- TypeSpec -------------
#[derive(Clone)]
pub enum TypeSpec {
    Builtin(BuiltinType),
    Constructible {
        data_type: &'static str,
        construct: Conversion,
    },
    Function(Conversion),
}

impl TypeSpec {
    /// Values already holding a `T` pass through, anything else goes to
    /// `T::construct`.
    pub fn constructible<T: Constructible>() -> Self {
        TypeSpec::Constructible {
            data_type: T::DATA_TYPE,
            construct: Arc::new(|raw: &Value| {
                if raw.downcast_ref::<T>().is_some() {
                    return Ok(raw.clone());
                }
                T::construct(raw)
                    .map(Value::custom)
                    .map_err(|e| e.to_string())
            }),
        }
    }

    pub fn function<F, E>(f: F) -> Self
    where
        F: Fn(&Value) -> std::result::Result<Value, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        TypeSpec::Function(Arc::new(move |raw: &Value| f(raw).map_err(|e| e.to_string())))
    }

    pub fn target(&self) -> &'static str {
        match self {
            TypeSpec::Builtin(kind) => kind.name(),
            TypeSpec::Constructible { data_type, .. } => *data_type,
            TypeSpec::Function(_) => "function result",
        }
    }

    fn into_coercer(self, property: &str) -> Coercer {
        let property = property.to_owned();
        let target = self.target();
        let convert: Conversion = match self {
            TypeSpec::Builtin(kind) => Arc::new(move |raw: &Value| kind.convert(raw)),
            TypeSpec::Constructible { construct, .. } => construct,
            TypeSpec::Function(f) => f,
        };
        Arc::new(move |raw: &Value| {
            if raw.is_nil() {
                return Ok(Value::Nil);
            }
            convert(raw).map_err(|reason| PropmodelError::Coercion {
                property: property.clone(),
                target: target.to_owned(),
                value: raw.inspect(),
                reason,
            })
        })
    }
}

impl From<BuiltinType> for TypeSpec {
    fn from(kind: BuiltinType) -> Self {
        TypeSpec::Builtin(kind)
    }
}

impl fmt::Debug for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypeSpec::Builtin(kind) => write!(f, "Builtin({:?})", kind),
            TypeSpec::Constructible { data_type, .. } => write!(f, "Constructible({})", data_type),
            TypeSpec::Function(_) => write!(f, "Function"),
        }
    }
}

// ------------- TypeCoercionRegistry -------------
#[derive(Clone, Default)]
pub struct TypeCoercionRegistry {
    types: HashMap<String, Coercer, PropertyHasher>,
}

impl TypeCoercionRegistry {
    pub fn new() -> Self {
        Self {
            types: HashMap::default(),
        }
    }
    /// Registers the coercion for `name`, replacing any earlier one.
    pub fn add_property_type(&mut self, name: &str, spec: impl Into<TypeSpec>) {
        let spec = spec.into();
        debug!(property = name, kind = spec.target(), "registered property type");
        self.types.insert(name.to_owned(), spec.into_coercer(name));
    }
    pub fn property_types(&self) -> &HashMap<String, Coercer, PropertyHasher> {
        &self.types
    }
    /// Applies the registered coercion, untyped properties pass values through.
    pub fn coerce(&self, name: &str, raw: &Value) -> Result<Value> {
        match self.types.get(name) {
            Some(coercer) => {
                trace!(property = name, raw = %raw.inspect(), "coercing");
                coercer(raw).inspect_err(|e| debug!(property = name, error = %e, "coercion failed"))
            }
            None => Ok(raw.clone()),
        }
    }
    pub fn len(&self) -> usize {
        self.types.len()
    }
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl fmt::Debug for TypeCoercionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut names: Vec<&String> = self.types.keys().collect();
        names.sort();
        f.debug_struct("TypeCoercionRegistry")
            .field("types", &names)
            .finish()
    }
}
