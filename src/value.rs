// used for calendar dates
use chrono::NaiveDate;
// used for decimal numbers
use bigdecimal::BigDecimal;
// used when normalizing symbol names
use lazy_static::lazy_static;
use regex::Regex;

// used to downcast custom data back to its concrete type
use std::any::Any;
// used to print out readable forms of a value
use std::fmt;
use std::ops;
use std::str::FromStr;
use std::sync::Arc;

/// Returned by reads of names that hold nothing.
pub(crate) static NIL: Value = Value::Nil;

lazy_static! {
    static ref ACRONYM_BOUNDARY: Regex = Regex::new(r"([A-Z]+)([A-Z][a-z])").unwrap();
    static ref WORD_BOUNDARY: Regex = Regex::new(r"([a-z\d])([A-Z])").unwrap();
    static ref SEPARATOR: Regex = Regex::new(r"\s+|-").unwrap();
}

/// A type that properties can be declared with, built from a raw value by
/// its single-argument constructor.
pub trait Constructible: fmt::Debug + fmt::Display + PartialEq + Send + Sync + Sized + 'static {
    const DATA_TYPE: &'static str;
    type Error: fmt::Display;
    fn construct(raw: &Value) -> Result<Self, Self::Error>;
    // used by max length validation, the display text is measured otherwise
    fn length(&self) -> Option<usize> {
        None
    }
}

/// Object safe view of a [`Constructible`] held inside a [`Value`].
pub trait CustomData: fmt::Debug + fmt::Display + Send + Sync {
    fn data_type(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn eq_data(&self, other: &dyn CustomData) -> bool;
    fn data_length(&self) -> Option<usize>;
}

impl<T: Constructible> CustomData for T {
    fn data_type(&self) -> &'static str {
        T::DATA_TYPE
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn eq_data(&self, other: &dyn CustomData) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }
    fn data_length(&self) -> Option<usize> {
        Constructible::length(self)
    }
}

// ------------- Value -------------
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Nil,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Symbol(Symbol),
    Date(NaiveDate),
    List(Vec<Value>),
    Custom(Arc<dyn CustomData>),
}

impl Value {
    pub fn custom<T: Constructible>(data: T) -> Self {
        Value::Custom(Arc::new(data))
    }
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::Text(_) => "text",
            Value::Symbol(_) => "symbol",
            Value::Date(_) => "date",
            Value::List(_) => "list",
            Value::Custom(data) => data.data_type(),
        }
    }
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
    pub fn as_decimal(&self) -> Option<&Decimal> {
        match self {
            Value::Decimal(d) => Some(d),
            _ => None,
        }
    }
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Value::Symbol(s) => Some(s),
            _ => None,
        }
    }
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
    pub fn downcast_ref<T: Constructible>(&self) -> Option<&T> {
        match self {
            Value::Custom(data) => data.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }
    /// Debug-like rendering used in messages, where text is quoted and
    /// symbols are prefixed with a colon.
    pub fn inspect(&self) -> String {
        match self {
            Value::Nil => String::from("nil"),
            Value::Text(s) => format!("{:?}", s),
            Value::Symbol(s) => format!(":{}", s),
            Value::List(items) => {
                let inner: Vec<String> = items.iter().map(Value::inspect).collect();
                format!("[{}]", inner.join(", "))
            }
            other => other.to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Custom(a), Value::Custom(b)) => a.eq_data(b.as_ref()),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Nil => Ok(()),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            // keeps the fractional part visible, 42.0 rather than 42
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Text(s) => write!(f, "{}", s),
            Value::Symbol(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::List(items) => {
                let inner: Vec<String> = items.iter().map(Value::to_string).collect();
                write!(f, "[{}]", inner.join(", "))
            }
            Value::Custom(data) => write!(f, "{}", data),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}
impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}
impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}
impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Integer(i64::from(i))
    }
}
impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}
impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}
impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}
impl From<Symbol> for Value {
    fn from(s: Symbol) -> Self {
        Value::Symbol(s)
    }
}
impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}
impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}
impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}

// ------------- Symbol -------------
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(String);

impl Symbol {
    /// Takes the name verbatim.
    pub fn new(name: impl Into<String>) -> Self {
        Symbol(name.into())
    }
    /// Builds a snake_case symbol from free text: `"MyCrazy    String"`
    /// becomes `my_crazy_string`.
    pub fn normalize(text: &str) -> Self {
        let name = ACRONYM_BOUNDARY.replace_all(text.trim(), "${1}_${2}");
        let name = WORD_BOUNDARY.replace_all(&name, "${1}_${2}");
        let name = SEPARATOR.replace_all(&name, "_");
        Symbol(name.to_lowercase())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ------------- Decimal -------------
#[derive(Eq, PartialEq, Hash, PartialOrd, Ord, Clone, Debug)]
pub struct Decimal(BigDecimal);

impl Decimal {
    pub fn from_str(s: &str) -> Option<Decimal> {
        match BigDecimal::from_str(s) {
            Ok(decimal) => Some(Decimal(decimal)),
            _ => None,
        }
    }
}
impl From<BigDecimal> for Decimal {
    fn from(d: BigDecimal) -> Self {
        Decimal(d)
    }
}
impl From<i64> for Decimal {
    fn from(i: i64) -> Self {
        Decimal(BigDecimal::from(i))
    }
}
impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl ops::Deref for Decimal {
    type Target = BigDecimal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_splits_camel_case_and_collapses_whitespace() {
        assert_eq!(Symbol::normalize("MyCrazy    String").as_str(), "my_crazy_string");
        assert_eq!(Symbol::normalize("  HTTPServer ").as_str(), "http_server");
        assert_eq!(Symbol::normalize("some-kebab name").as_str(), "some_kebab_name");
        assert_eq!(Symbol::normalize("already_snake").as_str(), "already_snake");
    }

    #[test]
    fn floats_display_with_fraction() {
        assert_eq!(Value::Float(42.0).to_string(), "42.0");
        assert_eq!(Value::Float(42.5).to_string(), "42.5");
    }

    #[test]
    fn inspect_quotes_text_and_marks_symbols() {
        let list = Value::from(vec![Value::from("a"), Value::Symbol(Symbol::new("b")), Value::Nil]);
        assert_eq!(list.inspect(), r#"["a", :b, nil]"#);
    }

    #[test]
    fn option_none_is_nil() {
        assert!(Value::from(None::<i64>).is_nil());
        assert_eq!(Value::from(Some(3i64)), Value::Integer(3));
    }

    #[test]
    fn accessors_match_only_their_own_kind() {
        let date = NaiveDate::from_ymd_opt(2011, 3, 10).unwrap();
        let half = Decimal::from_str("0.5").unwrap();
        assert_eq!(Value::Boolean(true).as_bool(), Some(true));
        assert_eq!(Value::Decimal(half.clone()).as_decimal(), Some(&half));
        assert_eq!(Value::Date(date).as_date(), Some(date));
        assert_eq!(Value::from(vec![1i64]).as_list(), Some(&[Value::Integer(1)][..]));
        assert_eq!(Value::from("x").as_text(), Some("x"));
        assert_eq!(Value::Symbol(Symbol::new("x")).as_symbol().map(Symbol::as_str), Some("x"));
        assert_eq!(Value::Integer(1).as_bool(), None);
        assert_eq!(Value::from("2011-03-10").as_date(), None);
        assert_eq!(Value::Nil.as_list(), None);
        assert_eq!(Value::Float(0.5).as_decimal(), None);
    }

    #[test]
    fn values_of_different_kinds_are_not_equal() {
        assert_ne!(Value::Integer(1), Value::Float(1.0));
        assert_ne!(Value::from("1"), Value::Integer(1));
    }
}
