//! Propmodel – declared, coerced and validated properties for model types.
//!
//! A model type declares named properties. Each property may carry:
//! * a type, turning raw (often textual) input into a typed [`value::Value`]
//!   every time the property is assigned;
//! * a default, read back while nothing has been assigned;
//! * a source alias, an original key name that writes to the property;
//! * validation rules: required, a maximum length and a custom check.
//!
//! Coercion happens on assignment and fails immediately. Validation happens
//! only when asked for and reports every failure at once.
//!
//! ## Modules
//! * [`value`] – The dynamic [`value::Value`] plus symbols, decimals and the
//!   [`value::Constructible`] trait for types of your own.
//! * [`coercion`] – [`coercion::TypeSpec`] and the
//!   [`coercion::TypeCoercionRegistry`] mapping property names to coercions.
//! * [`validation`] – [`validation::Validator`] records, the
//!   [`validation::ValidatorChain`] and standalone required/length/type rules.
//! * [`slot`] – Slot storage: the declared layout (defaults, aliases) and the
//!   per-instance keeper of assigned values.
//! * [`model`] – [`model::ModelType`] wires the above together per property;
//!   [`model::Model`] is an instance.
//! * [`definition`] – Model types read from a TOML/JSON/YAML file.
//!
//! ## Quick Start
//! ```
//! use std::sync::Arc;
//! use propmodel::{BuiltinType, Model, ModelType, PropertyOptions, Value};
//!
//! let mut user = ModelType::new("User");
//! user.property("name", PropertyOptions::new().required().max_length(10))
//!     .property("age", PropertyOptions::new().of_type(BuiltinType::Integer).default(18))
//!     .property("tags", PropertyOptions::new().of_type(BuiltinType::List).from("Tags"));
//! let user = Arc::new(user);
//!
//! let mut jane = Model::new(Arc::clone(&user));
//! jane.set("age", "42").unwrap();
//! jane.set("Tags", "admin").unwrap();
//! assert_eq!(jane.get("age").unwrap(), &Value::Integer(42));
//! assert_eq!(jane.get("tags").unwrap(), &Value::from(vec!["admin"]));
//!
//! let failures = jane.validate();
//! assert_eq!(failures.len(), 1);
//! assert_eq!(failures[0].message, "name must not be nil or blank");
//! ```

pub mod coercion;
pub mod definition;
pub mod error;
pub mod model;
pub mod slot;
pub mod validation;
pub mod value;

pub use coercion::{BuiltinType, TypeCoercionRegistry, TypeSpec};
pub use error::{PropmodelError, Result};
pub use model::{Model, ModelType, PropertyOptions};
pub use validation::{
    FailureKind, Rejection, ValidationFailure, Validator, ValidatorChain, ValueSource,
};
pub use value::{Constructible, Symbol, Value};
