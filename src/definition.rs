//! Model types declared in a separate file.
//!
//! ```toml
//! name = "User"
//!
//! [[properties]]
//! name = "login"
//! type = "symbol"
//! required = true
//! max_length = 16
//! from = "UserLogin"
//!
//! [[properties]]
//! name = "age"
//! type = "integer"
//! default = 18
//! ```

use config::{Config, File, FileFormat};
use serde::Deserialize;
use tracing::debug;

use std::collections::HashSet;
use std::path::Path;

use crate::coercion::BuiltinType;
use crate::error::{PropmodelError, Result};
use crate::model::{ModelType, PropertyOptions};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelDefinition {
    pub name: String,
    #[serde(default)]
    pub properties: Vec<PropertyDefinition>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PropertyDefinition {
    pub name: String,
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub default: Option<DefaultValue>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub max_length: Option<usize>,
}

/// The shapes a default can take in a definition file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<DefaultValue>),
}

impl From<DefaultValue> for Value {
    fn from(d: DefaultValue) -> Self {
        match d {
            DefaultValue::Boolean(b) => Value::Boolean(b),
            DefaultValue::Integer(i) => Value::Integer(i),
            DefaultValue::Float(x) => Value::Float(x),
            DefaultValue::Text(s) => Value::Text(s),
            DefaultValue::List(items) => Value::List(items.into_iter().map(Value::from).collect()),
        }
    }
}

impl ModelDefinition {
    /// Reads a definition, the format follows the file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading model definition");
        let definition = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;
        Ok(definition)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let definition = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        Ok(definition)
    }

    /// Declares every property, in file order, on a new model type.
    pub fn build(&self) -> Result<ModelType> {
        let mut seen = HashSet::new();
        let mut model_type = ModelType::new(&self.name);
        for property in &self.properties {
            if !seen.insert(property.name.as_str()) {
                return Err(PropmodelError::Config(format!(
                    "property '{}' is declared twice in '{}'",
                    property.name, self.name
                )));
            }
            model_type.property(&property.name, property.options()?);
        }
        Ok(model_type)
    }
}

impl PropertyDefinition {
    pub fn options(&self) -> Result<PropertyOptions> {
        let mut options = PropertyOptions::new();
        if let Some(type_name) = &self.type_name {
            options = options.of_type(type_name.parse::<BuiltinType>()?);
        }
        if let Some(default) = &self.default {
            options = options.default(default.clone());
        }
        if let Some(from) = &self.from {
            options = options.from(from.as_str());
        }
        if self.required {
            options = options.required();
        }
        if let Some(max) = self.max_length {
            options = options.max_length(max);
        }
        Ok(options)
    }
}
