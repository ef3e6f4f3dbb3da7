//! Model types and their instances.
//!
//! A [`ModelType`] collects property declarations. Each declaration lays out a
//! slot (name, default, write-only alias), registers a coercion when a type
//! was given, and appends the required, max length and custom validators in
//! that order. Once declared the type is shared behind an `Arc` and every
//! [`Model`] built from it keeps only its own assigned values.

use tracing::debug;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::coercion::{Coercer, TypeCoercionRegistry, TypeSpec};
use crate::error::{PropmodelError, Result};
use crate::slot::{PropertyHasher, Slot, SlotKeeper, SlotLayout, SlotStore};
use crate::validation::{Rejection, ValidationFailure, Validator, ValidatorChain, ValueSource};
use crate::value::Value;

// ------------- PropertyOptions -------------
#[derive(Debug, Clone, Default)]
pub struct PropertyOptions {
    default: Option<Value>,
    from: Option<String>,
    type_spec: Option<TypeSpec>,
    required: bool,
    max_length: Option<usize>,
    validator: Option<Validator>,
}

impl PropertyOptions {
    pub fn new() -> Self {
        <Self as Default>::default()
    }
    /// Value read back while nothing has been assigned, returned as given.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
    /// Original key name that writes to this property; it cannot be read.
    pub fn from(mut self, alias: impl Into<String>) -> Self {
        self.from = Some(alias.into());
        self
    }
    pub fn of_type(mut self, spec: impl Into<TypeSpec>) -> Self {
        self.type_spec = Some(spec.into());
        self
    }
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }
    pub fn validator<F, R>(mut self, check: F) -> Self
    where
        F: Fn(&str, &Value) -> Option<R> + Send + Sync + 'static,
        R: Into<Rejection>,
    {
        self.validator = Some(Validator::custom(check));
        self
    }
}

// ------------- ModelType -------------
#[derive(Debug, Clone)]
pub struct ModelType {
    name: String,
    layout: SlotLayout,
    types: TypeCoercionRegistry,
    validators: ValidatorChain,
}

impl ModelType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layout: SlotLayout::new(),
            types: TypeCoercionRegistry::new(),
            validators: ValidatorChain::new(),
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn property(&mut self, name: &str, options: PropertyOptions) -> &mut Self {
        let PropertyOptions {
            default,
            from,
            type_spec,
            required,
            max_length,
            validator,
        } = options;
        let redeclared = self.layout.declare(Slot::new(name, default, from));
        debug!(model = %self.name, property = name, redeclared, "declared property");
        if let Some(spec) = type_spec {
            self.types.add_property_type(name, spec);
        }
        if required {
            self.validators.add_validator(name, Validator::Required);
        }
        if let Some(max) = max_length {
            self.validators.add_validator(name, Validator::MaxLength(max));
        }
        if let Some(validator) = validator {
            self.validators.add_validator(name, validator);
        }
        self
    }
    pub fn add_property_type(&mut self, name: &str, spec: impl Into<TypeSpec>) -> &mut Self {
        self.types.add_property_type(name, spec);
        self
    }
    pub fn property_types(&self) -> &HashMap<String, Coercer, PropertyHasher> {
        self.types.property_types()
    }
    pub fn add_validator(&mut self, name: &str, validator: Validator) -> &mut Self {
        self.validators.add_validator(name, validator);
        self
    }
    pub fn validators(&self) -> &ValidatorChain {
        &self.validators
    }
    pub fn has_property(&self, name: &str) -> bool {
        self.layout.contains(name)
    }
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.layout.names()
    }
}

// ------------- Model -------------
#[derive(Clone)]
pub struct Model<S: SlotStore = SlotKeeper> {
    model_type: Arc<ModelType>,
    slots: S,
}

impl Model {
    pub fn new(model_type: Arc<ModelType>) -> Self {
        Self::with_store(model_type, SlotKeeper::new())
    }
    /// Builds an instance and assigns the pairs in order, as `update` does.
    pub fn from_pairs<I, K, V>(model_type: Arc<ModelType>, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut model = Self::new(model_type);
        model.update(pairs)?;
        Ok(model)
    }
}

impl<S: SlotStore> Model<S> {
    pub fn with_store(model_type: Arc<ModelType>, slots: S) -> Self {
        Self { model_type, slots }
    }
    pub fn model_type(&self) -> &Arc<ModelType> {
        &self.model_type
    }
    /// Coerces and stores a value. `key` is a property name or an alias.
    /// When coercion fails the previous value is left as it was.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        let name = self
            .model_type
            .layout
            .resolve(key)
            .ok_or_else(|| PropmodelError::UnknownProperty(key.to_owned()))?;
        let raw = value.into();
        let coerced = self.model_type.types.coerce(name, &raw)?;
        self.slots.keep(name, raw, coerced);
        Ok(())
    }
    /// Assigns each pair in order, stopping at the first error.
    pub fn update<I, K, V>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (key, value) in pairs {
            self.set(key.as_ref(), value)?;
        }
        Ok(())
    }
    pub fn get(&self, name: &str) -> Result<&Value> {
        self.declared(name)?;
        Ok(self.slots.read(&self.model_type.layout, name))
    }
    /// The value as it was assigned, before coercion.
    pub fn raw(&self, name: &str) -> Result<&Value> {
        self.declared(name)?;
        Ok(self.slots.read_raw(&self.model_type.layout, name))
    }
    pub fn is_set(&self, name: &str) -> bool {
        self.slots.value(name).is_some()
    }
    /// Forgets the assigned value so reads fall back to the default.
    pub fn clear(&mut self, name: &str) -> Result<bool> {
        self.declared(name)?;
        Ok(self.slots.release(name))
    }
    /// Declared properties and their current values, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        let layout = &self.model_type.layout;
        layout
            .names()
            .map(move |name| (name, self.slots.read(layout, name)))
    }
    pub fn validate(&self) -> Vec<ValidationFailure> {
        self.model_type.validators.validate(self)
    }
    pub fn validate_strict(&self) -> Result<()> {
        self.model_type.validators.validate_strict(self)
    }
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    fn declared(&self, name: &str) -> Result<()> {
        if self.model_type.has_property(name) {
            Ok(())
        } else {
            Err(PropmodelError::UnknownProperty(name.to_owned()))
        }
    }
}

impl<S: SlotStore> ValueSource for Model<S> {
    fn value_of(&self, name: &str) -> &Value {
        self.slots.read(&self.model_type.layout, name)
    }
}

impl<S: SlotStore> fmt::Debug for Model<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut out = f.debug_struct(self.model_type.name());
        for (name, value) in self.iter() {
            out.field(name, value);
        }
        out.finish()
    }
}
