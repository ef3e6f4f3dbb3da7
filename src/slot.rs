// we will use keepers as a pattern to own the values held by a model,
// while the layout owns what is known about each slot up front

// other keepers use HashMap
use core::hash::BuildHasherDefault;
use seahash::SeaHasher;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use crate::value::{NIL, Value};

pub type PropertyHasher = BuildHasherDefault<SeaHasher>;

// ------------- Slot -------------
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    name: String,
    default: Option<Value>,
    alias: Option<String>,
}

impl Slot {
    pub fn new(name: impl Into<String>, default: Option<Value>, alias: Option<String>) -> Self {
        Self {
            name: name.into(),
            default,
            alias,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

// ------------- SlotLayout -------------
#[derive(Debug, Clone, Default)]
pub struct SlotLayout {
    slots: Vec<Slot>,
    positions: HashMap<String, usize, PropertyHasher>,
    // original key name -> property name, write-only
    aliases: HashMap<String, String, PropertyHasher>,
}

impl SlotLayout {
    pub fn new() -> Self {
        Self::default()
    }
    /// Declares a slot, returning whether it had been declared before.
    /// A redeclared slot keeps its position but takes the new default and alias.
    pub fn declare(&mut self, slot: Slot) -> bool {
        if let Some(alias) = slot.alias() {
            self.aliases.insert(alias.to_owned(), slot.name().to_owned());
        }
        match self.positions.entry(slot.name().to_owned()) {
            Entry::Vacant(e) => {
                e.insert(self.slots.len());
                self.slots.push(slot);
                false
            }
            Entry::Occupied(e) => {
                let previous = std::mem::replace(&mut self.slots[*e.get()], slot);
                let current = self.slots[*e.get()].alias();
                // the old alias may have been taken over by another property since
                if let Some(old) = previous.alias().filter(|old| Some(*old) != current) {
                    if self.aliases.get(old).is_some_and(|owner| owner == previous.name()) {
                        self.aliases.remove(old);
                    }
                }
                true
            }
        }
    }
    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.positions.get(name).map(|i| &self.slots[*i])
    }
    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }
    /// Maps a key to the property it writes, declared names win over aliases.
    pub fn resolve<'a>(&'a self, key: &'a str) -> Option<&'a str> {
        if self.contains(key) {
            Some(key)
        } else {
            self.aliases.get(key).map(String::as_str)
        }
    }
    pub fn default_of(&self, name: &str) -> Option<&Value> {
        self.slot(name).and_then(Slot::default)
    }
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(Slot::name)
    }
}

// ------------- SlotStore -------------
/// Per-instance storage of assigned values, keyed by property name.
/// Both the value as assigned and its coerced form are kept.
pub trait SlotStore: Default + fmt::Debug {
    fn keep(&mut self, name: &str, raw: Value, value: Value);
    fn value(&self, name: &str) -> Option<&Value>;
    fn raw(&self, name: &str) -> Option<&Value>;
    fn release(&mut self, name: &str) -> bool;

    /// The assigned value, else the layout's default, else `Nil`.
    fn read<'a>(&'a self, layout: &'a SlotLayout, name: &str) -> &'a Value {
        self.value(name)
            .or_else(|| layout.default_of(name))
            .unwrap_or(&NIL)
    }
    fn read_raw<'a>(&'a self, layout: &'a SlotLayout, name: &str) -> &'a Value {
        self.raw(name)
            .or_else(|| layout.default_of(name))
            .unwrap_or(&NIL)
    }
}

#[derive(Debug, Clone)]
struct Kept {
    raw: Value,
    value: Value,
}

// ------------- SlotKeeper -------------
#[derive(Debug, Clone, Default)]
pub struct SlotKeeper {
    kept: HashMap<String, Kept, PropertyHasher>,
}

impl SlotKeeper {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for SlotKeeper {
    fn keep(&mut self, name: &str, raw: Value, value: Value) {
        self.kept.insert(name.to_owned(), Kept { raw, value });
    }
    fn value(&self, name: &str) -> Option<&Value> {
        self.kept.get(name).map(|k| &k.value)
    }
    fn raw(&self, name: &str) -> Option<&Value> {
        self.kept.get(name).map(|k| &k.raw)
    }
    fn release(&mut self, name: &str) -> bool {
        self.kept.remove(name).is_some()
    }
}
