use std::collections::BTreeMap;

use super::OptionValue;

/// Flat named key/value persistence for tool options.
///
/// Hosts back this with their preference storage; the examples crate ships a
/// file-backed implementation.
pub trait OptionStore {
    fn get(&self, name: &str) -> Option<OptionValue>;
    fn set(&mut self, name: &str, value: OptionValue);
}

/// In-memory [`OptionStore`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryOptionStore {
    values: BTreeMap<String, OptionValue>,
}

impl MemoryOptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove(&mut self, name: &str) -> Option<OptionValue> {
        self.values.remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl OptionStore for MemoryOptionStore {
    fn get(&self, name: &str) -> Option<OptionValue> {
        self.values.get(name).copied()
    }

    fn set(&mut self, name: &str, value: OptionValue) {
        self.values.insert(name.to_string(), value);
    }
}

impl<S: OptionStore + ?Sized> OptionStore for &mut S {
    fn get(&self, name: &str) -> Option<OptionValue> {
        (**self).get(name)
    }

    fn set(&mut self, name: &str, value: OptionValue) {
        (**self).set(name, value)
    }
}
