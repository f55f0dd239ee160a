//! Per-run accumulation of extension objects and stylesheet parameters.

use crate::core::modules::ExtensionObject;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// A named stylesheet parameter; the namespace is empty for the barcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterEntry {
    pub name: String,
    pub namespace: String,
    pub value: String,
}

impl ParameterEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        ParameterEntry {
            name: name.into(),
            namespace: String::new(),
            value: value.into(),
        }
    }
}

/// Namespace URI to extension object. Registering an existing namespace replaces it.
#[derive(Clone, Default)]
pub struct ExtensionTable {
    objects: IndexMap<String, Arc<dyn ExtensionObject>>,
}

impl ExtensionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the object previously registered under `namespace`, if any.
    pub fn register(
        &mut self,
        namespace: impl Into<String>,
        object: Arc<dyn ExtensionObject>,
    ) -> Option<Arc<dyn ExtensionObject>> {
        self.objects.insert(namespace.into(), object)
    }

    pub fn get(&self, namespace: &str) -> Option<&Arc<dyn ExtensionObject>> {
        self.objects.get(namespace)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    /// `(namespace, object)` in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn ExtensionObject>)> {
        self.objects
            .iter()
            .map(|(namespace, object)| (namespace.as_str(), object))
    }
}

impl fmt::Debug for ExtensionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.objects
                    .iter()
                    .map(|(namespace, object)| (namespace, object.class_name())),
            )
            .finish()
    }
}

/// Everything the transform receives besides the input document.
#[derive(Debug, Clone, Default)]
pub struct ParameterRegistry {
    pub extensions: ExtensionTable,
    parameters: IndexMap<(String, String), String>,
}

impl ParameterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adding a parameter that already exists overwrites its value.
    pub fn add_parameter(&mut self, entry: ParameterEntry) {
        self.parameters
            .insert((entry.namespace, entry.name), entry.value);
    }

    pub fn parameter(&self, namespace: &str, name: &str) -> Option<&str> {
        self.parameters
            .get(&(namespace.to_string(), name.to_string()))
            .map(String::as_str)
    }

    /// `(namespace, name, value)` in insertion order.
    pub fn parameters(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.parameters
            .iter()
            .map(|((namespace, name), value)| (namespace.as_str(), name.as_str(), value.as_str()))
    }
}
