//! Registry of built-in variants (variant name -> factory).
//!
//! Built during start-up, read-only afterwards.

use std::collections::BTreeMap;

use bobbin_core::TaskVariant;
use thiserror::Error;

pub type BoxedVariant = Box<dyn TaskVariant<Output = serde_json::Value>>;
pub type Factory = fn() -> BoxedVariant;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("variant '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("no variant named '{0}'")]
    NotFound(String),
}

#[derive(Default)]
pub struct VariantRegistry {
    factories: BTreeMap<&'static str, Factory>,
}

impl VariantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &'static str, factory: Factory) -> Result<(), RegistryError> {
        if self.factories.contains_key(name) {
            return Err(RegistryError::AlreadyRegistered(name.to_string()));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    pub fn create(&self, name: &str) -> Result<BoxedVariant, RegistryError> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }
}
