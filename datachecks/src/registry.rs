//! Check registry: named factories for minting fresh check instances.
//!
//! Suites reference checks by name; the registry maps each name to a factory
//! that produces a fresh [`Check`] per execution episode, so episodes never
//! share metadata or context.

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::check::Check;
use crate::error::{DataCheckError, Result};

/// Factory minting a fresh check instance per call.
pub type CheckFactory = Arc<dyn Fn() -> Check + Send + Sync>;

/// Registry of named check factories.
///
/// ```rust
/// use datachecks::core::Check;
/// use datachecks::registry::CheckRegistry;
///
/// let mut registry = CheckRegistry::new();
/// registry.register("volume", || Check::builder("volume").build());
/// assert!(registry.contains("volume"));
/// ```
#[derive(Clone, Default)]
pub struct CheckRegistry {
    factories: HashMap<String, CheckFactory>,
}

impl CheckRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under a name, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Check + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// True if a factory is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Mints a fresh check instance for `name`.
    pub fn create(&self, name: &str) -> Result<Check> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| DataCheckError::UnknownCheck {
                name: name.to_string(),
            })?;
        Ok(factory())
    }

    /// Returns the registered names, unordered.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Number of registered factories.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// True when no factories are registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckRegistry")
            .field("names", &self.names())
            .finish()
    }
}
