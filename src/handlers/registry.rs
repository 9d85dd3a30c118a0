use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use super::traits::ResourceHandler;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("handler for '{0}' already defined")]
    Duplicate(String),
    #[error("resource kind must be a non-empty string")]
    EmptyKind,
}

/// Registry mapping resource kinds to handler instances.
///
/// Append-only: kinds are registered during addon setup and never removed
/// or replaced. A second registration for the same kind fails immediately,
/// not at request time. After setup the registry is shared read-only with
/// every in-flight request, so lookups take no locks.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<String, Arc<dyn ResourceHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        kind: impl Into<String>,
        handler: Arc<dyn ResourceHandler>,
    ) -> Result<(), RegistryError> {
        let kind = kind.into();
        if kind.is_empty() {
            return Err(RegistryError::EmptyKind);
        }
        if self.handlers.contains_key(&kind) {
            return Err(RegistryError::Duplicate(kind));
        }
        self.handlers.insert(kind, handler);
        Ok(())
    }

    /// Absence is not an error here; the dispatcher translates a missing
    /// handler into a not-found response.
    pub fn get(&self, kind: &str) -> Option<Arc<dyn ResourceHandler>> {
        self.handlers.get(kind).cloned()
    }

    pub fn has_handler(&self, kind: &str) -> bool {
        self.handlers.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
