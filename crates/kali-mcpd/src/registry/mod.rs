//! The tool registry.
//!
//! [`ToolRegistry`] is built once at start-up, then handed to the dispatcher
//! and never mutated again. Registration preserves insertion order, which is
//! the order `tools/list` reports, and rejects duplicate names.

mod descriptor;

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

pub use self::descriptor::{ParamSpec, ParamType, ToolDescriptor};
use crate::tools::ToolHandler;

/// Errors raised while building a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A tool with the same name was already registered.
    #[error("tool '{name}' is already registered")]
    Duplicate {
        /// Conflicting tool name.
        name: String,
    },
}

/// Immutable catalog of tool handlers keyed by name.
#[derive(Default)]
pub struct ToolRegistry {
    handlers: Vec<Box<dyn ToolHandler>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under its descriptor's name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if the name is already taken.
    pub fn register(&mut self, handler: Box<dyn ToolHandler>) -> Result<(), RegistryError> {
        let name = handler.descriptor().name().to_owned();
        if self.index.contains_key(&name) {
            return Err(RegistryError::Duplicate { name });
        }
        self.index.insert(name, self.handlers.len());
        self.handlers.push(handler);
        Ok(())
    }

    /// Looks up a handler by tool name.
    pub fn get(&self, name: &str) -> Option<&dyn ToolHandler> {
        self.index
            .get(name)
            .and_then(|position| self.handlers.get(*position))
            .map(|handler| &**handler)
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.handlers.iter().map(|handler| handler.descriptor())
    }

    /// Tool names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors().map(ToolDescriptor::name)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` when no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
