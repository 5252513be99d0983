use crate::{errors::ToolError, mcp::types::{ToolDescriptor, ToolResponse}, notion::DynNotion};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

pub type DynHandler = Arc<dyn ToolHandler + Send + Sync + 'static>;

#[async_trait]
pub trait ToolHandler {
    async fn handle(&self, args: &Map<String, Value>) -> Result<ToolResponse, ToolError>;
}

#[derive(Clone)]
pub struct RegistryEntry {
    pub descriptor: ToolDescriptor,
    pub handler: DynHandler,
}

/// Write-once catalog of tools. Populated before the first request and
/// only read afterwards, so it is shared without locking.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    entries: Vec<RegistryEntry>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self { Self::default() }

    /// The fixed Notion catalog.
    pub fn notion(service: DynNotion) -> Self {
        let mut registry = Self::new();
        crate::tools::register_all(&mut registry, service);
        registry
    }

    /// Re-registering a name replaces its entry in place; listing order is
    /// that of the first registration.
    pub fn register(&mut self, descriptor: ToolDescriptor, handler: DynHandler) {
        let name = descriptor.name.clone();
        let entry = RegistryEntry { descriptor, handler };
        match self.index.get(&name) {
            Some(&slot) => self.entries[slot] = entry,
            None => {
                self.index.insert(name, self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&RegistryEntry> {
        self.index.get(name).map(|&slot| &self.entries[slot])
    }

    pub fn list_all(&self) -> Vec<&ToolDescriptor> { self.entries.iter().map(|e| &e.descriptor).collect() }
    pub fn list_names(&self) -> Vec<String> { self.entries.iter().map(|e| e.descriptor.name.clone()).collect() }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}
