//! Definition registry.
//!
//! Maps client-chosen definition IDs to the data type declared when the definition
//! was registered. The wire format carries no type information for sim object data,
//! so the decoder consults this registry for every data record it sees.
//!
//! Writers (`register`) take the lock exclusively; the dispatch loop's lookups take
//! it shared. A `register` call that returns has published its entry to every later
//! lookup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

use crate::types::DataType;

/// What was declared for one definition ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Definition {
    pub data_type: DataType,
    pub variable_name: String,
    pub units: String,
}

/// Thread-safe definition ID -> declared type map.
#[derive(Debug, Default)]
pub struct DefinitionRegistry {
    entries: RwLock<HashMap<u32, Definition>>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or overwrite the entry for `definition_id`.
    pub fn register(&self, definition_id: u32, definition: Definition) {
        debug!(
            definition_id,
            data_type = %definition.data_type,
            variable = %definition.variable_name,
            "Registering definition"
        );
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(definition_id, definition);
    }

    /// Declared type for `definition_id`, if registered.
    pub fn lookup(&self, definition_id: u32) -> Option<DataType> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(&definition_id).map(|d| d.data_type)
    }

    /// Full entry for `definition_id`, if registered.
    pub fn get(&self, definition_id: u32) -> Option<Definition> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(&definition_id).cloned()
    }

    /// Drop the entry for `definition_id`, returning it.
    pub fn remove(&self, definition_id: u32) -> Option<Definition> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(&definition_id)
    }

    pub fn contains(&self, definition_id: u32) -> bool {
        self.lookup(definition_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
