//! In-memory agent registry.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{CatalogError, CatalogResult};
use crate::model::{AgentRecord, Category};

/// Indexed, validated store of agent records.
///
/// Records are keyed by `(category, id)`. The backing maps are ordered, so
/// every listing is sorted regardless of the order records arrived in;
/// worker completion order during loading never leaks into lookups.
#[derive(Default)]
pub struct AgentRegistry {
    agents: BTreeMap<Category, BTreeMap<String, AgentRecord>>,
}

impl AgentRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            agents: BTreeMap::new(),
        }
    }

    /// Register a record under its `(category, id)` key.
    ///
    /// Registration is atomic: on a duplicate key the registry is unchanged,
    /// the first-registered record is retained, and
    /// [`CatalogError::DuplicateAgent`] is returned.
    pub fn register(&mut self, record: AgentRecord) -> CatalogResult<()> {
        let bucket = self.agents.entry(record.category.clone()).or_default();
        if bucket.contains_key(&record.id) {
            return Err(CatalogError::DuplicateAgent {
                category: record.category,
                id: record.id,
            });
        }

        debug!("Registering agent: {}/{}", record.category, record.id);
        bucket.insert(record.id.clone(), record);
        Ok(())
    }

    /// Get a record by category and id.
    pub fn get(&self, category: &Category, id: &str) -> Option<&AgentRecord> {
        self.agents.get(category).and_then(|bucket| bucket.get(id))
    }

    /// Get a record by category and id, returning an error if not found.
    pub fn lookup(&self, category: &Category, id: &str) -> CatalogResult<&AgentRecord> {
        self.get(category, id)
            .ok_or_else(|| CatalogError::AgentNotFound {
                category: category.clone(),
                id: id.to_string(),
            })
    }

    /// All records in a category, sorted by id ascending.
    pub fn list_by_category(&self, category: &Category) -> Vec<&AgentRecord> {
        self.agents
            .get(category)
            .map(|bucket| bucket.values().collect())
            .unwrap_or_default()
    }

    /// Check if a record is registered.
    pub fn contains(&self, category: &Category, id: &str) -> bool {
        self.get(category, id).is_some()
    }

    /// All categories that hold at least one record, sorted.
    pub fn categories(&self) -> Vec<&Category> {
        self.agents
            .iter()
            .filter(|(_, bucket)| !bucket.is_empty())
            .map(|(category, _)| category)
            .collect()
    }

    /// Iterate over all records in (category, id) order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentRecord> {
        self.agents.values().flat_map(|bucket| bucket.values())
    }

    /// Total number of registered records.
    pub fn len(&self) -> usize {
        self.agents.values().map(|bucket| bucket.len()).sum()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("categories", &self.agents.keys().collect::<Vec<_>>())
            .field("len", &self.len())
            .finish()
    }
}
