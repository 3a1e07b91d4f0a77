//! In-memory component collection
//!
//! Records are addressed by their surrogate [`Uuid`]. Order is insertion
//! order and is preserved across save/load, so the natural key is only used
//! for display and for resolving a row picked from a filtered view.

use thiserror::Error;
use uuid::Uuid;

use crate::models::{Component, ComponentPatch};

/// Failure to resolve a user-supplied id
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Component not found: {0}")]
    NotFound(String),

    #[error("Ambiguous id '{prefix}' matches {count} components")]
    Ambiguous { prefix: String, count: usize },
}

/// Summary counts for status output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InventoryStats {
    pub total: usize,
    pub low_stock: usize,
}

/// Ordered collection of components
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    components: Vec<Component>,
}

impl Inventory {
    pub fn new(components: Vec<Component>) -> Self {
        Self { components }
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn into_components(self) -> Vec<Component> {
        self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Append a record
    pub fn add(&mut self, component: Component) {
        self.components.push(component);
    }

    /// Replace the record with `id`, keeping its id and position
    pub fn update(&mut self, id: Uuid, mut component: Component) -> Result<(), LookupError> {
        let slot = self
            .components
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| LookupError::NotFound(id.to_string()))?;
        component.id = id;
        *slot = component;
        Ok(())
    }

    /// Apply a partial update to the record with `id`
    pub fn apply(&mut self, id: Uuid, patch: ComponentPatch) -> Result<&Component, LookupError> {
        let slot = self
            .components
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| LookupError::NotFound(id.to_string()))?;
        patch.apply(slot);
        Ok(slot)
    }

    /// Remove and return the record with `id`
    pub fn remove(&mut self, id: Uuid) -> Result<Component, LookupError> {
        let index = self
            .components
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| LookupError::NotFound(id.to_string()))?;
        Ok(self.components.remove(index))
    }

    pub fn get(&self, id: Uuid) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Find a record by full id or unique id prefix (case-insensitive)
    pub fn find_by_id_prefix(&self, prefix: &str) -> Result<&Component, LookupError> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return Err(LookupError::NotFound(prefix));
        }
        if let Ok(id) = Uuid::parse_str(&prefix) {
            return self.get(id).ok_or(LookupError::NotFound(prefix));
        }

        let mut matches = self
            .components
            .iter()
            .filter(|c| c.id.to_string().starts_with(&prefix));
        match (matches.next(), matches.count()) {
            (Some(component), 0) => Ok(component),
            (Some(_), rest) => Err(LookupError::Ambiguous {
                prefix,
                count: rest + 1,
            }),
            (None, _) => Err(LookupError::NotFound(prefix)),
        }
    }

    /// Records matching `query`; a blank query returns everything
    pub fn search(&self, query: &str) -> Vec<&Component> {
        let query = query.trim();
        if query.is_empty() {
            return self.components.iter().collect();
        }
        self.components.iter().filter(|c| c.matches(query)).collect()
    }

    pub fn low_stock(&self) -> Vec<&Component> {
        self.components.iter().filter(|c| c.is_low_stock()).collect()
    }

    pub fn stats(&self) -> InventoryStats {
        InventoryStats {
            total: self.components.len(),
            low_stock: self.components.iter().filter(|c| c.is_low_stock()).count(),
        }
    }

    /// Position in the full collection of the first record with this
    /// natural key.
    ///
    /// Used to map a row chosen from a filtered view back to the record it
    /// was drawn from when only the displayed fields are known.
    pub fn position_of_natural_key(&self, name: &str, part_number: &str) -> Option<usize> {
        self.components
            .iter()
            .position(|c| c.name == name && c.part_number == part_number)
    }
}

impl From<Vec<Component>> for Inventory {
    fn from(components: Vec<Component>) -> Self {
        Self::new(components)
    }
}
