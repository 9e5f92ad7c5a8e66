//! Deterministic action registry with Vec storage.
//!
//! Uses Vec for deterministic iteration order and HashMap for O(1) lookup.

use std::collections::HashMap;
use std::sync::Arc;

use super::definition::ActionDefinition;
use crate::error::{ActionError, Result};

/// Table of every known action, keyed by unique name.
///
/// Definitions are handed out as `Arc`s so consumers share the canonical
/// instance instead of copying it.
#[derive(Default)]
pub struct ActionRegistry {
    actions: Vec<Arc<ActionDefinition>>,
    name_to_index: HashMap<String, usize>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an action, replacing any previous action with the same name.
    ///
    /// The key spec is not validated here; that happens when the action is
    /// wired into a dispatch path. Returns the replaced definition, if any.
    pub fn register(&mut self, action: ActionDefinition) -> Result<Option<Arc<ActionDefinition>>> {
        if action.name().trim().is_empty() {
            return Err(ActionError::EmptyName);
        }

        let action = Arc::new(action);
        if let Some(&index) = self.name_to_index.get(action.name()) {
            let previous = std::mem::replace(&mut self.actions[index], action);
            return Ok(Some(previous));
        }

        self.name_to_index
            .insert(action.name().to_string(), self.actions.len());
        self.actions.push(action);
        Ok(None)
    }

    /// Remove an action by name. Returns the removed definition.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<ActionDefinition>> {
        let index = self.name_to_index.remove(name)?;
        let removed = self.actions.remove(index);
        for slot in self.name_to_index.values_mut() {
            if *slot > index {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    /// Look an action up, failing with [`ActionError::NotFound`].
    pub fn get(&self, name: &str) -> Result<Arc<ActionDefinition>> {
        self.try_get(name)
            .ok_or_else(|| ActionError::NotFound(name.to_string()))
    }

    pub fn try_get(&self, name: &str) -> Option<Arc<ActionDefinition>> {
        self.name_to_index
            .get(name)
            .and_then(|&i| self.actions.get(i))
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    /// Snapshot of every definition in registration order.
    pub fn all(&self) -> Vec<Arc<ActionDefinition>> {
        self.actions.clone()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
