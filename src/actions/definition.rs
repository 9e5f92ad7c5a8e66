//! Action definitions.

use std::fmt;
use std::sync::Arc;

use super::record::ActionRecord;

/// The work an action performs. Opaque to this crate: never inspected,
/// never persisted.
pub type ActionBehavior = Arc<dyn Fn() + Send + Sync>;

/// A named, invokable operation plus the metadata that controls how it may
/// be triggered.
#[derive(Clone)]
pub struct ActionDefinition {
    name: String,
    description: String,
    key_spec: String,
    global: bool,
    continuous: bool,
    behavior: ActionBehavior,
}

impl ActionDefinition {
    /// A local, single-fire action with no key bound.
    pub fn new<F>(name: impl Into<String>, behavior: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: String::new(),
            key_spec: String::new(),
            global: false,
            continuous: false,
            behavior: Arc::new(behavior),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_key_spec(mut self, key_spec: impl Into<String>) -> Self {
        self.key_spec = key_spec.into();
        self
    }

    /// Make the action eligible for global (unfocused) dispatch.
    pub fn global(mut self, global: bool) -> Self {
        self.global = global;
        self
    }

    /// Re-fire on every native repeat while held instead of once per press.
    pub fn continuous(mut self, continuous: bool) -> Self {
        self.continuous = continuous;
        self
    }

    /// Replace the persisted part of the definition (global flag and key spec).
    pub fn with_record(mut self, record: &ActionRecord) -> Self {
        self.global = record.global;
        self.key_spec = record.key_spec.clone();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn key_spec(&self) -> &str {
        &self.key_spec
    }

    pub fn has_key(&self) -> bool {
        !self.key_spec.trim().is_empty()
    }

    pub fn is_global(&self) -> bool {
        self.global
    }

    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    pub fn behavior(&self) -> &ActionBehavior {
        &self.behavior
    }

    /// The persisted form of this action's binding.
    pub fn record(&self) -> ActionRecord {
        ActionRecord::new(self.global, self.key_spec.clone())
    }
}

impl fmt::Debug for ActionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("key_spec", &self.key_spec)
            .field("global", &self.global)
            .field("continuous", &self.continuous)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_are_local_single_fire() {
        let action = ActionDefinition::new("noop", || {});
        assert_eq!(action.name(), "noop");
        assert!(!action.is_global());
        assert!(!action.is_continuous());
        assert!(!action.has_key());
    }

    #[test]
    fn with_record_replaces_binding_only() {
        let action = ActionDefinition::new("zoom", || {})
            .with_description("Zoom in")
            .with_key_spec("CTRL+PLUS")
            .continuous(true)
            .with_record(&ActionRecord::new(true, "CTRL+ALT+Z"));

        assert!(action.is_global());
        assert_eq!(action.key_spec(), "CTRL+ALT+Z");
        assert_eq!(action.description(), "Zoom in");
        assert!(action.is_continuous());
        assert_eq!(action.record().to_string(), "true,CTRL+ALT+Z");
    }

    #[test]
    fn debug_skips_behavior() {
        let action = ActionDefinition::new("debuggable", || {}).with_key_spec("F4");
        let rendered = format!("{:?}", action);
        assert!(rendered.contains("debuggable"));
        assert!(rendered.contains("F4"));
    }
}
