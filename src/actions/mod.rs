//! Actions: named operations that can be bound to keys.
//!
//! - `definition` - [`ActionDefinition`], the descriptor plus opaque behavior
//! - `registry` - [`ActionRegistry`], the table of all known actions
//! - `record` - [`ActionRecord`], the persisted `"<global>,<keySpec>"` form
//! - `persistence` - user binding overrides on disk

mod definition;
mod persistence;
mod record;
mod registry;


pub use definition::{ActionBehavior, ActionDefinition};
pub use persistence::{default_bindings_path, BindingOverrides, PersistenceError};
pub use record::ActionRecord;
pub use registry::ActionRegistry;
