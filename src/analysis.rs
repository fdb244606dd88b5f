pub mod completion;
pub mod definition;
pub mod scope;

pub use completion::{completion_items, resolve_completion_item};
pub use definition::{
    DefinitionTarget, resolve_attribute_name_definition, resolve_attribute_value_definition,
    resolve_definition, resolve_tag_definition,
};
pub use scope::{Scope, ScopeKind, resolve_scope, resolve_scope_in_events};
