//! Error types for binding operations.

use thiserror::Error;

use crate::graph::EntityId;

/// Errors raised by the binding engine.
///
/// Every variant is raised as a precondition check, before the graph is
/// mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// The entity handle is not registered with this engine.
    #[error("entity {0} is not registered")]
    UnknownEntity(EntityId),

    /// The field is not declared on the entity.
    #[error("field `{field}` is not defined on entity {entity}")]
    UndefinedField { entity: EntityId, field: String },

    /// The field is already bound outward; unbind it before rebinding.
    #[error("field `{field}` on entity {entity} is already bound")]
    AlreadyBound { entity: EntityId, field: String },

    /// The field is not part of any shared group.
    #[error("field `{field}` on entity {entity} is not bound")]
    NotBound { entity: EntityId, field: String },

    /// The observer and the target already share a value.
    #[error("binding `{field}` on entity {entity} would join a group to itself")]
    BindingCycle { entity: EntityId, field: String },
}

/// Result type for binding operations.
pub type Result<T> = std::result::Result<T, BindError>;
