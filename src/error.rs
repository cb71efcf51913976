//! Structural faults in an input document. All four are detected eagerly
//! and none is retryable: resolution is a pure function of its input.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Two definitions share an `$id`.
    #[error("duplicate identifier `{id}`")]
    DuplicateIdentifier { id: String },

    /// A `$ref` names no known definition.
    #[error("unresolved reference `{id}`")]
    UnresolvedReference { id: String },

    /// A name in `required` has no entry in `properties`.
    #[error("required property `{name}` is not declared in `properties`")]
    RequiredPropertyUndeclared { name: String },

    /// The nesting guard tripped on a hostile or malformed document.
    #[error("schema nesting exceeded the depth limit of {limit}")]
    DepthExceeded { limit: usize },
}

pub type Result<T> = std::result::Result<T, SchemaError>;
