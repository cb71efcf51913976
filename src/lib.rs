//! Derive a normalized, reference-free type description from a
//! JSON-Schema-like document.
//!
//! Pipeline: [`build_index`] scans the document once for `$id` definitions,
//! [`resolve_schema`] inlines every `$ref` (cycles become `Recursive`
//! markers instead of infinite expansions), and [`derive_type`] converts
//! the resolved tree into the output type graph. [`schema_to_type`] chains
//! the three for one document.
//!
//! Design goals:
//! - Resolution is a pure function of its input; errors are structural
//!   faults in the document, never retried.
//! - Cycle and depth guards are explicit; hostile nesting fails with
//!   `DepthExceeded` rather than riding the call stack down.
//! - Nothing is shared across documents: each resolution owns its index
//!   and its `visiting` state.

pub mod schema;
pub mod ty;
pub mod error;
pub mod index;
pub mod resolve;
pub mod derive;
pub mod parse;
pub mod emit;
pub mod jq_exec;
pub mod cli;

pub use derive::derive_type;
pub use error::{Result, SchemaError};
pub use index::{build_index, DefinitionIndex};
pub use parse::{parse_str, parse_value};
pub use resolve::resolve_schema;
pub use schema::{CombineOp, LitValue, Literals, SchemaKind, SchemaNode};
pub use ty::{TypeKind, TypeNode};

/// Hard bound on schema nesting, shared by resolution and derivation.
pub const MAX_DEPTH: usize = 64;

/// Index, resolve, derive: the whole pipeline for one document.
pub fn schema_to_type(document: &SchemaNode) -> Result<TypeNode> {
    let index = build_index(document)?;
    let resolved = resolve_schema(document, &index)?;
    derive_type(&resolved)
}
