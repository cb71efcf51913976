//! Reference resolution: inline every `$ref`, tolerate cycles.
//!
//! `visiting` is an explicit stack of the identifiers currently being
//! expanded on this root-to-leaf path, threaded through the recursion as a
//! parameter so concurrent resolutions of independent documents never share
//! state. A `Ref` whose target is already on the stack becomes a
//! `Recursive` placeholder instead of expanding again; that is what makes
//! cyclic definitions terminate.
//!
//! Reconstruction is structural and non-destructive: containers come back
//! with the same shape and their children resolved. Inlined definitions
//! keep their `$id` anchor (it is what `Recursive` markers name); the
//! `defs` bookkeeping is dropped from the output.

use indexmap::IndexMap;

use crate::error::{Result, SchemaError};
use crate::index::DefinitionIndex;
use crate::schema::{SchemaKind, SchemaNode};

pub fn resolve_schema(node: &SchemaNode, index: &DefinitionIndex) -> Result<SchemaNode> {
    let mut visiting: Vec<String> = Vec::new();
    resolve_at(node, index, &mut visiting, 0)
}

fn resolve_at(
    node: &SchemaNode,
    index: &DefinitionIndex,
    visiting: &mut Vec<String>,
    depth: usize,
) -> Result<SchemaNode> {
    if depth > crate::MAX_DEPTH {
        return Err(SchemaError::DepthExceeded { limit: crate::MAX_DEPTH });
    }

    if let SchemaKind::Ref { id } = &node.kind {
        if visiting.iter().any(|v| v == id) {
            return Ok(SchemaNode::of(SchemaKind::Recursive { id: id.clone() }));
        }
        let target = index
            .get(id)
            .ok_or_else(|| SchemaError::UnresolvedReference { id: id.clone() })?;
        // mark the identifier for the whole expansion, so even a pure
        // ref-to-ref cycle terminates in a marker
        visiting.push(id.clone());
        let resolved = resolve_at(target, index, visiting, depth + 1);
        visiting.pop();
        return resolved;
    }

    // any node carrying an id is a potential cycle entry point
    let pushed = match &node.id {
        Some(id) => {
            visiting.push(id.clone());
            true
        }
        None => false,
    };
    let kind = resolve_kind(&node.kind, index, visiting, depth);
    if pushed {
        visiting.pop();
    }

    Ok(SchemaNode { id: node.id.clone(), defs: Vec::new(), kind: kind? })
}

fn resolve_kind(
    kind: &SchemaKind,
    index: &DefinitionIndex,
    visiting: &mut Vec<String>,
    depth: usize,
) -> Result<SchemaKind> {
    let next = depth + 1;
    Ok(match kind {
        SchemaKind::Array { item } => SchemaKind::Array {
            item: Box::new(resolve_at(item, index, visiting, next)?),
        },
        SchemaKind::Tuple { items, additional } => SchemaKind::Tuple {
            items: items
                .iter()
                .map(|it| resolve_at(it, index, visiting, next))
                .collect::<Result<Vec<_>>>()?,
            additional: match additional {
                Some(a) => Some(Box::new(resolve_at(a, index, visiting, next)?)),
                None => None,
            },
        },
        SchemaKind::Object { properties, required, additional } => SchemaKind::Object {
            properties: properties
                .iter()
                .map(|(name, schema)| Ok((name.clone(), resolve_at(schema, index, visiting, next)?)))
                .collect::<Result<IndexMap<_, _>>>()?,
            required: required.clone(),
            additional: match additional {
                Some(a) => Some(Box::new(resolve_at(a, index, visiting, next)?)),
                None => None,
            },
        },
        SchemaKind::Combinator { op, operands } => SchemaKind::Combinator {
            op: *op,
            operands: operands
                .iter()
                .map(|o| resolve_at(o, index, visiting, next))
                .collect::<Result<Vec<_>>>()?,
        },
        SchemaKind::Not { operand } => SchemaKind::Not {
            operand: Box::new(resolve_at(operand, index, visiting, next)?),
        },
        SchemaKind::Conditional { condition, consequent, alternative } => SchemaKind::Conditional {
            condition: Box::new(resolve_at(condition, index, visiting, next)?),
            consequent: Box::new(resolve_at(consequent, index, visiting, next)?),
            alternative: match alternative {
                Some(a) => Some(Box::new(resolve_at(a, index, visiting, next)?)),
                None => None,
            },
        },
        // leaves (primitives, Any, Recursive) pass through unchanged
        other => other.clone(),
    })
}
