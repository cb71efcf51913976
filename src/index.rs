//! Definition Index: identifier → schema node, built once per document and
//! immutable afterward.

use indexmap::IndexMap;

use crate::error::{Result, SchemaError};
use crate::schema::{SchemaKind, SchemaNode};

#[derive(Debug, Clone, Default)]
pub struct DefinitionIndex {
    defs: IndexMap<String, SchemaNode>,
}

impl DefinitionIndex {
    pub fn get(&self, id: &str) -> Option<&SchemaNode> {
        self.defs.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.defs.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.defs.keys().map(|k| k.as_str())
    }
}

/// Walk the whole document once and record every node carrying an `$id`.
///
/// The walk is an iterative worklist, not recursion: indexing must not be
/// the pass that blows the call stack on a deeply nested document. The
/// input tree is never mutated.
pub fn build_index(document: &SchemaNode) -> Result<DefinitionIndex> {
    let mut defs: IndexMap<String, SchemaNode> = IndexMap::new();
    let mut work: Vec<&SchemaNode> = vec![document];

    while let Some(node) = work.pop() {
        if let Some(id) = &node.id {
            if defs.insert(id.clone(), node.clone()).is_some() {
                return Err(SchemaError::DuplicateIdentifier { id: id.clone() });
            }
        }
        work.extend(node.defs.iter());
        match &node.kind {
            SchemaKind::Array { item } => work.push(item),
            SchemaKind::Tuple { items, additional } => {
                work.extend(items.iter());
                if let Some(a) = additional {
                    work.push(a);
                }
            }
            SchemaKind::Object { properties, additional, .. } => {
                work.extend(properties.values());
                if let Some(a) = additional {
                    work.push(a);
                }
            }
            SchemaKind::Combinator { operands, .. } => work.extend(operands.iter()),
            SchemaKind::Not { operand } => work.push(operand),
            SchemaKind::Conditional { condition, consequent, alternative } => {
                work.push(condition);
                work.push(consequent);
                if let Some(a) = alternative {
                    work.push(a);
                }
            }
            _ => {}
        }
    }

    Ok(DefinitionIndex { defs })
}
