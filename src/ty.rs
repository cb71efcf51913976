// Derived type graph. Reference-free except for `Recursive` back-edges.

use indexmap::IndexMap;

pub use crate::schema::LitValue;

#[derive(Debug, Clone, PartialEq)]
pub struct TypeNode {
    /// `$id` of the schema fragment this type derives from. Anchors
    /// `Recursive { target }` back-edges within the same graph.
    pub name: Option<String>,
    pub kind: TypeKind,
}

impl TypeNode {
    pub fn unnamed(kind: TypeKind) -> Self {
        Self { name: None, kind }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Null,
    Boolean,
    Number,
    String,
    Undefined,
    /// Deliberately opaque result (unsupported shape, imprecise negation).
    /// A result, not an error.
    Unknown,
    Literal(LitValue),
    Array {
        item: Box<TypeNode>,
    },
    Tuple {
        items: Vec<TypeNode>,        // exact arity
        rest: Option<Box<TypeNode>>, // zero-or-more trailing elements
    },
    Object {
        required: IndexMap<String, TypeNode>,
        optional: IndexMap<String, TypeNode>,
        indexed: Option<Box<TypeNode>>,
    },
    Union {
        members: Vec<TypeNode>,
    },
    Intersection {
        members: Vec<TypeNode>,
    },
    /// "Same type as the enclosing definition named `target`."
    Recursive {
        target: String,
    },
}

/// Form a union with set semantics: nested unnamed unions are flattened,
/// duplicate members dropped, singletons collapse to the member itself.
pub fn union_of(members: Vec<TypeNode>) -> TypeNode {
    let mut flat: Vec<TypeNode> = Vec::with_capacity(members.len());
    for member in members {
        match member.kind {
            TypeKind::Union { members: inner } if member.name.is_none() => {
                for m in inner {
                    if !flat.contains(&m) {
                        flat.push(m);
                    }
                }
            }
            _ => {
                if !flat.contains(&member) {
                    flat.push(member);
                }
            }
        }
    }
    match flat.len() {
        0 => TypeNode::unnamed(TypeKind::Unknown),
        1 => flat.remove(0),
        _ => TypeNode::unnamed(TypeKind::Union { members: flat }),
    }
}

/// Intersection counterpart of [`union_of`]; flattens nested unnamed
/// intersections only (a union member stays a single member).
pub fn intersection_of(members: Vec<TypeNode>) -> TypeNode {
    let mut flat: Vec<TypeNode> = Vec::with_capacity(members.len());
    for member in members {
        match member.kind {
            TypeKind::Intersection { members: inner } if member.name.is_none() => {
                for m in inner {
                    if !flat.contains(&m) {
                        flat.push(m);
                    }
                }
            }
            _ => {
                if !flat.contains(&member) {
                    flat.push(member);
                }
            }
        }
    }
    match flat.len() {
        0 => TypeNode::unnamed(TypeKind::Unknown),
        1 => flat.remove(0),
        _ => TypeNode::unnamed(TypeKind::Intersection { members: flat }),
    }
}
