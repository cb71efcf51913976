//! Type derivation: resolved schema fragment → type node.
//!
//! Pure bottom-up dispatch on the schema kind:
//! - literal narrowing (`const`/`enum`) takes precedence over the primitive
//! - tuples keep exact arity; `additionalItems` becomes a `rest` tail
//! - object properties split into required/optional buckets; open objects
//!   carry an `indexed` type
//! - the combinator/negation rules below are shaped to match existing
//!   consumer expectations exactly, imprecision included (see the `anyOf`
//!   and `not` notes)

use indexmap::IndexMap;

use crate::error::{Result, SchemaError};
use crate::schema::{CombineOp, Literals, Prim, SchemaKind, SchemaNode};
use crate::ty::{intersection_of, union_of, TypeKind, TypeNode};

/// Derive the type of a resolved schema node. Expects `Ref`-free input
/// (run [`crate::resolve_schema`] first); a stray `Ref` is treated as an
/// opaque shape, not an error.
pub fn derive_type(node: &SchemaNode) -> Result<TypeNode> {
    derive_at(node, 0)
}

fn derive_at(node: &SchemaNode, depth: usize) -> Result<TypeNode> {
    if depth > crate::MAX_DEPTH {
        return Err(SchemaError::DepthExceeded { limit: crate::MAX_DEPTH });
    }
    let next = depth + 1;

    let mut out = match &node.kind {
        SchemaKind::Any => TypeNode::unnamed(TypeKind::Unknown),
        SchemaKind::Null(lits) => narrowed(TypeKind::Null, lits),
        SchemaKind::Boolean(lits) => narrowed(TypeKind::Boolean, lits),
        SchemaKind::Number(lits) => narrowed(TypeKind::Number, lits),
        SchemaKind::String(lits) => narrowed(TypeKind::String, lits),
        SchemaKind::Undefined(lits) => narrowed(TypeKind::Undefined, lits),

        SchemaKind::Array { item } => TypeNode::unnamed(TypeKind::Array {
            item: Box::new(derive_at(item, next)?),
        }),

        SchemaKind::Tuple { items, additional } => {
            // arity preserved exactly, no widening to Array
            let items = items
                .iter()
                .map(|it| derive_at(it, next))
                .collect::<Result<Vec<_>>>()?;
            let rest = match additional {
                Some(a) => Some(Box::new(derive_at(a, next)?)),
                None => None, // closed tuple
            };
            TypeNode::unnamed(TypeKind::Tuple { items, rest })
        }

        SchemaKind::Object { properties, required, additional } => {
            let mut req: IndexMap<String, TypeNode> = IndexMap::new();
            for name in required {
                let schema = properties.get(name).ok_or_else(|| {
                    SchemaError::RequiredPropertyUndeclared { name: name.clone() }
                })?;
                req.insert(name.clone(), derive_at(schema, next)?);
            }
            let mut opt: IndexMap<String, TypeNode> = IndexMap::new();
            for (name, schema) in properties {
                if req.contains_key(name) {
                    continue;
                }
                opt.insert(name.clone(), derive_at(schema, next)?);
            }
            let indexed = match additional {
                Some(a) => Some(Box::new(derive_at(a, next)?)),
                None => None, // only declared names are valid
            };
            TypeNode::unnamed(TypeKind::Object { required: req, optional: opt, indexed })
        }

        SchemaKind::Combinator { op, operands } => {
            let derived = operands
                .iter()
                .map(|o| derive_at(o, next))
                .collect::<Result<Vec<_>>>()?;
            match op {
                CombineOp::AllOf => intersection_of(derived),
                // oneOf is an ordinary union: exclusivity is not enforced
                CombineOp::OneOf => union_of(derived),
                CombineOp::AnyOf => any_of(derived),
            }
        }

        SchemaKind::Not { operand } => derive_not(operand),

        SchemaKind::Conditional { condition, consequent, alternative } => {
            // static conditional: the condition shape merges with the
            // consequent, it is never evaluated against a value
            let merged = intersection_of(vec![
                derive_at(condition, next)?,
                derive_at(consequent, next)?,
            ]);
            match alternative {
                Some(alt) => union_of(vec![merged, derive_at(alt, next)?]),
                None => merged,
            }
        }

        // the caller skipped resolution; opaque, per the Unknown contract
        SchemaKind::Ref { .. } => TypeNode::unnamed(TypeKind::Unknown),

        SchemaKind::Recursive { id } => {
            TypeNode::unnamed(TypeKind::Recursive { target: id.clone() })
        }
    };

    if node.id.is_some() {
        out.name = node.id.clone();
    }
    Ok(out)
}

/// `const` wins over `enum`, and both win over the general primitive.
fn narrowed(general: TypeKind, lits: &Literals) -> TypeNode {
    if let Some(value) = &lits.const_ {
        return TypeNode::unnamed(TypeKind::Literal(value.clone()));
    }
    if !lits.enum_.is_empty() {
        let members = lits
            .enum_
            .iter()
            .map(|value| TypeNode::unnamed(TypeKind::Literal(value.clone())))
            .collect();
        return union_of(members);
    }
    TypeNode::unnamed(general)
}

/// `anyOf` composes associatively over pairs: `anyOf(a, b)` is
/// `A | B | (A & B)`, and `anyOf(a, b, c)` is `anyOf(anyOf(a, b), c)`
/// expanded the same way. Full 2^N-1 subset enumeration is NOT performed;
/// downstream consumers depend on this exact shape.
fn any_of(operands: Vec<TypeNode>) -> TypeNode {
    let mut it = operands.into_iter();
    let Some(mut acc) = it.next() else {
        return TypeNode::unnamed(TypeKind::Unknown);
    };
    for rhs in it {
        let both = intersection_of(vec![acc.clone(), rhs.clone()]);
        acc = union_of(vec![acc, rhs, both]);
    }
    acc
}

/// Coarse negation: the object and array catch-alls plus every primitive
/// kind the operand does not itself denote. Cannot negate a specific object
/// or array shape.
fn derive_not(operand: &SchemaNode) -> TypeNode {
    let denoted = operand.kind.primitive();
    let mut members = vec![
        TypeNode::unnamed(TypeKind::Object {
            required: IndexMap::new(),
            optional: IndexMap::new(),
            indexed: Some(Box::new(TypeNode::unnamed(TypeKind::Unknown))),
        }),
        TypeNode::unnamed(TypeKind::Array {
            item: Box::new(TypeNode::unnamed(TypeKind::Unknown)),
        }),
    ];
    for (prim, kind) in [
        (Prim::Null, TypeKind::Null),
        (Prim::Number, TypeKind::Number),
        (Prim::Undefined, TypeKind::Undefined),
        (Prim::String, TypeKind::String),
        (Prim::Boolean, TypeKind::Boolean),
    ] {
        if denoted != Some(prim) {
            members.push(TypeNode::unnamed(kind));
        }
    }
    union_of(members)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::parse::parse_value;
    use crate::schema::LitValue;
    use crate::schema_to_type;

    fn derived(doc: serde_json::Value) -> TypeNode {
        let node = parse_value(&doc).unwrap();
        schema_to_type(&node).unwrap()
    }

    #[test]
    fn primitives_map_to_matching_kinds() {
        assert_eq!(derived(json!({"type": "null"})).kind, TypeKind::Null);
        assert_eq!(derived(json!({"type": "boolean"})).kind, TypeKind::Boolean);
        assert_eq!(derived(json!({"type": "number"})).kind, TypeKind::Number);
        assert_eq!(derived(json!({"type": "string"})).kind, TypeKind::String);
        assert_eq!(derived(json!({"type": "undefined"})).kind, TypeKind::Undefined);
    }

    #[test]
    fn unsupported_shapes_derive_to_unknown() {
        assert_eq!(derived(json!({"type": "function"})).kind, TypeKind::Unknown);
        assert_eq!(derived(json!({})).kind, TypeKind::Unknown);
    }

    #[test]
    fn const_narrows_to_a_literal() {
        let t = derived(json!({"type": "string", "const": "on"}));
        assert_eq!(t.kind, TypeKind::Literal(LitValue::Str("on".into())));
    }

    #[test]
    fn enum_narrows_to_a_union_of_literals() {
        let t = derived(json!({"type": "string", "enum": ["on", "off"]}));
        let TypeKind::Union { members } = t.kind else {
            panic!("expected union of literals");
        };
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].kind, TypeKind::Literal(LitValue::Str("on".into())));
        assert_eq!(members[1].kind, TypeKind::Literal(LitValue::Str("off".into())));
    }

    #[test]
    fn single_element_enum_collapses_to_a_literal() {
        let t = derived(json!({"type": "number", "enum": [3]}));
        assert_eq!(t.kind, TypeKind::Literal(LitValue::Int(3)));
    }

    #[test]
    fn tuple_arity_is_exact_and_closed_without_additional_items() {
        let t = derived(json!({
            "type": "array",
            "items": [{"type": "number"}, {"type": "string"}]
        }));
        let TypeKind::Tuple { items, rest } = t.kind else {
            panic!("expected tuple");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].kind, TypeKind::Number);
        assert_eq!(items[1].kind, TypeKind::String);
        assert!(rest.is_none());
    }

    #[test]
    fn additional_items_becomes_a_rest_tail() {
        let t = derived(json!({
            "type": "array",
            "items": [{"type": "number"}, {"type": "string"}],
            "additionalItems": {"type": "boolean"}
        }));
        let TypeKind::Tuple { items, rest } = t.kind else {
            panic!("expected tuple");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(rest.unwrap().kind, TypeKind::Boolean);
    }

    #[test]
    fn long_tuples_have_no_arity_ceiling() {
        let items: Vec<_> = (0..14).map(|_| json!({"type": "number"})).collect();
        let t = derived(json!({"type": "array", "items": items}));
        let TypeKind::Tuple { items, .. } = t.kind else {
            panic!("expected tuple");
        };
        assert_eq!(items.len(), 14);
    }

    #[test]
    fn required_and_optional_buckets() {
        let t = derived(json!({
            "type": "object",
            "properties": {"a": {"type": "number"}, "b": {"type": "string"}},
            "required": ["a"]
        }));
        let TypeKind::Object { required, optional, indexed } = t.kind else {
            panic!("expected object");
        };
        assert_eq!(required.get("a").unwrap().kind, TypeKind::Number);
        assert!(required.get("b").is_none());
        assert_eq!(optional.get("b").unwrap().kind, TypeKind::String);
        assert!(optional.get("a").is_none());
        assert!(indexed.is_none());
    }

    #[test]
    fn required_without_declaration_fails() {
        let node = parse_value(&json!({"type": "object", "required": ["a"]})).unwrap();
        assert_eq!(
            schema_to_type(&node).unwrap_err(),
            SchemaError::RequiredPropertyUndeclared { name: "a".into() }
        );
    }

    #[test]
    fn additional_properties_forms() {
        let t = derived(json!({
            "type": "object",
            "properties": {},
            "additionalProperties": {"type": "number"}
        }));
        let TypeKind::Object { indexed, .. } = t.kind else { panic!() };
        assert_eq!(indexed.unwrap().kind, TypeKind::Number);

        let t = derived(json!({"type": "object", "additionalProperties": true}));
        let TypeKind::Object { indexed, .. } = t.kind else { panic!() };
        assert_eq!(indexed.unwrap().kind, TypeKind::Unknown);

        let t = derived(json!({"type": "object", "additionalProperties": false}));
        let TypeKind::Object { indexed, .. } = t.kind else { panic!() };
        assert!(indexed.is_none());
    }

    #[test]
    fn all_of_derives_an_intersection() {
        let t = derived(json!({"allOf": [
            {"type": "object", "properties": {"a": {"type": "number"}}, "required": ["a"]},
            {"type": "object", "properties": {"b": {"type": "string"}}, "required": ["b"]}
        ]}));
        let TypeKind::Intersection { members } = t.kind else {
            panic!("expected intersection");
        };
        assert_eq!(members.len(), 2);
        assert!(members.iter().all(|m| matches!(m.kind, TypeKind::Object { .. })));
    }

    #[test]
    fn one_of_is_a_plain_union() {
        let t = derived(json!({"oneOf": [{"type": "string"}, {"type": "number"}]}));
        assert_eq!(
            t.kind,
            TypeKind::Union {
                members: vec![
                    TypeNode::unnamed(TypeKind::String),
                    TypeNode::unnamed(TypeKind::Number),
                ]
            }
        );
    }

    #[test]
    fn any_of_two_operands_adds_the_pairwise_intersection() {
        let t = derived(json!({"anyOf": [{"type": "string"}, {"type": "number"}]}));
        let TypeKind::Union { members } = t.kind else {
            panic!("expected union");
        };
        assert_eq!(members.len(), 3);
        assert_eq!(members[0].kind, TypeKind::String);
        assert_eq!(members[1].kind, TypeKind::Number);
        assert_eq!(
            members[2].kind,
            TypeKind::Intersection {
                members: vec![
                    TypeNode::unnamed(TypeKind::String),
                    TypeNode::unnamed(TypeKind::Number),
                ]
            }
        );
    }

    #[test]
    fn any_of_composes_associatively_not_by_subset_enumeration() {
        let t = derived(json!({"anyOf": [
            {"type": "string"}, {"type": "number"}, {"type": "boolean"}
        ]}));
        let TypeKind::Union { members } = t.kind else {
            panic!("expected union");
        };
        // anyOf(a, b, c) = anyOf(anyOf(a, b), c): the two-operand expansion
        // splices in, then c, then the top-level pairing
        assert_eq!(members.len(), 5);
        assert_eq!(members[0].kind, TypeKind::String);
        assert_eq!(members[1].kind, TypeKind::Number);
        assert!(matches!(members[2].kind, TypeKind::Intersection { .. }));
        assert_eq!(members[3].kind, TypeKind::Boolean);
        let TypeKind::Intersection { members: pair } = &members[4].kind else {
            panic!("expected pairing with the third operand");
        };
        assert!(matches!(pair[0].kind, TypeKind::Union { .. }));
        assert_eq!(pair[1].kind, TypeKind::Boolean);
    }

    #[test]
    fn not_excludes_only_the_denoted_primitive() {
        let t = derived(json!({"not": {"type": "number"}}));
        let TypeKind::Union { members } = t.kind else {
            panic!("expected union");
        };
        // object and array catch-alls, then the four remaining primitives
        assert_eq!(members.len(), 6);
        assert!(members.iter().any(|m| matches!(m.kind, TypeKind::Object { .. })));
        assert!(members.iter().any(|m| matches!(m.kind, TypeKind::Array { .. })));
        assert!(!members.iter().any(|m| m.kind == TypeKind::Number));
        for kind in [TypeKind::Null, TypeKind::Undefined, TypeKind::String, TypeKind::Boolean] {
            assert!(members.iter().any(|m| m.kind == kind), "missing {kind:?}");
        }
    }

    #[test]
    fn not_of_a_non_primitive_keeps_all_primitives() {
        let t = derived(json!({"not": {"type": "object", "properties": {}}}));
        let TypeKind::Union { members } = t.kind else {
            panic!("expected union");
        };
        assert_eq!(members.len(), 7);
    }

    #[test]
    fn conditional_merges_condition_with_consequent() {
        let t = derived(json!({
            "if": {"type": "object", "properties": {"kind": {"const": "a"}}},
            "then": {"type": "object", "properties": {"a": {"type": "number"}}},
            "else": {"type": "string"}
        }));
        let TypeKind::Union { members } = t.kind else {
            panic!("expected union");
        };
        assert_eq!(members.len(), 2);
        assert!(matches!(members[0].kind, TypeKind::Intersection { .. }));
        assert_eq!(members[1].kind, TypeKind::String);
    }

    #[test]
    fn conditional_without_else_is_just_the_merged_arm() {
        let t = derived(json!({"if": {"type": "string"}, "then": {"const": "x"}}));
        let TypeKind::Intersection { members } = t.kind else {
            panic!("expected intersection");
        };
        assert_eq!(members[0].kind, TypeKind::String);
        assert_eq!(members[1].kind, TypeKind::Literal(LitValue::Str("x".into())));
    }

    #[test]
    fn concrete_object_scenario() {
        let t = derived(json!({
            "type": "object",
            "properties": {"a": {"type": "number"}},
            "required": ["a"]
        }));
        let TypeKind::Object { required, optional, indexed } = t.kind else {
            panic!("expected object");
        };
        assert_eq!(required.len(), 1);
        assert_eq!(required.get("a").unwrap().kind, TypeKind::Number);
        assert!(optional.is_empty());
        assert!(indexed.is_none());
    }

    #[test]
    fn hostile_nesting_fails_with_depth_exceeded() {
        let mut doc = json!({"type": "number"});
        for _ in 0..(crate::MAX_DEPTH + 8) {
            doc = json!({"type": "array", "items": doc});
        }
        let node = parse_value(&doc).unwrap();
        assert_eq!(
            schema_to_type(&node).unwrap_err(),
            SchemaError::DepthExceeded { limit: crate::MAX_DEPTH }
        );
    }
}
