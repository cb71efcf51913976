//! Renderers for the derived type graph.
//!
//! `render_decls` prints TypeScript-style `type` declarations. Named
//! definitions are hoisted into declarations of their own, so `Recursive`
//! back-edges come out as plain identifier references instead of infinite
//! expansions. `type_graph_json` prints the graph itself, for tooling that
//! wants structure rather than syntax.

use indexmap::IndexMap;
use serde_json::{json, Value};

use crate::ty::{LitValue, TypeKind, TypeNode};

// ————————————————————————————————————————————————————————————————————————————
// DECLARATION TEXT
// ————————————————————————————————————————————————————————————————————————————

pub fn render_decls(root: &TypeNode, root_name: &str) -> String {
    let mut named: IndexMap<String, &TypeNode> = IndexMap::new();
    collect_named(root, &mut named);

    let mut out = String::new();
    for (name, node) in &named {
        out.push_str(&format!(
            "type {} = {};\n",
            ident(name),
            render_kind(&node.kind, &named, Prec::Top)
        ));
    }
    let root_body = match &root.name {
        Some(name) => ident(name),
        None => render_kind(&root.kind, &named, Prec::Top),
    };
    out.push_str(&format!("type {} = {};\n", ident(root_name), root_body));
    out
}

fn collect_named<'a>(node: &'a TypeNode, named: &mut IndexMap<String, &'a TypeNode>) {
    if let Some(name) = &node.name {
        // inlined copies of one definition are identical; first one wins
        named.entry(name.clone()).or_insert(node);
    }
    match &node.kind {
        TypeKind::Array { item } => collect_named(item, named),
        TypeKind::Tuple { items, rest } => {
            for item in items {
                collect_named(item, named);
            }
            if let Some(rest) = rest {
                collect_named(rest, named);
            }
        }
        TypeKind::Object { required, optional, indexed } => {
            for t in required.values().chain(optional.values()) {
                collect_named(t, named);
            }
            if let Some(ix) = indexed {
                collect_named(ix, named);
            }
        }
        TypeKind::Union { members } | TypeKind::Intersection { members } => {
            for m in members {
                collect_named(m, named);
            }
        }
        _ => {}
    }
}

/// Binding strength of the surrounding syntax; weaker contexts never need
/// parentheses around stronger constructs.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
enum Prec {
    Top,
    Union,
    Intersection,
    Postfix,
}

fn render_node(node: &TypeNode, named: &IndexMap<String, &TypeNode>, prec: Prec) -> String {
    if let Some(name) = &node.name {
        if named.contains_key(name) {
            return ident(name);
        }
    }
    render_kind(&node.kind, named, prec)
}

fn render_kind(kind: &TypeKind, named: &IndexMap<String, &TypeNode>, prec: Prec) -> String {
    match kind {
        TypeKind::Null => "null".into(),
        TypeKind::Boolean => "boolean".into(),
        TypeKind::Number => "number".into(),
        TypeKind::String => "string".into(),
        TypeKind::Undefined => "undefined".into(),
        TypeKind::Unknown => "unknown".into(),
        TypeKind::Literal(value) => literal_text(value),
        TypeKind::Recursive { target } => ident(target),

        TypeKind::Array { item } => {
            format!("{}[]", render_node(item, named, Prec::Postfix))
        }

        TypeKind::Tuple { items, rest } => {
            let mut parts: Vec<String> = items
                .iter()
                .map(|item| render_node(item, named, Prec::Top))
                .collect();
            if let Some(rest) = rest {
                parts.push(format!("...{}[]", render_node(rest, named, Prec::Postfix)));
            }
            format!("[{}]", parts.join(", "))
        }

        TypeKind::Object { required, optional, indexed } => {
            let mut parts: Vec<String> = Vec::new();
            for (name, t) in required {
                parts.push(format!("{}: {}", prop(name), render_node(t, named, Prec::Top)));
            }
            for (name, t) in optional {
                parts.push(format!("{}?: {}", prop(name), render_node(t, named, Prec::Top)));
            }
            if let Some(ix) = indexed {
                parts.push(format!("[key: string]: {}", render_node(ix, named, Prec::Top)));
            }
            if parts.is_empty() {
                "{}".into()
            } else {
                format!("{{ {} }}", parts.join("; "))
            }
        }

        TypeKind::Union { members } => {
            let body = members
                .iter()
                .map(|m| render_node(m, named, Prec::Union))
                .collect::<Vec<_>>()
                .join(" | ");
            if prec > Prec::Union { format!("({body})") } else { body }
        }

        TypeKind::Intersection { members } => {
            let body = members
                .iter()
                .map(|m| render_node(m, named, Prec::Intersection))
                .collect::<Vec<_>>()
                .join(" & ");
            if prec > Prec::Intersection { format!("({body})") } else { body }
        }
    }
}

fn literal_text(value: &LitValue) -> String {
    match value {
        LitValue::Null => "null".into(),
        LitValue::Bool(b) => b.to_string(),
        LitValue::Int(i) => i.to_string(),
        LitValue::Float(f) => f.0.to_string(),
        LitValue::Str(s) => Value::from(s.as_str()).to_string(), // JSON quoting
    }
}

/// Turn an `$id` into a usable identifier. Ids are plain names in practice;
/// anything else degrades to underscores.
fn ident(raw: &str) -> String {
    let out: String = raw
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let ok = c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit());
            if ok { c } else { '_' }
        })
        .collect();
    if out.is_empty() { "_".into() } else { out }
}

fn prop(name: &str) -> String {
    let plain = !name.is_empty()
        && name
            .chars()
            .enumerate()
            .all(|(i, c)| c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit()));
    if plain { name.into() } else { Value::from(name).to_string() }
}

// ————————————————————————————————————————————————————————————————————————————
// GRAPH VIEW
// ————————————————————————————————————————————————————————————————————————————

pub fn type_graph_json(node: &TypeNode) -> Value {
    let mut out = match &node.kind {
        TypeKind::Null => json!({"kind": "null"}),
        TypeKind::Boolean => json!({"kind": "boolean"}),
        TypeKind::Number => json!({"kind": "number"}),
        TypeKind::String => json!({"kind": "string"}),
        TypeKind::Undefined => json!({"kind": "undefined"}),
        TypeKind::Unknown => json!({"kind": "unknown"}),
        TypeKind::Literal(value) => json!({"kind": "literal", "value": literal_json(value)}),
        TypeKind::Recursive { target } => json!({"kind": "recursive", "target": target}),

        TypeKind::Array { item } => json!({"kind": "array", "item": type_graph_json(item)}),

        TypeKind::Tuple { items, rest } => {
            let mut o = json!({
                "kind": "tuple",
                "items": items.iter().map(type_graph_json).collect::<Vec<_>>(),
            });
            if let Some(rest) = rest {
                o["rest"] = type_graph_json(rest);
            }
            o
        }

        TypeKind::Object { required, optional, indexed } => {
            let req: serde_json::Map<String, Value> = required
                .iter()
                .map(|(name, t)| (name.clone(), type_graph_json(t)))
                .collect();
            let opt: serde_json::Map<String, Value> = optional
                .iter()
                .map(|(name, t)| (name.clone(), type_graph_json(t)))
                .collect();
            let mut o = json!({"kind": "object", "required": req, "optional": opt});
            if let Some(ix) = indexed {
                o["indexed"] = type_graph_json(ix);
            }
            o
        }

        TypeKind::Union { members } => json!({
            "kind": "union",
            "members": members.iter().map(type_graph_json).collect::<Vec<_>>(),
        }),

        TypeKind::Intersection { members } => json!({
            "kind": "intersection",
            "members": members.iter().map(type_graph_json).collect::<Vec<_>>(),
        }),
    };
    if let Some(name) = &node.name {
        out["name"] = Value::from(name.clone());
    }
    out
}

fn literal_json(value: &LitValue) -> Value {
    match value {
        LitValue::Null => Value::Null,
        LitValue::Bool(b) => Value::from(*b),
        LitValue::Int(i) => Value::from(*i),
        LitValue::Float(f) => Value::from(f.0),
        LitValue::Str(s) => Value::from(s.clone()),
    }
}
