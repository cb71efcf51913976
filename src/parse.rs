//! JSON front-end: deserialize the raw JSON Schema surface and classify it
//! into the schema node model.
//!
//! Lenient by design. Keywords with no structural meaning here
//! (`patternProperties`, `dependencies`, numeric/string constraints,
//! titles) are accepted and ignored, and an unrecognized `type` becomes
//! `Any` so derivation can answer `Unknown` instead of failing.

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::Deserialize;
use serde_json::Value;

use crate::schema::{CombineOp, LitValue, Literals, SchemaKind, SchemaNode};

/// Parse a serialized document, reporting failures with JSON-path context.
pub fn parse_str(src: &str) -> anyhow::Result<SchemaNode> {
    let de = &mut serde_json::Deserializer::from_str(src);
    match serde_path_to_error::deserialize::<_, RawSchema>(de) {
        Ok(raw) => Ok(build(&raw)),
        Err(err) => {
            let path = err.path().to_string();
            Err(anyhow::anyhow!("at JSON path {path}: {}", err.into_inner()))
        }
    }
}

/// Parse an in-memory JSON value (already decoded, e.g. jq output).
pub fn parse_value(value: &Value) -> anyhow::Result<SchemaNode> {
    let raw = RawSchema::deserialize(value)?;
    Ok(build(&raw))
}

// ————————————————————————————————————————————————————————————————————————————
// RAW DOCUMENT SHAPE
// ————————————————————————————————————————————————————————————————————————————

// Unknown keys are ignored by serde; that is where the structural-only
// keywords go.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawSchema {
    #[serde(rename = "$id")]
    id: Option<String>,

    #[serde(rename = "$ref")]
    reference: Option<String>,

    #[serde(rename = "type")]
    type_name: Option<String>,

    #[serde(rename = "const")]
    const_: Option<Value>,

    #[serde(rename = "enum")]
    enum_: Option<Vec<Value>>,

    items: Option<RawItems>,

    #[serde(rename = "additionalItems")]
    additional_items: Option<RawAdditional>,

    properties: Option<IndexMap<String, RawSchema>>,

    required: Option<Vec<String>>,

    #[serde(rename = "additionalProperties")]
    additional_properties: Option<RawAdditional>,

    #[serde(rename = "allOf")]
    all_of: Option<Vec<RawSchema>>,

    #[serde(rename = "oneOf")]
    one_of: Option<Vec<RawSchema>>,

    #[serde(rename = "anyOf")]
    any_of: Option<Vec<RawSchema>>,

    not: Option<Box<RawSchema>>,

    // capitalized spellings occur in the wild
    #[serde(rename = "if", alias = "If")]
    if_: Option<Box<RawSchema>>,

    #[serde(rename = "then", alias = "Then")]
    then: Option<Box<RawSchema>>,

    #[serde(rename = "else", alias = "Else")]
    else_: Option<Box<RawSchema>>,

    #[serde(alias = "$defs")]
    definitions: Option<IndexMap<String, RawSchema>>,
}

/// `items` is either one schema (homogeneous list) or a positional
/// sequence (tuple). `Many` must be tried first: a struct with all-default
/// fields would otherwise also accept a sequence.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawItems {
    Many(Vec<RawSchema>),
    One(Box<RawSchema>),
}

/// `additionalProperties` / `additionalItems`: boolean or schema form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawAdditional {
    Allowed(bool),
    Schema(Box<RawSchema>),
}

impl RawAdditional {
    fn to_node(&self) -> Option<SchemaNode> {
        match self {
            RawAdditional::Allowed(true) => Some(SchemaNode::default()),
            RawAdditional::Allowed(false) => None,
            RawAdditional::Schema(schema) => Some(build(schema)),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// CLASSIFICATION
// ————————————————————————————————————————————————————————————————————————————

fn build(raw: &RawSchema) -> SchemaNode {
    let defs = raw
        .definitions
        .as_ref()
        .map(|defs| defs.values().map(build).collect())
        .unwrap_or_default();
    SchemaNode { id: raw.id.clone(), defs, kind: classify(raw) }
}

/// Most specific keyword wins: `$ref` outranks everything, then the
/// combinators, negation and conditionals, then the typed shapes.
fn classify(raw: &RawSchema) -> SchemaKind {
    if let Some(target) = &raw.reference {
        return SchemaKind::Ref { id: target.clone() };
    }
    if let Some(operands) = &raw.all_of {
        return combinator(CombineOp::AllOf, operands);
    }
    if let Some(operands) = &raw.one_of {
        return combinator(CombineOp::OneOf, operands);
    }
    if let Some(operands) = &raw.any_of {
        return combinator(CombineOp::AnyOf, operands);
    }
    if let Some(operand) = &raw.not {
        return SchemaKind::Not { operand: Box::new(build(operand)) };
    }
    if let Some(condition) = &raw.if_ {
        // a missing `then` constrains nothing
        let consequent = raw.then.as_deref().map(build).unwrap_or_default();
        return SchemaKind::Conditional {
            condition: Box::new(build(condition)),
            consequent: Box::new(consequent),
            alternative: raw.else_.as_deref().map(|e| Box::new(build(e))),
        };
    }

    match raw.type_name.as_deref() {
        Some("object") => object_kind(raw),
        Some("array") => array_kind(raw),
        Some("null") => SchemaKind::Null(literals(raw)),
        Some("boolean") => SchemaKind::Boolean(literals(raw)),
        // `integer` has no kind of its own in the derived model
        Some("number") | Some("integer") => SchemaKind::Number(literals(raw)),
        Some("string") => SchemaKind::String(literals(raw)),
        Some("undefined") => SchemaKind::Undefined(literals(raw)),
        Some(_) => SchemaKind::Any,
        None => untyped(raw),
    }
}

/// No `type`: classify from whichever structural keyword is present, or
/// infer a bare `const`/`enum` carrier from its first scalar literal.
fn untyped(raw: &RawSchema) -> SchemaKind {
    if raw.properties.is_some() {
        return object_kind(raw);
    }
    if raw.items.is_some() {
        return array_kind(raw);
    }
    let lits = literals(raw);
    let sample = lits.const_.clone().or_else(|| lits.enum_.first().cloned());
    match sample {
        Some(LitValue::Null) => SchemaKind::Null(lits),
        Some(LitValue::Bool(_)) => SchemaKind::Boolean(lits),
        Some(LitValue::Int(_)) | Some(LitValue::Float(_)) => SchemaKind::Number(lits),
        Some(LitValue::Str(_)) => SchemaKind::String(lits),
        None => SchemaKind::Any,
    }
}

fn object_kind(raw: &RawSchema) -> SchemaKind {
    let properties = raw
        .properties
        .as_ref()
        .map(|props| props.iter().map(|(name, p)| (name.clone(), build(p))).collect())
        .unwrap_or_default();
    SchemaKind::Object {
        properties,
        required: raw.required.clone().unwrap_or_default(),
        additional: raw
            .additional_properties
            .as_ref()
            .and_then(RawAdditional::to_node)
            .map(Box::new),
    }
}

fn array_kind(raw: &RawSchema) -> SchemaKind {
    match &raw.items {
        Some(RawItems::Many(items)) => SchemaKind::Tuple {
            items: items.iter().map(build).collect(),
            additional: raw
                .additional_items
                .as_ref()
                .and_then(RawAdditional::to_node)
                .map(Box::new),
        },
        Some(RawItems::One(item)) => SchemaKind::Array { item: Box::new(build(item)) },
        // `{"type": "array"}` with no item schema: an array of anything
        None => SchemaKind::Array { item: Box::new(SchemaNode::default()) },
    }
}

fn combinator(op: CombineOp, operands: &[RawSchema]) -> SchemaKind {
    SchemaKind::Combinator { op, operands: operands.iter().map(build).collect() }
}

/// Scalar `const`/`enum` carriers only; composite values do not narrow.
fn literals(raw: &RawSchema) -> Literals {
    Literals {
        const_: raw.const_.as_ref().and_then(lit_value),
        enum_: raw.enum_.iter().flatten().filter_map(lit_value).collect(),
    }
}

fn lit_value(value: &Value) -> Option<LitValue> {
    match value {
        Value::Null => Some(LitValue::Null),
        Value::Bool(b) => Some(LitValue::Bool(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(LitValue::Int(i))
            } else {
                n.as_f64().map(|f| LitValue::Float(OrderedFloat(f)))
            }
        }
        Value::String(s) => Some(LitValue::Str(s.clone())),
        Value::Array(_) | Value::Object(_) => None,
    }
}
