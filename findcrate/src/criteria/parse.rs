//! JSON criteria → typed tree.
//!
//! Accepted shapes:
//!
//! ```json
//! {"u.id": 3, "u.uid": "uid", "u.foo": [1, 2, 3]}
//! {"status": "open", "or": {"priority": {"gte": 3}, "owner": null}}
//! {"and": [["age", "between", [18, 65]], ["deleted_at", "isNull"]]}
//! ```
//!
//! - `"and"` / `"or"` keys open a group; their value is an object or an array.
//! - `field: scalar` is `eq`, `field: null` is `isNull`, `field: [..]` is `in`.
//! - `field: {"gte": 3, "lt": 9}` is an operator map, one leaf per entry.
//! - `field: {"or": .., "x": 1}` is a nested group (OR if the object has an
//!   `"or"` key, else AND) over the object's entries; the field key is only a label.
//! - Array elements are `[field, operator, value]` triples or objects.

use sea_orm::Value;
use serde_json::{Map, Value as Json};
use uuid::Uuid;

use super::types::{Arity, Combinator, Criteria, CriteriaNode, Criterion, CriterionValue, Operator};
use crate::errors::CriteriaError;

// Basic safety limits
const MAX_DEPTH: usize = 32;
const MAX_FIELD_NAME_LENGTH: usize = 100;

impl Criteria {
    /// Parse a decoded JSON criteria document.
    ///
    /// # Errors
    ///
    /// Any [`CriteriaError`]; the first problem found aborts the parse.
    pub fn from_json(json: &Json) -> Result<Self, CriteriaError> {
        match json {
            Json::Null => Ok(Self::default()),
            Json::Object(map) => parse_object(map, "", 0).map(Self::new),
            Json::Array(items) => parse_array(items, "", 0).map(Self::new),
            _ => Err(CriteriaError::malformed("", "expected a JSON object or array")),
        }
    }

    /// Parse a JSON criteria string, as received in a `filter` query parameter.
    ///
    /// # Errors
    ///
    /// [`CriteriaError::MalformedCriterion`] for invalid JSON, otherwise as
    /// [`Criteria::from_json`].
    pub fn from_json_str(text: &str) -> Result<Self, CriteriaError> {
        let json: Json = serde_json::from_str(text)
            .map_err(|e| CriteriaError::malformed("", format!("invalid JSON: {e}")))?;
        Self::from_json(&json)
    }
}

impl TryFrom<Json> for Criteria {
    type Error = CriteriaError;

    fn try_from(json: Json) -> Result<Self, Self::Error> {
        Self::from_json(&json)
    }
}

impl<'de> serde::Deserialize<'de> for Criteria {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let json = Json::deserialize(deserializer)?;
        Self::from_json(&json).map_err(serde::de::Error::custom)
    }
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn check_depth(path: &str, depth: usize) -> Result<(), CriteriaError> {
    if depth > MAX_DEPTH {
        return Err(CriteriaError::malformed(
            path,
            format!("criteria nested deeper than {MAX_DEPTH} levels"),
        ));
    }
    Ok(())
}

fn check_field_name(path: &str, field: &str) -> Result<(), CriteriaError> {
    if field.is_empty() || field.len() > MAX_FIELD_NAME_LENGTH || field.contains("..") {
        return Err(CriteriaError::malformed(path, format!("invalid field name '{field}'")));
    }
    Ok(())
}

fn has_combinator_key(map: &Map<String, Json>) -> bool {
    map.keys().any(|key| Combinator::from_key(key).is_some())
}

fn parse_object(
    map: &Map<String, Json>,
    path: &str,
    depth: usize,
) -> Result<Vec<CriteriaNode>, CriteriaError> {
    check_depth(path, depth)?;
    let mut nodes = Vec::with_capacity(map.len());

    for (key, value) in map {
        let here = child_path(path, key);

        if let Some(combinator) = Combinator::from_key(key) {
            let children = parse_children(value, &here, depth + 1)?;
            nodes.push(CriteriaNode::group(combinator, children));
            continue;
        }

        check_field_name(&here, key)?;
        match value {
            Json::Object(inner) if has_combinator_key(inner) => {
                // The key is only a label; "or" wins over "and"
                let combinator = if inner.contains_key(Combinator::Or.as_str()) {
                    Combinator::Or
                } else {
                    Combinator::And
                };
                let children = parse_object(inner, &here, depth + 1)?;
                nodes.push(CriteriaNode::group(combinator, children));
            }
            Json::Object(operators) => {
                for (name, operand) in operators {
                    let operator = Operator::parse_for(key, name)?;
                    nodes.push(CriteriaNode::Leaf(leaf(key, operator, Some(operand))?));
                }
            }
            Json::Null => {
                nodes.push(CriteriaNode::leaf(key.clone(), Operator::IsNull, CriterionValue::None));
            }
            Json::Array(_) => nodes.push(CriteriaNode::Leaf(leaf(key, Operator::In, Some(value))?)),
            _ => nodes.push(CriteriaNode::Leaf(leaf(key, Operator::Eq, Some(value))?)),
        }
    }

    Ok(nodes)
}

fn parse_children(value: &Json, path: &str, depth: usize) -> Result<Vec<CriteriaNode>, CriteriaError> {
    match value {
        Json::Object(map) => parse_object(map, path, depth),
        Json::Array(items) => parse_array(items, path, depth),
        _ => Err(CriteriaError::malformed(path, "a group must be an object or an array")),
    }
}

fn parse_array(items: &[Json], path: &str, depth: usize) -> Result<Vec<CriteriaNode>, CriteriaError> {
    check_depth(path, depth)?;
    let mut nodes = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let here = format!("{path}[{index}]");
        match item {
            Json::Array(parts) => nodes.push(CriteriaNode::Leaf(parse_triple(parts, &here)?)),
            Json::Object(map) => nodes.extend(parse_object(map, &here, depth + 1)?),
            _ => {
                return Err(CriteriaError::malformed(
                    here,
                    "expected [field, operator, value] or an object",
                ));
            }
        }
    }

    Ok(nodes)
}

fn parse_triple(parts: &[Json], path: &str) -> Result<Criterion, CriteriaError> {
    let (field, operator, operand) = match parts {
        [Json::String(field), Json::String(op), value] => (field, op, Some(value)),
        [Json::String(field), Json::String(op)] => (field, op, None),
        _ => {
            return Err(CriteriaError::malformed(
                path,
                "expected [field, operator, value]",
            ));
        }
    };
    check_field_name(path, field)?;
    let operator = Operator::parse_for(field, operator)?;
    leaf(field, operator, operand)
}

/// Build a leaf, converting the JSON operand to the shape the operator needs.
fn leaf(field: &str, operator: Operator, operand: Option<&Json>) -> Result<Criterion, CriteriaError> {
    let op = operator.as_str();
    let value = match (operator.arity(), operand) {
        (Arity::Nullary, _) => CriterionValue::None,
        (Arity::Scalar, Some(json)) => CriterionValue::Scalar(scalar(field, json)?),
        (Arity::List, Some(Json::Array(items))) => CriterionValue::List(
            items
                .iter()
                .map(|item| scalar(field, item))
                .collect::<Result<_, _>>()?,
        ),
        (Arity::Pair, Some(Json::Array(items))) => match items.as_slice() {
            [low, high] => CriterionValue::Pair(scalar(field, low)?, scalar(field, high)?),
            _ => return Err(CriteriaError::arity(field, op, "expected exactly 2 values")),
        },
        (Arity::List, Some(_)) => return Err(CriteriaError::arity(field, op, "expected a list")),
        (Arity::Pair, Some(_)) => {
            return Err(CriteriaError::arity(field, op, "expected exactly 2 values"));
        }
        (_, None) => {
            return Err(CriteriaError::malformed(field, format!("'{op}' requires a value")));
        }
    };

    let criterion = Criterion::new(field, operator, value);
    criterion.validate()?;
    Ok(criterion)
}

/// Convert a JSON scalar to a bindable value.
fn scalar(field: &str, json: &Json) -> Result<Value, CriteriaError> {
    match json {
        Json::Bool(b) => Ok(Value::from(*b)),
        Json::Number(n) => {
            if let Some(int_value) = n.as_i64() {
                Ok(Value::from(int_value))
            } else if let Some(uint_value) = n.as_u64() {
                Ok(Value::from(uint_value))
            } else if let Some(float_value) = n.as_f64() {
                Ok(Value::from(float_value))
            } else {
                Err(CriteriaError::malformed(field, format!("unsupported number {n}")))
            }
        }
        Json::String(s) => Ok(Uuid::parse_str(s.trim())
            .map_or_else(|_| Value::from(s.clone()), Value::from)),
        Json::Null => Err(CriteriaError::malformed(
            field,
            "null is only allowed with isNull / isNotNull",
        )),
        Json::Array(_) | Json::Object(_) => {
            Err(CriteriaError::malformed(field, "expected a scalar value"))
        }
    }
}
