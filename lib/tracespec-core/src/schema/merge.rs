use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use super::format::detect_format;
use super::node::{
    ArraySchema, IntegerSchema, NumberSchema, ObjectSchema, SchemaNode, StringSchema, UnionSchema,
};

/// Enum attachment bounds: a closed value set is informative at 2–10
/// distinct values; above that it is likely free text, below it carries no
/// new information.
const ENUM_MIN: usize = 2;
const ENUM_MAX: usize = 10;

/// JSON value kinds, the partitioning axis of the merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Kind {
    Object,
    Array,
    String,
    Integer,
    Number,
    Boolean,
    Null,
}

fn kind_of(value: &Value) -> Kind {
    match value {
        Value::Object(_) => Kind::Object,
        Value::Array(_) => Kind::Array,
        Value::String(_) => Kind::String,
        Value::Number(number) => {
            if number.as_i64().is_some() {
                Kind::Integer
            } else {
                Kind::Number
            }
        }
        Value::Bool(_) => Kind::Boolean,
        Value::Null => Kind::Null,
    }
}

/// Merges a set of example JSON documents into one unified schema node that
/// is consistent with every example.
///
/// Returns `None` only for an empty input. When all values share one kind
/// the result is a kind-specific node; otherwise it is a
/// [`SchemaNode::Union`] whose alternatives are the per-kind merges of the
/// partitioned subsets, in order of first appearance.
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use tracespec_core::{SchemaNode, merge_values};
///
/// let values = vec![json!({"a": 1}), json!({"a": 2, "b": "x"})];
/// let schema = merge_values(&values).expect("a schema");
///
/// let SchemaNode::Object(object) = schema else {
///     panic!("expected an object schema");
/// };
/// assert_eq!(object.properties.len(), 2);
/// // Only `a` appeared in every sample.
/// let required = object.required.expect("required set");
/// assert!(required.contains("a"));
/// assert!(!required.contains("b"));
/// ```
pub fn merge_values(values: &[Value]) -> Option<SchemaNode> {
    let refs: Vec<&Value> = values.iter().collect();
    merge_refs(&refs)
}

fn merge_refs(values: &[&Value]) -> Option<SchemaNode> {
    if values.is_empty() {
        return None;
    }

    let mut by_kind: IndexMap<Kind, Vec<&Value>> = IndexMap::new();
    for value in values {
        by_kind.entry(kind_of(value)).or_default().push(value);
    }

    if by_kind.len() == 1 {
        by_kind
            .into_iter()
            .next()
            .map(|(kind, group)| merge_kind(kind, &group))
    } else {
        let variants = by_kind
            .into_iter()
            .map(|(kind, group)| merge_kind(kind, &group))
            .collect();
        Some(SchemaNode::Union(UnionSchema { variants }))
    }
}

fn merge_kind(kind: Kind, values: &[&Value]) -> SchemaNode {
    match kind {
        Kind::Object => merge_objects(values),
        Kind::Array => merge_arrays(values),
        Kind::String => merge_strings(values),
        Kind::Integer => merge_integers(values),
        Kind::Number => merge_numbers(values),
        Kind::Boolean => SchemaNode::Boolean,
        Kind::Null => SchemaNode::Null,
    }
}

/// Property union across all sample objects; a property is required iff it
/// appeared in every sample.
fn merge_objects(values: &[&Value]) -> SchemaNode {
    let objects: Vec<_> = values.iter().filter_map(|value| value.as_object()).collect();
    let total = objects.len();

    let mut samples_by_property: IndexMap<&str, Vec<&Value>> = IndexMap::new();
    for object in &objects {
        for (name, value) in *object {
            samples_by_property
                .entry(name.as_str())
                .or_default()
                .push(value);
        }
    }

    let mut properties = IndexMap::new();
    let mut required = IndexSet::new();
    for (name, samples) in samples_by_property {
        if samples.len() == total {
            required.insert(name.to_string());
        }
        if let Some(child) = merge_refs(&samples) {
            properties.insert(name.to_string(), child);
        }
    }

    let required = (!required.is_empty()).then_some(required);
    SchemaNode::Object(ObjectSchema {
        properties,
        required,
    })
}

/// Every element from every sample array lands in one pool; heterogeneous
/// pools come back as a union items schema.
fn merge_arrays(values: &[&Value]) -> SchemaNode {
    let pool: Vec<&Value> = values
        .iter()
        .filter_map(|value| value.as_array())
        .flatten()
        .collect();
    let items = merge_refs(&pool).map(Box::new);
    SchemaNode::Array(ArraySchema { items })
}

fn merge_strings(values: &[&Value]) -> SchemaNode {
    let strings: Vec<&str> = values.iter().filter_map(|value| value.as_str()).collect();

    let example = strings.first().map(|first| (*first).to_string());
    let format = detect_format(&strings);

    let distinct: IndexSet<&str> = strings
        .iter()
        .copied()
        .filter(|value| !value.is_empty())
        .collect();
    let enum_values = (ENUM_MIN..=ENUM_MAX).contains(&distinct.len()).then(|| {
        distinct
            .iter()
            .map(|value| (*value).to_string())
            .collect::<Vec<_>>()
    });

    SchemaNode::String(StringSchema {
        format,
        enum_values,
        example,
    })
}

fn merge_integers(values: &[&Value]) -> SchemaNode {
    let numbers: Vec<i64> = values.iter().filter_map(|value| value.as_i64()).collect();
    let example = numbers.first().copied().unwrap_or_default();
    let minimum = numbers.iter().copied().min().unwrap_or(example);
    let maximum = numbers.iter().copied().max().unwrap_or(example);
    SchemaNode::Integer(IntegerSchema {
        minimum,
        maximum,
        example,
    })
}

fn merge_numbers(values: &[&Value]) -> SchemaNode {
    let numbers: Vec<f64> = values.iter().filter_map(|value| value.as_f64()).collect();
    let example = numbers.first().copied().unwrap_or_default();
    let minimum = numbers.iter().copied().fold(example, f64::min);
    let maximum = numbers.iter().copied().fold(example, f64::max);
    SchemaNode::Number(NumberSchema {
        minimum,
        maximum,
        example,
    })
}
