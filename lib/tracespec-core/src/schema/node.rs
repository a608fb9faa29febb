use indexmap::{IndexMap, IndexSet};

/// Recognized string formats, named as downstream schema tooling expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum StringFormat {
    /// Timestamp with a time component.
    #[display("date-time")]
    DateTime,
    /// Bare `YYYY-MM-DD` date.
    #[display("date")]
    Date,
    /// Email address shape.
    #[display("email")]
    Email,
    /// Absolute URI.
    #[display("uri")]
    Uri,
}

/// A recursive structural description of observed JSON shapes.
///
/// Nodes are built bottom-up by the shape merger and immutable once
/// returned. JSON has no cycles, so neither does this tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// JSON object with per-property child schemas.
    Object(ObjectSchema),
    /// JSON array with a single unified items schema.
    Array(ArraySchema),
    /// String scalar with optional format and enum.
    String(StringSchema),
    /// Whole-number scalar.
    Integer(IntegerSchema),
    /// Decimal scalar.
    Number(NumberSchema),
    /// Boolean scalar.
    Boolean,
    /// JSON null.
    Null,
    /// Two or more structurally distinct shapes observed for one position.
    Union(UnionSchema),
}

impl SchemaNode {
    /// Whether the node describes a composite shape worth hoisting into a
    /// named definition. Scalars stay inline.
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            SchemaNode::Object(_) | SchemaNode::Array(_) | SchemaNode::Union(_)
        )
    }
}

/// Object shape: property schemas plus the names present in every sample.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    /// Child schema per property name, in first-seen order.
    pub properties: IndexMap<String, SchemaNode>,
    /// Property names present in 100% of the merged samples; `None` rather
    /// than an empty set when nothing is required.
    pub required: Option<IndexSet<String>>,
}

/// Array shape. Arrays are treated as homogeneous: every element from every
/// sample is pooled into one items schema (heterogeneous arrays surface as a
/// union items schema).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArraySchema {
    /// Unified element schema; `None` only when every sample array was empty.
    pub items: Option<Box<SchemaNode>>,
}

/// String scalar shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StringSchema {
    /// Format shared by all samples, if any.
    pub format: Option<StringFormat>,
    /// Closed value set, attached when 2–10 distinct non-empty values were
    /// observed.
    pub enum_values: Option<Vec<String>>,
    /// First observed value.
    pub example: Option<String>,
}

/// Integer scalar shape with observed bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerSchema {
    /// Smallest observed value.
    pub minimum: i64,
    /// Largest observed value.
    pub maximum: i64,
    /// First observed value.
    pub example: i64,
}

/// Decimal scalar shape with observed bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberSchema {
    /// Smallest observed value.
    pub minimum: f64,
    /// Largest observed value.
    pub maximum: f64,
    /// First observed value.
    pub example: f64,
}

/// Union of alternatives, one per distinct kind, in first-appearance order.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionSchema {
    /// The alternative shapes.
    pub variants: Vec<SchemaNode>,
}
