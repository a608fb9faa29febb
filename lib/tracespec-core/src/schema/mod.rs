//! Schema inference: merges the JSON bodies observed for an endpoint into
//! unified structural schemas and hoists composite roots into a shared,
//! named registry.

use http::StatusCode;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::warn;

pub(crate) mod format;
pub mod merge;
pub mod node;

use self::merge::merge_values;
use self::node::SchemaNode;
use crate::normalizer::endpoint::Endpoint;

/// Path prefixes skipped when deriving schema names from templates; they are
/// organizational, not resources.
const SKIP_PATH_PREFIXES: &[&str] = &[
    "api", "v1", "v2", "v3", "rest", "service", "public", "internal",
];

/// Which body of an exchange a schema describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum BodyRole {
    /// The request body.
    #[display("request")]
    Request,
    /// The response body for one status code.
    #[display("{_0} response")]
    Response(StatusCode),
}

/// Outcome of inferring one body role of one endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct InferredSchema {
    /// Unified schema, absent when no example body survived parsing.
    pub schema: Option<SchemaNode>,
    /// Name under which the schema was hoisted into the registry; `None`
    /// for scalar roots, which stay inline.
    pub schema_name: Option<String>,
    /// Number of bodies dropped because they were not valid JSON.
    pub skipped: usize,
}

/// Shared table of named schemas, owned by the analysis session.
///
/// Structurally identical bodies across endpoints reference one entry
/// instead of being duplicated; name collisions between different
/// structures are resolved with an incrementing numeric suffix.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entries: IndexMap<String, SchemaNode>,
}

impl SchemaRegistry {
    /// Registers a schema under a name derived from `hint`.
    ///
    /// Returns the existing name when a structurally identical schema is
    /// already present, the hint itself when it is free, or the hint with
    /// the next numeric suffix (`User`, `User2`, `User3`, …) otherwise.
    pub fn register(&mut self, hint: &str, node: &SchemaNode) -> String {
        if let Some((name, _)) = self.entries.iter().find(|(_, existing)| *existing == node) {
            return name.clone();
        }

        let mut name = hint.to_string();
        let mut suffix = 1;
        while self.entries.contains_key(&name) {
            suffix += 1;
            name = format!("{hint}{suffix}");
        }
        self.entries.insert(name.clone(), node.clone());
        name
    }

    /// Looks up a named schema.
    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.entries.get(name)
    }

    /// Named schemas in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.entries
            .iter()
            .map(|(name, node)| (name.as_str(), node))
    }

    /// Number of named schemas.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-session schema inference engine.
///
/// One engine runs over all endpoints of an analysis so that the hoisting
/// registry is shared; per-endpoint inference itself has no cross-endpoint
/// data dependency.
#[derive(Debug, Default)]
pub struct SchemaEngine {
    registry: SchemaRegistry,
}

impl SchemaEngine {
    /// Creates an engine with an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Infers the unified schema for one body role of one endpoint.
    ///
    /// Bodies that fail to parse as JSON are dropped with a warning and
    /// counted in [`InferredSchema::skipped`]; when no example survives the
    /// schema is simply absent. Documentation degrades gracefully rather
    /// than blocking the endpoint.
    pub fn infer<I, S>(&mut self, endpoint: &Endpoint<'_>, role: BodyRole, bodies: I) -> InferredSchema
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = Vec::new();
        let mut skipped = 0;
        for body in bodies {
            match parse_body(body.as_ref()) {
                Ok(value) => values.push(value),
                Err(error) => {
                    warn!(
                        endpoint = %endpoint.path_template,
                        %role,
                        %error,
                        "dropping unparseable body"
                    );
                    skipped += 1;
                }
            }
        }

        let schema = merge_values(&values);
        let schema_name = schema.as_ref().and_then(|node| {
            node.is_composite().then(|| {
                let hint = schema_name_hint(&endpoint.path_template, role);
                self.registry.register(&hint, node)
            })
        });

        InferredSchema {
            schema,
            schema_name,
            skipped,
        }
    }

    /// The registry accumulated so far.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Consumes the engine, yielding the registry.
    pub fn into_registry(self) -> SchemaRegistry {
        self.registry
    }
}

fn parse_body(body: &str) -> Result<Value, serde_path_to_error::Error<serde_json::Error>> {
    let mut deserializer = serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(&mut deserializer)
}

/// Derives a PascalCase schema name from the endpoint template and role,
/// e.g. `GET /api/v1/users/{id}` + 200 → `UserResponse`.
fn schema_name_hint(path_template: &str, role: BodyRole) -> String {
    use cruet::*;

    let resource = path_template
        .split('/')
        .filter(|segment| !segment.is_empty() && !segment.starts_with('{'))
        .filter(|segment| !SKIP_PATH_PREFIXES.contains(segment))
        .next_back()
        .unwrap_or("body");

    let base = resource.to_singular().to_class_case();
    let base = if base.is_empty() {
        "Body".to_string()
    } else {
        base
    };

    match role {
        BodyRole::Request => format!("{base}Request"),
        BodyRole::Response(status) if status.is_success() => format!("{base}Response"),
        BodyRole::Response(status) => format!("{base}Response{}", status.as_u16()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    // Endpoints are normally created by the normalizer; inference only
    // reads the template for name hints.
    fn endpoint(template: &str) -> Endpoint<'static> {
        Endpoint::new(
            Method::GET,
            template.to_string(),
            "https://api.example.com".to_string(),
        )
    }

    #[test]
    fn should_infer_schema_from_bodies() {
        let mut engine = SchemaEngine::new();
        let endpoint = endpoint("/users/{id}");

        let inferred = engine.infer(
            &endpoint,
            BodyRole::Response(StatusCode::OK),
            [r#"{"id": 1, "name": "Ada"}"#, r#"{"id": 2}"#],
        );

        let schema = inferred.schema.expect("a schema");
        let SchemaNode::Object(object) = &schema else {
            panic!("expected object, got {schema:?}");
        };
        let required = object.required.as_ref().expect("required set");
        assert!(required.contains("id"));
        assert!(!required.contains("name"));
        assert_eq!(inferred.schema_name.as_deref(), Some("UserResponse"));
        assert_eq!(inferred.skipped, 0);
    }

    #[test]
    fn should_drop_unparseable_bodies() {
        let mut engine = SchemaEngine::new();
        let endpoint = endpoint("/users/{id}");

        let broken = engine.infer(
            &endpoint,
            BodyRole::Response(StatusCode::OK),
            ["{bad json", r#"{"a": 1}"#],
        );
        let clean = engine.infer(
            &endpoint,
            BodyRole::Response(StatusCode::OK),
            [r#"{"a": 1}"#],
        );

        assert_eq!(broken.skipped, 1);
        assert_eq!(clean.skipped, 0);
        // Dropping the bad body leaves the schema identical to the clean run.
        assert_eq!(broken.schema, clean.schema);
    }

    #[test]
    fn should_yield_absent_schema_when_nothing_parses() {
        let mut engine = SchemaEngine::new();
        let endpoint = endpoint("/users/{id}");

        let inferred = engine.infer(
            &endpoint,
            BodyRole::Request,
            ["not json", "also not json"],
        );

        assert!(inferred.schema.is_none());
        assert!(inferred.schema_name.is_none());
        assert_eq!(inferred.skipped, 2);
        assert!(engine.registry().is_empty());
    }

    #[test]
    fn should_yield_absent_schema_for_no_bodies() {
        let mut engine = SchemaEngine::new();
        let endpoint = endpoint("/users/{id}");

        let inferred = engine.infer(&endpoint, BodyRole::Request, Vec::<String>::new());

        assert!(inferred.schema.is_none());
        assert_eq!(inferred.skipped, 0);
    }

    #[test]
    fn should_share_identical_schemas_across_endpoints() {
        let mut engine = SchemaEngine::new();
        let users = endpoint("/users/{id}");
        let admins = endpoint("/admins/{id}");

        let body = r#"{"id": 1, "name": "Ada"}"#;
        let first = engine.infer(&users, BodyRole::Response(StatusCode::OK), [body]);
        let second = engine.infer(&admins, BodyRole::Response(StatusCode::OK), [body]);

        assert_eq!(first.schema_name.as_deref(), Some("UserResponse"));
        assert_eq!(second.schema_name.as_deref(), Some("UserResponse"));
        assert_eq!(engine.registry().len(), 1);
    }

    #[test]
    fn should_suffix_conflicting_names() {
        let mut engine = SchemaEngine::new();
        let endpoint = endpoint("/users/{id}");

        let first = engine.infer(
            &endpoint,
            BodyRole::Response(StatusCode::OK),
            [r#"{"id": 1}"#],
        );
        // Same hint, structurally different body.
        let second = engine.infer(
            &endpoint,
            BodyRole::Response(StatusCode::OK),
            [r#"{"name": "Ada"}"#],
        );

        assert_eq!(first.schema_name.as_deref(), Some("UserResponse"));
        assert_eq!(second.schema_name.as_deref(), Some("UserResponse2"));
        assert_eq!(engine.registry().len(), 2);
    }

    #[test]
    fn should_not_hoist_scalar_roots() {
        let mut engine = SchemaEngine::new();
        let endpoint = endpoint("/users/{id}/count");

        let inferred = engine.infer(&endpoint, BodyRole::Response(StatusCode::OK), ["42"]);

        assert!(matches!(inferred.schema, Some(SchemaNode::Integer(_))));
        assert!(inferred.schema_name.is_none());
        assert!(engine.registry().is_empty());
    }

    #[test]
    fn should_derive_name_hints() {
        assert_eq!(
            schema_name_hint("/api/v1/users/{id}", BodyRole::Request),
            "UserRequest"
        );
        assert_eq!(
            schema_name_hint("/users/{id}", BodyRole::Response(StatusCode::OK)),
            "UserResponse"
        );
        assert_eq!(
            schema_name_hint("/users/{id}", BodyRole::Response(StatusCode::NOT_FOUND)),
            "UserResponse404"
        );
        assert_eq!(
            schema_name_hint("/", BodyRole::Request),
            "BodyRequest"
        );
        assert_eq!(
            schema_name_hint("/orders/{id}/items", BodyRole::Response(StatusCode::OK)),
            "ItemResponse"
        );
    }

    #[test]
    fn should_register_and_look_up() {
        let mut registry = SchemaRegistry::default();
        let node = SchemaNode::Boolean;

        let name = registry.register("Flag", &node);

        assert_eq!(name, "Flag");
        assert_eq!(registry.get("Flag"), Some(&SchemaNode::Boolean));
        assert_eq!(registry.len(), 1);
    }
}
