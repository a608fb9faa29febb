use http::StatusCode;
use indexmap::IndexMap;

use crate::error::AnalysisError;
use crate::normalizer::endpoint::Endpoint;
use crate::normalizer::{NormalizedApi, RecordFailure, normalize_endpoints};
use crate::record::ExchangeRecord;
use crate::schema::{BodyRole, InferredSchema, SchemaEngine, SchemaRegistry};

/// The full normalized API model for one batch of records.
#[derive(Debug)]
pub struct ApiModel<'a> {
    /// One entry per canonical endpoint, in first-seen order.
    pub endpoints: Vec<EndpointModel<'a>>,
    /// Named schemas hoisted during inference.
    pub schemas: SchemaRegistry,
    /// Records skipped during normalization.
    pub failures: Vec<RecordFailure>,
}

/// One endpoint with its inferred body schemas.
#[derive(Debug)]
pub struct EndpointModel<'a> {
    /// The normalized endpoint.
    pub endpoint: Endpoint<'a>,
    /// Request body schema, merged across all member records.
    pub request: InferredSchema,
    /// Response body schema per observed status code.
    pub responses: IndexMap<StatusCode, InferredSchema>,
}

/// Runs the whole analysis: endpoint normalization, then schema inference
/// per endpoint and body role.
///
/// Schema inference per endpoint has no data dependency on other endpoints;
/// only the shared hoisting registry crosses that boundary, and it is owned
/// by this call.
///
/// # Examples
///
/// ```rust
/// use http::{Method, StatusCode};
/// use tracespec_core::{ExchangeRecord, analyze};
///
/// # fn main() -> Result<(), tracespec_core::AnalysisError> {
/// let records = vec![
///     ExchangeRecord::builder(Method::GET, "https://api.example.com/users/123")
///         .with_status(StatusCode::OK)
///         .with_response_body(r#"{"id": 123, "name": "Ada"}"#)
///         .build(),
/// ];
///
/// let model = analyze(&records)?;
/// let endpoint_model = model.endpoints.first().expect("an endpoint");
/// assert_eq!(endpoint_model.endpoint.path_template, "/users/{id}");
/// assert!(endpoint_model.responses.contains_key(&StatusCode::OK));
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`AnalysisError::UnreliableBatch`] when more than half of the
/// records fail to normalize.
pub fn analyze(records: &[ExchangeRecord]) -> Result<ApiModel<'_>, AnalysisError> {
    let NormalizedApi {
        endpoints,
        failures,
    } = normalize_endpoints(records)?;

    let mut engine = SchemaEngine::new();
    let mut models = Vec::with_capacity(endpoints.len());
    for (_, endpoint) in endpoints {
        let request_bodies: Vec<_> = endpoint
            .records
            .iter()
            .filter_map(|record| record.request_body.as_ref())
            .map(|body| String::from_utf8_lossy(body))
            .collect();
        let request = engine.infer(&endpoint, BodyRole::Request, &request_bodies);

        let mut responses = IndexMap::with_capacity(endpoint.status_codes.len());
        for status in &endpoint.status_codes {
            let bodies: Vec<_> = endpoint
                .records
                .iter()
                .filter(|record| record.status == *status)
                .filter_map(|record| record.response_body.as_ref())
                .map(|body| String::from_utf8_lossy(body))
                .collect();
            let inferred = engine.infer(&endpoint, BodyRole::Response(*status), &bodies);
            responses.insert(*status, inferred);
        }

        models.push(EndpointModel {
            endpoint,
            request,
            responses,
        });
    }

    Ok(ApiModel {
        endpoints: models,
        schemas: engine.into_registry(),
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::node::SchemaNode;
    use http::Method;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    #[test]
    fn should_analyze_a_small_capture() {
        init_tracing();
        let records = vec![
            ExchangeRecord::builder(Method::GET, "https://api.example.com/users/123")
                .with_status(StatusCode::OK)
                .with_response_body(r#"{"id": 123, "name": "Ada", "active": true}"#)
                .build(),
            ExchangeRecord::builder(Method::GET, "https://api.example.com/users/456")
                .with_status(StatusCode::OK)
                .with_response_body(r#"{"id": 456, "name": "Grace"}"#)
                .build(),
            ExchangeRecord::builder(Method::GET, "https://api.example.com/users/999")
                .with_status(StatusCode::NOT_FOUND)
                .with_response_body(r#"{"error": "not found"}"#)
                .build(),
            ExchangeRecord::builder(Method::POST, "https://api.example.com/users")
                .with_request_header("Content-Type", "application/json")
                .with_request_body(r#"{"name": "Hedy"}"#)
                .with_status(StatusCode::CREATED)
                .with_response_body(r#"{"id": 789, "name": "Hedy"}"#)
                .build(),
        ];

        let model = analyze(&records).expect("analysis");

        assert_eq!(model.endpoints.len(), 2);
        assert!(model.failures.is_empty());

        let get_users = model
            .endpoints
            .iter()
            .find(|entry| entry.endpoint.method == Method::GET)
            .expect("GET endpoint");
        assert_eq!(get_users.endpoint.path_template, "/users/{id}");
        assert_eq!(get_users.responses.len(), 2);

        let ok_schema = get_users
            .responses
            .get(&StatusCode::OK)
            .and_then(|inferred| inferred.schema.as_ref())
            .expect("200 schema");
        let SchemaNode::Object(object) = ok_schema else {
            panic!("expected object, got {ok_schema:?}");
        };
        let required = object.required.as_ref().expect("required set");
        assert!(required.contains("id"));
        assert!(required.contains("name"));
        assert!(!required.contains("active"));

        let post_users = model
            .endpoints
            .iter()
            .find(|entry| entry.endpoint.method == Method::POST)
            .expect("POST endpoint");
        assert_eq!(post_users.endpoint.path_template, "/users");
        assert!(post_users.request.schema.is_some());
        assert_eq!(
            post_users.request.schema_name.as_deref(),
            Some("UserRequest")
        );
        assert_eq!(post_users.endpoint.content_type(), mime::APPLICATION_JSON);
    }

    #[test]
    fn should_leave_request_schema_absent_for_bodyless_endpoints() {
        let records = vec![
            ExchangeRecord::builder(Method::GET, "https://api.example.com/health").build(),
        ];

        let model = analyze(&records).expect("analysis");

        let endpoint_model = model.endpoints.first().expect("an endpoint");
        assert!(endpoint_model.request.schema.is_none());
        assert_eq!(endpoint_model.request.skipped, 0);
    }

    #[test]
    fn should_propagate_unreliable_batch() {
        let records = vec![
            ExchangeRecord::builder(Method::GET, "junk one").build(),
            ExchangeRecord::builder(Method::GET, "junk two").build(),
            ExchangeRecord::builder(Method::GET, "https://api.example.com/users/1").build(),
        ];

        let result = analyze(&records);

        assert!(matches!(
            result,
            Err(AnalysisError::UnreliableBatch { failed: 2, total: 3 })
        ));
    }

    #[test]
    fn should_hoist_shared_response_schemas_once() {
        let body = r#"{"id": 1, "name": "Ada"}"#;
        let records = vec![
            ExchangeRecord::builder(Method::GET, "https://api.example.com/users/1")
                .with_response_body(body)
                .build(),
            ExchangeRecord::builder(Method::GET, "https://api.example.com/members/2")
                .with_response_body(body)
                .build(),
        ];

        let model = analyze(&records).expect("analysis");

        assert_eq!(model.endpoints.len(), 2);
        assert_eq!(model.schemas.len(), 1);
        let names: Vec<_> = model
            .endpoints
            .iter()
            .filter_map(|entry| {
                entry
                    .responses
                    .get(&StatusCode::OK)
                    .and_then(|inferred| inferred.schema_name.as_deref())
            })
            .collect();
        assert_eq!(names, vec!["UserResponse", "UserResponse"]);
    }
}
