//! # Tracespec Core
//!
//! Turn a batch of captured HTTP request/response records into a normalized
//! API model: canonical endpoint templates with typed parameters, and merged
//! structural schemas describing request and response bodies.
//!
//! The crate is a pure, single-threaded batch computation over records the
//! caller has already materialized — no I/O, no async, no document
//! rendering. It is the analysis core behind traffic-to-specification
//! tooling: a capturing proxy (or any other source) supplies
//! [`ExchangeRecord`]s, and the document-assembly layer downstream consumes
//! the resulting [`Endpoint`]s and [`SchemaNode`] trees.
//!
//! ## Quick Start
//!
//! ```rust
//! use http::{Method, StatusCode};
//! use tracespec_core::{ExchangeRecord, analyze};
//!
//! # fn main() -> Result<(), tracespec_core::AnalysisError> {
//! let records = vec![
//!     ExchangeRecord::builder(Method::GET, "https://api.example.com/users/123")
//!         .with_status(StatusCode::OK)
//!         .with_response_body(r#"{"id": 123, "name": "Ada"}"#)
//!         .build(),
//!     ExchangeRecord::builder(Method::GET, "https://api.example.com/users/456")
//!         .with_status(StatusCode::OK)
//!         .with_response_body(r#"{"id": 456, "name": "Grace", "admin": true}"#)
//!         .build(),
//! ];
//!
//! let model = analyze(&records)?;
//!
//! let users = model.endpoints.first().expect("an endpoint");
//! assert_eq!(users.endpoint.path_template, "/users/{id}");
//! // `admin` appeared in only one of the two samples, so it is optional.
//! # Ok(())
//! # }
//! ```
//!
//! ## The two subsystems
//!
//! - [`normalize_endpoints`] groups records into logical endpoints by
//!   recognizing which path segments are dynamic identifiers (numeric ids,
//!   UUIDs, object-id and digest shapes) versus static resource names, and
//!   merges query/header parameter observations per endpoint.
//! - [`SchemaEngine`] (over [`merge_values`]) takes the JSON bodies observed
//!   for an endpoint and body role and produces a single unified
//!   [`SchemaNode`] consistent with every example: property unions, required
//!   fields by intersection, string formats and enums, numeric bounds, and
//!   unions for heterogeneous shapes.
//!
//! [`analyze`] chains the two; both can also be driven separately.
//!
//! ## Failure model
//!
//! Per-record problems (malformed URL, unparseable JSON body) never abort a
//! batch: the offending record or body is skipped and counted, and the
//! counts come back with the result. Only a batch where more than half the
//! records fail is rejected outright, as
//! [`AnalysisError::UnreliableBatch`].
//!
//! ## OpenAPI
//!
//! The output trees are serialization-neutral. The [`openapi`] module
//! adapts them to `utoipa` schema and parameter objects for downstream
//! document assembly.

mod analyze;
mod error;
mod normalizer;
pub mod openapi;
mod record;
mod schema;

pub use self::analyze::{ApiModel, EndpointModel, analyze};
pub use self::error::{AnalysisError, RecordError};
pub use self::normalizer::endpoint::{Endpoint, EndpointKey};
pub use self::normalizer::parameters::{ParamLocation, ParamType, ParameterDescriptor};
pub use self::normalizer::{NormalizedApi, RecordFailure, normalize_endpoints};
pub use self::record::{ExchangeRecord, ExchangeRecordBuilder};
pub use self::schema::merge::merge_values;
pub use self::schema::node::{
    ArraySchema, IntegerSchema, NumberSchema, ObjectSchema, SchemaNode, StringFormat, StringSchema,
    UnionSchema,
};
pub use self::schema::{BodyRole, InferredSchema, SchemaEngine, SchemaRegistry};
