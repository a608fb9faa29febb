//! Endpoint normalization: groups raw [`ExchangeRecord`]s into logical
//! endpoints by recognizing which path segments are dynamic identifiers,
//! and merges per-endpoint parameter observations.

use indexmap::IndexMap;
use percent_encoding::percent_decode_str;
use tracing::warn;
use url::Url;

use crate::error::{AnalysisError, RecordError};
use crate::record::ExchangeRecord;

pub(crate) mod classifier;
pub mod endpoint;
pub mod parameters;

use self::classifier::classify_segment;
use self::endpoint::{Endpoint, EndpointKey, ObservedPathParam};
use self::parameters::ParamType;

/// Result of normalizing a batch of records.
#[derive(Debug)]
pub struct NormalizedApi<'a> {
    /// Endpoints keyed by (method, template), in first-seen order.
    pub endpoints: IndexMap<EndpointKey, Endpoint<'a>>,
    /// Records that were skipped, with their reasons.
    pub failures: Vec<RecordFailure>,
}

/// One skipped record.
#[derive(Debug)]
pub struct RecordFailure {
    /// Index of the record in the input batch.
    pub index: usize,
    /// The record's URL as captured.
    pub url: String,
    /// Why the record was skipped.
    pub error: RecordError,
}

/// Groups a batch of records into canonical endpoints.
///
/// Processing one record never aborts the batch: per-record errors are
/// collected into [`NormalizedApi::failures`] and the record is skipped. If
/// more than half of the batch fails, the whole normalization fails with
/// [`AnalysisError::UnreliableBatch`] — the data is too unreliable to trust
/// partial results. An empty batch yields an empty, successful result.
///
/// # Examples
///
/// ```rust
/// use http::Method;
/// use tracespec_core::{ExchangeRecord, normalize_endpoints};
///
/// # fn main() -> Result<(), tracespec_core::AnalysisError> {
/// let records = vec![
///     ExchangeRecord::builder(Method::GET, "https://api.example.com/users/123").build(),
///     ExchangeRecord::builder(Method::GET, "https://api.example.com/users/456").build(),
/// ];
///
/// let normalized = normalize_endpoints(&records)?;
/// assert_eq!(normalized.endpoints.len(), 1);
/// let endpoint = normalized.endpoints.values().next().expect("an endpoint");
/// assert_eq!(endpoint.path_template, "/users/{id}");
/// assert_eq!(endpoint.records.len(), 2);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`AnalysisError::UnreliableBatch`] when more than half of the
/// records fail to normalize.
pub fn normalize_endpoints(
    records: &[ExchangeRecord],
) -> Result<NormalizedApi<'_>, AnalysisError> {
    let mut endpoints = IndexMap::new();
    let mut failures = Vec::new();

    for (index, record) in records.iter().enumerate() {
        if let Err(error) = merge_into_endpoints(&mut endpoints, record) {
            warn!(index, url = %record.url, %error, "skipping record");
            failures.push(RecordFailure {
                index,
                url: record.url.clone(),
                error,
            });
        }
    }

    if failures.len() * 2 > records.len() {
        return Err(AnalysisError::UnreliableBatch {
            failed: failures.len(),
            total: records.len(),
        });
    }

    Ok(NormalizedApi {
        endpoints,
        failures,
    })
}

fn merge_into_endpoints<'a>(
    endpoints: &mut IndexMap<EndpointKey, Endpoint<'a>>,
    record: &'a ExchangeRecord,
) -> Result<(), RecordError> {
    let url = Url::parse(&record.url)?;
    let host = url.host_str().ok_or_else(|| RecordError::MissingHost {
        url: record.url.clone(),
    })?;

    let base_url = match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    };

    let TemplatePath { path, params } = templatize(&url);

    let key = EndpointKey {
        method: record.method.clone(),
        path: path.clone(),
    };
    let endpoint = endpoints
        .entry(key)
        .or_insert_with(|| Endpoint::new(record.method.clone(), path, base_url));

    let query_pairs = url
        .query_pairs()
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect::<Vec<_>>();
    endpoint.merge_record(record, params, query_pairs.into_iter());
    Ok(())
}

struct TemplatePath {
    path: String,
    params: Vec<ObservedPathParam>,
}

/// Replaces dynamic segments with `{name}` placeholders.
///
/// A lone parameter keeps the default name `id`; when several segments in
/// one path are dynamic they are numbered positionally (`param1`, `param2`,
/// …) so placeholder names stay unique within the template.
fn templatize(url: &Url) -> TemplatePath {
    let segments: Vec<String> = url
        .path_segments()
        .map(|segments| {
            segments
                .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();

    let classified: Vec<Option<ParamType>> = segments
        .iter()
        .map(|segment| classify_segment(segment))
        .collect();
    let param_count = classified.iter().flatten().count();

    let mut parts = Vec::with_capacity(segments.len());
    let mut params = Vec::with_capacity(param_count);
    for (segment, classification) in segments.into_iter().zip(classified) {
        match classification {
            None => parts.push(segment),
            Some(param_type) => {
                let name = if param_count > 1 {
                    format!("param{}", params.len() + 1)
                } else {
                    "id".to_string()
                };
                parts.push(format!("{{{name}}}"));
                params.push(ObservedPathParam {
                    name,
                    param_type,
                    value: segment,
                });
            }
        }
    }

    TemplatePath {
        path: format!("/{}", parts.join("/")),
        params,
    }
}
