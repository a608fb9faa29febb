use http::{HeaderMap, Method, StatusCode};
use indexmap::map::Entry;
use indexmap::{IndexMap, IndexSet};
use mime::Mime;
use tracing::warn;

use super::parameters::{
    ParamLocation, ParamType, ParameterDescriptor, header_required, sanitize_header_value,
    tracked_header_name,
};
use crate::record::ExchangeRecord;

/// Identity of a logical API operation: HTTP method plus canonical path
/// template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
#[display("{method} {path}")]
pub struct EndpointKey {
    /// HTTP method.
    pub method: Method,
    /// Canonical path template with `{name}` placeholders.
    pub path: String,
}

/// A canonical (method, path-template) grouping of observed HTTP calls.
///
/// Created the first time a record normalizes to its key; every subsequent
/// matching record is merged in. The template never changes once created —
/// only the member list, parameter descriptors and status-code set grow.
#[derive(Debug)]
pub struct Endpoint<'a> {
    /// HTTP method.
    pub method: Method,
    /// Canonical path template with `{name}` placeholders.
    pub path_template: String,
    /// `scheme://host[:port]` shared by the member records.
    pub base_url: String,
    /// Response status codes observed across member records.
    pub status_codes: IndexSet<StatusCode>,
    /// Member records, in observation order.
    pub records: Vec<&'a ExchangeRecord>,
    /// Path parameters by placeholder name.
    pub path_params: IndexMap<String, ParameterDescriptor>,
    /// Query parameters by name.
    pub query_params: IndexMap<String, ParameterDescriptor>,
    /// Tracked request headers by canonical name.
    pub header_params: IndexMap<String, ParameterDescriptor>,
    content_type: Option<Mime>,
}

impl<'a> Endpoint<'a> {
    pub(crate) fn new(method: Method, path_template: String, base_url: String) -> Self {
        Self {
            method,
            path_template,
            base_url,
            status_codes: IndexSet::new(),
            records: Vec::new(),
            path_params: IndexMap::new(),
            query_params: IndexMap::new(),
            header_params: IndexMap::new(),
            content_type: None,
        }
    }

    /// Primary request content type, defaulting to `application/json` when
    /// no member record allowed a determination.
    pub fn content_type(&self) -> Mime {
        self.content_type
            .clone()
            .unwrap_or(mime::APPLICATION_JSON)
    }

    /// All parameter descriptors with their locations, path first.
    pub fn parameters(&self) -> impl Iterator<Item = (ParamLocation, &ParameterDescriptor)> {
        let path = self
            .path_params
            .values()
            .map(|descriptor| (ParamLocation::Path, descriptor));
        let query = self
            .query_params
            .values()
            .map(|descriptor| (ParamLocation::Query, descriptor));
        let header = self
            .header_params
            .values()
            .map(|descriptor| (ParamLocation::Header, descriptor));
        path.chain(query).chain(header)
    }

    /// Merges one record's observations into the endpoint.
    pub(super) fn merge_record(
        &mut self,
        record: &'a ExchangeRecord,
        path_params: Vec<ObservedPathParam>,
        query_pairs: impl Iterator<Item = (String, String)>,
    ) {
        self.records.push(record);
        self.status_codes.insert(record.status);

        for param in path_params {
            self.merge_path_param(param);
        }
        for (name, value) in query_pairs {
            self.merge_query_param(&name, &value);
        }
        self.merge_headers(&record.request_headers);

        if self.content_type.is_none() {
            self.content_type = determine_content_type(record);
        }
    }

    /// Path parameters are always required. The first observation fixes the
    /// type: a later record may classify the same position differently
    /// (integer id vs. hash id) without rewriting history.
    fn merge_path_param(&mut self, param: ObservedPathParam) {
        let ObservedPathParam {
            name,
            param_type,
            value,
        } = param;
        let descriptor = match self.path_params.entry(name) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let name = entry.key().clone();
                entry.insert(ParameterDescriptor::new(name, param_type, true))
            }
        };
        descriptor.observe(&value);
    }

    fn merge_query_param(&mut self, name: &str, value: &str) {
        let descriptor = match self.query_params.entry(name.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let inferred = ParamType::infer(value);
                entry.insert(ParameterDescriptor::new(name, inferred, false))
            }
        };
        descriptor.observe(value);
    }

    fn merge_headers(&mut self, headers: &HeaderMap) {
        for (name, value) in headers {
            let Some(canonical) = tracked_header_name(name.as_str()) else {
                continue;
            };
            let Ok(raw) = value.to_str() else {
                warn!(header = name.as_str(), "skipping non-ASCII header value");
                continue;
            };
            let sanitized = sanitize_header_value(raw);
            let descriptor = match self.header_params.entry(canonical) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let name = entry.key().clone();
                    let required = header_required(&name);
                    let inferred = ParamType::infer(&sanitized);
                    entry.insert(ParameterDescriptor::new(name, inferred, required))
                }
            };
            descriptor.observe(&sanitized);
        }
    }
}

/// One classified dynamic segment observed in a record's path.
#[derive(Debug)]
pub(super) struct ObservedPathParam {
    pub(super) name: String,
    pub(super) param_type: ParamType,
    pub(super) value: String,
}

/// Determines the record's request content type, if possible.
///
/// The `Content-Type` header wins (parameters such as charset stripped);
/// otherwise the body is sniffed: a `{` or `[` prefix means JSON, the
/// presence of both `=` and `&` means form-encoding. Anything else is
/// undetermined for this record.
fn determine_content_type(record: &ExchangeRecord) -> Option<Mime> {
    if let Some(value) = record.request_headers.get(http::header::CONTENT_TYPE)
        && let Ok(raw) = value.to_str()
        && let Ok(parsed) = raw.parse::<Mime>()
    {
        let essence = parsed.essence_str().parse::<Mime>();
        return Some(essence.unwrap_or(parsed));
    }

    let body = record.request_body.as_ref()?;
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Some(mime::APPLICATION_JSON);
    }
    if trimmed.contains('=') && trimmed.contains('&') {
        return Some(mime::APPLICATION_WWW_FORM_URLENCODED);
    }
    None
}
