use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use tracing::warn;

/// One captured HTTP request/response pair, supplied by the calling environment.
///
/// Records are immutable: the analysis only reads them. The URL is kept as the
/// raw captured string because malformed URLs must surface as per-record
/// failures during normalization rather than at construction time.
///
/// # Examples
///
/// ```rust
/// use http::{Method, StatusCode};
/// use tracespec_core::ExchangeRecord;
///
/// let record = ExchangeRecord::builder(Method::GET, "https://api.example.com/users/42")
///     .with_status(StatusCode::OK)
///     .with_response_body(r#"{"id": 42, "name": "Ada"}"#)
///     .build();
///
/// assert_eq!(record.status, StatusCode::OK);
/// ```
#[derive(Debug, Clone)]
pub struct ExchangeRecord {
    /// HTTP request method.
    pub method: Method,
    /// Full request URL as captured, possibly malformed.
    pub url: String,
    /// Request headers (ordered, case-insensitive multimap).
    pub request_headers: HeaderMap,
    /// Raw request body, if the request carried one.
    pub request_body: Option<Bytes>,
    /// Response status code.
    pub status: StatusCode,
    /// Response headers.
    pub response_headers: HeaderMap,
    /// Raw response body, if the response carried one.
    pub response_body: Option<Bytes>,
}

impl ExchangeRecord {
    /// Starts building a record for the given method and URL.
    pub fn builder(method: Method, url: impl Into<String>) -> ExchangeRecordBuilder {
        ExchangeRecordBuilder {
            method,
            url: url.into(),
            request_headers: HeaderMap::new(),
            request_body: None,
            status: StatusCode::OK,
            response_headers: HeaderMap::new(),
            response_body: None,
        }
    }
}

/// Builder for [`ExchangeRecord`].
///
/// Invalid header names or values are ignored with a warning instead of
/// failing the build: a capture layer may hand over arbitrary bytes, and one
/// bad header must not lose the whole record.
#[derive(Debug, Clone)]
pub struct ExchangeRecordBuilder {
    method: Method,
    url: String,
    request_headers: HeaderMap,
    request_body: Option<Bytes>,
    status: StatusCode,
    response_headers: HeaderMap,
    response_body: Option<Bytes>,
}

impl ExchangeRecordBuilder {
    /// Sets the response status code (defaults to `200 OK`).
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Appends a request header.
    #[must_use]
    pub fn with_request_header(mut self, name: &str, value: &str) -> Self {
        append_header(&mut self.request_headers, name, value);
        self
    }

    /// Appends a response header.
    #[must_use]
    pub fn with_response_header(mut self, name: &str, value: &str) -> Self {
        append_header(&mut self.response_headers, name, value);
        self
    }

    /// Sets the raw request body.
    #[must_use]
    pub fn with_request_body(mut self, body: impl Into<Bytes>) -> Self {
        self.request_body = Some(body.into());
        self
    }

    /// Sets the raw response body.
    #[must_use]
    pub fn with_response_body(mut self, body: impl Into<Bytes>) -> Self {
        self.response_body = Some(body.into());
        self
    }

    /// Finishes the record.
    pub fn build(self) -> ExchangeRecord {
        let Self {
            method,
            url,
            request_headers,
            request_body,
            status,
            response_headers,
            response_body,
        } = self;
        ExchangeRecord {
            method,
            url,
            request_headers,
            request_body,
            status,
            response_headers,
            response_body,
        }
    }
}

fn append_header(headers: &mut HeaderMap, name: &str, value: &str) {
    match (
        name.parse::<HeaderName>(),
        value.parse::<HeaderValue>(),
    ) {
        (Ok(header_name), Ok(header_value)) => {
            headers.append(header_name, header_value);
        }
        _ => {
            warn!(name, value, "ignoring invalid header");
        }
    }
}
