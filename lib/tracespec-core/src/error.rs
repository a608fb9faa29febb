/// Batch-level analysis failures.
///
/// Per-record problems never surface here: they are collected as
/// [`RecordFailure`](crate::RecordFailure)s alongside successful results.
/// A batch-level error means the aggregate result would be statistically
/// meaningless and no partial output is returned.
#[derive(Debug, derive_more::Error, derive_more::Display)]
pub enum AnalysisError {
    /// More than half of the input records failed to normalize.
    #[display("normalization aborted: {failed} of {total} records failed to normalize")]
    UnreliableBatch {
        /// Number of records that could not be normalized.
        failed: usize,
        /// Total number of records in the batch.
        total: usize,
    },
}

/// Reason a single record was skipped during normalization.
///
/// Always recoverable: the record is dropped and counted, the batch
/// continues.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum RecordError {
    /// The captured URL failed to parse.
    Url(url::ParseError),

    /// The URL parsed but carries no host, so no base URL can be derived.
    #[display("URL has no host: {url}")]
    #[from(skip)]
    MissingHost {
        /// The offending URL.
        url: String,
    },
}
