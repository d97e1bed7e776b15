//! Structured logging for the pedestrian-count explorer
//!
//! Installs a `tracing` subscriber and provides helpers for the two events
//! worth reporting: record-source failures, classified by `FailureKind`, and
//! per-call aggregation summaries.

use std::fmt;

use tracing::{debug, error, info, warn};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

use crate::aggregate::AggregationReport;
use crate::config::LoggingConfig;
use crate::model::SourceError;

// ---------------------------------------------------------------------------
// Subscriber setup
// ---------------------------------------------------------------------------

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let result = if config.timestamps {
        builder.with_timer(UtcTime::rfc_3339()).try_init()
    } else {
        builder.without_time().try_init()
    };

    if result.is_ok() {
        debug!(level = %config.level, "logging initialised");
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

/// How worrying a record-source failure is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The backend answered but has nothing loaded for this request; the
    /// chart stays empty and nobody needs to be told.
    BackendEmpty,
    /// The backend is unreachable or answered with something unusable.
    BackendFault,
    /// A transport error that fits neither case.
    Unclassified,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureKind::BackendEmpty => "backend-empty",
            FailureKind::BackendFault => "backend-fault",
            FailureKind::Unclassified => "unclassified",
        })
    }
}

/// Classify a record-source failure.
pub fn classify_source_failure(err: &SourceError) -> FailureKind {
    match err {
        SourceError::NoDataAvailable(_) | SourceError::HttpError(404) => FailureKind::BackendEmpty,
        SourceError::HttpError(_) | SourceError::ParseError(_) => FailureKind::BackendFault,
        SourceError::Transport(e) if e.is_timeout() || e.is_connect() => FailureKind::BackendFault,
        SourceError::Transport(_) => FailureKind::Unclassified,
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a record-source failure with automatic classification.
pub fn log_source_failure(location: &str, operation: &str, err: &SourceError) {
    let kind = classify_source_failure(err);

    match kind {
        FailureKind::BackendEmpty => debug!(location, operation, failure = %kind, "{}", err),
        FailureKind::BackendFault => error!(location, operation, failure = %kind, "{}", err),
        FailureKind::Unclassified => warn!(location, operation, failure = %kind, "{}", err),
    }
}

// ---------------------------------------------------------------------------
// Aggregation Summary Logging
// ---------------------------------------------------------------------------

/// Log the outcome of one aggregation call.
///
/// Nothing skipped logs at debug, some records skipped at warn, every record
/// skipped at error.
pub fn log_aggregation_summary(report: &AggregationReport) {
    let AggregationReport { total, kept, filtered_out, skipped_malformed } = *report;

    if skipped_malformed == 0 {
        debug!(total, kept, filtered_out, "aggregation complete");
    } else if skipped_malformed == total {
        error!(total, skipped_malformed, "aggregation skipped every record as malformed");
    } else {
        warn!(total, kept, filtered_out, skipped_malformed, "aggregation skipped malformed records");
    }
}

/// Log the size of a fetched batch.
pub fn log_fetch_summary(location: &str, records: usize, discarded: usize) {
    if discarded == 0 {
        info!(location, records, "records fetched");
    } else {
        warn!(location, records, discarded, "records fetched, some rows could not be decoded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_classification() {
        assert_eq!(classify_source_failure(&SourceError::HttpError(500)), FailureKind::BackendFault);
        assert_eq!(classify_source_failure(&SourceError::HttpError(404)), FailureKind::BackendEmpty);
        assert_eq!(
            classify_source_failure(&SourceError::ParseError("expected value".into())),
            FailureKind::BackendFault
        );
        assert_eq!(
            classify_source_failure(&SourceError::NoDataAvailable("no rows loaded".into())),
            FailureKind::BackendEmpty
        );
    }

    #[test]
    fn test_init_logging_twice_does_not_panic() {
        let config = LoggingConfig::default();
        init_logging(&config);
        init_logging(&config);
    }

    #[test]
    fn test_failure_kind_display() {
        assert_eq!(FailureKind::Unclassified.to_string(), "unclassified");
        assert_eq!(FailureKind::BackendEmpty.to_string(), "backend-empty");
    }
}
