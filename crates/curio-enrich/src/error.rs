use curio_core::FailureKind;
use thiserror::Error;

/// Item-scoped failures raised by the enrichment stages.
///
/// Each variant corresponds to one [`FailureKind`], so a failed item can be
/// recorded in the run history without losing the stage that broke.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// No usable text could be obtained for the bookmark.
    #[error("content unavailable: {0}")]
    ContentUnavailable(String),

    /// The keyword engine failed or returned nothing useful.
    #[error("keyword engine unavailable: {0}")]
    ExtractionUnavailable(String),

    /// The summary engine failed or returned a malformed response.
    #[error("summary engine unavailable: {0}")]
    SummarizationUnavailable(String),

    /// Writing enriched metadata back to the bookmark service failed.
    #[error("remote write failed: {0}")]
    RemoteWriteFailed(String),

    /// A request to any upstream service timed out.
    #[error("request timed out: {0}")]
    Timeout(String),
}

impl EnrichError {
    /// The [`FailureKind`] recorded in run history for this error.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            EnrichError::ContentUnavailable(_) => FailureKind::ContentUnavailable,
            EnrichError::ExtractionUnavailable(_) => FailureKind::ExtractionUnavailable,
            EnrichError::SummarizationUnavailable(_) => FailureKind::SummarizationUnavailable,
            EnrichError::RemoteWriteFailed(_) => FailureKind::RemoteWriteFailed,
            EnrichError::Timeout(_) => FailureKind::Timeout,
        }
    }
}
