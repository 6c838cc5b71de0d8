use thiserror::Error;

use crate::render::RenderError;
use crate::transport::TransportError;

/// Errors delivered to the caller of a sheet request.
///
/// Validation errors (`MalformedUrl` through `AlreadyLoaded`) are raised before
/// any network activity. Everything else happens after a request was dispatched
/// and marks the request identity as failed.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("unrecognized sheet URL: '{0}'")]
    MalformedUrl(String),

    #[error("no key/gid in the provided URL")]
    MissingKeyOrGid,

    #[error("no element targeted or callback provided")]
    NoOutput,

    #[error("a previous request for this resource failed")]
    PriorFailure,

    #[error("no more rows to load")]
    AlreadyLoaded,

    #[error("request failed: {0}")]
    TransportFailure(TransportError),

    #[error("unexpected API response format")]
    UnexpectedFormat,

    #[error("failed to parse response: {0}")]
    ParseFailure(String),
}

impl SheetError {
    /// True for errors raised before a request leaves the process.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SheetError::MalformedUrl(_)
                | SheetError::MissingKeyOrGid
                | SheetError::NoOutput
                | SheetError::PriorFailure
                | SheetError::AlreadyLoaded
        )
    }

    pub fn code(&self) -> &'static str {
        match self {
            SheetError::MalformedUrl(_) => "MALFORMED_URL",
            SheetError::MissingKeyOrGid => "MISSING_KEY_OR_GID",
            SheetError::NoOutput => "NO_OUTPUT",
            SheetError::PriorFailure => "PRIOR_FAILURE",
            SheetError::AlreadyLoaded => "ALREADY_LOADED",
            SheetError::TransportFailure(_) => "TRANSPORT_FAILURE",
            SheetError::UnexpectedFormat => "UNEXPECTED_FORMAT",
            SheetError::ParseFailure(_) => "PARSE_FAILURE",
        }
    }
}

impl From<TransportError> for SheetError {
    fn from(value: TransportError) -> Self {
        match value {
            TransportError::Decode(message) => SheetError::ParseFailure(message),
            other => SheetError::TransportFailure(other),
        }
    }
}

impl From<RenderError> for SheetError {
    fn from(value: RenderError) -> Self {
        SheetError::ParseFailure(value.to_string())
    }
}

impl From<serde_json::Error> for SheetError {
    fn from(value: serde_json::Error) -> Self {
        SheetError::ParseFailure(value.to_string())
    }
}
