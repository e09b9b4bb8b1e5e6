use serde::{Deserialize, Serialize};

/// Unified error type covering all failure modes in the catalog search core.
///
/// Every variant includes an actionable message guiding the consumer toward
/// resolution. Pure computation errors (`InvalidEntitlement`,
/// `UnsupportedContentType`) are recovered locally by callers where a safe
/// fallback exists; fetch errors carry their retry classification in
/// [`FetchError`].
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Upstream subsidy data is malformed (e.g. an offer without a catalog
    /// identifier). Rejected rather than silently dropped, since dropping a
    /// term would silently broaden the visible catalog.
    #[error(
        "Invalid entitlement state: {reason}. Fall back to the enterprise-wide filter and re-resolve subsidies."
    )]
    InvalidEntitlement {
        /// What was malformed.
        reason: String,
    },

    /// The facet widget reported a content-type refinement this core does not
    /// recognize. An integration defect, not a user error: surfaced to
    /// developers instead of being defaulted away.
    #[error(
        "Unsupported content type refinement {value:?}. The facet source may only report \"course\" or \"program\"."
    )]
    UnsupportedContentType {
        /// The refinement value as received.
        value: String,
    },

    /// A data fetch failed after the retry policy was exhausted (or
    /// immediately, for permanent errors).
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A configuration value is invalid.
    #[error("Invalid config: {field} = {value:?}: {reason}")]
    InvalidConfig {
        /// Which config field.
        field: String,
        /// The invalid value.
        value: String,
        /// Why it is invalid.
        reason: String,
    },
}

/// Convenience alias used throughout the crate.
pub type SearchResult<T> = Result<T, SearchError>;

/// A failed data fetch, classified by retry eligibility.
///
/// Network-level and server-side (5xx) failures are transient: the request
/// was well-formed and may succeed on a later attempt. Client-side (4xx,
/// including 429) and validation failures are permanent: retrying the same
/// request cannot change the outcome, so it would only waste request budget.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum FetchError {
    /// The request never reached the server (DNS, connect, reset).
    #[error("network error: {detail}")]
    Network {
        /// Transport-level detail.
        detail: String,
    },

    /// The request exceeded its deadline.
    #[error("request timed out after {elapsed_ms}ms")]
    Timeout {
        /// How long the request ran before the deadline fired.
        elapsed_ms: u64,
    },

    /// The server answered with a 5xx status.
    #[error("server error {status}: {message}")]
    Server {
        /// HTTP status code (500..=599).
        status: u16,
        /// Response body or status text.
        message: String,
    },

    /// The server answered with a 4xx status. Includes 429: a throttled
    /// request is treated as exhausted, not re-queued.
    #[error("client error {status}: {message}")]
    Client {
        /// HTTP status code (400..=499).
        status: u16,
        /// Response body or status text.
        message: String,
    },

    /// The response arrived but failed schema validation.
    #[error("response validation failed: {detail}")]
    Validation {
        /// What did not match the expected shape.
        detail: String,
    },
}

impl FetchError {
    /// Classify an HTTP status into the matching variant.
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        if (500..=599).contains(&status) {
            Self::Server {
                status,
                message: message.into(),
            }
        } else {
            Self::Client {
                status,
                message: message.into(),
            }
        }
    }

    /// Whether a later attempt of the same request may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Timeout { .. } | Self::Server { .. }
        )
    }

    /// Whether retrying is pointless (4xx/validation).
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        !self.is_transient()
    }
}
