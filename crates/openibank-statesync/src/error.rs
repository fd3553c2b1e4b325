//! Error taxonomy for the state-sync engine.
//!
//! All errors are explicit: every public async operation returns a
//! structured result rather than raising, so the variants here exist to be
//! matched on by callers deciding retry/backoff policy, not merely
//! displayed.

use thiserror::Error;

/// Result type for state-sync operations.
pub type StateSyncResult<T> = std::result::Result<T, StateSyncError>;

/// Closed set of error kinds a transport or codec operation can produce.
///
/// Classification (§4.1): an error's `ErrorKind` determines whether it
/// trips the per-gateway circuit breaker — see [`ErrorKind::trips_breaker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The pointer has never been published, or the content isn't on this
    /// gateway. HTTP 404, or a 500 whose body matches the naming service's
    /// "routing: not found" convention.
    NotFound,
    /// Connection refused, DNS failure, or similar low-level transport
    /// failure.
    NetworkError,
    /// The request was cancelled by its own timeout.
    Timeout,
    /// HTTP status >= 400 that isn't classified as `NotFound`.
    GatewayError,
    /// The response body could not be parsed as expected.
    InvalidResponse,
    /// An uploaded/fetched CID didn't match what was expected.
    CidMismatch,
    /// A publish would have decreased the pointer's sequence number.
    SequenceDowngrade,
    /// Caller supplied malformed input (internal use only).
    InvalidInput,
}

impl ErrorKind {
    /// Whether an error of this kind should count against a gateway's
    /// circuit breaker.
    ///
    /// `NotFound` and `SequenceDowngrade` never trip the breaker: an
    /// expected 404 on a brand-new wallet must not take every gateway out
    /// of rotation, and a downgrade is a logic error, not a gateway fault.
    pub fn trips_breaker(self) -> bool {
        !matches!(self, ErrorKind::NotFound | ErrorKind::SequenceDowngrade)
    }
}

/// Error raised by any state-sync component.
#[derive(Debug, Error)]
pub enum StateSyncError {
    /// Classified transport/gateway failure.
    #[error("{kind:?} from gateway {gateway:?}: {message}")]
    Transport {
        /// Classified kind.
        kind: ErrorKind,
        /// Human-readable detail.
        message: String,
        /// Gateway base URL, if the failure is attributable to one.
        gateway: Option<String>,
        /// Underlying error, if any.
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No gateway in the configured set accepted an upload.
    #[error("upload failed on all {attempted} gateway(s)")]
    UploadFailed {
        /// Number of gateways attempted.
        attempted: usize,
    },

    /// No gateway accepted a publish.
    #[error("publish failed on all {attempted} gateway(s)")]
    PublishFailed {
        /// Number of gateways attempted.
        attempted: usize,
    },

    /// The IPNS pointer has never been published for this identity.
    #[error("IPNS record not found for {name}")]
    PointerNotFound {
        /// The peer identifier that was resolved.
        name: String,
    },

    /// `RecordCodec` failed to produce or parse a signed record.
    #[error("record codec error: {0}")]
    Codec(String),

    /// `StatePersistence` failed to load or save chain state.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Identity has not been set on the provider.
    #[error("identity not set; call set_identity() before initialize()")]
    IdentityNotSet,

    /// Operation attempted while the provider was not connected.
    #[error("provider is not connected (state: {0})")]
    NotConnected(String),

    /// Caller-supplied input was invalid.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl StateSyncError {
    /// The classified [`ErrorKind`] for this error, used to decide circuit
    /// breaker and retry behavior.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StateSyncError::Transport { kind, .. } => *kind,
            StateSyncError::UploadFailed { .. } | StateSyncError::PublishFailed { .. } => {
                ErrorKind::NetworkError
            }
            StateSyncError::PointerNotFound { .. } => ErrorKind::NotFound,
            StateSyncError::Codec(_) => ErrorKind::InvalidResponse,
            StateSyncError::Persistence(_) => ErrorKind::InvalidInput,
            StateSyncError::IdentityNotSet
            | StateSyncError::NotConnected(_)
            | StateSyncError::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }

    pub(crate) fn transport(kind: ErrorKind, message: impl Into<String>, gateway: Option<&str>) -> Self {
        StateSyncError::Transport {
            kind,
            message: message.into(),
            gateway: gateway.map(|g| g.to_string()),
            cause: None,
        }
    }
}

/// Classify an HTTP status code and optional response body into an
/// [`ErrorKind`] per spec §4.1.
///
/// - `404` is always `NotFound`.
/// - `500` whose body matches `routing:\s*not\s*found` (case-insensitive)
///   is `NotFound` — a naming-service-specific convention for "pointer
///   never published".
/// - Any other status `>= 400` is `GatewayError`.
/// - Anything below 400 is not an error; callers should not invoke this
///   for success statuses.
pub fn classify_http_status(status: u16, body: Option<&str>) -> ErrorKind {
    if status == 404 {
        return ErrorKind::NotFound;
    }
    if status == 500 {
        if let Some(body) = body {
            if routing_not_found(body) {
                return ErrorKind::NotFound;
            }
        }
    }
    if status >= 400 {
        return ErrorKind::GatewayError;
    }
    ErrorKind::InvalidResponse
}

/// Case-insensitive, dependency-free match for the naming service's
/// "routing: not found" convention body (avoids pulling in `regex` for a
/// single fixed pattern with optional whitespace around the colon).
fn routing_not_found(body: &str) -> bool {
    let lower = body.to_ascii_lowercase();
    let Some(after_routing) = lower.find("routing") else {
        return false;
    };
    let rest = lower[after_routing + "routing".len()..].trim_start();
    let Some(rest) = rest.strip_prefix(':') else {
        return false;
    };
    rest.trim_start().starts_with("not found")
}

/// Classify a transport-level (pre-HTTP-response) failure.
///
/// `is_timeout` distinguishes a request cancelled by its own deadline from
/// a connection/DNS failure; both reqwest and tokio surface this
/// distinction on their error types.
pub fn classify_transport_error(is_timeout: bool) -> ErrorKind {
    if is_timeout {
        ErrorKind::Timeout
    } else {
        ErrorKind::NetworkError
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_404_as_not_found() {
        assert_eq!(classify_http_status(404, None), ErrorKind::NotFound);
    }

    #[test]
    fn classifies_500_routing_not_found_as_not_found() {
        assert_eq!(
            classify_http_status(500, Some(r#"{"Message":"routing: not found"}"#)),
            ErrorKind::NotFound
        );
        assert_eq!(
            classify_http_status(500, Some("ROUTING:  NOT FOUND")),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn classifies_plain_500_as_gateway_error() {
        assert_eq!(
            classify_http_status(500, Some("internal server error")),
            ErrorKind::GatewayError
        );
        assert_eq!(classify_http_status(500, None), ErrorKind::GatewayError);
    }

    #[test]
    fn classifies_other_4xx_5xx_as_gateway_error() {
        assert_eq!(classify_http_status(400, None), ErrorKind::GatewayError);
        assert_eq!(classify_http_status(503, None), ErrorKind::GatewayError);
    }

    #[test]
    fn classifies_transport_failures() {
        assert_eq!(classify_transport_error(true), ErrorKind::Timeout);
        assert_eq!(classify_transport_error(false), ErrorKind::NetworkError);
    }

    #[test]
    fn not_found_and_sequence_downgrade_never_trip_breaker() {
        assert!(!ErrorKind::NotFound.trips_breaker());
        assert!(!ErrorKind::SequenceDowngrade.trips_breaker());
    }

    #[test]
    fn everything_else_trips_breaker() {
        for kind in [
            ErrorKind::NetworkError,
            ErrorKind::Timeout,
            ErrorKind::GatewayError,
            ErrorKind::InvalidResponse,
            ErrorKind::CidMismatch,
            ErrorKind::InvalidInput,
        ] {
            assert!(kind.trips_breaker());
        }
    }
}
