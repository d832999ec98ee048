// ── Core error types ──
//
// User-facing errors from sdnboard-core. Consumers never see raw HTTP
// details; the `From<sdnboard_api::Error>` impl translates transport-layer
// errors into domain-appropriate variants while keeping backend messages
// verbatim.

use thiserror::Error;

/// Message shown when no backend-provided text is available.
pub const GENERIC_FAILURE: &str = "connection error";

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Dashboard is not connected")]
    ControllerDisconnected,

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Operation errors ─────────────────────────────────────────────
    /// The backend or agent refused the operation. `message` is their text.
    #[error("{message}")]
    Rejected { message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Text for a notification: the remote side's own message when there is
    /// one, otherwise a generic connection error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message } | Self::ValidationFailed { message } => message.clone(),
            Self::NotFound { .. } => self.to_string(),
            _ => GENERIC_FAILURE.to_owned(),
        }
    }

    /// Whether retrying on the next polling tick could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::Timeout { .. } | Self::ControllerDisconnected
        ) || matches!(self, Self::Api { status: Some(s), .. } if *s >= 500)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<sdnboard_api::Error> for CoreError {
    fn from(err: sdnboard_api::Error) -> Self {
        match err {
            sdnboard_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            sdnboard_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            sdnboard_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            sdnboard_api::Error::Http { status: 404, message } => CoreError::NotFound {
                entity_type: "Resource".into(),
                identifier: message,
            },
            sdnboard_api::Error::Http { status, message } => CoreError::Api {
                message: format!("HTTP {status}: {message}"),
                status: Some(status),
            },
            sdnboard_api::Error::Backend { message, .. } | sdnboard_api::Error::Agent { message } => {
                CoreError::Rejected { message }
            }
            sdnboard_api::Error::Stream(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason,
            },
            sdnboard_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Unexpected response shape: {message}"))
            }
        }
    }
}
