use thiserror::Error;

/// Top-level error type for the `sdnboard-api` crate.
///
/// Covers every failure mode across the three HTTP surfaces this crate
/// talks to: the Flask backend, the emulation agent, and the Ryu
/// controller. `sdnboard-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Non-success status without a recognizable error payload.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // ── Backend ─────────────────────────────────────────────────────
    /// Domain error reported by the backend as `{"error": "..."}`.
    ///
    /// The message is kept verbatim so it can be shown to the operator.
    #[error("{message}")]
    Backend { status: u16, message: String },

    // ── Agent ───────────────────────────────────────────────────────
    /// The emulation agent answered with `success: false`.
    #[error("{message}")]
    Agent { message: String },

    // ── Streaming ───────────────────────────────────────────────────
    /// The ping event stream broke before a terminal line arrived.
    #[error("Event stream interrupted: {0}")]
    Stream(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying on the
    /// next polling tick.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::Stream(_) => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Http { status: 404, .. } | Self::Backend { status: 404, .. } => true,
            _ => false,
        }
    }

    /// The operator-facing message reported by the remote side, if any.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::Backend { message, .. } | Self::Agent { message } => Some(message),
            _ => None,
        }
    }

    /// HTTP status attached to the error, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Http { status, .. } | Self::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_displays_verbatim() {
        let err = Error::Backend {
            status: 400,
            message: "El enlace ya existe".into(),
        };
        assert_eq!(err.to_string(), "El enlace ya existe");
        assert_eq!(err.remote_message(), Some("El enlace ya existe"));
    }

    #[test]
    fn server_errors_are_transient() {
        let err = Error::Http {
            status: 503,
            message: "unavailable".into(),
        };
        assert!(err.is_transient());
        assert!(!err.is_not_found());
    }

    #[test]
    fn backend_404_is_not_found() {
        let err = Error::Backend {
            status: 404,
            message: "Rule not found".into(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));
    }
}
