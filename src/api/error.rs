use thiserror::Error;

/// Failures surfaced by the request pipeline.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The server answered with a non-success status or a non-zero envelope
    /// code. Carries the server-provided message when one exists.
    #[error("request failed ({status}): {message}")]
    Api {
        status: u16,
        code: i64,
        message: String,
    },

    /// The credential could not be refreshed; the session has been cleared
    /// and the caller should return to the login entry point.
    #[error("session expired")]
    SessionExpired,

    /// Network-level failure (connect, timeout, decode). Not a credential
    /// problem and never mutates the session.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ApiError {
    pub(crate) fn transport(err: &reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
