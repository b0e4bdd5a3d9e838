// Error kinds for the agent; only the supervisor reacts to the recoverable ones.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    /// Neither the process table nor a lockfile yielded credentials.
    #[error("League client is not running")]
    ClientNotRunning,

    #[error("failed to parse client credentials: {0}")]
    CredentialParse(String),

    #[error("permission denied while inspecting the client process: {0}")]
    PermissionDenied(String),

    /// Connect refused, TLS failure, socket reset. Recoverable by reconnect.
    #[error("transport error: {0}")]
    Transport(String),

    /// HTTP 401 from the client; credentials must be reacquired.
    #[error("client rejected authentication")]
    Auth,

    /// HTTP 404 on a session resource; not an error, means "not in that phase".
    #[error("resource not available in the current phase")]
    NotInPhase,

    #[error("http status {0}")]
    Http(u16),

    /// Malformed frame or unexpected payload shape. Logged and dropped.
    #[error("failed to decode payload: {0}")]
    Decode(String),

    #[error("browser dispatch failed: {0}")]
    Dispatch(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AgentError>;

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        AgentError::Transport(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for AgentError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        AgentError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::Decode(err.to_string())
    }
}

impl AgentError {
    /// Whether the supervisor should keep retrying with backoff.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AgentError::ClientNotRunning | AgentError::Transport(_) | AgentError::Auth
        )
    }
}
