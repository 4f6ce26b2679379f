use std::fmt;

use serde::Serialize;

/// Structured error type for the bridge. Replaces stringly-typed errors so
/// callers and the outcome ring buffer can match on error codes.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "code", content = "detail")]
pub enum BridgeError {
    /// Malformed or missing argument. The only error class a remote caller
    /// ever sees synchronously.
    Validation { message: String },
    /// A named document, object, or base reference does not exist at
    /// execution time.
    NotFound { what: String },
    /// A failure while applying properties, recomputing, or running a
    /// script. Recorded host-side only; the caller already got "queued".
    Execution { message: String },
    /// `start()` called while the bridge is not stopped.
    AlreadyRunning,
    /// `stop()` called while the bridge is not running.
    NotRunning,
    /// The network listener failed to bind or shut down.
    Listener { message: String },
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::Validation { message } => write!(f, "{message}"),
            BridgeError::NotFound { what } => write!(f, "{what} not found"),
            BridgeError::Execution { message } => write!(f, "{message}"),
            BridgeError::AlreadyRunning => write!(f, "Bridge is already running"),
            BridgeError::NotRunning => write!(f, "Bridge is not running"),
            BridgeError::Listener { message } => write!(f, "Listener error: {message}"),
        }
    }
}

impl std::error::Error for BridgeError {}

impl From<std::io::Error> for BridgeError {
    fn from(e: std::io::Error) -> Self {
        BridgeError::Listener {
            message: e.to_string(),
        }
    }
}

impl BridgeError {
    /// Short stable code for log lines and serialized records.
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::Validation { .. } => "validation",
            BridgeError::NotFound { .. } => "not_found",
            BridgeError::Execution { .. } => "execution",
            BridgeError::AlreadyRunning => "already_running",
            BridgeError::NotRunning => "not_running",
            BridgeError::Listener { .. } => "listener",
        }
    }
}
