use boutique_kv::KVError;
use thiserror::Error;

/// Failure of a call to the remote REST API.
///
/// `Display` is the human-readable message shown next to the login form,
/// so server messages are passed through verbatim.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("could not connect to the server")]
    Network(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// Errors that escape the session container.
///
/// API failures never do; they become `Session::error`. Only local
/// storage failures (quota, I/O) are returned to the caller.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Storage(#[from] KVError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SessionError {
    fn from(e: serde_json::Error) -> Self {
        SessionError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_displays_message_only() {
        let err = ApiError::Server {
            status: 400,
            message: "Invalid credentials".into(),
        };
        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(err.status(), Some(400));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn unauthorized_detection() {
        let err = ApiError::Server {
            status: 401,
            message: "Token expired".into(),
        };
        assert!(err.is_unauthorized());
        assert!(!ApiError::Decode("x".into()).is_unauthorized());
    }

    #[test]
    fn storage_error_wraps_kv() {
        let err: SessionError = KVError::QuotaExceeded { used: 20, quota: 10 }.into();
        assert!(matches!(err, SessionError::Storage(KVError::QuotaExceeded { .. })));
        assert_eq!(err.to_string(), "storage quota exceeded: 20 of 10 bytes");
    }
}
