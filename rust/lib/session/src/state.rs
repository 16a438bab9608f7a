//! Session state: what the client believes about authentication.

use serde::Serialize;

use crate::identity::Identity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    Uninitialized,
    /// A persisted token is being verified with the server.
    Restoring,
    Authenticated,
    Unauthenticated,
    /// Last login or registration attempt failed; see `Session::error`.
    Error,
}

/// Immutable session snapshot.
///
/// Built only through the constructors below so that `is_authenticated`
/// holds exactly when identity and token are both present in the
/// `Authenticated` phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    phase: SessionPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    identity: Option<Identity>,
    #[serde(skip)]
    token: Option<String>,
    loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Session {
    pub fn uninitialized() -> Self {
        Self {
            phase: SessionPhase::Uninitialized,
            identity: None,
            token: None,
            loading: true,
            error: None,
        }
    }

    /// Cached credentials found at startup, not yet confirmed.
    pub fn restoring(identity: Identity, token: String) -> Self {
        Self {
            phase: SessionPhase::Restoring,
            identity: Some(identity),
            token: Some(token),
            loading: true,
            error: None,
        }
    }

    pub fn authenticated(identity: Identity, token: String) -> Self {
        Self {
            phase: SessionPhase::Authenticated,
            identity: Some(identity),
            token: Some(token),
            loading: false,
            error: None,
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            phase: SessionPhase::Unauthenticated,
            identity: None,
            token: None,
            loading: false,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            phase: SessionPhase::Error,
            identity: None,
            token: None,
            loading: false,
            error: Some(message.into()),
        }
    }

    /// Same session with the loading flag set, error cleared.
    #[must_use]
    pub fn busy(&self) -> Self {
        Self {
            loading: true,
            error: None,
            ..self.clone()
        }
    }

    /// Same session with a different identity. Only meaningful while a
    /// token is held; otherwise the session is returned unchanged.
    #[must_use]
    pub fn with_identity(&self, identity: Identity) -> Self {
        if self.token.is_none() {
            return self.clone();
        }
        Self {
            identity: Some(identity),
            ..self.clone()
        }
    }

    /// Same session, no longer loading.
    #[must_use]
    pub fn idle(&self) -> Self {
        Self {
            loading: false,
            ..self.clone()
        }
    }

    /// Same session carrying an error message, no longer loading.
    #[must_use]
    pub fn with_error(&self, message: impl Into<String>) -> Self {
        Self {
            loading: false,
            error: Some(message.into()),
            ..self.clone()
        }
    }

    /// Drop the error message. A failed session becomes unauthenticated.
    #[must_use]
    pub fn without_error(&self) -> Self {
        if self.phase == SessionPhase::Error {
            return Self::unauthenticated();
        }
        Self {
            error: None,
            ..self.clone()
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase == SessionPhase::Authenticated && self.identity.is_some() && self.token.is_some()
    }

    /// Startup verification still outstanding.
    pub fn is_settling(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::Uninitialized | SessionPhase::Restoring
        )
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::uninitialized()
    }
}
