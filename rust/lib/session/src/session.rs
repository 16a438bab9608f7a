//! The session container: one owner of authentication state.
//!
//! All mutations go through the action methods on [`SessionManager`];
//! readers take [`Session`] snapshots or subscribe to changes. API
//! failures end up in `Session::error`, never in the returned `Result`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{AuthApi, ChangePasswordRequest, LoginRequest, LoginResponse, RegisterRequest};
use crate::credentials::CredentialStore;
use crate::error::SessionError;
use crate::identity::{Identity, Role};
use crate::permission;
use crate::preferences::ThemePreferences;
use crate::state::{Session, SessionPhase};
use crate::store::{SessionStore, SubscriptionId};

const NOT_SIGNED_IN: &str = "not signed in";

pub struct SessionManager {
    api: Arc<dyn AuthApi>,
    credentials: CredentialStore,
    store: SessionStore,
    /// Advanced by every logout; results computed under an older epoch
    /// are dropped.
    epoch: AtomicU64,
}

impl SessionManager {
    /// Build the container from whatever the credential store holds.
    ///
    /// Token and identity both present: `Restoring` until `initialize`
    /// confirms them. Anything less: `Unauthenticated`.
    pub fn new(api: Arc<dyn AuthApi>, credentials: CredentialStore) -> Self {
        let initial = match (credentials.load_token(), credentials.load_identity()) {
            (Some(token), Some(identity)) => {
                debug!("session: cached credentials found for {}", identity.email);
                Session::restoring(identity, token)
            }
            _ => Session::unauthenticated(),
        };
        Self {
            api,
            credentials,
            store: SessionStore::new(initial),
            epoch: AtomicU64::new(0),
        }
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Current state. Evaluate guards against one snapshot so they agree.
    pub fn snapshot(&self) -> Arc<Session> {
        self.store.get()
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&Arc<Session>) + Send + Sync + 'static,
    {
        self.store.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    fn is_stale(&self, epoch: u64) -> bool {
        self.current_epoch() != epoch
    }

    /// Startup step. Verifies cached credentials when there are any;
    /// otherwise there is nothing to do and no request is made.
    pub async fn initialize(&self) -> Result<(), SessionError> {
        match self.snapshot().phase() {
            SessionPhase::Restoring | SessionPhase::Uninitialized => self.check_auth().await,
            _ => Ok(()),
        }
    }

    /// Sign in. `Ok(false)` means the server said no (or could not be
    /// reached); the reason is in `Session::error`.
    pub async fn login(&self, email: &str, password: &str) -> Result<bool, SessionError> {
        let epoch = self.current_epoch();
        self.store.set(self.snapshot().busy());

        let req = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let result = self.api.login(&req).await;
        if self.is_stale(epoch) {
            debug!("session: dropping login result from before logout");
            return Ok(false);
        }

        match result {
            Ok(resp) => {
                self.establish(resp)?;
                Ok(true)
            }
            Err(e) => {
                info!("session: login failed for {}: {}", email, e);
                let purged = self.credentials.clear();
                self.store.set(Session::failed(e.to_string()));
                purged?;
                Ok(false)
            }
        }
    }

    fn establish(&self, resp: LoginResponse) -> Result<(), SessionError> {
        let persisted = self
            .credentials
            .save_token(&resp.access)
            .and_then(|_| self.credentials.save_identity(&resp.user));
        if let Err(e) = persisted {
            warn!("session: could not persist credentials: {}", e);
            if let Err(e) = self.credentials.clear() {
                debug!("session: purge after failed save also failed: {}", e);
            }
            self.store.set(Session::failed(e.to_string()));
            return Err(e);
        }
        info!("session: signed in as {} ({})", resp.user.email, resp.user.role);
        self.store.set(Session::authenticated(resp.user, resp.access));
        Ok(())
    }

    /// Sign out. The server is told on a best-effort basis; local state is
    /// purged regardless. Calling it twice is harmless.
    pub async fn logout(&self) -> Result<(), SessionError> {
        self.epoch.fetch_add(1, Ordering::SeqCst);

        let token = self
            .snapshot()
            .token()
            .map(str::to_string)
            .or_else(|| self.credentials.load_token());
        match token {
            Some(token) => {
                if let Err(e) = self.api.logout(Some(&token)).await {
                    warn!("session: server logout failed, clearing locally: {}", e);
                }
            }
            None => debug!("session: no token held, skipping server logout"),
        }

        let purged = self.credentials.clear();
        self.store.set(Session::unauthenticated());
        info!("session: signed out");
        purged
    }

    /// Create an account, then sign in with the same credentials.
    pub async fn register(&self, req: RegisterRequest) -> Result<bool, SessionError> {
        let epoch = self.current_epoch();
        self.store.set(self.snapshot().busy());

        let result = self.api.register(&req).await;
        if self.is_stale(epoch) {
            debug!("session: dropping registration result from before logout");
            return Ok(false);
        }
        match result {
            Ok(identity) => {
                info!("session: registered {}", identity.email);
                self.login(&req.email, &req.password).await
            }
            Err(e) => {
                info!("session: registration failed for {}: {}", req.email, e);
                let purged = self.credentials.clear();
                self.store.set(Session::failed(e.to_string()));
                purged?;
                Ok(false)
            }
        }
    }

    /// Confirm the stored token with the server.
    ///
    /// No token: unauthenticated without a request. A rejected token (or
    /// any other failure) purges the credentials silently.
    pub async fn check_auth(&self) -> Result<(), SessionError> {
        let epoch = self.current_epoch();
        let Some(token) = self.credentials.load_token() else {
            debug!("session: no stored token");
            self.store.set(Session::unauthenticated());
            return Ok(());
        };

        let result = self.api.me(&token).await;
        if self.is_stale(epoch) {
            debug!("session: dropping auth check from before logout");
            return Ok(());
        }

        match result {
            Ok(identity) => {
                debug!("session: token confirmed for {}", identity.email);
                let saved = self.credentials.save_identity(&identity);
                self.store.set(Session::authenticated(identity, token));
                saved
            }
            Err(e) => {
                info!("session: stored token not accepted: {}", e);
                let purged = self.credentials.clear();
                self.store.set(Session::unauthenticated());
                purged
            }
        }
    }

    /// Replace the identity locally (e.g. after a profile edit). No
    /// request is made.
    ///
    /// Returns `Ok(false)` and leaves everything untouched when nobody is
    /// signed in, or when the new identity has a different id or role:
    /// role is fixed for the life of a session.
    pub fn update_identity(&self, identity: Identity) -> Result<bool, SessionError> {
        let current = self.snapshot();
        let Some(existing) = current.identity().filter(|_| current.token().is_some()) else {
            debug!("session: update_identity without a session, ignoring");
            return Ok(false);
        };
        if existing.id != identity.id || existing.role != identity.role {
            debug!(
                "session: update_identity would change id or role ({} -> {}), ignoring",
                existing.role, identity.role
            );
            return Ok(false);
        }
        self.credentials.save_identity(&identity)?;
        self.store.set(current.with_identity(identity));
        Ok(true)
    }

    pub fn clear_error(&self) {
        let current = self.snapshot();
        if current.error().is_some() {
            self.store.set(current.without_error());
        }
    }

    /// `Ok(false)` leaves the reason in `Session::error`; the session is
    /// otherwise unchanged unless the server rejected the token.
    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<bool, SessionError> {
        let epoch = self.current_epoch();
        let current = self.snapshot();
        let Some(token) = current.token().map(str::to_string) else {
            self.store.set(current.with_error(NOT_SIGNED_IN));
            return Ok(false);
        };
        self.store.set(current.busy());

        let req = ChangePasswordRequest {
            old_password: old_password.to_string(),
            new_password: new_password.to_string(),
        };
        let result = self.api.change_password(&token, &req).await;
        if self.is_stale(epoch) {
            return Ok(false);
        }
        match result {
            Ok(()) => {
                info!("session: password changed");
                self.store.set(self.snapshot().idle());
                Ok(true)
            }
            Err(e) if e.is_unauthorized() => {
                info!("session: token rejected while changing password");
                let purged = self.credentials.clear();
                self.store.set(Session::unauthenticated());
                purged?;
                Ok(false)
            }
            Err(e) => {
                self.store.set(self.snapshot().with_error(e.to_string()));
                Ok(false)
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.snapshot().is_authenticated()
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        permission::has_permission(self.snapshot().identity(), permission)
    }

    pub fn has_any_permission<S: AsRef<str>>(&self, permissions: &[S]) -> bool {
        permission::has_any_permission(self.snapshot().identity(), permissions)
    }

    pub fn has_all_permissions<S: AsRef<str>>(&self, permissions: &[S]) -> bool {
        permission::has_all_permissions(self.snapshot().identity(), permissions)
    }

    pub fn has_role(&self, role: Role) -> bool {
        permission::has_role(self.snapshot().identity(), role)
    }

    /// Theme for the signed-in identity, or the guest slot.
    pub fn theme(&self) -> ThemePreferences {
        let session = self.snapshot();
        self.credentials
            .load_theme(session.identity().map(|id| id.id.as_str()))
    }

    pub fn save_theme(&self, prefs: &ThemePreferences) -> Result<(), SessionError> {
        let session = self.snapshot();
        self.credentials
            .save_theme(session.identity().map(|id| id.id.as_str()), prefs)
    }
}
