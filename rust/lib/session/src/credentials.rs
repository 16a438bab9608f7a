//! Durable projection of the session onto a `KVStore`.

use std::sync::Arc;

use boutique_kv::KVStore;
use tracing::debug;

use crate::error::SessionError;
use crate::identity::Identity;
use crate::preferences::{theme_key, ThemePreferences};

pub const TOKEN_KEY: &str = "token";
pub const IDENTITY_KEY: &str = "user";

/// Persists the access token and the cached identity.
///
/// Writes overwrite and propagate storage failures. Reads never fail on
/// bad data: a value that doesn't decode is reported as absent.
#[derive(Clone)]
pub struct CredentialStore {
    kv: Arc<dyn KVStore>,
}

impl CredentialStore {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self { kv }
    }

    pub fn save_token(&self, token: &str) -> Result<(), SessionError> {
        self.kv.set(TOKEN_KEY, token.as_bytes())?;
        Ok(())
    }

    pub fn save_identity(&self, identity: &Identity) -> Result<(), SessionError> {
        let bytes = serde_json::to_vec(identity)?;
        self.kv.set(IDENTITY_KEY, &bytes)?;
        Ok(())
    }

    pub fn load_token(&self) -> Option<String> {
        match self.kv.get(TOKEN_KEY) {
            Ok(Some(bytes)) => match String::from_utf8(bytes) {
                Ok(token) if !token.is_empty() => Some(token),
                Ok(_) => None,
                Err(_) => {
                    debug!("credentials: stored token is not UTF-8, ignoring");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                debug!("credentials: reading token failed: {}", e);
                None
            }
        }
    }

    pub fn load_identity(&self) -> Option<Identity> {
        let bytes = match self.kv.get(IDENTITY_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                debug!("credentials: reading identity failed: {}", e);
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(identity) => Some(identity),
            Err(e) => {
                debug!("credentials: cached identity is malformed, ignoring: {}", e);
                None
            }
        }
    }

    /// Remove both the token and the identity.
    pub fn clear(&self) -> Result<(), SessionError> {
        self.kv.batch_delete(&[TOKEN_KEY, IDENTITY_KEY])?;
        Ok(())
    }

    /// Theme preferences for an identity (or the guest slot), defaulting
    /// when nothing usable is stored.
    pub fn load_theme(&self, identity_id: Option<&str>) -> ThemePreferences {
        self.kv
            .get(&theme_key(identity_id))
            .ok()
            .flatten()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .unwrap_or_default()
    }

    pub fn save_theme(
        &self,
        identity_id: Option<&str>,
        prefs: &ThemePreferences,
    ) -> Result<(), SessionError> {
        let bytes = serde_json::to_vec(prefs)?;
        self.kv.set(&theme_key(identity_id), &bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Role;
    use crate::preferences::{ColorPalette, ThemeMode};
    use boutique_kv::{KVError, MemoryStore};

    fn store() -> (Arc<MemoryStore>, CredentialStore) {
        let kv = Arc::new(MemoryStore::new());
        (kv.clone(), CredentialStore::new(kv))
    }

    fn sample() -> Identity {
        let mut id = Identity::new("9", "lucia@boutique.com", Role::Manager)
            .with_name("Lucía", "Gómez")
            .with_permissions(["inventory.edit", "orders.view"]);
        id.phone = Some("+34 600 000 000".into());
        id.date_of_birth = Some("1990-04-12".into());
        id.is_employee = true;
        id
    }

    #[test]
    fn empty_store_loads_nothing() {
        let (_, creds) = store();
        assert!(creds.load_token().is_none());
        assert!(creds.load_identity().is_none());
    }

    #[test]
    fn identity_roundtrip_is_deep_equal() {
        let (_, creds) = store();
        let original = sample();
        creds.save_identity(&original).unwrap();
        assert_eq!(creds.load_identity(), Some(original));
    }

    #[test]
    fn save_overwrites() {
        let (_, creds) = store();
        creds.save_token("first").unwrap();
        creds.save_token("second").unwrap();
        assert_eq!(creds.load_token().as_deref(), Some("second"));
    }

    #[test]
    fn malformed_identity_is_absent() {
        let (kv, creds) = store();
        kv.set(IDENTITY_KEY, b"{not json").unwrap();
        assert!(creds.load_identity().is_none());
    }

    #[test]
    fn clear_removes_token_and_identity_only() {
        let (kv, creds) = store();
        creds.save_token("t").unwrap();
        creds.save_identity(&sample()).unwrap();
        creds
            .save_theme(Some("9"), &ThemePreferences::default())
            .unwrap();

        creds.clear().unwrap();
        assert!(creds.load_token().is_none());
        assert!(creds.load_identity().is_none());
        assert!(kv.get("theme_preferences_9").unwrap().is_some());
    }

    #[test]
    fn quota_failure_propagates() {
        let kv = Arc::new(MemoryStore::with_quota(12));
        let creds = CredentialStore::new(kv);
        let err = creds.save_identity(&sample()).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Storage(KVError::QuotaExceeded { .. })
        ));
    }

    #[test]
    fn theme_defaults_and_roundtrip() {
        let (kv, creds) = store();
        assert_eq!(creds.load_theme(None), ThemePreferences::default());

        let prefs = ThemePreferences {
            mode: ThemeMode::Light,
            palette: ColorPalette::Minimal,
        };
        creds.save_theme(Some("9"), &prefs).unwrap();
        assert_eq!(creds.load_theme(Some("9")), prefs);
        assert_eq!(creds.load_theme(Some("10")), ThemePreferences::default());

        kv.set("theme_preferences_guest", b"garbage").unwrap();
        assert_eq!(creds.load_theme(None), ThemePreferences::default());
    }
}
