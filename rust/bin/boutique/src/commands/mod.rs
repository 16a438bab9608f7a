pub mod access;
pub mod auth;
pub mod theme;

use std::sync::Arc;

use anyhow::Result;
use boutique_kv::{KVStore, RedbStore};
use boutique_session::{CredentialStore, HttpAuthApi, SessionConfig, SessionManager};
use tracing::debug;

/// Open the persisted session described by `config`.
pub fn open_session(config: &SessionConfig) -> Result<SessionManager> {
    let path = config
        .store_path
        .clone()
        .ok_or_else(|| anyhow::anyhow!("no session store configured"))?;
    debug!("opening session store at {}", path.display());
    let kv: Arc<dyn KVStore> = Arc::new(
        RedbStore::open(&path).map_err(|e| anyhow::anyhow!("failed to open session store: {}", e))?,
    );
    let credentials = CredentialStore::new(kv);
    let api = HttpAuthApi::new(config.clone())?.with_credentials(credentials.clone());
    Ok(SessionManager::new(Arc::new(api), credentials))
}
