//! theme: show or flip the display preferences of whoever is signed in.

use anyhow::Result;
use boutique_session::SessionManager;

pub async fn theme(sm: &SessionManager, toggle: bool, json: bool) -> Result<()> {
    sm.initialize().await?;
    let mut prefs = sm.theme();
    if toggle {
        prefs.mode = prefs.mode.toggled();
        sm.save_theme(&prefs)?;
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&prefs)?);
    } else {
        println!("mode:    {:?}", prefs.mode);
        println!("palette: {:?}", prefs.palette);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use boutique_kv::MemoryStore;
    use boutique_session::preferences::ThemeMode;
    use boutique_session::{CredentialStore, HttpAuthApi, SessionConfig};

    use super::*;

    fn signed_out() -> SessionManager {
        let credentials = CredentialStore::new(Arc::new(MemoryStore::new()));
        let api = HttpAuthApi::new(SessionConfig::default()).unwrap();
        SessionManager::new(Arc::new(api), credentials)
    }

    #[tokio::test]
    async fn toggle_flips_and_persists_guest_mode() {
        let sm = signed_out();
        assert_eq!(sm.theme().mode, ThemeMode::Dark);

        theme(&sm, true, false).await.unwrap();
        assert_eq!(sm.theme().mode, ThemeMode::Light);
        assert_eq!(sm.credentials().load_theme(None).mode, ThemeMode::Light);

        theme(&sm, false, true).await.unwrap();
        assert_eq!(sm.theme().mode, ThemeMode::Light);
    }
}
