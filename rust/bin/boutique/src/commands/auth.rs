//! login / logout / whoami.

use anyhow::Result;
use boutique_session::{guard, SessionManager};

pub async fn login(sm: &SessionManager, email: &str, password: &str) -> Result<()> {
    if !sm.login(email, password).await? {
        let session = sm.snapshot();
        anyhow::bail!("Login failed: {}", session.error().unwrap_or("unknown error"));
    }
    let session = sm.snapshot();
    if let Some(identity) = session.identity() {
        println!("Signed in as {} ({}).", identity.display_name(), identity.role);
        println!("Home: {}", guard::home_for(identity));
    }
    Ok(())
}

pub async fn logout(sm: &SessionManager) -> Result<()> {
    sm.logout().await?;
    println!("Signed out.");
    Ok(())
}

pub async fn whoami(sm: &SessionManager, json: bool) -> Result<()> {
    sm.initialize().await?;
    let session = sm.snapshot();
    if json {
        println!("{}", serde_json::to_string_pretty(&*session)?);
        return Ok(());
    }
    match session.identity() {
        Some(identity) if session.is_authenticated() => {
            println!("{} <{}>", identity.display_name(), identity.email);
            println!("role:        {}", identity.role);
            if !identity.permissions.is_empty() {
                let perms: Vec<&str> = identity.permissions.iter().map(String::as_str).collect();
                println!("permissions: {}", perms.join(", "));
            }
        }
        _ => println!("Not signed in."),
    }
    Ok(())
}
