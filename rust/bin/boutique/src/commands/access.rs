//! route / can: evaluate the stored session against paths and permissions.

use anyhow::Result;
use boutique_session::{Navigation, Router, SessionManager};

pub async fn route(sm: &SessionManager, path: &str, json: bool) -> Result<()> {
    sm.initialize().await?;
    let session = sm.snapshot();
    let (landed, navigation) = Router::new().settle(path, &session);
    match navigation {
        Navigation::Render(view) if json => {
            println!("{}", serde_json::json!({ "path": landed, "render": view }));
        }
        Navigation::Render(view) => println!("{} -> {:?}", landed, view),
        Navigation::Loading => println!("{} -> loading", landed),
        Navigation::Redirect(to) => println!("{} -> redirect loop at {}", landed, to),
    }
    Ok(())
}

pub async fn can(sm: &SessionManager, permissions: &[String]) -> Result<()> {
    sm.initialize().await?;
    for permission in permissions {
        let verdict = if sm.has_permission(permission) { "yes" } else { "no" };
        println!("{}: {}", permission, verdict);
    }
    if permissions.len() > 1 {
        println!("any: {}", sm.has_any_permission(permissions));
        println!("all: {}", sm.has_all_permissions(permissions));
    }
    Ok(())
}
