//! Operator commands run outside the server

use crate::{Result, Settings, server::open_store};
use bazaar_core::access::{Grant, GrantFlags, Resource, RoleId};
use bazaar_http::services::{JwtConfig, JwtService};
use tracing::info;

/// Sign a bearer credential with the configured secret
pub fn issue_token(
    settings: &Settings,
    subject: &str,
    role: Option<&str>,
    name: Option<&str>,
) -> Result<String> {
    settings.validate()?;
    let jwt = JwtService::new(JwtConfig::from(settings.auth.jwt.clone()));
    let role = role.map(RoleId::from);
    Ok(jwt.generate_token(subject, role.as_ref(), name)?)
}

/// Upsert a grant directly against the configured database
///
/// The write bypasses the grant cache. A running server picks it up once its
/// cached lookup for the same key expires.
pub async fn set_permission(
    settings: &Settings,
    role: &str,
    resource: &str,
    flags: GrantFlags,
) -> Result<Grant> {
    settings.validate()?;
    let store = open_store(settings).await?;
    let grant = store
        .upsert_grant(&RoleId::from(role), &Resource::from(resource), flags)
        .await?;
    info!(role = %grant.role_id, resource = %grant.resource, "Grant stored");
    Ok(grant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::access::TokenVerifier;

    fn settings() -> Settings {
        let mut settings = Settings::default();
        settings.auth.jwt.secret = "cli-secret".to_string();
        settings.database.url = "sqlite::memory:".to_string();
        settings
    }

    #[tokio::test]
    async fn test_issued_token_verifies() {
        let settings = settings();
        let token = issue_token(&settings, "ops-1", Some("admin"), None).unwrap();

        let jwt = JwtService::new(JwtConfig::from(settings.auth.jwt.clone()));
        let principal = jwt.verify(&token).await.unwrap();
        assert_eq!(principal.id, "ops-1");
        assert_eq!(principal.role, Some(RoleId::from("admin")));
    }

    #[test]
    fn test_issue_token_requires_secret() {
        let mut settings = settings();
        settings.auth.jwt.secret.clear();
        assert!(issue_token(&settings, "ops-1", None, None).is_err());
    }

    #[tokio::test]
    async fn test_set_permission_returns_grant() {
        let grant = set_permission(&settings(), "admin", "Order", GrantFlags::new(true, true, false))
            .await
            .unwrap();
        assert_eq!(grant.role_id.as_str(), "admin");
        assert!(grant.can_edit);
        assert!(!grant.can_delete);
    }

    #[tokio::test]
    async fn test_set_permission_reaches_running_server_after_cache_ttl() {
        let path = std::env::temp_dir().join(format!("bazaar-cli-{}.db", std::process::id()));
        let mut settings = settings();
        settings.database.url = format!("sqlite://{}", path.display());
        settings.cache.ttl_seconds = 1;
        let _ = std::fs::remove_file(&path);

        let server_store = crate::server::connect_store(&settings).await.unwrap();
        let role = RoleId::from("clerk");
        let resource = Resource::from("Refund");

        set_permission(&settings, "clerk", "Refund", GrantFlags::all())
            .await
            .unwrap();
        let cached = server_store.find_grant(&role, &resource).await.unwrap().unwrap();
        assert!(cached.can_delete);

        set_permission(&settings, "clerk", "Refund", GrantFlags::new(false, false, false))
            .await
            .unwrap();

        let fresh = open_store(&settings).await.unwrap();
        let stored = fresh.find_grant(&role, &resource).await.unwrap().unwrap();
        assert!(!stored.can_view && !stored.can_delete);

        let stale = server_store.find_grant(&role, &resource).await.unwrap().unwrap();
        assert!(stale.can_delete);

        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        let expired = server_store.find_grant(&role, &resource).await.unwrap().unwrap();
        assert!(!expired.can_view && !expired.can_delete);

        drop((server_store, fresh));
        let _ = std::fs::remove_file(&path);
    }
}
