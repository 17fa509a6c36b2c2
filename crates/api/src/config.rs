//! Process configuration, read from environment variables with logged
//! defaults. Nothing security-sensitive is hardcoded; the insecure dev
//! fallbacks announce themselves at startup.

use std::net::IpAddr;

/// First admin account, seeded at startup when no admin exists yet.
///
/// Without it a fresh database has no admin, and both admin-creation paths
/// (invite and direct) would be unreachable.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,

    /// HS256 signing secret for session tokens.
    pub jwt_secret: String,

    /// Session token validity window.
    pub token_ttl_hours: i64,

    /// Default invite validity window (per-invite override via request body).
    pub invite_ttl_hours: i64,

    /// Argon2id time cost (iterations). CPU-time-per-attempt trade-off.
    pub hash_time_cost: u32,

    pub use_persistent_stores: bool,
    pub database_url: Option<String>,

    /// Admin-surface allowlist. `None` disables the network gate.
    pub admin_allowed_ips: Option<Vec<IpAddr>>,

    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl AppConfig {
    /// Seven days, matching the session cookie's `Max-Age`.
    pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24 * 7;

    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("FOLIO_JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("FOLIO_JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let use_persistent_stores = std::env::var("USE_PERSISTENT_STORES")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);

        Self {
            bind_addr: std::env::var("FOLIO_BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            jwt_secret,
            token_ttl_hours: env_i64("FOLIO_TOKEN_TTL_HOURS", Self::DEFAULT_TOKEN_TTL_HOURS),
            invite_ttl_hours: env_i64(
                "FOLIO_INVITE_TTL_HOURS",
                folio_accounts::DEFAULT_INVITE_TTL_HOURS,
            ),
            hash_time_cost: env_u32(
                "FOLIO_HASH_COST",
                folio_auth::PasswordHasher::DEFAULT_TIME_COST,
            ),
            use_persistent_stores,
            database_url: std::env::var("DATABASE_URL").ok(),
            admin_allowed_ips: parse_allowed_ips(std::env::var("FOLIO_ADMIN_ALLOWED_IPS").ok()),
            bootstrap_admin: parse_bootstrap_admin(std::env::var("FOLIO_BOOTSTRAP_ADMIN").ok()),
        }
    }

    /// In-memory config for tests and local hacking.
    pub fn in_memory(jwt_secret: &str) -> Self {
        Self {
            bind_addr: "127.0.0.1:0".to_string(),
            jwt_secret: jwt_secret.to_string(),
            token_ttl_hours: Self::DEFAULT_TOKEN_TTL_HOURS,
            invite_ttl_hours: folio_accounts::DEFAULT_INVITE_TTL_HOURS,
            // Keep test suites fast; production reads FOLIO_HASH_COST.
            hash_time_cost: 1,
            use_persistent_stores: false,
            database_url: None,
            admin_allowed_ips: None,
            bootstrap_admin: None,
        }
    }
}

fn env_i64(name: &str, default: i64) -> i64 {
    match std::env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("{name}={raw} is not a number; using {default}");
            default
        }),
        Err(_) => default,
    }
}

fn env_u32(name: &str, default: u32) -> u32 {
    match std::env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("{name}={raw} is not a number; using {default}");
            default
        }),
        Err(_) => default,
    }
}

fn parse_allowed_ips(raw: Option<String>) -> Option<Vec<IpAddr>> {
    let raw = raw?;
    let mut ips = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.parse::<IpAddr>() {
            Ok(ip) => ips.push(ip),
            Err(_) => tracing::warn!("FOLIO_ADMIN_ALLOWED_IPS: skipping unparseable entry {part}"),
        }
    }
    Some(ips)
}

/// `name:email:password` (password may contain further colons).
fn parse_bootstrap_admin(raw: Option<String>) -> Option<BootstrapAdmin> {
    let raw = raw?;
    let mut parts = raw.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(name), Some(email), Some(password))
            if !name.is_empty() && !email.is_empty() && !password.is_empty() =>
        {
            Some(BootstrapAdmin {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
        }
        _ => {
            tracing::warn!("FOLIO_BOOTSTRAP_ADMIN must be name:email:password; ignoring");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_ips_parse_and_skip_garbage() {
        let ips = parse_allowed_ips(Some("127.0.0.1, ::1, not-an-ip".to_string())).unwrap();
        assert_eq!(ips.len(), 2);
    }

    #[test]
    fn bootstrap_admin_allows_colons_in_password() {
        let admin = parse_bootstrap_admin(Some("Root:root@example.com:a:b:c".to_string())).unwrap();
        assert_eq!(admin.email, "root@example.com");
        assert_eq!(admin.password, "a:b:c");
    }

    #[test]
    fn malformed_bootstrap_admin_is_ignored() {
        assert!(parse_bootstrap_admin(Some("just-a-name".to_string())).is_none());
    }
}
