use std::path::PathBuf;

use anyhow::Context;
use helperhub_api::AuthPolicy;
use helperhub_identity::IdentityConfig;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub identity: IdentityConfig,
    pub auth_policy: AuthPolicy,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let port = or("HELPERHUB_PORT", "8080");
        let port: u16 = port
            .parse()
            .with_context(|| format!("HELPERHUB_PORT is not a valid port: {port:?}"))?;

        let require_auth = or("HELPERHUB_REQUIRE_AUTH", "false");
        let auth_policy = match require_auth.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => AuthPolicy::RequireForMutations,
            "" | "0" | "false" | "no" => AuthPolicy::Open,
            other => anyhow::bail!("HELPERHUB_REQUIRE_AUTH must be true or false, got {other:?}"),
        };

        Ok(Self {
            db_path: PathBuf::from(or("HELPERHUB_DB_PATH", "helperhub.db")),
            host: or("HELPERHUB_HOST", "0.0.0.0"),
            port,
            identity: IdentityConfig {
                domain: or("HELPERHUB_IDENTITY_DOMAIN", "YOUR_AUTH0_DOMAIN"),
                client_id: or("HELPERHUB_IDENTITY_CLIENT_ID", "YOUR_AUTH0_CLIENT_ID"),
                client_secret: or("HELPERHUB_IDENTITY_CLIENT_SECRET", "YOUR_AUTH0_CLIENT_SECRET"),
                audience: var("HELPERHUB_IDENTITY_AUDIENCE"),
            },
            auth_policy,
        })
    }
}
