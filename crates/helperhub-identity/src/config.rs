/// Connection settings for the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    /// Tenant domain, e.g. `helperhub.us.auth0.com`. No scheme.
    pub domain: String,
    pub client_id: String,
    pub client_secret: String,
    /// Expected `aud` of end-user tokens. Falls back to the client id.
    pub audience: Option<String>,
}

const PLACEHOLDER_PREFIX: &str = "YOUR_AUTH0_";

impl IdentityConfig {
    /// True when any credential is unset or still a `YOUR_AUTH0_*` placeholder.
    pub fn is_placeholder(&self) -> bool {
        [&self.domain, &self.client_id, &self.client_secret]
            .iter()
            .any(|v| v.trim().is_empty() || v.starts_with(PLACEHOLDER_PREFIX))
    }

    pub fn base_url(&self) -> String {
        let domain = self.domain.trim_end_matches('/');
        if domain.starts_with("http://") || domain.starts_with("https://") {
            domain.to_string()
        } else {
            format!("https://{domain}")
        }
    }

    pub fn issuer(&self) -> String {
        format!("{}/", self.base_url())
    }

    pub fn token_audience(&self) -> &str {
        match self.audience.as_deref() {
            Some(aud) if !aud.trim().is_empty() => aud,
            _ => &self.client_id,
        }
    }

    /// Audience of the management API, requested with client credentials.
    pub fn management_audience(&self) -> String {
        format!("{}/api/v2/", self.base_url())
    }

    /// Namespaced claim some tenants use to carry roles.
    pub fn roles_claim(&self) -> String {
        format!("{}roles", self.issuer())
    }
}
