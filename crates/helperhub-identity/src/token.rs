use std::collections::HashMap;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::config::IdentityConfig;
use crate::error::AuthError;

/// The authenticated caller, as asserted by a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subject {
    pub id: String,
    pub email: Option<String>,
    pub roles: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    roles: Option<Vec<String>>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Verifies HS256 tokens issued by the provider for this client.
pub(crate) struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
    roles_claim: String,
}

impl TokenVerifier {
    pub(crate) fn new(config: &IdentityConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer()]);
        validation.set_audience(&[config.token_audience()]);

        Self {
            key: DecodingKey::from_secret(config.client_secret.as_bytes()),
            validation,
            roles_claim: config.roles_claim(),
        }
    }

    pub(crate) fn verify(&self, token: &str) -> Result<Subject, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::Missing);
        }

        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Invalid(e.to_string()),
            }
        })?;

        let mut claims = data.claims;
        let roles = match claims.roles.take() {
            Some(roles) => roles,
            None => claims
                .other
                .remove(&self.roles_claim)
                .and_then(|v| serde_json::from_value(v).ok())
                .unwrap_or_default(),
        };

        Ok(Subject {
            id: claims.sub,
            email: claims.email,
            roles,
        })
    }
}
