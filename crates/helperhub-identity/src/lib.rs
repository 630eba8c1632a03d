pub mod config;
pub mod error;
pub mod management;
pub mod token;

pub use config::IdentityConfig;
pub use error::{AuthError, ManagementError};
pub use management::{ManagementOp, ManagementResult, NewSubject, SubjectChanges};
pub use token::Subject;

use management::ManagementClient;
use token::TokenVerifier;
use tracing::warn;

/// Front door to the external identity provider.
///
/// Token verification is local. Management calls go out over HTTP and are
/// only available when real credentials are configured.
pub struct IdentityGateway {
    config: IdentityConfig,
    verifier: TokenVerifier,
    management: Option<ManagementClient>,
}

impl IdentityGateway {
    pub fn new(config: IdentityConfig) -> Result<Self, ManagementError> {
        let management = if config.is_placeholder() {
            warn!("Identity provider credentials are placeholders; management calls disabled");
            None
        } else {
            Some(ManagementClient::new(config.clone())?)
        };

        Ok(Self {
            verifier: TokenVerifier::new(&config),
            config,
            management,
        })
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    pub fn management_enabled(&self) -> bool {
        self.management.is_some()
    }

    /// Verify a bearer token and return the caller it names.
    pub fn authenticate(&self, token: &str) -> Result<Subject, AuthError> {
        self.verifier.verify(token)
    }

    pub async fn manage(&self, op: ManagementOp) -> Result<ManagementResult, ManagementError> {
        let Some(client) = &self.management else {
            return Err(ManagementError::Disabled);
        };
        client.execute(&op).await
    }
}
