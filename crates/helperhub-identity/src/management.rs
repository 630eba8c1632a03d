//! Client for the provider's management API.
//!
//! Calls authenticate with a machine token obtained through the
//! client-credentials grant. The token is cached and reused until shortly
//! before it expires; a 401 from the API drops it so the next call fetches a
//! fresh one.

use std::time::{Duration, Instant};

use reqwest::{Client, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::IdentityConfig;
use crate::error::ManagementError;

/// Database connection new subjects are created in.
pub const DEFAULT_CONNECTION: &str = "Username-Password-Authentication";

const REFRESH_MARGIN: Duration = Duration::from_secs(60);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub enum ManagementOp {
    CreateSubject(NewSubject),
    GetSubject { id: String },
    UpdateSubject { id: String, changes: SubjectChanges },
}

#[derive(Debug, Clone, Serialize)]
pub struct NewSubject {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub connection: String,
}

impl NewSubject {
    pub fn new(email: impl Into<String>, password: impl Into<String>, name: Option<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            name,
            connection: DEFAULT_CONNECTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SubjectChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl SubjectChanges {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.name.is_none() && self.password.is_none()
    }
}

/// The subject record as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManagementResult {
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    client_secret: &'a str,
    audience: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    /// `None` when the lifetime cannot be represented; such a token is used
    /// once and not cached.
    fn new(access_token: String, expires_in: u64, now: Instant) -> Option<Self> {
        let expires_at = now.checked_add(Duration::from_secs(expires_in))?;
        Some(Self {
            access_token,
            expires_at,
        })
    }

    fn is_fresh(&self, now: Instant) -> bool {
        now.checked_add(REFRESH_MARGIN)
            .is_some_and(|deadline| deadline < self.expires_at)
    }
}

pub(crate) struct ManagementClient {
    http: Client,
    config: IdentityConfig,
    token: Mutex<Option<CachedToken>>,
}

impl ManagementClient {
    pub(crate) fn new(config: IdentityConfig) -> Result<Self, ManagementError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            config,
            token: Mutex::new(None),
        })
    }

    pub(crate) async fn execute(&self, op: &ManagementOp) -> Result<ManagementResult, ManagementError> {
        let token = self.access_token().await?;
        let request = self.operation_request(op, &token)?;
        debug!("Identity management call: {} {}", request.method(), request.url());

        let response = self.http.execute(request).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Management token rejected; dropping cached token");
            *self.token.lock().await = None;
        }

        let result = check_status(response).await?.json().await?;
        Ok(result)
    }

    async fn access_token(&self) -> Result<String, ManagementError> {
        // Held across the fetch so concurrent callers share one token request.
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Instant::now())) {
            return Ok(token.access_token.clone());
        }

        let response = self.http.execute(self.token_request()?).await?;
        let body: TokenResponse = check_status(response).await?.json().await?;
        debug!("Fetched management token, expires in {}s", body.expires_in);

        *cached = CachedToken::new(body.access_token.clone(), body.expires_in, Instant::now());
        if cached.is_none() {
            warn!("Management token lifetime {}s out of range; not caching", body.expires_in);
        }
        Ok(body.access_token)
    }

    fn token_request(&self) -> reqwest::Result<Request> {
        self.http
            .post(format!("{}/oauth/token", self.config.base_url()))
            .json(&TokenRequest {
                grant_type: "client_credentials",
                client_id: &self.config.client_id,
                client_secret: &self.config.client_secret,
                audience: self.config.management_audience(),
            })
            .build()
    }

    fn operation_request(&self, op: &ManagementOp, token: &str) -> reqwest::Result<Request> {
        let users = format!("{}/api/v2/users", self.config.base_url());
        let builder = match op {
            ManagementOp::CreateSubject(new) => self.http.post(users).json(new),
            ManagementOp::GetSubject { id } => self.http.get(format!("{users}/{}", escape_id(id))),
            ManagementOp::UpdateSubject { id, changes } => self
                .http
                .patch(format!("{users}/{}", escape_id(id)))
                .json(changes),
        };
        builder.bearer_auth(token).build()
    }
}

// Provider ids look like `auth0|65a1...`.
fn escape_id(id: &str) -> String {
    id.replace('%', "%25").replace('|', "%7C").replace('/', "%2F")
}

async fn check_status(response: Response) -> Result<Response, ManagementError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ManagementError::Status {
        status: status.as_u16(),
        body,
    })
}
