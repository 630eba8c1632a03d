use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    Missing,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("token expired")]
    Expired,
}

#[derive(Debug, Error)]
pub enum ManagementError {
    #[error("identity management is not configured")]
    Disabled,

    #[error("identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("identity provider returned {status}: {body}")]
    Status { status: u16, body: String },
}
