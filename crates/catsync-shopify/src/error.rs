use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{method} {path} failed with HTTP {status}: {body}")]
    Status {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    #[error("rate limited (retry after {retry_after_ms}ms)")]
    RateLimited { retry_after_ms: u64 },

    #[error("GraphQL errors: {0}")]
    GraphQl(String),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("response for {context} is missing expected data")]
    MissingData { context: String },

    #[error("invalid admin base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error("access token is not a valid header value")]
    InvalidCredential,
}

impl AdminError {
    /// HTTP status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            AdminError::Status { status, .. } => Some(*status),
            AdminError::RateLimited { .. } => Some(429),
            AdminError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// `true` for a 422 whose body says the record already exists, i.e. a
    /// concurrent writer won the create race.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        match self {
            AdminError::Status {
                status: 422, body, ..
            } => {
                let body = body.to_lowercase();
                body.contains("already") || body.contains("has been taken")
            }
            _ => false,
        }
    }
}
