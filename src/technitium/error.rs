use thiserror::Error;

/// Everything that can go wrong talking to the appliance.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection, DNS or timeout failure below HTTP.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Any response other than `200 OK`.
    #[error("status: {status}, body: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("malformed response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("response from {path} carries no payload")]
    MissingResponse { path: String },

    /// Envelope decoded but `status != "ok"`.
    #[error("{message}")]
    Api { status: String, message: String },

    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Refused locally before any request was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    pub fn authentication(msg: impl Into<String>) -> Self {
        ClientError::Authentication(msg.into())
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        ClientError::InvalidRequest(msg.into())
    }

    /// Message reported by the appliance, if this is an API-level failure.
    pub fn api_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { message, .. } => Some(message),
            _ => None,
        }
    }
}
