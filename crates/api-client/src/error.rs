use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("The provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid provider configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("The provider payload is not well-formed XML: {0}")]
    MalformedPayload(String),

    #[error("Malformed rate record #{index}: {reason}")]
    MalformedRecord { index: usize, reason: String },
}
