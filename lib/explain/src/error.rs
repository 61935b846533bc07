use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExplainError {
    #[error("Explanation service is not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Explanation service returned no content")]
    EmptyResponse,
}
