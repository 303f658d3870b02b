use thiserror::Error;

/// Why a call to the remote API did not produce a reply.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("remote API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("remote API returned no text")]
    EmptyReply,
}
