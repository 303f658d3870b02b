use reqwest::Client;
use tracing::{debug, error, instrument};

use crate::constants::{ASTRO_ENDPOINT, BACKEND_FALLBACK};
use crate::error::OracleError;
use crate::message::{format_history, AstroRequest, AstroResponse, ChatMessage, Content};

/// Client for the hosted astro backend (`POST {base}/api/astro/`).
#[derive(Debug, Clone)]
pub struct AstroClient {
    client: Client,
    base_url: String,
}

impl AstroClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), ASTRO_ENDPOINT)
    }

    /// Asks the backend about `current_message`, given the local history.
    ///
    /// Never fails: any error is logged and replaced by [`BACKEND_FALLBACK`].
    pub async fn get_astrology_response(
        &self,
        current_message: &str,
        history: &[ChatMessage],
    ) -> String {
        match self.send(current_message, format_history(history)).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, "Error consulting the stars");
                BACKEND_FALLBACK.to_string()
            }
        }
    }

    /// Posts an already formatted history to the backend.
    #[instrument(skip(self, history), fields(turns = history.len()))]
    pub async fn send(
        &self,
        current_message: &str,
        history: Vec<Content>,
    ) -> Result<String, OracleError> {
        let url = self.endpoint();
        let payload = AstroRequest {
            current_message: current_message.to_string(),
            history,
        };

        debug!(%url, "Sending astro backend request");

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|source| OracleError::Transport {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(OracleError::Status { status, body });
        }

        let reply = response
            .json::<AstroResponse>()
            .await
            .map_err(OracleError::Decode)?;

        debug!(chars = reply.response.len(), "Received astro backend response");
        Ok(reply.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let client = AstroClient::new("http://localhost:9000/");
        assert_eq!(client.endpoint(), "http://localhost:9000/api/astro/");

        let client = AstroClient::new("http://localhost:9000");
        assert_eq!(client.endpoint(), "http://localhost:9000/api/astro/");
    }
}
