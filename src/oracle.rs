use crate::astro_client::AstroClient;
use crate::constants;
use crate::error::OracleError;
use crate::gemini::{GeminiClient, GeminiSession};
use crate::message::{trim_leading_model, AstroRequest, ChatMessage, Content, Role};

/// Which remote API answers the chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Provider {
    /// The hosted astro backend (`/api/astro/`).
    #[default]
    Backend,
    /// A Gemini chat session with the built-in astrologer prompt.
    Gemini,
}

#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub provider: Provider,
    pub api_base_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            api_base_url: constants::API_BASE_URL.clone(),
            gemini_api_key: constants::GEMINI_API_KEY.clone(),
            gemini_model: constants::GEMINI_MODEL.clone(),
            gemini_base_url: constants::GEMINI_BASE_URL.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Oracle {
    Backend(AstroClient),
    Gemini(GeminiClient),
}

impl Oracle {
    pub fn new(config: &OracleConfig) -> Self {
        match config.provider {
            Provider::Backend => Oracle::Backend(AstroClient::new(config.api_base_url.clone())),
            Provider::Gemini => Oracle::Gemini(GeminiClient::new(
                config.gemini_api_key.clone(),
                config.gemini_model.clone(),
                config.gemini_base_url.clone(),
            )),
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            Oracle::Backend(_) => Provider::Backend,
            Oracle::Gemini(_) => Provider::Gemini,
        }
    }

    /// Starts a conversation. Sessions are not shared, so each browser
    /// request or terminal chat gets its own.
    pub fn open_session(&self) -> OracleSession {
        match self {
            Oracle::Backend(client) => OracleSession::Backend(client.clone()),
            Oracle::Gemini(client) => OracleSession::Gemini(GeminiSession::new(client.clone())),
        }
    }

    /// Answers a request whose history is already in the remote format.
    pub async fn relay(&self, request: AstroRequest) -> Result<String, OracleError> {
        match self {
            Oracle::Backend(client) => client.send(&request.current_message, request.history).await,
            Oracle::Gemini(client) => {
                let mut contents = request.history;
                trim_leading_model(&mut contents);
                contents.push(Content::new(Role::User, request.current_message));
                client.generate(&contents).await
            }
        }
    }
}

#[derive(Debug)]
pub enum OracleSession {
    Backend(AstroClient),
    Gemini(GeminiSession),
}

impl OracleSession {
    /// Returns the reply text, or the provider's fixed fallback message.
    pub async fn ask(&self, current_message: &str, history: &[ChatMessage]) -> String {
        match self {
            OracleSession::Backend(client) => {
                client.get_astrology_response(current_message, history).await
            }
            OracleSession::Gemini(session) => session.send(current_message, history).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: Provider) -> OracleConfig {
        OracleConfig {
            provider,
            api_base_url: "http://127.0.0.1:1".to_string(),
            gemini_api_key: None,
            gemini_model: "gemini-1.5-flash".to_string(),
            gemini_base_url: "http://127.0.0.1:1".to_string(),
        }
    }

    #[test]
    fn test_provider_selection() {
        assert_eq!(Oracle::new(&config(Provider::Backend)).provider(), Provider::Backend);
        assert_eq!(Oracle::new(&config(Provider::Gemini)).provider(), Provider::Gemini);
    }

    #[tokio::test]
    async fn test_relay_without_key_is_an_error() {
        let oracle = Oracle::new(&config(Provider::Gemini));
        let result = oracle
            .relay(AstroRequest {
                current_message: "Hi".to_string(),
                history: vec![],
            })
            .await;
        assert!(matches!(result, Err(OracleError::MissingApiKey)));
    }
}
