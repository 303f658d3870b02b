//! Direct chat session against the Gemini `generateContent` API.
//!
//! The session behaves like the hosted SDK chat session: it is seeded once
//! from the caller's history and then keeps its own turns. A failed call
//! discards the session so the next message starts fresh.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, instrument, warn};

use crate::constants::{GEMINI_FALLBACK, MISSING_API_KEY};
use crate::error::OracleError;
use crate::message::{format_history, ChatMessage, Content, Role};

pub const SYSTEM_PROMPT: &str = r#"Você é Astrologic, uma astróloga experiente, acolhedora e mística.
Responda sempre no idioma em que o usuário escrever.

Sobre o conteúdo:
- Fale de signos, planetas, casas, aspectos, trânsitos e mapas astrais.
- Quando o usuário informar data, hora e local de nascimento, interprete o Sol, a Lua e o Ascendente.
- Se faltar algum dado para uma leitura, pergunte por ele com gentileza.
- Não faça diagnósticos médicos, jurídicos ou financeiros; sugira procurar um profissional.

Sobre o formato:
- Respostas curtas, de no máximo três parágrafos.
- Use um tom poético, mas claro.
- Termine com um breve conselho dos astros para o dia."#;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: SystemInstruction<'a>,
    contents: &'a [Content],
}

#[derive(Serialize)]
struct SystemInstruction<'a> {
    parts: [TextPart<'a>; 1],
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    text: Option<String>,
}

/// Stateless client for `POST {base}/v1beta/models/{model}:generateContent`.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            base_url: base_url.into(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Sends `contents` under the fixed system prompt and returns the reply text.
    #[instrument(skip(self, contents), fields(model = %self.model, turns = contents.len()))]
    pub async fn generate(&self, contents: &[Content]) -> Result<String, OracleError> {
        let key = self.api_key.as_deref().ok_or(OracleError::MissingApiKey)?;
        let url = self.endpoint();

        let body = GenerateRequest {
            system_instruction: SystemInstruction {
                parts: [TextPart {
                    text: SYSTEM_PROMPT,
                }],
            },
            contents,
        };

        debug!(%url, "Sending Gemini request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await
            .map_err(|source| OracleError::Transport {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Status { status, body });
        }

        let parsed = response
            .json::<GenerateResponse>()
            .await
            .map_err(OracleError::Decode)?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(OracleError::EmptyReply);
        }
        Ok(text)
    }
}

/// A chat session holding its own turns between calls.
#[derive(Debug)]
pub struct GeminiSession {
    client: GeminiClient,
    turns: Mutex<Option<Vec<Content>>>,
}

impl GeminiSession {
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client,
            turns: Mutex::new(None),
        }
    }

    /// Whether the session currently holds turns from earlier calls.
    pub async fn is_active(&self) -> bool {
        self.turns.lock().await.is_some()
    }

    /// Sends `current_message`. The session is seeded from `history` only when
    /// it has no turns of its own yet.
    ///
    /// Never fails: a missing key yields [`MISSING_API_KEY`], any other error
    /// resets the session and yields [`GEMINI_FALLBACK`].
    pub async fn send(&self, current_message: &str, history: &[ChatMessage]) -> String {
        if !self.client.has_api_key() {
            warn!("GEMINI_API_KEY not set");
            return MISSING_API_KEY.to_string();
        }

        let mut guard = self.turns.lock().await;
        let turns = guard.get_or_insert_with(|| format_history(history));

        let user_turn = Content::new(Role::User, current_message);
        let mut contents = turns.clone();
        contents.push(user_turn.clone());

        match self.client.generate(&contents).await {
            Ok(reply) => {
                turns.push(user_turn);
                turns.push(Content::new(Role::Model, reply.clone()));
                reply
            }
            Err(e) => {
                error!(error = %e, "Error consulting the stars");
                *guard = None;
                GEMINI_FALLBACK.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_counts_as_missing() {
        let client = GeminiClient::new(Some("   ".to_string()), "m", "http://localhost");
        assert!(!client.has_api_key());
    }

    #[test]
    fn test_endpoint() {
        let client = GeminiClient::new(None, "gemini-1.5-flash", "https://example.com/");
        assert_eq!(
            client.endpoint(),
            "https://example.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_shape() {
        let contents = vec![Content::new(Role::User, "Oi")];
        let body = GenerateRequest {
            system_instruction: SystemInstruction {
                parts: [TextPart { text: "prompt" }],
            },
            contents: &contents,
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "systemInstruction": { "parts": [{ "text": "prompt" }] },
                "contents": [{ "role": "user", "parts": [{ "text": "Oi" }] }]
            })
        );
    }

    #[tokio::test]
    async fn test_missing_key_leaves_session_untouched() {
        let session = GeminiSession::new(GeminiClient::new(None, "m", "http://127.0.0.1:9"));
        assert_eq!(session.send("Hello", &[]).await, MISSING_API_KEY);
        assert!(!session.is_active().await);
    }
}
