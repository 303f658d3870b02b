pub mod astro_client;
pub mod chat;
pub mod constants;
pub mod error;
pub mod gemini;
pub mod message;
pub mod oracle;
pub mod routes;
pub mod web_server;

pub use astro_client::AstroClient;
pub use error::OracleError;
pub use gemini::{GeminiClient, GeminiSession};
pub use message::{format_history, trim_leading_model, ChatMessage, Content, Conversation, Role};
pub use oracle::{Oracle, OracleConfig, OracleSession, Provider};
