// Defaults loaded from the environment (after `.env` is read in main) and the
// fixed strings shown to users.

use std::env;

lazy_static::lazy_static! {
    pub static ref API_BASE_URL: String = env::var("ASTRO_API_BASE_URL").unwrap_or_else(|_| "https://astrologic-latest.onrender.com".to_string());
    pub static ref GEMINI_API_KEY: Option<String> = env::var("GEMINI_API_KEY").ok().filter(|k| !k.trim().is_empty());
    pub static ref GEMINI_MODEL: String = env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string());
    pub static ref GEMINI_BASE_URL: String = env::var("GEMINI_BASE_URL").unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());
    pub static ref TEMPLATES_DIR: String = env::var("ASTROLOGIC_TEMPLATES_DIR").unwrap_or_else(|_| "templates".to_string());
    pub static ref STATIC_DIR: String = env::var("ASTROLOGIC_STATIC_DIR").unwrap_or_else(|_| "static".to_string());
}

/// Path of the astro backend chat endpoint, relative to the API base URL.
pub const ASTRO_ENDPOINT: &str = "/api/astro/";

/// Returned by the backend adapter whenever the call fails.
pub const BACKEND_FALLBACK: &str =
    "The cosmic connection has been interrupted. Please try again later.";

/// Returned by the Gemini session whenever the call fails.
pub const GEMINI_FALLBACK: &str =
    "The stars are clouded right now. Please try again in a moment.";

/// Returned by the Gemini session when no credential is configured.
pub const MISSING_API_KEY: &str = "Missing API Key";

/// First message of every conversation. Authored by the bot, so it never
/// reaches the remote API.
pub const WELCOME_MESSAGE: &str =
    "Welcome, seeker. Tell me your sign, or ask what the stars hold for you today.";
