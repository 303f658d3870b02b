use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use astrologic::{chat, constants, web_server, Oracle, OracleConfig, Provider};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Which remote API answers the chat.
    #[arg(long, value_enum, global = true, env = "ASTROLOGIC_PROVIDER", default_value_t = Provider::Backend)]
    provider: Provider,

    /// Base URL of the astro backend.
    #[arg(long, global = true, env = "ASTRO_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Gemini model used by the `gemini` provider.
    #[arg(long, global = true, env = "GEMINI_MODEL")]
    gemini_model: Option<String>,

    /// Base URL of the Gemini API.
    #[arg(long, global = true, env = "GEMINI_BASE_URL")]
    gemini_base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

// Define the available subcommands
#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the web server with the home, login, chat and payment pages.
    Serve {
        #[arg(long, default_value_t = 8080, help = "Port for the web server.")]
        port: u16,
        #[arg(long, help = "Directory holding the page templates.")]
        templates: Option<PathBuf>,
        #[arg(long = "static", help = "Directory holding static assets.")]
        static_dir: Option<PathBuf>,
    },
    /// Chat with the astrologer in the terminal.
    Chat,
    /// Ask a single question and print the answer.
    Ask {
        /// The question for the stars.
        message: String,
    },
}

impl Cli {
    fn oracle_config(&self) -> OracleConfig {
        let defaults = OracleConfig::default();
        OracleConfig {
            provider: self.provider,
            api_base_url: self.api_base_url.clone().unwrap_or(defaults.api_base_url),
            gemini_api_key: defaults.gemini_api_key,
            gemini_model: self.gemini_model.clone().unwrap_or(defaults.gemini_model),
            gemini_base_url: self.gemini_base_url.clone().unwrap_or(defaults.gemini_base_url),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for environment variables like API keys)
    dotenvy::dotenv().ok();

    // Reads log level from RUST_LOG environment variable (e.g., RUST_LOG=info,astrologic=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("Astrologic starting with command: {:?}", cli.command);

    let oracle = Oracle::new(&cli.oracle_config());

    match cli.command {
        Commands::Serve {
            port,
            templates,
            static_dir,
        } => {
            let templates = templates.unwrap_or_else(|| PathBuf::from(constants::TEMPLATES_DIR.as_str()));
            let static_dir = static_dir.unwrap_or_else(|| PathBuf::from(constants::STATIC_DIR.as_str()));
            info!(?templates, ?static_dir, provider = ?oracle.provider(), "Starting web server on port {}...", port);

            let state = web_server::AppState::new(oracle, templates);
            let mut web_server_handle =
                tokio::spawn(web_server::start_web_server(port, state, static_dir));

            let ctrl_c = tokio::signal::ctrl_c();
            // Pin the ctrl_c future to the stack so its address is stable
            tokio::pin!(ctrl_c);

            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Ctrl-C received, initiating shutdown...");
                }
                res = &mut web_server_handle => {
                    res.context("Web server task failed")??;
                    info!("Web server task completed unexpectedly.");
                }
            }

            if !web_server_handle.is_finished() {
                info!("Aborting web server task...");
                web_server_handle.abort();
            }
            info!("Shutdown complete.");
        }
        Commands::Chat => {
            info!("Starting interactive chat session...");
            let session = oracle.open_session();
            let conversation = chat::run_terminal_chat(&session)
                .await
                .context("Chat session failed")?;
            info!(messages = conversation.len(), "Chat session finished.");
        }
        Commands::Ask { message } => {
            let session = oracle.open_session();
            let reply = session.ask(&message, &[]).await;
            println!("{}", reply);
        }
    }

    Ok(())
}
