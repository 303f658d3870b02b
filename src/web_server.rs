use anyhow::{Context, Result};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    serve, Json, Router,
};
use minijinja::{path_loader, Environment};
use minijinja_autoreload::AutoReloader;
use serde::{Deserialize, Serialize};
use std::{
    convert::Infallible,
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info, instrument, warn};

use crate::constants::{BACKEND_FALLBACK, GEMINI_FALLBACK, MISSING_API_KEY, WELCOME_MESSAGE};
use crate::error::OracleError;
use crate::message::{AstroRequest, AstroResponse, ChatMessage};
use crate::oracle::{Oracle, Provider};
use crate::routes::{View, VIEWS};

/// Body of `POST /api/chat`, as sent by the chat page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub current_message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

// Shared application state
#[derive(Clone)]
pub struct AppState {
    templates: Arc<AutoReloader>,
    oracle: Arc<Oracle>,
}

impl AppState {
    pub fn new(oracle: Oracle, templates_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates: Arc::new(create_minijinja_env(templates_dir.into())),
            oracle: Arc::new(oracle),
        }
    }
}

// Minijinja Environment setup
fn create_minijinja_env(templates_dir: PathBuf) -> AutoReloader {
    AutoReloader::new(move |notifier| {
        let mut env = Environment::new();
        env.set_loader(path_loader(&templates_dir));
        notifier.watch_path(&templates_dir, true);
        Ok(env)
    })
}

fn render_view(state: &AppState, view: &View) -> Result<Html<String>, (StatusCode, Html<String>)> {
    state
        .templates
        .acquire_env()
        .and_then(|env| {
            env.get_template(view.template).and_then(|tmpl| {
                let context = minijinja::context! {
                    title => view.title,
                    view => view.name,
                    views => VIEWS,
                    welcome => WELCOME_MESSAGE,
                };
                tmpl.render(context)
            })
        })
        .map(Html)
        .map_err(|e| {
            error!(template = view.template, "Failed to get or render template: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<h1>Internal Server Error</h1>".to_string()),
            )
        })
}

#[instrument(skip_all, fields(turns = request.history.len()))]
async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Json<AstroResponse> {
    let session = state.oracle.open_session();
    let response = session.ask(&request.current_message, &request.history).await;
    Json(AstroResponse { response })
}

// Same contract as the hosted backend, so this server can stand in for it.
#[instrument(skip_all, fields(turns = request.history.len()))]
async fn astro_handler(
    State(state): State<AppState>,
    Json(request): Json<AstroRequest>,
) -> Result<Json<AstroResponse>, (StatusCode, Json<AstroResponse>)> {
    match state.oracle.relay(request).await {
        Ok(response) => Ok(Json(AstroResponse { response })),
        Err(OracleError::MissingApiKey) => {
            warn!("Astro request rejected: GEMINI_API_KEY not set");
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(AstroResponse {
                    response: MISSING_API_KEY.to_string(),
                }),
            ))
        }
        Err(e) => {
            error!(error = %e, "Error consulting the stars");
            let fallback = match state.oracle.provider() {
                Provider::Backend => BACKEND_FALLBACK,
                Provider::Gemini => GEMINI_FALLBACK,
            };
            Err((
                StatusCode::BAD_GATEWAY,
                Json(AstroResponse {
                    response: fallback.to_string(),
                }),
            ))
        }
    }
}

async fn not_found_handler() -> (StatusCode, Html<&'static str>) {
    (StatusCode::NOT_FOUND, Html("<h1>Lost among the stars</h1>"))
}

/// Builds the application router: the four views, the JSON endpoints and
/// static assets.
pub fn build_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    // Serve static files from the configured directory
    let static_files_service = ServeDir::new(static_dir.as_ref()).not_found_service(
        tower::service_fn(|_req: Request| async {
            Ok::<_, Infallible>((StatusCode::NOT_FOUND, "Not Found").into_response())
        }),
    );

    let mut app = Router::new();
    for view in VIEWS.iter() {
        app = app.route(
            view.path,
            get(move |State(state): State<AppState>| async move { render_view(&state, view) }),
        );
    }

    app.route("/api/chat", post(chat_handler))
        .route("/api/astro/", post(astro_handler))
        .nest_service("/static", static_files_service)
        .fallback(not_found_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http()) // Add request logging
}

pub async fn start_web_server(port: u16, state: AppState, static_dir: PathBuf) -> Result<()> {
    let app = build_router(state, &static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Web server listening on http://{}", addr);

    // Bind using tokio::net::TcpListener
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}
