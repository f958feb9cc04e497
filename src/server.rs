use crate::config::Config;
use crate::corpus::Corpus;
use crate::decoder::{DecodeOptions, Decoder, OutputMode, Solution};
use crate::error::CaptchaError;
use crate::preprocessing::StepTiming;
use crate::source::{BytesSource, ImageSource};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub decoder: Arc<Decoder>,
    pub config: Arc<Config>,
}

/// Solve response
#[derive(Serialize)]
pub struct SolveResponse {
    pub solution: Solution,
    pub status: String,
    pub processing_time_ms: u64,
    pub steps: Vec<StepTiming>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Server info response
#[derive(Serialize)]
pub struct InfoResponse {
    pub version: String,
    pub corpus_letters: BTreeMap<char, usize>,
    pub corpus_size: usize,
    pub default_threshold: u8,
    pub default_output_mode: OutputMode,
    pub max_file_size_bytes: usize,
}

/// Build the router around an already loaded decoder
pub fn router(state: AppState) -> Router {
    let max_file_size = state.config.max_file_size;

    Router::new()
        .route("/solve", post(handle_solve))
        .route("/health", get(handle_health))
        .route("/info", get(handle_info))
        .layer(DefaultBodyLimit::max(max_file_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    let corpus = Corpus::load(&config.corpus_dir)?;
    let addr = format!("{}:{}", config.host, config.port);

    let state = AppState {
        decoder: Arc::new(Decoder::new(Arc::new(corpus))),
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Handle solve requests
async fn handle_solve(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SolveResponse>, CaptchaError> {
    let start = Instant::now();

    let mut file_data: Option<Bytes> = None;
    let mut content_type: Option<String> = None;
    let mut options = state.config.defaults;

    // Parse multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| CaptchaError::InvalidRequest(format!("Failed to parse multipart: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => {
                content_type = field.content_type().map(|s| s.to_string());
                file_data = Some(field.bytes().await.map_err(|e| {
                    CaptchaError::InvalidRequest(format!("Failed to read file data: {}", e))
                })?);
            }
            "threshold" => {
                let text = field.text().await.map_err(|e| {
                    CaptchaError::InvalidRequest(format!("Invalid threshold: {}", e))
                })?;
                options.threshold = parse_threshold(&text)?;
            }
            "output_mode" => {
                let text = field.text().await.map_err(|e| {
                    CaptchaError::InvalidRequest(format!("Invalid output mode: {}", e))
                })?;
                options.output_mode = text.trim().parse()?;
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    let data = file_data.ok_or(CaptchaError::MissingFile)?;

    if data.len() > state.config.max_file_size {
        return Err(CaptchaError::ImageTooLarge {
            size: data.len(),
            max: state.config.max_file_size,
        });
    }

    let mime = content_type.unwrap_or_else(|| "application/octet-stream".to_string());
    if !mime.starts_with("image/") {
        tracing::warn!("Received file with content type: {}", mime);
    }

    let decoder = state.decoder.clone();
    let decoded = tokio::task::spawn_blocking(move || {
        let image = BytesSource::new(data.to_vec()).load()?;
        decoder.decode(&image, &options)
    })
    .await
    .map_err(|e| CaptchaError::Internal(format!("Decode task failed: {}", e)))??;

    let processing_time_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        "Captcha decoded in {}ms, status: {}",
        processing_time_ms,
        decoded.result.status()
    );

    Ok(Json(SolveResponse {
        solution: decoded.render(options.output_mode),
        status: decoded.result.status().to_string(),
        processing_time_ms,
        steps: decoded.steps,
    }))
}

fn parse_threshold(text: &str) -> Result<u8, CaptchaError> {
    text.trim().parse::<u8>().map_err(|_| {
        CaptchaError::InvalidConfig(format!("Threshold must be 0-255, got {:?}", text))
    })
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle info requests
async fn handle_info(State(state): State<AppState>) -> impl IntoResponse {
    let corpus = state.decoder.corpus();
    let DecodeOptions {
        threshold,
        output_mode,
    } = state.config.defaults;

    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        corpus_letters: corpus.letter_counts(),
        corpus_size: corpus.len(),
        default_threshold: threshold,
        default_output_mode: output_mode,
        max_file_size_bytes: state.config.max_file_size,
    })
}
