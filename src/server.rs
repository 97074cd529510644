use crate::card::{BusinessCardData, BusinessCardProcessor, CardScore};
use crate::config::Config;
use crate::engines::{EngineInfo, EngineRegistry};
use crate::error::OcrError;
use crate::mode::DocumentMode;
use crate::ocr::{OcrPipeline, OcrResult};
use crate::preprocessing::{ImagePreprocessingOptions, Preset};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<OcrPipeline>,
    pub cards: BusinessCardProcessor,
    pub config: Arc<Config>,
    pub engines: Arc<Vec<EngineInfo>>,
}

impl AppState {
    pub fn new(pipeline: OcrPipeline, config: Config, engines: Vec<EngineInfo>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            cards: BusinessCardProcessor::default(),
            config: Arc::new(config),
            engines: Arc::new(engines),
        }
    }
}

/// OCR response
#[derive(Serialize)]
pub struct OcrResponse {
    #[serde(flatten)]
    pub result: OcrResult,
    pub mode: &'static str,
    pub engine: &'static str,
    pub processing_time_ms: u64,
}

#[derive(Deserialize)]
pub struct BusinessCardRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct BusinessCardResponse {
    pub card: BusinessCardData,
    pub score: CardScore,
    pub crm: serde_json::Map<String, serde_json::Value>,
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
    pub default_engine: &'static str,
    pub available_engines: Vec<EngineInfo>,
    pub languages: Vec<String>,
    pub modes: Vec<&'static str>,
    pub presets: Vec<&'static str>,
    pub max_file_size_bytes: usize,
}

pub fn router(state: AppState) -> Router {
    let max_file_size = state.config.max_file_size;

    Router::new()
        .route("/ocr", post(handle_ocr))
        .route("/business-card", post(handle_business_card))
        .route("/health", get(handle_health))
        .route("/info", get(handle_info))
        .layer(DefaultBodyLimit::max(max_file_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    let registry = EngineRegistry::new(&config)?;
    let engine = registry.default_engine().ok_or_else(|| {
        OcrError::InitializationError(format!(
            "default engine '{}' is not registered",
            registry.default_name()
        ))
    })?;
    let pipeline = OcrPipeline::new(engine, config.recognition_config());
    let addr = format!("{}:{}", config.host, config.port);

    let app = router(AppState::new(pipeline, config, registry.info()));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Handle OCR requests
async fn handle_ocr(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<OcrResponse>, OcrError> {
    let start = Instant::now();

    let mut file_data: Option<Bytes> = None;
    let mut mode = DocumentMode::Generic;
    let mut preset: Option<Preset> = None;
    let mut flags: Vec<(String, bool)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| OcrError::InvalidRequest(format!("Failed to parse multipart: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "file" {
            file_data = Some(field.bytes().await.map_err(|e| {
                OcrError::InvalidRequest(format!("Failed to read file data: {}", e))
            })?);
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| OcrError::InvalidRequest(format!("Invalid field '{}': {}", name, e)))?;
        match name.as_str() {
            "mode" => mode = DocumentMode::from_str(&value)?,
            "preset" => {
                preset = Some(Preset::from_str(&value).ok_or_else(|| {
                    OcrError::InvalidRequest(format!("Unknown preset: {}", value))
                })?)
            }
            "enhance_contrast" | "correct_rotation" | "denoise_image" | "sharpen_text"
            | "normalize_colors" => {
                let enabled = parse_flag(&value)
                    .ok_or_else(|| OcrError::InvalidRequest(format!("Invalid {}: {}", name, value)))?;
                flags.push((name, enabled));
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    let data = file_data.ok_or(OcrError::MissingFile)?;
    if data.len() > state.config.max_file_size {
        return Err(OcrError::ImageTooLarge {
            size: data.len(),
            max: state.config.max_file_size,
        });
    }

    let mut options: ImagePreprocessingOptions = preset.unwrap_or_default().into();
    for (name, enabled) in flags {
        set_flag(&mut options, &name, enabled);
    }

    let image = image::load_from_memory(&data)
        .map_err(|e| OcrError::ImageConversion(format!("Failed to decode image: {}", e)))?;

    let result = state.pipeline.perform_ocr(&image, options, mode).await;
    let processing_time_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        mode = mode.as_str(),
        processing_time_ms,
        confidence = result.confidence,
        text_len = result.raw_text.len(),
        "OCR request served"
    );

    Ok(Json(OcrResponse {
        result,
        mode: mode.as_str(),
        engine: state.pipeline.engine_name(),
        processing_time_ms,
    }))
}

async fn handle_business_card(
    State(state): State<AppState>,
    Json(request): Json<BusinessCardRequest>,
) -> Json<Option<BusinessCardResponse>> {
    let score = state.cards.score(&request.text);
    let response = state
        .cards
        .detect_business_card(&request.text, None)
        .map(|card| BusinessCardResponse {
            crm: state.cards.generate_crm_data(&card),
            card,
            score,
        });
    Json(response)
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
    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        default_engine: state.pipeline.engine_name(),
        available_engines: state.engines.as_ref().clone(),
        languages: state.pipeline.recognition_config().languages.clone(),
        modes: [DocumentMode::Generic, DocumentMode::BusinessCard, DocumentMode::Receipt]
            .iter()
            .map(|m| m.as_str())
            .collect(),
        presets: [Preset::Default, Preset::Minimal, Preset::Receipt, Preset::BusinessCard]
            .iter()
            .map(|p| p.as_str())
            .collect(),
        max_file_size_bytes: state.config.max_file_size,
    })
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}

fn set_flag(options: &mut ImagePreprocessingOptions, name: &str, enabled: bool) {
    match name {
        "enhance_contrast" => options.enhance_contrast = enabled,
        "correct_rotation" => options.correct_rotation = enabled,
        "denoise_image" => options.denoise_image = enabled,
        "sharpen_text" => options.sharpen_text = enabled,
        "normalize_colors" => options.normalize_colors = enabled,
        _ => {}
    }
}
