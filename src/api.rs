use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::analysis::{AnalysisResult, DetectedLanguage, Entity, PiiEntity, Sentiment};
use crate::emotion::{Breakdown, EmotionInferer, EmotionLabel, InferenceOutcome};
use crate::error::AnalysisError;
use crate::keywords::{KeywordRegistry, KeywordTableInfo};
use crate::language::TextAnalyzer;
use crate::recommend::{RecommendationEngine, RecommendationKind};

/// Key phrases shown in a report.
pub const MAX_KEY_PHRASES: usize = 8;
/// Entities shown in a report.
pub const MAX_ENTITIES: usize = 10;

pub struct AppState {
    pub analyzer: Arc<dyn TextAnalyzer>,
    pub keywords: KeywordRegistry,
    pub recommendations: RecommendationEngine,
}

impl AppState {
    pub fn new(analyzer: Arc<dyn TextAnalyzer>) -> Self {
        Self {
            analyzer,
            keywords: KeywordRegistry::default(),
            recommendations: RecommendationEngine::default(),
        }
    }

    fn inferer(&self) -> EmotionInferer {
        EmotionInferer::new(self.keywords.snapshot())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn reject(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            success: false,
            message: message.into(),
        }),
    )
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub version: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    #[schema(example = "I'm feeling excited about my new project but also a bit anxious about the deadline...")]
    pub text: String,
    pub recommendation_type: Option<RecommendationKind>,
}

/// Provider output as shown to the user, trimmed for display.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalysisDetails {
    pub sentiment: Option<Sentiment>,
    pub key_phrases: Vec<String>,
    pub entities: Vec<Entity>,
    pub language: Option<DetectedLanguage>,
    pub pii_entities: Vec<PiiEntity>,
}

impl From<&AnalysisResult> for AnalysisDetails {
    fn from(result: &AnalysisResult) -> Self {
        AnalysisDetails {
            sentiment: result.sentiment,
            key_phrases: result.key_phrases.iter().take(MAX_KEY_PHRASES).cloned().collect(),
            entities: result.entities.iter().take(MAX_ENTITIES).cloned().collect(),
            language: result.language.clone(),
            pii_entities: result.pii_entities.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MoodReport {
    pub id: String,
    pub analyzed_at: String,
    pub emotion: EmotionLabel,
    #[schema(example = 0.9)]
    pub confidence: f64,
    #[schema(value_type = Object)]
    pub breakdown: Breakdown,
    pub recommendation_type: RecommendationKind,
    pub recommendation: String,
    pub details: AnalysisDetails,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecommendationQuery {
    /// songs, quotes or activities (default songs).
    #[serde(rename = "type")]
    pub kind: Option<RecommendationKind>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecommendationResponse {
    pub emotion: EmotionLabel,
    pub recommendation_type: RecommendationKind,
    pub recommendation: String,
    pub random: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddRecommendationRequest {
    pub emotion: EmotionLabel,
    pub recommendation_type: RecommendationKind,
    #[schema(example = "🚴 Go for a bike ride")]
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddRecommendationResponse {
    pub success: bool,
    pub custom_count: usize,
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddKeywordRequest {
    pub emotion: EmotionLabel,
    #[schema(example = "elated")]
    pub keyword: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "mood"
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[utoipa::path(
    post,
    path = "/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Mood detected", body = MoodReport),
        (status = 400, description = "No text given", body = ErrorResponse),
        (status = 502, description = "Language service unavailable", body = ErrorResponse)
    ),
    tag = "mood"
)]
pub async fn analyze_mood(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<MoodReport>, ApiError> {
    if req.text.trim().is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "Please enter some text first!"));
    }

    let id = Uuid::new_v4().to_string();
    tracing::info!(%id, chars = req.text.chars().count(), "🔍 Analyzing mood");

    let analysis = state.analyzer.analyze(&req.text).await.map_err(|e| {
        tracing::error!(%id, error = %e, "Analysis error");
        match e {
            AnalysisError::EmptyText => reject(StatusCode::BAD_REQUEST, e.to_string()),
            _ => reject(
                StatusCode::BAD_GATEWAY,
                "Analysis failed. Check your Azure connection.",
            ),
        }
    })?;

    let outcome = state.inferer().analyze(Some(&analysis));
    let kind = req.recommendation_type.unwrap_or_default();
    let recommendation = state.recommendations.get_recommendation(outcome.emotion, kind);

    tracing::info!(%id, emotion = %outcome.emotion, confidence = outcome.confidence, "🎭 Detected emotion");

    Ok(Json(MoodReport {
        id,
        analyzed_at: chrono::Utc::now().to_rfc3339(),
        emotion: outcome.emotion,
        confidence: outcome.confidence,
        breakdown: outcome.breakdown,
        recommendation_type: kind,
        recommendation,
        details: AnalysisDetails::from(&analysis),
    }))
}

/// Run the inferer over an analysis result supplied by the caller.
///
/// The body is read as raw bytes whatever the content type. Anything that
/// doesn't parse to a JSON object is treated as no input and yields neutral.
#[utoipa::path(
    post,
    path = "/emotion/infer",
    request_body = AnalysisResult,
    responses((status = 200, description = "Inference outcome", body = InferenceOutcome)),
    tag = "mood"
)]
pub async fn infer_emotion(State(state): State<Arc<AppState>>, body: Bytes) -> Json<InferenceOutcome> {
    let parsed = serde_json::from_slice::<Value>(&body)
        .ok()
        .and_then(|value| AnalysisResult::from_value(&value));
    if parsed.is_none() {
        tracing::debug!(bytes = body.len(), "Unparseable inference input, treating as absent");
    }
    Json(state.inferer().analyze(parsed.as_ref()))
}

#[utoipa::path(
    get,
    path = "/recommendations/{emotion}",
    params(
        ("emotion" = String, Path, description = "Emotion label, e.g. joy"),
        RecommendationQuery
    ),
    responses(
        (status = 200, description = "A recommendation", body = RecommendationResponse),
        (status = 404, description = "Unknown emotion", body = ErrorResponse)
    ),
    tag = "recommendations"
)]
pub async fn get_recommendation(
    State(state): State<Arc<AppState>>,
    Path(emotion): Path<String>,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<RecommendationResponse>, ApiError> {
    let emotion = emotion
        .parse::<EmotionLabel>()
        .map_err(|e| reject(StatusCode::NOT_FOUND, e.to_string()))?;
    let kind = query.kind.unwrap_or_default();

    Ok(Json(RecommendationResponse {
        emotion,
        recommendation_type: kind,
        recommendation: state.recommendations.get_recommendation(emotion, kind),
        random: false,
    }))
}

#[utoipa::path(
    get,
    path = "/recommendations/random",
    params(RecommendationQuery),
    responses((status = 200, description = "Recommendation for a random emotion", body = RecommendationResponse)),
    tag = "recommendations"
)]
pub async fn random_recommendation(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecommendationQuery>,
) -> Json<RecommendationResponse> {
    let kind = query.kind.unwrap_or_default();
    let (emotion, recommendation) = state.recommendations.random_recommendation(kind);

    Json(RecommendationResponse {
        emotion,
        recommendation_type: kind,
        recommendation,
        random: true,
    })
}

#[utoipa::path(
    post,
    path = "/recommendations",
    request_body = AddRecommendationRequest,
    responses(
        (status = 200, description = "Recommendation added", body = AddRecommendationResponse),
        (status = 400, description = "Empty or duplicate", body = ErrorResponse)
    ),
    tag = "recommendations"
)]
pub async fn add_recommendation(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddRecommendationRequest>,
) -> Result<Json<AddRecommendationResponse>, ApiError> {
    let custom_count = state
        .recommendations
        .add_recommendation(req.emotion, req.recommendation_type, &req.text)
        .map_err(|e| reject(StatusCode::BAD_REQUEST, e.to_string()))?;

    Ok(Json(AddRecommendationResponse {
        success: true,
        custom_count,
        message: format!("Added {} recommendation for {}", req.recommendation_type, req.emotion),
    }))
}

#[utoipa::path(
    get,
    path = "/keywords",
    responses((status = 200, description = "Active keyword table", body = KeywordTableInfo)),
    tag = "keywords"
)]
pub async fn list_keywords(State(state): State<Arc<AppState>>) -> Json<KeywordTableInfo> {
    Json(state.keywords.list())
}

#[utoipa::path(
    post,
    path = "/keywords",
    request_body = AddKeywordRequest,
    responses(
        (status = 200, description = "Keyword added", body = KeywordTableInfo),
        (status = 400, description = "Rejected keyword", body = ErrorResponse)
    ),
    tag = "keywords"
)]
pub async fn add_keyword(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddKeywordRequest>,
) -> Result<Json<KeywordTableInfo>, ApiError> {
    state
        .keywords
        .add_keyword(req.emotion, &req.keyword)
        .map(Json)
        .map_err(|e| reject(StatusCode::BAD_REQUEST, e.to_string()))
}

#[utoipa::path(
    delete,
    path = "/keywords",
    responses((status = 200, description = "Keyword table reset", body = KeywordTableInfo)),
    tag = "keywords"
)]
pub async fn reset_keywords(State(state): State<Arc<AppState>>) -> Json<KeywordTableInfo> {
    Json(state.keywords.reset())
}

/// All API routes over `state`. The Swagger UI is merged in by the binary.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze_mood))
        .route("/emotion/infer", post(infer_emotion))
        .route("/recommendations", post(add_recommendation))
        .route("/recommendations/random", get(random_recommendation))
        .route("/recommendations/:emotion", get(get_recommendation))
        .route(
            "/keywords",
            get(list_keywords).post(add_keyword).delete(reset_keywords),
        )
        .with_state(state)
}
