use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use moodify::api;
use moodify::config::{LanguageConfig, ServerConfig};
use moodify::language::LanguageClient;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health,
        api::analyze_mood,
        api::infer_emotion,
        api::get_recommendation,
        api::random_recommendation,
        api::add_recommendation,
        api::list_keywords,
        api::add_keyword,
        api::reset_keywords
    ),
    components(
        schemas(
            api::AnalyzeRequest,
            api::AnalysisDetails,
            api::MoodReport,
            api::ErrorResponse,
            api::HealthResponse,
            api::RecommendationResponse,
            api::AddRecommendationRequest,
            api::AddRecommendationResponse,
            api::AddKeywordRequest,
            moodify::analysis::AnalysisResult,
            moodify::analysis::Sentiment,
            moodify::analysis::SentimentLabel,
            moodify::analysis::SentimentScores,
            moodify::analysis::Entity,
            moodify::analysis::DetectedLanguage,
            moodify::analysis::PiiEntity,
            moodify::emotion::EmotionLabel,
            moodify::emotion::InferenceOutcome,
            moodify::keywords::KeywordTableInfo,
            moodify::recommend::RecommendationKind
        )
    ),
    tags(
        (name = "mood", description = "Mood analysis"),
        (name = "recommendations", description = "Mood-based recommendations"),
        (name = "keywords", description = "Emotion keyword management")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let language = LanguageConfig::from_env()?;
    tracing::info!(endpoint = %language.endpoint, api_version = %language.api_version, "Language service configured");
    let client = LanguageClient::new(language)?;

    let state = Arc::new(api::AppState::new(Arc::new(client)));

    let app = api::router(state)
        .merge(SwaggerUi::new("/moodify-swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive());

    let server = ServerConfig::from_env();
    let listener = tokio::net::TcpListener::bind(&server.bind_addr).await?;
    tracing::info!("🧠 Moodify listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
