//! Azure AI Language client.
//!
//! One text is analysed with five tasks against the `analyze-text` REST
//! endpoint. A task that fails degrades to an empty/neutral default so the
//! rest of the pipeline still gets something to work with; only when every
//! task fails is the whole analysis reported as an error.

use axum::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::analysis::{
    AnalysisResult, DetectedLanguage, Entity, PiiEntity, Sentiment, SentimentLabel,
    SentimentScores,
};
use crate::config::LanguageConfig;
use crate::error::AnalysisError;

/// Anything that can turn text into an [`AnalysisResult`].
#[async_trait]
pub trait TextAnalyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<AnalysisResult, AnalysisError>;
}

/// The five `analyze-text` task kinds we issue per text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Sentiment,
    KeyPhrases,
    Entities,
    Language,
    Pii,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Sentiment => "SentimentAnalysis",
            TaskKind::KeyPhrases => "KeyPhraseExtraction",
            TaskKind::Entities => "EntityRecognition",
            TaskKind::Language => "LanguageDetection",
            TaskKind::Pii => "PiiEntityRecognition",
        }
    }
}

/// Request body for a single-document task.
pub fn task_body(kind: TaskKind, text: &str) -> Value {
    json!({
        "kind": kind.as_str(),
        "parameters": { "modelVersion": "latest" },
        "analysisInput": {
            "documents": [{ "id": "1", "text": text }]
        }
    })
}

// ----------------------------------------------------------------------------
// Response documents
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SentimentDocument {
    sentiment: SentimentLabel,
    confidence_scores: SentimentScores,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyPhraseDocument {
    #[serde(default)]
    key_phrases: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityItem {
    text: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    confidence_score: f64,
}

#[derive(Debug, Deserialize)]
struct EntityDocument {
    #[serde(default)]
    entities: Vec<EntityItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LanguageItem {
    name: String,
    iso6391_name: String,
    #[serde(default)]
    confidence_score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LanguageDocument {
    detected_language: LanguageItem,
}

/// Pull the single document out of an `analyze-text` response.
pub fn first_document(payload: &Value) -> Result<&Value, AnalysisError> {
    let results = &payload["results"];
    if let Some(doc) = results["documents"].as_array().and_then(|docs| docs.first()) {
        return Ok(doc);
    }
    let message = results["errors"]
        .as_array()
        .and_then(|errors| errors.first())
        .and_then(|err| {
            let inner = &err["error"];
            inner["innererror"]["message"]
                .as_str()
                .or_else(|| inner["message"].as_str())
        })
        .unwrap_or("response contained no documents");
    Err(AnalysisError::Document(message.to_string()))
}

fn decode<T: DeserializeOwned>(payload: &Value) -> Result<T, AnalysisError> {
    let doc = first_document(payload)?;
    Ok(T::deserialize(doc)?)
}

pub fn parse_sentiment(payload: &Value) -> Result<Sentiment, AnalysisError> {
    let doc: SentimentDocument = decode(payload)?;
    Ok(Sentiment {
        label: doc.sentiment,
        scores: doc.confidence_scores,
    })
}

pub fn parse_key_phrases(payload: &Value) -> Result<Vec<String>, AnalysisError> {
    let doc: KeyPhraseDocument = decode(payload)?;
    Ok(doc.key_phrases)
}

pub fn parse_entities(payload: &Value) -> Result<Vec<Entity>, AnalysisError> {
    let doc: EntityDocument = decode(payload)?;
    Ok(doc
        .entities
        .into_iter()
        .map(|e| Entity {
            text: e.text,
            category: e.category,
            confidence: e.confidence_score,
        })
        .collect())
}

pub fn parse_language(payload: &Value) -> Result<DetectedLanguage, AnalysisError> {
    let doc: LanguageDocument = decode(payload)?;
    Ok(DetectedLanguage {
        name: doc.detected_language.name,
        code: doc.detected_language.iso6391_name,
        confidence: doc.detected_language.confidence_score,
    })
}

pub fn parse_pii(payload: &Value) -> Result<Vec<PiiEntity>, AnalysisError> {
    let doc: EntityDocument = decode(payload)?;
    Ok(doc
        .entities
        .into_iter()
        .map(|e| PiiEntity {
            text: e.text,
            category: e.category,
        })
        .collect())
}

/// Per-task outcomes merged into one result, with the documented defaults
/// filled in for failed tasks.
pub struct TaskOutcomes {
    pub sentiment: Result<Sentiment, AnalysisError>,
    pub key_phrases: Result<Vec<String>, AnalysisError>,
    pub entities: Result<Vec<Entity>, AnalysisError>,
    pub language: Result<DetectedLanguage, AnalysisError>,
    pub pii_entities: Result<Vec<PiiEntity>, AnalysisError>,
}

impl TaskOutcomes {
    pub fn merge(self) -> Result<AnalysisResult, AnalysisError> {
        let mut failures = 0;
        let mut last_error = None;

        let mut settle = |kind: TaskKind, outcome: Result<(), AnalysisError>| {
            if let Err(e) = outcome {
                tracing::error!(task = kind.as_str(), error = %e, "⚠️ Analysis task failed");
                failures += 1;
                last_error = Some(e);
            }
        };

        let sentiment = split(self.sentiment, Sentiment::fallback);
        settle(TaskKind::Sentiment, sentiment.1);
        let key_phrases = split(self.key_phrases, Vec::new);
        settle(TaskKind::KeyPhrases, key_phrases.1);
        let entities = split(self.entities, Vec::new);
        settle(TaskKind::Entities, entities.1);
        let language = split(self.language, DetectedLanguage::default);
        settle(TaskKind::Language, language.1);
        let pii_entities = split(self.pii_entities, Vec::new);
        settle(TaskKind::Pii, pii_entities.1);

        if failures == 5 {
            if let Some(e) = last_error {
                return Err(AnalysisError::Unavailable(Box::new(e)));
            }
        }

        Ok(AnalysisResult {
            sentiment: Some(sentiment.0),
            key_phrases: key_phrases.0,
            entities: entities.0,
            language: Some(language.0),
            pii_entities: pii_entities.0,
        })
    }
}

fn split<T>(
    outcome: Result<T, AnalysisError>,
    fallback: impl FnOnce() -> T,
) -> (T, Result<(), AnalysisError>) {
    match outcome {
        Ok(value) => (value, Ok(())),
        Err(e) => (fallback(), Err(e)),
    }
}

// ----------------------------------------------------------------------------
// HTTP client
// ----------------------------------------------------------------------------

/// `TextAnalyzer` backed by the Azure AI Language REST API.
pub struct LanguageClient {
    http: reqwest::Client,
    config: LanguageConfig,
}

impl LanguageClient {
    pub fn new(config: LanguageConfig) -> Result<Self, AnalysisError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn analyze_url(&self) -> String {
        format!(
            "{}/language/:analyze-text?api-version={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.api_version
        )
    }

    async fn run_task(&self, kind: TaskKind, text: &str) -> Result<Value, AnalysisError> {
        let response = self
            .http
            .post(self.analyze_url())
            .header("Ocp-Apim-Subscription-Key", &self.config.key)
            .json(&task_body(kind, text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Service {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<Value>().await?)
    }

    async fn task<T>(
        &self,
        kind: TaskKind,
        text: &str,
        parse: fn(&Value) -> Result<T, AnalysisError>,
    ) -> Result<T, AnalysisError> {
        let payload = self.run_task(kind, text).await?;
        parse(&payload)
    }
}

#[async_trait]
impl TextAnalyzer for LanguageClient {
    async fn analyze(&self, text: &str) -> Result<AnalysisResult, AnalysisError> {
        if text.trim().is_empty() {
            tracing::warn!("Empty text provided for analysis");
            return Err(AnalysisError::EmptyText);
        }

        let (sentiment, key_phrases, entities, language, pii_entities) = tokio::join!(
            self.task(TaskKind::Sentiment, text, parse_sentiment),
            self.task(TaskKind::KeyPhrases, text, parse_key_phrases),
            self.task(TaskKind::Entities, text, parse_entities),
            self.task(TaskKind::Language, text, parse_language),
            self.task(TaskKind::Pii, text, parse_pii),
        );

        let result = TaskOutcomes {
            sentiment,
            key_phrases,
            entities,
            language,
            pii_entities,
        }
        .merge()?;

        tracing::info!(
            key_phrases = result.key_phrases.len(),
            entities = result.entities.len(),
            pii_entities = result.pii_entities.len(),
            "🧠 Successfully analyzed text"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(document: Value) -> Value {
        json!({
            "kind": "Results",
            "results": { "documents": [document], "errors": [], "modelVersion": "2023-04-01" }
        })
    }

    #[test]
    fn test_task_body_shape() {
        let body = task_body(TaskKind::KeyPhrases, "I feel great");
        assert_eq!(body["kind"], "KeyPhraseExtraction");
        assert_eq!(body["analysisInput"]["documents"][0]["text"], "I feel great");
        assert_eq!(body["analysisInput"]["documents"][0]["id"], "1");
    }

    #[test]
    fn test_parse_sentiment() {
        let payload = wrap(json!({
            "id": "1",
            "sentiment": "mixed",
            "confidenceScores": {"positive": 0.6, "neutral": 0.1, "negative": 0.3},
            "sentences": []
        }));
        let sentiment = parse_sentiment(&payload).unwrap();
        assert_eq!(sentiment.label, SentimentLabel::Mixed);
        assert_eq!(sentiment.scores.positive, 0.6);
        assert_eq!(sentiment.scores.negative, 0.3);
    }

    #[test]
    fn test_parse_key_phrases_and_entities() {
        let payload = wrap(json!({"id": "1", "keyPhrases": ["new project", "deadline"]}));
        assert_eq!(parse_key_phrases(&payload).unwrap(), vec!["new project", "deadline"]);

        let payload = wrap(json!({
            "id": "1",
            "entities": [{
                "text": "Seattle", "category": "Location", "offset": 10,
                "length": 7, "confidenceScore": 0.99
            }]
        }));
        let entities = parse_entities(&payload).unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].text, "Seattle");
        assert_eq!(entities[0].category, "Location");
        assert_eq!(entities[0].confidence, 0.99);
    }

    #[test]
    fn test_parse_language_and_pii() {
        let payload = wrap(json!({
            "id": "1",
            "detectedLanguage": {"name": "French", "iso6391Name": "fr", "confidenceScore": 1.0}
        }));
        let language = parse_language(&payload).unwrap();
        assert_eq!(language.name, "French");
        assert_eq!(language.code, "fr");

        let payload = wrap(json!({
            "id": "1",
            "redactedText": "Mail ****",
            "entities": [{"text": "me@example.com", "category": "Email", "confidenceScore": 0.8}]
        }));
        let pii = parse_pii(&payload).unwrap();
        assert_eq!(pii[0].category, "Email");
    }

    #[test]
    fn test_document_error_surfaces() {
        let payload = json!({
            "results": {
                "documents": [],
                "errors": [{"id": "1", "error": {"code": "InvalidArgument", "message": "Invalid document",
                    "innererror": {"code": "InvalidDocument", "message": "Document text is empty."}}}]
            }
        });
        match parse_sentiment(&payload) {
            Err(AnalysisError::Document(msg)) => assert_eq!(msg, "Document text is empty."),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(
            parse_key_phrases(&json!({})),
            Err(AnalysisError::Document(_))
        ));
    }

    #[test]
    fn test_merge_fills_defaults() {
        let outcomes = TaskOutcomes {
            sentiment: Err(AnalysisError::Document("boom".into())),
            key_phrases: Ok(vec!["happy".to_string()]),
            entities: Err(AnalysisError::Document("boom".into())),
            language: Err(AnalysisError::Document("boom".into())),
            pii_entities: Ok(vec![]),
        };
        let result = outcomes.merge().unwrap();
        assert_eq!(result.sentiment, Some(Sentiment::fallback()));
        assert_eq!(result.key_phrases, vec!["happy"]);
        assert!(result.entities.is_empty());
        assert_eq!(result.language, Some(DetectedLanguage::default()));
    }

    #[test]
    fn test_merge_all_failed() {
        let fail = || AnalysisError::Document("down".into());
        let outcomes = TaskOutcomes {
            sentiment: Err(fail()),
            key_phrases: Err(fail()),
            entities: Err(fail()),
            language: Err(fail()),
            pii_entities: Err(fail()),
        };
        assert!(matches!(outcomes.merge(), Err(AnalysisError::Unavailable(_))));
    }

    #[test]
    fn test_analyze_url() {
        let client = LanguageClient::new(LanguageConfig::new("https://x.example.com/", "k")).unwrap();
        assert_eq!(
            client.analyze_url(),
            "https://x.example.com/language/:analyze-text?api-version=2023-04-01"
        );
    }

    #[tokio::test]
    async fn test_empty_text_rejected_without_network() {
        let client = LanguageClient::new(LanguageConfig::new("http://127.0.0.1:9", "k")).unwrap();
        assert!(matches!(
            client.analyze("   ").await,
            Err(AnalysisError::EmptyText)
        ));
    }

    mod http {
        use super::*;
        use wiremock::matchers::{body_partial_json, header, method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        const KEY: &str = "test-key";

        fn client_for(server: &MockServer) -> LanguageClient {
            LanguageClient::new(LanguageConfig::new(server.uri(), KEY)).unwrap()
        }

        fn task_mock(kind: TaskKind) -> wiremock::MockBuilder {
            Mock::given(method("POST"))
                .and(path("/language/:analyze-text"))
                .and(query_param("api-version", "2023-04-01"))
                .and(header("Ocp-Apim-Subscription-Key", KEY))
                .and(body_partial_json(json!({"kind": kind.as_str()})))
        }

        fn document_for(kind: TaskKind) -> Value {
            match kind {
                TaskKind::Sentiment => json!({
                    "id": "1",
                    "sentiment": "negative",
                    "confidenceScores": {"positive": 0.05, "neutral": 0.15, "negative": 0.8}
                }),
                TaskKind::KeyPhrases => json!({"id": "1", "keyPhrases": ["furious commute"]}),
                TaskKind::Entities => json!({
                    "id": "1",
                    "entities": [{"text": "Seattle", "category": "Location", "confidenceScore": 0.97}]
                }),
                TaskKind::Language => json!({
                    "id": "1",
                    "detectedLanguage": {"name": "English", "iso6391Name": "en", "confidenceScore": 1.0}
                }),
                TaskKind::Pii => json!({
                    "id": "1",
                    "entities": [{"text": "me@example.com", "category": "Email", "confidenceScore": 0.8}]
                }),
            }
        }

        const ALL_TASKS: [TaskKind; 5] = [
            TaskKind::Sentiment,
            TaskKind::KeyPhrases,
            TaskKind::Entities,
            TaskKind::Language,
            TaskKind::Pii,
        ];

        #[tokio::test]
        async fn test_analyze_issues_five_tasks() {
            let server = MockServer::start().await;
            for kind in ALL_TASKS {
                task_mock(kind)
                    .and(body_partial_json(json!({
                        "analysisInput": {"documents": [{"id": "1", "text": "Stuck in traffic, so furious"}]}
                    })))
                    .respond_with(ResponseTemplate::new(200).set_body_json(wrap(document_for(kind))))
                    .expect(1)
                    .mount(&server)
                    .await;
            }

            let result = client_for(&server)
                .analyze("Stuck in traffic, so furious")
                .await
                .unwrap();

            let sentiment = result.sentiment.unwrap();
            assert_eq!(sentiment.label, SentimentLabel::Negative);
            assert_eq!(sentiment.scores.negative, 0.8);
            assert_eq!(result.key_phrases, vec!["furious commute"]);
            assert_eq!(result.entities[0].text, "Seattle");
            assert_eq!(result.language.unwrap().code, "en");
            assert_eq!(result.pii_entities[0].category, "Email");
        }

        #[tokio::test]
        async fn test_failed_task_degrades_to_default() {
            let server = MockServer::start().await;
            for kind in ALL_TASKS {
                let response = if kind == TaskKind::Sentiment {
                    ResponseTemplate::new(500).set_body_string("internal error")
                } else {
                    ResponseTemplate::new(200).set_body_json(wrap(document_for(kind)))
                };
                task_mock(kind).respond_with(response).expect(1).mount(&server).await;
            }

            let result = client_for(&server).analyze("so furious").await.unwrap();

            assert_eq!(result.sentiment, Some(Sentiment::fallback()));
            assert_eq!(result.key_phrases, vec!["furious commute"]);
            assert_eq!(result.entities.len(), 1);
        }

        #[tokio::test]
        async fn test_every_task_failing_is_unavailable() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/language/:analyze-text"))
                .respond_with(ResponseTemplate::new(500).set_body_string("service down"))
                .expect(5)
                .mount(&server)
                .await;

            match client_for(&server).analyze("hello").await {
                Err(AnalysisError::Unavailable(inner)) => match *inner {
                    AnalysisError::Service { status, message } => {
                        assert_eq!(status, 500);
                        assert_eq!(message, "service down");
                    }
                    other => panic!("unexpected inner error: {:?}", other),
                },
                other => panic!("unexpected: {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_wrong_key_is_rejected_by_service() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/language/:analyze-text"))
                .respond_with(ResponseTemplate::new(401).set_body_string("Access denied"))
                .mount(&server)
                .await;

            let client = LanguageClient::new(LanguageConfig::new(server.uri(), "wrong")).unwrap();
            assert!(matches!(
                client.run_task(TaskKind::Sentiment, "hi").await,
                Err(AnalysisError::Service { status: 401, .. })
            ));
        }
    }
}
