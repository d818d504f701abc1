use crate::core::fallback::{sanitise_score, CompatibilityScorer, ScoringError};
use crate::core::normalizer::NormalizedProfile;
use crate::models::{ConversationAnalysis, DateSuggestion};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the LLM provider
#[derive(Debug, Error)]
pub enum AiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("API returned no choices")]
    EmptyResponse,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("No API key configured")]
    MissingApiKey,
}

impl From<AiError> for ScoringError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::RequestError(e) if e.is_timeout() => ScoringError::Request(format!("timeout: {}", e)),
            AiError::RequestError(e) => ScoringError::Request(e.to_string()),
            AiError::ApiError { status, body } => {
                ScoringError::Request(format!("status {}: {}", status, body))
            }
            AiError::EmptyResponse => ScoringError::Parse("empty response".to_string()),
            AiError::InvalidResponse(msg) => ScoringError::Parse(msg),
            AiError::MissingApiKey => ScoringError::Unavailable("missing API key".to_string()),
        }
    }
}

/// Model identifiers per task.
#[derive(Debug, Clone)]
pub struct AiModels {
    pub scoring: String,
    pub generation: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

const SCORING_TEMPERATURE: f64 = 0.2;
const ICE_BREAKER_TEMPERATURE: f64 = 0.9;
const DATE_TEMPERATURE: f64 = 0.8;
const ANALYSIS_TEMPERATURE: f64 = 0.7;

/// OpenRouter-compatible chat-completions client
///
/// Handles every call the service makes to the language model:
/// - Compatibility scoring (as a [`CompatibilityScorer`])
/// - Ice-breaker messages
/// - Date suggestions
/// - Conversation analysis
#[derive(Clone)]
pub struct OpenRouterClient {
    endpoint: String,
    api_key: String,
    app_name: String,
    models: AiModels,
    max_tokens: u32,
    client: Client,
}

impl OpenRouterClient {
    /// Create a new client
    pub fn new(
        endpoint: String,
        api_key: String,
        app_name: String,
        models: AiModels,
        max_tokens: u32,
        timeout: Duration,
    ) -> Result<Self, AiError> {
        if api_key.trim().is_empty() {
            return Err(AiError::MissingApiKey);
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint,
            api_key,
            app_name,
            models,
            max_tokens,
            client,
        })
    }

    pub fn models(&self) -> &AiModels {
        &self.models
    }

    /// Send a single-turn prompt and return the reply text.
    async fn complete(&self, model: &str, prompt: String, temperature: f64) -> Result<String, AiError> {
        let request = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            max_tokens: self.max_tokens,
            temperature,
        };

        tracing::debug!("Calling model {} at {}", model, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("X-Title", &self.app_name)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(AiError::ApiError { status, body });
        }

        let parsed: ChatResponse = response.json().await?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(AiError::EmptyResponse)
    }

    /// Ask the scoring model for a 0-100 compatibility score.
    pub async fn compatibility(
        &self,
        a: &NormalizedProfile,
        b: &NormalizedProfile,
    ) -> Result<f64, AiError> {
        let prompt = format!(
            "Rate the romantic compatibility of these two dating profiles on a scale \
             from 0 to 100. Consider age, height, shared hobbies, education, lifestyle \
             and how serious each person is about a relationship.\n\n\
             Person 1: {}\nPerson 2: {}\n\n\
             Reply with the number only.",
            a.to_prompt_value(),
            b.to_prompt_value()
        );

        let reply = self
            .complete(&self.models.scoring, prompt, SCORING_TEMPERATURE)
            .await?;

        parse_score(&reply)
            .ok_or_else(|| AiError::InvalidResponse(format!("no score in reply: {}", reply.trim())))
    }

    /// Short, friendly opening line for two matched users.
    pub async fn ice_breaker(
        &self,
        a: &NormalizedProfile,
        b: &NormalizedProfile,
    ) -> Result<String, AiError> {
        let prompt = format!(
            "Write a natural, warm ice-breaker message between two people.\n\n\
             Person 1: {}\nPerson 2: {}\n\n\
             The message should:\n\
             - be short (1-2 sentences)\n\
             - focus on shared interests\n\
             - sound natural and sincere\n\
             - contain a question",
            a.to_prompt_value(),
            b.to_prompt_value()
        );

        let reply = self
            .complete(&self.models.generation, prompt, ICE_BREAKER_TEMPERATURE)
            .await?;

        let text = reply.trim();
        if text.is_empty() {
            return Err(AiError::EmptyResponse);
        }
        Ok(text.to_string())
    }

    /// Date idea tailored to both profiles.
    pub async fn date_suggestion(
        &self,
        a: &NormalizedProfile,
        b: &NormalizedProfile,
    ) -> Result<DateSuggestion, AiError> {
        let prompt = format!(
            "Suggest a fun date for these two people.\n\n\
             Person 1: {}\nPerson 2: {}\n\n\
             Reply with JSON only, in this format:\n\
             {{\"title\": \"...\", \"description\": \"...\", \"location\": \"...\", \
             \"duration\": \"2-3 hours\", \"difficulty\": \"Easy/Medium/Hard\", \
             \"cost\": \"Free/Affordable/Expensive\", \"why_perfect\": \"...\"}}",
            a.to_prompt_value(),
            b.to_prompt_value()
        );

        let reply = self
            .complete(&self.models.generation, prompt, DATE_TEMPERATURE)
            .await?;

        parse_json_reply(&reply)
    }

    /// Common interests and a 1-10 compatibility reading of a conversation.
    pub async fn chat_analysis(&self, messages: &[String]) -> Result<ConversationAnalysis, AiError> {
        let conversation = messages.join("\n");
        let prompt = format!(
            "Analyse this conversation and extract:\n\
             1. Common interests\n\
             2. Topics where the two people agree\n\
             3. Possible date activities\n\
             4. An overall compatibility score (1-10)\n\n\
             Conversation:\n{}\n\n\
             Reply with JSON only:\n\
             {{\"common_interests\": [], \"compatibility_topics\": [], \
             \"potential_activities\": [], \"compatibility_score\": 0}}",
            conversation
        );

        let reply = self
            .complete(&self.models.generation, prompt, ANALYSIS_TEMPERATURE)
            .await?;

        parse_json_reply(&reply)
    }
}

#[async_trait]
impl CompatibilityScorer for OpenRouterClient {
    fn name(&self) -> &'static str {
        "openrouter"
    }

    async fn score(
        &self,
        a: &NormalizedProfile,
        b: &NormalizedProfile,
    ) -> Result<f64, ScoringError> {
        let raw = self.compatibility(a, b).await?;
        sanitise_score(raw)
    }
}

/// First decimal number in a model reply.
fn parse_score(reply: &str) -> Option<f64> {
    let start = reply.find(|c: char| c.is_ascii_digit())?;
    let number: String = reply[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    number.trim_end_matches('.').parse().ok()
}

/// Parse a JSON object out of a reply that may be wrapped in prose or code
/// fences.
fn parse_json_reply<T>(reply: &str) -> Result<T, AiError>
where
    T: for<'de> Deserialize<'de>,
{
    let start = reply.find('{');
    let end = reply.rfind('}');

    let body = match (start, end) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => {
            return Err(AiError::InvalidResponse(format!(
                "no JSON object in reply: {}",
                reply.trim()
            )))
        }
    };

    serde_json::from_str(body)
        .map_err(|e| AiError::InvalidResponse(format!("Failed to parse reply: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalizer::normalize;
    use serde_json::json;

    fn create_client(endpoint: String) -> OpenRouterClient {
        OpenRouterClient::new(
            endpoint,
            "test_key".to_string(),
            "blind-match-test".to_string(),
            AiModels {
                scoring: "score-model".to_string(),
                generation: "gen-model".to_string(),
            },
            200,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn completion(content: &str) -> String {
        json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
        })
        .to_string()
    }

    fn pair() -> (NormalizedProfile, NormalizedProfile) {
        (
            normalize(&json!({ "id": "a", "age": 29, "hobbies": ["chess"] })),
            normalize(&json!({ "id": "b", "age": 31, "hobbies": ["chess", "yoga"] })),
        )
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let result = OpenRouterClient::new(
            "http://localhost".to_string(),
            "  ".to_string(),
            "app".to_string(),
            AiModels {
                scoring: "m".to_string(),
                generation: "m".to_string(),
            },
            100,
            Duration::from_secs(1),
        );

        assert!(matches!(result, Err(AiError::MissingApiKey)));
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score("82"), Some(82.0));
        assert_eq!(parse_score("Score: 67.5/100"), Some(67.5));
        assert_eq!(parse_score("I'd say 90."), Some(90.0));
        assert_eq!(parse_score("no idea"), None);
    }

    #[test]
    fn test_parse_json_reply_with_fences() {
        let reply = "```json\n{\"title\": \"Picnic\", \"location\": \"Park\"}\n```";
        let suggestion: DateSuggestion = parse_json_reply(reply).unwrap();

        assert_eq!(suggestion.title, "Picnic");
        assert_eq!(suggestion.location, "Park");
        assert!(suggestion.cost.is_empty());

        let broken: Result<DateSuggestion, _> = parse_json_reply("sure!");
        assert!(matches!(broken, Err(AiError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_scorer_parses_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test_key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion("Compatibility: 78"))
            .create_async()
            .await;

        let client = create_client(format!("{}/chat/completions", server.url()));
        let (a, b) = pair();

        let score = client.score(&a, &b).await.unwrap();

        assert_eq!(score, 78.0);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_scorer_maps_api_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let client = create_client(format!("{}/chat/completions", server.url()));
        let (a, b) = pair();

        let err = client.score(&a, &b).await.unwrap_err();

        assert!(matches!(err, ScoringError::Request(ref msg) if msg.contains("429")));
    }

    #[tokio::test]
    async fn test_scorer_rejects_reply_without_number() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion("They seem nice."))
            .create_async()
            .await;

        let client = create_client(format!("{}/chat/completions", server.url()));
        let (a, b) = pair();

        let err = client.score(&a, &b).await.unwrap_err();

        assert!(matches!(err, ScoringError::Parse(_)));
    }

    #[tokio::test]
    async fn test_empty_choices() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let client = create_client(format!("{}/chat/completions", server.url()));
        let (a, b) = pair();

        let err = client.ice_breaker(&a, &b).await.unwrap_err();

        assert!(matches!(err, AiError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_chat_analysis() {
        let mut server = mockito::Server::new_async().await;
        let reply = r#"{"common_interests": ["chess"], "compatibility_topics": ["travel"], "potential_activities": ["museum"], "compatibility_score": 8}"#;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion(reply))
            .create_async()
            .await;

        let client = create_client(format!("{}/chat/completions", server.url()));

        let analysis = client
            .chat_analysis(&["I love chess".to_string(), "Me too!".to_string()])
            .await
            .unwrap();

        assert_eq!(analysis.common_interests, vec!["chess"]);
        assert_eq!(analysis.compatibility_score, 8);
    }
}
