//! Ollama-backed classifier.
//!
//! Asks a local Ollama model (`/api/chat`) to pick the best intent label
//! for a chat message from a fixed list of known labels.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ClassificationError, ClassifierResult};
use crate::gateway::{ClassificationResult, ClassifierGateway, rank};

/// Configuration for the local Ollama inference endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct OllamaConfig {
    /// Ollama HTTP API base URL.
    #[serde(default = "default_host")]
    pub host: String,
    /// Model to use for inference.
    #[serde(default = "default_model")]
    pub model: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Use Ollama instead of the utterance model.
    #[serde(default)]
    pub enabled: bool,
}

fn default_host() -> String {
    "http://localhost:11434".into()
}
fn default_model() -> String {
    "phi3:mini".into()
}
fn default_timeout_secs() -> u64 {
    5
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            enabled: false,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    format: &'a str,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Raw model output before validation.
#[derive(Deserialize)]
struct RawLabel {
    label: Option<String>,
    #[serde(default)]
    confidence: f64,
}

/// Classifier delegating to a local Ollama model.
pub struct OllamaClassifier {
    client: reqwest::Client,
    config: OllamaConfig,
    labels: Vec<String>,
    system_prompt: String,
}

impl OllamaClassifier {
    pub fn new(config: OllamaConfig, labels: Vec<String>) -> ClassifierResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClassificationError::Unavailable(e.to_string()))?;
        let system_prompt = system_prompt(&labels);
        Ok(Self {
            client,
            config,
            labels,
            system_prompt,
        })
    }

    async fn ask(&self, text: &str) -> ClassifierResult<RawLabel> {
        let url = format!("{}/api/chat", self.config.host);
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            format: "json",
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClassificationError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClassificationError::Unavailable(format!(
                "ollama returned {}",
                response.status()
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| ClassificationError::Malformed(e.to_string()))?;
        let content = chat
            .message
            .ok_or_else(|| ClassificationError::Malformed("response has no message".into()))?
            .content;

        serde_json::from_str(&content).map_err(|e| {
            tracing::warn!(error = %e, content = %content, "ollama returned invalid JSON");
            ClassificationError::Malformed(e.to_string())
        })
    }
}

fn system_prompt(labels: &[String]) -> String {
    format!(
        "You classify casual chat messages sent to a friendly bot into intents.\n\
         Known intents: {}.\n\
         Respond with ONLY a JSON object: {{\"label\": \"<intent>\", \"confidence\": <0.0-1.0>}}\n\
         If no intent fits, respond with {{\"label\": null, \"confidence\": 0.0}}.",
        labels.join(", ")
    )
}

#[async_trait]
impl ClassifierGateway for OllamaClassifier {
    async fn classify(&self, text: &str) -> ClassifierResult<Vec<ClassificationResult>> {
        if self.labels.is_empty() {
            return Err(ClassificationError::Untrained);
        }

        let raw = self.ask(text).await?;
        if !(0.0..=1.0).contains(&raw.confidence) {
            return Err(ClassificationError::Malformed(format!(
                "confidence {} out of range",
                raw.confidence
            )));
        }

        let picked = match raw.label {
            Some(label) if self.labels.contains(&label) => Some(label),
            Some(label) => {
                return Err(ClassificationError::Malformed(format!(
                    "unknown label \"{label}\""
                )));
            }
            None => None,
        };

        // Every known label is reported; only the picked one carries a score.
        let mut results: Vec<ClassificationResult> = self
            .labels
            .iter()
            .map(|label| {
                let confidence = match &picked {
                    Some(p) if p == label => raw.confidence,
                    _ => 0.0,
                };
                ClassificationResult::new(label.clone(), confidence)
            })
            .collect();
        rank(&mut results);
        Ok(results)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
