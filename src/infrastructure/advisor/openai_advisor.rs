//! OpenAI chat-completions advisory client
//!
//! Provider failures never escape this boundary: any error, including an
//! unparseable completion, degrades to the sentinel fallback advice.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::shared::errors::AdvisorError;
use crate::shared::types::{Advice, OiChange, TradeSignal};

/// Capability interface for the trade advisory collaborator.
///
/// Infallible from the caller's perspective; implementations absorb provider
/// errors and return [`Advice::fallback`] instead.
#[async_trait]
pub trait AdvisoryService: Send + Sync {
    async fn analyze(&self, change: &OiChange) -> Advice;
}

/// Advisory client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AdvisorConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_max_tokens() -> u32 {
    50
}

fn default_temperature() -> f32 {
    0.0
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

pub struct OpenAiAdvisor {
    api_key: String,
    config: AdvisorConfig,
    client: Client,
}

impl OpenAiAdvisor {
    pub fn new(api_key: String, config: AdvisorConfig) -> Result<Self, AdvisorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            api_key,
            config,
            client,
        })
    }

    fn build_prompt(change: &OiChange) -> String {
        format!(
            "You must respond in exactly 3 lines:\n\
             Line 1: BUY, SELL, or NOTHING\n\
             Line 2: Reason for your suggestion\n\
             Line 3: Confidence: X%\n\
             \n\
             BTC OI changed by {:.2}%:\n\
             Current OI: {:.2}%.",
            change.btc_change_pct, change.total_change_pct
        )
    }

    async fn request_advice(&self, change: &OiChange) -> Result<Advice, AdvisorError> {
        #[derive(Serialize)]
        struct ChatRequest {
            model: String,
            messages: Vec<ChatMessage>,
            max_tokens: u32,
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<ChatChoice>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: ChatResponseMessage,
        }

        #[derive(Deserialize)]
        struct ChatResponseMessage {
            content: String,
        }

        let url = format!("{}/chat/completions", self.config.base_url);
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You are a helpful assistant.".to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: Self::build_prompt(change),
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!("requesting advisory from {url}");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisorError::Api { status, body });
        }

        let chat_response: ChatResponse = response.json().await?;
        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(AdvisorError::MalformedReply)?;

        parse_advice(&content).ok_or(AdvisorError::MalformedReply)
    }
}

#[async_trait]
impl AdvisoryService for OpenAiAdvisor {
    async fn analyze(&self, change: &OiChange) -> Advice {
        match self.request_advice(change).await {
            Ok(advice) => advice,
            Err(e) => {
                warn!("advisory call failed, using fallback: {e}");
                Advice::fallback()
            }
        }
    }
}

/// Parse the 3-line structured reply. Lenient about surrounding whitespace
/// and blank lines; anything that does not yield a signal, rationale, and
/// confidence is rejected.
pub fn parse_advice(content: &str) -> Option<Advice> {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() < 3 {
        return None;
    }

    let signal_line = lines[0].to_uppercase();
    let signal = if signal_line.contains("BUY") {
        TradeSignal::Buy
    } else if signal_line.contains("SELL") {
        TradeSignal::Sell
    } else if signal_line.contains("NOTHING") {
        TradeSignal::Nothing
    } else {
        return None;
    };

    let rationale = lines[1].to_string();

    let confidence_digits: String = lines[2]
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    let confidence = confidence_digits.parse::<u32>().ok()?.min(100) as u8;

    Some(Advice {
        signal,
        rationale,
        confidence,
    })
}
