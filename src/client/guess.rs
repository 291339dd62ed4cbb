use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::future::Future;
use std::time::Duration;

use crate::error::{DrawguessError, Result};

const SYSTEM_PROMPT: &str = "You are an image recognition assistant. Look at the hand-drawn \
    sketch and guess what object it shows. Answer with a single word or short phrase and no \
    explanation.";

const USER_PROMPT: &str = "Guess what object this hand drawing shows.";

/// Something that looks at a drawing and names it
pub trait GuessCapability {
    fn guess(
        &self,
        jpeg: &[u8],
        hint: Option<&str>,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Ask `capability` for a label. Any failure or empty answer is `None`.
pub async fn guess_or_none<G: GuessCapability>(
    capability: &G,
    jpeg: &[u8],
    hint: Option<&str>,
) -> Option<String> {
    match capability.guess(jpeg, hint).await {
        Ok(label) => {
            let label = label.trim();
            if label.is_empty() {
                tracing::warn!("Guess capability returned an empty answer");
                None
            } else {
                Some(label.to_string())
            }
        }
        Err(e) => {
            tracing::warn!("Guess capability failed: {}", e);
            None
        }
    }
}

/// OpenAI-compatible chat-completions endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_base: "https://dashscope.aliyuncs.com/compatible-mode/v1".to_string(),
            api_key: None,
            model: "qwen-vl-plus".to_string(),
            max_tokens: 20,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Vision model behind a chat-completions API
pub struct VisionGuesser {
    client: Client,
    config: VisionConfig,
}

impl VisionGuesser {
    pub fn new(config: VisionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        )
    }

    fn request_body(&self, jpeg: &[u8], hint: Option<&str>) -> serde_json::Value {
        let mut prompt = USER_PROMPT.to_string();
        if let Some(hint) = hint.filter(|h| !h.trim().is_empty()) {
            prompt.push_str(&format!(" Hint: {}", hint.trim()));
        }
        let image_url = format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg));

        json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": prompt },
                        { "type": "image_url", "image_url": { "url": image_url } }
                    ]
                }
            ],
            "max_tokens": self.config.max_tokens
        })
    }
}

impl GuessCapability for VisionGuesser {
    async fn guess(&self, jpeg: &[u8], hint: Option<&str>) -> Result<String> {
        let mut request = self
            .client
            .post(self.endpoint())
            .json(&self.request_body(jpeg, hint));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DrawguessError::GuessError(format!(
                "vision API returned {}",
                status
            )));
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| DrawguessError::GuessError("response had no choices".to_string()))
    }
}
