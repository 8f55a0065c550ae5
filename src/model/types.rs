use serde::{Deserialize, Serialize};

pub const MAX_TOKEN_COUNT: u32 = 512;
pub const TEMPERATURE: f32 = 0.7;
pub const TOP_P: f32 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub conversation: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Body sent to the hosted text-generation model.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationRequest {
    pub input_text: String,
    pub text_generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub max_token_count: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_token_count: MAX_TOKEN_COUNT,
            temperature: TEMPERATURE,
            top_p: TOP_P,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InvocationResponse {
    #[serde(default)]
    pub results: Vec<InvocationResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResult {
    pub output_text: Option<String>,
}

impl InvocationRequest {
    pub fn for_prompt(content: &str) -> Self {
        Self {
            input_text: format!("Human: {content}\n\nAssistant:"),
            text_generation_config: GenerationConfig::default(),
        }
    }
}

impl InvocationResponse {
    /// Trimmed text of the first candidate, if the model produced one.
    pub fn first_output(&self) -> Option<String> {
        self.results
            .first()
            .and_then(|result| result.output_text.as_deref())
            .map(|text| text.trim().to_string())
    }
}
