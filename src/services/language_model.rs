use async_trait::async_trait;

use crate::error::AppResult;

/// One structured-generation call: a fixed instruction plus free text, with
/// the reply constrained to JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub system_instruction: String,
    pub contents: String,
    pub temperature: f32,
}

#[async_trait]
pub trait LanguageModelService: Send + Sync {
    /// Returns the raw JSON text produced by the model.
    async fn generate_json(&self, request: &GenerationRequest) -> AppResult<String>;
}
