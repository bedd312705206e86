use crate::llm::Provider;
use serde_json::Value;
use std::fmt;

/// The model provider failed or returned nothing usable. Carried inside
/// `anyhow::Error`; recover it with `downcast_ref` for diagnostics.
#[derive(Debug, Clone)]
pub struct SummaryGenerationFailed {
    pub provider: Provider,
    pub stage: &'static str,
    pub detail: String,
    pub raw_output: Option<String>,
    pub raw_response_json: Option<Value>,
}

impl SummaryGenerationFailed {
    pub fn new(provider: Provider, stage: &'static str, detail: impl Into<String>) -> Self {
        Self {
            provider,
            stage,
            detail: detail.into(),
            raw_output: None,
            raw_response_json: None,
        }
    }
}

impl fmt::Display for SummaryGenerationFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "summary generation failed (provider={:?}, stage={}): {}",
            self.provider, self.stage, self.detail
        )
    }
}

impl std::error::Error for SummaryGenerationFailed {}
