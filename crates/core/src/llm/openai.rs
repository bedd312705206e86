use crate::config::Settings;
use crate::error::SummaryGenerationFailed;
use crate::llm::{ChatMessage, LlmClient, Provider};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_openai_api_key()?.to_string();
        Self::new(
            api_key,
            settings.openai_base_url.clone(),
            settings.openai_model.clone(),
            Duration::from_secs(settings.openai_timeout_secs),
        )
    }

    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
        })
    }

    async fn create_chat_completion(
        &self,
        req: ChatCompletionRequest<'_>,
    ) -> anyhow::Result<(serde_json::Value, ChatCompletionResponse)> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key)).map_err(|err| {
            SummaryGenerationFailed::new(
                Provider::OpenAI,
                "request",
                format!("API key is not a valid header value: {err}"),
            )
        })?;
        headers.insert(AUTHORIZATION, bearer);

        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(&req)
            .send()
            .await
            .map_err(|err| transport_error("OpenAI request failed", err))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|err| transport_error("failed to read OpenAI response body", err))?;
        if !status.is_success() {
            let raw_response_json = serde_json::from_str::<serde_json::Value>(&text).ok();
            return Err(SummaryGenerationFailed {
                provider: Provider::OpenAI,
                stage: "http",
                detail: format!("status={status}"),
                raw_output: Some(text),
                raw_response_json,
            }
            .into());
        }

        let raw_json = match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(v) => v,
            Err(err) => {
                return Err(SummaryGenerationFailed {
                    raw_output: Some(text),
                    ..SummaryGenerationFailed::new(
                        Provider::OpenAI,
                        "decode",
                        format!("response is not JSON: {err}"),
                    )
                }
                .into())
            }
        };
        let parsed = serde_json::from_value::<ChatCompletionResponse>(raw_json.clone())
            .map_err(|err| SummaryGenerationFailed {
                raw_response_json: Some(raw_json.clone()),
                ..SummaryGenerationFailed::new(
                    Provider::OpenAI,
                    "decode",
                    format!("unexpected chat completion shape: {err}"),
                )
            })?;
        Ok((raw_json, parsed))
    }

    fn first_choice_text(
        res: ChatCompletionResponse,
        raw_json: serde_json::Value,
    ) -> anyhow::Result<String> {
        let Some(choice) = res.choices.into_iter().next() else {
            return Err(SummaryGenerationFailed {
                raw_response_json: Some(raw_json),
                ..SummaryGenerationFailed::new(Provider::OpenAI, "empty_choices", "no completion choices returned")
            }
            .into());
        };

        match choice.message.content {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => Err(SummaryGenerationFailed {
                raw_response_json: Some(raw_json),
                ..SummaryGenerationFailed::new(
                    Provider::OpenAI,
                    "empty_content",
                    format!(
                        "first choice has no text (finish_reason={})",
                        choice.finish_reason.as_deref().unwrap_or("unknown")
                    ),
                )
            }
            .into()),
        }
    }
}

fn transport_error(what: &str, err: reqwest::Error) -> SummaryGenerationFailed {
    let stage = if err.is_timeout() { "timeout" } else { "transport" };
    SummaryGenerationFailed::new(Provider::OpenAI, stage, format!("{what}: {err}"))
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider(&self) -> Provider {
        Provider::OpenAI
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: Vec<ChatMessage>) -> anyhow::Result<String> {
        let req = ChatCompletionRequest {
            model: &self.model,
            messages: &messages,
        };
        let (raw_json, res) = self.create_chat_completion(req).await?;
        Self::first_choice_text(res, raw_json)
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ChoiceMessage,

    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
