use crate::domain::indicator::format_value;
use crate::domain::Snapshot;
use crate::error::SummaryGenerationFailed;
use crate::llm::{ChatMessage, LlmClient};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SYSTEM_PROMPT: &str = "You are a financial analyst.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Bearish,
    Neutral,
    Bullish,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Bearish, Sentiment::Neutral, Sentiment::Bullish];

    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Bearish => "Bearish",
            Sentiment::Neutral => "Neutral",
            Sentiment::Bullish => "Bullish",
        }
    }

    /// The classification mentioned first in `text`, case-insensitive.
    pub fn detect(text: &str) -> Option<Self> {
        let lower = text.to_ascii_lowercase();
        Self::ALL
            .iter()
            .filter_map(|s| lower.find(&s.as_str().to_ascii_lowercase()).map(|pos| (pos, *s)))
            .min_by_key(|(pos, _)| *pos)
            .map(|(_, s)| s)
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub summary: String,
    pub sentiment: Option<Sentiment>,
    pub generated_at: DateTime<Utc>,
    pub model: String,
}

/// Renders the user prompt. Every indicator appears once, in declared order;
/// missing values appear as "no data".
pub fn build_prompt(snapshot: &Snapshot) -> String {
    let lines = snapshot
        .entries()
        .iter()
        .map(|(indicator, value)| format!("- {}: {}", indicator.prompt_label(), format_value(*value)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a financial analyst AI. Summarize the current market conditions based on the following macro indicators:\n\
\n\
{lines}\n\
\n\
Classify sentiment as Bearish, Neutral, or Bullish. Provide a 3–5 sentence summary for a general audience."
    )
}

pub fn messages(snapshot: &Snapshot) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(build_prompt(snapshot)),
    ]
}

/// Asks the model for a summary of `snapshot`. One attempt; failures are
/// returned to the caller to display.
pub async fn compose(llm: &dyn LlmClient, snapshot: &Snapshot) -> anyhow::Result<SummaryResult> {
    let text = llm.complete(messages(snapshot)).await?;

    let summary = text.trim().to_string();
    if summary.is_empty() {
        return Err(SummaryGenerationFailed::new(
            llm.provider(),
            "empty_content",
            "model returned only whitespace",
        )
        .into());
    }

    let sentiment = Sentiment::detect(&summary);
    tracing::info!(
        model = llm.model(),
        sentiment = sentiment.map(Sentiment::as_str).unwrap_or("unclassified"),
        chars = summary.len(),
        "market summary generated"
    );

    Ok(SummaryResult {
        summary,
        sentiment,
        generated_at: Utc::now(),
        model: llm.model().to_string(),
    })
}
