use crate::domain::indicator::format_with_unit;
use crate::domain::{Indicator, SeriesIds, Snapshot};
use crate::ingest::ObservationSource;
use crate::llm::LlmClient;
use crate::snapshot::fetch_snapshot;
use crate::summary::{self, SummaryResult};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const TITLE: &str = "Market Conditions Dashboard";
pub const LOADING_MESSAGE: &str = "Fetching real-time indicator data from FRED...";
pub const BUTTON_LABEL: &str = "Generate Market Summary";
pub const SUMMARY_HEADING: &str = "Market Insight Summary";
pub const IDLE_HINT: &str = "Click the button above to analyze the current conditions with the language model.";

/// Metric rows as laid out on screen: three, then two.
pub const LAYOUT: [&[Indicator]; 2] = [
    &[Indicator::Vix, Indicator::Move, Indicator::HyOas],
    &[Indicator::TedSpread, Indicator::Nfci],
];

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardState {
    /// Snapshot shown, no summary yet.
    Idle,
    /// Snapshot shown with the most recent summary beneath it.
    Summarized(SummaryResult),
}

/// One dashboard session. The snapshot is fetched once on load and reused by
/// every summary request; only a new session fetches again.
#[derive(Debug, Clone)]
pub struct Dashboard {
    snapshot: Snapshot,
    state: DashboardState,
    last_error: Option<String>,
}

impl Dashboard {
    pub async fn load(source: &dyn ObservationSource, series: &SeriesIds) -> Self {
        Self::from_snapshot(fetch_snapshot(source, series).await)
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            state: DashboardState::Idle,
            last_error: None,
        }
    }

    /// Rebuilds a session from what a surface was displaying: the snapshot
    /// and, if one was shown, the latest summary.
    pub fn resume(snapshot: Snapshot, summary: Option<SummaryResult>) -> Self {
        let state = match summary {
            Some(result) => DashboardState::Summarized(result),
            None => DashboardState::Idle,
        };
        Self {
            snapshot,
            state,
            last_error: None,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn summary(&self) -> Option<&SummaryResult> {
        match &self.state {
            DashboardState::Idle => None,
            DashboardState::Summarized(result) => Some(result),
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Handles the summary button. Success moves to (or stays in)
    /// `Summarized` with the new result replacing any previous one. Failure
    /// leaves the state untouched, records the message for display and
    /// returns the error.
    pub async fn request_summary(&mut self, llm: &dyn LlmClient) -> anyhow::Result<()> {
        match summary::compose(llm, &self.snapshot).await {
            Ok(result) => {
                self.last_error = None;
                self.state = DashboardState::Summarized(result);
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "market summary failed");
                self.last_error = Some(format!("{err:#}"));
                Err(err)
            }
        }
    }

    pub fn view(&self) -> DashboardView {
        let rows: Vec<Vec<Metric>> = LAYOUT
            .iter()
            .map(|row| {
                row.iter()
                    .map(|i| Metric::new(*i, self.snapshot.value(*i)))
                    .collect::<Vec<_>>()
            })
            .collect();

        DashboardView {
            title: TITLE,
            fetched_at: self.snapshot.fetched_at,
            rows,
            summary: self.summary().cloned(),
            error: self.last_error.clone(),
        }
    }
}

/// Everything a presentation surface needs to draw the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub title: &'static str,
    pub fetched_at: DateTime<Utc>,
    pub rows: Vec<Vec<Metric>>,
    pub summary: Option<SummaryResult>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub indicator: Indicator,
    pub label: &'static str,
    pub value: Option<f64>,
    pub display: String,
}

impl Metric {
    fn new(indicator: Indicator, value: Option<f64>) -> Self {
        Self {
            indicator,
            label: indicator.label(),
            value,
            display: format_with_unit(value, indicator.unit()),
        }
    }
}
