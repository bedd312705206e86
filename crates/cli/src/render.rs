use market_pulse_core::dashboard::{DashboardView, SUMMARY_HEADING};
use std::fmt::Write;

const CELL_WIDTH: usize = 22;
const HINT: &str = "Run with --summarize or --interactive to generate a market summary.";

pub fn text(view: &DashboardView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", view.title);
    let _ = writeln!(out, "Indicators as of {} UTC", view.fetched_at.format("%Y-%m-%d %H:%M:%S"));
    out.push('\n');

    for row in &view.rows {
        let labels: String = row.iter().map(|m| format!("{:<width$}", m.label, width = CELL_WIDTH)).collect();
        let values: String = row.iter().map(|m| format!("{:<width$}", m.display, width = CELL_WIDTH)).collect();
        let _ = writeln!(out, "{}", labels.trim_end());
        let _ = writeln!(out, "{}", values.trim_end());
        out.push('\n');
    }

    if let Some(error) = &view.error {
        let _ = writeln!(out, "Summary generation failed: {error}");
    }

    match &view.summary {
        Some(summary) => {
            let _ = writeln!(out, "{SUMMARY_HEADING}");
            if let Some(sentiment) = summary.sentiment {
                let _ = writeln!(out, "Sentiment: {sentiment}");
            }
            let _ = writeln!(out, "{}", summary.summary);
        }
        None if view.error.is_none() => {
            let _ = writeln!(out, "{HINT}");
        }
        None => {}
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use market_pulse_core::dashboard::Dashboard;
    use market_pulse_core::domain::Snapshot;
    use market_pulse_core::summary::{Sentiment, SummaryResult};

    fn view() -> DashboardView {
        Dashboard::from_snapshot(Snapshot {
            fetched_at: Utc.with_ymd_and_hms(2026, 10, 19, 14, 0, 0).unwrap(),
            vix: Some(20.5),
            move_index: Some(110.0),
            hy_oas: Some(4.2),
            ted_spread: None,
            nfci: Some(-0.1),
        })
        .view()
    }

    #[test]
    fn idle_text_lists_metrics_in_two_rows() {
        let out = text(&view());
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "Market Conditions Dashboard");
        assert!(lines[3].starts_with("VIX"));
        assert!(lines[3].contains("MOVE Index") && lines[3].contains("High Yield OAS"));
        assert!(lines[4].contains("20.5") && lines[4].contains("110.0") && lines[4].contains("4.2%"));
        assert!(lines[6].starts_with("TED Spread"));
        assert!(lines[7].starts_with("no data") && lines[7].contains("-0.1"));
        assert!(out.contains("--summarize"));
        assert!(!out.contains(SUMMARY_HEADING));
    }

    #[test]
    fn summarized_text_prints_summary_verbatim() {
        let mut view = view();
        view.summary = Some(SummaryResult {
            summary: "Bearish. Volatility is elevated.".to_string(),
            sentiment: Some(Sentiment::Bearish),
            generated_at: Utc::now(),
            model: "gpt-4".to_string(),
        });
        let out = text(&view);

        assert!(out.contains(SUMMARY_HEADING));
        assert!(out.contains("Sentiment: Bearish"));
        assert!(out.ends_with("Bearish. Volatility is elevated."));
    }
}
