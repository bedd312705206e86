use market_pulse_core::dashboard::{
    DashboardView, Metric, BUTTON_LABEL, IDLE_HINT, SUMMARY_HEADING,
};
use std::fmt::Write;
use uuid::Uuid;

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:2rem auto;max-width:960px;padding:0 1rem;color:#1f2933}\
.row{display:flex;gap:1rem;margin-bottom:1rem}\
.metric{flex:1;border:1px solid #d9e2ec;border-radius:8px;padding:1rem}\
.metric .label{font-size:.9rem;color:#52606d}\
.metric .value{font-size:1.8rem;font-weight:600}\
.metric .value.missing{color:#9aa5b1}\
.meta{color:#52606d;font-size:.85rem}\
.hint{background:#e3f2fd;border-radius:8px;padding:1rem}\
.error{background:#fde8e8;color:#9b1c1c;border-radius:8px;padding:1rem}\
.summary{white-space:pre-wrap;line-height:1.5}\
.sentiment{display:inline-block;border-radius:999px;padding:.2rem .8rem;background:#eef2f7;font-weight:600}";

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// What the summary button posts back: the displayed snapshot, and the
/// displayed summary if any, both as JSON.
#[derive(Debug, Clone)]
pub struct SessionFields {
    pub session_id: Uuid,
    pub snapshot_json: String,
    pub summary_json: Option<String>,
}

/// Full dashboard page. The form carries the session back so the summarized
/// snapshot is the one on screen and a failed retry keeps the last summary.
pub fn page(view: &DashboardView, session: &SessionFields) -> String {
    let mut body = String::new();

    let _ = write!(
        body,
        "<h1>{}</h1><p class=\"meta\">Indicators as of {} UTC</p>",
        escape(view.title),
        view.fetched_at.format("%Y-%m-%d %H:%M:%S")
    );

    for row in &view.rows {
        body.push_str("<div class=\"row\">");
        for metric in row {
            body.push_str(&metric_card(metric));
        }
        body.push_str("</div>");
    }

    let _ = write!(
        body,
        "<form method=\"post\" action=\"/summary\">\
<input type=\"hidden\" name=\"snapshot\" value=\"{}\">\
<input type=\"hidden\" name=\"session_id\" value=\"{}\">",
        escape(&session.snapshot_json),
        session.session_id
    );
    if let Some(summary_json) = &session.summary_json {
        let _ = write!(
            body,
            "<input type=\"hidden\" name=\"summary\" value=\"{}\">",
            escape(summary_json)
        );
    }
    let _ = write!(body, "<button type=\"submit\">{}</button></form>", escape(BUTTON_LABEL));

    if let Some(error) = &view.error {
        let _ = write!(
            body,
            "<div class=\"error\"><strong>Summary generation failed.</strong> {}</div>",
            escape(error)
        );
    }

    match &view.summary {
        Some(summary) => {
            let _ = write!(body, "<h2>{}</h2>", escape(SUMMARY_HEADING));
            if let Some(sentiment) = summary.sentiment {
                let _ = write!(body, "<p><span class=\"sentiment\">{sentiment}</span></p>");
            }
            let _ = write!(
                body,
                "<div class=\"summary\">{}</div><p class=\"meta\">Generated by {} at {} UTC</p>",
                escape(&summary.summary),
                escape(&summary.model),
                summary.generated_at.format("%Y-%m-%d %H:%M:%S")
            );
        }
        None if view.error.is_none() => {
            let _ = write!(body, "<p class=\"hint\">{}</p>", escape(IDLE_HINT));
        }
        None => {}
    }

    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
<title>{}</title><style>{STYLE}</style></head><body>{body}</body></html>",
        escape(view.title)
    )
}

fn metric_card(metric: &Metric) -> String {
    let class = if metric.value.is_some() { "value" } else { "value missing" };
    format!(
        "<div class=\"metric\"><div class=\"label\">{}</div><div class=\"{class}\">{}</div></div>",
        escape(metric.label),
        escape(&metric.display)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use market_pulse_core::dashboard::Dashboard;
    use market_pulse_core::domain::Snapshot;
    use market_pulse_core::summary::{Sentiment, SummaryResult};

    fn snapshot() -> Snapshot {
        Snapshot {
            fetched_at: Utc.with_ymd_and_hms(2026, 10, 19, 14, 0, 0).unwrap(),
            vix: Some(20.5),
            move_index: None,
            hy_oas: Some(4.2),
            ted_spread: Some(0.3),
            nfci: Some(-0.1),
        }
    }

    fn session(snapshot_json: &str, summary_json: Option<&str>) -> SessionFields {
        SessionFields {
            session_id: Uuid::nil(),
            snapshot_json: snapshot_json.to_string(),
            summary_json: summary_json.map(str::to_string),
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<b>\"a\" & 'b'</b>"), "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;");
    }

    #[test]
    fn idle_page_shows_metrics_button_and_hint() {
        let view = Dashboard::from_snapshot(snapshot()).view();
        let html = page(&view, &session("{\"vix\":20.5}", None));

        assert!(html.contains("Indicators as of 2026-10-19 14:00:00 UTC"));
        assert!(html.contains(">20.5<"));
        assert!(html.contains(">4.2%<"));
        assert!(html.contains("value missing\">no data<"));
        assert!(html.contains(BUTTON_LABEL));
        assert!(html.contains(IDLE_HINT));
        assert!(html.contains("value=\"{&quot;vix&quot;:20.5}\""));
        assert!(!html.contains(SUMMARY_HEADING));
        assert!(!html.contains("name=\"summary\""));
    }

    #[test]
    fn summarized_page_shows_escaped_summary_under_heading() {
        let mut view = Dashboard::from_snapshot(snapshot()).view();
        view.summary = Some(SummaryResult {
            summary: "Neutral. Spreads <tight> & calm.".to_string(),
            sentiment: Some(Sentiment::Neutral),
            generated_at: Utc.with_ymd_and_hms(2026, 10, 19, 14, 5, 0).unwrap(),
            model: "gpt-4".to_string(),
        });
        let html = page(&view, &session("{}", Some("{\"summary\":\"x\"}")));

        assert!(html.contains("name=\"summary\" value=\"{&quot;summary&quot;:&quot;x&quot;}\""));
        let heading = html.find(SUMMARY_HEADING).unwrap();
        assert!(heading > html.find(BUTTON_LABEL).unwrap());
        assert!(html.contains("Spreads &lt;tight&gt; &amp; calm."));
        assert!(html.contains("<span class=\"sentiment\">Neutral</span>"));
        assert!(!html.contains(IDLE_HINT));
    }

    #[test]
    fn error_is_visible() {
        let mut view = Dashboard::from_snapshot(snapshot()).view();
        view.error = Some("summary generation failed (provider=OpenAI, stage=http): status=500".to_string());
        let html = page(&view, &session("{}", None));

        assert!(html.contains("Summary generation failed."));
        assert!(html.contains("stage=http"));
        assert!(!html.contains(IDLE_HINT));
    }
}
