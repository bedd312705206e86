use crate::config::Settings;
use crate::ingest::types::ObservationsResponse;
use crate::ingest::ObservationSource;
use anyhow::{Context, Result};
use std::time::Duration;

const OBSERVATIONS_PATH: &str = "/fred/series/observations";

// FRED reports a missing observation as a literal ".".
const MISSING_VALUE: &str = ".";

#[derive(Debug, Clone)]
pub struct FredClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl FredClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            settings.fred_base_url.clone(),
            settings.fred_api_key.clone(),
            Duration::from_secs(settings.fred_timeout_secs),
        )
    }

    pub fn new(base_url: String, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build FRED http client")?;

        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), OBSERVATIONS_PATH)
    }

    async fn fetch_latest(&self, api_key: &str, series_id: &str) -> Result<Option<f64>> {
        let res = self
            .http
            .get(self.url())
            .query(&[
                ("series_id", series_id),
                ("api_key", api_key),
                ("file_type", "json"),
                ("sort_order", "desc"),
                ("limit", "1"),
            ])
            .send()
            .await
            .context("FRED request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read FRED response")?;
        if !status.is_success() {
            anyhow::bail!("FRED HTTP {status}: {text}");
        }

        let parsed = serde_json::from_str::<ObservationsResponse>(&text)
            .with_context(|| format!("FRED response is not a valid observations payload: {text}"))?;

        match parsed.observations.first() {
            Some(observation) => parse_value(&observation.value),
            None => Ok(None),
        }
    }
}

fn parse_value(raw: &str) -> Result<Option<f64>> {
    let raw = raw.trim();
    if raw == MISSING_VALUE {
        return Ok(None);
    }

    let value = raw
        .parse::<f64>()
        .with_context(|| format!("observation value is not numeric: {raw:?}"))?;
    anyhow::ensure!(value.is_finite(), "observation value is not finite: {raw:?}");
    Ok(Some(value))
}

#[async_trait::async_trait]
impl ObservationSource for FredClient {
    fn provider_name(&self) -> &'static str {
        "fred"
    }

    async fn latest_value(&self, series_id: &str) -> Option<f64> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::debug!(series_id, "FRED_API_KEY not set; no data");
            return None;
        };

        match self.fetch_latest(api_key, series_id).await {
            Ok(Some(value)) => Some(value),
            Ok(None) => {
                tracing::info!(series_id, "FRED returned no observation");
                None
            }
            Err(err) => {
                tracing::warn!(series_id, error = %err, "FRED fetch failed; no data");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Query, State};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn parses_first_observation_value() {
        let v = json!({
            "observations": [
                {"date": "2026-10-16", "value": "20.5"},
                {"date": "2026-10-15", "value": "19.0"}
            ]
        });
        let parsed: ObservationsResponse = serde_json::from_value(v).unwrap();
        assert_eq!(parse_value(&parsed.observations[0].value).unwrap(), Some(20.5));
    }

    #[test]
    fn missing_marker_is_absence_not_error() {
        assert_eq!(parse_value(".").unwrap(), None);
    }

    #[test]
    fn rejects_garbage_and_non_finite_values() {
        assert!(parse_value("n/a").is_err());
        assert!(parse_value("NaN").is_err());
        assert!(parse_value("inf").is_err());
    }

    #[derive(Clone, Default)]
    struct FakeFred {
        hits: Arc<AtomicUsize>,
    }

    async fn observations(
        State(fake): State<FakeFred>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Response {
        fake.hits.fetch_add(1, Ordering::SeqCst);

        let expected = [
            ("api_key", "test-key"),
            ("file_type", "json"),
            ("sort_order", "desc"),
            ("limit", "1"),
        ];
        for (k, v) in expected {
            if params.get(k).map(String::as_str) != Some(v) {
                return (StatusCode::BAD_REQUEST, format!("bad {k}")).into_response();
            }
        }

        match params.get("series_id").map(String::as_str) {
            Some("VIXCLS") => Json(json!({"observations": [{"date": "2026-10-16", "value": "20.5"}]}))
                .into_response(),
            Some("NFCI") => Json(json!({"observations": [{"date": "2026-10-10", "value": "-0.1"}]}))
                .into_response(),
            Some("EMPTY") => Json(json!({"observations": []})).into_response(),
            Some("MISSING") => Json(json!({"observations": [{"date": "2026-10-16", "value": "."}]}))
                .into_response(),
            Some("MALFORMED") => "not json".into_response(),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        }
    }

    async fn spawn_fake(fake: FakeFred) -> String {
        let app = Router::new()
            .route(OBSERVATIONS_PATH, get(observations))
            .with_state(fake);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base_url: String, api_key: Option<&str>) -> FredClient {
        FredClient::new(base_url, api_key.map(str::to_string), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn returns_latest_value_exactly() {
        let base = spawn_fake(FakeFred::default()).await;
        let fred = client(base, Some("test-key"));
        assert_eq!(fred.latest_value("VIXCLS").await, Some(20.5));
        assert_eq!(fred.latest_value("NFCI").await, Some(-0.1));
    }

    #[tokio::test]
    async fn degrades_to_no_data() {
        let base = spawn_fake(FakeFred::default()).await;
        let fred = client(base, Some("test-key"));
        assert_eq!(fred.latest_value("EMPTY").await, None);
        assert_eq!(fred.latest_value("MISSING").await, None);
        assert_eq!(fred.latest_value("MALFORMED").await, None);
        assert_eq!(fred.latest_value("UNKNOWN").await, None);
    }

    #[tokio::test]
    async fn missing_api_key_skips_the_request() {
        let fake = FakeFred::default();
        let hits = fake.hits.clone();
        let base = spawn_fake(fake).await;
        let fred = client(base, None);
        assert_eq!(fred.latest_value("VIXCLS").await, None);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unreachable_provider_is_no_data() {
        // Nothing listens on port 9 locally.
        let fred = client("http://127.0.0.1:9".to_string(), Some("test-key"));
        assert_eq!(fred.latest_value("VIXCLS").await, None);
    }

    #[tokio::test]
    async fn every_call_refetches() {
        let fake = FakeFred::default();
        let hits = fake.hits.clone();
        let base = spawn_fake(fake).await;
        let fred = client(base, Some("test-key"));
        fred.latest_value("VIXCLS").await;
        fred.latest_value("VIXCLS").await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
