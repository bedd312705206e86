use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use market_pulse_core::dashboard::Dashboard;
use market_pulse_core::domain::{SeriesIds, Snapshot};
use market_pulse_core::ingest::fred::FredClient;
use market_pulse_core::ingest::ObservationSource;
use market_pulse_core::llm::openai::OpenAiClient;
use market_pulse_core::llm::LlmClient;
use market_pulse_core::summary::{self, SummaryResult};

mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = market_pulse_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    // The model key is the only hard requirement; refuse to start without it.
    let llm = OpenAiClient::from_settings(&settings)?;
    let fred = FredClient::from_settings(&settings)?;
    if settings.fred_api_key.is_none() {
        tracing::warn!("FRED_API_KEY missing; every indicator will show no data");
    }

    let state = AppState {
        source: Arc::new(fred),
        llm: Arc::new(llm),
        series: Arc::new(settings.series.clone()),
    };

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, model = %settings.openai_model, "dashboard listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/summary", post(summary_page))
        .route("/healthz", get(healthz))
        .route("/api/snapshot", get(get_snapshot))
        .route("/api/summary", post(post_summary))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    source: Arc<dyn ObservationSource>,
    llm: Arc<dyn LlmClient>,
    series: Arc<SeriesIds>,
}

/// Page load: fetch a fresh snapshot and show it in the Idle state.
async fn dashboard_page(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    let session_id = Uuid::new_v4();
    let dashboard = Dashboard::load(state.source.as_ref(), &state.series).await;
    tracing::info!(%session_id, "dashboard loaded");

    render_dashboard(&dashboard, session_id).map(Html)
}

#[derive(Debug, Deserialize)]
struct SummaryForm {
    /// The snapshot that was on screen when the button was pressed, as JSON.
    snapshot: String,
    /// The summary that was on screen, if any, as JSON.
    summary: Option<String>,
    session_id: Option<Uuid>,
}

/// Summary button: summarize the snapshot the page was showing, never a new one.
async fn summary_page(
    State(state): State<AppState>,
    Form(form): Form<SummaryForm>,
) -> Result<(StatusCode, Html<String>), StatusCode> {
    let session_id = form.session_id.unwrap_or_else(Uuid::new_v4);
    let snapshot = serde_json::from_str::<Snapshot>(&form.snapshot).map_err(|e| {
        tracing::warn!(%session_id, error = %e, "summary form carried an invalid snapshot");
        StatusCode::BAD_REQUEST
    })?;
    let shown_summary = form
        .summary
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(serde_json::from_str::<SummaryResult>)
        .transpose()
        .map_err(|e| {
            tracing::warn!(%session_id, error = %e, "summary form carried an invalid summary");
            StatusCode::BAD_REQUEST
        })?;

    let mut dashboard = Dashboard::resume(snapshot, shown_summary);
    let status = match dashboard.request_summary(state.llm.as_ref()).await {
        Ok(()) => StatusCode::OK,
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            StatusCode::BAD_GATEWAY
        }
    };
    tracing::info!(%session_id, status = %status, "summary requested");

    let page = render_dashboard(&dashboard, session_id)?;
    Ok((status, Html(page)))
}

fn render_dashboard(dashboard: &Dashboard, session_id: Uuid) -> Result<String, StatusCode> {
    let to_json_failed = |e: serde_json::Error| {
        let err = anyhow::Error::new(e);
        sentry_anyhow::capture_anyhow(&err);
        StatusCode::INTERNAL_SERVER_ERROR
    };

    let session = render::SessionFields {
        session_id,
        snapshot_json: serde_json::to_string(dashboard.snapshot()).map_err(to_json_failed)?,
        summary_json: dashboard
            .summary()
            .map(serde_json::to_string)
            .transpose()
            .map_err(to_json_failed)?,
    };
    Ok(render::page(&dashboard.view(), &session))
}

async fn get_snapshot(State(state): State<AppState>) -> Json<Snapshot> {
    Json(market_pulse_core::snapshot::fetch_snapshot(state.source.as_ref(), &state.series).await)
}

async fn post_summary(
    State(state): State<AppState>,
    Json(snapshot): Json<Snapshot>,
) -> Result<Json<SummaryResult>, (StatusCode, Json<serde_json::Value>)> {
    summary::compose(state.llm.as_ref(), &snapshot)
        .await
        .map(Json)
        .map_err(|err| {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, "market summary failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": format!("{err:#}") })),
            )
        })
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &market_pulse_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
