use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::graph_client::GraphScoreClient;
use crate::models::ScoreResult;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state injected into handlers.
///
/// Immutable after startup; requests share nothing else.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Client performing the authenticate + fetch cycle against Graph.
    pub graph_client: GraphScoreClient,
}

/// Builds the application router.
///
/// Exposed so integration tests can serve the exact same route set on an
/// ephemeral port.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/api/score", get(api_score))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Health check endpoint.
///
/// Returns the service status and version. Never touches the upstream.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "secure-score-dashboard",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /api/score
///
/// Machine-readable mirror of the dashboard: performs one full
/// authenticate + fetch cycle and returns the normalized result.
pub async fn api_score(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ScoreResult>, AppError> {
    tracing::info!("GET /api/score");

    let result = state
        .graph_client
        .get_live_score()
        .await
        .context("GET /api/score")?;

    Ok(Json(result))
}

/// GET /
///
/// Renders the dashboard. Each page load performs a fresh authenticate +
/// fetch cycle; the fetch latency and server time shown on the page are the
/// proof the score was retrieved live rather than cached.
pub async fn dashboard(State(state): State<Arc<AppState>>) -> Response {
    tracing::info!("GET /");

    match state.graph_client.get_live_score().await {
        Ok(result) => Html(render_dashboard(&result)).into_response(),
        Err(err) => {
            tracing::error!("Dashboard render failed: {}", err);
            (
                StatusCode::BAD_GATEWAY,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                render_error(&err),
            )
                .into_response()
        }
    }
}

const PAGE_STYLE: &str = "\
body { font-family: system-ui; background: #1a1a2e; color: #eee; margin: 0; padding: 20px; }\
h1 { color: #00d4ff; }\
.card { background: #16213e; padding: 15px; border-radius: 8px; margin: 10px 0; }\
.ok { border-left: 4px solid #00ff88; }\
.err { border-left: 4px solid #ff5566; }\
.score { font-size: 2.5em; font-weight: bold; }\
.bar { background: #0f3460; border-radius: 6px; height: 14px; overflow: hidden; }\
.fill { background: #00ff88; height: 100%; }\
a { color: #00d4ff; }";

fn render_dashboard(result: &ScoreResult) -> String {
    let percent = result.score_percent();
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Secure Score Dashboard</title>
    <style>{style}</style>
</head>
<body>
    <h1>Secure Score Dashboard</h1>
    <div class="card ok">
        <div class="score">{score:.0} / {max:.0}</div>
        <div class="bar"><div class="fill" style="width: {percent:.1}%"></div></div>
        <p>{percent:.1}% of maximum score</p>
    </div>
    <div class="card">
        <strong>Tenant:</strong> {tenant}<br>
        <strong>Score computed:</strong> {api_ts}<br>
        <strong>Fetched in:</strong> {latency} ms<br>
        <strong>Server time (UTC):</strong> {server_time}
    </div>
    <p>Endpoints:</p>
    <ul>
        <li><a href="/health">/health</a> - Health check</li>
        <li><a href="/api/score">/api/score</a> - Score as JSON</li>
    </ul>
</body>
</html>
"#,
        style = PAGE_STYLE,
        score = result.score_value,
        max = result.max_score,
        percent = percent,
        tenant = html_escape(&result.tenant_id),
        api_ts = html_escape(&result.api_timestamp),
        latency = result.fetch_latency_ms,
        server_time = result.server_time_utc.to_rfc3339(),
    )
}

fn render_error(err: &AppError) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Secure Score Dashboard</title>
    <style>{style}</style>
</head>
<body>
    <h1>Secure Score Dashboard</h1>
    <div class="card err">
        <strong>Status:</strong> Upstream unavailable<br>
        <strong>Error:</strong> {message}
    </div>
    <p><a href="/">Retry</a> &middot; <a href="/health">/health</a></p>
</body>
</html>
"#,
        style = PAGE_STYLE,
        message = html_escape(&err.to_string()),
    )
}

/// Minimal escaping for values interpolated into the page. Upstream-controlled
/// strings (tenant id, timestamps, error bodies) must not inject markup.
fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn dashboard_embeds_score_and_liveness_fields() {
        let result = ScoreResult {
            tenant_id: "abc".to_string(),
            score_value: 450.0,
            max_score: 900.0,
            api_timestamp: "2024-01-01T00:00:00Z".to_string(),
            fetch_latency_ms: 12,
            server_time_utc: Utc::now(),
        };
        let html = render_dashboard(&result);
        assert!(html.contains("450 / 900"));
        assert!(html.contains("50.0%"));
        assert!(html.contains("abc"));
        assert!(html.contains("12 ms"));
    }

    #[test]
    fn escaping_strips_markup_from_upstream_strings() {
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
    }

    #[test]
    fn error_page_carries_message() {
        let err = AppError::auth(Some(401), "invalid client secret");
        let html = render_error(&err);
        assert!(html.contains("invalid client secret"));
        assert!(html.contains("401"));
    }
}
