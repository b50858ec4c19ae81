//! JSON endpoints for the dashboard page.
//!
//! Store failures are returned as HTTP 500 with a JSON error body rather
//! than as an empty chart.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use energy_client::StoreError;
use serde::{Deserialize, Serialize};

use crate::dashboard::{local_today, Controls, Dashboard, Figure, RelayoutEvent};

pub fn router() -> Router<Arc<Dashboard>> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/figure", get(startup_figure).post(figure))
        .route("/api/figure/relayout", post(relayout))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn startup_figure(State(dashboard): State<Arc<Dashboard>>) -> Result<Json<Figure>, AppError> {
    let controls = dashboard.startup_controls();
    Ok(Json(dashboard.figure(&controls, local_today()).await?))
}

async fn figure(
    State(dashboard): State<Arc<Dashboard>>,
    Json(controls): Json<Controls>,
) -> Result<Json<Figure>, AppError> {
    Ok(Json(dashboard.figure(&controls, local_today()).await?))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RelayoutRequest {
    pub controls: Controls,
    #[serde(default)]
    pub relayout: RelayoutEvent,
}

async fn relayout(
    State(dashboard): State<Arc<Dashboard>>,
    Json(request): Json<RelayoutRequest>,
) -> Result<Response, AppError> {
    match dashboard
        .relayout(&request.controls, &request.relayout, local_today())
        .await?
    {
        Some(fig) => Ok(Json(fig).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

#[derive(Debug)]
pub enum AppError {
    Store(StoreError),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Store(e) => {
                tracing::error!(error = %e, "figure query failed");
                metrics::counter!("dashboard_query_errors_total").increment(1);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use energy_client::{domain::Reading, Store};
    use time::macros::datetime;
    use tower::ServiceExt;

    use crate::config::DashboardConfig;

    async fn app_with(store: Store) -> Router {
        router().with_state(Arc::new(Dashboard::new(store, DashboardConfig::default())))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn seeded() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("energy.db"));
        let readings = vec![
            Reading { timestamp: datetime!(2021-01-03 10:00), consumption: 1.0, temperature: 2.0 },
            Reading { timestamp: datetime!(2021-01-04 10:00), consumption: 2.0, temperature: 3.0 },
        ];
        store.replace_readings(&readings, 100).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (_dir, store) = seeded().await;
        let response = app_with(store)
            .await
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn figure_for_everything() {
        let (_dir, store) = seeded().await;
        let response = app_with(store)
            .await
            .oneshot(post_json(
                "/api/figure",
                serde_json::json!({"resolution": "day", "lookback": "everything", "options": []}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let v = body_json(response).await;
        assert_eq!(v["data"].as_array().unwrap().len(), 1);
        assert_eq!(v["data"][0]["x"], serde_json::json!(["2021-01-03", "2021-01-04"]));
        assert_eq!(v["data"][0]["y"], serde_json::json!([1.0, 2.0]));
    }

    #[tokio::test]
    async fn unrecognized_relayout_is_no_content() {
        let (_dir, store) = seeded().await;
        let response = app_with(store)
            .await
            .oneshot(post_json(
                "/api/figure/relayout",
                serde_json::json!({
                    "controls": {"resolution": "day", "lookback": 30},
                    "relayout": {"dragmode": "pan"}
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn zoom_relayout_returns_hourly_figure() {
        let (_dir, store) = seeded().await;
        let response = app_with(store)
            .await
            .oneshot(post_json(
                "/api/figure/relayout",
                serde_json::json!({
                    "controls": {"resolution": "day", "lookback": 30},
                    "relayout": {"xaxis.range[0]": "2021-01-01", "xaxis.range[1]": "2021-01-06"}
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let v = body_json(response).await;
        assert_eq!(v["layout"]["xaxis"]["title"]["text"], "Hour");
        assert_eq!(v["data"][0]["x"], serde_json::json!(["2021-01-03 10", "2021-01-04 10"]));
        assert_eq!(
            v["layout"]["xaxis"]["range"],
            serde_json::json!(["2021-01-01 00:00:00", "2021-01-06 00:00:00"])
        );
    }

    #[tokio::test]
    async fn missing_store_is_a_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("missing.db"));
        let response = app_with(store)
            .await
            .oneshot(Request::builder().uri("/api/figure").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_json(response).await["error"].is_string());
    }
}
