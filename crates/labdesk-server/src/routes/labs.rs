use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use labdesk_service::LabService;
use serde_json::{json, Value};

use super::{parse_lab_id, to_error, ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/labs", get(list_labs))
        .route("/lab/{id}", get(get_lab))
        .route("/lab/{id}/html", get(get_lab_html))
}

async fn list_labs(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.service.list_labs().await
        .map(|labs| Json(json!(labs)))
        .map_err(to_error)
}

async fn get_lab(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_lab_id(&id)?;
    state.service.get_lab(&id).await
        .map(|lab| Json(json!(lab)))
        .map_err(to_error)
}

async fn get_lab_html(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_lab_id(&id)?;
    state.service.get_lab_html(&id).await
        .map(|html| Json(json!(html)))
        .map_err(to_error)
}

#[cfg(all(test, unix))]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::test_helpers::test_router;

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let (app, _env) = test_router();
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = get_json("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn lists_labs_as_plain_ids() {
        let (status, body) = get_json("/labs").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!(["optics", "pendulum"]));
    }

    #[tokio::test]
    async fn gets_lab_details() {
        let (status, body) = get_json("/lab/optics").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "optics");
        assert_eq!(body["has_instructions"], true);
        assert_eq!(body["has_template"], false);
    }

    #[tokio::test]
    async fn lab_html_is_wrapped_in_json() {
        let (status, body) = get_json("/lab/pendulum/html").await;
        assert_eq!(status, StatusCode::OK);
        let html = body["html"].as_str().unwrap();
        assert!(html.contains("<h1>Pendulum</h1>"));
        assert!(html.contains("class=\"lab-content\""));
        assert_eq!(body["converted"], true);
    }

    #[tokio::test]
    async fn unknown_lab_is_404() {
        let (status, body) = get_json("/lab/nope/html").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body["error"],
            "not found: Lab instructions not found for: nope"
        );
    }

    #[tokio::test]
    async fn invalid_lab_id_is_400() {
        let (status, body) = get_json("/lab/..hidden/html").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("invalid input"));
    }
}
