use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use labdesk_core::ReportSubmission;
use labdesk_service::{headers, GeneratedReport, LabService, ServiceError, REPORT_FILENAME};
use serde_json::{json, Value};

use super::{parse_lab_id, to_error, ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/lab/{id}/pdf", post(generate_report))
        .route("/lab/{id}/reports", get(list_reports))
        .route("/lab/{id}/reports/{build_id}", get(get_report))
}

/// An absent or empty body (or JSON `null`) is an empty submission.
fn parse_submission(body: &[u8]) -> Result<ReportSubmission, ServiceError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ReportSubmission::default());
    }
    serde_json::from_slice::<Option<ReportSubmission>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|e| ServiceError::InvalidInput(format!("malformed report submission: {e}")))
}

async fn generate_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let id = parse_lab_id(&id)?;
    let submission = parse_submission(&body).map_err(to_error)?;
    state.service.generate_report(&id, &submission).await
        .map(pdf_response)
        .map_err(to_error)
}

async fn list_reports(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_lab_id(&id)?;
    state.service.list_reports(&id).await
        .map(|reports| Json(json!(reports)))
        .map_err(to_error)
}

async fn get_report(
    State(state): State<AppState>,
    Path((id, build_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let id = parse_lab_id(&id)?;
    state.service.get_report(&id, &build_id).await
        .map(pdf_response)
        .map_err(to_error)
}

fn pdf_response(report: GeneratedReport) -> Response {
    let info = &report.info;
    let mut map = HeaderMap::new();
    map.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
    if let Ok(v) = HeaderValue::from_str(&format!("attachment; filename=\"{REPORT_FILENAME}\"")) {
        map.insert(header::CONTENT_DISPOSITION, v);
    }
    if let Ok(v) = HeaderValue::from_str(&info.build_id) {
        map.insert(headers::REPORT_ID, v);
    }
    if let Ok(v) = HeaderValue::from_str(&info.created_at.to_rfc3339()) {
        map.insert(headers::REPORT_CREATED_AT, v);
    }
    map.insert(
        headers::REPORT_PLACEHOLDER,
        HeaderValue::from_static(if info.placeholder { "true" } else { "false" }),
    );
    (map, report.pdf).into_response()
}

#[cfg(all(test, unix))]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::test_helpers::{test_router, TEST_PDF};

    async fn post_pdf(app: axum::Router, uri: &str, body: &str) -> Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn body_bytes(resp: Response) -> Bytes {
        axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap()
    }

    #[test]
    fn submission_parsing() {
        assert_eq!(parse_submission(b"").unwrap(), ReportSubmission::default());
        assert_eq!(parse_submission(b" \n").unwrap(), ReportSubmission::default());
        assert_eq!(parse_submission(b"null").unwrap(), ReportSubmission::default());
        assert_eq!(
            parse_submission(br#"{"student_name":"Ada"}"#).unwrap().student_name,
            "Ada"
        );
        assert!(matches!(
            parse_submission(b"{not json"),
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn generates_pdf_download() {
        let (app, _env) = test_router();
        let resp = post_pdf(
            app,
            "/lab/pendulum/pdf",
            r#"{"student_name":"Ada","section":"B2"}"#,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let h = resp.headers();
        assert_eq!(h[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            h[header::CONTENT_DISPOSITION],
            "attachment; filename=\"lab_report.pdf\""
        );
        assert_eq!(h[headers::REPORT_PLACEHOLDER], "false");
        assert!(h.contains_key(headers::REPORT_ID));
        assert_eq!(body_bytes(resp).await.as_ref(), TEST_PDF.as_bytes());
    }

    #[tokio::test]
    async fn empty_body_is_accepted() {
        let (app, _env) = test_router();
        let resp = post_pdf(app, "/lab/pendulum/pdf", "").await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_body_is_400() {
        let (app, _env) = test_router();
        let resp = post_pdf(app, "/lab/pendulum/pdf", "{oops").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn lab_without_template_is_404() {
        let (app, _env) = test_router();
        let resp = post_pdf(app, "/lab/optics/pdf", "{}").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
        assert_eq!(
            body["error"],
            "not found: LaTeX template not found for lab optics"
        );
    }

    #[tokio::test]
    async fn stored_report_can_be_fetched_again() {
        let (app, _env) = test_router();
        let resp = post_pdf(app.clone(), "/lab/pendulum/pdf", "{}").await;
        let build_id = resp.headers()[headers::REPORT_ID]
            .to_str()
            .unwrap()
            .to_string();

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/lab/pendulum/reports")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let listed: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
        assert_eq!(listed[0]["build_id"], build_id.as_str());

        let resp = app
            .oneshot(
                Request::builder()
                    .uri(format!("/lab/pendulum/reports/{build_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[headers::REPORT_ID], build_id.as_str());
        assert_eq!(body_bytes(resp).await.as_ref(), TEST_PDF.as_bytes());
    }
}
