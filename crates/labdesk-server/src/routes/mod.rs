pub mod health;
pub mod labs;
pub mod reports;

use std::sync::Arc;

use axum::{http::StatusCode, Json, Router};
use labdesk_core::LabId;
use labdesk_service::{LocalService, ServiceError};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::error;

pub struct InnerAppState {
    pub service: LocalService,
}

pub type AppState = Arc<InnerAppState>;

pub type ApiError = (StatusCode, Json<Value>);

pub fn build_router(service: LocalService) -> Router {
    let state = Arc::new(InnerAppState { service });

    Router::new()
        .merge(health::routes())
        .merge(labs::routes())
        .merge(reports::routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub(crate) fn parse_lab_id(raw: &str) -> Result<LabId, ApiError> {
    LabId::parse(raw).map_err(|e| to_error(e.into()))
}

pub(crate) fn to_error(e: ServiceError) -> ApiError {
    let (status, msg) = match &e {
        ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
        ServiceError::InvalidInput(_) => (StatusCode::BAD_REQUEST, e.to_string()),
        ServiceError::Internal(_) => {
            error!("request failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    };
    (status, Json(json!({ "error": msg })))
}
