use async_trait::async_trait;
use bytes::Bytes;
use labdesk_core::report::ReportInfo;
use labdesk_core::{Lab, LabId, LabdeskError, ReportSubmission};
use labdesk_render::RenderError;
use labdesk_store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<LabdeskError> for ServiceError {
    fn from(e: LabdeskError) -> Self {
        match e {
            LabdeskError::NotFound(msg) => ServiceError::NotFound(msg),
            LabdeskError::InvalidInput(msg) => ServiceError::InvalidInput(msg),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(key) => ServiceError::NotFound(key),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<RenderError> for ServiceError {
    fn from(e: RenderError) -> Self {
        match e {
            // Template syntax errors; missing variables render empty instead.
            RenderError::Template(msg) => ServiceError::InvalidInput(msg),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

/// Instructions rendered for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabHtml {
    pub html: String,
    #[serde(default = "default_converted")]
    pub converted: bool,
}

fn default_converted() -> bool {
    true
}

/// A compiled report together with its metadata.
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub info: ReportInfo,
    pub pdf: Bytes,
}

/// Abstraction over lab and report operations.
///
/// The server programs against this trait with `LocalService`; the CLI uses
/// `HttpService` to reach a running server.
#[async_trait]
pub trait LabService: Send + Sync {
    // -- Labs --
    async fn list_labs(&self) -> Result<Vec<LabId>, ServiceError>;
    async fn get_lab(&self, id: &LabId) -> Result<Lab, ServiceError>;
    async fn get_lab_html(&self, id: &LabId) -> Result<LabHtml, ServiceError>;

    // -- Reports --
    async fn generate_report(
        &self,
        id: &LabId,
        submission: &ReportSubmission,
    ) -> Result<GeneratedReport, ServiceError>;
    async fn list_reports(&self, id: &LabId) -> Result<Vec<ReportInfo>, ServiceError>;
    async fn get_report(&self, id: &LabId, build_id: &str) -> Result<GeneratedReport, ServiceError>;
}
