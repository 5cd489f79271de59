use async_trait::async_trait;
use chrono::{DateTime, Utc};
use labdesk_core::report::ReportInfo;
use labdesk_core::{Lab, LabId, ReportSubmission};
use reqwest::{Client, StatusCode};

use crate::{headers, GeneratedReport, LabHtml, LabService, ServiceError};

/// Async HTTP client implementation of LabService.
/// Connects to a running labdesk-server.
pub struct HttpService {
    base_url: String,
    client: Client,
}

impl HttpService {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
        }
    }

    /// Check if the server is reachable.
    pub async fn health_check(&self) -> Result<(), ServiceError> {
        let resp = self
            .client
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Internal(format!("connection failed: {e}")))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ServiceError::Internal(format!(
                "health check failed: {}",
                resp.status()
            )))
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let resp = self
            .client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        handle_response(resp).await
    }
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        resp.json::<T>()
            .await
            .map_err(|e| ServiceError::Internal(format!("json decode: {e}")))
    } else {
        Err(parse_error_with_status(status, resp).await)
    }
}

/// Decode a PDF response and the metadata carried in its headers.
async fn read_report(id: &LabId, resp: reqwest::Response) -> Result<GeneratedReport, ServiceError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(parse_error_with_status(status, resp).await);
    }

    let header = |name: &str| {
        resp.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let build_id = header(headers::REPORT_ID)
        .ok_or_else(|| ServiceError::Internal(format!("response missing {}", headers::REPORT_ID)))?;
    let created_at = header(headers::REPORT_CREATED_AT)
        .and_then(|v| DateTime::parse_from_rfc3339(&v).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);
    let placeholder = header(headers::REPORT_PLACEHOLDER).as_deref() == Some("true");

    let pdf = resp
        .bytes()
        .await
        .map_err(|e| ServiceError::Internal(format!("read body: {e}")))?;
    Ok(GeneratedReport {
        info: ReportInfo {
            build_id,
            lab_id: id.clone(),
            created_at,
            placeholder,
        },
        pdf,
    })
}

async fn parse_error_with_status(
    status: StatusCode,
    resp: reqwest::Response,
) -> ServiceError {
    let body = resp.text().await.unwrap_or_default();
    let msg = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"].as_str().map(String::from))
        .unwrap_or(body);

    if status == StatusCode::NOT_FOUND {
        ServiceError::NotFound(msg)
    } else if status == StatusCode::BAD_REQUEST {
        ServiceError::InvalidInput(msg)
    } else {
        ServiceError::Internal(msg)
    }
}

#[async_trait]
impl LabService for HttpService {
    async fn list_labs(&self) -> Result<Vec<LabId>, ServiceError> {
        self.get_json("/labs").await
    }

    async fn get_lab(&self, id: &LabId) -> Result<Lab, ServiceError> {
        self.get_json(&format!("/lab/{id}")).await
    }

    async fn get_lab_html(&self, id: &LabId) -> Result<LabHtml, ServiceError> {
        self.get_json(&format!("/lab/{id}/html")).await
    }

    async fn generate_report(
        &self,
        id: &LabId,
        submission: &ReportSubmission,
    ) -> Result<GeneratedReport, ServiceError> {
        let resp = self
            .client
            .post(format!("{}/lab/{id}/pdf", self.base_url))
            .json(submission)
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        read_report(id, resp).await
    }

    async fn list_reports(&self, id: &LabId) -> Result<Vec<ReportInfo>, ServiceError> {
        self.get_json(&format!("/lab/{id}/reports")).await
    }

    async fn get_report(&self, id: &LabId, build_id: &str) -> Result<GeneratedReport, ServiceError> {
        let resp = self
            .client
            .get(format!("{}/lab/{id}/reports/{build_id}", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        read_report(id, resp).await
    }
}
