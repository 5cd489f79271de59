use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use labdesk_core::report::ReportInfo;
use labdesk_core::{Lab, LabId, ReportSubmission};
use labdesk_render::Pipeline;
use labdesk_store::{
    build_id_from_meta_key, report_meta_key, report_pdf_key, report_prefix, report_tex_key,
    ObjectStore,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{GeneratedReport, LabCatalog, LabHtml, LabService, ServiceError};

/// Local implementation: labs from disk, converters run in-process,
/// report artifacts kept in the object store.
pub struct LocalService {
    catalog: LabCatalog,
    pipeline: Pipeline,
    store: Arc<dyn ObjectStore>,
}

impl LocalService {
    pub fn new(catalog: LabCatalog, pipeline: Pipeline, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            catalog,
            pipeline,
            store,
        }
    }

    pub fn catalog(&self) -> &LabCatalog {
        &self.catalog
    }

    async fn read_info(&self, id: &LabId, build_id: &str) -> Result<ReportInfo, ServiceError> {
        let raw = self
            .store
            .get_opt(&report_meta_key(id.as_str(), build_id))
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("report {build_id} for lab {id}")))?;
        serde_json::from_slice(&raw)
            .map_err(|e| ServiceError::Internal(format!("corrupt report metadata {build_id}: {e}")))
    }
}

fn parse_build_id(raw: &str) -> Result<String, ServiceError> {
    Uuid::parse_str(raw)
        .map(|u| u.to_string())
        .map_err(|_| ServiceError::InvalidInput(format!("invalid report id: {raw}")))
}

#[async_trait]
impl LabService for LocalService {
    async fn list_labs(&self) -> Result<Vec<LabId>, ServiceError> {
        self.catalog.list().await
    }

    async fn get_lab(&self, id: &LabId) -> Result<Lab, ServiceError> {
        self.catalog.get(id).await
    }

    async fn get_lab_html(&self, id: &LabId) -> Result<LabHtml, ServiceError> {
        let tex = self.catalog.instructions(id).await?;
        let out = self.pipeline.html.convert(&tex).await;
        Ok(LabHtml {
            html: out.html,
            converted: out.converted,
        })
    }

    async fn generate_report(
        &self,
        id: &LabId,
        submission: &ReportSubmission,
    ) -> Result<GeneratedReport, ServiceError> {
        submission.validate()?;
        let template = self.catalog.template(id).await?;
        let built = self.pipeline.reports.build(id, &template, submission).await?;

        let info = ReportInfo {
            build_id: Uuid::new_v4().to_string(),
            lab_id: id.clone(),
            created_at: Utc::now(),
            placeholder: built.placeholder,
        };
        let meta = serde_json::to_vec(&info)
            .map_err(|e| ServiceError::Internal(format!("encode report metadata: {e}")))?;

        let lab = id.as_str();
        let build = info.build_id.as_str();
        self.store
            .put(&report_tex_key(lab, build), Bytes::from(built.tex))
            .await?;
        self.store
            .put(&report_pdf_key(lab, build), built.pdf.clone())
            .await?;
        // Metadata last: a report is listed only once all its files exist.
        self.store
            .put(&report_meta_key(lab, build), Bytes::from(meta))
            .await?;

        if info.placeholder {
            warn!(lab = %id, build = %info.build_id, "report generated with placeholder PDF");
        } else {
            info!(lab = %id, build = %info.build_id, bytes = built.pdf.len(), "report generated");
        }
        Ok(GeneratedReport {
            info,
            pdf: built.pdf,
        })
    }

    async fn list_reports(&self, id: &LabId) -> Result<Vec<ReportInfo>, ServiceError> {
        let keys = self.store.list(&report_prefix(id.as_str())).await?;
        let mut reports = Vec::new();
        for key in &keys {
            let Some(build_id) = build_id_from_meta_key(key) else {
                continue;
            };
            match self.read_info(id, build_id).await {
                Ok(info) => reports.push(info),
                Err(e) => warn!(lab = %id, build = build_id, "skipping unreadable report: {e}"),
            }
        }
        reports.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(reports)
    }

    async fn get_report(&self, id: &LabId, build_id: &str) -> Result<GeneratedReport, ServiceError> {
        let build_id = parse_build_id(build_id)?;
        let info = self.read_info(id, &build_id).await?;
        let pdf = self
            .store
            .get(&report_pdf_key(id.as_str(), &build_id))
            .await?;
        Ok(GeneratedReport { info, pdf })
    }
}
