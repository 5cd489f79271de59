use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{LabId, LabdeskError, MeasurementTable};

pub const NO_DATA_LATEX: &str = "No data submitted.";

/// Data a student submits to fill in a lab's report template.
///
/// Keys not named here land in `extra` and are passed to the template as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSubmission {
    pub student_name: String,
    pub section: String,
    pub analysis: String,
    pub conclusion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_latex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurements: Option<MeasurementTable>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReportSubmission {
    pub fn validate(&self) -> Result<(), LabdeskError> {
        match &self.measurements {
            Some(table) => table.validate(),
            None => Ok(()),
        }
    }

    /// The table to place in the report: explicit LaTeX wins, then the
    /// measurement table, then a fixed "no data" line.
    pub fn table_latex(&self) -> String {
        if let Some(latex) = self.table_latex.as_deref().filter(|s| !s.trim().is_empty()) {
            return latex.to_string();
        }
        match &self.measurements {
            Some(table) if !table.is_empty() => table.to_latex(),
            _ => NO_DATA_LATEX.to_string(),
        }
    }

    /// Variables available to the report template.
    pub fn template_context(&self) -> Map<String, Value> {
        let mut ctx = self.extra.clone();
        ctx.insert("student_name".into(), Value::String(self.student_name.clone()));
        ctx.insert("section".into(), Value::String(self.section.clone()));
        ctx.insert("analysis".into(), Value::String(self.analysis.clone()));
        ctx.insert("conclusion".into(), Value::String(self.conclusion.clone()));
        ctx.insert("table_latex".into(), Value::String(self.table_latex()));
        if let Some(table) = &self.measurements {
            if let Ok(v) = serde_json::to_value(table) {
                ctx.insert("measurements".into(), v);
            }
        }
        ctx
    }
}

/// Metadata of a report produced for a lab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportInfo {
    pub build_id: String,
    pub lab_id: LabId,
    pub created_at: DateTime<Utc>,
    pub placeholder: bool,
}
