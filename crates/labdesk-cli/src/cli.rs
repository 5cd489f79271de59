use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use labdesk_core::{MeasurementTable, ReportSubmission};
use serde_json::Value;

#[derive(Debug, Parser)]
#[command(name = "labdesk", about = "Browse labs and build lab reports on a labdesk server")]
pub struct Cli {
    /// Server URL
    #[arg(long, env = "LABDESK_SERVER_URL", default_value = "http://127.0.0.1:5001")]
    pub server: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List available labs
    Labs,
    /// Print (or save) a lab's instructions as HTML
    Show {
        lab: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Fill in a lab's report template and download the PDF
    Report(ReportArgs),
    /// List reports previously built for a lab
    Reports { lab: String },
    /// Download a previously built report
    Fetch {
        lab: String,
        build_id: String,
        #[arg(long, default_value = "lab_report.pdf")]
        out: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    pub lab: String,

    #[arg(long, default_value = "")]
    pub name: String,

    #[arg(long, default_value = "")]
    pub section: String,

    /// File whose contents become the analysis section
    #[arg(long)]
    pub analysis: Option<PathBuf>,

    /// File whose contents become the conclusion section
    #[arg(long)]
    pub conclusion: Option<PathBuf>,

    /// JSON file holding the measurement table (`{"columns": [...], "rows": [[...]]}`)
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Extra template variable, `key=value`. Values that parse as JSON are
    /// passed as JSON, anything else as a string.
    #[arg(long = "set", value_parser = parse_set)]
    pub vars: Vec<(String, Value)>,

    #[arg(long, default_value = "lab_report.pdf")]
    pub out: PathBuf,
}

const RESERVED_KEYS: &[&str] = &[
    "student_name",
    "section",
    "analysis",
    "conclusion",
    "table_latex",
    "measurements",
];

pub fn parse_set(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in `{raw}`"));
    }
    if RESERVED_KEYS.contains(&key) {
        return Err(format!("`{key}` has its own flag"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

impl ReportArgs {
    pub async fn submission(&self) -> Result<ReportSubmission> {
        let mut sub = ReportSubmission {
            student_name: self.name.clone(),
            section: self.section.clone(),
            ..Default::default()
        };
        if let Some(path) = &self.analysis {
            sub.analysis = read_text(path).await?;
        }
        if let Some(path) = &self.conclusion {
            sub.conclusion = read_text(path).await?;
        }
        if let Some(path) = &self.data {
            let raw = read_text(path).await?;
            let table: MeasurementTable = serde_json::from_str(&raw)
                .with_context(|| format!("parse measurements in {}", path.display()))?;
            sub.measurements = Some(table);
        }
        for (key, value) in &self.vars {
            if sub.extra.insert(key.clone(), value.clone()).is_some() {
                bail!("--set {key} given more than once");
            }
        }
        Ok(sub)
    }
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read {}", path.display()))
}
