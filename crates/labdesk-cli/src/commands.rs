use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use labdesk_core::LabId;
use labdesk_service::{GeneratedReport, LabService};
use tracing::warn;

use crate::cli::{Command, ReportArgs};

pub async fn run(svc: &dyn LabService, command: &Command, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Labs => {
            for lab in svc.list_labs().await? {
                writeln!(out, "{lab}")?;
            }
        }
        Command::Show { lab, out: path } => {
            let html = svc.get_lab_html(&lab_id(lab)?).await?;
            if !html.converted {
                warn!(lab = %lab, "instructions could not be converted, showing the error panel");
            }
            match path {
                Some(path) => {
                    write_file(path, html.html.as_bytes()).await?;
                    writeln!(out, "wrote {}", path.display())?;
                }
                None => writeln!(out, "{}", html.html)?,
            }
        }
        Command::Report(args) => {
            let report = report(svc, args).await?;
            writeln!(
                out,
                "wrote {} (report {})",
                args.out.display(),
                report.info.build_id
            )?;
        }
        Command::Reports { lab } => {
            let reports = svc.list_reports(&lab_id(lab)?).await?;
            if reports.is_empty() {
                writeln!(out, "No reports for {lab}.")?;
            }
            for info in reports {
                writeln!(
                    out,
                    "{:<38} {:<26} {}",
                    info.build_id,
                    info.created_at.to_rfc3339(),
                    if info.placeholder { "placeholder" } else { "" },
                )?;
            }
        }
        Command::Fetch { lab, build_id, out: path } => {
            let report = svc.get_report(&lab_id(lab)?, build_id).await?;
            save_pdf(&report, path).await?;
            writeln!(out, "wrote {}", path.display())?;
        }
    }
    Ok(())
}

/// Build a report from the command-line arguments and save the PDF.
pub async fn report(svc: &dyn LabService, args: &ReportArgs) -> Result<GeneratedReport> {
    let id = lab_id(&args.lab)?;
    let submission = args.submission().await?;
    let report = svc.generate_report(&id, &submission).await?;
    save_pdf(&report, &args.out).await?;
    Ok(report)
}

async fn save_pdf(report: &GeneratedReport, path: &Path) -> Result<()> {
    if report.info.placeholder {
        warn!(
            build = %report.info.build_id,
            "server could not compile the report; saved PDF is a placeholder"
        );
    }
    write_file(path, &report.pdf).await
}

async fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    tokio::fs::write(path, data)
        .await
        .with_context(|| format!("write {}", path.display()))
}

fn lab_id(raw: &str) -> Result<LabId> {
    LabId::parse(raw).with_context(|| format!("bad lab name `{raw}`"))
}

#[cfg(all(test, unix))]
mod tests {
    use clap::Parser;
    use labdesk_server::test_helpers::{spawn_test_server, TEST_PDF};
    use labdesk_service::HttpService;

    use super::*;
    use crate::cli::Cli;

    async fn run_cli(base_url: &str, argv: &[&str]) -> Result<String> {
        let cli = Cli::try_parse_from(std::iter::once("labdesk").chain(argv.iter().copied()))?;
        let svc = HttpService::new(base_url);
        let mut out = Vec::new();
        run(&svc, &cli.command, &mut out).await?;
        Ok(String::from_utf8(out)?)
    }

    #[tokio::test]
    async fn lists_labs() {
        let server = spawn_test_server().await;
        let out = run_cli(&server.base_url, &["labs"]).await.unwrap();
        assert_eq!(out, "optics\npendulum\n");
    }

    #[tokio::test]
    async fn show_writes_html_file() {
        let server = spawn_test_server().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pendulum.html");
        run_cli(
            &server.base_url,
            &["show", "pendulum", "--out", path.to_str().unwrap()],
        )
        .await
        .unwrap();
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("<h1>Pendulum</h1>"));
    }

    #[tokio::test]
    async fn report_then_fetch() {
        let server = spawn_test_server().await;
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("report.pdf");
        let out = run_cli(
            &server.base_url,
            &["report", "pendulum", "--name", "Ada", "--out", first.to_str().unwrap()],
        )
        .await
        .unwrap();
        assert!(out.starts_with("wrote "));
        assert_eq!(std::fs::read(&first).unwrap(), TEST_PDF.as_bytes());

        let listing = run_cli(&server.base_url, &["reports", "pendulum"]).await.unwrap();
        let build_id = listing.split_whitespace().next().unwrap().to_string();
        assert!(out.contains(&build_id));

        let second = dir.path().join("again.pdf");
        run_cli(
            &server.base_url,
            &["fetch", "pendulum", &build_id, "--out", second.to_str().unwrap()],
        )
        .await
        .unwrap();
        assert_eq!(std::fs::read(&second).unwrap(), TEST_PDF.as_bytes());
    }

    #[tokio::test]
    async fn no_reports_yet() {
        let server = spawn_test_server().await;
        let out = run_cli(&server.base_url, &["reports", "optics"]).await.unwrap();
        assert_eq!(out, "No reports for optics.\n");
    }

    #[tokio::test]
    async fn missing_template_is_an_error() {
        let server = spawn_test_server().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        let err = run_cli(
            &server.base_url,
            &["report", "optics", "--out", path.to_str().unwrap()],
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("LaTeX template not found"));
        assert!(!path.exists());
    }
}
