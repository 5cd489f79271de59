//! A router backed by throwaway lab and data directories and fake converters.

use std::path::Path;

use axum::Router;
use labdesk_render::test_helpers::{fake_tectonic, fake_tool};
use labdesk_render::{Pipeline, PipelineConfig};
use labdesk_service::{LabCatalog, LocalService};
use labdesk_store::{create_store, StoreConfig};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Bytes every report built by the fake compiler contains.
pub const TEST_PDF: &str = "%PDF-1.5 test report";

/// Keeps the temporary directories alive for as long as the router is used.
pub struct TestEnv {
    pub labs: TempDir,
    pub data: TempDir,
    pub tools: TempDir,
}

fn seed_labs(root: &Path) {
    let pendulum = root.join("pendulum");
    std::fs::create_dir_all(&pendulum).unwrap();
    std::fs::write(pendulum.join("instructions.tex"), r"\section{Pendulum}").unwrap();
    std::fs::write(
        pendulum.join("template.tex"),
        "{{ student_name }} ({{ section }})\n{{ table_latex }}\n",
    )
    .unwrap();

    let optics = root.join("optics");
    std::fs::create_dir_all(&optics).unwrap();
    std::fs::write(optics.join("instructions.tex"), r"\section{Optics}").unwrap();
}

pub fn test_service() -> (LocalService, TestEnv) {
    let env = TestEnv {
        labs: tempfile::tempdir().unwrap(),
        data: tempfile::tempdir().unwrap(),
        tools: tempfile::tempdir().unwrap(),
    };
    seed_labs(env.labs.path());

    let pipeline = Pipeline::new(&PipelineConfig {
        pandoc: fake_tool(env.tools.path(), "pandoc", r#"echo "<h1>Pendulum</h1>""#),
        tectonic: fake_tectonic(env.tools.path(), TEST_PDF),
        ..Default::default()
    });
    let store = create_store(&StoreConfig {
        local_data_dir: Some(env.data.path().to_string_lossy().into_owned()),
    })
    .unwrap();

    let service = LocalService::new(LabCatalog::new(env.labs.path()), pipeline, store);
    (service, env)
}

pub fn test_router() -> (Router, TestEnv) {
    let (service, env) = test_service();
    (crate::routes::build_router(service), env)
}

/// A server listening on an ephemeral localhost port.
pub struct TestServer {
    pub base_url: String,
    pub env: TestEnv,
    _handle: tokio::task::JoinHandle<()>,
}

pub async fn spawn_test_server() -> TestServer {
    let (app, env) = test_router();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url: format!("http://{addr}"),
        env,
        _handle: handle,
    }
}
