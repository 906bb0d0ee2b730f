use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;

use quayside_api::app::{self, services::AppServices};
use quayside_infra::{ResearchWorker, WorkerConfig, WorkerHandle};
use quayside_research::{ProviderError, ProviderRequest, ResearchExecutor, ResearchProvider};

struct ScriptedProvider;

#[async_trait]
impl ResearchProvider for ScriptedProvider {
    async fn research(&self, request: ProviderRequest) -> Result<String, ProviderError> {
        Ok(format!("Synthesized finding for: {}", request.query))
    }
}

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
    _worker: Option<WorkerHandle>,
}

impl TestServer {
    /// Server only; jobs stay pending (deterministic queue-state tests).
    async fn spawn() -> Self {
        Self::start(false).await
    }

    /// Server plus a background worker backed by the scripted provider.
    async fn spawn_with_worker() -> Self {
        Self::start(true).await
    }

    async fn start(with_worker: bool) -> Self {
        let services = AppServices::in_memory();

        let worker = with_worker.then(|| {
            let executor = Arc::new(ResearchExecutor::new(Arc::new(ScriptedProvider)));
            ResearchWorker::new(
                services.lifecycle.clone(),
                services.registry.clone(),
                executor,
                WorkerConfig::default().with_poll_interval(Duration::from_millis(20)),
            )
            .spawn()
        });

        // Build app (same router as prod), but bind to an ephemeral port.
        let app = app::build_app(services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            handle,
            _worker: worker,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn create_cluster(client: &reqwest::Client, base_url: &str) -> String {
    let res = client
        .post(format!("{}/clusters", base_url))
        .json(&json!({ "name": "North Range", "region": "Northwest Europe" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

async fn create_port(
    client: &reqwest::Client,
    base_url: &str,
    cluster_id: &str,
    name: &str,
) -> String {
    let res = client
        .post(format!("{}/ports", base_url))
        .json(&json!({
            "cluster_id": cluster_id,
            "name": name,
            "country": "Netherlands",
            "port_authority": "Seeded Authority",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

/// The pipeline is intentionally asynchronous (enqueue vs worker execution).
/// Poll briefly until the job reaches a terminal status.
async fn job_eventually_terminal(
    client: &reqwest::Client,
    base_url: &str,
    job_id: &str,
) -> serde_json::Value {
    for _ in 0..250 {
        let res = client
            .get(format!("{}/research/jobs/{}", base_url, job_id))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let job: serde_json::Value = res.json().await.unwrap();

        match job["status"].as_str().unwrap() {
            "completed" | "failed" => return job,
            _ => tokio::time::sleep(Duration::from_millis(20)).await,
        }
    }

    panic!("job did not reach a terminal status within timeout");
}

#[tokio::test]
async fn health_endpoint_is_up() {
    let srv = TestServer::spawn().await;

    let res = reqwest::Client::new()
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn deep_research_pipeline_runs_to_completion() {
    let srv = TestServer::spawn_with_worker().await;
    let client = reqwest::Client::new();

    let cluster_id = create_cluster(&client, &srv.base_url).await;
    let port_id = create_port(&client, &srv.base_url, &cluster_id, "Rotterdam").await;

    let res = client
        .post(format!("{}/ports/{}/deep-research/start", srv.base_url, port_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let started: serde_json::Value = res.json().await.unwrap();
    let job_id = started["jobId"].as_str().unwrap().to_string();

    let job = job_eventually_terminal(&client, &srv.base_url, &job_id).await;
    assert_eq!(job["status"], "completed");
    assert_eq!(job["progress"], 100);
    assert!(job["error"].is_null());
    assert!(job["completedAt"].is_string());

    // Draft fields carry the full report with every canonical port header.
    let res = client
        .get(format!("{}/ports/{}", srv.base_url, port_id))
        .send()
        .await
        .unwrap();
    let port: serde_json::Value = res.json().await.unwrap();
    let report = port["research"]["last_deep_research_report"].as_str().unwrap();
    for header in [
        "## Governance & Port Authority",
        "## ISPS Risk & Enforcement",
        "## Strategic Intelligence",
    ] {
        assert!(report.contains(header), "missing header: {header}");
    }
    let summary = port["research"]["last_deep_research_summary"].as_str().unwrap();
    assert!(summary.starts_with("Synthesized finding"));
}

#[tokio::test]
async fn duplicate_start_is_idempotent_while_job_is_active() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let cluster_id = create_cluster(&client, &srv.base_url).await;
    let port_id = create_port(&client, &srv.base_url, &cluster_id, "Antwerp").await;

    let url = format!("{}/ports/{}/deep-research/start", srv.base_url, port_id);

    let first: serde_json::Value = client.post(&url).send().await.unwrap().json().await.unwrap();
    let second: serde_json::Value = client.post(&url).send().await.unwrap().json().await.unwrap();

    assert_eq!(first["jobId"], second["jobId"]);
    assert_eq!(second["message"], "deep research already in progress");

    // Exactly one active row for the entity.
    let jobs: serde_json::Value = client
        .get(format!("{}/research/jobs", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(jobs["stats"]["pending"], 1);
    assert_eq!(jobs["stats"]["running"], 0);
}

#[tokio::test]
async fn draft_fields_are_cleared_when_a_job_is_created() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let cluster_id = create_cluster(&client, &srv.base_url).await;
    let port_id = create_port(&client, &srv.base_url, &cluster_id, "Hamburg").await;

    // Seed a draft stamp through the apply gate (bookkeeping fields are
    // written unconditionally).
    client
        .patch(format!("{}/ports/{}/deep-research/apply", srv.base_url, port_id))
        .json(&json!({
            "data_to_update": { "last_deep_research_summary": "stale summary" },
            "approved_fields": []
        }))
        .send()
        .await
        .unwrap();

    client
        .post(format!("{}/ports/{}/deep-research/start", srv.base_url, port_id))
        .send()
        .await
        .unwrap();

    let port: serde_json::Value = client
        .get(format!("{}/ports/{}", srv.base_url, port_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(port["research"]["last_deep_research_report"].is_null());
    assert!(port["research"]["last_deep_research_at"].is_null());
}

#[tokio::test]
async fn start_for_unknown_entity_is_404() {
    let srv = TestServer::spawn().await;

    let res = reqwest::Client::new()
        .post(format!(
            "{}/ports/{}/deep-research/start",
            srv.base_url,
            uuid::Uuid::now_v7()
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn job_status_for_unknown_job_is_404() {
    let srv = TestServer::spawn().await;

    let res = reqwest::Client::new()
        .get(format!(
            "{}/research/jobs/{}",
            srv.base_url,
            uuid::Uuid::now_v7()
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn apply_promotes_only_approved_fields() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let cluster_id = create_cluster(&client, &srv.base_url).await;
    let port_id = create_port(&client, &srv.base_url, &cluster_id, "Bremerhaven").await;

    let res = client
        .patch(format!("{}/ports/{}/deep-research/apply", srv.base_url, port_id))
        .json(&json!({
            "data_to_update": {
                "strategic_notes": "key transshipment hub",
                "port_authority": "Draft Authority (unapproved)"
            },
            "approved_fields": ["strategic_notes"]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["appliedFields"], json!(["strategic_notes"]));

    let port: serde_json::Value = client
        .get(format!("{}/ports/{}", srv.base_url, port_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(port["strategic_notes"], "key transshipment hub");
    assert_eq!(port["port_authority"], "Seeded Authority");
    // Bookkeeping stamp is always written.
    assert!(port["research"]["last_deep_research_at"].is_string());
}

#[tokio::test]
async fn apply_without_payload_is_400() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let cluster_id = create_cluster(&client, &srv.base_url).await;
    let port_id = create_port(&client, &srv.base_url, &cluster_id, "Felixstowe").await;

    let res = client
        .patch(format!("{}/ports/{}/deep-research/apply", srv.base_url, port_id))
        .json(&json!({ "approved_fields": ["strategic_notes"] }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "missing_payload");
}

#[tokio::test]
async fn pipeline_start_enqueues_all_cluster_ports() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let cluster_id = create_cluster(&client, &srv.base_url).await;
    create_port(&client, &srv.base_url, &cluster_id, "Rotterdam").await;
    create_port(&client, &srv.base_url, &cluster_id, "Amsterdam").await;

    let res = client
        .post(format!("{}/research/pipeline/start", srv.base_url))
        .json(&json!({ "clusterId": cluster_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["jobIds"].as_array().unwrap().len(), 2);
    assert_eq!(body["clusterId"], json!(cluster_id));
}

#[tokio::test]
async fn pipeline_start_without_cluster_id_is_400() {
    let srv = TestServer::spawn().await;

    let res = reqwest::Client::new()
        .post(format!("{}/research/pipeline/start", srv.base_url))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "missing_cluster_id");
}

#[tokio::test]
async fn pipeline_start_for_unknown_cluster_is_404() {
    let srv = TestServer::spawn().await;

    let res = reqwest::Client::new()
        .post(format!("{}/research/pipeline/start", srv.base_url))
        .json(&json!({ "clusterId": uuid::Uuid::now_v7().to_string() }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cleanup_reports_zero_when_nothing_is_stale() {
    let srv = TestServer::spawn().await;

    let res = reqwest::Client::new()
        .post(format!("{}/research/jobs/cleanup", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["cleaned"], 0);
    assert!(body["jobIds"].as_array().unwrap().is_empty());
}
