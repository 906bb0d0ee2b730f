//! Research pipeline endpoints: job status, cluster-wide kick-off, stale-job
//! cleanup and the realtime event stream.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{
        sse::{Event as SseEvent, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Json, Router,
};
use tokio_stream::{wrappers::BroadcastStream, StreamExt};

use quayside_core::{EntityId, EntityKind};
use quayside_infra::{EnqueueOutcome, JobId, RegistryStore};
use quayside_registry::ClusterId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/pipeline/start", post(start_pipeline))
        .route("/jobs", get(list_jobs))
        .route("/jobs/cleanup", post(cleanup_jobs))
        .route("/jobs/:id", get(get_job))
        .route("/stream", get(stream))
}

/// Shared handler body for the per-entity `deep-research/start` endpoints.
pub async fn start_research(
    services: &AppServices,
    kind: EntityKind,
    raw_id: &str,
) -> axum::response::Response {
    let entity_id = match errors::parse_entity_id(raw_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.lifecycle.enqueue(kind, entity_id).await {
        Ok(EnqueueOutcome::Created(job)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "jobId": job.id.to_string(),
                "status": job.status.as_str(),
                "message": "deep research started",
            })),
        )
            .into_response(),
        Ok(EnqueueOutcome::AlreadyActive(job)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "jobId": job.id.to_string(),
                "status": job.status.as_str(),
                "message": "deep research already in progress",
            })),
        )
            .into_response(),
        Err(e) => errors::lifecycle_error_to_response(e),
    }
}

pub async fn start_pipeline(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::PipelineStartRequest>,
) -> axum::response::Response {
    let Some(raw_cluster_id) = body.cluster_id else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "missing_cluster_id",
            "clusterId is required",
        );
    };
    let cluster_id = match errors::parse_entity_id(&raw_cluster_id) {
        Ok(v) => ClusterId::new(v),
        Err(resp) => return resp,
    };

    match services.registry.get_cluster(cluster_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "cluster not found")
        }
        Err(e) => return errors::registry_error_to_response(e),
    }

    let filter: Option<HashSet<EntityId>> = match &body.port_ids {
        Some(raw_ids) => {
            let mut ids = HashSet::new();
            for raw in raw_ids {
                match errors::parse_entity_id(raw) {
                    Ok(id) => {
                        ids.insert(id);
                    }
                    Err(resp) => return resp,
                }
            }
            Some(ids)
        }
        None => None,
    };

    let ports = match services.registry.ports_in_cluster(cluster_id).await {
        Ok(ports) => ports,
        Err(e) => return errors::registry_error_to_response(e),
    };

    let mut job_ids = Vec::new();
    for port in ports {
        if let Some(filter) = &filter {
            if !filter.contains(&port.id.0) {
                continue;
            }
        }
        // A dedup hit contributes the already-active job's id; either way the
        // caller gets one job id per requested port.
        match services.lifecycle.enqueue(EntityKind::Port, port.id.0).await {
            Ok(outcome) => job_ids.push(outcome.job().id.to_string()),
            Err(e) => return errors::lifecycle_error_to_response(e),
        }
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "jobIds": job_ids,
            "clusterId": raw_cluster_id,
            "message": format!("deep research queued for {} port(s)", job_ids.len()),
        })),
    )
        .into_response()
}

pub async fn get_job(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let job_id = match id.parse::<JobId>() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid job id")
        }
    };

    match services.lifecycle.get(job_id).await {
        Ok(Some(job)) => (StatusCode::OK, Json(dto::job_to_json(&job))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "job not found"),
        Err(e) => errors::lifecycle_error_to_response(e),
    }
}

pub async fn list_jobs(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let jobs = match services.lifecycle.recent(100).await {
        Ok(jobs) => jobs,
        Err(e) => return errors::lifecycle_error_to_response(e),
    };
    let stats = match services.lifecycle.stats().await {
        Ok(stats) => stats,
        Err(e) => return errors::lifecycle_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "jobs": jobs.iter().map(dto::job_to_json).collect::<Vec<_>>(),
            "stats": stats,
        })),
    )
        .into_response()
}

pub async fn cleanup_jobs(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.reaper.reap().await {
        Ok(reaped) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "cleaned": reaped.len(),
                "jobIds": reaped.iter().map(|id| id.to_string()).collect::<Vec<_>>(),
                "message": format!("{} stale job(s) cleaned up", reaped.len()),
            })),
        )
            .into_response(),
        Err(e) => errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "cleanup_failed",
            e.to_string(),
        ),
    }
}

/// SSE stream of job lifecycle events (lossy broadcast; late subscribers only
/// see transitions from now on).
pub async fn stream(
    Extension(services): Extension<Arc<AppServices>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, axum::Error>>> {
    let events = BroadcastStream::new(services.lifecycle.subscribe())
        .filter_map(|event| event.ok())
        .map(|event| SseEvent::default().event("job").json_data(&event));

    Sse::new(events).keep_alive(KeepAlive::default())
}
