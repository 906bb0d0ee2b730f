use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use quayside_infra::RegistryStore;
use quayside_registry::{ClusterId, PortCluster};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_cluster).get(list_clusters))
        .route("/:id", get(get_cluster))
        .route("/:id/ports", get(list_cluster_ports))
}

pub async fn create_cluster(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateClusterRequest>,
) -> axum::response::Response {
    let mut cluster = PortCluster::new(body.name, body.region);
    cluster.countries = body.countries;
    cluster.description = body.description;

    match services.registry.insert_cluster(cluster.clone()).await {
        Ok(()) => (StatusCode::CREATED, Json(cluster)).into_response(),
        Err(e) => errors::registry_error_to_response(e),
    }
}

pub async fn list_clusters(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.registry.list_clusters().await {
        Ok(items) => {
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::registry_error_to_response(e),
    }
}

pub async fn get_cluster(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let entity_id = match errors::parse_entity_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.registry.get_cluster(ClusterId::new(entity_id)).await {
        Ok(Some(cluster)) => (StatusCode::OK, Json(cluster)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "cluster not found"),
        Err(e) => errors::registry_error_to_response(e),
    }
}

pub async fn list_cluster_ports(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let entity_id = match errors::parse_entity_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let cluster_id = ClusterId::new(entity_id);

    match services.registry.get_cluster(cluster_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "cluster not found")
        }
        Err(e) => return errors::registry_error_to_response(e),
    }

    match services.registry.ports_in_cluster(cluster_id).await {
        Ok(items) => {
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::registry_error_to_response(e),
    }
}
