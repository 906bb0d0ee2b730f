use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};

use quayside_core::EntityKind;
use quayside_infra::RegistryStore;
use quayside_registry::{Port, PortId, PortReview};

use crate::app::routes::research::start_research;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_port).get(list_ports))
        .route("/:id", get(get_port))
        .route("/:id/deep-research/start", post(start_deep_research))
        .route("/:id/deep-research/apply", patch(apply_deep_research))
}

pub async fn create_port(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreatePortRequest>,
) -> axum::response::Response {
    match services.registry.get_cluster(body.cluster_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "cluster not found")
        }
        Err(e) => return errors::registry_error_to_response(e),
    }

    let mut port = Port::new(body.cluster_id, body.name, body.country);
    port.locode = body.locode;
    port.latitude = body.latitude;
    port.longitude = body.longitude;
    port.port_authority = body.port_authority;
    port.governance_model = body.governance_model;

    match services.registry.insert_port(port.clone()).await {
        Ok(()) => (StatusCode::CREATED, Json(port)).into_response(),
        Err(e) => errors::registry_error_to_response(e),
    }
}

pub async fn list_ports(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.registry.list_ports().await {
        Ok(items) => {
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::registry_error_to_response(e),
    }
}

pub async fn get_port(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let entity_id = match errors::parse_entity_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.registry.get_port(PortId::new(entity_id)).await {
        Ok(Some(port)) => (StatusCode::OK, Json(port)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "port not found"),
        Err(e) => errors::registry_error_to_response(e),
    }
}

pub async fn start_deep_research(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    start_research(&services, EntityKind::Port, &id).await
}

pub async fn apply_deep_research(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::ApplyRequest<PortReview>>,
) -> axum::response::Response {
    let entity_id = match errors::parse_entity_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let Some(review) = body.data_to_update else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "missing_payload",
            "data_to_update is required",
        );
    };

    let mut port = match services.registry.get_port(PortId::new(entity_id)).await {
        Ok(Some(port)) => port,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "port not found")
        }
        Err(e) => return errors::registry_error_to_response(e),
    };

    let applied = review.apply_to(&mut port, &body.approved_fields);

    match services.registry.update_port(port.clone()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "entity": port,
                "appliedFields": applied,
                "message": format!("applied {} field(s)", applied.len()),
            })),
        )
            .into_response(),
        Err(e) => errors::registry_error_to_response(e),
    }
}
