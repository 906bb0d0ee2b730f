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
use quayside_registry::{Terminal, TerminalId, TerminalReview};

use crate::app::routes::research::start_research;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_terminal).get(list_terminals))
        .route("/:id", get(get_terminal))
        .route("/:id/deep-research/start", post(start_deep_research))
        .route("/:id/deep-research/apply", patch(apply_deep_research))
}

pub async fn create_terminal(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateTerminalRequest>,
) -> axum::response::Response {
    match services.registry.get_port(body.port_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "port not found")
        }
        Err(e) => return errors::registry_error_to_response(e),
    }

    let mut terminal = Terminal::new(body.port_id, body.name, body.terminal_type);
    terminal.operator_name = body.operator_name;
    terminal.cargo_types = body.cargo_types;

    match services.registry.insert_terminal(terminal.clone()).await {
        Ok(()) => (StatusCode::CREATED, Json(terminal)).into_response(),
        Err(e) => errors::registry_error_to_response(e),
    }
}

pub async fn list_terminals(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.registry.list_terminals().await {
        Ok(items) => {
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::registry_error_to_response(e),
    }
}

pub async fn get_terminal(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let entity_id = match errors::parse_entity_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.registry.get_terminal(TerminalId::new(entity_id)).await {
        Ok(Some(terminal)) => (StatusCode::OK, Json(terminal)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "terminal not found"),
        Err(e) => errors::registry_error_to_response(e),
    }
}

pub async fn start_deep_research(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    start_research(&services, EntityKind::Terminal, &id).await
}

pub async fn apply_deep_research(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::ApplyRequest<TerminalReview>>,
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

    let mut terminal = match services.registry.get_terminal(TerminalId::new(entity_id)).await {
        Ok(Some(terminal)) => terminal,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "terminal not found")
        }
        Err(e) => return errors::registry_error_to_response(e),
    };

    let applied = review.apply_to(&mut terminal, &body.approved_fields);

    match services.registry.update_terminal(terminal.clone()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "entity": terminal,
                "appliedFields": applied,
                "message": format!("applied {} field(s)", applied.len()),
            })),
        )
            .into_response(),
        Err(e) => errors::registry_error_to_response(e),
    }
}
