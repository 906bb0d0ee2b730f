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
use quayside_registry::{OperatorId, OperatorReview, TerminalOperator};

use crate::app::routes::research::start_research;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_operator).get(list_operators))
        .route("/:id", get(get_operator))
        .route("/:id/deep-research/start", post(start_deep_research))
        .route("/:id/deep-research/apply", patch(apply_deep_research))
}

pub async fn create_operator(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateOperatorRequest>,
) -> axum::response::Response {
    let mut operator = TerminalOperator::new(body.name);
    operator.headquarters_country = body.headquarters_country;
    operator.parent_company = body.parent_company;
    operator.countries_of_operation = body.countries_of_operation;

    match services.registry.insert_operator(operator.clone()).await {
        Ok(()) => (StatusCode::CREATED, Json(operator)).into_response(),
        Err(e) => errors::registry_error_to_response(e),
    }
}

pub async fn list_operators(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.registry.list_operators().await {
        Ok(items) => {
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::registry_error_to_response(e),
    }
}

pub async fn get_operator(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let entity_id = match errors::parse_entity_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.registry.get_operator(OperatorId::new(entity_id)).await {
        Ok(Some(operator)) => (StatusCode::OK, Json(operator)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "operator not found"),
        Err(e) => errors::registry_error_to_response(e),
    }
}

pub async fn start_deep_research(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    start_research(&services, EntityKind::TerminalOperator, &id).await
}

pub async fn apply_deep_research(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::ApplyRequest<OperatorReview>>,
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

    let mut operator = match services.registry.get_operator(OperatorId::new(entity_id)).await {
        Ok(Some(operator)) => operator,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "operator not found")
        }
        Err(e) => return errors::registry_error_to_response(e),
    };

    let applied = review.apply_to(&mut operator, &body.approved_fields);

    match services.registry.update_operator(operator.clone()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "entity": operator,
                "appliedFields": applied,
                "message": format!("applied {} field(s)", applied.len()),
            })),
        )
            .into_response(),
        Err(e) => errors::registry_error_to_response(e),
    }
}
