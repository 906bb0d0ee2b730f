use axum::Router;

pub mod clusters;
pub mod operators;
pub mod ports;
pub mod research;
pub mod system;
pub mod terminals;

/// Router for all dashboard and pipeline endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/clusters", clusters::router())
        .nest("/ports", ports::router())
        .nest("/terminals", terminals::router())
        .nest("/operators", operators::router())
        .nest("/research", research::router())
}
