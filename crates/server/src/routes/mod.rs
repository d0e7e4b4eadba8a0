use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::deployment::Deployment;

pub mod events;
pub mod family;
pub mod goals;
pub mod health;
pub mod insights;
pub mod journal;
pub mod profile;
pub mod progress;
pub mod routine;

pub fn router(deployment: Deployment) -> Router {
    let api = Router::new()
        .merge(health::router(&deployment))
        .merge(profile::router(&deployment))
        .merge(routine::router(&deployment))
        .merge(goals::router(&deployment))
        .merge(journal::router(&deployment))
        .merge(family::router(&deployment))
        .merge(insights::router(&deployment))
        .merge(progress::router(&deployment))
        .merge(events::router(&deployment));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(deployment)
}
