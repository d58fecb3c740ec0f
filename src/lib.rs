pub mod config;
pub mod logging;
pub mod phrases;
pub mod response;
pub mod routes;
pub mod screen;
pub mod services;
pub mod state;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::phrases::PhraseError;
use crate::state::AppState;

pub fn create_app(config: &Config) -> Result<axum::Router, PhraseError> {
    let state = AppState::from_config(config)?;
    Ok(app_with_state(state))
}

pub fn app_with_state(state: AppState) -> axum::Router {
    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
