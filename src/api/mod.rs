use axum::{
    Router,
    http::HeaderValue,
    response::Redirect,
    routing::get,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

mod error;
mod pages;
pub mod realtime;
mod users;

pub use error::ApiError;
pub use pages::PageVariant;

use crate::realtime::Broadcaster;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<tokio::sync::RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn broadcaster(&self) -> &Arc<Broadcaster> {
        &self.shared.broadcaster
    }
}

pub fn create_app_state(shared: Arc<SharedState>) -> Arc<AppState> {
    Arc::new(AppState { shared })
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = {
        let config = state.config().read().await;
        config.server.cors_allowed_origins.clone()
    };

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/", get(|| async { Redirect::to("/crud/") }))
        .route("/crud/", get(users::index).post(users::index))
        .route(
            "/crud/basic",
            get(users::basic_page).post(users::basic_submit),
        )
        .route(
            "/crud/basic-edit/{user_id}",
            get(users::basic_edit_page).post(users::basic_edit_submit),
        )
        .route(
            "/crud/websocket",
            get(users::realtime_page).post(users::realtime_submit),
        )
        .route(
            "/crud/websocket-edit/{user_id}",
            get(users::realtime_edit_page).post(users::realtime_edit_submit),
        )
        .route("/websocket/user_refresh", get(realtime::user_refresh))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
