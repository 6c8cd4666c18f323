pub mod ratings;
pub mod records;

use axum::{
    extract::{Request, State},
    middleware::{from_fn, Next},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    handlers::{
        health::{health_check, test_connection},
        middleware::session_middleware,
    },
    models::{article::Articles, news::News, tool::Tools},
    routes::{ratings::rating_routes, records::record_routes},
    utils::state::AppState,
};

pub fn make_app(state: Arc<AppState>) -> Router {
    let session_state = state.clone();
    let app = Router::new()
        .route("/", get(health_check))
        .route("/api/test-connection", get(test_connection))
        .nest("/api/posts", record_routes::<Articles>())
        .nest("/api/news", record_routes::<News>())
        .nest("/api/tools", record_routes::<Tools>())
        .nest("/api/ratings", rating_routes())
        .layer(from_fn(move |req: Request, next: Next| {
            session_middleware(State(session_state.clone()), req, next)
        }))
        .layer(TraceLayer::new_for_http())
        .with_state(state);
    info!("Application initialized successfully");

    app
}
