use std::sync::Arc;

use axum::{routing::get, Router};

use crate::{
    handlers::ratings::{get_rating, submit_rating},
    utils::state::AppState,
};

pub fn rating_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_rating).post(submit_rating))
}
