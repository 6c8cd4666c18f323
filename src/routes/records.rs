use std::sync::Arc;

use axum::{middleware::from_fn, routing::get, Router};

use crate::{
    handlers::{
        middleware::require_user,
        records::{create_record, delete_record, list_records, update_record},
    },
    models::resource::Resource,
    utils::state::AppState,
};

pub fn record_routes<R: Resource>() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            get(list_records::<R>)
                .post(create_record::<R>)
                .patch(update_record::<R>)
                .delete(delete_record::<R>),
        )
        .route_layer(from_fn(require_user))
}
