use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde_json::Value;
use tracing::info;

use crate::{
    models::{
        error::Error,
        jwt::Session,
        rating::{RatingQuery, RatingSubmission, RatingSummary, RATINGS_COLLECTION},
    },
    store::{Document, Filter, FindOptions},
    utils::state::AppState,
};

fn rating_of(document: &Document) -> Option<i64> {
    document.get("rating").and_then(Value::as_i64)
}

pub async fn get_rating(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Query(query): Query<RatingQuery>,
) -> Result<Json<RatingSummary>, Error> {
    let post_id = query
        .post_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::bad_request("Post ID is required"))?;

    let failed = |e| Error::store("Failed to fetch rating", e);
    let store = state.store.get().await.map_err(failed)?;
    let by_post = Filter::new().eq("postId", post_id);

    let user_rating = match session.user() {
        Some(user) => store
            .find_one(RATINGS_COLLECTION, &by_post.clone().eq("userId", user))
            .await
            .map_err(failed)?
            .as_ref()
            .and_then(rating_of),
        None => None,
    };

    let ratings: Vec<i64> = store
        .find(RATINGS_COLLECTION, &by_post, &FindOptions::default())
        .await
        .map_err(failed)?
        .iter()
        .filter_map(rating_of)
        .collect();

    Ok(Json(RatingSummary::new(&ratings, user_rating)))
}

/// Records the caller's rating for a post, replacing any earlier one.
pub async fn submit_rating(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, Error> {
    let Some(user) = session.user() else {
        return Err(Error::unauthorized("Unauthorized"));
    };

    let submission: RatingSubmission =
        serde_json::from_value(payload).map_err(|e| Error::bad_request(&e.to_string()))?;
    let (post_id, rating) = submission
        .validate()
        .map_err(|e| Error::bad_request(&e))?;

    let failed = |e| Error::store("Failed to save rating", e);
    let store = state.store.get().await.map_err(failed)?;

    let key = Filter::new().eq("postId", post_id).eq("userId", user);
    let mut set = Document::new();
    set.insert("rating".to_string(), Value::from(rating));

    let stored = store
        .upsert(RATINGS_COLLECTION, &key, set)
        .await
        .map_err(failed)?;
    info!("Saved rating {} for post {}", rating, post_id);

    Ok(Json(Value::Object(stored)))
}
