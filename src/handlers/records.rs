use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use http::StatusCode;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::{
    models::{
        error::Error,
        listing::ListParams,
        resource::{draft_document, Resource, ResourceSpec},
    },
    store::{Filter, ID_FIELD},
    utils::{listing, state::AppState},
};

fn failed(verb: &str, spec: &ResourceSpec) -> String {
    format!("Failed to {} {}", verb, spec.label.to_lowercase())
}

fn required_id(spec: &ResourceSpec, raw: Option<&str>) -> Result<String, Error> {
    raw.map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::bad_request(&format!("{} ID is required", spec.label)))
}

pub async fn list_records<R: Resource>(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, Error> {
    let spec = R::SPEC;
    let request = listing::build_request(spec, &params, state.now())?;

    let message = format!("Failed to fetch {}", spec.name);
    let store = state
        .store
        .get()
        .await
        .map_err(|e| Error::store(&message, e))?;
    let found = listing::run(store.as_ref(), spec, request)
        .await
        .map_err(|e| Error::store(&message, e))?;

    Ok(Json(found.into_json(spec)))
}

pub async fn create_record<R: Resource>(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, Error> {
    let spec = R::SPEC;
    let document = draft_document::<R>(payload).map_err(|e| Error::bad_request(&e))?;

    info!("Creating {}", spec.label.to_lowercase());
    let store = state
        .store
        .get()
        .await
        .map_err(|e| Error::store(&failed("create", spec), e))?;
    let created = store
        .insert(spec.collection, document)
        .await
        .map_err(|e| Error::store(&failed("create", spec), e))?;
    info!("Successfully created {}", spec.label.to_lowercase());

    Ok((StatusCode::CREATED, Json(Value::Object(created))))
}

/// Partial update. The body carries the id under the resource's id param and
/// only the fields to change.
pub async fn update_record<R: Resource>(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, Error> {
    let spec = R::SPEC;
    let Value::Object(mut patch) = payload else {
        return Err(Error::bad_request("Request body must be a JSON object"));
    };

    let raw_id = patch.remove(spec.id_param);
    let id = required_id(spec, raw_id.as_ref().and_then(Value::as_str))?;
    patch.remove(ID_FIELD);
    if patch.is_empty() {
        return Err(Error::bad_request("No fields to update"));
    }
    spec.check_patch(&patch).map_err(|e| Error::bad_request(&e))?;

    info!("Updating {} {}", spec.label.to_lowercase(), id);
    let store = state
        .store
        .get()
        .await
        .map_err(|e| Error::store(&failed("update", spec), e))?;
    let updated = store
        .update_by_id(spec.collection, &id, patch)
        .await
        .map_err(|e| Error::store(&failed("update", spec), e))?;

    match updated {
        Some(mut document) => {
            spec.normalize(&mut document);
            info!("Successfully updated {} {}", spec.label.to_lowercase(), id);
            Ok(Json(Value::Object(document)))
        }
        None => {
            info!("{} {} not found", spec.label, id);
            Err(Error::not_found(&format!("{} not found", spec.label)))
        }
    }
}

pub async fn delete_record<R: Resource>(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, Error> {
    let spec = R::SPEC;
    let id = required_id(spec, params.get(spec.id_param).map(String::as_str))?;

    info!("Deleting {} {}", spec.label.to_lowercase(), id);
    let store = state
        .store
        .get()
        .await
        .map_err(|e| Error::store(&failed("delete", spec), e))?;
    let deleted = store
        .delete_by_id(spec.collection, &id)
        .await
        .map_err(|e| Error::store(&failed("delete", spec), e))?;
    if !deleted {
        info!("{} {} not found", spec.label, id);
        return Err(Error::not_found(&format!("{} not found", spec.label)));
    }

    if let Some((collection, field)) = spec.cascade {
        let removed = store
            .delete_many(collection, &Filter::new().eq(field, id.as_str()))
            .await
            .map_err(|e| {
                warn!("{} {} deleted, {} cleanup failed", spec.label, id, collection);
                Error::store(&format!("Failed to delete {} of {}", collection, id), e)
            })?;
        info!("Removed {} {} referencing {}", removed, collection, id);
    }

    info!("Successfully deleted {} {}", spec.label.to_lowercase(), id);
    Ok(Json(json!({"success": true})))
}
