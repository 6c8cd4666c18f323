use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use http::{header, StatusCode};
use std::sync::Arc;

use crate::{
    models::{error::Error, jwt::Session},
    utils::{jwt::jwt_decode, state::AppState},
};

/// Decodes an optional bearer token into a [`Session`] extension. A request
/// without a token continues as anonymous; an invalid token is rejected.
pub async fn session_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, Error> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let session = match token {
        Some(token) => Session::from(jwt_decode(token, &state.config.jwt_secret)?),
        None => Session::anonymous(),
    };

    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}

pub async fn require_user(req: Request, next: Next) -> Result<impl IntoResponse, Error> {
    req.extensions()
        .get::<Session>()
        .and_then(Session::user)
        .ok_or((StatusCode::UNAUTHORIZED, "Missing Bearer token"))?;

    Ok(next.run(req).await)
}
