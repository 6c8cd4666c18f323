use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    Router,
};
use curator::{make_app, utils::jwt::jwt_encode, AppState, Config};
use http::{header, Method, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

pub const SECRET: &str = "test-secret";

pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::from_vars(&[("STORE_BACKEND", "memory")])
    }

    /// App backed by a PostgREST endpoint at `project_url`.
    #[allow(dead_code)]
    pub fn with_postgrest(project_url: &str) -> Self {
        Self::from_vars(&[
            ("STORE_BACKEND", "postgrest"),
            ("SUPABASE_PROJECT_URL", project_url),
            ("SUPABASE_SERVICE_ROLE_KEY", "service-key"),
        ])
    }

    fn from_vars(vars: &[(&str, &str)]) -> Self {
        let config = Config::from_lookup(|name| match name {
            "JWT_SECRET" => Some(SECRET.to_string()),
            _ => vars
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string()),
        })
        .unwrap();
        Self {
            router: make_app(Arc::new(AppState::new(config))),
        }
    }

    pub fn token(email: &str) -> String {
        jwt_encode("sub-1", Some(email), SECRET, 600).unwrap()
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    /// Sends as an authenticated editor.
    pub async fn authed(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let token = Self::token("editor@example.com");
        self.send(method, uri, Some(&token), body).await
    }
}
