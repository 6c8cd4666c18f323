use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};

use crate::models::jwt::Claims;

const AUDIENCE: &str = "authenticated";

/// Signs an HS256 session token valid for `ttl_secs`.
pub fn jwt_encode(
    sub: &str,
    email: Option<&str>,
    secret: &str,
    ttl_secs: usize,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: sub.to_string(),
        iat: now,
        exp: now + ttl_secs,
        aud: Some(AUDIENCE.to_string()),
        email: email.map(str::to_string),
        role: Some("authenticated".to_string()),
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn jwt_decode(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_audience(&[AUDIENCE]);

    let decoded = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(decoded.claims)
}
