use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Owning user id; every content row is tagged with it.
    pub sub: Uuid,
    pub exp: usize,
    pub role: Option<String>,
}

fn reject(code: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": code }))).into_response()
}

fn bearer_token(req: &Request) -> Result<&str, Response> {
    let header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| reject("missing_authorization"))?;
    let value = header.to_str().map_err(|_| reject("bad_authorization"))?;
    value
        .strip_prefix("Bearer ")
        .ok_or_else(|| reject("unsupported_scheme"))
}

pub async fn require_bearer_auth(mut req: Request, next: Next) -> Response {
    let token = match bearer_token(&req) {
        Ok(token) => token.to_owned(),
        Err(resp) => return resp,
    };

    let config = crate::config::get_config();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    match decode::<Claims>(
        &token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => {
            req.extensions_mut().insert(data.claims);
            next.run(req).await
        }
        Err(_) => reject("invalid_token"),
    }
}
