use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
    Extension, Json,
};
use serde::Serialize;
use tracing::warn;

use service::auth::{AuthUser, Identity, LoginInput, RegisterInput};

use super::ServerState;
use crate::errors::JsonApiError;
use crate::extract::ApiJson;

#[derive(Serialize)]
pub struct RegisterOutput {
    pub message: &'static str,
    pub user: AuthUser,
}

#[derive(Serialize)]
pub struct LoginOutput {
    pub message: &'static str,
    pub user: AuthUser,
    pub token: String,
}

#[derive(Serialize)]
pub struct MeOutput {
    pub user: AuthUser,
}

#[utoipa::path(post, path = "/api/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 201, description = "Registered", body = crate::openapi::UserEnvelope), (status = 400, description = "Bad Request", body = crate::openapi::ErrorResponse), (status = 409, description = "Conflict", body = crate::openapi::ErrorResponse)))]
pub async fn register(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<RegisterInput>,
) -> Result<(StatusCode, Json<RegisterOutput>), JsonApiError> {
    let user = state.auth.register(input).await?;
    Ok((StatusCode::CREATED, Json(RegisterOutput { message: "user registered successfully", user })))
}

#[utoipa::path(post, path = "/api/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In", body = crate::openapi::LoginResponse), (status = 401, description = "Unauthorized", body = crate::openapi::ErrorResponse)))]
pub async fn login(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<LoginInput>,
) -> Result<Json<LoginOutput>, JsonApiError> {
    let session = state.auth.login(input).await?;
    Ok(Json(LoginOutput { message: "login successful", user: session.user, token: session.token }))
}

#[utoipa::path(get, path = "/api/auth/me", tag = "auth", responses((status = 200, description = "Current user", body = crate::openapi::UserEnvelope), (status = 401, description = "Unauthorized", body = crate::openapi::ErrorResponse)))]
pub async fn me(
    State(state): State<ServerState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<MeOutput>, JsonApiError> {
    let user = state.auth.current_user(&identity).await?;
    Ok(Json(MeOutput { user }))
}

/// Route-layer guard: requires `Authorization: Bearer <token>` and stores the
/// verified `Identity` in request extensions for the handlers.
pub async fn require_bearer_token(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let Some(token) = token else {
        warn!(path = %req.uri().path(), "missing or malformed bearer token");
        return Err(JsonApiError::unauthorized("missing or malformed bearer token"));
    };

    let identity = state.auth.authenticate(&token).map_err(|e| {
        warn!(path = %req.uri().path(), error = %e, "token validation failed");
        JsonApiError::from(e)
    })?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
