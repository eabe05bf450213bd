use std::{path::Path, sync::Arc};

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;
use configs::AppConfig;
use models::{Post, User};
use service::{
    auth::{Argon2Hasher, AuthService, JwtIssuer},
    post::PostService,
    storage::JsonFileCollection,
};

use crate::openapi::ApiDoc;

pub mod auth;
pub mod posts;

pub type UserStore = JsonFileCollection<User>;
pub type PostStore = JsonFileCollection<Post>;

/// Shared handler state: one service per collection, each owning its store.
#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<AuthService<UserStore>>,
    pub posts: Arc<PostService<PostStore>>,
}

impl ServerState {
    /// Wire services over `<data_dir>/users.json` and `<data_dir>/posts.json`.
    pub fn open(data_dir: impl AsRef<Path>, jwt_secret: &str, token_ttl_hours: u64) -> Self {
        let users = Arc::new(UserStore::open(&data_dir, "users"));
        let posts = Arc::new(PostStore::open(&data_dir, "posts"));
        let tokens = Arc::new(JwtIssuer::with_ttl_hours(jwt_secret, token_ttl_hours));
        Self {
            auth: Arc::new(AuthService::new(users, Arc::new(Argon2Hasher::new()), tokens)),
            posts: Arc::new(PostService::new(posts)),
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::open(&cfg.storage.data_dir, &cfg.auth.jwt_secret, cfg.auth.token_ttl_hours)
    }
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router: public auth routes plus the bearer-guarded API
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/signup", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/signin", post(auth::login));

    let protected = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/posts", get(posts::list).post(posts::create))
        .route("/api/posts/:id", get(posts::get).delete(posts::delete))
        .route("/api/posts/:id/like", post(posts::like))
        .route("/api/posts/:id/comment", post(posts::comment))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer_token,
        ));

    public
        .merge(protected)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request with method and path
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // status and latency
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
