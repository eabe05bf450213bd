use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use uuid::Uuid;

use models::{Post, Visibility};
use service::{auth::Identity, pagination::Pagination, post::PostError};

use super::ServerState;
use crate::errors::JsonApiError;
use crate::extract::ApiJson;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 1-based page; paging applies only when `page` or `per_page` is given
    pub page: Option<u32>,
    /// items per page, clamped to 1..=100
    pub per_page: Option<u32>,
}

impl ListQuery {
    fn pagination(&self) -> Option<Pagination> {
        if self.page.is_none() && self.per_page.is_none() {
            return None;
        }
        let d = Pagination::default();
        Some(Pagination { page: self.page.unwrap_or(d.page), per_page: self.per_page.unwrap_or(d.per_page) })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreatePostRequest {
    pub content: String,
    pub visibility: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CommentRequest {
    #[serde(alias = "text")]
    pub comment: String,
    pub parent_id: Option<u64>,
}

#[derive(Serialize)]
pub struct PostsOutput {
    pub posts: Vec<Post>,
}

#[derive(Serialize)]
pub struct PostOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub post: Post,
}

/// Ids that are not UUIDs cannot name a stored post.
fn parse_post_id(raw: &str) -> Result<Uuid, JsonApiError> {
    Uuid::parse_str(raw).map_err(|_| JsonApiError::not_found(&format!("post {raw} not found")))
}

#[utoipa::path(get, path = "/api/posts", tag = "posts", params(ListQuery), responses((status = 200, description = "Visible posts", body = crate::openapi::PostsResponse), (status = 401, description = "Unauthorized", body = crate::openapi::ErrorResponse)))]
pub async fn list(
    State(state): State<ServerState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PostsOutput>, JsonApiError> {
    let posts = state.posts.list_posts(&identity, query.pagination()).await?;
    Ok(Json(PostsOutput { posts }))
}

#[utoipa::path(post, path = "/api/posts", tag = "posts", request_body = crate::openapi::CreatePostDoc, responses((status = 201, description = "Created", body = crate::openapi::PostEnvelope), (status = 400, description = "Bad Request", body = crate::openapi::ErrorResponse)))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(identity): Extension<Identity>,
    ApiJson(body): ApiJson<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostOutput>), JsonApiError> {
    let visibility = body
        .visibility
        .as_deref()
        .map(str::parse::<Visibility>)
        .transpose()
        .map_err(PostError::from)?;
    let post = state.posts.create_post(&identity, &body.content, visibility).await?;
    Ok((StatusCode::CREATED, Json(PostOutput { message: Some("post created successfully"), post })))
}

#[utoipa::path(get, path = "/api/posts/{id}", tag = "posts", params(("id" = String, Path, description = "Post id")), responses((status = 200, description = "Post", body = crate::openapi::PostEnvelope), (status = 403, description = "Private post", body = crate::openapi::ErrorResponse), (status = 404, description = "Not found", body = crate::openapi::ErrorResponse)))]
pub async fn get(
    State(state): State<ServerState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<PostOutput>, JsonApiError> {
    let post = state.posts.get_post(&identity, parse_post_id(&id)?).await?;
    Ok(Json(PostOutput { message: None, post }))
}

#[utoipa::path(post, path = "/api/posts/{id}/like", tag = "posts", params(("id" = String, Path, description = "Post id")), responses((status = 200, description = "Liked", body = crate::openapi::PostEnvelope), (status = 403, description = "Private post", body = crate::openapi::ErrorResponse), (status = 404, description = "Not found", body = crate::openapi::ErrorResponse)))]
pub async fn like(
    State(state): State<ServerState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<PostOutput>, JsonApiError> {
    let post = state.posts.like_post(&identity, parse_post_id(&id)?).await?;
    Ok(Json(PostOutput { message: Some("post liked"), post }))
}

#[utoipa::path(post, path = "/api/posts/{id}/comment", tag = "posts", params(("id" = String, Path, description = "Post id")), request_body = crate::openapi::CommentDoc, responses((status = 200, description = "Commented", body = crate::openapi::PostEnvelope), (status = 400, description = "Bad Request", body = crate::openapi::ErrorResponse), (status = 403, description = "Private post", body = crate::openapi::ErrorResponse), (status = 404, description = "Not found", body = crate::openapi::ErrorResponse)))]
pub async fn comment(
    State(state): State<ServerState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<CommentRequest>,
) -> Result<Json<PostOutput>, JsonApiError> {
    // blank text is reported even for an unknown id
    if body.comment.trim().is_empty() {
        return Err(PostError::Validation("comment cannot be empty".into()).into());
    }
    let post = state
        .posts
        .comment_on_post(&identity, parse_post_id(&id)?, &body.comment, body.parent_id)
        .await?;
    Ok(Json(PostOutput { message: Some("comment added successfully"), post }))
}

#[utoipa::path(delete, path = "/api/posts/{id}", tag = "posts", params(("id" = String, Path, description = "Post id")), responses((status = 204, description = "Deleted"), (status = 403, description = "Not the author", body = crate::openapi::ErrorResponse), (status = 404, description = "Not found", body = crate::openapi::ErrorResponse)))]
pub async fn delete(
    State(state): State<ServerState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    state.posts.delete_post(&identity, parse_post_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
