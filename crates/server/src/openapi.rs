use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorResponse { pub error: String, pub message: Option<String> }

#[derive(ToSchema)]
pub struct RegisterRequest { pub name: String, pub email: String, pub password: String, pub confirm_password: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct UserDoc {
    pub id: String,
    pub name: String,
    pub email: String,
    /// `user` or `admin`
    pub role: String,
    pub created_at: Option<String>,
}

#[derive(ToSchema)]
pub struct UserEnvelope { pub message: Option<String>, pub user: UserDoc }

#[derive(ToSchema)]
pub struct LoginResponse { pub message: String, pub user: UserDoc, pub token: String }

#[derive(ToSchema)]
pub struct CommentDoc {
    /// also accepted as `text`
    pub comment: String,
    pub parent_id: Option<u64>,
}

#[derive(ToSchema)]
pub struct CommentRecordDoc {
    pub id: u64,
    pub text: String,
    pub author: String,
    pub parent_id: Option<u64>,
    pub created_at: Option<String>,
}

#[derive(ToSchema)]
pub struct CreatePostDoc {
    pub content: String,
    /// `public` (default) or `private`
    pub visibility: Option<String>,
}

#[derive(ToSchema)]
pub struct PostDoc {
    pub id: String,
    pub content: String,
    pub author: String,
    pub visibility: String,
    pub likes: u64,
    pub comments: Vec<CommentRecordDoc>,
    pub created_at: Option<String>,
}

#[derive(ToSchema)]
pub struct PostEnvelope { pub message: Option<String>, pub post: PostDoc }

#[derive(ToSchema)]
pub struct PostsResponse { pub posts: Vec<PostDoc> }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::me,
        crate::routes::posts::list,
        crate::routes::posts::create,
        crate::routes::posts::get,
        crate::routes::posts::like,
        crate::routes::posts::comment,
        crate::routes::posts::delete,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            RegisterRequest,
            LoginRequest,
            UserDoc,
            UserEnvelope,
            LoginResponse,
            CommentDoc,
            CommentRecordDoc,
            CreatePostDoc,
            PostDoc,
            PostEnvelope,
            PostsResponse,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "posts")
    )
)]
pub struct ApiDoc;
