use utoipa::OpenApi;

use crate::controllers::auth::{
    AuthResponse, LoginRequest, MeResponse, SignupRequest, UpdateProfileRequest,
};
use crate::controllers::categories::{CategoryPostsResponse, CreateCategoryRequest};
use crate::controllers::posts::{
    AuthorResponse, CategoryBrief, CommentResponse, CreateCommentRequest, CreatePostRequest,
    LikeResponse, PostDetail, PostListResponse, PostSummary, UpdatePostRequest,
};
use crate::models::category::CategoryResponse;
use crate::models::post::PostStatus;
use crate::models::profile::ProfileResponse;
use crate::models::user::UserResponse;
use crate::response::MessageResponse;

/// Auto-generated OpenAPI documentation for inkpress.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "inkpress API",
        version = "0.1.0",
        description = "A blogging backend: accounts, posts, categories, likes and comments."
    ),
    paths(
        crate::controllers::auth::signup,
        crate::controllers::auth::login,
        crate::controllers::auth::me,
        crate::controllers::auth::update_profile,
        crate::controllers::posts::list_posts,
        crate::controllers::posts::create_post,
        crate::controllers::posts::get_post,
        crate::controllers::posts::update_post,
        crate::controllers::posts::delete_post,
        crate::controllers::posts::toggle_like,
        crate::controllers::posts::list_comments,
        crate::controllers::posts::create_comment,
        crate::controllers::comments::delete_comment,
        crate::controllers::categories::list_categories,
        crate::controllers::categories::create_category,
        crate::controllers::categories::category_posts,
        crate::controllers::categories::delete_category,
    ),
    components(
        schemas(
            SignupRequest,
            LoginRequest,
            AuthResponse,
            MeResponse,
            UpdateProfileRequest,
            UserResponse,
            ProfileResponse,
            CreatePostRequest,
            UpdatePostRequest,
            PostStatus,
            PostSummary,
            PostDetail,
            PostListResponse,
            AuthorResponse,
            CategoryBrief,
            LikeResponse,
            CreateCommentRequest,
            CommentResponse,
            CreateCategoryRequest,
            CategoryResponse,
            CategoryPostsResponse,
            MessageResponse,
        )
    ),
    tags(
        (name = "auth", description = "Authentication and profile endpoints"),
        (name = "posts", description = "Post CRUD, likes and view counting"),
        (name = "comments", description = "Comments and replies"),
        (name = "categories", description = "Category management")
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add JWT Bearer security scheme to the OpenAPI spec.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            );
        }
    }
}
