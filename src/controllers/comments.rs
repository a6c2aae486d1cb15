use axum::{
    Router,
    extract::{Path, State},
    routing::delete,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

use crate::error::AppError;
use crate::extractors::AuthUser;
use crate::models::{comment, post};
use crate::response::{ApiResponse, MessageResponse};

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/{id}", delete(delete_comment))
}

/// Soft-delete a comment. Allowed for the comment author and the post
/// author; the row stays so replies keep their parent.
#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    responses(
        (status = 200, description = "Comment removed", body = ApiResponse<MessageResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not allowed to remove this comment"),
        (status = 404, description = "Comment not found")
    ),
    tag = "comments",
    security(("bearer_auth" = []))
)]
pub async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i32>,
) -> Result<ApiResponse<MessageResponse>, AppError> {
    let comment_model = comment::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    let post_model = post::Entity::find_by_id(comment_model.post_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    if comment_model.author_id != user_id && post_model.author_id != user_id {
        return Err(AppError::Forbidden(
            "Only the comment author or the post author can remove a comment".to_string(),
        ));
    }

    let mut active: comment::ActiveModel = comment_model.into();
    active.is_active = Set(false);
    active.updated_at = Set(Utc::now().naive_utc());
    active.update(&state.db).await?;

    Ok(ApiResponse::success(MessageResponse {
        message: "Comment removed".to_string(),
    }))
}
