use std::collections::HashMap;

use axum::{
    Router,
    extract::{Path, State},
    routing::{delete, get},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;
use crate::extractors::{AuthUser, Json, Pagination};
use crate::models::category::{self, CategoryResponse};
use crate::models::post;
use crate::response::{ApiResponse, MessageResponse};
use crate::text;

use super::AppState;
use super::posts::{PostSummary, post_summaries};

// ── Request / Response types ──

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub description: Option<String>,
    /// Hex color used by clients when rendering the category badge
    pub color: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryPostsResponse {
    pub category: CategoryResponse,
    pub posts: Vec<PostSummary>,
    pub total: u64,
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/{slug}", delete(delete_category))
        .route("/{slug}/posts", get(category_posts))
}

// ── Handlers ──

/// List all categories with their published post counts.
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "Categories", body = ApiResponse<Vec<CategoryResponse>>)
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<CategoryResponse>>, AppError> {
    let categories = category::Entity::find()
        .order_by_asc(category::Column::Name)
        .all(&state.db)
        .await?;

    let counts = published_post_counts(&state.db).await?;

    let out = categories
        .into_iter()
        .map(|c| {
            let post_count = counts.get(&c.id).copied().unwrap_or(0);
            CategoryResponse::from_model(c, post_count)
        })
        .collect();

    Ok(ApiResponse::success(out))
}

/// Create a category. Any authenticated user may do this.
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 200, description = "Category created", body = ApiResponse<CategoryResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Category already exists")
    ),
    tag = "categories",
    security(("bearer_auth" = []))
)]
pub async fn create_category(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<ApiResponse<CategoryResponse>, AppError> {
    payload.validate()?;

    let existing = category::Entity::find()
        .filter(category::Column::Name.eq(&payload.name))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "A category with this name already exists".to_string(),
        ));
    }

    let slug = unique_category_slug(&state.db, &payload.name).await?;

    let created = category::ActiveModel {
        name: Set(payload.name),
        slug: Set(slug),
        description: Set(payload.description.unwrap_or_default()),
        color: Set(payload.color.unwrap_or_else(|| "#6366f1".to_string())),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(category_id = created.id, user_id, "category created");

    Ok(ApiResponse::success(CategoryResponse::from_model(
        created, 0,
    )))
}

/// List published posts in a category, newest first.
#[utoipa::path(
    get,
    path = "/api/categories/{slug}/posts",
    params(Pagination),
    responses(
        (status = 200, description = "Posts in category", body = ApiResponse<CategoryPostsResponse>),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn category_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    pagination: Pagination,
) -> Result<ApiResponse<CategoryPostsResponse>, AppError> {
    let category_model = find_category(&state.db, &slug).await?;

    let query = post::Entity::find()
        .filter(post::Column::CategoryId.eq(category_model.id))
        .filter(post::Column::IsPublished.eq(true));

    let total = query.clone().count(&state.db).await?;
    let page = query
        .order_by_desc(post::Column::CreatedAt)
        .limit(pagination.limit)
        .offset(pagination.offset)
        .all(&state.db)
        .await?;

    let posts = post_summaries(&state.db, page).await?;

    Ok(ApiResponse::success(CategoryPostsResponse {
        category: CategoryResponse::from_model(category_model, total as i64),
        posts,
        total,
    }))
}

/// Delete a category. Posts in it are detached, not deleted.
#[utoipa::path(
    delete,
    path = "/api/categories/{slug}",
    responses(
        (status = 200, description = "Category deleted", body = ApiResponse<MessageResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Category not found")
    ),
    tag = "categories",
    security(("bearer_auth" = []))
)]
pub async fn delete_category(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(slug): Path<String>,
) -> Result<ApiResponse<MessageResponse>, AppError> {
    let category_model = find_category(&state.db, &slug).await?;

    tracing::info!(category_id = category_model.id, "category deleted");
    category_model.delete(&state.db).await?;

    Ok(ApiResponse::success(MessageResponse {
        message: "Category deleted".to_string(),
    }))
}

// ── Helpers ──

async fn find_category(db: &DatabaseConnection, slug: &str) -> Result<category::Model, AppError> {
    category::Entity::find()
        .filter(category::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))
}

async fn unique_category_slug(db: &DatabaseConnection, name: &str) -> Result<String, AppError> {
    let base = {
        let s = text::slugify(name);
        if s.is_empty() { text::random_slug() } else { s }
    };

    let mut candidate = base.clone();
    let mut counter = 1;
    while category::Entity::find()
        .filter(category::Column::Slug.eq(&candidate))
        .one(db)
        .await?
        .is_some()
    {
        candidate = format!("{}-{}", base, counter);
        counter += 1;
    }
    Ok(candidate)
}

/// Published post count per category, grouped in one query.
async fn published_post_counts(db: &DatabaseConnection) -> Result<HashMap<i32, i64>, AppError> {
    let rows: Vec<(i32, i64)> = post::Entity::find()
        .select_only()
        .column(post::Column::CategoryId)
        .column_as(post::Column::Id.count(), "cnt")
        .filter(post::Column::IsPublished.eq(true))
        .filter(post::Column::CategoryId.is_not_null())
        .group_by(post::Column::CategoryId)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows.into_iter().collect())
}
