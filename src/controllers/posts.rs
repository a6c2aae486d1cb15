use std::collections::HashMap;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
};
use chrono::{NaiveDateTime, Utc};
use sea_orm::sea_query::{Expr, Func, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, JoinType,
    ModelTrait, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TryInsertResult,
};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::hash_token;
use crate::error::AppError;
use crate::extractors::{AuthUser, Json, MaybeAuthUser, Pagination};
use crate::models::post::PostStatus;
use crate::models::{category, comment, like, post, post_view, profile, user};
use crate::response::{ApiResponse, MessageResponse};
use crate::text;

use super::AppState;

// ── Request / Response types ──

/// Keeps a JSON `null` (`Some(None)`) apart from an absent field (`None`).
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListParams {
    /// Search query against title, excerpt and author username
    pub q: Option<String>,
    /// Category slug filter
    pub category: Option<String>,
    /// Sort order: newest (default), popular, most_liked
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 250, message = "must be 1-250 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub content: String,
    pub category_id: Option<i32>,
    /// Left blank, the excerpt is derived from the content
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    /// Defaults to draft
    pub status: Option<PostStatus>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 250, message = "must be 1-250 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub content: Option<String>,
    /// `null` detaches the post from its category
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<i32>>,
    /// An empty string re-derives the excerpt from the content
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    pub status: Option<PostStatus>,
}

/// Post author as shown in post and comment payloads.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorResponse {
    pub id: i32,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
}

/// Category as embedded in post payloads.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryBrief {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub color: String,
}

impl From<category::Model> for CategoryBrief {
    fn from(c: category::Model) -> Self {
        CategoryBrief {
            id: c.id,
            name: c.name,
            slug: c.slug,
            color: c.color,
        }
    }
}

/// Post as shown in listings (no content body).
#[derive(Debug, Serialize, ToSchema)]
pub struct PostSummary {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub cover_image: Option<String>,
    pub views_count: i32,
    pub like_count: i64,
    pub comment_count: i64,
    pub author: AuthorResponse,
    pub category: Option<CategoryBrief>,
    pub created_at: NaiveDateTime,
}

/// Full post payload for the detail endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct PostDetail {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub status: PostStatus,
    pub is_published: bool,
    pub views_count: i32,
    pub like_count: i64,
    pub comment_count: i64,
    /// Whether the requesting user has liked this post (false when anonymous)
    pub liked: bool,
    pub author: AuthorResponse,
    pub category: Option<CategoryBrief>,
    /// Up to 3 published posts from the same category
    pub related: Vec<PostSummary>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PostListResponse {
    pub posts: Vec<PostSummary>,
    pub total: u64,
    /// The most-viewed published post
    pub featured: Option<PostSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LikeResponse {
    pub liked: bool,
    pub count: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 2000, message = "must be 1-2000 characters"))]
    pub text: String,
    /// Reply target; an unknown parent is ignored and the comment lands as a root
    pub parent_id: Option<i32>,
}

/// Comment with its active replies nested one level deep.
#[derive(Debug, Serialize, ToSchema)]
pub struct CommentResponse {
    pub id: i32,
    pub text: String,
    pub parent_id: Option<i32>,
    pub author: AuthorResponse,
    #[schema(no_recursion)]
    pub replies: Vec<CommentResponse>,
    pub created_at: NaiveDateTime,
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/{slug}", get(get_post).patch(update_post).delete(delete_post))
        .route("/{slug}/like", post(toggle_like))
        .route("/{slug}/comments", get(list_comments).post(create_comment))
}

// ── Handlers ──

/// List published posts with search, category filter, sorting and pagination.
#[utoipa::path(
    get,
    path = "/api/posts",
    params(Pagination),
    responses(
        (status = 200, description = "Published posts", body = ApiResponse<PostListResponse>)
    ),
    tag = "posts"
)]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
    pagination: Pagination,
) -> Result<ApiResponse<PostListResponse>, AppError> {
    let mut query = post::Entity::find().filter(post::Column::IsPublished.eq(true));

    if let Some(q) = params.q.as_deref().filter(|s| !s.is_empty()) {
        // lower() on both sides so the match is case-insensitive on every backend
        let pattern = format!("%{}%", q.to_lowercase());
        query = query
            .join(JoinType::InnerJoin, post::Relation::Author.def())
            .filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col((post::Entity, post::Column::Title))))
                            .like(&pattern),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col((post::Entity, post::Column::Excerpt))))
                            .like(&pattern),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col((user::Entity, user::Column::Username))))
                            .like(&pattern),
                    ),
            );
    }

    if let Some(slug) = params.category.as_deref().filter(|s| !s.is_empty()) {
        let category = category::Entity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&state.db)
            .await?;
        // An unknown category slug matches nothing
        let category_id = category.map(|c| c.id).unwrap_or(-1);
        query = query.filter(post::Column::CategoryId.eq(category_id));
    }

    let total = query.clone().count(&state.db).await?;

    query = match params.sort.as_deref() {
        Some("popular") => query.order_by_desc(post::Column::ViewsCount),
        Some("most_liked") => query
            .join(JoinType::LeftJoin, post::Relation::Likes.def())
            .group_by(post::Column::Id)
            .order_by(like::Column::Id.count(), Order::Desc),
        _ => query.order_by_desc(post::Column::CreatedAt),
    };

    let page = query
        .limit(pagination.limit)
        .offset(pagination.offset)
        .all(&state.db)
        .await?;

    let posts = post_summaries(&state.db, page).await?;
    let featured = featured_post(&state.db).await?;

    Ok(ApiResponse::success(PostListResponse {
        posts,
        total,
        featured,
    }))
}

/// Create a post. Slug and excerpt are derived when absent.
#[utoipa::path(
    post,
    path = "/api/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 200, description = "Post created", body = ApiResponse<PostDetail>),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Invalid input")
    ),
    tag = "posts",
    security(("bearer_auth" = []))
)]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreatePostRequest>,
) -> Result<ApiResponse<PostDetail>, AppError> {
    payload.validate()?;

    if let Some(category_id) = payload.category_id {
        let exists = category::Entity::find_by_id(category_id)
            .one(&state.db)
            .await?;
        if exists.is_none() {
            return Err(AppError::Validation("Unknown category".to_string()));
        }
    }

    let slug = unique_post_slug(&state.db, &payload.title).await?;
    let excerpt = match payload.excerpt.as_deref().map(str::trim) {
        Some(e) if !e.is_empty() => e.to_string(),
        _ => text::make_excerpt(&payload.content),
    };
    let status = payload.status.unwrap_or(PostStatus::Draft);
    let now = Utc::now().naive_utc();

    let new_post = post::ActiveModel {
        author_id: Set(user_id),
        category_id: Set(payload.category_id),
        title: Set(payload.title),
        slug: Set(slug),
        excerpt: Set(excerpt),
        content: Set(payload.content),
        cover_image: Set(payload.cover_image),
        status: Set(status),
        is_published: Set(status.is_published()),
        views_count: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let post_model = new_post.insert(&state.db).await?;

    tracing::info!(post_id = post_model.id, slug = %post_model.slug, "post created");

    let detail = build_detail(&state.db, post_model, false).await?;
    Ok(ApiResponse::success(detail))
}

/// Get a published post. Each viewer bumps the view counter at most once.
#[utoipa::path(
    get,
    path = "/api/posts/{slug}",
    responses(
        (status = 200, description = "Post detail", body = ApiResponse<PostDetail>),
        (status = 404, description = "Post not found")
    ),
    tag = "posts"
)]
pub async fn get_post(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> Result<ApiResponse<PostDetail>, AppError> {
    let mut post_model = find_published(&state.db, &slug).await?;

    // Deduplicated view counting: the insert silently no-ops when this
    // viewer has already been counted for this post.
    let fingerprint = viewer_fingerprint(viewer, &headers);
    let insert = post_view::Entity::insert(post_view::ActiveModel {
        post_id: Set(post_model.id),
        viewer_hash: Set(fingerprint),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    })
    .on_conflict(
        OnConflict::columns([post_view::Column::PostId, post_view::Column::ViewerHash])
            .do_nothing()
            .to_owned(),
    )
    .do_nothing()
    .exec(&state.db)
    .await?;

    if matches!(insert, TryInsertResult::Inserted(_)) {
        post::Entity::update_many()
            .col_expr(
                post::Column::ViewsCount,
                Expr::col(post::Column::ViewsCount).add(1),
            )
            .filter(post::Column::Id.eq(post_model.id))
            .exec(&state.db)
            .await?;
        post_model.views_count += 1;
    }

    let liked = match viewer {
        Some(user_id) => is_liked_by(&state.db, post_model.id, user_id).await?,
        None => false,
    };

    let detail = build_detail(&state.db, post_model, liked).await?;
    Ok(ApiResponse::success(detail))
}

/// Update a post - author only. The slug is stable across edits.
#[utoipa::path(
    patch,
    path = "/api/posts/{slug}",
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated", body = ApiResponse<PostDetail>),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found")
    ),
    tag = "posts",
    security(("bearer_auth" = []))
)]
pub async fn update_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(slug): Path<String>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<ApiResponse<PostDetail>, AppError> {
    payload.validate()?;

    let post_model = find_by_slug(&state.db, &slug).await?;
    if post_model.author_id != user_id {
        return Err(AppError::Forbidden(
            "Only the author can edit this post".to_string(),
        ));
    }

    if let Some(Some(category_id)) = payload.category_id {
        let exists = category::Entity::find_by_id(category_id)
            .one(&state.db)
            .await?;
        if exists.is_none() {
            return Err(AppError::Validation("Unknown category".to_string()));
        }
    }

    let current_content = post_model.content.clone();
    let mut active: post::ActiveModel = post_model.into();

    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    let content = payload.content.unwrap_or(current_content);
    active.content = Set(content.clone());

    match payload.excerpt.as_deref().map(str::trim) {
        Some(e) if !e.is_empty() => active.excerpt = Set(e.to_string()),
        Some(_) => active.excerpt = Set(text::make_excerpt(&content)),
        None => {}
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(category_id);
    }
    if let Some(cover_image) = payload.cover_image {
        active.cover_image = Set(Some(cover_image));
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
        active.is_published = Set(status.is_published());
    }
    active.updated_at = Set(Utc::now().naive_utc());

    let post_model = active.update(&state.db).await?;
    let liked = is_liked_by(&state.db, post_model.id, user_id).await?;

    let detail = build_detail(&state.db, post_model, liked).await?;
    Ok(ApiResponse::success(detail))
}

/// Delete a post - author only. Likes and comments go with it.
#[utoipa::path(
    delete,
    path = "/api/posts/{slug}",
    responses(
        (status = 200, description = "Post deleted", body = ApiResponse<MessageResponse>),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found")
    ),
    tag = "posts",
    security(("bearer_auth" = []))
)]
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(slug): Path<String>,
) -> Result<ApiResponse<MessageResponse>, AppError> {
    let post_model = find_by_slug(&state.db, &slug).await?;
    if post_model.author_id != user_id {
        return Err(AppError::Forbidden(
            "Only the author can delete this post".to_string(),
        ));
    }

    tracing::info!(post_id = post_model.id, slug = %post_model.slug, "post deleted");
    post_model.delete(&state.db).await?;

    Ok(ApiResponse::success(MessageResponse {
        message: "Post deleted".to_string(),
    }))
}

/// Toggle a like on a published post.
#[utoipa::path(
    post,
    path = "/api/posts/{slug}/like",
    responses(
        (status = 200, description = "Like toggled", body = ApiResponse<LikeResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found")
    ),
    tag = "posts",
    security(("bearer_auth" = []))
)]
pub async fn toggle_like(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(slug): Path<String>,
) -> Result<ApiResponse<LikeResponse>, AppError> {
    let post_model = find_published(&state.db, &slug).await?;

    let existing = like::Entity::find()
        .filter(like::Column::UserId.eq(user_id))
        .filter(like::Column::PostId.eq(post_model.id))
        .one(&state.db)
        .await?;

    let liked = match existing {
        Some(like_model) => {
            like_model.delete(&state.db).await?;
            false
        }
        None => {
            like::ActiveModel {
                user_id: Set(user_id),
                post_id: Set(post_model.id),
                created_at: Set(Utc::now().naive_utc()),
                ..Default::default()
            }
            .insert(&state.db)
            .await?;
            true
        }
    };

    let count = like::Entity::find()
        .filter(like::Column::PostId.eq(post_model.id))
        .count(&state.db)
        .await?;

    Ok(ApiResponse::success(LikeResponse {
        liked,
        count: count as i64,
    }))
}

/// List active comments: roots in creation order, replies nested.
#[utoipa::path(
    get,
    path = "/api/posts/{slug}/comments",
    responses(
        (status = 200, description = "Comments", body = ApiResponse<Vec<CommentResponse>>),
        (status = 404, description = "Post not found")
    ),
    tag = "comments"
)]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ApiResponse<Vec<CommentResponse>>, AppError> {
    let post_model = find_published(&state.db, &slug).await?;

    let comments = comment::Entity::find()
        .filter(comment::Column::PostId.eq(post_model.id))
        .filter(comment::Column::IsActive.eq(true))
        .order_by_asc(comment::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let author_ids: Vec<i32> = comments.iter().map(|c| c.author_id).collect();
    let authors = load_authors(&state.db, author_ids).await?;

    let mut replies: HashMap<i32, Vec<comment::Model>> = HashMap::new();
    let mut roots = Vec::new();
    for c in comments {
        match c.parent_id {
            Some(parent_id) => replies.entry(parent_id).or_default().push(c),
            None => roots.push(c),
        }
    }

    let mut out = Vec::with_capacity(roots.len());
    for root in roots {
        let children = replies
            .remove(&root.id)
            .unwrap_or_default()
            .into_iter()
            .map(|c| comment_node(c, &authors, Vec::new()))
            .collect::<Result<Vec<_>, _>>()?;
        out.push(comment_node(root, &authors, children)?);
    }

    Ok(ApiResponse::success(out))
}

/// Add a comment (or a reply, when parent_id is given) to a published post.
#[utoipa::path(
    post,
    path = "/api/posts/{slug}/comments",
    request_body = CreateCommentRequest,
    responses(
        (status = 200, description = "Comment created", body = ApiResponse<CommentResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found")
    ),
    tag = "comments",
    security(("bearer_auth" = []))
)]
pub async fn create_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(slug): Path<String>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<ApiResponse<CommentResponse>, AppError> {
    payload.validate()?;
    if payload.text.trim().is_empty() {
        return Err(AppError::Validation(
            "Comment text must not be empty".to_string(),
        ));
    }

    let post_model = find_published(&state.db, &slug).await?;

    // A parent that doesn't exist on this post is ignored; the comment
    // lands as a root.
    let parent_id = match payload.parent_id {
        Some(parent_id) => comment::Entity::find()
            .filter(comment::Column::Id.eq(parent_id))
            .filter(comment::Column::PostId.eq(post_model.id))
            .one(&state.db)
            .await?
            .map(|parent| parent.id),
        None => None,
    };

    let now = Utc::now().naive_utc();
    let created = comment::ActiveModel {
        author_id: Set(user_id),
        post_id: Set(post_model.id),
        parent_id: Set(parent_id),
        text: Set(payload.text),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    let authors = load_authors(&state.db, vec![user_id]).await?;
    let node = comment_node(created, &authors, Vec::new())?;

    Ok(ApiResponse::success(node))
}

// ── Helpers ──

pub(crate) async fn find_published(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<post::Model, AppError> {
    post::Entity::find()
        .filter(post::Column::Slug.eq(slug))
        .filter(post::Column::IsPublished.eq(true))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
}

async fn find_by_slug(db: &DatabaseConnection, slug: &str) -> Result<post::Model, AppError> {
    post::Entity::find()
        .filter(post::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
}

async fn is_liked_by(db: &DatabaseConnection, post_id: i32, user_id: i32) -> Result<bool, AppError> {
    let found = like::Entity::find()
        .filter(like::Column::PostId.eq(post_id))
        .filter(like::Column::UserId.eq(user_id))
        .one(db)
        .await?;
    Ok(found.is_some())
}

/// Slugify the title, falling back to a random slug, and append `-1`, `-2`,
/// ... until the candidate is free.
async fn unique_post_slug(db: &DatabaseConnection, title: &str) -> Result<String, AppError> {
    let base = {
        let s = text::slugify(title);
        if s.is_empty() { text::random_slug() } else { s }
    };

    let mut candidate = base.clone();
    let mut counter = 1;
    while post::Entity::find()
        .filter(post::Column::Slug.eq(&candidate))
        .one(db)
        .await?
        .is_some()
    {
        candidate = format!("{}-{}", base, counter);
        counter += 1;
    }
    Ok(candidate)
}

/// Fingerprint the viewer for view dedup: the user ID when authenticated,
/// otherwise client IP + user agent.
fn viewer_fingerprint(user_id: Option<i32>, headers: &HeaderMap) -> String {
    match user_id {
        Some(id) => hash_token(&format!("user:{}", id)),
        None => {
            let (ip, ua) = extract_client_info(headers);
            hash_token(&format!(
                "anon:{}:{}",
                ip.unwrap_or_default(),
                ua.unwrap_or_default()
            ))
        }
    }
}

fn extract_client_info(headers: &HeaderMap) -> (Option<String>, Option<String>) {
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(',').next().unwrap_or("").trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string())
        });

    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    (ip, user_agent)
}

async fn featured_post(db: &DatabaseConnection) -> Result<Option<PostSummary>, AppError> {
    let featured = post::Entity::find()
        .filter(post::Column::IsPublished.eq(true))
        .order_by_desc(post::Column::ViewsCount)
        .one(db)
        .await?;

    match featured {
        Some(p) => Ok(post_summaries(db, vec![p]).await?.pop()),
        None => Ok(None),
    }
}

async fn build_detail(
    db: &DatabaseConnection,
    post_model: post::Model,
    liked: bool,
) -> Result<PostDetail, AppError> {
    let authors = load_authors(db, vec![post_model.author_id]).await?;
    let author = authors
        .get(&post_model.author_id)
        .cloned()
        .ok_or_else(|| AppError::Internal("Author missing for post".to_string()))?;

    let category = match post_model.category_id {
        Some(category_id) => category::Entity::find_by_id(category_id)
            .one(db)
            .await?
            .map(CategoryBrief::from),
        None => None,
    };

    let like_count = like::Entity::find()
        .filter(like::Column::PostId.eq(post_model.id))
        .count(db)
        .await? as i64;
    let comment_count = comment::Entity::find()
        .filter(comment::Column::PostId.eq(post_model.id))
        .filter(comment::Column::IsActive.eq(true))
        .count(db)
        .await? as i64;

    // Related posts share the post's category (including "no category")
    let mut related_query = post::Entity::find()
        .filter(post::Column::IsPublished.eq(true))
        .filter(post::Column::Id.ne(post_model.id));
    related_query = match post_model.category_id {
        Some(category_id) => related_query.filter(post::Column::CategoryId.eq(category_id)),
        None => related_query.filter(post::Column::CategoryId.is_null()),
    };
    let related_models = related_query
        .order_by_desc(post::Column::CreatedAt)
        .limit(3)
        .all(db)
        .await?;
    let related = post_summaries(db, related_models).await?;

    Ok(PostDetail {
        id: post_model.id,
        title: post_model.title,
        slug: post_model.slug,
        excerpt: post_model.excerpt,
        content: post_model.content,
        cover_image: post_model.cover_image,
        status: post_model.status,
        is_published: post_model.is_published,
        views_count: post_model.views_count,
        like_count,
        comment_count,
        liked,
        author,
        category,
        related,
        created_at: post_model.created_at,
        updated_at: post_model.updated_at,
    })
}

/// Batch-load posts into list items with authors, categories and counts.
pub(crate) async fn post_summaries(
    db: &DatabaseConnection,
    posts: Vec<post::Model>,
) -> Result<Vec<PostSummary>, AppError> {
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let post_ids: Vec<i32> = posts.iter().map(|p| p.id).collect();
    let author_ids: Vec<i32> = posts.iter().map(|p| p.author_id).collect();
    let category_ids: Vec<i32> = posts.iter().filter_map(|p| p.category_id).collect();

    let authors = load_authors(db, author_ids).await?;

    let categories: HashMap<i32, CategoryBrief> = category::Entity::find()
        .filter(category::Column::Id.is_in(category_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, CategoryBrief::from(c)))
        .collect();

    let like_counts = grouped_like_counts(db, &post_ids).await?;
    let comment_counts = grouped_comment_counts(db, &post_ids).await?;

    let mut items = Vec::with_capacity(posts.len());
    for p in posts {
        let author = authors.get(&p.author_id).cloned().ok_or_else(|| {
            AppError::Internal(format!("Author {} missing for post {}", p.author_id, p.id))
        })?;
        let category = p.category_id.and_then(|id| categories.get(&id).cloned());

        items.push(PostSummary {
            id: p.id,
            title: p.title,
            slug: p.slug,
            excerpt: p.excerpt,
            cover_image: p.cover_image,
            views_count: p.views_count,
            like_count: like_counts.get(&p.id).copied().unwrap_or(0),
            comment_count: comment_counts.get(&p.id).copied().unwrap_or(0),
            author,
            category,
            created_at: p.created_at,
        });
    }
    Ok(items)
}

async fn grouped_like_counts(
    db: &DatabaseConnection,
    post_ids: &[i32],
) -> Result<HashMap<i32, i64>, AppError> {
    let rows: Vec<(i32, i64)> = like::Entity::find()
        .select_only()
        .column(like::Column::PostId)
        .column_as(like::Column::Id.count(), "cnt")
        .filter(like::Column::PostId.is_in(post_ids.iter().copied()))
        .group_by(like::Column::PostId)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows.into_iter().collect())
}

async fn grouped_comment_counts(
    db: &DatabaseConnection,
    post_ids: &[i32],
) -> Result<HashMap<i32, i64>, AppError> {
    let rows: Vec<(i32, i64)> = comment::Entity::find()
        .select_only()
        .column(comment::Column::PostId)
        .column_as(comment::Column::Id.count(), "cnt")
        .filter(comment::Column::PostId.is_in(post_ids.iter().copied()))
        .filter(comment::Column::IsActive.eq(true))
        .group_by(comment::Column::PostId)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows.into_iter().collect())
}

async fn load_authors(
    db: &DatabaseConnection,
    user_ids: Vec<i32>,
) -> Result<HashMap<i32, AuthorResponse>, AppError> {
    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids.clone()))
        .all(db)
        .await?;

    let avatars: HashMap<i32, Option<String>> = profile::Entity::find()
        .filter(profile::Column::UserId.is_in(user_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.user_id, p.avatar))
        .collect();

    Ok(users
        .into_iter()
        .map(|u| {
            let avatar = avatars.get(&u.id).cloned().flatten();
            (
                u.id,
                AuthorResponse {
                    id: u.id,
                    username: u.username,
                    first_name: u.first_name,
                    last_name: u.last_name,
                    avatar,
                },
            )
        })
        .collect())
}

fn comment_node(
    c: comment::Model,
    authors: &HashMap<i32, AuthorResponse>,
    replies: Vec<CommentResponse>,
) -> Result<CommentResponse, AppError> {
    let author = authors.get(&c.author_id).cloned().ok_or_else(|| {
        AppError::Internal(format!("Author {} missing for comment {}", c.author_id, c.id))
    })?;

    Ok(CommentResponse {
        id: c.id,
        text: c.text,
        parent_id: c.parent_id,
        author,
        replies,
        created_at: c.created_at,
    })
}
