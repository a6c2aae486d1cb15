use axum::{
    Router,
    extract::State,
    routing::{get, patch, post},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::{create_token, hash_password, verify_password};
use crate::error::AppError;
use crate::extractors::{AuthUser, Json};
use crate::models::profile::{self, ProfileResponse};
use crate::models::user::{self, Entity as User, UserResponse};
use crate::response::ApiResponse;

use super::AppState;

// ── Request / Response types ──

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 3, max = 50, message = "must be 3-50 characters"))]
    pub username: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: UserResponse,
}

/// Current user with their profile.
#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub user: UserResponse,
    pub profile: ProfileResponse,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/profile", patch(update_profile))
}

// ── Handlers ──

/// Sign up a new user. The profile row is created in the same transaction.
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "User created", body = ApiResponse<AuthResponse>),
        (status = 409, description = "User already exists"),
        (status = 422, description = "Invalid input")
    ),
    tag = "auth"
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<ApiResponse<AuthResponse>, AppError> {
    payload.validate()?;

    if payload.password.len() < state.config.min_password_length {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            state.config.min_password_length
        )));
    }

    // Check if user exists
    let existing = User::find()
        .filter(
            user::Column::Email
                .eq(&payload.email)
                .or(user::Column::Username.eq(&payload.username)),
        )
        .one(&state.db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(
            "User with this email or username already exists".to_string(),
        ));
    }

    let password_hash = hash_password(&payload.password)?;
    let now = Utc::now().naive_utc();

    // Create user and profile together, so no user row ever exists
    // without its profile.
    let txn = state.db.begin().await?;

    let new_user = user::ActiveModel {
        email: Set(payload.email),
        username: Set(payload.username),
        password_hash: Set(password_hash),
        first_name: Set(payload.first_name),
        last_name: Set(payload.last_name),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let user_model = new_user.insert(&txn).await?;

    let new_profile = profile::ActiveModel {
        user_id: Set(user_model.id),
        bio: Set(String::new()),
        avatar: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    new_profile.insert(&txn).await?;

    txn.commit().await?;

    tracing::info!(user_id = user_model.id, "user registered");

    let token = create_token(
        user_model.id,
        &state.config.jwt_secret,
        state.config.jwt_expiry_hours,
    )?;

    Ok(ApiResponse::success(AuthResponse {
        access_token: token,
        user: UserResponse::from(user_model),
    }))
}

/// Log in with existing credentials.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<ApiResponse<AuthResponse>, AppError> {
    // Wrong email and wrong password are indistinguishable to the caller.
    let user_model = User::find()
        .filter(user::Column::Email.eq(&payload.email))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    if !user_model.is_active {
        return Err(AppError::Unauthorized(
            "Account is deactivated".to_string(),
        ));
    }

    let is_valid = verify_password(&payload.password, &user_model.password_hash)?;
    if !is_valid {
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let token = create_token(
        user_model.id,
        &state.config.jwt_secret,
        state.config.jwt_expiry_hours,
    )?;

    Ok(ApiResponse::success(AuthResponse {
        access_token: token,
        user: UserResponse::from(user_model),
    }))
}

/// Get the current user with their profile.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<MeResponse>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<ApiResponse<MeResponse>, AppError> {
    let (user_model, profile_model) = load_user_with_profile(&state, user_id).await?;

    Ok(ApiResponse::success(MeResponse {
        user: UserResponse::from(user_model),
        profile: ProfileResponse::from(profile_model),
    }))
}

/// Update account and profile fields (partial).
#[utoipa::path(
    patch,
    path = "/api/auth/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<MeResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Email already taken")
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<ApiResponse<MeResponse>, AppError> {
    payload.validate()?;

    let (user_model, profile_model) = load_user_with_profile(&state, user_id).await?;
    let now = Utc::now().naive_utc();

    if let Some(ref email) = payload.email {
        let taken = User::find()
            .filter(user::Column::Email.eq(email))
            .filter(user::Column::Id.ne(user_id))
            .one(&state.db)
            .await?;
        if taken.is_some() {
            return Err(AppError::Conflict(
                "This email is already registered".to_string(),
            ));
        }
    }

    let mut active: user::ActiveModel = user_model.into();
    if let Some(email) = payload.email {
        active.email = Set(email);
    }
    if let Some(first_name) = payload.first_name {
        active.first_name = Set(Some(first_name));
    }
    if let Some(last_name) = payload.last_name {
        active.last_name = Set(Some(last_name));
    }
    active.updated_at = Set(now);
    let user_model = active.update(&state.db).await?;

    let mut active: profile::ActiveModel = profile_model.into();
    if let Some(bio) = payload.bio {
        active.bio = Set(bio);
    }
    if let Some(avatar) = payload.avatar {
        active.avatar = Set(Some(avatar));
    }
    active.updated_at = Set(now);
    let profile_model = active.update(&state.db).await?;

    Ok(ApiResponse::success(MeResponse {
        user: UserResponse::from(user_model),
        profile: ProfileResponse::from(profile_model),
    }))
}

async fn load_user_with_profile(
    state: &AppState,
    user_id: i32,
) -> Result<(user::Model, profile::Model), AppError> {
    let user_model = User::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let profile_model = profile::Entity::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Internal("Profile missing for user".to_string()))?;

    Ok((user_model, profile_model))
}
