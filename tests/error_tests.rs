use axum::response::IntoResponse;
use inkpress::AppError;
use inkpress::error::FieldError;

#[test]
fn test_status_codes() {
    assert_eq!(AppError::NotFound("x".into()).status_code(), 404);
    assert_eq!(AppError::BadRequest("x".into()).status_code(), 400);
    assert_eq!(AppError::Unauthorized("x".into()).status_code(), 401);
    assert_eq!(AppError::Forbidden("x".into()).status_code(), 403);
    assert_eq!(AppError::Conflict("x".into()).status_code(), 409);
    assert_eq!(AppError::Validation("x".into()).status_code(), 422);
    assert_eq!(AppError::Internal("x".into()).status_code(), 500);
}

#[test]
fn test_error_codes() {
    assert_eq!(AppError::NotFound("x".into()).error_code(), "NOT_FOUND");
    assert_eq!(AppError::Conflict("x".into()).error_code(), "CONFLICT");
    assert_eq!(
        AppError::Validation("x".into()).error_code(),
        "VALIDATION_ERROR"
    );
}

#[test]
fn test_into_response_status() {
    let res = AppError::NotFound("Post not found".into()).into_response();
    assert_eq!(res.status(), 404);
}

#[test]
fn test_validation_errors_carry_fields() {
    let err = AppError::ValidationErrors(vec![
        FieldError::new("email", "must be a valid email address"),
        FieldError::with_code("username", "too short", "length"),
    ]);
    assert_eq!(err.status_code(), 422);

    let res = err.into_response();
    assert_eq!(res.status(), 422);
}

#[test]
fn test_db_error_converts() {
    let err: AppError = sea_orm::DbErr::Custom("boom".into()).into();
    assert_eq!(err.status_code(), 500);
    assert_eq!(err.error_code(), "DATABASE_ERROR");
}
