use inkpress::openapi::ApiDoc;
use utoipa::OpenApi;

#[test]
fn test_openapi_spec_builds() {
    // Must terminate despite CommentResponse nesting replies of its own type
    let spec = ApiDoc::openapi();
    let json = spec.to_json().expect("spec should serialize");

    assert!(json.contains("/api/auth/signup"));
    assert!(json.contains("/api/posts"));
    assert!(json.contains("/api/categories"));
    assert!(json.contains("CommentResponse"));
    assert!(json.contains("bearer_auth"));
}
