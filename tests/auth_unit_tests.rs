use inkpress::auth::{
    create_token, hash_password, hash_token, validate_token, verify_password,
};

#[test]
fn test_create_and_validate_token() {
    let token = create_token(42, "unit-test-secret", 24).unwrap();
    let claims = validate_token(&token, "unit-test-secret").unwrap();
    assert_eq!(claims.sub, "42");
    assert!(claims.exp > claims.iat);
}

#[test]
fn test_validate_token_wrong_secret() {
    let token = create_token(42, "secret-a", 24).unwrap();
    assert!(validate_token(&token, "secret-b").is_err());
}

#[test]
fn test_validate_token_garbage() {
    assert!(validate_token("not.a.token", "secret").is_err());
}

#[test]
fn test_hash_and_verify_password() {
    let hash = hash_password("hunter2hunter2").unwrap();
    assert_ne!(hash, "hunter2hunter2");
    assert!(verify_password("hunter2hunter2", &hash).unwrap());
    assert!(!verify_password("wrong-password", &hash).unwrap());
}

#[test]
fn test_hashes_are_salted() {
    let a = hash_password("same-password").unwrap();
    let b = hash_password("same-password").unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_verify_rejects_malformed_hash() {
    assert!(verify_password("anything", "not-a-phc-string").is_err());
}

#[test]
fn test_hash_token_deterministic() {
    let a = hash_token("user:1");
    let b = hash_token("user:1");
    let c = hash_token("user:2");
    assert_eq!(a, b);
    assert_ne!(a, c);
    // hex-encoded SHA-256
    assert_eq!(a.len(), 64);
}
