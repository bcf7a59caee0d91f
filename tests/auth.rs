use actix_web::test::TestRequest;
use medtrack_server::auth::guards::{
    ensure_admin, ensure_correct_user_or_admin, ensure_logged_in, Principal,
};
use medtrack_server::auth::AuthService;
use medtrack_server::db::models::User;
use medtrack_server::error::AppError;

fn auth_service() -> AuthService {
    AuthService::new("test_secret".to_string(), 24)
}

#[actix_web::test]
async fn test_bearer_token_resolves_principal() {
    let auth = auth_service();
    let user = User {
        username: "u1".to_string(),
        is_admin: false,
    };
    let token = auth.create_token(&user).unwrap();

    let req = TestRequest::default()
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_http_request();

    let principal = Principal::from_request(&req, &auth);
    assert_eq!(principal.username.as_deref(), Some("u1"));
    assert!(!principal.is_admin);
    assert!(ensure_logged_in(&principal).is_ok());
}

#[actix_web::test]
async fn test_admin_claim_survives_round_trip() {
    let auth = auth_service();
    let admin = User {
        username: "root".to_string(),
        is_admin: true,
    };
    let token = auth.create_token(&admin).unwrap();

    let req = TestRequest::default()
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_http_request();

    let principal = Principal::from_request(&req, &auth);
    assert!(ensure_admin(&principal).is_ok());
    assert!(ensure_correct_user_or_admin(&principal, "someoneElse").is_ok());
}

#[actix_web::test]
async fn test_missing_header_is_anonymous() {
    let auth = auth_service();
    let req = TestRequest::default().to_http_request();

    let principal = Principal::from_request(&req, &auth);
    assert_eq!(principal, Principal::anonymous());
    assert!(matches!(
        ensure_logged_in(&principal),
        Err(AppError::Unauthorized)
    ));
}

#[actix_web::test]
async fn test_tampered_token_is_anonymous() {
    let auth = auth_service();
    let other = AuthService::new("other_secret".to_string(), 24);
    let user = User {
        username: "u1".to_string(),
        is_admin: true,
    };
    let token = other.create_token(&user).unwrap();

    let req = TestRequest::default()
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_http_request();

    // Signed with the wrong secret: no identity, no admin bypass
    let principal = Principal::from_request(&req, &auth);
    assert_eq!(principal, Principal::anonymous());
    assert!(matches!(
        ensure_correct_user_or_admin(&principal, "u1"),
        Err(AppError::Unauthorized)
    ));
}

#[actix_web::test]
async fn test_non_bearer_scheme_is_anonymous() {
    let auth = auth_service();
    let req = TestRequest::default()
        .insert_header(("Authorization", "Basic dTE6aHVudGVyMg=="))
        .to_http_request();

    let principal = Principal::from_request(&req, &auth);
    assert_eq!(principal, Principal::anonymous());
}
