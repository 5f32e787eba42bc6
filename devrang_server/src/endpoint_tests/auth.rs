use actix_web::{
    http::{header::LOCATION, StatusCode},
    test::TestRequest,
    web,
    web::ServiceConfig,
};
use devrang_engine::{
    db_types::{Role, UserProfile},
    AuthApi,
};

use super::{
    helpers::*,
    mocks::MockBackend,
};
use crate::{
    auth::IDENTITY_TOKEN_HEADER,
    data_objects::{SessionInfo, SignInResponse},
    middleware::JwtMiddlewareFactory,
    routes::{auth_error, health, AuthRoute, SessionMeRoute},
};

fn configure_auth(db: MockBackend) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = AuthApi::new(db).with_bootstrap_admins(&auth_config().admin_emails);
        cfg.app_data(web::Data::new(api))
            .app_data(web::Data::new(token_issuer()))
            .service(health)
            .service(auth_error)
            .service(AuthRoute::<MockBackend>::new())
            .service(
                web::scope("/session")
                    .wrap(JwtMiddlewareFactory::new(token_issuer()))
                    .service(SessionMeRoute::<MockBackend>::new()),
            );
    }
}

fn new_profile_backend() -> MockBackend {
    let mut db = MockBackend::new();
    db.expect_fetch_profile().returning(|_| Ok(None));
    db.expect_create_profile().times(1).returning(|p| {
        let mut result = profile(&p.email, p.role, p.approved);
        result.name = p.name;
        Ok(result)
    });
    db
}

#[actix_web::test]
async fn health_check() {
    let _ = env_logger::try_init().ok();
    let res = send(TestRequest::get().uri("/health"), configure_auth(MockBackend::new())).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[actix_web::test]
async fn sign_in_without_identity_token() {
    let _ = env_logger::try_init().ok();
    let res = send(TestRequest::post().uri("/auth"), configure_auth(MockBackend::new())).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert!(res.body.contains("No identity token was provided."), "was: {}", res.body);
}

#[actix_web::test]
async fn sign_in_with_forged_identity_token() {
    let _ = env_logger::try_init().ok();
    let claims = crate::auth::IdentityClaims::new(USER_EMAIL, "Meera", chrono::Duration::minutes(5));
    let forged = crate::auth::sign_identity_token("not-the-identity-secret", &claims).unwrap();
    let mut db = MockBackend::new();
    db.expect_fetch_profile().times(0);
    let req = TestRequest::post().uri("/auth").insert_header((IDENTITY_TOKEN_HEADER, forged));
    let res = send(req, configure_auth(db)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert!(res.body.contains("Signature has failed verification."), "was: {}", res.body);
}

#[actix_web::test]
async fn first_sign_in_creates_an_unapproved_profile() {
    let _ = env_logger::try_init().ok();
    let req =
        TestRequest::post().uri("/auth").insert_header((IDENTITY_TOKEN_HEADER, identity_token(" Meera@Devrang.in", "Meera")));
    let res = send(req, configure_auth(new_profile_backend())).await;
    assert_eq!(res.status, StatusCode::OK);
    let body: SignInResponse = res.json().unwrap();
    assert!(body.first_sign_in);
    assert!(!body.approved);
    assert_eq!(body.email, USER_EMAIL);
    assert_eq!(body.name, "Meera");
    assert_eq!(body.role, Role::User);
    let claims = token_issuer().validate_token(&body.token).unwrap();
    assert_eq!(claims.email(), USER_EMAIL);
}

#[actix_web::test]
async fn bootstrap_admins_are_approved_on_first_sign_in() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/auth").insert_header((IDENTITY_TOKEN_HEADER, identity_token(ADMIN_EMAIL, "Admin")));
    let res = send(req, configure_auth(new_profile_backend())).await;
    assert_eq!(res.status, StatusCode::OK);
    let body: SignInResponse = res.json().unwrap();
    assert!(body.first_sign_in);
    assert!(body.approved);
    assert_eq!(body.role, Role::Admin);
}

#[actix_web::test]
async fn unapproved_users_are_redirected_on_sign_in() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_fetch_profile().returning(|email| Ok(Some(profile(email, Role::User, false))));
    db.expect_touch_profile().times(0);
    let req = TestRequest::post().uri("/auth").insert_header((IDENTITY_TOKEN_HEADER, identity_token(USER_EMAIL, "Meera")));
    let res = send(req, configure_auth(db)).await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.headers.get(LOCATION).unwrap(), "/auth/error?error=NOT_APPROVED");
}

#[actix_web::test]
async fn approved_users_sign_in() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_fetch_profile().returning(|email| Ok(Some(profile(email, Role::User, true))));
    db.expect_touch_profile().times(1).returning(|email| Ok(profile(email, Role::User, true)));
    let req = TestRequest::post().uri("/auth").insert_header((IDENTITY_TOKEN_HEADER, identity_token(USER_EMAIL, "Meera")));
    let res = send(req, configure_auth(db)).await;
    assert_eq!(res.status, StatusCode::OK);
    let body: SignInResponse = res.json().unwrap();
    assert!(!body.first_sign_in);
    assert!(body.approved);
}

#[actix_web::test]
async fn auth_error_page() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/auth/error?error=NOT_APPROVED");
    let res = send(req, configure_auth(MockBackend::new())).await;
    assert_eq!(res.status, StatusCode::OK);
    let body: serde_json::Value = res.json().unwrap();
    assert_eq!(body["error"], "NOT_APPROVED");
    assert!(body["message"].as_str().unwrap().contains("waiting for approval"));
}

#[actix_web::test]
async fn unapproved_users_can_see_their_session() {
    let _ = env_logger::try_init().ok();
    let user = profile(USER_EMAIL, Role::User, false);
    let token_owner = user.clone();
    let mut db = MockBackend::new();
    db.expect_fetch_profile().returning(move |_| Ok(Some(user.clone())));
    let req = TestRequest::get().uri("/session/me").insert_header(bearer(&token_owner));
    let res = send(req, configure_auth(db)).await;
    assert_eq!(res.status, StatusCode::OK);
    let body: SessionInfo = res.json().unwrap();
    assert_eq!(body.email, USER_EMAIL);
    assert!(!body.approved);
}

#[actix_web::test]
async fn session_for_unknown_user() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_fetch_profile().returning(|_| Ok(None::<UserProfile>));
    let req = TestRequest::get().uri("/session/me").insert_header(bearer(&approved_user()));
    let res = send(req, configure_auth(db)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body, r#"{"error":"UNKNOWN_USER"}"#);
}

#[actix_web::test]
async fn session_without_token() {
    let _ = env_logger::try_init().ok();
    let res = send(TestRequest::get().uri("/session/me"), configure_auth(MockBackend::new())).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert!(res.body.contains("No session token was provided."), "was: {}", res.body);
}
