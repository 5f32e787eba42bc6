use actix_web::{
    http::{header::LOCATION, StatusCode},
    test::TestRequest,
    web,
    Scope,
};
use devrang_engine::{
    db_types::{Role, UserProfile},
    CustomerApi,
};

use super::{
    helpers::*,
    mocks::MockBackend,
};
use crate::routes::{ApproveUserRoute, CustomersRoute, PendingUsersRoute, RejectUserRoute};

fn customers_backend(calls: usize) -> MockBackend {
    let mut db = MockBackend::new();
    db.expect_fetch_customers().times(calls).returning(|| Ok(vec![customer(1)]));
    db
}

#[actix_web::test]
async fn api_without_session_token() {
    let _ = env_logger::try_init().ok();
    let db = customers_backend(0);
    let app = api_app(gate_for(Some(approved_user())), move |s| {
        s.app_data(web::Data::new(CustomerApi::new(db))).service(CustomersRoute::<MockBackend>::new())
    });
    let res = send(TestRequest::get().uri("/api/customers"), app).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn api_with_tampered_session_token() {
    let _ = env_logger::try_init().ok();
    let db = customers_backend(0);
    let app = api_app(gate_for(Some(approved_user())), move |s| {
        s.app_data(web::Data::new(CustomerApi::new(db))).service(CustomersRoute::<MockBackend>::new())
    });
    let mut token = session_token(&approved_user());
    token.replace_range(token.len() - 10..token.len() - 5, "AAAAA");
    let req = TestRequest::get().uri("/api/customers").insert_header(("Authorization", format!("Bearer {token}")));
    let res = send(req, app).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert!(res.body.contains("The session token is invalid."), "was: {}", res.body);
}

#[actix_web::test]
async fn unapproved_users_are_redirected() {
    let _ = env_logger::try_init().ok();
    let waiting = profile(USER_EMAIL, Role::User, false);
    let db = customers_backend(0);
    let app = api_app(gate_for(Some(waiting.clone())), move |s| {
        s.app_data(web::Data::new(CustomerApi::new(db))).service(CustomersRoute::<MockBackend>::new())
    });
    let req = TestRequest::get().uri("/api/customers").insert_header(bearer(&waiting));
    let res = send(req, app).await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.headers.get(LOCATION).unwrap(), "/auth/error?error=NOT_APPROVED");
}

#[actix_web::test]
async fn approval_is_read_from_the_profile_not_the_token() {
    let _ = env_logger::try_init().ok();
    // The token was issued while the user was approved. The profile has since been rejected.
    let db = customers_backend(0);
    let app = api_app(gate_for(None), move |s| {
        s.app_data(web::Data::new(CustomerApi::new(db))).service(CustomersRoute::<MockBackend>::new())
    });
    let req = TestRequest::get().uri("/api/customers").insert_header(bearer(&approved_user()));
    let res = send(req, app).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn approved_users_pass_the_gate() {
    let _ = env_logger::try_init().ok();
    let db = customers_backend(1);
    let app = api_app(gate_for(Some(approved_user())), move |s| {
        s.app_data(web::Data::new(CustomerApi::new(db))).service(CustomersRoute::<MockBackend>::new())
    });
    let req = TestRequest::get().uri("/api/customers").insert_header(bearer(&approved_user()));
    let res = send(req, app).await;
    assert_eq!(res.status, StatusCode::OK);
    let body: serde_json::Value = res.json().unwrap();
    assert_eq!(body[0]["name"], "Ravi Sharma");
}

/// The admin routes share the access gate's `AuthApi`, so one backend answers the gate's profile lookup and the
/// admin operation itself.
fn admin_routes() -> impl FnOnce(Scope) -> Scope {
    |s| {
        s.service(PendingUsersRoute::<MockBackend>::new())
            .service(ApproveUserRoute::<MockBackend>::new())
            .service(RejectUserRoute::<MockBackend>::new())
    }
}

#[actix_web::test]
async fn users_cannot_approve_users() {
    let _ = env_logger::try_init().ok();
    let mut db = gate_for(Some(approved_user()));
    db.expect_set_approved().times(0);
    let app = api_app(db, admin_routes());
    let req = TestRequest::put()
        .uri("/api/user/approve")
        .insert_header(bearer(&approved_user()))
        .set_json(serde_json::json!({"email": "new@devrang.in"}));
    let res = send(req, app).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert!(res.body.contains("Admin access is required"), "was: {}", res.body);
}

#[actix_web::test]
async fn admins_approve_users() {
    let _ = env_logger::try_init().ok();
    let mut db = gate_for(Some(admin()));
    db.expect_set_approved()
        .withf(|email, approved| email == "new@devrang.in" && *approved)
        .times(1)
        .returning(|email, _| Ok(profile(email, Role::User, true)));
    let app = api_app(db, admin_routes());
    let req = TestRequest::put()
        .uri("/api/user/approve")
        .insert_header(bearer(&admin()))
        .set_json(serde_json::json!({"email": " New@Devrang.in "}));
    let res = send(req, app).await;
    assert_eq!(res.status, StatusCode::OK);
    let body: UserProfile = res.json().unwrap();
    assert!(body.approved);
}

#[actix_web::test]
async fn approving_without_an_email() {
    let _ = env_logger::try_init().ok();
    let mut db = gate_for(Some(admin()));
    db.expect_set_approved().times(0);
    let app = api_app(db, admin_routes());
    let req =
        TestRequest::put().uri("/api/user/approve").insert_header(bearer(&admin())).set_json(serde_json::json!({}));
    let res = send(req, app).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body, r#"{"error":"Email is required"}"#);
}

#[actix_web::test]
async fn admins_reject_users() {
    let _ = env_logger::try_init().ok();
    let mut db = gate_for(Some(admin()));
    db.expect_delete_profile().withf(|email| email == "new@devrang.in").times(1).returning(|_| Ok(()));
    let app = api_app(db, admin_routes());
    let req = TestRequest::delete()
        .uri("/api/user/reject")
        .insert_header(bearer(&admin()))
        .set_json(serde_json::json!({"email": "new@devrang.in"}));
    let res = send(req, app).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[actix_web::test]
async fn admins_list_pending_users() {
    let _ = env_logger::try_init().ok();
    let mut db = gate_for(Some(admin()));
    db.expect_fetch_pending_profiles()
        .times(1)
        .returning(|| Ok(vec![profile("a@devrang.in", Role::User, false), profile("b@devrang.in", Role::User, false)]));
    let app = api_app(db, admin_routes());
    let req = TestRequest::get().uri("/api/user/pending").insert_header(bearer(&admin()));
    let res = send(req, app).await;
    assert_eq!(res.status, StatusCode::OK);
    let body: Vec<UserProfile> = res.json().unwrap();
    assert_eq!(body.len(), 2);
}

#[actix_web::test]
async fn admin_routes_outside_the_gate_are_refused() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_fetch_pending_profiles().times(0);
    let app = move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::new(devrang_engine::AuthApi::new(db)))
            .service(web::scope("/api").service(PendingUsersRoute::<MockBackend>::new()));
    };
    let req = TestRequest::get().uri("/api/user/pending").insert_header(bearer(&admin()));
    let res = send(req, app).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
}
