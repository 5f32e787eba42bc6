use actix_web::{
    body::to_bytes,
    http::{header::HeaderMap, StatusCode},
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
    Scope,
};
use chrono::{Duration, Utc};
use devrang_engine::{
    db_types::{Customer, Order, OrderStatusType, Product, Role, UserProfile},
    AuthApi,
};
use drg_common::Secret;
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::json;

use super::mocks::MockBackend;
use crate::{
    auth::{sign_identity_token, IdentityClaims, TokenIssuer},
    config::AuthConfig,
    middleware::{ApprovalGateFactory, JwtMiddlewareFactory},
};

pub const IDENTITY_SECRET: &str = "identity-secret-for-endpoint-tests";
pub const ADMIN_EMAIL: &str = "admin@devrang.in";
pub const USER_EMAIL: &str = "meera@devrang.in";

// DO NOT re-use these keys anywhere.
pub fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: Secret::new("session-secret-for-endpoint-tests".into()),
        identity_secret: Secret::new(IDENTITY_SECRET.into()),
        session_ttl: Duration::hours(24),
        admin_emails: vec![ADMIN_EMAIL.into()],
    }
}

pub fn token_issuer() -> TokenIssuer {
    TokenIssuer::new(&auth_config())
}

pub fn session_token(profile: &UserProfile) -> String {
    token_issuer().issue_token(profile).expect("Failed to sign token")
}

pub fn identity_token(email: &str, name: &str) -> String {
    let claims = IdentityClaims::new(email, name, Duration::minutes(5));
    sign_identity_token(IDENTITY_SECRET, &claims).expect("Failed to sign identity token")
}

pub fn profile(email: &str, role: Role, approved: bool) -> UserProfile {
    UserProfile {
        email: email.into(),
        name: "Test User".into(),
        image: None,
        role,
        approved,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn approved_user() -> UserProfile {
    profile(USER_EMAIL, Role::User, true)
}

pub fn admin() -> UserProfile {
    profile(ADMIN_EMAIL, Role::Admin, true)
}

/// A backend for the access gate that knows exactly one profile.
pub fn gate_for(known: Option<UserProfile>) -> MockBackend {
    let mut gate = MockBackend::new();
    gate.expect_fetch_profile().returning(move |_| Ok(known.clone()));
    gate
}

pub fn product(id: i64, rupees: i64) -> Product {
    serde_json::from_value(json!({
        "id": id,
        "name": format!("Rudraksha mala #{id}"),
        "description": "Five mukhi rudraksha, hand knotted",
        "category": "Spiritual",
        "brand": "Devrang",
        "price": rupees * 100,
        "story": "",
        "image_url": "https://cdn.devrang.in/mala.jpg",
        "affiliate_link": "",
        "tags": ["mala"],
        "occasion": ["Diwali"],
        "recipient": "Anyone",
        "embedding": null,
        "created_at": Utc::now(),
        "updated_at": Utc::now(),
    }))
    .expect("Invalid product fixture")
}

pub fn customer(id: i64) -> Customer {
    Customer {
        id,
        name: "Ravi Sharma".into(),
        phone: "9876543210".into(),
        email: String::new(),
        shipping_address: "12 MG Road, Pune".into(),
        dob: String::new(),
        gotra: "Bharadwaj".into(),
        rating: 5,
        comments: String::new(),
        created_by: USER_EMAIL.into(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn order(order_id: &str, placed_by: &str, status: OrderStatusType) -> Order {
    serde_json::from_value(json!({
        "id": 1,
        "order_id": order_id,
        "payment_link_id": order_id,
        "payment_url": format!("https://rzp.io/i/{order_id}"),
        "placed_by": placed_by,
        "customer_id": null,
        "product": {
            "id": 4,
            "name": "Rudraksha mala #4",
            "category": "Spiritual",
            "brand": "Devrang",
            "price": 99900,
            "image_url": "https://cdn.devrang.in/mala.jpg"
        },
        "contact": {
            "name": "Test User",
            "email": placed_by,
            "phone": "0000000000",
            "address": "Not provided"
        },
        "amount": 99900,
        "currency": "INR",
        "status": status,
        "payment_id": null,
        "payment_method": null,
        "paid_at": null,
        "created_at": Utc::now(),
        "updated_at": Utc::now(),
    }))
    .expect("Invalid order fixture")
}

/// Registers the given routes under `/api`, behind the session middleware and the access gate.
pub fn api_app<F>(gate: MockBackend, routes: F) -> impl FnOnce(&mut ServiceConfig)
where F: FnOnce(Scope) -> Scope {
    move |cfg: &mut ServiceConfig| {
        let scope = routes(web::scope("/api"))
            .wrap(ApprovalGateFactory::<MockBackend>::new())
            .wrap(JwtMiddlewareFactory::new(token_issuer()));
        cfg.app_data(web::Data::new(AuthApi::new(gate))).app_data(web::Data::new(token_issuer())).service(scope);
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Sends the request to an app built with `configure`. Errors raised by middleware are rendered exactly as the
/// server would render them.
pub async fn send<F>(req: TestRequest, configure: F) -> TestResponse
where F: FnOnce(&mut ServiceConfig) {
    let app = test::init_service(App::new().configure(configure)).await;
    debug!("Making request");
    match test::try_call_service(&app, req.to_request()).await {
        Ok(res) => {
            let status = res.status();
            let headers = res.headers().clone();
            let body = test::read_body(res).await;
            TestResponse { status, headers, body: String::from_utf8_lossy(&body).into_owned() }
        },
        Err(e) => {
            let res = e.error_response();
            let status = res.status();
            let headers = res.headers().clone();
            let body = to_bytes(res.into_body()).await.expect("Failed to read error body");
            TestResponse { status, headers, body: String::from_utf8_lossy(&body).into_owned() }
        },
    }
}

pub fn bearer(profile: &UserProfile) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", session_token(profile)))
}
