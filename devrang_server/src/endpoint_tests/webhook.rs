use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use devrang_engine::{
    db_types::OrderStatusType,
    events::EventProducers,
    traits::{OrderManagementError, TransitionResult},
    OrderFlowApi,
};
use drg_common::Secret;
use razorpay_tools::{signature::calculate_signature, RAZORPAY_SIGNATURE_HEADER};

use super::{
    helpers::*,
    mocks::{MockBackend, MockGateway},
};
use crate::{config::ServerOptions, middleware::HmacMiddlewareFactory, routes::RazorpayWebhookRoute};

const WEBHOOK_SECRET: &str = "webhook-secret-for-endpoint-tests";

const LINK_PAID: &str = r#"{
  "entity": "event",
  "account_id": "acc_BFQ7uQEaa7j2z7",
  "event": "payment_link.paid",
  "contains": ["payment_link", "order", "payment"],
  "payload": {
    "payment_link": {
      "entity": {
        "id": "plink_Nx81",
        "status": "paid",
        "amount": 79900,
        "reference_id": "DRG-1712345678-4821",
        "short_url": "https://rzp.io/i/Nx81"
      }
    },
    "payment": {
      "entity": {
        "id": "pay_Nx82",
        "amount": 79900,
        "currency": "INR",
        "status": "captured",
        "order_id": "order_Nx83",
        "method": "upi",
        "notes": {"payment_link_id": "plink_Nx81"},
        "created_at": 1712345690
      }
    }
  },
  "created_at": 1712345691
}"#;

const PAYMENT_CAPTURED: &str = r#"{
  "entity": "event",
  "account_id": "acc_BFQ7uQEaa7j2z7",
  "event": "payment.captured",
  "contains": ["payment"],
  "payload": {
    "payment": {
      "entity": {
        "id": "pay_Nx82",
        "amount": 79900,
        "currency": "INR",
        "status": "captured",
        "order_id": "order_Nx83",
        "method": "card",
        "notes": {"payment_link_id": "plink_Nx81"},
        "created_at": 1712345690
      }
    }
  },
  "created_at": 1712345691
}"#;

fn configure_webhook(db: MockBackend) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = OrderFlowApi::new(db, MockGateway::new(), EventProducers::default());
        cfg.app_data(web::Data::new(api)).app_data(web::Data::new(ServerOptions::default())).service(
            web::scope("/razorpay")
                .wrap(HmacMiddlewareFactory::new(RAZORPAY_SIGNATURE_HEADER, Secret::new(WEBHOOK_SECRET.into())))
                .service(RazorpayWebhookRoute::<MockBackend, MockGateway>::new()),
        );
    }
}

fn webhook_request(body: &str, signature: &str) -> TestRequest {
    TestRequest::post()
        .uri("/razorpay/webhook")
        .insert_header((RAZORPAY_SIGNATURE_HEADER, signature.to_string()))
        .insert_header(("Content-Type", "application/json"))
        .set_payload(body.to_string())
}

fn signed(body: &str) -> TestRequest {
    webhook_request(body, &calculate_signature(WEBHOOK_SECRET, body.as_bytes()))
}

fn untouched_backend() -> MockBackend {
    let mut db = MockBackend::new();
    db.expect_mark_link_paid().times(0);
    db.expect_mark_link_expired().times(0);
    db.expect_mark_payment_captured().times(0);
    db
}

#[actix_web::test]
async fn signed_webhook_marks_the_order_paid() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_mark_link_paid().withf(|id, _| id.as_str() == "plink_Nx81").times(1).returning(|id, _| {
        Ok(TransitionResult::Applied {
            previous: OrderStatusType::Created,
            order: order(id.as_str(), USER_EMAIL, OrderStatusType::Paid),
        })
    });
    let res = send(signed(LINK_PAID), configure_webhook(db)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, r#"{"received":true}"#);
}

#[actix_web::test]
async fn replayed_webhook_is_acknowledged() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_mark_link_paid()
        .times(1)
        .returning(|id, _| Ok(TransitionResult::Unchanged(order(id.as_str(), USER_EMAIL, OrderStatusType::Paid))));
    let res = send(signed(LINK_PAID), configure_webhook(db)).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[actix_web::test]
async fn webhook_for_unknown_order_is_acknowledged() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_mark_link_paid().times(1).returning(|_, _| Ok(TransitionResult::NotFound));
    let res = send(signed(LINK_PAID), configure_webhook(db)).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[actix_web::test]
async fn tampered_webhook_is_rejected() {
    let _ = env_logger::try_init().ok();
    let signature = calculate_signature(WEBHOOK_SECRET, LINK_PAID.as_bytes());
    let tampered = LINK_PAID.replace("79900", "100");
    let res = send(webhook_request(&tampered, &signature), configure_webhook(untouched_backend())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body, r#"{"error":"Invalid signature"}"#);
}

#[actix_web::test]
async fn signed_capture_records_the_payment() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_mark_payment_captured()
        .withf(|p| p.payment_id == "pay_Nx82" && p.method.as_deref() == Some("card"))
        .times(1)
        .returning(|_| {
            Ok(TransitionResult::Applied {
                previous: OrderStatusType::Created,
                order: order("plink_Nx81", USER_EMAIL, OrderStatusType::Paid),
            })
        });
    let res = send(signed(PAYMENT_CAPTURED), configure_webhook(db)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, r#"{"received":true}"#);
}

#[actix_web::test]
async fn tampered_capture_never_reaches_the_orders() {
    let _ = env_logger::try_init().ok();
    let signature = calculate_signature(WEBHOOK_SECRET, PAYMENT_CAPTURED.as_bytes());
    let tampered = PAYMENT_CAPTURED.replace("pay_Nx82", "pay_Forged");
    let mut db = MockBackend::new();
    db.expect_mark_payment_captured().times(0);
    db.expect_mark_link_paid().times(0);
    let res = send(webhook_request(&tampered, &signature), configure_webhook(db)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body, r#"{"error":"Invalid signature"}"#);
}

#[actix_web::test]
async fn unsigned_webhook_is_rejected() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/razorpay/webhook").set_payload(LINK_PAID);
    let res = send(req, configure_webhook(untouched_backend())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body, r#"{"error":"Invalid signature"}"#);
}

#[actix_web::test]
async fn signed_but_malformed_webhook() {
    let _ = env_logger::try_init().ok();
    let res = send(signed(r#"{"payload": "#), configure_webhook(untouched_backend())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn webhook_without_the_entity_it_needs() {
    let _ = env_logger::try_init().ok();
    let body = r#"{"event": "payment_link.expired", "payload": {}}"#;
    let res = send(signed(body), configure_webhook(untouched_backend())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.contains("missing its payment_link entity"), "was: {}", res.body);
}

#[actix_web::test]
async fn other_events_are_acknowledged_and_ignored() {
    let _ = env_logger::try_init().ok();
    let body = r#"{"event": "refund.processed", "payload": {}}"#;
    let res = send(signed(body), configure_webhook(untouched_backend())).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[actix_web::test]
async fn storage_failure_asks_for_a_retry() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_mark_link_paid()
        .times(1)
        .returning(|_, _| Err(OrderManagementError::DatabaseError("database is locked".into())));
    let res = send(signed(LINK_PAID), configure_webhook(db)).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body, r#"{"error":"Webhook processing failed"}"#);
}
