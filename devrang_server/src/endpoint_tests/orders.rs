use actix_web::{http::StatusCode, test::TestRequest, web, Scope};
use devrang_engine::{
    db_types::{Order, OrderStatusType, Paise},
    events::EventProducers,
    order_objects::BookingSummary,
    OrderFlowApi,
};

use super::{
    helpers::*,
    mocks::{MockBackend, MockGateway},
};
use crate::routes::{DashboardRoute, MyOrdersRoute, OrderByIdRoute};

fn order_routes(db: MockBackend) -> impl FnOnce(Scope) -> Scope {
    move |s| {
        s.app_data(web::Data::new(OrderFlowApi::new(db, MockGateway::new(), EventProducers::default())))
            .service(MyOrdersRoute::<MockBackend, MockGateway>::new())
            .service(OrderByIdRoute::<MockBackend, MockGateway>::new())
            .service(DashboardRoute::<MockBackend, MockGateway>::new())
    }
}

fn orders_backend() -> MockBackend {
    let mut db = MockBackend::new();
    db.expect_search_orders().returning(|q| {
        let email = q.placed_by.unwrap_or_default();
        Ok(vec![
            order("plink_1", &email, OrderStatusType::Paid),
            order("plink_2", &email, OrderStatusType::Created),
            order("plink_3", &email, OrderStatusType::Delivered),
        ])
    });
    db.expect_fetch_order_by_order_id()
        .returning(|id| Ok(Some(order(id.as_str(), "someone@devrang.in", OrderStatusType::Paid))));
    db
}

#[actix_web::test]
async fn fetch_my_orders() {
    let _ = env_logger::try_init().ok();
    let app = api_app(gate_for(Some(approved_user())), order_routes(orders_backend()));
    let req = TestRequest::get().uri("/api/orders").insert_header(bearer(&approved_user()));
    let res = send(req, app).await;
    assert_eq!(res.status, StatusCode::OK);
    let orders: Vec<Order> = res.json().unwrap();
    assert_eq!(orders.len(), 3);
    assert!(orders.iter().all(|o| o.placed_by == USER_EMAIL));
}

#[actix_web::test]
async fn users_cannot_fetch_other_users_orders() {
    let _ = env_logger::try_init().ok();
    let app = api_app(gate_for(Some(approved_user())), order_routes(orders_backend()));
    let req = TestRequest::get().uri("/api/orders?email=someone@devrang.in").insert_header(bearer(&approved_user()));
    let res = send(req, app).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn admins_fetch_other_users_orders() {
    let _ = env_logger::try_init().ok();
    let app = api_app(gate_for(Some(admin())), order_routes(orders_backend()));
    let req = TestRequest::get().uri("/api/orders?email=someone@devrang.in").insert_header(bearer(&admin()));
    let res = send(req, app).await;
    assert_eq!(res.status, StatusCode::OK);
    let orders: Vec<Order> = res.json().unwrap();
    assert!(orders.iter().all(|o| o.placed_by == "someone@devrang.in"));
}

#[actix_web::test]
async fn orders_of_other_users_are_hidden() {
    let _ = env_logger::try_init().ok();
    let app = api_app(gate_for(Some(approved_user())), order_routes(orders_backend()));
    let req = TestRequest::get().uri("/api/orders/plink_1").insert_header(bearer(&approved_user()));
    let res = send(req, app).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn admins_see_any_order() {
    let _ = env_logger::try_init().ok();
    let app = api_app(gate_for(Some(admin())), order_routes(orders_backend()));
    let req = TestRequest::get().uri("/api/orders/plink_1").insert_header(bearer(&admin()));
    let res = send(req, app).await;
    assert_eq!(res.status, StatusCode::OK);
    let order: Order = res.json().unwrap();
    assert_eq!(order.order_id.as_str(), "plink_1");
}

#[actix_web::test]
async fn dashboard_summarises_bookings() {
    let _ = env_logger::try_init().ok();
    let app = api_app(gate_for(Some(approved_user())), order_routes(orders_backend()));
    let req = TestRequest::get().uri("/api/dashboard").insert_header(bearer(&approved_user()));
    let res = send(req, app).await;
    assert_eq!(res.status, StatusCode::OK);
    let summary: BookingSummary = res.json().unwrap();
    assert_eq!(summary.total_bookings, 3);
    assert_eq!(summary.settled_bookings, 2);
    assert_eq!(summary.total_revenue, Paise::from_rupees(1998));
}
