use actix_web::{http::StatusCode, test::TestRequest, web, Scope};
use devrang_engine::{
    db_types::{Customer, Product},
    traits::{CatalogApiError, CustomerApiError},
    CatalogApi,
    CustomerApi,
};
use serde_json::json;

use super::{
    helpers::*,
    mocks::MockBackend,
};
use crate::routes::{
    AddProductRoute,
    CreateCustomerRoute,
    DeleteCustomerRoute,
    DeleteProductRoute,
    ProductsRoute,
    SimilarProductsRoute,
    UpdateCustomerRoute,
};

fn customer_routes(db: MockBackend) -> impl FnOnce(Scope) -> Scope {
    move |s| {
        s.app_data(web::Data::new(CustomerApi::new(db)))
            .service(CreateCustomerRoute::<MockBackend>::new())
            .service(UpdateCustomerRoute::<MockBackend>::new())
            .service(DeleteCustomerRoute::<MockBackend>::new())
    }
}

fn catalog_routes(db: MockBackend) -> impl FnOnce(Scope) -> Scope {
    move |s| {
        s.app_data(web::Data::new(CatalogApi::new(db)))
            .service(ProductsRoute::<MockBackend>::new())
            .service(SimilarProductsRoute::<MockBackend>::new())
            .service(AddProductRoute::<MockBackend>::new())
            .service(DeleteProductRoute::<MockBackend>::new())
    }
}

#[actix_web::test]
async fn create_customer_records_the_creator() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_insert_customer()
        .withf(|c| c.created_by == USER_EMAIL && c.name.as_deref() == Some("Ravi Sharma") && c.rating == Some(5))
        .times(1)
        .returning(|_| Ok(customer(11)));
    let app = api_app(gate_for(Some(approved_user())), customer_routes(db));
    let req = TestRequest::post().uri("/api/customers").insert_header(bearer(&approved_user())).set_json(json!({
        "name": " Ravi Sharma ",
        "phone": "9876543210",
        "rating": 9
    }));
    let res = send(req, app).await;
    assert_eq!(res.status, StatusCode::CREATED);
    let body: Customer = res.json().unwrap();
    assert_eq!(body.id, 11);
}

#[actix_web::test]
async fn create_customer_without_phone() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_insert_customer().times(0);
    let app = api_app(gate_for(Some(approved_user())), customer_routes(db));
    let req = TestRequest::post()
        .uri("/api/customers")
        .insert_header(bearer(&approved_user()))
        .set_json(json!({"name": "Ravi Sharma"}));
    let res = send(req, app).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body, r#"{"error":"Name and phone are required"}"#);
}

#[actix_web::test]
async fn update_customer_without_id() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_update_customer().times(0);
    let app = api_app(gate_for(Some(approved_user())), customer_routes(db));
    let req = TestRequest::put()
        .uri("/api/customers/update")
        .insert_header(bearer(&approved_user()))
        .set_json(json!({"gotra": "Kashyap"}));
    let res = send(req, app).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body, r#"{"error":"Customer id is required"}"#);
}

#[actix_web::test]
async fn update_missing_customer() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_update_customer().times(1).returning(|id, _| Err(CustomerApiError::CustomerNotFound(id)));
    let app = api_app(gate_for(Some(approved_user())), customer_routes(db));
    let req = TestRequest::put()
        .uri("/api/customers/update")
        .insert_header(bearer(&approved_user()))
        .set_json(json!({"id": 404, "gotra": "Kashyap"}));
    let res = send(req, app).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn delete_customer() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_delete_customer().withf(|id| *id == 11).times(1).returning(|_| Ok(()));
    let app = api_app(gate_for(Some(approved_user())), customer_routes(db));
    let req = TestRequest::delete()
        .uri("/api/customers/delete")
        .insert_header(bearer(&approved_user()))
        .set_json(json!({"id": 11}));
    let res = send(req, app).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("Customer 11 deleted"), "was: {}", res.body);
}

#[actix_web::test]
async fn delete_customer_without_id() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_delete_customer().times(0);
    let app = api_app(gate_for(Some(approved_user())), customer_routes(db));
    let req =
        TestRequest::delete().uri("/api/customers/delete").insert_header(bearer(&approved_user())).set_json(json!({}));
    let res = send(req, app).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn products_are_filtered_by_query() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_search_products()
        .withf(|q| q.category.as_deref() == Some("Spiritual") && q.search.as_deref() == Some("mala"))
        .times(1)
        .returning(|_| Ok(vec![product(1, 999), product(2, 1499)]));
    let app = api_app(gate_for(Some(approved_user())), catalog_routes(db));
    let req =
        TestRequest::get().uri("/api/products?category=Spiritual&search=mala").insert_header(bearer(&approved_user()));
    let res = send(req, app).await;
    assert_eq!(res.status, StatusCode::OK);
    let body: Vec<Product> = res.json().unwrap();
    assert_eq!(body.len(), 2);
}

#[actix_web::test]
async fn similar_products_for_unknown_product() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_fetch_product().returning(|_| Ok(None));
    db.expect_fetch_products_with_embeddings().times(0);
    let app = api_app(gate_for(Some(approved_user())), catalog_routes(db));
    let req = TestRequest::get().uri("/api/products/42/similar?limit=3").insert_header(bearer(&approved_user()));
    let res = send(req, app).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn only_admins_add_products() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_insert_product().times(0);
    let app = api_app(gate_for(Some(approved_user())), catalog_routes(db));
    let req = TestRequest::post()
        .uri("/api/products/add")
        .insert_header(bearer(&approved_user()))
        .set_json(json!({"name": "Tulsi mala", "category": "Spiritual", "price": 49900}));
    let res = send(req, app).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn admins_add_products() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_insert_product().withf(|p| p.name == "Tulsi mala").times(1).returning(|_| Ok(product(7, 499)));
    let app = api_app(gate_for(Some(admin())), catalog_routes(db));
    let req = TestRequest::post()
        .uri("/api/products/add")
        .insert_header(bearer(&admin()))
        .set_json(json!({"name": "Tulsi mala", "category": "Spiritual", "price": 49900}));
    let res = send(req, app).await;
    assert_eq!(res.status, StatusCode::CREATED);
}

#[actix_web::test]
async fn deleting_a_missing_product() {
    let _ = env_logger::try_init().ok();
    let mut db = MockBackend::new();
    db.expect_delete_product().times(1).returning(|id| Err(CatalogApiError::ProductNotFound(id)));
    let app = api_app(gate_for(Some(admin())), catalog_routes(db));
    let req =
        TestRequest::delete().uri("/api/products/delete").insert_header(bearer(&admin())).set_json(json!({"id": 99}));
    let res = send(req, app).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body, r#"{"error":"The data was not found. Product 99 does not exist"}"#);
}
