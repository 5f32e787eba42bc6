use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use devrang_engine::{
    events::EventProducers,
    AuthApi,
    CatalogApi,
    CustomerApi,
    OrderFlowApi,
    SqliteDatabase,
};
use log::*;
use razorpay_tools::{RazorpayApi, RAZORPAY_SIGNATURE_HEADER};

use crate::{
    auth::TokenIssuer,
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    integrations::razorpay::{create_logging_event_handlers, RazorpayProvider},
    middleware::{ApprovalGateFactory, HmacMiddlewareFactory, JwtMiddlewareFactory},
    routes::{
        auth_error,
        health,
        AddProductRoute,
        ApproveUserRoute,
        AuthRoute,
        CheckoutRoute,
        CreateCustomerRoute,
        CustomersRoute,
        DashboardRoute,
        DeleteCustomerRoute,
        DeleteProductRoute,
        MyOrdersRoute,
        OrderByIdRoute,
        PendingUsersRoute,
        ProductsRoute,
        RazorpayWebhookRoute,
        RejectUserRoute,
        SessionMeRoute,
        SimilarProductsRoute,
        UpdateCustomerRoute,
        UpdateProductRoute,
    },
};

const DB_MAX_CONNECTIONS: u32 = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, DB_MAX_CONNECTIONS)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(format!("Migrations failed. {e}")))?;
    info!("🚀️ Database ready at {}", db.url());
    let razorpay = RazorpayApi::new(config.razorpay.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let provider = RazorpayProvider::new(razorpay);
    let handlers = create_logging_event_handlers();
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, provider, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    provider: RazorpayProvider,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let options = ServerOptions::from_config(&config);
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), provider.clone(), producers.clone());
        let auth_api = AuthApi::new(db.clone()).with_bootstrap_admins(&config.auth.admin_emails);
        let customer_api = CustomerApi::new(db.clone());
        let catalog_api = CatalogApi::new(db.clone());
        let jwt_signer = TokenIssuer::new(&config.auth);
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("drg::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(customer_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(jwt_signer.clone()))
            .app_data(web::Data::new(options));
        // Routes that only need a valid session token
        let session_scope = web::scope("/session")
            .wrap(JwtMiddlewareFactory::new(jwt_signer.clone()))
            .service(SessionMeRoute::<SqliteDatabase>::new());
        // Routes that need an approved profile. Middleware runs in reverse order of registration, so the session
        // token is checked before the access gate runs.
        let api_scope = web::scope("/api")
            .wrap(ApprovalGateFactory::<SqliteDatabase>::new())
            .wrap(JwtMiddlewareFactory::new(jwt_signer))
            .service(CustomersRoute::<SqliteDatabase>::new())
            .service(CreateCustomerRoute::<SqliteDatabase>::new())
            .service(UpdateCustomerRoute::<SqliteDatabase>::new())
            .service(DeleteCustomerRoute::<SqliteDatabase>::new())
            .service(ProductsRoute::<SqliteDatabase>::new())
            .service(SimilarProductsRoute::<SqliteDatabase>::new())
            .service(AddProductRoute::<SqliteDatabase>::new())
            .service(UpdateProductRoute::<SqliteDatabase>::new())
            .service(DeleteProductRoute::<SqliteDatabase>::new())
            .service(CheckoutRoute::<SqliteDatabase, RazorpayProvider>::new())
            .service(MyOrdersRoute::<SqliteDatabase, RazorpayProvider>::new())
            .service(OrderByIdRoute::<SqliteDatabase, RazorpayProvider>::new())
            .service(DashboardRoute::<SqliteDatabase, RazorpayProvider>::new())
            .service(PendingUsersRoute::<SqliteDatabase>::new())
            .service(ApproveUserRoute::<SqliteDatabase>::new())
            .service(RejectUserRoute::<SqliteDatabase>::new());
        let razorpay_scope = web::scope("/razorpay")
            .wrap(HmacMiddlewareFactory::new(RAZORPAY_SIGNATURE_HEADER, config.razorpay.webhook_secret.clone()))
            .service(RazorpayWebhookRoute::<SqliteDatabase, RazorpayProvider>::new());
        app.service(health)
            .service(auth_error)
            .service(AuthRoute::<SqliteDatabase>::new())
            .service(session_scope)
            .service(api_scope)
            .service(razorpay_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
