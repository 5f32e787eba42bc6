//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Any long, non-cpu-bound operation (database calls, the payment
//! gateway) must be awaited, never blocked on.
//!
//! Which middleware guards a route is decided by the scope it is registered in (see [`crate::server`]):
//! * `/api` routes sit behind the session middleware and the access gate, so handlers can take an [`ActiveUser`].
//! * `/session` routes only need a valid session token, and take the [`JwtClaims`].
//! * `/razorpay` routes sit behind the webhook signature check.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use devrang_engine::{
    catalog_objects::ProductQueryFilter,
    db_types::{NewCustomer, NewProduct, OrderId, Role},
    order_objects::GatewayEvent,
    traits::{CustomerManagement, OrderManagement, PaymentProvider, ProductCatalog, ProfileManagement},
    AuthApi,
    CatalogApi,
    CustomerApi,
    OrderFlowApi,
    SignIn,
};
use log::*;
use razorpay_tools::WebhookEvent;
use serde_json::json;

use crate::{
    auth::{ActiveUser, JwtClaims, TokenIssuer, IDENTITY_TOKEN_HEADER},
    config::ServerOptions,
    data_objects::{
        AuthErrorParams,
        CheckoutParams,
        CustomerUpdateParams,
        EmailParams,
        IdParams,
        JsonResponse,
        OrdersParams,
        ProductUpdateParams,
        SessionInfo,
        SignInResponse,
        SimilarParams,
    },
    errors::{AuthError, ServerError},
    helpers::get_remote_ip,
    integrations::razorpay::gateway_event,
};

const DEFAULT_SIMILAR_LIMIT: usize = 5;

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:path),+ ; $provider:path) => {
        paste::paste! { pub struct [<$name:camel Route>]<A, P>(core::marker::PhantomData<fn() -> (A, P)>);}
        paste::paste! { impl<A, P> [<$name:camel Route>]<A, P> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> (A, P)>)
            }
        }}
        paste::paste! { impl<A, P> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A, P>
        where
            A: $($bounds +)+ 'static,
            P: $provider + 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A, P>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:path),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:path),+ where requires [$($roles:expr),*])  => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Auth  ----------------------------------------------------
route!(auth => Post "/auth" impl ProfileManagement);
/// Route handler for the sign-in endpoint
///
/// Callers present an identity assertion from the identity provider in the `x-identity-token` header. It is an HS256
/// JWT carrying the `email` (and optionally `name` and `picture`) of the person signing in.
///
/// * A first sign-in creates the profile and always succeeds. The profile is unapproved unless the address is on the
///   bootstrap admin list.
/// * An existing, unapproved profile is redirected to `/auth/error?error=NOT_APPROVED`.
/// * Otherwise a session token is issued. It is used as a bearer token on every other call.
pub async fn auth<B: ProfileManagement>(
    req: HttpRequest,
    api: web::Data<AuthApi<B>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received auth request");
    let token = req.headers().get(IDENTITY_TOKEN_HEADER).ok_or(AuthError::MissingIdentityToken)?;
    let token = token.to_str().map_err(|e| {
        debug!("💻️ Could not read identity token. {e}");
        AuthError::InvalidIdentityToken("Token is not in the correct format.".into())
    })?;
    let identity = signer.check_identity_token(token)?;
    let SignIn { profile, first_sign_in } = api.sign_in(identity).await?;
    let token = signer.issue_token(&profile)?;
    debug!("💻️ Issued session token for {} (first sign-in: {first_sign_in})", profile.email);
    Ok(HttpResponse::Ok().json(SignInResponse {
        token,
        email: profile.email,
        name: profile.name,
        role: profile.role,
        approved: profile.approved,
        first_sign_in,
    }))
}

#[get("/auth/error")]
pub async fn auth_error(params: web::Query<AuthErrorParams>) -> impl Responder {
    let code = params.into_inner().error.unwrap_or_else(|| "UNKNOWN".into());
    let message = match code.as_str() {
        "NOT_APPROVED" => "Your account is waiting for approval by an administrator. Please try again later.",
        _ => "Sign-in failed. Please try again.",
    };
    HttpResponse::Ok().json(json!({ "error": code, "message": message }))
}

route!(session_me => Get "/me" impl ProfileManagement);
/// The caller's own profile. Works for unapproved users too, so that a client can tell them why they are stuck.
pub async fn session_me<B: ProfileManagement>(
    claims: JwtClaims,
    api: web::Data<AuthApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET session for {}", claims.email());
    match api.profile(claims.email()).await? {
        Some(profile) => Ok(HttpResponse::Ok().json(SessionInfo::from(profile))),
        None => Ok(HttpResponse::NotFound().json(json!({ "error": "UNKNOWN_USER" }))),
    }
}

//----------------------------------------------   Customers  ----------------------------------------------------
route!(customers => Get "/customers" impl CustomerManagement);
pub async fn customers<B: CustomerManagement>(api: web::Data<CustomerApi<B>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET customers");
    let customers = api.customers().await?;
    Ok(HttpResponse::Ok().json(customers))
}

route!(create_customer => Post "/customers" impl CustomerManagement);
pub async fn create_customer<B: CustomerManagement>(
    user: ActiveUser,
    body: web::Json<NewCustomer>,
    api: web::Data<CustomerApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST customer by {}", user.profile().email);
    let customer = api.create_customer(&user.profile().email, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(customer))
}

route!(update_customer => Put "/customers/update" impl CustomerManagement);
pub async fn update_customer<B: CustomerManagement>(
    body: web::Json<CustomerUpdateParams>,
    api: web::Data<CustomerApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let CustomerUpdateParams { id, update } = body.into_inner();
    let id = id.ok_or_else(|| ServerError::ValidationError("Customer id is required".into()))?;
    debug!("💻️ PUT customer #{id}");
    let customer = api.update_customer(id, update).await?;
    Ok(HttpResponse::Ok().json(customer))
}

route!(delete_customer => Delete "/customers/delete" impl CustomerManagement);
pub async fn delete_customer<B: CustomerManagement>(
    body: web::Json<IdParams>,
    api: web::Data<CustomerApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = body.into_inner().id.ok_or_else(|| ServerError::ValidationError("Customer id is required".into()))?;
    debug!("💻️ DELETE customer #{id}");
    api.delete_customer(id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Customer {id} deleted"))))
}

//----------------------------------------------   Products  ----------------------------------------------------
route!(products => Get "/products" impl ProductCatalog);
pub async fn products<B: ProductCatalog>(
    query: web::Query<ProductQueryFilter>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let query = query.into_inner();
    debug!("💻️ GET products: {query:?}");
    let products = api.products(query).await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(similar_products => Get "/products/{id}/similar" impl ProductCatalog);
pub async fn similar_products<B: ProductCatalog>(
    path: web::Path<i64>,
    query: web::Query<SimilarParams>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let limit = query.into_inner().limit.unwrap_or(DEFAULT_SIMILAR_LIMIT);
    debug!("💻️ GET {limit} products similar to #{id}");
    let similar = api.similar_products(id, limit).await?;
    Ok(HttpResponse::Ok().json(similar))
}

route!(add_product => Post "/products/add" impl ProductCatalog where requires [Role::Admin]);
pub async fn add_product<B: ProductCatalog>(
    body: web::Json<NewProduct>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product = body.into_inner();
    debug!("💻️ POST product {}", product.name);
    let product = api.add_product(product).await?;
    Ok(HttpResponse::Created().json(product))
}

route!(update_product => Put "/products/update" impl ProductCatalog where requires [Role::Admin]);
pub async fn update_product<B: ProductCatalog>(
    body: web::Json<ProductUpdateParams>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let ProductUpdateParams { id, update } = body.into_inner();
    let id = id.ok_or_else(|| ServerError::ValidationError("Product id is required".into()))?;
    debug!("💻️ PUT product #{id}");
    let product = api.update_product(id, update).await?;
    Ok(HttpResponse::Ok().json(product))
}

route!(delete_product => Delete "/products/delete" impl ProductCatalog where requires [Role::Admin]);
pub async fn delete_product<B: ProductCatalog>(
    body: web::Json<IdParams>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = body.into_inner().id.ok_or_else(|| ServerError::ValidationError("Product id is required".into()))?;
    debug!("💻️ DELETE product #{id}");
    api.delete_product(id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Product {id} deleted"))))
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout => Post "/checkout" impl OrderManagement, CustomerManagement, ProductCatalog; PaymentProvider);
/// Route handler for the checkout endpoint
///
/// The body carries the cart lines and the customer the booking is for (`"self"` or a customer id). Cart lines only
/// reference products; names and prices are read from the catalog. Only the first cart line is booked.
///
/// On success the response carries the new order, the payment url, and the (now empty) cart. On failure the client
/// keeps its cart.
pub async fn checkout<B, P>(
    user: ActiveUser,
    body: web::Json<CheckoutParams>,
    catalog: web::Data<CatalogApi<B>>,
    api: web::Data<OrderFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + CustomerManagement + ProductCatalog,
    P: PaymentProvider,
{
    let CheckoutParams { items, customer } = body.into_inner();
    debug!("💻️ POST checkout by {} ({} cart lines)", user.profile().email, items.len());
    let mut cart = catalog.build_cart(&items).await?;
    let placed = api.place_order(user.profile(), &mut cart, customer).await?;
    Ok(HttpResponse::Ok().json(placed))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(my_orders => Get "/orders" impl OrderManagement, CustomerManagement; PaymentProvider);
/// The caller's orders. Admins may look at anyone's orders with `?email=`.
pub async fn my_orders<B, P>(
    user: ActiveUser,
    query: web::Query<OrdersParams>,
    api: web::Data<OrderFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + CustomerManagement,
    P: PaymentProvider,
{
    let profile = user.profile();
    let email = match query.into_inner().email {
        Some(email) if email != profile.email && !profile.is_admin() => {
            return Err(ServerError::InsufficientPermissions("Only admins can view other users' orders".into()));
        },
        Some(email) => email,
        None => profile.email.clone(),
    };
    debug!("💻️ GET orders for {email}");
    let orders = api.orders_for_user(&email).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{order_id}" impl OrderManagement, CustomerManagement; PaymentProvider);
/// A single order. Users only see their own orders; anyone else's is reported as missing.
pub async fn order_by_id<B, P>(
    user: ActiveUser,
    path: web::Path<OrderId>,
    api: web::Data<OrderFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + CustomerManagement,
    P: PaymentProvider,
{
    let order_id = path.into_inner();
    let profile = user.profile();
    debug!("💻️ GET order {order_id} for {}", profile.email);
    let order = api
        .order_by_id(&order_id)
        .await?
        .filter(|o| profile.is_admin() || o.placed_by == profile.email)
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_id} does not exist")))?;
    Ok(HttpResponse::Ok().json(order))
}

route!(dashboard => Get "/dashboard" impl OrderManagement, CustomerManagement; PaymentProvider);
pub async fn dashboard<B, P>(user: ActiveUser, api: web::Data<OrderFlowApi<B, P>>) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + CustomerManagement,
    P: PaymentProvider,
{
    debug!("💻️ GET dashboard for {}", user.profile().email);
    let summary = api.booking_summary(&user.profile().email).await?;
    Ok(HttpResponse::Ok().json(summary))
}

//----------------------------------------------   User approval  ----------------------------------------------------
route!(pending_users => Get "/user/pending" impl ProfileManagement where requires [Role::Admin]);
pub async fn pending_users<B: ProfileManagement>(api: web::Data<AuthApi<B>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET pending users");
    let users = api.pending_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

route!(approve_user => Put "/user/approve" impl ProfileManagement where requires [Role::Admin]);
pub async fn approve_user<B: ProfileManagement>(
    admin: ActiveUser,
    body: web::Json<EmailParams>,
    api: web::Data<AuthApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let email = required_email(body.into_inner())?;
    info!("💻️ {} is approving {email}", admin.profile().email);
    let profile = api.approve(&email).await?;
    Ok(HttpResponse::Ok().json(profile))
}

route!(reject_user => Delete "/user/reject" impl ProfileManagement where requires [Role::Admin]);
pub async fn reject_user<B: ProfileManagement>(
    admin: ActiveUser,
    body: web::Json<EmailParams>,
    api: web::Data<AuthApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let email = required_email(body.into_inner())?;
    info!("💻️ {} is rejecting {email}", admin.profile().email);
    api.reject(&email).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("{email} was rejected"))))
}

fn required_email(params: EmailParams) -> Result<String, ServerError> {
    params
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ServerError::ValidationError("Email is required".into()))
}

//----------------------------------------------   Razorpay  ----------------------------------------------------
route!(razorpay_webhook => Post "/webhook" impl OrderManagement, CustomerManagement; PaymentProvider);
/// Route handler for Razorpay webhooks
///
/// The signature has already been checked by the HMAC middleware. A 2xx tells Razorpay to stop retrying, so it is
/// returned for every event that was understood, including events for orders we do not know about. Only a failure to
/// record the event is reported as a 500, so that Razorpay delivers it again.
pub async fn razorpay_webhook<B, P>(
    req: HttpRequest,
    body: web::Bytes,
    options: web::Data<ServerOptions>,
    api: web::Data<OrderFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + CustomerManagement,
    P: PaymentProvider,
{
    let peer = get_remote_ip(&req, **options).map(|ip| ip.to_string()).unwrap_or_else(|| "unknown".into());
    let event = serde_json::from_slice::<WebhookEvent>(body.as_ref()).map_err(|e| {
        warn!("💳️ Malformed webhook body from {peer}. {e}");
        ServerError::InvalidRequestBody("Malformed webhook body".into())
    })?;
    info!("💳️ Received {} webhook from {peer}", event.event);
    let event = gateway_event(&event).map_err(|e| {
        warn!("💳️ {e}");
        ServerError::InvalidRequestBody(e.to_string())
    })?;
    if let GatewayEvent::Unrecognised(name) = &event {
        debug!("💳️ Ignoring {name} webhook");
    }
    match api.reconcile(event).await {
        Ok(outcome) => {
            trace!("💳️ Webhook reconciled: {outcome:?}");
            Ok(HttpResponse::Ok().json(json!({ "received": true })))
        },
        Err(e) => {
            error!("💳️ Webhook processing failed. {e}");
            Err(ServerError::WebhookProcessingFailed)
        },
    }
}
