use chrono::{TimeZone, Utc};
use cucumber::{then, when};
use devrang_engine::{
    db_types::{OrderId, OrderStatusType, Paise},
    order_objects::{CustomerSelection, GatewayEvent, OrderQueryFilter},
    traits::{CapturedPayment, OrderManagement, ProductCatalog},
    OrderFlowError,
};

use crate::cucumber::MarketplaceWorld;

#[when(expr = "I add {int} of {string} to the cart")]
async fn add_to_cart(world: &mut MarketplaceWorld, quantity: u32, name: String) {
    let product = world
        .db()
        .fetch_product_by_name(&name)
        .await
        .expect("Error fetching product")
        .unwrap_or_else(|| panic!("No product called {name}"));
    world.cart.add(product, quantity).expect("Error adding to cart");
}

#[when("I check out for myself")]
async fn check_out_for_self(world: &mut MarketplaceWorld) {
    let user = world.user().clone();
    let mut cart = world.cart.clone();
    let result = world.api().place_order(&user, &mut cart, Some(CustomerSelection::SelfBooking)).await;
    world.cart = cart;
    match result {
        Ok(placed) => world.last_order = Some(placed),
        Err(e) => world.last_error = Some(e),
    }
}

#[when(expr = "the gateway reports payment {string} captured for the last order")]
async fn payment_captured(world: &mut MarketplaceWorld, payment_id: String) {
    let payment = CapturedPayment {
        order_id: Some(OrderId::from(world.last_order_id())),
        payment_link_id: None,
        payment_id,
        method: Some("card".into()),
        captured_at: Utc.timestamp_opt(1_728_980_000, 0).unwrap(),
    };
    world.api().reconcile(GatewayEvent::PaymentCaptured(payment)).await.expect("Error reconciling capture");
}

#[when("the payment link for the last order is paid")]
async fn link_paid(world: &mut MarketplaceWorld) {
    let order_id = OrderId::from(world.last_order_id());
    world.api().reconcile(GatewayEvent::PaymentLinkPaid { order_id }).await.expect("Error reconciling link paid");
}

#[when("the payment link for the last order expires")]
async fn link_expired(world: &mut MarketplaceWorld) {
    let order_id = OrderId::from(world.last_order_id());
    world.api().reconcile(GatewayEvent::PaymentLinkExpired { order_id }).await.expect("Error reconciling expiry");
}

#[then(expr = "an order exists with status {word} for {int} rupees")]
async fn order_exists(world: &mut MarketplaceWorld, status: String, rupees: i64) {
    let status = status.parse::<OrderStatusType>().expect("Not a valid order status");
    let orders = world.db().search_orders(OrderQueryFilter::default()).await.expect("Error fetching orders");
    assert_eq!(orders.len(), 1, "Expected exactly one order");
    assert_eq!(orders[0].status, status);
    assert_eq!(orders[0].amount, Paise::from_rupees(rupees));
}

#[then("there are no orders")]
async fn no_orders(world: &mut MarketplaceWorld) {
    let orders = world.db().search_orders(OrderQueryFilter::default()).await.expect("Error fetching orders");
    assert!(orders.is_empty(), "Expected no orders, but found {}", orders.len());
}

#[then("the cart is empty")]
async fn cart_is_empty(world: &mut MarketplaceWorld) {
    assert!(world.cart.is_empty(), "The cart still has {} items", world.cart.len());
}

#[then(expr = "the cart has {int} item(s)")]
async fn cart_has_items(world: &mut MarketplaceWorld, count: usize) {
    assert_eq!(world.cart.len(), count);
}

#[then("the confirmation shows a payment link")]
async fn confirmation_link(world: &mut MarketplaceWorld) {
    let placed = world.last_order.as_ref().expect("No order has been placed");
    assert!(placed.payment_url.starts_with("https://rzp.io/i/"), "Unexpected link {}", placed.payment_url);
}

#[then("checkout fails with an upstream error")]
async fn upstream_error(world: &mut MarketplaceWorld) {
    assert!(matches!(world.last_error, Some(OrderFlowError::UpstreamError(_))), "Got {:?}", world.last_error);
    assert_eq!(world.system().gateway.calls(), 1);
}

#[then(expr = "the last order has status {word}")]
async fn last_order_status(world: &mut MarketplaceWorld, status: String) {
    let status = status.parse::<OrderStatusType>().expect("Not a valid order status");
    let order_id = OrderId::from(world.last_order_id());
    let order = world.db().fetch_order_by_order_id(&order_id).await.expect("Error fetching order").expect("No order");
    assert_eq!(order.status, status);
}

#[then(expr = "the last order has status {word} with payment id {string}")]
async fn last_order_paid_with(world: &mut MarketplaceWorld, status: String, payment_id: String) {
    let status = status.parse::<OrderStatusType>().expect("Not a valid order status");
    let order_id = OrderId::from(world.last_order_id());
    let order = world.db().fetch_order_by_order_id(&order_id).await.expect("Error fetching order").expect("No order");
    assert_eq!(order.status, status);
    assert_eq!(order.payment_id.as_deref(), Some(payment_id.as_str()));
}
