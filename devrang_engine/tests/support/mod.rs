#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use chrono::{TimeZone, Utc};
use devrang_engine::{
    db_types::{NewProduct, NewUserProfile, OrderId, Paise, Product, Role, UserProfile},
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    traits::{
        CapturedPayment,
        CheckoutRequest,
        GatewayOrder,
        PaymentProvider,
        PaymentProviderError,
        ProductCatalog,
        ProfileManagement,
    },
    SqliteDatabase,
};

pub async fn new_database() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database")
}

/// A payment gateway double. Issues sequential payment link ids, or fails every request when told to.
#[derive(Debug, Clone, Default)]
pub struct FakeGateway {
    calls: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
    requests: Arc<std::sync::Mutex<Vec<CheckoutRequest>>>,
}

impl FakeGateway {
    pub fn failing() -> Self {
        let gateway = Self::default();
        gateway.set_failing(true);
        gateway
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CheckoutRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl PaymentProvider for FakeGateway {
    async fn create_payment_request(&self, request: CheckoutRequest) -> Result<GatewayOrder, PaymentProviderError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(request);
        if self.fail.load(Ordering::SeqCst) {
            return Err(PaymentProviderError::Rejected { status: 502, message: "Bad gateway".into() });
        }
        let id = format!("plink_test{n:04}");
        Ok(GatewayOrder {
            order_id: OrderId::from(id.as_str()),
            payment_link_id: Some(id),
            payment_url: format!("https://rzp.io/i/test{n:04}"),
        })
    }
}

pub async fn add_product(db: &SqliteDatabase, name: &str, rupees: i64) -> Product {
    let product = NewProduct::new(name, "Puja Essentials", Paise::from_rupees(rupees)).with_brand("Devrang");
    db.insert_product(product).await.expect("Error adding product")
}

pub async fn approved_user(db: &SqliteDatabase, email: &str, name: &str) -> UserProfile {
    let profile =
        NewUserProfile { email: email.into(), name: name.into(), image: None, role: Role::User, approved: true };
    db.create_profile(profile).await.expect("Error creating profile")
}

pub fn captured(order_id: &str, payment_id: &str) -> CapturedPayment {
    CapturedPayment {
        order_id: Some(OrderId::from(order_id)),
        payment_link_id: None,
        payment_id: payment_id.into(),
        method: Some("upi".into()),
        captured_at: Utc.timestamp_opt(1_728_980_000, 0).unwrap(),
    }
}
