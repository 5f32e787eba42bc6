use cucumber::World;
use devrang_engine::{
    cart::Cart,
    db_types::UserProfile,
    events::EventProducers,
    order_objects::PlacedOrder,
    test_utils::prepare_env::{create_database, random_db_path, run_migrations},
    OrderFlowApi,
    OrderFlowError,
    SqliteDatabase,
};
use log::*;

use crate::support::FakeGateway;

#[derive(Default, Debug, World)]
pub struct MarketplaceWorld {
    pub system: Option<MarketplaceSystem>,
    pub user: Option<UserProfile>,
    pub cart: Cart,
    pub last_order: Option<PlacedOrder>,
    pub last_error: Option<OrderFlowError>,
}

#[derive(Debug)]
pub struct MarketplaceSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub gateway: FakeGateway,
    pub api: OrderFlowApi<SqliteDatabase, FakeGateway>,
}

impl MarketplaceWorld {
    pub fn system(&self) -> &MarketplaceSystem {
        self.system.as_ref().expect("System not initialised")
    }

    pub fn api(&self) -> &OrderFlowApi<SqliteDatabase, FakeGateway> {
        &self.system().api
    }

    pub fn db(&self) -> &SqliteDatabase {
        &self.system().db
    }

    pub fn user(&self) -> &UserProfile {
        self.user.as_ref().expect("No user has signed in")
    }

    pub fn last_order_id(&self) -> String {
        let placed = self.last_order.as_ref().expect("No order has been placed");
        placed.order.order_id.as_str().to_string()
    }
}

impl MarketplaceSystem {
    pub async fn new() -> Self {
        let db_path = random_db_path();
        create_database(&db_path).await;
        run_migrations(&db_path).await;
        let db = SqliteDatabase::new_with_url(&db_path, 1).await.expect("Error creating connection to database");
        debug!("🚀️ Created database: {db_path}");
        let gateway = FakeGateway::default();
        let api = OrderFlowApi::new(db.clone(), gateway.clone(), EventProducers::default());
        Self { db_path, db, gateway, api }
    }
}
