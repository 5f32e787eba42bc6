use std::fmt::Display;

use devrang_engine::{
    cart::CartLine,
    db_types::{CustomerUpdate, ProductUpdate, Role, UserProfile},
    order_objects::CustomerSelection,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }
}

/// Returned by `POST /auth`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInResponse {
    pub token: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub approved: bool,
    pub first_sign_in: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub email: String,
    pub role: Role,
    pub approved: bool,
}

impl From<UserProfile> for SessionInfo {
    fn from(p: UserProfile) -> Self {
        Self { email: p.email, role: p.role, approved: p.approved }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthErrorParams {
    pub error: Option<String>,
}

/// `{id}` in a request body. The id is optional so that a missing id can be reported as a 400 rather than a parse
/// failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdParams {
    pub id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailParams {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerUpdateParams {
    pub id: Option<i64>,
    #[serde(flatten)]
    pub update: CustomerUpdate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdateParams {
    pub id: Option<i64>,
    #[serde(flatten)]
    pub update: ProductUpdate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimilarParams {
    pub limit: Option<usize>,
}

/// Body of `POST /api/checkout`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutParams {
    #[serde(default)]
    pub items: Vec<CartLine>,
    #[serde(default)]
    pub customer: Option<CustomerSelection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrdersParams {
    pub email: Option<String>,
}
