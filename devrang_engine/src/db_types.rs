use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
pub use drg_common::Paise;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, Type};
use thiserror::Error;

/// Stand-ins for contact fields that a customer record does not have. The gateway insists on all three.
pub const PLACEHOLDER_EMAIL: &str = "no-email@devrang.invalid";
pub const PLACEHOLDER_PHONE: &str = "0000000000";
pub const PLACEHOLDER_ADDRESS: &str = "Not provided";

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(String);

//--------------------------------------        Customer       ---------------------------------------------------------
/// A client of a marketplace user. Anyone who is signed in and approved can manage the customer list.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub shipping_address: String,
    pub dob: String,
    /// Lineage / affiliation tag
    pub gotra: String,
    /// 0 - 5
    pub rating: i64,
    pub comments: String,
    /// Email of the user who created the record
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub shipping_address: Option<String>,
    pub dob: Option<String>,
    pub gotra: Option<String>,
    pub rating: Option<i64>,
    pub comments: Option<String>,
    #[serde(skip)]
    pub created_by: String,
}

impl NewCustomer {
    pub fn new<S: Into<String>>(name: S, phone: S) -> Self {
        Self { name: Some(name.into()), phone: Some(phone.into()), ..Default::default() }
    }

    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_shipping_address<S: Into<String>>(mut self, address: S) -> Self {
        self.shipping_address = Some(address.into());
        self
    }

    pub fn created_by<S: Into<String>>(mut self, email: S) -> Self {
        self.created_by = email.into();
        self
    }
}

/// A partial update to a customer record. Only the fields that are `Some` are changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub shipping_address: Option<String>,
    pub dob: Option<String>,
    pub gotra: Option<String>,
    pub rating: Option<i64>,
    pub comments: Option<String>,
}

impl CustomerUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() &&
            self.phone.is_none() &&
            self.email.is_none() &&
            self.shipping_address.is_none() &&
            self.dob.is_none() &&
            self.gotra.is_none() &&
            self.rating.is_none() &&
            self.comments.is_none()
    }
}

//--------------------------------------       Recipient       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum Recipient {
    Him,
    Her,
    Them,
    #[default]
    Anyone,
}

impl Display for Recipient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recipient::Him => write!(f, "Him"),
            Recipient::Her => write!(f, "Her"),
            Recipient::Them => write!(f, "Them"),
            Recipient::Anyone => write!(f, "Anyone"),
        }
    }
}

impl FromStr for Recipient {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "him" => Ok(Self::Him),
            "her" => Ok(Self::Her),
            "them" => Ok(Self::Them),
            "anyone" => Ok(Self::Anyone),
            s => Err(ConversionError(format!("Invalid recipient: {s}"))),
        }
    }
}

//--------------------------------------        Product        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub brand: String,
    pub price: Paise,
    pub story: String,
    pub image_url: String,
    pub affiliate_link: String,
    pub tags: Json<Vec<String>>,
    pub occasion: Json<Vec<String>>,
    pub recipient: Recipient,
    /// Vector embedding of the product description, used for similarity searches.
    #[serde(skip_serializing)]
    pub embedding: Option<Json<Vec<f32>>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id,
            name: self.name.clone(),
            category: self.category.clone(),
            brand: self.brand.clone(),
            price: self.price,
            image_url: self.image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub brand: String,
    pub price: Paise,
    #[serde(default)]
    pub story: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub affiliate_link: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub occasion: Vec<String>,
    #[serde(default)]
    pub recipient: Recipient,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

impl NewProduct {
    pub fn new<S: Into<String>>(name: S, category: S, price: Paise) -> Self {
        Self { name: name.into(), category: category.into(), price, ..Default::default() }
    }

    pub fn with_brand<S: Into<String>>(mut self, brand: S) -> Self {
        self.brand = brand.into();
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price: Option<Paise>,
    pub story: Option<String>,
    pub image_url: Option<String>,
    pub affiliate_link: Option<String>,
    pub tags: Option<Vec<String>>,
    pub occasion: Option<Vec<String>>,
    pub recipient: Option<Recipient>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() &&
            self.description.is_none() &&
            self.category.is_none() &&
            self.brand.is_none() &&
            self.price.is_none() &&
            self.story.is_none() &&
            self.image_url.is_none() &&
            self.affiliate_link.is_none() &&
            self.tags.is_none() &&
            self.occasion.is_none() &&
            self.recipient.is_none()
    }
}

/// The product details frozen into an order at checkout time. Later catalog edits do not touch existing orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub brand: String,
    pub price: Paise,
    pub image_url: String,
}

//--------------------------------------    ContactDetails     ---------------------------------------------------------
/// Normalised contact snapshot for the person paying for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl ContactDetails {
    /// Builds a contact snapshot, replacing blank fields with the placeholder values.
    pub fn normalised(name: &str, email: &str, phone: &str, address: &str) -> Self {
        fn or_placeholder(value: &str, placeholder: &str) -> String {
            let value = value.trim();
            if value.is_empty() {
                placeholder.to_string()
            } else {
                value.to_string()
            }
        }
        Self {
            name: name.trim().to_string(),
            email: or_placeholder(email, PLACEHOLDER_EMAIL),
            phone: or_placeholder(phone, PLACEHOLDER_PHONE),
            address: or_placeholder(address, PLACEHOLDER_ADDRESS),
        }
    }

    pub fn for_customer(customer: &Customer) -> Self {
        Self::normalised(&customer.name, &customer.email, &customer.phone, &customer.shipping_address)
    }

    pub fn for_user(profile: &UserProfile) -> Self {
        Self::normalised(&profile.name, &profile.email, "", "")
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// A payment request has been issued, and no payment has been received yet.
    Created,
    /// The gateway has reported a successful payment.
    Paid,
    /// The order has been fulfilled.
    Delivered,
    /// The payment request lapsed without being paid.
    Expired,
}

impl OrderStatusType {
    /// Status only ever moves forward. `Paid -> Paid` is allowed so that later events can fill in payment details.
    pub fn can_transition_to(&self, next: OrderStatusType) -> bool {
        use OrderStatusType::*;
        matches!(
            (self, next),
            (Created, Created) |
                (Created, Paid) |
                (Created, Expired) |
                (Paid, Paid) |
                (Paid, Delivered) |
                (Delivered, Delivered) |
                (Expired, Expired)
        )
    }

    /// Statuses that count towards revenue
    pub fn is_settled(&self) -> bool {
        matches!(self, OrderStatusType::Paid | OrderStatusType::Delivered)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Created => write!(f, "created"),
            OrderStatusType::Paid => write!(f, "paid"),
            OrderStatusType::Delivered => write!(f, "delivered"),
            OrderStatusType::Expired => write!(f, "expired"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "created" => Ok(Self::Created),
            "paid" => Ok(Self::Paid),
            "delivered" => Ok(Self::Delivered),
            "expired" => Ok(Self::Expired),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------        OrderId        ---------------------------------------------------------
/// The identifier the payment gateway assigned to the payment request for an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------        Order          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub payment_link_id: Option<String>,
    pub payment_url: String,
    /// Email of the marketplace user who placed the order
    pub placed_by: String,
    /// `None` for self-bookings
    pub customer_id: Option<i64>,
    pub product: Json<ProductSnapshot>,
    pub contact: Json<ContactDetails>,
    pub amount: Paise,
    pub currency: String,
    pub status: OrderStatusType,
    pub payment_id: Option<String>,
    pub payment_method: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_self_booking(&self) -> bool {
        self.customer_id.is_none()
    }
}

//--------------------------------------        NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// The id assigned by the payment gateway
    pub order_id: OrderId,
    pub payment_link_id: Option<String>,
    pub payment_url: String,
    pub placed_by: String,
    pub customer_id: Option<i64>,
    pub product: ProductSnapshot,
    pub contact: ContactDetails,
    pub amount: Paise,
    pub currency: String,
}

//--------------------------------------         Role          ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

//--------------------------------------      UserProfile      ---------------------------------------------------------
/// A marketplace user, keyed by the email address the identity provider vouched for.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub name: String,
    pub image: Option<String>,
    pub role: Role,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn access_state(&self) -> AccessState {
        match (self.role, self.approved) {
            (Role::Admin, _) => AccessState::Admin,
            (Role::User, true) => AccessState::Approved,
            (Role::User, false) => AccessState::Unapproved,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserProfile {
    pub email: String,
    pub name: String,
    pub image: Option<String>,
    pub role: Role,
    pub approved: bool,
}

//--------------------------------------      AccessState      ---------------------------------------------------------
/// Where a requester stands with respect to the access gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessState {
    /// No identity at all
    Anonymous,
    /// Identity established, profile lookup / creation in progress
    Authenticating,
    Unapproved,
    Approved,
    Admin,
}

impl AccessState {
    pub fn can_use_marketplace(&self) -> bool {
        matches!(self, AccessState::Approved | AccessState::Admin)
    }
}
