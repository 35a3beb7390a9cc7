//! Row types for accounts, catalog, orders, and payments.

use std::fmt;
use std::str::FromStr;

use fooddel_core::Error;
use serde::{Deserialize, Serialize};

use crate::status::OrderStatus;

// ---------------------------------------------------------------
// Tags
// ---------------------------------------------------------------

/// Account role; decides which profile a user owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Restaurant,
    DeliveryAgent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Restaurant => "restaurant",
            Self::DeliveryAgent => "delivery_agent",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "restaurant" => Ok(Self::Restaurant),
            "delivery_agent" => Ok(Self::DeliveryAgent),
            other => Err(Error::Validation(format!("Unknown role: {}", other))),
        }
    }
}

text_column!(Role);

/// How the customer pays at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Upi,
    CreditCard,
    DebitCard,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Upi => "upi",
            Self::CreditCard => "credit_card",
            Self::DebitCard => "debit_card",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(Self::Cash),
            "upi" => Ok(Self::Upi),
            "credit_card" => Ok(Self::CreditCard),
            "debit_card" => Ok(Self::DebitCard),
            other => Err(Error::Validation(format!("Unknown payment method: {}", other))),
        }
    }
}

text_column!(PaymentMethod);

// ---------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------

/// A user row, without credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone_no: String,
    pub address: String,
    pub role: Role,
    pub created_at: String,
}

/// Input for registering a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone_no: String,
    pub address: String,
    pub role: Role,
    pub password_hash: String,
}

/// Result of registration: the user plus any role profile created with it.
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredUser {
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant: Option<Restaurant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_agent: Option<DeliveryAgent>,
}

/// Stored credentials for login checks.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// A live bearer-token session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub email: String,
    pub role: Role,
    /// Unix seconds.
    pub expires_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: i64,
    pub name: Option<String>,
    pub phone_no: Option<String>,
    pub address: Option<String>,
    pub preferences: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub phone_no: Option<String>,
    pub address: Option<String>,
    pub preferences: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryAgent {
    pub agent_id: i64,
    pub name: Option<String>,
    pub phone_no: Option<String>,
    pub vehicle: Option<String>,
    pub is_available: bool,
    pub user_id: Option<i64>,
}

// ---------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    pub restaurant_id: i64,
    pub name: Option<String>,
    pub location: Option<String>,
    pub cuisine: Option<String>,
    pub phone_no: Option<String>,
    pub rating: Option<f64>,
    pub pricing: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewRestaurant {
    pub name: String,
    pub location: String,
    pub cuisine: String,
    pub phone_no: String,
    pub rating: f64,
    pub pricing: String,
    pub user_id: Option<i64>,
}

impl NewRestaurant {
    /// Default restaurant opened for a freshly registered owner.
    ///
    /// Location is the first comma-separated part of the owner's address.
    pub fn for_owner(user_id: i64, owner_name: &str, address: &str) -> Self {
        let location = address
            .split(',')
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("Mumbai");
        Self {
            name: format!("{}'s Restaurant", owner_name),
            location: location.to_string(),
            cuisine: "Multi-Cuisine".to_string(),
            phone_no: "0000000000".to_string(),
            rating: 4.0,
            pricing: "Moderate".to_string(),
            user_id: Some(user_id),
        }
    }
}

/// A dish on a restaurant's menu. `items` is the dish name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub menu_id: i64,
    pub restaurant_id: i64,
    pub items: String,
    pub price: f64,
    pub types: Option<String>,
    pub cuisine: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMenuItem {
    pub restaurant_id: i64,
    pub items: String,
    pub price: f64,
    pub types: String,
    pub cuisine: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuItemUpdate {
    pub items: Option<String>,
    pub price: Option<f64>,
    pub types: Option<String>,
    pub cuisine: Option<String>,
}

// ---------------------------------------------------------------
// Orders
// ---------------------------------------------------------------

/// An order row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: i64,
    pub customer_id: i64,
    pub restaurant_id: i64,
    pub delivery_agent_id: Option<i64>,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM:SS`
    pub time: String,
    pub total_amount: f64,
    pub delivery_address: String,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub delivery_time: Option<String>,
}

/// An order joined with the display names listings need.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    #[serde(flatten)]
    pub order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_agent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_agent_phone: Option<String>,
}

/// Full order view: summary plus line items.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub summary: OrderSummary,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub menu_id: Option<i64>,
    pub item_name: String,
    pub price: f64,
    pub quantity: i64,
}

/// Input for checkout. `placed_at` is local server time.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: i64,
    pub restaurant_id: i64,
    pub total_amount: f64,
    pub delivery_address: String,
    pub payment_method: PaymentMethod,
    pub placed_at: chrono::NaiveDateTime,
}

/// A cart line as the client sends it.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderItem {
    pub menu_id: Option<i64>,
    /// Dish name as listed on the menu.
    pub items: Option<String>,
    pub item_name: Option<String>,
    pub price: f64,
    pub quantity: Option<i64>,
}

impl NewOrderItem {
    pub fn name(&self) -> &str {
        self.items
            .as_deref()
            .or(self.item_name.as_deref())
            .filter(|s| !s.is_empty())
            .unwrap_or("Unknown Item")
    }

    pub fn quantity(&self) -> i64 {
        self.quantity.filter(|q| *q > 0).unwrap_or(1)
    }
}

// ---------------------------------------------------------------
// Payments
// ---------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub payment_id: i64,
    pub mode: String,
    pub status: String,
    pub discount: f64,
    pub tip: f64,
    pub customer_id: Option<i64>,
    pub restaurant_id: Option<i64>,
    pub order_id: Option<i64>,
    pub amount: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPayment {
    pub mode: String,
    pub status: String,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub tip: f64,
    pub customer_id: Option<i64>,
    pub restaurant_id: Option<i64>,
    pub order_id: Option<i64>,
    pub amount: f64,
}
