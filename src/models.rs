use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// The two concrete product variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Notebook,
    Smartphone,
}

impl ProductKind {
    pub const ALL: [ProductKind; 2] = [ProductKind::Notebook, ProductKind::Smartphone];

    /// Lowercase model name, used in URLs and persisted line items.
    pub fn model_name(&self) -> &'static str {
        match self {
            ProductKind::Notebook => "notebook",
            ProductKind::Smartphone => "smartphone",
        }
    }

    /// Slug of the only category products of this kind may belong to.
    pub fn category_slug(&self) -> &'static str {
        match self {
            ProductKind::Notebook => "notebooks",
            ProductKind::Smartphone => "smartphones",
        }
    }

    pub fn count_key(&self) -> String {
        format!("{}__count", self.model_name())
    }
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.model_name())
    }
}

impl FromStr for ProductKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "notebook" => Ok(ProductKind::Notebook),
            "smartphone" => Ok(ProductKind::Smartphone),
            other => Err(format!("unknown product kind '{other}'")),
        }
    }
}

/// Reference to exactly one product row of either variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct ProductRef {
    pub kind: ProductKind,
    pub id: Uuid,
}

impl ProductRef {
    pub fn notebook(id: Uuid) -> Self {
        Self {
            kind: ProductKind::Notebook,
            id,
        }
    }

    pub fn smartphone(id: Uuid) -> Self {
        Self {
            kind: ProductKind::Smartphone,
            id,
        }
    }
}

impl fmt::Display for ProductRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    New,
    InProgress,
    IsReady,
    Completed,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::New,
        OrderStatus::InProgress,
        OrderStatus::IsReady,
        OrderStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::IsReady => "is_ready",
            OrderStatus::Completed => "completed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::New => "New order",
            OrderStatus::InProgress => "Order in progress",
            OrderStatus::IsReady => "Order is ready",
            OrderStatus::Completed => "Order completed",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown order status '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    #[default]
    SelfPick,
    Delivery,
}

impl DeliveryType {
    pub const ALL: [DeliveryType; 2] = [DeliveryType::SelfPick, DeliveryType::Delivery];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryType::SelfPick => "self_pick",
            DeliveryType::Delivery => "delivery",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DeliveryType::SelfPick => "Self pick",
            DeliveryType::Delivery => "Delivery to address",
        }
    }
}

impl FromStr for DeliveryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeliveryType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown delivery type '{s}'"))
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notebook {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub image_name: Option<String>,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: Uuid,
    pub diagonal: String,
    pub display_type: String,
    pub processor_freq: String,
    pub ram: String,
    pub video_card: String,
    pub battery_capacity: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Smartphone {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub image_name: Option<String>,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: Uuid,
    pub diagonal: String,
    pub display_type: String,
    pub resolution: String,
    pub battery_capacity: String,
    pub ram: String,
    pub sd: bool,
    pub sd_max_volume: Option<String>,
    pub camera_main: String,
    pub camera_frontal: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Either product variant, as returned by detail lookups.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Product {
    Notebook(Notebook),
    Smartphone(Smartphone),
}

impl Product {
    pub fn kind(&self) -> ProductKind {
        match self {
            Product::Notebook(_) => ProductKind::Notebook,
            Product::Smartphone(_) => ProductKind::Smartphone,
        }
    }

    pub fn reference(&self) -> ProductRef {
        match self {
            Product::Notebook(n) => ProductRef::notebook(n.id),
            Product::Smartphone(s) => ProductRef::smartphone(s.id),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Product::Notebook(n) => &n.title,
            Product::Smartphone(s) => &s.title,
        }
    }
}

/// Compact listing entry shared by both variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductCard {
    pub kind: ProductKind,
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub price: Decimal,
    pub has_image: bool,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    pub id: Uuid,
    pub user_id: Uuid,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartProduct {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub cart_id: Uuid,
    pub product: ProductRef,
    pub quantity: i32,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    pub id: Uuid,
    pub owner_id: Option<Uuid>,
    pub total_products: i32,
    pub total_price: Decimal,
    pub in_order: bool,
    pub for_anonymous_user: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub cart_id: Option<Uuid>,
    pub address: Option<String>,
    pub status: OrderStatus,
    pub delivery_type: DeliveryType,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub order_date: NaiveDate,
}

pub fn category_url(slug: &str) -> String {
    format!("/category/{slug}")
}

pub fn product_url(kind: ProductKind, slug: &str) -> String {
    format!("/products/{}/{slug}", kind.model_name())
}
