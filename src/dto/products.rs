use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    imaging::ImageUpload,
    models::{Category, Product, ProductCard, ProductKind},
    specs::SpecRow,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NotebookPayload {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: Uuid,
    pub diagonal: String,
    pub display_type: String,
    pub processor_freq: String,
    pub ram: String,
    pub video_card: String,
    pub battery_capacity: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SmartphonePayload {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: Uuid,
    pub diagonal: String,
    pub display_type: String,
    pub resolution: String,
    pub battery_capacity: String,
    pub ram: String,
    #[serde(default = "default_sd")]
    pub sd: bool,
    pub sd_max_volume: Option<String>,
    pub camera_main: String,
    pub camera_frontal: String,
}

#[derive(Debug, Clone)]
pub enum ProductPayload {
    Notebook(NotebookPayload),
    Smartphone(SmartphonePayload),
}

impl ProductPayload {
    /// Decode the JSON `data` part of an admin upload for `kind`.
    pub fn from_json(kind: ProductKind, raw: &[u8]) -> serde_json::Result<Self> {
        Ok(match kind {
            ProductKind::Notebook => ProductPayload::Notebook(serde_json::from_slice(raw)?),
            ProductKind::Smartphone => ProductPayload::Smartphone(serde_json::from_slice(raw)?),
        })
    }

    pub fn kind(&self) -> ProductKind {
        match self {
            ProductPayload::Notebook(_) => ProductKind::Notebook,
            ProductPayload::Smartphone(_) => ProductKind::Smartphone,
        }
    }
}

/// Admin product form: field values plus an optional new image.
#[derive(Debug, Clone)]
pub struct ProductForm {
    pub payload: ProductPayload,
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    pub display_name: String,
    #[schema(value_type = Object)]
    pub product: Product,
    pub specification: Vec<SpecRow>,
    pub specification_html: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductCardList {
    #[schema(value_type = Vec<ProductCard>)]
    pub items: Vec<ProductCard>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FormField {
    pub name: String,
    pub readonly: bool,
    pub help_text: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductFormSchema {
    pub kind: ProductKind,
    pub fields: Vec<FormField>,
    pub category_choices: Vec<Category>,
}

fn default_sd() -> bool {
    true
}
