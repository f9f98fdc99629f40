use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Cart, CartProduct, ProductRef};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product: ProductRef,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub cart: Cart,
    pub items: Vec<CartProduct>,
}

fn default_quantity() -> i32 {
    1
}
