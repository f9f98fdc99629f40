use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Customer;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCustomerRequest {
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerList {
    pub items: Vec<Customer>,
}
