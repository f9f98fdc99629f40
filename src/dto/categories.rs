use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{catalog::sidebar::SidebarCategory, models::Category};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<Category>)]
    pub items: Vec<Category>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct Sidebar {
    #[schema(value_type = Vec<SidebarCategory>)]
    pub items: Vec<SidebarCategory>,
}
