use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{OrderStatus, ProductKind},
};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

// Pagination fields are inlined rather than flattened: `serde_urlencoded`
// cannot parse numbers through `#[serde(flatten)]`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<OrderStatus>,
    pub sort_order: Option<SortOrder>,
}

impl OrderListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct LatestQuery {
    /// Comma separated variant names, e.g. `notebook,smartphone`.
    pub kinds: Option<String>,
    /// Variant whose items are listed first.
    pub with_respect_to: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct FormQuery {
    /// Instance being edited, if any.
    pub id: Option<Uuid>,
}

/// Variant name from a path segment such as `/products/{kind}/...`.
pub fn parse_kind(raw: &str) -> AppResult<ProductKind> {
    raw.parse::<ProductKind>().map_err(AppError::BadRequest)
}
