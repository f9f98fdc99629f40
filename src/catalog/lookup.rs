use std::future::Future;

use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, EntityTrait, QuerySelect};

use crate::{
    entity::{Notebooks, Smartphones, notebooks, smartphones},
    error::{AppError, AppResult},
    models::{ProductKind, ProductRef},
};

/// Resolves a [`ProductRef`] to the product's current unit price.
pub trait ProductLookup {
    fn unit_price(&self, product: ProductRef) -> impl Future<Output = AppResult<Decimal>> + Send;
}

/// [`ProductLookup`] backed by the variant tables.
pub struct CatalogLookup<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> CatalogLookup<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }
}

impl<C: ConnectionTrait> ProductLookup for CatalogLookup<'_, C> {
    async fn unit_price(&self, product: ProductRef) -> AppResult<Decimal> {
        let price: Option<Decimal> = match product.kind {
            ProductKind::Notebook => {
                Notebooks::find_by_id(product.id)
                    .select_only()
                    .column(notebooks::Column::Price)
                    .into_tuple()
                    .one(self.conn)
                    .await?
            }
            ProductKind::Smartphone => {
                Smartphones::find_by_id(product.id)
                    .select_only()
                    .column(smartphones::Column::Price)
                    .into_tuple()
                    .one(self.conn)
                    .await?
            }
        };
        price.ok_or(AppError::UnresolvedProduct(product))
    }
}
