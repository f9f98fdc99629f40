use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, EntityTrait, QueryOrder, QuerySelect, prelude::DateTimeWithTimeZone};
use uuid::Uuid;

use crate::{
    entity::{Notebooks, Smartphones, notebooks, smartphones},
    error::{AppError, AppResult},
    models::{ProductCard, ProductKind, product_url},
};

pub const LATEST_PER_KIND: u64 = 5;

type CardRow = (Uuid, String, String, Decimal, Option<String>, DateTimeWithTimeZone);

/// Parse a comma separated list of variant names, dropping duplicates but
/// keeping the first-seen order.
pub fn parse_kinds(raw: &str) -> AppResult<Vec<ProductKind>> {
    let mut kinds = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let kind = name.parse::<ProductKind>().map_err(AppError::BadRequest)?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}

/// Concatenate per-variant pulls in request order; when `preferred` is one of
/// the pulled variants its items move to the front, all other relative order
/// kept.
pub fn arrange(
    groups: Vec<(ProductKind, Vec<ProductCard>)>,
    preferred: Option<ProductKind>,
) -> Vec<ProductCard> {
    let requested: Vec<ProductKind> = groups.iter().map(|(kind, _)| *kind).collect();
    let items: Vec<ProductCard> = groups.into_iter().flat_map(|(_, cards)| cards).collect();

    match preferred.filter(|kind| requested.contains(kind)) {
        Some(kind) => {
            let (mut first, rest): (Vec<_>, Vec<_>) =
                items.into_iter().partition(|card| card.kind == kind);
            first.extend(rest);
            first
        }
        None => items,
    }
}

pub async fn latest_products<C: ConnectionTrait>(
    conn: &C,
    kinds: &[ProductKind],
    preferred: Option<ProductKind>,
) -> AppResult<Vec<ProductCard>> {
    let mut groups = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        let rows: Vec<CardRow> = match kind {
            ProductKind::Notebook => {
                Notebooks::find()
                    .select_only()
                    .columns([
                        notebooks::Column::Id,
                        notebooks::Column::Title,
                        notebooks::Column::Slug,
                        notebooks::Column::Price,
                        notebooks::Column::ImageName,
                        notebooks::Column::CreatedAt,
                    ])
                    .order_by_desc(notebooks::Column::CreatedAt)
                    .order_by_desc(notebooks::Column::Id)
                    .limit(LATEST_PER_KIND)
                    .into_tuple()
                    .all(conn)
                    .await?
            }
            ProductKind::Smartphone => {
                Smartphones::find()
                    .select_only()
                    .columns([
                        smartphones::Column::Id,
                        smartphones::Column::Title,
                        smartphones::Column::Slug,
                        smartphones::Column::Price,
                        smartphones::Column::ImageName,
                        smartphones::Column::CreatedAt,
                    ])
                    .order_by_desc(smartphones::Column::CreatedAt)
                    .order_by_desc(smartphones::Column::Id)
                    .limit(LATEST_PER_KIND)
                    .into_tuple()
                    .all(conn)
                    .await?
            }
        };
        let cards = rows
            .into_iter()
            .map(|row| card_from_row(kind, row))
            .collect();
        groups.push((kind, cards));
    }

    Ok(arrange(groups, preferred))
}

fn card_from_row(kind: ProductKind, row: CardRow) -> ProductCard {
    let (id, title, slug, price, image_name, created_at) = row;
    ProductCard {
        kind,
        id,
        url: product_url(kind, &slug),
        title,
        slug,
        price,
        has_image: image_name.is_some(),
        created_at: created_at.with_timezone(&Utc),
    }
}
