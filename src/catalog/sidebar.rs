use std::collections::HashMap;

use sea_orm::{ConnectionTrait, EntityTrait, QueryOrder, QuerySelect, sea_query::Expr};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::{Categories, Notebooks, Smartphones, categories, notebooks, smartphones},
    error::AppResult,
    models::{ProductKind, category_url},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SidebarCategory {
    pub name: String,
    pub slug: String,
    pub url: String,
    pub count: i64,
}

/// Product counts keyed by [`ProductKind::count_key`], then by category id.
pub type VariantCounts = HashMap<String, HashMap<Uuid, i64>>;

pub async fn categories_for_sidebar<C: ConnectionTrait>(
    conn: &C,
) -> AppResult<Vec<SidebarCategory>> {
    let categories = Categories::find()
        .order_by_asc(categories::Column::Name)
        .all(conn)
        .await?;

    let mut counts = VariantCounts::new();
    for kind in ProductKind::ALL {
        let rows: Vec<(Uuid, i64)> = match kind {
            ProductKind::Notebook => {
                Notebooks::find()
                    .select_only()
                    .column(notebooks::Column::CategoryId)
                    .column_as(Expr::col(notebooks::Column::Id).count(), "count")
                    .group_by(notebooks::Column::CategoryId)
                    .into_tuple()
                    .all(conn)
                    .await?
            }
            ProductKind::Smartphone => {
                Smartphones::find()
                    .select_only()
                    .column(smartphones::Column::CategoryId)
                    .column_as(Expr::col(smartphones::Column::Id).count(), "count")
                    .group_by(smartphones::Column::CategoryId)
                    .into_tuple()
                    .all(conn)
                    .await?
            }
        };
        counts.insert(kind.count_key(), rows.into_iter().collect());
    }

    Ok(build_sidebar(
        categories.into_iter().map(|c| (c.id, c.name, c.slug)),
        &counts,
    ))
}

/// Join categories with per-variant counts. A category's count is the sum
/// over the known variants; categories without products report zero.
pub fn build_sidebar(
    categories: impl IntoIterator<Item = (Uuid, String, String)>,
    counts: &VariantCounts,
) -> Vec<SidebarCategory> {
    categories
        .into_iter()
        .map(|(id, name, slug)| {
            let count = ProductKind::ALL
                .iter()
                .filter_map(|kind| counts.get(&kind.count_key()))
                .filter_map(|per_category| per_category.get(&id))
                .sum();
            SidebarCategory {
                url: category_url(&slug),
                name,
                slug,
                count,
            }
        })
        .collect()
}
