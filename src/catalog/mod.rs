//! Catalog read side: entity conversions, product lookup and the two
//! storefront queries (category sidebar, latest products).

pub mod latest;
pub mod lookup;
pub mod sidebar;

use chrono::Utc;

use crate::{
    entity::{categories, notebooks, smartphones},
    models::{Category, Notebook, ProductKind, Smartphone, category_url, product_url},
};

pub use lookup::{CatalogLookup, ProductLookup};

pub fn category_from_entity(model: categories::Model) -> Category {
    Category {
        id: model.id,
        url: category_url(&model.slug),
        name: model.name,
        slug: model.slug,
    }
}

pub fn notebook_from_entity(model: notebooks::Model) -> Notebook {
    Notebook {
        id: model.id,
        url: product_url(ProductKind::Notebook, &model.slug),
        title: model.title,
        slug: model.slug,
        image_name: model.image_name,
        description: model.description,
        price: model.price,
        category_id: model.category_id,
        diagonal: model.diagonal,
        display_type: model.display_type,
        processor_freq: model.processor_freq,
        ram: model.ram,
        video_card: model.video_card,
        battery_capacity: model.battery_capacity,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub fn smartphone_from_entity(model: smartphones::Model) -> Smartphone {
    Smartphone {
        id: model.id,
        url: product_url(ProductKind::Smartphone, &model.slug),
        title: model.title,
        slug: model.slug,
        image_name: model.image_name,
        description: model.description,
        price: model.price,
        category_id: model.category_id,
        diagonal: model.diagonal,
        display_type: model.display_type,
        resolution: model.resolution,
        battery_capacity: model.battery_capacity,
        ram: model.ram,
        sd: model.sd,
        sd_max_volume: model.sd_max_volume,
        camera_main: model.camera_main,
        camera_frontal: model.camera_frontal,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

/// `"{category}: {title}"`, the label used in admin listings.
pub fn display_name(category: &str, title: &str) -> String {
    format!("{category}: {title}")
}
