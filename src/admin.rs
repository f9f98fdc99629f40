//! Behaviors layered on top of the plain product forms in the staff UI.

use rust_decimal::Decimal;

use crate::{
    dto::products::{FormField, NotebookPayload, ProductFormSchema, ProductPayload, SmartphonePayload},
    error::{AppError, AppResult},
    imaging::MAX_RESOLUTION,
    models::{Category, ProductKind, Smartphone},
};

pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

const MAX_PRICE_DIGITS: u32 = 10;
const PRICE_SCALE: u32 = 2;

const NOTEBOOK_FIELDS: &[&str] = &[
    "title",
    "slug",
    "image",
    "description",
    "price",
    "category_id",
    "diagonal",
    "display_type",
    "processor_freq",
    "ram",
    "video_card",
    "battery_capacity",
];

const SMARTPHONE_FIELDS: &[&str] = &[
    "title",
    "slug",
    "image",
    "description",
    "price",
    "category_id",
    "diagonal",
    "display_type",
    "resolution",
    "battery_capacity",
    "ram",
    "sd",
    "sd_max_volume",
    "camera_main",
    "camera_frontal",
];

pub fn image_help_text() -> String {
    let (width, height) = MAX_RESOLUTION;
    format!("Maximum accepted image resolution is {width} * {height} px")
}

/// Field layout of the notebook form. The image field carries the
/// resolution hint.
pub fn notebook_form_fields() -> Vec<FormField> {
    NOTEBOOK_FIELDS
        .iter()
        .map(|&name| FormField {
            name: name.to_string(),
            readonly: false,
            help_text: (name == "image").then(image_help_text),
        })
        .collect()
}

/// Field layout of the smartphone form. Editing a phone without an SD slot
/// locks `sd_max_volume`.
pub fn smartphone_form_fields(instance: Option<&Smartphone>) -> Vec<FormField> {
    let lock_sd_volume = instance.is_some_and(|phone| !phone.sd);
    SMARTPHONE_FIELDS
        .iter()
        .map(|&name| FormField {
            name: name.to_string(),
            readonly: lock_sd_volume && name == "sd_max_volume",
            help_text: None,
        })
        .collect()
}

pub fn form_schema(
    kind: ProductKind,
    smartphone: Option<&Smartphone>,
    categories: Vec<Category>,
) -> ProductFormSchema {
    let fields = match kind {
        ProductKind::Notebook => notebook_form_fields(),
        ProductKind::Smartphone => smartphone_form_fields(smartphone),
    };
    ProductFormSchema {
        kind,
        fields,
        category_choices: category_choices(kind, categories),
    }
}

/// Only the category matching the variant's slug is selectable.
pub fn category_choices(kind: ProductKind, categories: Vec<Category>) -> Vec<Category> {
    categories
        .into_iter()
        .filter(|category| category.slug == kind.category_slug())
        .collect()
}

pub fn ensure_category_choice(kind: ProductKind, category_slug: &str) -> AppResult<()> {
    if category_slug == kind.category_slug() {
        Ok(())
    } else {
        Err(AppError::BadRequest(INVALID_CHOICE.to_string()))
    }
}

/// Smartphones without an SD slot never keep a max volume, whatever was
/// submitted.
pub fn clean_smartphone(mut payload: SmartphonePayload) -> SmartphonePayload {
    if !payload.sd {
        payload.sd_max_volume = None;
    }
    payload
}

pub fn clean(payload: ProductPayload) -> AppResult<ProductPayload> {
    match payload {
        ProductPayload::Notebook(notebook) => {
            validate_notebook(&notebook)?;
            Ok(ProductPayload::Notebook(notebook))
        }
        ProductPayload::Smartphone(phone) => {
            let phone = clean_smartphone(phone);
            validate_smartphone(&phone)?;
            Ok(ProductPayload::Smartphone(phone))
        }
    }
}

fn validate_notebook(payload: &NotebookPayload) -> AppResult<()> {
    validate_common(&payload.title, &payload.slug, payload.price)?;
    require_all(&[
        ("diagonal", payload.diagonal.as_str()),
        ("display_type", payload.display_type.as_str()),
        ("processor_freq", payload.processor_freq.as_str()),
        ("ram", payload.ram.as_str()),
        ("video_card", payload.video_card.as_str()),
        ("battery_capacity", payload.battery_capacity.as_str()),
    ])
}

fn validate_smartphone(payload: &SmartphonePayload) -> AppResult<()> {
    validate_common(&payload.title, &payload.slug, payload.price)?;
    require_all(&[
        ("diagonal", payload.diagonal.as_str()),
        ("display_type", payload.display_type.as_str()),
        ("resolution", payload.resolution.as_str()),
        ("battery_capacity", payload.battery_capacity.as_str()),
        ("ram", payload.ram.as_str()),
        ("camera_main", payload.camera_main.as_str()),
        ("camera_frontal", payload.camera_frontal.as_str()),
    ])
}

fn validate_common(title: &str, slug: &str, price: Decimal) -> AppResult<()> {
    require_all(&[("title", title)])?;
    validate_slug(slug)?;
    validate_price(price)
}

pub fn validate_slug(slug: &str) -> AppResult<()> {
    let valid = !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(AppError::BadRequest(
            "slug may only contain letters, numbers, underscores or hyphens".into(),
        ))
    }
}

/// Prices are `NUMERIC(10, 2)`: non-negative, at most two fraction digits
/// and eight integer digits.
pub fn validate_price(price: Decimal) -> AppResult<()> {
    if price < Decimal::ZERO {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    if price.normalize().scale() > PRICE_SCALE {
        return Err(AppError::BadRequest(format!(
            "price must have at most {PRICE_SCALE} decimal places"
        )));
    }
    let limit = Decimal::from(10_i64.pow(MAX_PRICE_DIGITS - PRICE_SCALE));
    if price >= limit {
        return Err(AppError::BadRequest(format!(
            "price must have at most {MAX_PRICE_DIGITS} digits"
        )));
    }
    Ok(())
}

fn require_all(fields: &[(&str, &str)]) -> AppResult<()> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((name, _)) => Err(AppError::BadRequest(format!("{name} is required"))),
        None => Ok(()),
    }
}
