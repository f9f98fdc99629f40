use chrono::Utc;
use emporium::{
    admin::{
        INVALID_CHOICE, category_choices, clean, clean_smartphone, ensure_category_choice,
        form_schema, image_help_text, notebook_form_fields, smartphone_form_fields,
        validate_price, validate_slug,
    },
    dto::products::{NotebookPayload, ProductPayload, SmartphonePayload},
    error::AppError,
    models::{Category, ProductKind, Smartphone, category_url, product_url},
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn category(name: &str, slug: &str) -> Category {
    Category {
        id: Uuid::new_v4(),
        name: name.into(),
        slug: slug.into(),
        url: category_url(slug),
    }
}

fn phone_payload(sd: bool) -> SmartphonePayload {
    SmartphonePayload {
        title: "Galaxy".into(),
        slug: "galaxy".into(),
        description: None,
        price: Decimal::new(79_999, 2),
        category_id: Uuid::new_v4(),
        diagonal: "6.2".into(),
        display_type: "AMOLED".into(),
        resolution: "1080x2340".into(),
        battery_capacity: "3900 mAh".into(),
        ram: "8 GB".into(),
        sd,
        sd_max_volume: Some("1 TB".into()),
        camera_main: "50 MP".into(),
        camera_frontal: "10 MP".into(),
    }
}

fn stored_phone(sd: bool) -> Smartphone {
    let payload = phone_payload(sd);
    Smartphone {
        id: Uuid::new_v4(),
        url: product_url(ProductKind::Smartphone, &payload.slug),
        title: payload.title,
        slug: payload.slug,
        image_name: None,
        description: None,
        price: payload.price,
        category_id: payload.category_id,
        diagonal: payload.diagonal,
        display_type: payload.display_type,
        resolution: payload.resolution,
        battery_capacity: payload.battery_capacity,
        ram: payload.ram,
        sd,
        sd_max_volume: None,
        camera_main: payload.camera_main,
        camera_frontal: payload.camera_frontal,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn only_matching_category_is_selectable() {
    let all = vec![
        category("Notebooks", "notebooks"),
        category("Smartphones", "smartphones"),
        category("Tablets", "tablets"),
    ];
    let choices = category_choices(ProductKind::Smartphone, all);
    assert_eq!(choices.len(), 1);
    assert_eq!(choices[0].slug, "smartphones");
}

#[test]
fn foreign_category_is_an_invalid_choice() {
    assert!(ensure_category_choice(ProductKind::Notebook, "notebooks").is_ok());
    match ensure_category_choice(ProductKind::Notebook, "smartphones") {
        Err(AppError::BadRequest(msg)) => assert_eq!(msg, INVALID_CHOICE),
        other => panic!("expected invalid choice, got {other:?}"),
    }
}

#[test]
fn phone_without_sd_drops_max_volume() {
    assert_eq!(clean_smartphone(phone_payload(false)).sd_max_volume, None);
    assert_eq!(
        clean_smartphone(phone_payload(true)).sd_max_volume.as_deref(),
        Some("1 TB")
    );
}

#[test]
fn clean_rejects_blank_required_field() {
    let payload = NotebookPayload {
        title: "Air".into(),
        slug: "air".into(),
        description: None,
        price: Decimal::new(99_900, 2),
        category_id: Uuid::new_v4(),
        diagonal: "13.3".into(),
        display_type: "Retina".into(),
        processor_freq: "   ".into(),
        ram: "8 GB".into(),
        video_card: "M1".into(),
        battery_capacity: "49.9 Wh".into(),
    };
    match clean(ProductPayload::Notebook(payload)) {
        Err(AppError::BadRequest(msg)) => assert_eq!(msg, "processor_freq is required"),
        other => panic!("expected missing field, got {other:?}"),
    }
}

#[test]
fn sd_volume_locked_only_when_editing_phone_without_sd() {
    let locked = |fields: Vec<emporium::dto::products::FormField>| {
        fields
            .into_iter()
            .find(|field| field.name == "sd_max_volume")
            .map(|field| field.readonly)
    };
    assert_eq!(locked(smartphone_form_fields(None)), Some(false));
    assert_eq!(locked(smartphone_form_fields(Some(&stored_phone(true)))), Some(false));
    assert_eq!(locked(smartphone_form_fields(Some(&stored_phone(false)))), Some(true));
}

#[test]
fn notebook_image_field_carries_resolution_hint() {
    assert_eq!(
        image_help_text(),
        "Maximum accepted image resolution is 800 * 800 px"
    );
    let image = notebook_form_fields()
        .into_iter()
        .find(|field| field.name == "image")
        .expect("image field");
    assert_eq!(image.help_text, Some(image_help_text()));
}

#[test]
fn form_schema_combines_fields_and_choices() {
    let schema = form_schema(
        ProductKind::Notebook,
        None,
        vec![category("Notebooks", "notebooks"), category("Smartphones", "smartphones")],
    );
    assert_eq!(schema.kind, ProductKind::Notebook);
    assert_eq!(schema.category_choices.len(), 1);
    assert!(schema.fields.iter().any(|field| field.name == "video_card"));
}

#[test]
fn price_and_slug_validation() {
    assert!(validate_price(Decimal::new(1_999, 2)).is_ok());
    assert!(validate_price(Decimal::new(99_999_999_99, 2)).is_ok());
    assert!(validate_price(Decimal::new(-1, 0)).is_err());
    assert!(validate_price(Decimal::new(1_999, 3)).is_err());
    assert!(validate_price(Decimal::new(100_000_000, 0)).is_err());

    assert!(validate_slug("macbook-air_13").is_ok());
    assert!(validate_slug("").is_err());
    assert!(validate_slug("mac book").is_err());
}
