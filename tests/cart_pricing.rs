use std::{collections::HashMap, sync::Mutex};

use chrono::Utc;
use emporium::{
    catalog::ProductLookup,
    entity::cart_products::Model as LineModel,
    error::{AppError, AppResult},
    models::{ProductKind, ProductRef},
    services::cart_service::{MAX_LINE_QUANTITY, cart_totals, line_product, price_line},
};
use rust_decimal::Decimal;
use uuid::Uuid;

/// In-memory price list standing in for the variant tables.
#[derive(Default)]
struct PriceList(Mutex<HashMap<ProductRef, Decimal>>);

impl PriceList {
    fn set(&self, product: ProductRef, price: Decimal) {
        self.0.lock().expect("price list").insert(product, price);
    }
}

impl ProductLookup for PriceList {
    async fn unit_price(&self, product: ProductRef) -> AppResult<Decimal> {
        let price = self.0.lock().expect("price list").get(&product).copied();
        price.ok_or(AppError::UnresolvedProduct(product))
    }
}

fn line(kind: ProductKind, quantity: i32, total_price: Decimal) -> LineModel {
    LineModel {
        id: Uuid::new_v4(),
        customer_id: Uuid::new_v4(),
        cart_id: Uuid::new_v4(),
        product_kind: kind.model_name().to_string(),
        product_id: Uuid::new_v4(),
        quantity,
        total_price,
        created_at: Utc::now().fixed_offset(),
    }
}

#[tokio::test]
async fn line_total_is_quantity_times_current_price() {
    let prices = PriceList::default();
    let phone = ProductRef::smartphone(Uuid::new_v4());
    prices.set(phone, Decimal::new(1_999, 2));

    let total = price_line(&prices, phone, 3).await.expect("priced");
    assert_eq!(total, Decimal::new(5_997, 2));

    prices.set(phone, Decimal::new(2_500, 2));
    let total = price_line(&prices, phone, 3).await.expect("repriced");
    assert_eq!(total, Decimal::new(7_500, 2));
}

#[tokio::test]
async fn quantity_must_be_positive() {
    let prices = PriceList::default();
    let notebook = ProductRef::notebook(Uuid::new_v4());
    prices.set(notebook, Decimal::new(100, 0));

    for quantity in [0, -2] {
        let err = price_line(&prices, notebook, quantity).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}

#[tokio::test]
async fn unknown_product_is_unresolved() {
    let prices = PriceList::default();
    let ghost = ProductRef::notebook(Uuid::new_v4());
    prices.set(ProductRef::smartphone(ghost.id), Decimal::ONE);

    match price_line(&prices, ghost, 1).await {
        Err(AppError::UnresolvedProduct(product)) => assert_eq!(product, ghost),
        other => panic!("expected unresolved product, got {other:?}"),
    }
}

#[tokio::test]
async fn quantity_above_line_cap_is_rejected() {
    let prices = PriceList::default();
    let phone = ProductRef::smartphone(Uuid::new_v4());
    prices.set(phone, Decimal::new(59_999, 2));

    assert!(price_line(&prices, phone, MAX_LINE_QUANTITY).await.is_ok());
    for quantity in [MAX_LINE_QUANTITY + 1, i32::MAX] {
        let err = price_line(&prices, phone, quantity).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}

#[tokio::test]
async fn line_total_must_fit_money_column() {
    let prices = PriceList::default();
    let notebook = ProductRef::notebook(Uuid::new_v4());
    prices.set(notebook, Decimal::new(9_999_999_999, 2));

    let err = price_line(&prices, notebook, 2).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(
        price_line(&prices, notebook, 1).await.expect("fits"),
        Decimal::new(9_999_999_999, 2)
    );
}

#[test]
fn cart_totals_reject_overflowing_quantity() {
    let items = vec![
        line(ProductKind::Smartphone, i32::MAX, Decimal::ZERO),
        line(ProductKind::Smartphone, 1, Decimal::ZERO),
    ];
    assert!(matches!(cart_totals(&items), Err(AppError::BadRequest(_))));
}

#[test]
fn cart_totals_reject_amount_beyond_money_column() {
    let items = vec![
        line(ProductKind::Notebook, 1, Decimal::new(6_000_000_000, 2)),
        line(ProductKind::Notebook, 1, Decimal::new(4_000_000_000, 2)),
    ];
    assert!(matches!(cart_totals(&items), Err(AppError::BadRequest(_))));
}

#[test]
fn cart_totals_sum_quantities_and_prices() {
    let items = vec![
        line(ProductKind::Notebook, 1, Decimal::new(129_900, 2)),
        line(ProductKind::Smartphone, 2, Decimal::new(99_800, 2)),
    ];
    assert_eq!(cart_totals(&items).expect("totals"), (3, Decimal::new(229_700, 2)));
    assert_eq!(
        cart_totals(&Vec::<LineModel>::new()).expect("totals"),
        (0, Decimal::ZERO)
    );
}

#[test]
fn line_product_reads_the_tagged_reference() {
    let item = line(ProductKind::Smartphone, 1, Decimal::ONE);
    let product = line_product(&item).expect("known kind");
    assert_eq!(product, ProductRef::smartphone(item.product_id));

    let mut broken = item;
    broken.product_kind = "tablet".into();
    assert!(matches!(line_product(&broken), Err(AppError::Internal(_))));
}
