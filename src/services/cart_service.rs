use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit,
    catalog::{CatalogLookup, ProductLookup},
    dto::cart::{AddToCartRequest, CartView, UpdateQuantityRequest},
    entity::{
        cart_products::{
            ActiveModel as LineActive, Column as LineCol, Entity as CartProducts,
            Model as LineModel,
        },
        carts::{ActiveModel as CartActive, Column as CartCol, Entity as Carts, Model as CartModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Cart, CartProduct, ProductKind, ProductRef},
    response::{ApiResponse, Meta},
    services::customer_service::customer_for_user,
    state::AppState,
};

/// Most units of one product a single line item may hold.
pub const MAX_LINE_QUANTITY: i32 = 1_000;

/// Money columns are `NUMERIC(10, 2)`; stored amounts stay below this.
fn amount_limit() -> Decimal {
    Decimal::from(100_000_000_i64)
}

/// `quantity × unit price` of `product`, read through `lookup` right now.
pub async fn price_line<L: ProductLookup>(
    lookup: &L,
    product: ProductRef,
    quantity: i32,
) -> AppResult<Decimal> {
    if !(1..=MAX_LINE_QUANTITY).contains(&quantity) {
        return Err(AppError::BadRequest(format!(
            "quantity must be between 1 and {MAX_LINE_QUANTITY}"
        )));
    }
    let unit_price = lookup.unit_price(product).await?;
    let total = unit_price
        .checked_mul(Decimal::from(quantity))
        .map(|total| total.round_dp(2))
        .filter(|total| *total < amount_limit())
        .ok_or_else(|| AppError::BadRequest("line total is too large".to_string()))?;
    Ok(total)
}

/// Aggregate `(total_products, total_price)` over a cart's line items.
pub fn cart_totals<'a>(
    items: impl IntoIterator<Item = &'a LineModel>,
) -> AppResult<(i32, Decimal)> {
    let too_large = || AppError::BadRequest("cart total is too large".to_string());
    let (count, price) = items
        .into_iter()
        .try_fold((0_i32, Decimal::ZERO), |(count, price), item| {
            Some((
                count.checked_add(item.quantity)?,
                price.checked_add(item.total_price)?,
            ))
        })
        .ok_or_else(too_large)?;
    if price >= amount_limit() {
        return Err(too_large());
    }
    Ok((count, price))
}

/// The customer's cart that has not been turned into an order yet.
pub async fn open_cart<C: ConnectionTrait>(conn: &C, customer_id: Uuid) -> AppResult<CartModel> {
    let existing = Carts::find()
        .filter(
            Condition::all()
                .add(CartCol::OwnerId.eq(customer_id))
                .add(CartCol::InOrder.eq(false)),
        )
        .order_by_desc(CartCol::CreatedAt)
        .one(conn)
        .await?;
    if let Some(cart) = existing {
        return Ok(cart);
    }

    let cart = CartActive {
        id: Set(Uuid::new_v4()),
        owner_id: Set(Some(customer_id)),
        total_products: Set(0),
        total_price: Set(Decimal::ZERO),
        in_order: Set(false),
        for_anonymous_user: Set(false),
        created_at: NotSet,
    }
    .insert(conn)
    .await?;
    tracing::debug!(cart_id = %cart.id, %customer_id, "cart opened");
    Ok(cart)
}

pub async fn cart_items<C: ConnectionTrait>(conn: &C, cart_id: Uuid) -> AppResult<Vec<LineModel>> {
    let items = CartProducts::find()
        .filter(LineCol::CartId.eq(cart_id))
        .order_by_asc(LineCol::CreatedAt)
        .all(conn)
        .await?;
    Ok(items)
}

/// Store `cart`'s aggregate totals from its current line items.
pub async fn recalculate_cart<C: ConnectionTrait>(
    conn: &C,
    cart: CartModel,
) -> AppResult<CartModel> {
    let items = cart_items(conn, cart.id).await?;
    let (total_products, total_price) = cart_totals(&items)?;
    if cart.total_products == total_products && cart.total_price == total_price {
        return Ok(cart);
    }

    let mut active: CartActive = cart.into();
    active.total_products = Set(total_products);
    active.total_price = Set(total_price);
    Ok(active.update(conn).await?)
}

/// Insert or update the line item for `product` in `cart`, pricing it at the
/// product's current price.
pub async fn save_line_item<C: ConnectionTrait>(
    conn: &C,
    cart: &CartModel,
    customer_id: Uuid,
    product: ProductRef,
    quantity: i32,
) -> AppResult<LineModel> {
    let total_price = price_line(&CatalogLookup::new(conn), product, quantity).await?;

    let existing = CartProducts::find()
        .filter(
            Condition::all()
                .add(LineCol::CartId.eq(cart.id))
                .add(LineCol::ProductKind.eq(product.kind.model_name()))
                .add(LineCol::ProductId.eq(product.id)),
        )
        .one(conn)
        .await?;

    let line = match existing {
        Some(line) => {
            let mut active: LineActive = line.into();
            active.quantity = Set(quantity);
            active.total_price = Set(total_price);
            active.update(conn).await?
        }
        None => {
            LineActive {
                id: Set(Uuid::new_v4()),
                customer_id: Set(customer_id),
                cart_id: Set(cart.id),
                product_kind: Set(product.kind.model_name().to_string()),
                product_id: Set(product.id),
                quantity: Set(quantity),
                total_price: Set(total_price),
                created_at: NotSet,
            }
            .insert(conn)
            .await?
        }
    };
    Ok(line)
}

pub async fn view_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let customer = customer_for_user(&state.orm, user.user_id).await?;
    let cart = open_cart(&state.orm, customer.id).await?;
    let items = cart_items(&state.orm, cart.id).await?;
    Ok(ApiResponse::success(
        "OK",
        cart_view(cart, items)?,
        Some(Meta::empty()),
    ))
}

/// Put `quantity` of a product into the cart. A product already in the cart
/// gets its quantity replaced.
pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    let txn = state.orm.begin().await?;
    let customer = customer_for_user(&txn, user.user_id).await?;
    let cart = open_cart(&txn, customer.id).await?;
    let line = save_line_item(&txn, &cart, customer.id, payload.product, payload.quantity).await?;
    let cart = recalculate_cart(&txn, cart).await?;
    let items = cart_items(&txn, cart.id).await?;
    txn.commit().await?;

    tracing::info!(
        cart_id = %cart.id,
        product = %payload.product,
        quantity = line.quantity,
        total_price = %line.total_price,
        "cart line saved"
    );
    audit::record(
        &state.pool,
        user.user_id,
        "cart_update",
        "cart_products",
        serde_json::json!({ "product": payload.product, "quantity": payload.quantity }),
    )
    .await;

    Ok(ApiResponse::success("OK", cart_view(cart, items)?, None))
}

pub async fn update_quantity(
    state: &AppState,
    user: &AuthUser,
    line_id: Uuid,
    payload: UpdateQuantityRequest,
) -> AppResult<ApiResponse<CartView>> {
    let txn = state.orm.begin().await?;
    let customer = customer_for_user(&txn, user.user_id).await?;
    let cart = open_cart(&txn, customer.id).await?;
    let line = find_line(&txn, cart.id, line_id).await?;
    let product = line_product(&line)?;
    save_line_item(&txn, &cart, customer.id, product, payload.quantity).await?;
    let cart = recalculate_cart(&txn, cart).await?;
    let items = cart_items(&txn, cart.id).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "cart_update",
        "cart_products",
        serde_json::json!({ "line_id": line_id, "quantity": payload.quantity }),
    )
    .await;

    Ok(ApiResponse::success("Updated", cart_view(cart, items)?, None))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    line_id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    let txn = state.orm.begin().await?;
    let customer = customer_for_user(&txn, user.user_id).await?;
    let cart = open_cart(&txn, customer.id).await?;
    let line = find_line(&txn, cart.id, line_id).await?;
    CartProducts::delete_by_id(line.id).exec(&txn).await?;
    let cart = recalculate_cart(&txn, cart).await?;
    let items = cart_items(&txn, cart.id).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "cart_remove",
        "cart_products",
        serde_json::json!({ "line_id": line_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Removed from cart",
        cart_view(cart, items)?,
        Some(Meta::empty()),
    ))
}

async fn find_line<C: ConnectionTrait>(conn: &C, cart_id: Uuid, line_id: Uuid) -> AppResult<LineModel> {
    CartProducts::find_by_id(line_id)
        .filter(LineCol::CartId.eq(cart_id))
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

pub fn line_product(line: &LineModel) -> AppResult<ProductRef> {
    let kind = line
        .product_kind
        .parse::<ProductKind>()
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
    Ok(ProductRef { kind, id: line.product_id })
}

pub fn cart_view(cart: CartModel, items: Vec<LineModel>) -> AppResult<CartView> {
    let items = items
        .into_iter()
        .map(line_from_entity)
        .collect::<AppResult<Vec<_>>>()?;
    Ok(CartView {
        cart: cart_from_entity(cart),
        items,
    })
}

pub fn cart_from_entity(model: CartModel) -> Cart {
    Cart {
        id: model.id,
        owner_id: model.owner_id,
        total_products: model.total_products,
        total_price: model.total_price,
        in_order: model.in_order,
        for_anonymous_user: model.for_anonymous_user,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn line_from_entity(model: LineModel) -> AppResult<CartProduct> {
    let product = line_product(&model)?;
    Ok(CartProduct {
        id: model.id,
        customer_id: model.customer_id,
        cart_id: model.cart_id,
        product,
        quantity: model.quantity,
        total_price: model.total_price,
        created_at: model.created_at.with_timezone(&Utc),
    })
}
