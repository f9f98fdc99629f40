use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{CheckoutRequest, OrderList, OrderWithCart},
    entity::{
        carts::{ActiveModel as CartActive, Entity as Carts},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        Users,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{DeliveryType, Order, OrderStatus},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{
        cart_service::{cart_from_entity, cart_items, line_from_entity, open_cart, recalculate_cart},
        customer_service::customer_for_user,
    },
    state::AppState,
};

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let customer = customer_for_user(&state.orm, user.user_id).await?;
    let condition = Condition::all().add(OrderCol::CustomerId.eq(customer.id));
    list_with(state, condition, query).await
}

/// Paginated order listing under `condition`, shared with the staff view.
pub async fn list_with(
    state: &AppState,
    mut condition: Condition,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::success(
        "Ok",
        OrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Turn the customer's open cart into an order in status `new`.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderWithCart>> {
    let txn = state.orm.begin().await?;

    let account = Users::find_by_id(user.user_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let customer = customer_for_user(&txn, user.user_id).await?;
    let cart = open_cart(&txn, customer.id).await?;
    let cart = Carts::find_by_id(cart.id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = cart_items(&txn, cart.id).await?;
    if items.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }
    let cart = recalculate_cart(&txn, cart).await?;

    let first_name = pick(payload.first_name, Some(account.first_name))
        .ok_or_else(|| AppError::BadRequest("first_name is required".into()))?;
    let last_name = pick(payload.last_name, Some(account.last_name))
        .ok_or_else(|| AppError::BadRequest("last_name is required".into()))?;
    let phone = pick(payload.phone, customer.phone.clone())
        .ok_or_else(|| AppError::BadRequest("phone is required".into()))?;
    let address = pick(payload.address, customer.address.clone());
    if payload.delivery_type == DeliveryType::Delivery && address.is_none() {
        return Err(AppError::BadRequest(
            "address is required for delivery".into(),
        ));
    }

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        customer_id: Set(customer.id),
        first_name: Set(first_name),
        last_name: Set(last_name),
        phone: Set(phone),
        cart_id: Set(Some(cart.id)),
        address: Set(address),
        status: Set(OrderStatus::New.as_str().to_string()),
        delivery_type: Set(payload.delivery_type.as_str().to_string()),
        comment: Set(payload.comment.filter(|c| !c.trim().is_empty())),
        created_at: NotSet,
        updated_at: NotSet,
        order_date: Set(payload.order_date.unwrap_or_else(|| Utc::now().date_naive())),
    }
    .insert(&txn)
    .await?;

    let mut closed: CartActive = cart.into();
    closed.in_order = Set(true);
    let cart = closed.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        cart_id = %cart.id,
        total_price = %cart.total_price,
        "order placed"
    );
    audit::record(
        &state.pool,
        user.user_id,
        "checkout",
        "orders",
        serde_json::json!({ "order_id": order.id, "cart_id": cart.id }),
    )
    .await;

    let items = items
        .into_iter()
        .map(line_from_entity)
        .collect::<AppResult<Vec<_>>>()?;
    Ok(ApiResponse::success(
        "Checkout success",
        OrderWithCart {
            order: order_from_entity(order)?,
            cart: Some(cart_from_entity(cart)),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithCart>> {
    let customer = customer_for_user(&state.orm, user.user_id).await?;
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::CustomerId.eq(customer.id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "OK",
        order_with_cart(&state.orm, order).await?,
        Some(Meta::empty()),
    ))
}

pub async fn order_with_cart<C: ConnectionTrait>(
    conn: &C,
    order: OrderModel,
) -> AppResult<OrderWithCart> {
    let (cart, items) = match order.cart_id {
        Some(cart_id) => {
            let cart = Carts::find_by_id(cart_id).one(conn).await?;
            let items = cart_items(conn, cart_id)
                .await?
                .into_iter()
                .map(line_from_entity)
                .collect::<AppResult<Vec<_>>>()?;
            (cart.map(cart_from_entity), items)
        }
        None => (None, Vec::new()),
    };
    Ok(OrderWithCart {
        order: order_from_entity(order)?,
        cart,
        items,
    })
}

pub fn order_from_entity(model: OrderModel) -> AppResult<Order> {
    let status = model
        .status
        .parse::<OrderStatus>()
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
    let delivery_type = model
        .delivery_type
        .parse::<DeliveryType>()
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
    Ok(Order {
        id: model.id,
        customer_id: model.customer_id,
        first_name: model.first_name,
        last_name: model.last_name,
        phone: model.phone,
        cart_id: model.cart_id,
        address: model.address,
        status,
        delivery_type,
        comment: model.comment,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
        order_date: model.order_date,
    })
}

/// First non-blank value of `preferred` then `fallback`.
fn pick(preferred: Option<String>, fallback: Option<String>) -> Option<String> {
    preferred
        .into_iter()
        .chain(fallback)
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}
