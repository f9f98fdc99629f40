use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit,
    dto::customers::{CustomerList, UpdateCustomerRequest},
    entity::customers::{
        ActiveModel as CustomerActive, Column as CustomerCol, Entity as Customers,
        Model as CustomerModel,
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_staff},
    models::Customer,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

/// The customer profile linked to `user_id`, created on first use.
pub async fn customer_for_user<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> AppResult<CustomerModel> {
    let existing = Customers::find()
        .filter(CustomerCol::UserId.eq(user_id))
        .one(conn)
        .await?;
    if let Some(customer) = existing {
        return Ok(customer);
    }

    let customer = CustomerActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        phone: Set(None),
        address: Set(None),
        created_at: NotSet,
    }
    .insert(conn)
    .await?;
    tracing::info!(customer_id = %customer.id, %user_id, "customer profile created");
    Ok(customer)
}

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Customer>> {
    let customer = customer_for_user(&state.orm, user.user_id).await?;
    Ok(ApiResponse::ok(customer_from_entity(customer)))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateCustomerRequest,
) -> AppResult<ApiResponse<Customer>> {
    let customer = customer_for_user(&state.orm, user.user_id).await?;
    let mut active: CustomerActive = customer.into();
    if let Some(phone) = payload.phone {
        active.phone = Set(non_empty(phone));
    }
    if let Some(address) = payload.address {
        active.address = Set(non_empty(address));
    }
    let customer = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "customer_update",
        "customers",
        serde_json::json!({ "customer_id": customer.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        customer_from_entity(customer),
        Some(Meta::empty()),
    ))
}

pub async fn list_customers(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<CustomerList>> {
    ensure_staff(user)?;
    let (page, limit, offset) = pagination.normalize();
    let finder = Customers::find().order_by_desc(CustomerCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(customer_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Customers",
        CustomerList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub fn customer_from_entity(model: CustomerModel) -> Customer {
    Customer {
        id: model.id,
        user_id: model.user_id,
        phone: model.phone,
        address: model.address,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
