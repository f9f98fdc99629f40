use chrono::Utc;
use sea_orm::{ActiveModelTrait, Condition, EntityTrait, QueryOrder, Set};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    admin, audit,
    catalog::{self, category_from_entity},
    dto::{
        categories::CreateCategoryRequest,
        orders::{OrderList, OrderWithCart, UpdateOrderStatusRequest},
        products::ProductFormSchema,
    },
    entity::{
        Categories,
        categories::{ActiveModel as CategoryActive, Column as CategoryCol},
        orders::{ActiveModel as OrderActive, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::{Category, Product, ProductKind},
    response::{ApiResponse, Meta},
    routes::params::OrderListQuery,
    services::{order_service, product_service},
    state::AppState,
};

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_staff(user)?;
    let name = payload.name.trim().to_string();
    let slug = payload.slug.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }
    admin::validate_slug(&slug)?;

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        slug: Set(slug),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|err| AppError::from_unique(err, "a category with this slug already exists"))?;

    audit::record(
        &state.pool,
        user.user_id,
        "category_create",
        "categories",
        serde_json::json!({ "category_id": category.id, "slug": category.slug }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category created",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_staff(user)?;
    let result = Categories::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "category_delete",
        "categories",
        serde_json::json!({ "category_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_staff(user)?;
    order_service::list_with(state, Condition::all(), query).await
}

pub async fn get_order_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithCart>> {
    ensure_staff(user)?;
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "OK",
        order_service::order_with_cart(&state.orm, order).await?,
        Some(Meta::empty()),
    ))
}

/// Move an order to `payload.status`. Any status may follow any other.
pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<OrderWithCart>> {
    ensure_staff(user)?;
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let previous = order.status.clone();

    let mut active: OrderActive = order.into();
    active.status = Set(payload.status.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    tracing::info!(order_id = %id, from = %previous, to = payload.status.as_str(), "order status changed");
    audit::record(
        &state.pool,
        user.user_id,
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": id, "from": previous, "to": payload.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order status updated",
        order_service::order_with_cart(&state.orm, order).await?,
        Some(Meta::empty()),
    ))
}

/// Form layout for creating (no `id`) or editing a product of `kind`.
pub async fn product_form(
    state: &AppState,
    user: &AuthUser,
    kind: ProductKind,
    id: Option<Uuid>,
) -> AppResult<ApiResponse<ProductFormSchema>> {
    ensure_staff(user)?;
    let instance = match id {
        Some(id) => Some(product_service::find_by_id(&state.orm, kind, id).await?),
        None => None,
    };
    let smartphone = match &instance {
        Some(Product::Smartphone(phone)) => Some(phone),
        _ => None,
    };

    let categories = Categories::find()
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(catalog::category_from_entity)
        .collect();

    Ok(ApiResponse::ok(admin::form_schema(kind, smartphone, categories)))
}
