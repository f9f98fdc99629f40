use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartView, UpdateQuantityRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(view_cart))
        .route("/items", post(add_to_cart))
        .route("/items/{id}", patch(update_quantity).delete(remove_from_cart))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Open cart of the current customer", body = ApiResponse<CartView>)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn view_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(cart_service::view_cart(&state, &user).await?))
}

#[utoipa::path(
    post,
    path = "/api/cart/items",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Line item saved, cart totals recalculated", body = ApiResponse<CartView>),
        (status = 400, description = "Invalid quantity or unknown product")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(cart_service::add_to_cart(&state, &user, payload).await?))
}

#[utoipa::path(
    patch,
    path = "/api/cart/items/{id}",
    params(("id" = Uuid, Path, description = "Line item id")),
    request_body = UpdateQuantityRequest,
    responses(
        (status = 200, description = "Quantity updated", body = ApiResponse<CartView>),
        (status = 404, description = "Line item not in the open cart")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn update_quantity(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(
        cart_service::update_quantity(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/cart/items/{id}",
    params(("id" = Uuid, Path, description = "Line item id")),
    responses(
        (status = 200, description = "Removed from cart", body = ApiResponse<CartView>),
        (status = 404, description = "Line item not in the open cart")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(cart_service::remove_from_cart(&state, &user, id).await?))
}
