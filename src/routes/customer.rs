use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::customers::UpdateCustomerRequest,
    error::AppResult,
    middleware::auth::AuthUser,
    models::Customer,
    response::ApiResponse,
    services::customer_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_profile).put(update_profile))
}

#[utoipa::path(
    get,
    path = "/api/customer",
    responses(
        (status = 200, description = "Customer profile of the current user", body = ApiResponse<Customer>)
    ),
    security(("bearer_auth" = [])),
    tag = "Customer"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Customer>>> {
    Ok(Json(customer_service::get_profile(&state, &user).await?))
}

#[utoipa::path(
    put,
    path = "/api/customer",
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<Customer>)
    ),
    security(("bearer_auth" = [])),
    tag = "Customer"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateCustomerRequest>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    Ok(Json(
        customer_service::update_profile(&state, &user, payload).await?,
    ))
}
