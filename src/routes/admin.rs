use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::{
        categories::CreateCategoryRequest,
        customers::CustomerList,
        orders::{OrderList, OrderWithCart, UpdateOrderStatusRequest},
        products::{ProductForm, ProductFormSchema, ProductPayload},
    },
    error::{AppError, AppResult},
    imaging::ImageUpload,
    middleware::auth::{AuthUser, ensure_staff},
    models::{Category, Product, ProductKind},
    response::ApiResponse,
    routes::params::{FormQuery, OrderListQuery, Pagination, parse_kind},
    services::{admin_service, customer_service, product_service},
    state::AppState,
};

/// Multipart body of the product create/update endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductUpload {
    /// JSON object with the variant's fields.
    pub data: String,
    /// Optional image file, accepted between 10x10 and 800x800 px.
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", post(create_category))
        .route("/categories/{id}", delete(delete_category))
        .route("/products/{kind}", post(create_product))
        .route(
            "/products/{kind}/{id}",
            axum::routing::put(update_product).delete(delete_product),
        )
        .route("/forms/{kind}", get(product_form))
        .route("/orders", get(list_all_orders))
        .route("/orders/{id}", get(get_order_admin))
        .route("/orders/{id}/status", patch(update_order_status))
        .route("/customers", get(list_customers))
}

/// Collect the `data` and `image` parts of a product upload.
async fn read_product_form(kind: ProductKind, mut multipart: Multipart) -> AppResult<ProductForm> {
    let mut payload = None;
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("data") => {
                let raw = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                let parsed = ProductPayload::from_json(kind, &raw)
                    .map_err(|e| AppError::BadRequest(format!("invalid product data: {e}")))?;
                payload = Some(parsed);
            }
            Some("image") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                // Browsers send an empty part when no file was picked.
                if !bytes.is_empty() {
                    image = Some(ImageUpload {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => continue,
        }
    }

    let payload =
        payload.ok_or_else(|| AppError::BadRequest("missing `data` part".to_string()))?;
    Ok(ProductForm { payload, image })
}

#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<Category>),
        (status = 409, description = "Slug already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let resp = admin_service::create_category(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category and its products deleted"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(admin_service::delete_category(&state, &user, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/products/{kind}",
    params(("kind" = String, Path, description = "notebook or smartphone")),
    request_body(content = ProductUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Product created"),
        (status = 400, description = "Invalid form data, category choice or image"),
        (status = 409, description = "Slug already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(kind): Path<String>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    ensure_staff(&user)?;
    let kind = parse_kind(&kind)?;
    let form = read_product_form(kind, multipart).await?;
    let resp = product_service::create_product(&state, &user, form).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/admin/products/{kind}/{id}",
    params(
        ("kind" = String, Path, description = "notebook or smartphone"),
        ("id" = Uuid, Path, description = "Product id")
    ),
    request_body(content = ProductUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Product updated, image kept unless a new one is sent"),
        (status = 400, description = "Invalid form data, category choice or image"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path((kind, id)): Path<(String, Uuid)>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<Product>>> {
    ensure_staff(&user)?;
    let kind = parse_kind(&kind)?;
    let form = read_product_form(kind, multipart).await?;
    Ok(Json(
        product_service::update_product(&state, &user, id, form).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/admin/products/{kind}/{id}",
    params(
        ("kind" = String, Path, description = "notebook or smartphone"),
        ("id" = Uuid, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path((kind, id)): Path<(String, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let kind = parse_kind(&kind)?;
    Ok(Json(
        product_service::delete_product(&state, &user, kind, id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/forms/{kind}",
    params(
        ("kind" = String, Path, description = "notebook or smartphone"),
        FormQuery
    ),
    responses(
        (status = 200, description = "Form fields and selectable categories", body = ApiResponse<ProductFormSchema>)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn product_form(
    State(state): State<AppState>,
    user: AuthUser,
    Path(kind): Path<String>,
    Query(query): Query<FormQuery>,
) -> AppResult<Json<ApiResponse<ProductFormSchema>>> {
    let kind = parse_kind(&kind)?;
    Ok(Json(
        admin_service::product_form(&state, &user, kind, query.id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "new, in_progress, is_ready or completed"),
        ("sort_order" = Option<String>, Query, description = "asc or desc by creation time")
    ),
    responses(
        (status = 200, description = "All orders", body = ApiResponse<OrderList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    Ok(Json(
        admin_service::list_all_orders(&state, &user, query).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order with its cart", body = ApiResponse<OrderWithCart>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_order_admin(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithCart>>> {
    Ok(Json(admin_service::get_order_admin(&state, &user, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/admin/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<OrderWithCart>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<OrderWithCart>>> {
    Ok(Json(
        admin_service::update_order_status(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/customers",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "All customers", body = ApiResponse<CustomerList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_customers(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<CustomerList>>> {
    Ok(Json(
        customer_service::list_customers(&state, &user, pagination).await?,
    ))
}
