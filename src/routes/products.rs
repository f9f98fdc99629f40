use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
};

use crate::{
    dto::{
        categories::{CategoryList, Sidebar},
        products::{ProductCardList, ProductDetail},
    },
    error::AppResult,
    imaging::NORMALIZED_CONTENT_TYPE,
    response::ApiResponse,
    routes::params::{LatestQuery, parse_kind},
    services::product_service,
    state::AppState,
};

pub fn category_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/sidebar", get(sidebar))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/latest", get(latest_products))
        .route("/{kind}/{slug}", get(product_detail))
        .route("/{kind}/{slug}/image", get(product_image))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "All categories", body = ApiResponse<CategoryList>)
    ),
    tag = "Catalog"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    Ok(Json(product_service::list_categories(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/categories/sidebar",
    responses(
        (status = 200, description = "Categories with product counts summed over all variants", body = ApiResponse<Sidebar>)
    ),
    tag = "Catalog"
)]
pub async fn sidebar(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Sidebar>>> {
    Ok(Json(product_service::sidebar(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/products/latest",
    params(LatestQuery),
    responses(
        (status = 200, description = "Newest products of each requested variant", body = ApiResponse<ProductCardList>),
        (status = 400, description = "Unknown variant name")
    ),
    tag = "Catalog"
)]
pub async fn latest_products(
    State(state): State<AppState>,
    Query(query): Query<LatestQuery>,
) -> AppResult<Json<ApiResponse<ProductCardList>>> {
    Ok(Json(product_service::latest_products(&state, query).await?))
}

#[utoipa::path(
    get,
    path = "/api/products/{kind}/{slug}",
    params(
        ("kind" = String, Path, description = "notebook or smartphone"),
        ("slug" = String, Path, description = "Product slug")
    ),
    responses(
        (status = 200, description = "Product with its specification table", body = ApiResponse<ProductDetail>),
        (status = 404, description = "Not found")
    ),
    tag = "Catalog"
)]
pub async fn product_detail(
    State(state): State<AppState>,
    Path((kind, slug)): Path<(String, String)>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let kind = parse_kind(&kind)?;
    Ok(Json(product_service::product_detail(&state, kind, &slug).await?))
}

#[utoipa::path(
    get,
    path = "/api/products/{kind}/{slug}/image",
    params(
        ("kind" = String, Path, description = "notebook or smartphone"),
        ("slug" = String, Path, description = "Product slug")
    ),
    responses(
        (status = 200, description = "Normalized 400x400 JPEG", content_type = "image/jpeg"),
        (status = 404, description = "Product or image not found")
    ),
    tag = "Catalog"
)]
pub async fn product_image(
    State(state): State<AppState>,
    Path((kind, slug)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let kind = parse_kind(&kind)?;
    let (file_name, bytes) = product_service::product_image(&state, kind, &slug).await?;
    tracing::debug!(%kind, %slug, %file_name, size = bytes.len(), "serving product image");
    Ok(([(header::CONTENT_TYPE, NORMALIZED_CONTENT_TYPE)], bytes))
}
