use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    admin,
    audit,
    catalog::{self, latest, sidebar},
    dto::{
        categories::{CategoryList, Sidebar},
        products::{NotebookPayload, ProductCardList, ProductDetail, ProductForm, ProductPayload, SmartphonePayload},
    },
    entity::{
        Categories, Notebooks, Smartphones,
        categories::{Column as CategoryCol, Model as CategoryModel},
        notebooks::{self, ActiveModel as NotebookActive},
        smartphones::{self, ActiveModel as SmartphoneActive},
    },
    error::{AppError, AppResult},
    imaging::{self, ImageUpload, NormalizedImage},
    middleware::auth::{AuthUser, ensure_staff},
    models::{Product, ProductKind},
    response::{ApiResponse, Meta},
    routes::params::LatestQuery,
    specs,
    state::AppState,
};

const SLUG_TAKEN: &str = "a product with this slug already exists";

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items: Vec<_> = Categories::find()
        .all(&state.orm)
        .await?
        .into_iter()
        .map(catalog::category_from_entity)
        .collect();
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Categories", CategoryList { items }, Some(meta)))
}

pub async fn sidebar(state: &AppState) -> AppResult<ApiResponse<Sidebar>> {
    let items = sidebar::categories_for_sidebar(&state.orm).await?;
    Ok(ApiResponse::ok(Sidebar { items }))
}

pub async fn latest_products(
    state: &AppState,
    query: LatestQuery,
) -> AppResult<ApiResponse<ProductCardList>> {
    let kinds = match query.kinds.as_deref() {
        Some(raw) => latest::parse_kinds(raw)?,
        None => ProductKind::ALL.to_vec(),
    };
    let preferred = query
        .with_respect_to
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .map(str::parse::<ProductKind>)
        .transpose()
        .map_err(AppError::BadRequest)?;

    let items = latest::latest_products(&state.orm, &kinds, preferred).await?;
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success(
        "Latest products",
        ProductCardList { items },
        Some(meta),
    ))
}

pub async fn find_by_slug<C: ConnectionTrait>(
    conn: &C,
    kind: ProductKind,
    slug: &str,
) -> AppResult<Product> {
    let product = match kind {
        ProductKind::Notebook => Notebooks::find()
            .filter(notebooks::Column::Slug.eq(slug))
            .one(conn)
            .await?
            .map(|m| Product::Notebook(catalog::notebook_from_entity(m))),
        ProductKind::Smartphone => Smartphones::find()
            .filter(smartphones::Column::Slug.eq(slug))
            .one(conn)
            .await?
            .map(|m| Product::Smartphone(catalog::smartphone_from_entity(m))),
    };
    product.ok_or(AppError::NotFound)
}

pub async fn find_by_id<C: ConnectionTrait>(
    conn: &C,
    kind: ProductKind,
    id: Uuid,
) -> AppResult<Product> {
    let product = match kind {
        ProductKind::Notebook => Notebooks::find_by_id(id)
            .one(conn)
            .await?
            .map(|m| Product::Notebook(catalog::notebook_from_entity(m))),
        ProductKind::Smartphone => Smartphones::find_by_id(id)
            .one(conn)
            .await?
            .map(|m| Product::Smartphone(catalog::smartphone_from_entity(m))),
    };
    product.ok_or(AppError::NotFound)
}

pub async fn product_detail(
    state: &AppState,
    kind: ProductKind,
    slug: &str,
) -> AppResult<ApiResponse<ProductDetail>> {
    let product = find_by_slug(&state.orm, kind, slug).await?;
    let category_id = match &product {
        Product::Notebook(n) => n.category_id,
        Product::Smartphone(s) => s.category_id,
    };
    let category = Categories::find_by_id(category_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let specification = specs::product_spec(&product);
    let detail = ProductDetail {
        display_name: catalog::display_name(&category.name, product.title()),
        specification_html: specs::render_spec_table(&specification),
        specification,
        product,
    };
    Ok(ApiResponse::success("Product", detail, None))
}

/// Stored (normalized) image of a product as `(file name, JPEG bytes)`.
pub async fn product_image(
    state: &AppState,
    kind: ProductKind,
    slug: &str,
) -> AppResult<(String, Vec<u8>)> {
    let row: Option<(Option<String>, Option<Vec<u8>>)> = match kind {
        ProductKind::Notebook => {
            Notebooks::find()
                .select_only()
                .columns([notebooks::Column::ImageName, notebooks::Column::ImageData])
                .filter(notebooks::Column::Slug.eq(slug))
                .into_tuple()
                .one(&state.orm)
                .await?
        }
        ProductKind::Smartphone => {
            Smartphones::find()
                .select_only()
                .columns([smartphones::Column::ImageName, smartphones::Column::ImageData])
                .filter(smartphones::Column::Slug.eq(slug))
                .into_tuple()
                .one(&state.orm)
                .await?
        }
    };
    match row {
        Some((Some(name), Some(bytes))) => Ok((name, bytes)),
        _ => Err(AppError::NotFound),
    }
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    form: ProductForm,
) -> AppResult<ApiResponse<Product>> {
    ensure_staff(user)?;
    let product = save_product(&state.orm, None, form).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "product_create",
        product.kind().model_name(),
        serde_json::json!({ "product": product.reference() }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        product,
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    form: ProductForm,
) -> AppResult<ApiResponse<Product>> {
    ensure_staff(user)?;
    let product = save_product(&state.orm, Some(id), form).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "product_update",
        product.kind().model_name(),
        serde_json::json!({ "product": product.reference() }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        product,
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    kind: ProductKind,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_staff(user)?;
    let result = match kind {
        ProductKind::Notebook => Notebooks::delete_by_id(id).exec(&state.orm).await?,
        ProductKind::Smartphone => Smartphones::delete_by_id(id).exec(&state.orm).await?,
    };

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "product_delete",
        kind.model_name(),
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Clean the form, enforce the category restriction, normalize any new image
/// and persist the product in a single write.
///
/// Every check runs before the write, so a rejected form (an image outside
/// the accepted resolution included) leaves the table untouched.
pub async fn save_product<C: ConnectionTrait>(
    conn: &C,
    id: Option<Uuid>,
    form: ProductForm,
) -> AppResult<Product> {
    let payload = admin::clean(form.payload)?;
    let kind = payload.kind();
    let category_id = match &payload {
        ProductPayload::Notebook(n) => n.category_id,
        ProductPayload::Smartphone(s) => s.category_id,
    };
    let category = load_category(conn, category_id).await?;
    admin::ensure_category_choice(kind, &category.slug)?;

    let image = form.image.map(normalize_upload).transpose()?;

    let product = match payload {
        ProductPayload::Notebook(payload) => {
            Product::Notebook(catalog::notebook_from_entity(
                save_notebook(conn, id, payload, image).await?,
            ))
        }
        ProductPayload::Smartphone(payload) => {
            Product::Smartphone(catalog::smartphone_from_entity(
                save_smartphone(conn, id, payload, image).await?,
            ))
        }
    };
    tracing::info!(product = %product.reference(), category = %category.slug, "product saved");
    Ok(product)
}

async fn save_notebook<C: ConnectionTrait>(
    conn: &C,
    id: Option<Uuid>,
    payload: NotebookPayload,
    image: Option<NormalizedImage>,
) -> AppResult<notebooks::Model> {
    let mut active = match id {
        Some(id) => {
            let existing = Notebooks::find_by_id(id)
                .one(conn)
                .await?
                .ok_or(AppError::NotFound)?;
            let mut active: NotebookActive = existing.into();
            active.updated_at = Set(Utc::now().into());
            active
        }
        None => NotebookActive {
            id: Set(Uuid::new_v4()),
            image_name: Set(None),
            image_data: Set(None),
            created_at: NotSet,
            updated_at: NotSet,
            ..Default::default()
        },
    };

    active.title = Set(payload.title);
    active.slug = Set(payload.slug);
    active.description = Set(payload.description);
    active.price = Set(payload.price);
    active.category_id = Set(payload.category_id);
    active.diagonal = Set(payload.diagonal);
    active.display_type = Set(payload.display_type);
    active.processor_freq = Set(payload.processor_freq);
    active.ram = Set(payload.ram);
    active.video_card = Set(payload.video_card);
    active.battery_capacity = Set(payload.battery_capacity);
    if let Some(image) = image {
        active.image_name = Set(Some(image.file_name));
        active.image_data = Set(Some(image.bytes));
    }

    let saved = match id {
        Some(_) => active.update(conn).await,
        None => active.insert(conn).await,
    };
    saved.map_err(|err| AppError::from_unique(err, SLUG_TAKEN))
}

async fn save_smartphone<C: ConnectionTrait>(
    conn: &C,
    id: Option<Uuid>,
    payload: SmartphonePayload,
    image: Option<NormalizedImage>,
) -> AppResult<smartphones::Model> {
    let mut active = match id {
        Some(id) => {
            let existing = Smartphones::find_by_id(id)
                .one(conn)
                .await?
                .ok_or(AppError::NotFound)?;
            let mut active: SmartphoneActive = existing.into();
            active.updated_at = Set(Utc::now().into());
            active
        }
        None => SmartphoneActive {
            id: Set(Uuid::new_v4()),
            image_name: Set(None),
            image_data: Set(None),
            created_at: NotSet,
            updated_at: NotSet,
            ..Default::default()
        },
    };

    active.title = Set(payload.title);
    active.slug = Set(payload.slug);
    active.description = Set(payload.description);
    active.price = Set(payload.price);
    active.category_id = Set(payload.category_id);
    active.diagonal = Set(payload.diagonal);
    active.display_type = Set(payload.display_type);
    active.resolution = Set(payload.resolution);
    active.battery_capacity = Set(payload.battery_capacity);
    active.ram = Set(payload.ram);
    active.sd = Set(payload.sd);
    active.sd_max_volume = Set(payload.sd_max_volume);
    active.camera_main = Set(payload.camera_main);
    active.camera_frontal = Set(payload.camera_frontal);
    if let Some(image) = image {
        active.image_name = Set(Some(image.file_name));
        active.image_data = Set(Some(image.bytes));
    }

    let saved = match id {
        Some(_) => active.update(conn).await,
        None => active.insert(conn).await,
    };
    saved.map_err(|err| AppError::from_unique(err, SLUG_TAKEN))
}

async fn load_category<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<CategoryModel> {
    Categories::find()
        .filter(CategoryCol::Id.eq(id))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::BadRequest(admin::INVALID_CHOICE.to_string()))
}

fn normalize_upload(upload: ImageUpload) -> AppResult<NormalizedImage> {
    let file_name = upload.file_name.clone();
    imaging::normalize(upload).map_err(|err| {
        tracing::warn!(%file_name, error = %err, "image rejected");
        AppError::from(err)
    })
}
