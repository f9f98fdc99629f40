use std::io::Cursor;

use emporium::{
    admin::INVALID_CHOICE,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        auth::RegisterRequest,
        cart::{AddToCartRequest, UpdateQuantityRequest},
        categories::CreateCategoryRequest,
        orders::{CheckoutRequest, UpdateOrderStatusRequest},
        products::{NotebookPayload, ProductForm, ProductPayload, SmartphonePayload},
    },
    entity::{
        Notebooks, Smartphones, notebooks::ActiveModel as NotebookActive,
        users::ActiveModel as UserActive,
    },
    error::AppError,
    imaging::{ImageUpload, NORMALIZED_RESOLUTION},
    middleware::auth::{AuthUser, ROLE_CUSTOMER, ROLE_STAFF},
    models::{OrderStatus, Product, ProductKind, ProductRef},
    routes::params::{LatestQuery, OrderListQuery},
    specs::SD_MAX_CAPACITY_LABEL,
    services::{admin_service, auth_service, cart_service, order_service, product_service},
    state::AppState,
};
use chrono::Utc;
use image::{DynamicImage, ImageFormat, RgbImage};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, PaginatorTrait, Set, Statement};
use uuid::Uuid;

// Integration flow: staff stocks the catalog, a customer fills a cart and
// checks out, staff moves the order along.
#[tokio::test]
async fn catalog_cart_checkout_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    let staff = AuthUser {
        user_id: create_staff(&state).await?,
        role: ROLE_STAFF.into(),
    };
    let registered = auth_service::register_user(
        &state,
        RegisterRequest {
            email: "Buyer@Example.com".into(),
            password: "secret123".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
        },
    )
    .await?;
    let customer = AuthUser {
        user_id: registered.data.expect("user").id,
        role: ROLE_CUSTOMER.into(),
    };

    // Categories
    let notebooks = admin_service::create_category(
        &state,
        &staff,
        CreateCategoryRequest {
            name: "Notebooks".into(),
            slug: "notebooks".into(),
        },
    )
    .await?
    .data
    .expect("category");
    let smartphones = admin_service::create_category(
        &state,
        &staff,
        CreateCategoryRequest {
            name: "Smartphones".into(),
            slug: "smartphones".into(),
        },
    )
    .await?
    .data
    .expect("category");

    // Customers cannot manage the catalog
    let denied = product_service::create_product(
        &state,
        &customer,
        notebook_form(notebooks.id, "denied", None),
    )
    .await;
    assert!(matches!(denied, Err(AppError::Forbidden)));

    // A notebook with an in-bounds image is stored once, image normalized
    let created = product_service::create_product(
        &state,
        &staff,
        notebook_form(notebooks.id, "x1", Some(png(640, 480))),
    )
    .await?
    .data
    .expect("product");
    let notebook = created.reference();
    assert_eq!(notebook.kind, ProductKind::Notebook);

    let (file_name, bytes) = product_service::product_image(&state, ProductKind::Notebook, "x1").await?;
    assert_eq!(file_name, "x1.png");
    let stored = image::load_from_memory(&bytes)?;
    assert_eq!((stored.width(), stored.height()), NORMALIZED_RESOLUTION);

    // Out-of-bounds image: rejected, nothing written
    let rejected = product_service::create_product(
        &state,
        &staff,
        notebook_form(notebooks.id, "too-big", Some(png(900, 900))),
    )
    .await;
    assert!(matches!(rejected, Err(AppError::Image(_))));
    assert_eq!(Notebooks::find().count(&state.orm).await?, 1);

    // Smartphones may only live in the smartphones category
    let wrong_category = product_service::create_product(
        &state,
        &staff,
        ProductForm {
            payload: ProductPayload::Smartphone(phone_payload(notebooks.id)),
            image: None,
        },
    )
    .await;
    match wrong_category {
        Err(AppError::BadRequest(msg)) => assert_eq!(msg, INVALID_CHOICE),
        other => panic!("expected invalid choice, got {other:?}"),
    }
    assert_eq!(Smartphones::find().count(&state.orm).await?, 0);

    // A phone without an SD slot never keeps a max volume
    let mut phone = phone_payload(smartphones.id);
    phone.sd_max_volume = Some("128 GB".into());
    phone.price = Decimal::new(59_999, 2);
    let phone = product_service::create_product(
        &state,
        &staff,
        ProductForm {
            payload: ProductPayload::Smartphone(phone),
            image: Some(ImageUpload {
                file_name: "pixel.png".into(),
                bytes: png(300, 300),
            }),
        },
    )
    .await?
    .data
    .expect("product");
    let phone = match phone {
        Product::Smartphone(phone) => phone,
        other => panic!("expected a smartphone, got {other:?}"),
    };
    assert_eq!(phone.sd_max_volume, None);
    let phone_detail = product_service::product_detail(&state, ProductKind::Smartphone, "pixel")
        .await?
        .data
        .expect("detail");
    assert!(
        phone_detail
            .specification
            .iter()
            .all(|row| row.name != SD_MAX_CAPACITY_LABEL)
    );

    // Slugs are unique per variant
    let duplicate = product_service::create_product(
        &state,
        &staff,
        notebook_form(notebooks.id, "x1", None),
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    // Storefront reads
    let detail = product_service::product_detail(&state, ProductKind::Notebook, "x1")
        .await?
        .data
        .expect("detail");
    assert_eq!(detail.display_name, "Notebooks: Notebook x1");
    assert!(detail.specification_html.contains("<td>Video card</td>"));

    let sidebar = product_service::sidebar(&state).await?.data.expect("sidebar");
    let counts: Vec<(String, i64)> = sidebar
        .items
        .into_iter()
        .map(|entry| (entry.slug, entry.count))
        .collect();
    assert_eq!(
        counts,
        [("notebooks".to_string(), 1), ("smartphones".to_string(), 1)]
    );

    let latest = product_service::latest_products(
        &state,
        LatestQuery {
            kinds: Some("smartphone,notebook".into()),
            with_respect_to: Some("notebook".into()),
        },
    )
    .await?
    .data
    .expect("latest");
    let kinds: Vec<ProductKind> = latest.items.iter().map(|card| card.kind).collect();
    assert_eq!(kinds, [ProductKind::Notebook, ProductKind::Smartphone]);
    assert!(latest.items.iter().all(|card| card.has_image));

    // Two customers, same product, independent line items
    let other = AuthUser {
        user_id: auth_service::register_user(
            &state,
            RegisterRequest {
                email: "second@example.com".into(),
                password: "secret456".into(),
                first_name: "Grace".into(),
                last_name: "Hopper".into(),
            },
        )
        .await?
        .data
        .expect("user")
        .id,
        role: ROLE_CUSTOMER.into(),
    };
    let phone_ref = ProductRef::smartphone(phone.id);
    let mut phone_lines = Vec::new();
    for (buyer, quantity) in [(&customer, 2), (&other, 3)] {
        let view = cart_service::add_to_cart(
            &state,
            buyer,
            AddToCartRequest {
                product: phone_ref,
                quantity,
            },
        )
        .await?
        .data
        .expect("cart");
        phone_lines.push((view.cart.id, view.items[0].id, view.items[0].total_price));
    }
    assert_ne!(phone_lines[0].0, phone_lines[1].0);
    assert_ne!(phone_lines[0].1, phone_lines[1].1);
    assert_eq!(phone_lines[0].2, Decimal::new(119_998, 2));
    assert_eq!(phone_lines[1].2, Decimal::new(179_997, 2));
    let view = cart_service::remove_from_cart(&state, &customer, phone_lines[0].1)
        .await?
        .data
        .expect("cart");
    assert!(view.items.is_empty());
    assert_eq!(view.cart.total_price, Decimal::ZERO);

    // Cart: 2 x 1299.99
    let view = cart_service::add_to_cart(
        &state,
        &customer,
        AddToCartRequest {
            product: notebook,
            quantity: 2,
        },
    )
    .await?
    .data
    .expect("cart");
    assert_eq!(view.cart.total_products, 2);
    assert_eq!(view.cart.total_price, Decimal::new(259_998, 2));
    let line_id = view.items[0].id;

    let ghost = cart_service::add_to_cart(
        &state,
        &customer,
        AddToCartRequest {
            product: ProductRef::smartphone(Uuid::new_v4()),
            quantity: 1,
        },
    )
    .await;
    assert!(matches!(ghost, Err(AppError::UnresolvedProduct(_))));

    // Price change without a new image keeps the stored image
    let mut repriced = notebook_payload(notebooks.id, "x1");
    repriced.price = Decimal::new(99_999, 2);
    product_service::update_product(
        &state,
        &staff,
        notebook.id,
        ProductForm {
            payload: ProductPayload::Notebook(repriced),
            image: None,
        },
    )
    .await?;
    let (_, still_there) = product_service::product_image(&state, ProductKind::Notebook, "x1").await?;
    assert_eq!(still_there, bytes);

    // A rejected image on update leaves the stored row as it was
    let mut bad_update = notebook_payload(notebooks.id, "x1");
    bad_update.price = Decimal::new(1_000, 2);
    let rejected_update = product_service::update_product(
        &state,
        &staff,
        notebook.id,
        ProductForm {
            payload: ProductPayload::Notebook(bad_update),
            image: Some(ImageUpload {
                file_name: "x1-huge.png".into(),
                bytes: png(900, 900),
            }),
        },
    )
    .await;
    assert!(matches!(rejected_update, Err(AppError::Image(_))));
    match product_service::find_by_slug(&state.orm, ProductKind::Notebook, "x1").await? {
        Product::Notebook(stored) => {
            assert_eq!(stored.price, Decimal::new(99_999, 2));
            assert_eq!(stored.image_name.as_deref(), Some("x1.png"));
        }
        other => panic!("expected a notebook, got {other:?}"),
    }
    let (_, unchanged) = product_service::product_image(&state, ProductKind::Notebook, "x1").await?;
    assert_eq!(unchanged, bytes);

    let view = cart_service::update_quantity(
        &state,
        &customer,
        line_id,
        UpdateQuantityRequest { quantity: 3 },
    )
    .await?
    .data
    .expect("cart");
    assert_eq!(view.items[0].total_price, Decimal::new(299_997, 2));
    assert_eq!(view.cart.total_price, Decimal::new(299_997, 2));

    // Checkout
    let missing_phone = order_service::checkout(&state, &customer, CheckoutRequest::default()).await;
    assert!(matches!(missing_phone, Err(AppError::BadRequest(_))));

    let placed = order_service::checkout(
        &state,
        &customer,
        CheckoutRequest {
            phone: Some("+1 555 0100".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("order");
    assert_eq!(placed.order.status, OrderStatus::New);
    assert_eq!(placed.order.first_name, "Ada");
    let cart = placed.cart.expect("cart");
    assert!(cart.in_order);
    assert_eq!(cart.total_price, Decimal::new(299_997, 2));

    // The ordered cart is closed; the next view opens a fresh one
    let fresh = cart_service::view_cart(&state, &customer).await?.data.expect("cart");
    assert_ne!(fresh.cart.id, cart.id);
    assert!(fresh.items.is_empty());
    let empty = order_service::checkout(
        &state,
        &customer,
        CheckoutRequest {
            phone: Some("+1 555 0100".into()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(empty, Err(AppError::BadRequest(_))));

    // Staff moves the order along
    let updated = admin_service::update_order_status(
        &state,
        &staff,
        placed.order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::IsReady,
        },
    )
    .await?
    .data
    .expect("order");
    assert_eq!(updated.order.status, OrderStatus::IsReady);
    assert_eq!(updated.order.created_at, placed.order.created_at);
    assert!(updated.order.updated_at >= placed.order.updated_at);

    let mine = order_service::list_orders(&state, &customer, OrderListQuery::default())
        .await?
        .data
        .expect("orders");
    assert_eq!(mine.items.len(), 1);

    let forbidden = admin_service::list_all_orders(&state, &customer, OrderListQuery::default()).await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));

    // Products sharing a creation time come back newest id first
    let stamp = (Utc::now() + chrono::Duration::days(1)).fixed_offset();
    let mut ids = Vec::new();
    for n in 0..6 {
        let id = Uuid::new_v4();
        let payload = notebook_payload(notebooks.id, &format!("batch-{n}"));
        NotebookActive {
            id: Set(id),
            title: Set(payload.title),
            slug: Set(payload.slug),
            image_name: Set(None),
            image_data: Set(None),
            description: Set(payload.description),
            price: Set(payload.price),
            category_id: Set(payload.category_id),
            diagonal: Set(payload.diagonal),
            display_type: Set(payload.display_type),
            processor_freq: Set(payload.processor_freq),
            ram: Set(payload.ram),
            video_card: Set(payload.video_card),
            battery_capacity: Set(payload.battery_capacity),
            created_at: Set(stamp),
            updated_at: Set(stamp),
        }
        .insert(&state.orm)
        .await?;
        ids.push(id);
    }
    ids.sort_unstable_by(|a, b| b.cmp(a));
    let batch = product_service::latest_products(
        &state,
        LatestQuery {
            kinds: Some("notebook".into()),
            with_respect_to: None,
        },
    )
    .await?
    .data
    .expect("latest");
    let returned: Vec<Uuid> = batch.items.iter().map(|card| card.id).collect();
    assert_eq!(returned, ids[..5]);

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;
    let pool = create_pool(database_url).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE audit_logs, orders, cart_products, carts, customers, notebooks, smartphones, categories, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState { pool, orm })
}

async fn create_staff(state: &AppState) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set("staff@example.com".into()),
        password_hash: Set("dummy".into()),
        first_name: Set("Store".into()),
        last_name: Set("Staff".into()),
        role: Set(ROLE_STAFF.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode png");
    bytes
}

fn notebook_payload(category_id: Uuid, slug: &str) -> NotebookPayload {
    NotebookPayload {
        title: format!("Notebook {slug}"),
        slug: slug.into(),
        description: Some("Business ultrabook".into()),
        price: Decimal::new(129_999, 2),
        category_id,
        diagonal: "14\"".into(),
        display_type: "IPS".into(),
        processor_freq: "3.2 GHz".into(),
        ram: "16 GB".into(),
        video_card: "Intel Iris Xe".into(),
        battery_capacity: "57 Wh".into(),
    }
}

fn notebook_form(category_id: Uuid, slug: &str, image: Option<Vec<u8>>) -> ProductForm {
    ProductForm {
        payload: ProductPayload::Notebook(notebook_payload(category_id, slug)),
        image: image.map(|bytes| ImageUpload {
            file_name: format!("{slug}.png"),
            bytes,
        }),
    }
}

fn phone_payload(category_id: Uuid) -> SmartphonePayload {
    SmartphonePayload {
        title: "Pixel".into(),
        slug: "pixel".into(),
        description: None,
        price: Decimal::new(49_900, 2),
        category_id,
        diagonal: "6.1".into(),
        display_type: "OLED".into(),
        resolution: "1080x2400".into(),
        battery_capacity: "4000 mAh".into(),
        ram: "8 GB".into(),
        sd: false,
        sd_max_volume: None,
        camera_main: "50 MP".into(),
        camera_frontal: "12 MP".into(),
    }
}
