use emporium::{
    config::AppConfig,
    db::{create_pool, create_orm_conn, run_migrations},
    middleware::auth::ROLE_STAFF,
    models::ProductKind,
    services::auth_service::hash_password,
};
use uuid::Uuid;

const STAFF_EMAIL: &str = "staff@example.com";
const STAFF_PASSWORD: &str = "staff123";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    let pool = create_pool(&config.database_url).await?;

    for (name, kind) in [
        ("Notebooks", ProductKind::Notebook),
        ("Smartphones", ProductKind::Smartphone),
    ] {
        ensure_category(&pool, name, kind.category_slug()).await?;
    }
    let staff_id = ensure_staff(&pool, STAFF_EMAIL, STAFF_PASSWORD).await?;

    println!("Seed completed. Staff ID: {staff_id}");
    Ok(())
}

async fn ensure_category(pool: &sqlx::PgPool, name: &str, slug: &str) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO categories (id, name, slug)
        VALUES ($1, $2, $3)
        ON CONFLICT (slug) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(slug)
    .execute(pool)
    .await?;

    println!("Ensured category {slug}");
    Ok(())
}

async fn ensure_staff(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, first_name, last_name, role)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind("Store")
    .bind("Staff")
    .bind(ROLE_STAFF)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={ROLE_STAFF})");
    Ok(user_id)
}
