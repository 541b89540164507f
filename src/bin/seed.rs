use rust_decimal::Decimal;
use uuid::Uuid;

use dropship_api::{
    config::AppConfig,
    db::{DbPool, create_pool, run_migrations},
    models::StockStatus,
    pricing::{self, DEFAULT_MARKUP_PERCENTAGE},
    services::{auth_service::hash_password, trend_service},
};

const DEMO_EMAIL: &str = "demo@example.com";
const DEMO_PASSWORD: &str = "demo1234";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let user_id = ensure_user(&pool, DEMO_EMAIL, DEMO_PASSWORD, "Demo Seller").await?;
    seed_products(&pool, user_id).await?;
    let trends = trend_service::refresh_cache(&pool).await?;

    println!("Seed completed. User ID: {user_id}, trend rows: {trends}");
    Ok(())
}

async fn ensure_user(
    pool: &DbPool,
    email: &str,
    password: &str,
    full_name: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, full_name)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET full_name = EXCLUDED.full_name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(full_name)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email}");
    Ok(user_id)
}

async fn seed_products(pool: &DbPool, user_id: Uuid) -> anyhow::Result<()> {
    // (cj_product_id, name, category, cost in centavos)
    let products = [
        ("DEMO-001", "Wireless Earbuds Pro", "Electronics", 45_000_i64),
        ("DEMO-002", "LED Strip Lights 5m", "Home", 18_950),
        ("DEMO-003", "Silicone Phone Case", "Accessories", 6_500),
        ("DEMO-004", "Insulated Tote Bag", "Fashion", 12_000),
    ];

    sqlx::query("DELETE FROM products WHERE user_id = $1 AND cj_product_id LIKE 'DEMO-%'")
        .bind(user_id)
        .execute(pool)
        .await?;

    for (cj_product_id, name, category, cost_cents) in products {
        let cost = Decimal::new(cost_cents, 2);
        let selling = pricing::selling_price(cost, DEFAULT_MARKUP_PERCENTAGE);
        sqlx::query(
            r#"
            INSERT INTO products
                (id, user_id, cj_product_id, name, cost_price, selling_price,
                 markup_percentage, stock_status, category)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(cj_product_id)
        .bind(name)
        .bind(cost)
        .bind(selling)
        .bind(DEFAULT_MARKUP_PERCENTAGE)
        .bind(StockStatus::InStock.as_str())
        .bind(category)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
