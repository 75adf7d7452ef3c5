use anyhow::Context;
use game_store_api::{
    db::{DbPool, create_pool, run_migrations},
    services::auth_service::hash_password,
};
use rust_decimal::{Decimal, dec};

struct SeedProduct {
    title: &'static str,
    price: Decimal,
    platforms: &'static [&'static str],
    image: &'static str,
    popularity: i64,
    is_subscription: bool,
}

fn game(
    title: &'static str,
    price: Decimal,
    platforms: &'static [&'static str],
    image: &'static str,
    popularity: i64,
) -> SeedProduct {
    SeedProduct {
        title,
        price,
        platforms,
        image,
        popularity,
        is_subscription: false,
    }
}

fn subscription(title: &'static str, price: Decimal, image: &'static str) -> SeedProduct {
    SeedProduct {
        title,
        price,
        platforms: &["Xbox Series X|S", "PC"],
        image,
        popularity: 0,
        is_subscription: true,
    }
}

fn products() -> Vec<SeedProduct> {
    vec![
        game("Grand Theft Auto V", dec!(89.90), &["PC", "PlayStation 5", "Xbox Series X|S"], "/img/gta-v.jpg", 980),
        game("The Witcher 3: Wild Hunt", dec!(59.90), &["PC", "PlayStation 4", "Xbox One", "Nintendo Switch"], "/img/witcher-3.jpg", 870),
        game("Red Dead Redemption 2", dec!(149.90), &["PC", "PlayStation 4", "Xbox One"], "/img/rdr2.jpg", 860),
        game("Forza Horizon 5", dec!(249.00), &["PC", "Xbox Series X|S"], "/img/forza-5.jpg", 720),
        game("Halo Infinite", dec!(199.00), &["PC", "Xbox Series X|S"], "/img/halo-infinite.jpg", 540),
        game("Hollow Knight", dec!(27.99), &["PC", "Nintendo Switch"], "/img/hollow-knight.jpg", 510),
        game("Stardew Valley", dec!(24.99), &["PC", "Nintendo Switch", "PlayStation 4"], "/img/stardew.jpg", 650),
        game("Elden Ring", dec!(229.90), &["PC", "PlayStation 5", "Xbox Series X|S"], "/img/elden-ring.jpg", 900),
        subscription("Game Pass Core", dec!(39.99), "/img/gamepass-core.png"),
        subscription("Game Pass Standard", dec!(54.99), "/img/gamepass-standard.png"),
        subscription("Game Pass Ultimate", dec!(69.99), "/img/gamepass-ultimate.png"),
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;

    let pool = create_pool(&database_url, 2).await?;
    run_migrations(&pool).await?;

    let user_id = ensure_user(&pool, "demo", "demo@example.com", "demo123", "Demo Player").await?;
    seed_products(&pool).await?;

    println!("Seed completed. Demo user ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &DbPool,
    username: &str,
    email: &str,
    password: &str,
    display_name: &str,
) -> anyhow::Result<i64> {
    let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    if let Some((id,)) = existing {
        println!("User {username} already present");
        return Ok(id);
    }

    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO users (username, email, password_hash, display_name)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(display_name)
    .fetch_one(pool)
    .await?;

    println!("Created user {username}");
    Ok(id)
}

async fn seed_products(pool: &DbPool) -> anyhow::Result<()> {
    let products = products();
    for product in &products {
        let platforms: Vec<String> = product.platforms.iter().map(|p| p.to_string()).collect();
        sqlx::query(
            r#"
            INSERT INTO products (title, price, platforms, image, popularity, is_subscription)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (title) DO NOTHING
            "#,
        )
        .bind(product.title)
        .bind(product.price)
        .bind(platforms)
        .bind(product.image)
        .bind(product.popularity)
        .bind(product.is_subscription)
        .execute(pool)
        .await?;
    }

    println!("Seeded {} products", products.len());
    Ok(())
}
