use restaurant_pos_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let kitchen = ensure_station(&pool, "Cocina").await?;
    let bar = ensure_station(&pool, "Bar").await?;

    let tacos = ensure_category(&pool, "Tacos", "🌮", kitchen).await?;
    let mains = ensure_category(&pool, "Platos fuertes", "🍽️", kitchen).await?;
    let drinks = ensure_category(&pool, "Bebidas", "🥤", bar).await?;
    seed_products(&pool, tacos, mains, drinks).await?;

    let salon = ensure_zone(&pool, "Salón", 1).await?;
    let terrace = ensure_zone(&pool, "Terraza", 1).await?;
    seed_tables(&pool, &config, salon, terrace).await?;

    println!("Seed completed. Stations: kitchen={kitchen}, bar={bar}");
    Ok(())
}

async fn ensure_station(pool: &sqlx::PgPool, name: &str) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO stations (id, name)
        VALUES ($1, $2)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .fetch_one(pool)
    .await?;

    println!("Ensured station {name}");
    Ok(id)
}

async fn ensure_category(
    pool: &sqlx::PgPool,
    name: &str,
    icon: &str,
    station_id: Uuid,
) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO categories (id, name, icon, station_id)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (name) DO UPDATE SET station_id = EXCLUDED.station_id
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(icon)
    .bind(station_id)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn seed_products(
    pool: &sqlx::PgPool,
    tacos: Uuid,
    mains: Uuid,
    drinks: Uuid,
) -> anyhow::Result<()> {
    // (name, category, price in cents, prep minutes)
    let products = vec![
        ("Taco al pastor", tacos, 2500_i64, 8),
        ("Taco de suadero", tacos, 2500, 8),
        ("Quesadilla", tacos, 4000, 10),
        ("Enchiladas verdes", mains, 12000, 18),
        ("Arrachera", mains, 22000, 25),
        ("Agua de horchata", drinks, 3500, 2),
        ("Cerveza", drinks, 4500, 1),
    ];

    for (name, category_id, price, prep) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, category_id, name, price, stock, prep_time_minutes)
            VALUES ($1, $2, $3, $4, 100, $5)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(category_id)
        .bind(name)
        .bind(price)
        .bind(prep)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}

async fn ensure_zone(pool: &sqlx::PgPool, name: &str, floor: i32) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM zones WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO zones (id, name, floor) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(name)
        .bind(floor)
        .execute(pool)
        .await?;
    println!("Created zone {name}");
    Ok(id)
}

async fn seed_tables(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    salon: Uuid,
    terrace: Uuid,
) -> anyhow::Result<()> {
    for n in 1..=8 {
        let id = Uuid::new_v4();
        let zone = if n <= 5 { salon } else { terrace };
        sqlx::query(
            r#"
            INSERT INTO tables (id, zone_id, number, capacity, x_position, y_position, shape, qr_code)
            VALUES ($1, $2, $3, 4, $4, $5, 'square', $6)
            ON CONFLICT (number) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(zone)
        .bind(n.to_string())
        .bind((n - 1) % 4 * 120)
        .bind((n - 1) / 4 * 120)
        .bind(config.table_menu_url(id))
        .execute(pool)
        .await?;
    }

    println!("Seeded tables");
    Ok(())
}
