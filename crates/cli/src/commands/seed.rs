//! Seed command: role groups and a small sample catalog.
//!
//! Safe to run repeatedly; every insert is conditional on the row not
//! already existing.

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

struct SampleItem {
    title: &'static str,
    price: Decimal,
    featured: bool,
    inventory: i32,
    category_slug: &'static str,
}

const CATEGORIES: &[(&str, &str)] = &[
    ("Mains", "mains"),
    ("Desserts", "desserts"),
    ("Drinks", "drinks"),
];

fn sample_items() -> Vec<SampleItem> {
    vec![
        SampleItem {
            title: "Lemon herb chicken",
            price: Decimal::new(1450, 2),
            featured: true,
            inventory: 20,
            category_slug: "mains",
        },
        SampleItem {
            title: "Grilled halloumi",
            price: Decimal::new(1100, 2),
            featured: false,
            inventory: 15,
            category_slug: "mains",
        },
        SampleItem {
            title: "Lemon cake",
            price: Decimal::new(950, 2),
            featured: true,
            inventory: 12,
            category_slug: "desserts",
        },
        SampleItem {
            title: "Sparkling water",
            price: Decimal::new(275, 2),
            featured: false,
            inventory: 48,
            category_slug: "drinks",
        },
    ]
}

/// Seed role groups, categories and menu items.
///
/// # Errors
///
/// Returns `SeedError` if the database URL is missing or a statement fails.
pub async fn run() -> Result<(), SeedError> {
    let database_url =
        super::database_url().ok_or(SeedError::MissingEnvVar("BISTRO_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    // Role groups are created by the migrations; re-assert them so seeding
    // also works on databases that predate that migration step.
    sqlx::query(
        r"
        INSERT INTO bistro.role_group (name)
        VALUES ('Manager'), ('Delivery crew')
        ON CONFLICT (name) DO NOTHING
        ",
    )
    .execute(&pool)
    .await?;

    for (title, slug) in CATEGORIES {
        sqlx::query(
            r"
            INSERT INTO bistro.category (title, slug)
            VALUES ($1, $2)
            ON CONFLICT (slug) DO NOTHING
            ",
        )
        .bind(title)
        .bind(slug)
        .execute(&pool)
        .await?;
    }
    tracing::info!("Seeded {} categories", CATEGORIES.len());

    let items = sample_items();
    for item in &items {
        sqlx::query(
            r"
            INSERT INTO bistro.menu_item (title, price, featured, inventory, category_id)
            SELECT $1, $2, $3, $4, c.id
            FROM bistro.category c
            WHERE c.slug = $5
              AND NOT EXISTS (SELECT 1 FROM bistro.menu_item m WHERE m.title = $1)
            ",
        )
        .bind(item.title)
        .bind(item.price)
        .bind(item.featured)
        .bind(item.inventory)
        .bind(item.category_slug)
        .execute(&pool)
        .await?;
    }
    tracing::info!("Seeded {} menu items", items.len());

    Ok(())
}
