//! CLI subcommand implementations.

pub mod migrate;
pub mod seed;
pub mod staff;

/// Resolve the database URL from `BISTRO_DATABASE_URL` (falling back to
/// `DATABASE_URL`), loading `.env` first.
pub(crate) fn database_url() -> Option<String> {
    dotenvy::dotenv().ok();
    std::env::var("BISTRO_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
}
