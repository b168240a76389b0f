use std::{future::Future, str::FromStr};

use sqlx::{
    migrate::MigrateError,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Result, SqlitePool,
};

pub mod queries;

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // Every connection to `:memory:` is its own database, so keep exactly one
    // alive for the lifetime of the pool.
    if database_url.contains(":memory:") {
        return SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await;
    }

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

pub async fn run_migrations(pool: &SqlitePool) -> std::result::Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Whether a write failed on a `UNIQUE` constraint
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(e) if e.is_unique_violation())
}

/// Run `insert` with codes from `generate` until one is not already taken.
/// Returns `None` when every one of `attempts` codes collided.
pub async fn insert_with_fresh_code<T, G, F, Fut>(
    attempts: usize,
    mut generate: G,
    mut insert: F,
) -> Result<Option<T>>
where
    G: FnMut() -> String,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    for _ in 0..attempts {
        let code = generate();
        match insert(code.clone()).await {
            Err(e) if is_unique_violation(&e) => {
                tracing::debug!("Code {} is taken, drawing another", code);
            }
            result => return result.map(Some),
        }
    }
    Ok(None)
}
