use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;

pub type OrmConn = DatabaseConnection;
pub type DbPool = sqlx::PgPool;

/// Create a SeaORM connection.
pub async fn create_orm_conn(database_url: &str) -> Result<OrmConn> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .max_connections(20)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    let conn = Database::connect(options).await?;
    Ok(conn)
}

/// The sqlx pool underneath the ORM connection, for raw queries.
pub fn pg_pool(conn: &OrmConn) -> &DbPool {
    conn.get_postgres_connection_pool()
}

/// Apply the SQL files in `migrations/` that have not run yet.
pub async fn run_migrations(conn: &OrmConn) -> Result<()> {
    sqlx::migrate!("./migrations").run(pg_pool(conn)).await?;
    Ok(())
}
