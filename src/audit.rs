use serde_json::Value;
use uuid::Uuid;

use crate::{
    db::{DbPool, pg_pool},
    error::AppResult,
    state::AppState,
};

pub async fn log_audit(
    pool: &DbPool,
    customer_id: Option<Uuid>,
    action: &str,
    resource: Option<&str>,
    metadata: Option<Value>,
) -> AppResult<()> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, customer_id, action, resource, metadata)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(id)
    .bind(customer_id)
    .bind(action)
    .bind(resource)
    .bind(metadata)
    .execute(pool)
    .await?;

    Ok(())
}

/// Best-effort audit entry: a failed insert is logged and otherwise ignored.
pub async fn record(
    state: &AppState,
    customer_id: Option<Uuid>,
    action: &str,
    resource: &str,
    metadata: Value,
) {
    if let Err(err) = log_audit(
        pg_pool(&state.orm),
        customer_id,
        action,
        Some(resource),
        Some(metadata),
    )
    .await
    {
        tracing::warn!(error = %err, action, "audit log failed");
    }
}
