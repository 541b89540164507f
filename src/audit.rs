//! Append-only audit trail of seller actions.

use serde_json::Value;
use uuid::Uuid;

use crate::{db::DbPool, error::AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    UserRegister,
    UserLogin,
    PasswordUpdate,
    CjConnect,
    CjDisconnect,
    ProductImport,
    ProductUpdate,
    ProductDelete,
    ProductsApplyMarkup,
    ProductsBulkDelete,
    OrderCreate,
    OrdersSync,
    OrderStatusUpdate,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::UserRegister => "user_register",
            AuditAction::UserLogin => "user_login",
            AuditAction::PasswordUpdate => "password_update",
            AuditAction::CjConnect => "cj_connect",
            AuditAction::CjDisconnect => "cj_disconnect",
            AuditAction::ProductImport => "product_import",
            AuditAction::ProductUpdate => "product_update",
            AuditAction::ProductDelete => "product_delete",
            AuditAction::ProductsApplyMarkup => "products_apply_markup",
            AuditAction::ProductsBulkDelete => "products_bulk_delete",
            AuditAction::OrderCreate => "order_create",
            AuditAction::OrdersSync => "orders_sync",
            AuditAction::OrderStatusUpdate => "order_status_update",
        }
    }

    /// Table the action touches.
    pub fn resource(&self) -> &'static str {
        match self {
            AuditAction::UserRegister | AuditAction::UserLogin | AuditAction::PasswordUpdate => {
                "users"
            }
            AuditAction::CjConnect | AuditAction::CjDisconnect => "cj_credentials",
            AuditAction::ProductImport
            | AuditAction::ProductUpdate
            | AuditAction::ProductDelete
            | AuditAction::ProductsApplyMarkup
            | AuditAction::ProductsBulkDelete => "products",
            AuditAction::OrderCreate | AuditAction::OrdersSync | AuditAction::OrderStatusUpdate => {
                "orders"
            }
        }
    }
}

async fn insert_entry(
    pool: &DbPool,
    user_id: Uuid,
    action: AuditAction,
    metadata: &Value,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, user_id, action, resource, metadata)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(action.as_str())
    .bind(action.resource())
    .bind(metadata)
    .execute(pool)
    .await?;

    Ok(())
}

/// Writes an audit row. A failed write is logged and never fails the request.
pub async fn record(pool: &DbPool, user_id: Uuid, action: AuditAction, metadata: Value) {
    if let Err(err) = insert_entry(pool, user_id, action, &metadata).await {
        tracing::warn!(error = %err, action = action.as_str(), %user_id, "audit log failed");
    }
}

#[cfg(test)]
mod tests {
    use super::AuditAction;

    #[test]
    fn actions_map_to_their_tables() {
        assert_eq!(AuditAction::CjConnect.resource(), "cj_credentials");
        assert_eq!(AuditAction::OrdersSync.resource(), "orders");
        assert_eq!(AuditAction::ProductsBulkDelete.as_str(), "products_bulk_delete");
    }
}
