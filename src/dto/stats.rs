use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Default, Serialize, ToSchema, sqlx::FromRow)]
pub struct DashboardStats {
    pub total_products: i64,
    pub total_orders: i64,
    pub pending_orders: i64,
    #[schema(value_type = String)]
    pub total_revenue: Decimal,
}
