use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Order;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub product_id: String,
    pub product_name: Option<String>,
    pub variant_id: Option<String>,
    pub quantity: Option<i32>,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub customer_address: String,
    pub country_code: Option<String>,
    pub shipping_method: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    /// One of pending, processing, shipped, delivered, cancelled.
    #[schema(example = "shipped")]
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedOrderResponse {
    pub order: Order,
    #[schema(value_type = Object)]
    pub cj_order: crate::cj::CreatedOrder,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SyncResult {
    pub synced: u64,
    pub updated: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<Order>)]
    pub items: Vec<Order>,
}

#[derive(Debug, Default, Serialize, ToSchema, sqlx::FromRow)]
pub struct OrderStats {
    pub total_orders: i64,
    pub pending: i64,
    pub processing: i64,
    pub shipped: i64,
    pub delivered: i64,
    pub cancelled: i64,
    #[schema(value_type = String)]
    pub total_revenue: Decimal,
}
