use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Product, StockStatus};

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>)]
    pub cost_price: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub selling_price: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub markup_percentage: Option<Decimal>,
    pub stock_status: Option<StockStatus>,
    pub category: Option<String>,
    #[schema(value_type = Option<Vec<String>>)]
    pub images: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub variants: Option<Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyMarkupRequest {
    #[schema(value_type = String, example = "35")]
    pub markup_percentage: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteRequest {
    pub product_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkDeleteResult {
    pub deleted_count: u64,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Serialize, ToSchema)]
pub struct CategoryList {
    pub categories: Vec<String>,
}
