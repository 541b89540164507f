use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub api_key: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConnectionStatus {
    pub connected: bool,
    #[schema(value_type = Option<Object>)]
    pub balance: Option<Value>,
}

/// Raw `data` payload relayed from the CJ API.
#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct CjPayload(pub Value);

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportProductRequest {
    #[serde(default)]
    pub cj_product_id: String,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = Option<Vec<String>>)]
    pub images: Option<Value>,
    #[schema(value_type = Option<String>, example = "12.50")]
    pub cost_price: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "30")]
    pub markup_percentage: Option<Decimal>,
    pub category: Option<String>,
    #[schema(value_type = Option<String>)]
    pub weight_kg: Option<Decimal>,
    #[schema(value_type = Option<Object>)]
    pub variants: Option<Value>,
}
