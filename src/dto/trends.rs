use serde::Serialize;
use utoipa::ToSchema;

use crate::models::TrendingProduct;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TrendOrigin {
    Cache,
    Demo,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrendList {
    pub trends: Vec<TrendingProduct>,
    pub origin: TrendOrigin,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AllTrends {
    pub google: Option<Vec<TrendingProduct>>,
    pub shopee: Option<Vec<TrendingProduct>>,
    pub lazada: Option<Vec<TrendingProduct>>,
    pub tiktok: Option<Vec<TrendingProduct>>,
    pub note: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResult {
    pub refreshed: u64,
}
