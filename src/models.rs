use std::{fmt, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored CJ API key plus the bearer token exchanged for it. Never serialized.
#[derive(Debug, Clone, FromRow)]
pub struct CjCredential {
    pub id: Uuid,
    pub user_id: Uuid,
    pub api_key: String,
    pub access_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CjCredential {
    /// Tokens this close to expiry are treated as already expired.
    pub const EXPIRY_MARGIN_SECS: i64 = 60;

    /// The cached access token, if it is still usable at `now`.
    pub fn valid_token(&self, now: DateTime<Utc>) -> Option<&str> {
        let token = self.access_token.as_deref().filter(|t| !t.is_empty())?;
        let expires_at = self.token_expires_at?;
        if expires_at - Duration::seconds(Self::EXPIRY_MARGIN_SECS) > now {
            Some(token)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub user_id: Uuid,
    pub cj_product_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = Object)]
    pub images: Value,
    #[schema(value_type = String, example = "13.00")]
    pub cost_price: Decimal,
    #[schema(value_type = String, example = "16.90")]
    pub selling_price: Decimal,
    #[schema(value_type = String, example = "30")]
    pub markup_percentage: Decimal,
    pub stock_status: String,
    pub category: Option<String>,
    #[schema(value_type = Option<String>)]
    pub weight_kg: Option<Decimal>,
    #[schema(value_type = Object)]
    pub variants: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub cj_order_id: Option<String>,
    pub order_number: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    #[schema(value_type = Object)]
    pub products: Value,
    #[schema(value_type = String, example = "25.40")]
    pub total_amount: Decimal,
    pub status: String,
    pub tracking_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TrendingProduct {
    pub id: Uuid,
    pub source: String,
    pub product_name: String,
    pub search_volume: i32,
    pub category: Option<String>,
    pub price_range: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Maps a CJ order status onto the local lifecycle. Unknown values are pending.
    pub fn from_cj(status: Option<&str>) -> Self {
        let Some(status) = status else {
            return OrderStatus::Pending;
        };
        match status.trim().to_ascii_uppercase().as_str() {
            "PAID" | "UNSHIPPED" | "PROCESSING" => OrderStatus::Processing,
            "SHIPPED" => OrderStatus::Shipped,
            "DELIVERED" | "COMPLETED" => OrderStatus::Delivered,
            "CANCELLED" | "CANCELED" | "CLOSED" => OrderStatus::Cancelled,
            _ => OrderStatus::Pending,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Invalid status '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "in_stock",
            StockStatus::LowStock => "low_stock",
            StockStatus::OutOfStock => "out_of_stock",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TrendSource {
    Google,
    Shopee,
    Lazada,
    Tiktok,
}

impl TrendSource {
    pub const ALL: [TrendSource; 4] = [
        TrendSource::Google,
        TrendSource::Shopee,
        TrendSource::Lazada,
        TrendSource::Tiktok,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendSource::Google => "google",
            TrendSource::Shopee => "shopee",
            TrendSource::Lazada => "lazada",
            TrendSource::Tiktok => "tiktok",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(token: Option<&str>, expires_in_secs: Option<i64>) -> CjCredential {
        let now = Utc::now();
        CjCredential {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            api_key: "key".into(),
            access_token: token.map(str::to_string),
            token_expires_at: expires_in_secs.map(|s| now + Duration::seconds(s)),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn fresh_token_is_reused() {
        let cred = credential(Some("tok"), Some(3600));
        assert_eq!(cred.valid_token(Utc::now()), Some("tok"));
    }

    #[test]
    fn token_inside_margin_is_expired() {
        let cred = credential(Some("tok"), Some(30));
        assert_eq!(cred.valid_token(Utc::now()), None);
    }

    #[test]
    fn missing_token_or_expiry_is_invalid() {
        assert_eq!(credential(None, Some(3600)).valid_token(Utc::now()), None);
        assert_eq!(credential(Some("tok"), None).valid_token(Utc::now()), None);
        assert_eq!(credential(Some(""), Some(3600)).valid_token(Utc::now()), None);
    }

    #[test]
    fn order_status_parses_known_values_only() {
        assert_eq!("shipped".parse::<OrderStatus>(), Ok(OrderStatus::Shipped));
        assert!("SHIPPED".parse::<OrderStatus>().is_err());
        assert!("paid".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn cj_statuses_map_to_local_lifecycle() {
        assert_eq!(OrderStatus::from_cj(Some("CREATED")), OrderStatus::Pending);
        assert_eq!(OrderStatus::from_cj(Some("UNSHIPPED")), OrderStatus::Processing);
        assert_eq!(OrderStatus::from_cj(Some("shipped")), OrderStatus::Shipped);
        assert_eq!(OrderStatus::from_cj(Some("DELIVERED")), OrderStatus::Delivered);
        assert_eq!(OrderStatus::from_cj(Some("CANCELLED")), OrderStatus::Cancelled);
        assert_eq!(OrderStatus::from_cj(Some("SOMETHING_NEW")), OrderStatus::Pending);
        assert_eq!(OrderStatus::from_cj(None), OrderStatus::Pending);
    }

    #[test]
    fn user_serialization_omits_password_hash() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: "a@b.c".into(),
            password_hash: "secret".into(),
            full_name: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "a@b.c");
    }
}
