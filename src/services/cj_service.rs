//! CJ account connection, access-token lifecycle, catalog relay and import.
//!
//! The seller stores an API key once. Bearer tokens are exchanged for it
//! lazily, cached on the credential row until shortly before expiry, and
//! cleared whenever CJ rejects them so the next call re-exchanges.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    audit::{AuditAction, record},
    cj::{CjClient, CjError},
    db::DbPool,
    dto::cj::{CjPayload, ConnectionStatus, ImportProductRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CjCredential, Product, StockStatus},
    pricing::{self, DEFAULT_MARKUP_PERCENTAGE},
    response::{ApiResponse, Meta},
    routes::params::{CatalogQuery, ShippingQuery},
    state::AppState,
};

/// Token lifetime assumed when CJ does not report `expiresIn`.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 15 * 24 * 60 * 60;

const DEFAULT_SHIPPING_COUNTRY: &str = "PH";

pub async fn connect(
    state: &AppState,
    user: &AuthUser,
    api_key: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(AppError::BadRequest("API key is required".into()));
    }

    sqlx::query(
        r#"
        INSERT INTO cj_credentials (id, user_id, api_key)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id) DO UPDATE
        SET api_key = EXCLUDED.api_key,
            access_token = NULL,
            token_expires_at = NULL,
            updated_at = NOW()
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(api_key)
    .execute(&state.pool)
    .await?;

    record(&state.pool, user.user_id, AuditAction::CjConnect, serde_json::json!({})).await;
    tracing::info!(user_id = %user.user_id, "cj account connected");

    Ok(ApiResponse::success(
        "CJ account connected successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn disconnect(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM cj_credentials WHERE user_id = $1")
        .bind(user.user_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::CjNotConnected);
    }

    record(&state.pool, user.user_id, AuditAction::CjDisconnect, serde_json::json!({}))
        .await;

    Ok(ApiResponse::success(
        "CJ account disconnected",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn find_credential(pool: &DbPool, user_id: Uuid) -> AppResult<Option<CjCredential>> {
    let cred = sqlx::query_as::<_, CjCredential>("SELECT * FROM cj_credentials WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(cred)
}

/// Returns a usable CJ access token, exchanging the stored API key when the
/// cached token is missing or about to expire.
pub async fn access_token(pool: &DbPool, cj: &CjClient, user_id: Uuid) -> AppResult<String> {
    let cred = find_credential(pool, user_id)
        .await?
        .ok_or(AppError::CjNotConnected)?;

    if let Some(token) = cred.valid_token(Utc::now()) {
        return Ok(token.to_owned());
    }

    tracing::debug!(%user_id, "exchanging cj api key for access token");
    let issued = cj.get_access_token(&cred.api_key).await?;

    let expires_at = token_expiry(Utc::now(), issued.expires_in);

    sqlx::query(
        r#"
        UPDATE cj_credentials
        SET access_token = $1, token_expires_at = $2, updated_at = NOW()
        WHERE user_id = $3
        "#,
    )
    .bind(&issued.access_token)
    .bind(expires_at)
    .bind(user_id)
    .execute(pool)
    .await?;

    tracing::info!(%user_id, %expires_at, "cj access token refreshed");
    Ok(issued.access_token)
}

/// Expiry for a freshly issued token. Missing, non-positive or unrepresentable
/// lifetimes fall back to [`DEFAULT_TOKEN_TTL_SECS`].
pub fn token_expiry(now: DateTime<Utc>, expires_in: Option<i64>) -> DateTime<Utc> {
    let add = |secs: i64| Duration::try_seconds(secs).and_then(|ttl| now.checked_add_signed(ttl));
    expires_in
        .filter(|secs| *secs > 0)
        .and_then(add)
        .or_else(|| add(DEFAULT_TOKEN_TTL_SECS))
        .unwrap_or(now)
}

/// Drops the cached token but keeps the API key.
pub async fn invalidate_token(pool: &DbPool, user_id: Uuid) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE cj_credentials
        SET access_token = NULL, token_expires_at = NULL, updated_at = NOW()
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Converts a failed CJ call into an `AppError`, clearing the cached token
/// first when CJ rejected it.
pub async fn cj_failure(pool: &DbPool, user_id: Uuid, err: CjError) -> AppError {
    if err.is_auth_failure() {
        tracing::warn!(%user_id, error = %err, "cj rejected access token; invalidating");
        if let Err(db_err) = invalidate_token(pool, user_id).await {
            return db_err;
        }
    }
    AppError::Cj(err)
}

async fn relay<T>(state: &AppState, user: &AuthUser, result: Result<T, CjError>) -> AppResult<T> {
    match result {
        Ok(value) => Ok(value),
        Err(err) => Err(cj_failure(&state.pool, user.user_id, err).await),
    }
}

pub async fn status(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<ConnectionStatus>> {
    let disconnected = || {
        ApiResponse::success(
            "CJ status",
            ConnectionStatus {
                connected: false,
                balance: None,
            },
            Some(Meta::empty()),
        )
    };

    let token = match access_token(&state.pool, &state.cj, user.user_id).await {
        Ok(token) => token,
        Err(AppError::CjNotConnected | AppError::Cj(_)) => return Ok(disconnected()),
        Err(err) => return Err(err),
    };

    match state.cj.balance(&token).await {
        Ok(balance) => Ok(ApiResponse::success(
            "CJ status",
            ConnectionStatus {
                connected: true,
                balance: Some(balance).filter(|b| !b.is_null()),
            },
            Some(Meta::empty()),
        )),
        Err(err) => {
            tracing::warn!(user_id = %user.user_id, error = %err, "cj balance check failed");
            if err.is_auth_failure() {
                invalidate_token(&state.pool, user.user_id).await?;
            }
            Ok(disconnected())
        }
    }
}

pub async fn catalog(
    state: &AppState,
    user: &AuthUser,
    query: CatalogQuery,
) -> AppResult<ApiResponse<CjPayload>> {
    let (page, page_size, _) = query.pagination().normalize();
    let token = access_token(&state.pool, &state.cj, user.user_id).await?;

    let result = match query.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        Some(keyword) => {
            state
                .cj
                .search_products(&token, keyword, page, page_size)
                .await
        }
        None => state.cj.list_products(&token, page, page_size).await,
    };
    let data = relay(state, user, result).await?;

    Ok(ApiResponse::success("CJ products", CjPayload(data), None))
}

pub async fn product_detail(
    state: &AppState,
    user: &AuthUser,
    product_id: &str,
) -> AppResult<ApiResponse<CjPayload>> {
    let token = access_token(&state.pool, &state.cj, user.user_id).await?;
    let data = relay(state, user, state.cj.product_detail(&token, product_id).await).await?;
    if data.is_null() {
        return Err(AppError::NotFound);
    }
    Ok(ApiResponse::success("CJ product", CjPayload(data), None))
}

pub async fn categories(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CjPayload>> {
    let token = access_token(&state.pool, &state.cj, user.user_id).await?;
    let data = relay(state, user, state.cj.categories(&token).await).await?;
    Ok(ApiResponse::success("CJ categories", CjPayload(data), None))
}

pub async fn balance(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CjPayload>> {
    let token = access_token(&state.pool, &state.cj, user.user_id).await?;
    let data = relay(state, user, state.cj.balance(&token).await).await?;
    Ok(ApiResponse::success("CJ balance", CjPayload(data), None))
}

pub async fn shipping_rates(
    state: &AppState,
    user: &AuthUser,
    query: ShippingQuery,
) -> AppResult<ApiResponse<CjPayload>> {
    let product_id = query.product_id.trim();
    if product_id.is_empty() {
        return Err(AppError::BadRequest("productId is required".into()));
    }
    let country = query
        .country
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_SHIPPING_COUNTRY);

    let token = access_token(&state.pool, &state.cj, user.user_id).await?;
    let data = relay(
        state,
        user,
        state.cj.shipping_rates(&token, product_id, country).await,
    )
    .await?;
    Ok(ApiResponse::success("Shipping rates", CjPayload(data), None))
}

fn json_array_or_empty(value: Option<Value>) -> Value {
    match value {
        Some(Value::Null) | None => Value::Array(Vec::new()),
        Some(v) => v,
    }
}

pub async fn import_product(
    state: &AppState,
    user: &AuthUser,
    payload: ImportProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let cj_product_id = payload.cj_product_id.trim();
    let name = payload.name.trim();
    if cj_product_id.is_empty() || name.is_empty() {
        return Err(AppError::BadRequest(
            "Product ID, name, and cost price are required".into(),
        ));
    }
    let cost_price = payload.cost_price.ok_or_else(|| {
        AppError::BadRequest("Product ID, name, and cost price are required".into())
    })?;
    let cost_price = pricing::validate_cost(cost_price)?;
    let markup = payload.markup_percentage.unwrap_or(DEFAULT_MARKUP_PERCENTAGE);
    pricing::validate_markup(markup)?;
    let selling_price = pricing::checked_selling_price(cost_price, markup)?;

    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products
            (id, user_id, cj_product_id, name, description, images, cost_price,
             selling_price, markup_percentage, stock_status, category, weight_kg, variants)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(cj_product_id)
    .bind(name)
    .bind(payload.description.filter(|d| !d.trim().is_empty()))
    .bind(json_array_or_empty(payload.images))
    .bind(cost_price)
    .bind(selling_price)
    .bind(markup)
    .bind(StockStatus::InStock.as_str())
    .bind(payload.category.filter(|c| !c.trim().is_empty()))
    .bind(payload.weight_kg)
    .bind(json_array_or_empty(payload.variants))
    .fetch_one(&state.pool)
    .await?;

    record(
        &state.pool,
        user.user_id,
        AuditAction::ProductImport,
        serde_json::json!({ "product_id": product.id, "cj_product_id": product.cj_product_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product imported successfully",
        product,
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_json_defaults_to_empty_array() {
        assert_eq!(json_array_or_empty(None), serde_json::json!([]));
        assert_eq!(json_array_or_empty(Some(Value::Null)), serde_json::json!([]));
        assert_eq!(
            json_array_or_empty(Some(serde_json::json!(["a.jpg"]))),
            serde_json::json!(["a.jpg"])
        );
    }

    #[test]
    fn default_ttl_is_fifteen_days() {
        assert_eq!(DEFAULT_TOKEN_TTL_SECS, 1_296_000);
    }

    #[test]
    fn token_expiry_uses_reported_lifetime() {
        let now = Utc::now();
        assert_eq!(token_expiry(now, Some(3600)), now + Duration::hours(1));
    }

    #[test]
    fn token_expiry_falls_back_for_missing_or_bad_lifetimes() {
        let now = Utc::now();
        let fallback = now + Duration::seconds(DEFAULT_TOKEN_TTL_SECS);
        assert_eq!(token_expiry(now, None), fallback);
        assert_eq!(token_expiry(now, Some(0)), fallback);
        assert_eq!(token_expiry(now, Some(-30)), fallback);
        assert_eq!(token_expiry(now, Some(i64::MAX)), fallback);
        assert_eq!(token_expiry(now, Some(i64::MAX / 1000)), fallback);
    }
}
