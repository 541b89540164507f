use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::cj::{CjPayload, ConnectRequest, ConnectionStatus, ImportProductRequest},
    error::AppResult,
    middleware::{auth::AuthUser, json::AppJson},
    models::Product,
    response::ApiResponse,
    routes::params::{CatalogQuery, ShippingQuery},
    services::cj_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/connect", post(connect).delete(disconnect))
        .route("/status", get(status))
        .route("/products", get(catalog))
        .route("/products/{product_id}", get(product_detail))
        .route("/categories", get(categories))
        .route("/import", post(import_product))
        .route("/balance", get(balance))
        .route("/shipping", get(shipping_rates))
}

#[utoipa::path(
    post,
    path = "/api/cj/connect",
    request_body = ConnectRequest,
    responses(
        (status = 200, description = "API key stored"),
        (status = 400, description = "API key missing")
    ),
    tag = "CJ"
)]
pub async fn connect(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<ConnectRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = cj_service::connect(&state, &user, &payload.api_key).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cj/connect",
    responses(
        (status = 200, description = "Credentials removed"),
        (status = 400, description = "CJ account not connected")
    ),
    tag = "CJ"
)]
pub async fn disconnect(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = cj_service::disconnect(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/cj/status",
    responses(
        (status = 200, description = "Connection status", body = ApiResponse<ConnectionStatus>)
    ),
    tag = "CJ"
)]
pub async fn status(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ConnectionStatus>>> {
    let resp = cj_service::status(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/cj/products",
    params(CatalogQuery),
    responses(
        (status = 200, description = "CJ catalog page", body = ApiResponse<CjPayload>),
        (status = 400, description = "CJ account not connected or CJ rejected the call"),
        (status = 502, description = "CJ unreachable")
    ),
    tag = "CJ"
)]
pub async fn catalog(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<CatalogQuery>,
) -> AppResult<Json<ApiResponse<CjPayload>>> {
    let resp = cj_service::catalog(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/cj/products/{product_id}",
    params(
        ("product_id" = String, Path, description = "CJ product ID")
    ),
    responses(
        (status = 200, description = "CJ product detail", body = ApiResponse<CjPayload>),
        (status = 404, description = "Product not found")
    ),
    tag = "CJ"
)]
pub async fn product_detail(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<String>,
) -> AppResult<Json<ApiResponse<CjPayload>>> {
    let resp = cj_service::product_detail(&state, &user, &product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/cj/categories",
    responses(
        (status = 200, description = "CJ category tree", body = ApiResponse<CjPayload>)
    ),
    tag = "CJ"
)]
pub async fn categories(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CjPayload>>> {
    let resp = cj_service::categories(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cj/import",
    request_body = ImportProductRequest,
    responses(
        (status = 201, description = "Product imported", body = ApiResponse<Product>),
        (status = 400, description = "Invalid input")
    ),
    tag = "CJ"
)]
pub async fn import_product(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<ImportProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let resp = cj_service::import_product(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/cj/balance",
    responses(
        (status = 200, description = "CJ wallet balance", body = ApiResponse<CjPayload>)
    ),
    tag = "CJ"
)]
pub async fn balance(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CjPayload>>> {
    let resp = cj_service::balance(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/cj/shipping",
    params(ShippingQuery),
    responses(
        (status = 200, description = "Shipping rates", body = ApiResponse<CjPayload>),
        (status = 400, description = "productId missing")
    ),
    tag = "CJ"
)]
pub async fn shipping_rates(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ShippingQuery>,
) -> AppResult<Json<ApiResponse<CjPayload>>> {
    let resp = cj_service::shipping_rates(&state, &user, query).await?;
    Ok(Json(resp))
}
