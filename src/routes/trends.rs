use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::trends::{AllTrends, RefreshResult, TrendList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::TrendSource,
    response::ApiResponse,
    services::trend_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/all", get(all_trends))
        .route("/refresh", post(refresh_trends))
        .route("/{source}", get(trends_by_source))
}

#[utoipa::path(
    get,
    path = "/api/trends/{source}",
    params(
        ("source" = TrendSource, Path, description = "google, shopee, lazada or tiktok")
    ),
    responses(
        (status = 200, description = "Trending products for one source", body = ApiResponse<TrendList>),
        (status = 400, description = "Unknown source")
    ),
    tag = "Trends"
)]
pub async fn trends_by_source(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(source): Path<TrendSource>,
) -> AppResult<Json<ApiResponse<TrendList>>> {
    let resp = trend_service::trends_by_source(&state, source).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/trends/all",
    responses(
        (status = 200, description = "Cached trends for every source", body = ApiResponse<AllTrends>)
    ),
    tag = "Trends"
)]
pub async fn all_trends(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<AllTrends>>> {
    let resp = trend_service::all_trends(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/trends/refresh",
    responses(
        (status = 200, description = "Trend cache rebuilt", body = ApiResponse<RefreshResult>)
    ),
    tag = "Trends"
)]
pub async fn refresh_trends(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<RefreshResult>>> {
    tracing::debug!(user_id = %user.user_id, "trend refresh requested");
    let resp = trend_service::refresh_trends(&state).await?;
    Ok(Json(resp))
}
