use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::stats::DashboardStats,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::stats_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(dashboard_stats))
}

#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Dashboard totals", body = ApiResponse<DashboardStats>)
    ),
    tag = "Stats"
)]
pub async fn dashboard_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    let resp = stats_service::dashboard_stats(&state, &user).await?;
    Ok(Json(resp))
}
