use crate::{
    dto::stats::DashboardStats,
    error::AppResult,
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn dashboard_stats(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<DashboardStats>> {
    let stats = sqlx::query_as::<_, DashboardStats>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM products WHERE user_id = $1) AS total_products,
            (SELECT COUNT(*) FROM orders WHERE user_id = $1) AS total_orders,
            (SELECT COUNT(*) FROM orders WHERE user_id = $1 AND status = 'pending') AS pending_orders,
            (SELECT COALESCE(SUM(total_amount), 0) FROM orders
             WHERE user_id = $1 AND status <> 'cancelled') AS total_revenue
        "#,
    )
    .bind(user.user_id)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success("Dashboard stats", stats, Some(Meta::empty())))
}
