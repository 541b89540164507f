use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod cj;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod products;
pub mod stats;
pub mod trends;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/cj", cj::router())
        .nest("/products", products::router())
        .nest("/orders", orders::route())
        .nest("/trends", trends::router())
        .nest("/stats", stats::router())
}
