pub mod auth_service;
pub mod cj_service;
pub mod order_service;
pub mod product_service;
pub mod stats_service;
pub mod trend_service;
