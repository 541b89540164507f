use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{AuthResponse, LoginRequest, RegisterRequest, UpdatePasswordRequest},
        cj::{CjPayload, ConnectRequest, ConnectionStatus, ImportProductRequest},
        orders::{
            CreateOrderRequest, CreatedOrderResponse, OrderList, OrderStats, SyncResult,
            UpdateOrderStatusRequest,
        },
        products::{
            ApplyMarkupRequest, BulkDeleteRequest, BulkDeleteResult, CategoryList, ProductList,
            UpdateProductRequest,
        },
        stats::DashboardStats,
        trends::{AllTrends, RefreshResult, TrendList, TrendOrigin},
    },
    models::{Order, OrderStatus, Product, StockStatus, TrendSource, TrendingProduct, User},
    response::{ApiResponse, Meta},
    routes::{auth, cj, health, orders, params, products as product_routes, stats, trends},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::me,
        auth::change_password,
        cj::connect,
        cj::disconnect,
        cj::status,
        cj::catalog,
        cj::product_detail,
        cj::categories,
        cj::import_product,
        cj::balance,
        cj::shipping_rates,
        product_routes::list_products,
        product_routes::get_product,
        product_routes::update_product,
        product_routes::delete_product,
        product_routes::apply_markup,
        product_routes::bulk_delete,
        product_routes::list_categories,
        orders::list_order,
        orders::get_order,
        orders::create_order,
        orders::sync_orders,
        orders::update_order_status,
        orders::order_stats,
        trends::trends_by_source,
        trends::all_trends,
        trends::refresh_trends,
        stats::dashboard_stats
    ),
    components(
        schemas(
            User,
            Product,
            Order,
            OrderStatus,
            StockStatus,
            TrendSource,
            TrendingProduct,
            RegisterRequest,
            LoginRequest,
            UpdatePasswordRequest,
            AuthResponse,
            ConnectRequest,
            ConnectionStatus,
            CjPayload,
            ImportProductRequest,
            UpdateProductRequest,
            ApplyMarkupRequest,
            BulkDeleteRequest,
            BulkDeleteResult,
            CategoryList,
            ProductList,
            CreateOrderRequest,
            CreatedOrderResponse,
            UpdateOrderStatusRequest,
            SyncResult,
            OrderList,
            OrderStats,
            TrendList,
            TrendOrigin,
            AllTrends,
            RefreshResult,
            DashboardStats,
            params::ProductQuery,
            params::OrderListQuery,
            params::CatalogQuery,
            params::ShippingQuery,
            Meta,
            ApiResponse<User>,
            ApiResponse<AuthResponse>,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<Order>,
            ApiResponse<OrderList>,
            ApiResponse<TrendList>,
            ApiResponse<DashboardStats>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and account endpoints"),
        (name = "CJ", description = "CJDropShipping connection, catalog and import"),
        (name = "Products", description = "Imported product endpoints"),
        (name = "Orders", description = "Order placement and sync endpoints"),
        (name = "Trends", description = "Marketplace trend endpoints"),
        (name = "Stats", description = "Dashboard statistics"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
