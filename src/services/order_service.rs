use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::{AuditAction, record},
    cj::{self, CjOrder, OrderLine, ShippingAddress},
    dto::orders::{
        CreateOrderRequest, CreatedOrderResponse, OrderList, OrderStats, SyncResult,
        UpdateOrderStatusRequest,
    },
    entity::orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderStatus},
    response::{ApiResponse, Meta},
    routes::params::OrderListQuery,
    services::cj_service::{access_token, cj_failure},
    state::AppState,
};

/// Pay from the seller's CJ wallet balance.
const CJ_PAY_TYPE_BALANCE: i32 = 3;
const SYNC_PAGE_SIZE: i64 = 50;
const DEFAULT_COUNTRY_CODE: &str = "PH";
const DEFAULT_SHIPPING_METHOD: &str = "standard";

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        let status: OrderStatus = status.parse().map_err(AppError::BadRequest)?;
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }

    let finder = Orders::find()
        .filter(condition)
        .order_by_desc(OrderCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: orders },
        Some(meta),
    ))
}

async fn find_owned(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<OrderModel> {
    Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    let order = find_owned(state, user, id).await?;
    Ok(ApiResponse::success("OK", order_from_entity(order), Some(Meta::empty())))
}

fn required(value: &str, message: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(message.to_string()));
    }
    Ok(value.to_string())
}

/// Validates the request and builds the CJ order payload.
pub fn build_cj_order(payload: &CreateOrderRequest) -> AppResult<cj::CreateOrderRequest> {
    const MISSING: &str = "Product ID, customer name, phone, and address are required";
    let product_id = required(&payload.product_id, MISSING)?;
    let full_name = required(&payload.customer_name, MISSING)?;
    let phone = required(&payload.customer_phone, MISSING)?;
    let address = required(&payload.customer_address, MISSING)?;

    let quantity = payload.quantity.unwrap_or(1);
    if quantity < 1 {
        return Err(AppError::BadRequest("quantity must be at least 1".into()));
    }

    let country_code = payload
        .country_code
        .as_deref()
        .map(|c| c.trim().to_ascii_uppercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_COUNTRY_CODE.to_string());
    let country = (country_code == DEFAULT_COUNTRY_CODE).then(|| "Philippines".to_string());

    Ok(cj::CreateOrderRequest {
        products: vec![OrderLine {
            product_id,
            variant_id: payload.variant_id.clone().filter(|v| !v.trim().is_empty()),
            quantity,
        }],
        shipping_address: ShippingAddress {
            full_name: Some(full_name),
            phone: Some(phone),
            address: Some(address),
            country_code: Some(country_code),
            country,
        },
        shipping_method: payload
            .shipping_method
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SHIPPING_METHOD.to_string()),
        pay_type: CJ_PAY_TYPE_BALANCE,
    })
}

pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<CreatedOrderResponse>> {
    let cj_order = build_cj_order(&payload)?;
    let token = access_token(&state.pool, &state.cj, user.user_id).await?;

    let created = match state.cj.create_order(&token, &cj_order).await {
        Ok(created) => created,
        Err(err) => return Err(cj_failure(&state.pool, user.user_id, err).await),
    };

    let line = &cj_order.products[0];
    let address = &cj_order.shipping_address;
    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        cj_order_id: Set(created.order_id.clone()),
        order_number: Set(created.order_number.clone()),
        customer_name: Set(address.full_name.clone().unwrap_or_default()),
        customer_phone: Set(address.phone.clone().unwrap_or_default()),
        customer_address: Set(address.address.clone().unwrap_or_default()),
        products: Set(serde_json::json!([{
            "productId": line.product_id,
            "productName": payload.product_name,
            "variantId": line.variant_id,
            "quantity": line.quantity,
        }])),
        total_amount: Set(created.order_amount.unwrap_or(Decimal::ZERO)),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        tracking_number: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    record(
        &state.pool,
        user.user_id,
        AuditAction::OrderCreate,
        serde_json::json!({ "order_id": order.id, "cj_order_id": order.cj_order_id }),
    )
    .await;
    tracing::info!(user_id = %user.user_id, order_id = %order.id, "cj order created");

    Ok(ApiResponse::success(
        "Order created successfully",
        CreatedOrderResponse {
            order: order_from_entity(order),
            cj_order: created,
        },
        Some(Meta::empty()),
    ))
}

/// Inserts or refreshes one CJ order; returns true when a new row was created.
async fn upsert_cj_order(state: &AppState, user_id: Uuid, cj_order: &CjOrder) -> AppResult<bool> {
    let address = cj_order.shipping_address.clone().unwrap_or_default();
    let status = OrderStatus::from_cj(cj_order.order_status.as_deref());

    // xmax = 0 only for rows written by the INSERT branch.
    let (inserted,): (bool,) = sqlx::query_as(
        r#"
        INSERT INTO orders
            (id, user_id, cj_order_id, order_number, customer_name, customer_phone,
             customer_address, products, total_amount, status, tracking_number)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (user_id, cj_order_id) DO UPDATE
        SET status = EXCLUDED.status,
            tracking_number = EXCLUDED.tracking_number,
            updated_at = NOW()
        RETURNING (xmax = 0) AS inserted
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&cj_order.order_id)
    .bind(&cj_order.order_number)
    .bind(address.full_name.unwrap_or_default())
    .bind(address.phone.unwrap_or_default())
    .bind(address.address.unwrap_or_default())
    .bind(
        cj_order
            .products
            .clone()
            .unwrap_or_else(|| serde_json::json!([])),
    )
    .bind(cj_order.order_amount.unwrap_or(Decimal::ZERO))
    .bind(status.as_str())
    .bind(&cj_order.tracking_number)
    .fetch_one(&state.pool)
    .await?;

    Ok(inserted)
}

pub async fn sync_orders(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<SyncResult>> {
    let token = access_token(&state.pool, &state.cj, user.user_id).await?;

    let page = match state.cj.list_orders(&token, 1, SYNC_PAGE_SIZE).await {
        Ok(page) => page,
        Err(err) => return Err(cj_failure(&state.pool, user.user_id, err).await),
    };

    if page.list.is_empty() {
        return Ok(ApiResponse::success(
            "No orders found",
            SyncResult {
                synced: 0,
                updated: 0,
            },
            Some(Meta::empty()),
        ));
    }

    let mut synced = 0_u64;
    let mut updated = 0_u64;
    for cj_order in &page.list {
        if cj_order.order_id.trim().is_empty() {
            continue;
        }
        if upsert_cj_order(state, user.user_id, cj_order).await? {
            synced += 1;
        } else {
            updated += 1;
        }
    }

    record(
        &state.pool,
        user.user_id,
        AuditAction::OrdersSync,
        serde_json::json!({ "synced": synced, "updated": updated }),
    )
    .await;
    tracing::info!(user_id = %user.user_id, synced, updated, "cj orders synced");

    Ok(ApiResponse::success(
        format!("Synced {synced} new orders"),
        SyncResult { synced, updated },
        Some(Meta::empty()),
    ))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    let status: OrderStatus = payload.status.trim().parse().map_err(AppError::BadRequest)?;
    let existing = find_owned(state, user, id).await?;

    let mut active = existing.into_active_model();
    active.status = Set(status.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    record(
        &state.pool,
        user.user_id,
        AuditAction::OrderStatusUpdate,
        serde_json::json!({ "order_id": order.id, "status": order.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order status updated",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

pub async fn order_stats(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<OrderStats>> {
    let stats = sqlx::query_as::<_, OrderStats>(
        r#"
        SELECT
            COUNT(*) AS total_orders,
            COUNT(*) FILTER (WHERE status = 'pending') AS pending,
            COUNT(*) FILTER (WHERE status = 'processing') AS processing,
            COUNT(*) FILTER (WHERE status = 'shipped') AS shipped,
            COUNT(*) FILTER (WHERE status = 'delivered') AS delivered,
            COUNT(*) FILTER (WHERE status = 'cancelled') AS cancelled,
            COALESCE(SUM(total_amount) FILTER (WHERE status <> 'cancelled'), 0) AS total_revenue
        FROM orders
        WHERE user_id = $1
        "#,
    )
    .bind(user.user_id)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success("Order stats", stats, Some(Meta::empty())))
}

fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        cj_order_id: model.cj_order_id,
        order_number: model.order_number,
        customer_name: model.customer_name,
        customer_phone: model.customer_phone,
        customer_address: model.customer_address,
        products: model.products,
        total_amount: model.total_amount,
        status: model.status,
        tracking_number: model.tracking_number,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateOrderRequest {
        CreateOrderRequest {
            product_id: "CJ-100".into(),
            product_name: Some("Desk Lamp".into()),
            variant_id: None,
            quantity: None,
            customer_name: "Juan Dela Cruz".into(),
            customer_phone: "+63 900 000 0000".into(),
            customer_address: "1 Rizal Ave, Manila".into(),
            country_code: None,
            shipping_method: None,
        }
    }

    #[test]
    fn defaults_fill_quantity_country_and_method() {
        let order = build_cj_order(&request()).unwrap();
        assert_eq!(order.products[0].quantity, 1);
        assert_eq!(order.shipping_address.country_code.as_deref(), Some("PH"));
        assert_eq!(order.shipping_address.country.as_deref(), Some("Philippines"));
        assert_eq!(order.shipping_method, "standard");
        assert_eq!(order.pay_type, 3);
    }

    #[test]
    fn serializes_camel_case_for_cj() {
        let order = build_cj_order(&request()).unwrap();
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["shippingAddress"]["fullName"], "Juan Dela Cruz");
        assert_eq!(json["products"][0]["productId"], "CJ-100");
        assert_eq!(json["payType"], 3);
    }

    #[test]
    fn missing_customer_fields_are_rejected() {
        let mut req = request();
        req.customer_phone = "  ".into();
        assert!(matches!(build_cj_order(&req), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut req = request();
        req.quantity = Some(0);
        assert!(build_cj_order(&req).is_err());
    }

    #[test]
    fn other_countries_omit_country_name() {
        let mut req = request();
        req.country_code = Some("us".into());
        let order = build_cj_order(&req).unwrap();
        assert_eq!(order.shipping_address.country_code.as_deref(), Some("US"));
        assert!(order.shipping_address.country.is_none());
    }
}
