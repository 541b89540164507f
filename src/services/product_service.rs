use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::{AuditAction, record},
    dto::products::{
        ApplyMarkupRequest, BulkDeleteRequest, BulkDeleteResult, CategoryList, ProductList,
        UpdateProductRequest,
    },
    entity::products::{Column, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Product,
    pricing,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    user: &AuthUser,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(Column::UserId.eq(user.user_id));

    if let Some(category) = query.category.as_ref().filter(|c| !c.is_empty()) {
        condition = condition.add(Column::Category.eq(category.clone()));
    }

    if let Some(search) = query.search.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    let sort_col = match query.sort_by.unwrap_or(ProductSortBy::CreatedAt) {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::SellingPrice => Column::SellingPrice,
        ProductSortBy::Name => Column::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

async fn find_owned(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ProductModel> {
    Products::find_by_id(id)
        .filter(Column::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn get_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Product>> {
    let product = find_owned(state, user, id).await?;
    Ok(ApiResponse::success("Product", product_from_entity(product), None))
}

/// Pricing fields after merging an update onto the stored row.
#[derive(Debug, PartialEq)]
pub struct PriceUpdate {
    pub cost_price: Decimal,
    pub markup_percentage: Decimal,
    pub selling_price: Decimal,
}

/// A changed cost or markup always re-derives the selling price; an explicit
/// selling price is only kept when neither input changed.
pub fn merge_pricing(
    existing: &ProductModel,
    payload: &UpdateProductRequest,
) -> AppResult<PriceUpdate> {
    let cost_price = match payload.cost_price {
        Some(cost) => pricing::validate_cost(cost)?,
        None => existing.cost_price,
    };
    let markup_percentage = payload
        .markup_percentage
        .unwrap_or(existing.markup_percentage);

    if payload.markup_percentage.is_some() {
        pricing::validate_markup(markup_percentage)?;
    }

    let selling_price = if payload.cost_price.is_some() || payload.markup_percentage.is_some() {
        pricing::checked_selling_price(cost_price, markup_percentage)?
    } else if let Some(explicit) = payload.selling_price {
        let explicit = pricing::round_money(explicit);
        if explicit <= Decimal::ZERO {
            return Err(AppError::BadRequest(
                "selling price must be greater than 0".into(),
            ));
        }
        if explicit > pricing::MAX_PRICE {
            return Err(AppError::BadRequest(format!(
                "selling price must not exceed {}",
                pricing::MAX_PRICE
            )));
        }
        explicit
    } else {
        existing.selling_price
    };

    Ok(PriceUpdate {
        cost_price,
        markup_percentage,
        selling_price,
    })
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let existing = find_owned(state, user, id).await?;
    let prices = merge_pricing(&existing, &payload)?;

    let mut active = existing.into_active_model();
    if let Some(name) = payload.name.map(|n| n.trim().to_string()) {
        if name.is_empty() {
            return Err(AppError::BadRequest("name cannot be empty".into()));
        }
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(stock_status) = payload.stock_status {
        active.stock_status = Set(stock_status.as_str().to_string());
    }
    if let Some(category) = payload.category {
        active.category = Set(Some(category).filter(|c| !c.trim().is_empty()));
    }
    if let Some(images) = payload.images {
        active.images = Set(images);
    }
    if let Some(variants) = payload.variants {
        active.variants = Set(variants);
    }
    active.cost_price = Set(prices.cost_price);
    active.markup_percentage = Set(prices.markup_percentage);
    active.selling_price = Set(prices.selling_price);
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    record(
        &state.pool,
        user.user_id,
        AuditAction::ProductUpdate,
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product updated successfully",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Products::delete_many()
        .filter(Column::Id.eq(id))
        .filter(Column::UserId.eq(user.user_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    record(
        &state.pool,
        user.user_id,
        AuditAction::ProductDelete,
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product deleted successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn apply_markup(
    state: &AppState,
    user: &AuthUser,
    payload: ApplyMarkupRequest,
) -> AppResult<ApiResponse<ProductList>> {
    let markup = payload.markup_percentage;
    pricing::validate_markup(markup)?;

    // ROUND(numeric, 2) rounds half away from zero, matching `pricing::selling_price`.
    let items = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET selling_price = ROUND(cost_price * (1 + $1::numeric / 100), 2),
            markup_percentage = $1::numeric,
            updated_at = NOW()
        WHERE user_id = $2
        RETURNING *
        "#,
    )
    .bind(markup)
    .bind(user.user_id)
    .fetch_all(&state.pool)
    .await?;

    record(
        &state.pool,
        user.user_id,
        AuditAction::ProductsApplyMarkup,
        serde_json::json!({ "markup_percentage": markup, "count": items.len() }),
    )
    .await;

    let message = format!("Updated {} products with {}% markup", items.len(), markup);
    Ok(ApiResponse::success(message, ProductList { items }, Some(Meta::empty())))
}

pub async fn bulk_delete(
    state: &AppState,
    user: &AuthUser,
    payload: BulkDeleteRequest,
) -> AppResult<ApiResponse<BulkDeleteResult>> {
    if payload.product_ids.is_empty() {
        return Err(AppError::BadRequest("Product IDs array is required".into()));
    }

    let result = Products::delete_many()
        .filter(Column::Id.is_in(payload.product_ids.clone()))
        .filter(Column::UserId.eq(user.user_id))
        .exec(&state.orm)
        .await?;

    record(
        &state.pool,
        user.user_id,
        AuditAction::ProductsBulkDelete,
        serde_json::json!({ "product_ids": payload.product_ids, "deleted": result.rows_affected }),
    )
    .await;

    Ok(ApiResponse::success(
        format!("Deleted {} products", result.rows_affected),
        BulkDeleteResult {
            deleted_count: result.rows_affected,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_categories(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<CategoryList>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT DISTINCT category FROM products
        WHERE user_id = $1 AND category IS NOT NULL
        ORDER BY category
        "#,
    )
    .bind(user.user_id)
    .fetch_all(&state.pool)
    .await?;

    let categories = rows.into_iter().map(|(c,)| c).collect();
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { categories },
        Some(Meta::empty()),
    ))
}

fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        user_id: model.user_id,
        cj_product_id: model.cj_product_id,
        name: model.name,
        description: model.description,
        images: model.images,
        cost_price: model.cost_price,
        selling_price: model.selling_price,
        markup_percentage: model.markup_percentage,
        stock_status: model.stock_status,
        category: model.category,
        weight_kg: model.weight_kg,
        variants: model.variants,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn stored() -> ProductModel {
        let now = Utc::now().into();
        ProductModel {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            cj_product_id: Some("CJ-1".into()),
            name: "Lamp".into(),
            description: None,
            images: serde_json::json!([]),
            cost_price: dec("20.00"),
            selling_price: dec("26.00"),
            markup_percentage: dec("30"),
            stock_status: "in_stock".into(),
            category: None,
            weight_kg: None,
            variants: serde_json::json!([]),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn markup_change_recomputes_from_stored_cost() {
        let update = UpdateProductRequest {
            markup_percentage: Some(dec("50")),
            ..Default::default()
        };
        let prices = merge_pricing(&stored(), &update).unwrap();
        assert_eq!(prices.selling_price, dec("30.00"));
        assert_eq!(prices.cost_price, dec("20.00"));
    }

    #[test]
    fn cost_change_keeps_stored_markup() {
        let update = UpdateProductRequest {
            cost_price: Some(dec("10")),
            selling_price: Some(dec("99")),
            ..Default::default()
        };
        let prices = merge_pricing(&stored(), &update).unwrap();
        assert_eq!(prices.selling_price, dec("13.00"));
    }

    #[test]
    fn explicit_selling_price_without_cost_or_markup() {
        let update = UpdateProductRequest {
            selling_price: Some(dec("29.999")),
            ..Default::default()
        };
        let prices = merge_pricing(&stored(), &update).unwrap();
        assert_eq!(prices.selling_price, dec("30.00"));
        assert_eq!(prices.markup_percentage, dec("30"));
    }

    #[test]
    fn explicit_selling_price_rounds_half_away_from_zero() {
        let update = UpdateProductRequest {
            selling_price: Some(dec("10.125")),
            ..Default::default()
        };
        let prices = merge_pricing(&stored(), &update).unwrap();
        assert_eq!(prices.selling_price, dec("10.13"));
    }

    #[test]
    fn sub_cent_cost_is_stored_rounded() {
        let update = UpdateProductRequest {
            cost_price: Some(dec("10.005")),
            ..Default::default()
        };
        let prices = merge_pricing(&stored(), &update).unwrap();
        assert_eq!(prices.cost_price, dec("10.01"));
        assert_eq!(prices.selling_price, dec("13.01"));
    }

    #[test]
    fn oversized_prices_are_rejected() {
        let huge_cost = UpdateProductRequest {
            cost_price: Some(dec("100000000")),
            ..Default::default()
        };
        assert!(merge_pricing(&stored(), &huge_cost).is_err());

        let huge_explicit = UpdateProductRequest {
            selling_price: Some(dec("100000000")),
            ..Default::default()
        };
        assert!(merge_pricing(&stored(), &huge_explicit).is_err());
    }

    #[test]
    fn untouched_pricing_is_preserved() {
        let prices = merge_pricing(&stored(), &UpdateProductRequest::default()).unwrap();
        assert_eq!(prices.selling_price, dec("26.00"));
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let negative_markup = UpdateProductRequest {
            markup_percentage: Some(dec("-5")),
            ..Default::default()
        };
        assert!(merge_pricing(&stored(), &negative_markup).is_err());

        let zero_cost = UpdateProductRequest {
            cost_price: Some(Decimal::ZERO),
            ..Default::default()
        };
        assert!(merge_pricing(&stored(), &zero_cost).is_err());
    }
}
