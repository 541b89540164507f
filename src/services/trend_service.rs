//! Marketplace trend data. Real scrapers are not wired up; each source serves
//! its cached rows while they are fresh and falls back to a canned demo list.

use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::trends::{AllTrends, RefreshResult, TrendList, TrendOrigin},
    error::AppResult,
    models::{TrendSource, TrendingProduct},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub const SOURCE_LIMIT: i64 = 20;
pub const COMBINED_LIMIT: i64 = 10;

const ALL_TRENDS_NOTE: &str =
    "Trend data is cached hourly from demo feeds; connect Google Trends and marketplace scrapers for live data";

/// `(product_name, search_volume, category, price_range)`
type DemoRow = (&'static str, i32, &'static str, &'static str);

const GOOGLE_DEMO: [DemoRow; 8] = [
    ("Wireless Earbuds", 10000, "Electronics", "₱500-2000"),
    ("Phone Cases", 8500, "Accessories", "₱100-500"),
    ("Skincare Products", 7200, "Beauty", "₱200-1500"),
    ("LED Strip Lights", 6800, "Home", "₱300-1000"),
    ("Fitness Tracker", 5500, "Electronics", "₱1000-3000"),
    ("Face Mask", 5000, "Health", "₱50-300"),
    ("Tote Bags", 4500, "Fashion", "₱200-800"),
    ("Smart Watches", 4200, "Electronics", "₱1500-5000"),
];

const SHOPEE_DEMO: [DemoRow; 8] = [
    ("Summer Dresses", 15000, "Fashion", "₱300-800"),
    ("Bluetooth Speakers", 12000, "Electronics", "₱500-2000"),
    ("Vitamins & Supplements", 9800, "Health", "₱200-1500"),
    ("Baby Toys", 8500, "Baby & Kids", "₱200-1000"),
    ("Gaming Accessories", 7200, "Gaming", "₱500-3000"),
    ("Home Organization", 6500, "Home", "₱100-500"),
    ("Pet Supplies", 5800, "Pets", "₱200-1500"),
    ("Sneakers", 5200, "Fashion", "₱1500-5000"),
];

const LAZADA_DEMO: [DemoRow; 8] = [
    ("Laptops", 18000, "Electronics", "₱15000-50000"),
    ("Air Purifiers", 9500, "Home", "₱3000-10000"),
    ("Makeup Sets", 8200, "Beauty", "₱500-3000"),
    ("Kitchen Appliances", 7800, "Home", "₱1000-5000"),
    ("Men's Watches", 6200, "Fashion", "₱500-3000"),
    ("Wireless Chargers", 5500, "Electronics", "₱300-1500"),
    ("Yoga Mats", 4800, "Sports", "₱200-800"),
    ("Backpacks", 4200, "Fashion", "₱500-2000"),
];

const TIKTOK_DEMO: [DemoRow; 8] = [
    ("#TikTokMadeMeBuyIt", 50000, "General", "Various"),
    ("Skincare Routine", 25000, "Beauty", "₱500-3000"),
    ("Viral Gadgets", 18000, "Electronics", "₱500-5000"),
    ("Home Decor Hacks", 15000, "Home", "₱200-2000"),
    ("Food Hacks", 12000, "Food", "₱100-500"),
    ("Fitness Motivation", 10000, "Sports", "₱200-3000"),
    ("Fashion Tips", 8500, "Fashion", "₱300-2000"),
    ("DIY Crafts", 7000, "Crafts", "₱100-1000"),
];

fn demo_rows(source: TrendSource) -> &'static [DemoRow] {
    match source {
        TrendSource::Google => &GOOGLE_DEMO,
        TrendSource::Shopee => &SHOPEE_DEMO,
        TrendSource::Lazada => &LAZADA_DEMO,
        TrendSource::Tiktok => &TIKTOK_DEMO,
    }
}

/// Canned trend list for a source, ordered by search volume.
pub fn demo_trends(source: TrendSource) -> Vec<TrendingProduct> {
    let fetched_at = Utc::now();
    let mut trends: Vec<TrendingProduct> = demo_rows(source)
        .iter()
        .map(|(name, volume, category, price_range)| TrendingProduct {
            id: Uuid::new_v4(),
            source: source.as_str().to_string(),
            product_name: (*name).to_string(),
            search_volume: *volume,
            category: Some((*category).to_string()),
            price_range: Some((*price_range).to_string()),
            fetched_at,
        })
        .collect();
    trends.sort_by(|a, b| b.search_volume.cmp(&a.search_volume));
    trends
}

async fn fresh_cache(
    pool: &DbPool,
    source: TrendSource,
    limit: i64,
) -> AppResult<Vec<TrendingProduct>> {
    let rows = sqlx::query_as::<_, TrendingProduct>(
        r#"
        SELECT * FROM trending_products
        WHERE source = $1 AND fetched_at > NOW() - INTERVAL '1 hour'
        ORDER BY search_volume DESC
        LIMIT $2
        "#,
    )
    .bind(source.as_str())
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn trends_by_source(
    state: &AppState,
    source: TrendSource,
) -> AppResult<ApiResponse<TrendList>> {
    let cached = fresh_cache(&state.pool, source, SOURCE_LIMIT).await?;
    let list = if cached.is_empty() {
        tracing::debug!(source = source.as_str(), "trend cache cold; serving demo data");
        TrendList {
            trends: demo_trends(source),
            origin: TrendOrigin::Demo,
        }
    } else {
        TrendList {
            trends: cached,
            origin: TrendOrigin::Cache,
        }
    };

    Ok(ApiResponse::success(
        format!("{} trends", source.as_str()),
        list,
        Some(Meta::empty()),
    ))
}

pub async fn all_trends(state: &AppState) -> AppResult<ApiResponse<AllTrends>> {
    let non_empty = |rows: Vec<TrendingProduct>| Some(rows).filter(|r| !r.is_empty());

    let google = fresh_cache(&state.pool, TrendSource::Google, COMBINED_LIMIT).await?;
    let shopee = fresh_cache(&state.pool, TrendSource::Shopee, COMBINED_LIMIT).await?;
    let lazada = fresh_cache(&state.pool, TrendSource::Lazada, COMBINED_LIMIT).await?;
    let tiktok = fresh_cache(&state.pool, TrendSource::Tiktok, COMBINED_LIMIT).await?;

    Ok(ApiResponse::success(
        "All trends",
        AllTrends {
            google: non_empty(google),
            shopee: non_empty(shopee),
            lazada: non_empty(lazada),
            tiktok: non_empty(tiktok),
            note: ALL_TRENDS_NOTE.to_string(),
        },
        Some(Meta::empty()),
    ))
}

/// Replaces every source's cache rows with the current demo feed.
pub async fn refresh_cache(pool: &DbPool) -> AppResult<u64> {
    let mut tx = pool.begin().await?;
    let mut written = 0_u64;

    for source in TrendSource::ALL {
        sqlx::query("DELETE FROM trending_products WHERE source = $1")
            .bind(source.as_str())
            .execute(&mut *tx)
            .await?;

        for trend in demo_trends(source) {
            sqlx::query(
                r#"
                INSERT INTO trending_products
                    (id, source, product_name, search_volume, category, price_range, fetched_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(trend.id)
            .bind(&trend.source)
            .bind(&trend.product_name)
            .bind(trend.search_volume)
            .bind(&trend.category)
            .bind(&trend.price_range)
            .bind(trend.fetched_at)
            .execute(&mut *tx)
            .await?;
            written += 1;
        }
    }

    tx.commit().await?;
    Ok(written)
}

pub async fn refresh_trends(state: &AppState) -> AppResult<ApiResponse<RefreshResult>> {
    let refreshed = refresh_cache(&state.pool).await?;
    tracing::info!(refreshed, "trend cache refreshed");
    Ok(ApiResponse::success(
        "Trends refresh completed",
        RefreshResult { refreshed },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_source_has_demo_data_tagged_with_its_name() {
        for source in TrendSource::ALL {
            let trends = demo_trends(source);
            assert_eq!(trends.len(), 8);
            assert!(trends.iter().all(|t| t.source == source.as_str()));
        }
    }

    #[test]
    fn demo_trends_are_sorted_by_volume() {
        let trends = demo_trends(TrendSource::Tiktok);
        assert_eq!(trends[0].product_name, "#TikTokMadeMeBuyIt");
        assert!(
            trends
                .windows(2)
                .all(|w| w[0].search_volume >= w[1].search_volume)
        );
    }

    #[test]
    fn lazada_demo_leads_with_laptops_and_air_purifiers() {
        let trends = demo_trends(TrendSource::Lazada);
        let top: Vec<(&str, i32, Option<&str>)> = trends
            .iter()
            .take(2)
            .map(|t| (t.product_name.as_str(), t.search_volume, t.price_range.as_deref()))
            .collect();
        assert_eq!(
            top,
            vec![
                ("Laptops", 18000, Some("₱15000-50000")),
                ("Air Purifiers", 9500, Some("₱3000-10000")),
            ]
        );
    }

    #[test]
    fn google_demo_has_no_missing_volumes() {
        let tote = demo_trends(TrendSource::Google)
            .into_iter()
            .find(|t| t.product_name == "Tote Bags")
            .unwrap();
        assert_eq!(tote.search_volume, 4500);
    }
}
