use sea_orm::Condition;

use crate::{
    dto::dashboard::{
        CategorySalesList, DashboardStats, MonthlyTrendList, RecentOrderList, StatusCountList,
        TopCustomerList, TopProducts,
    },
    error::AppResult,
    metrics,
    response::{ApiResponse, Meta},
    services::{customer_service, order_service, product_service},
    state::AppState,
};

// Every figure is recomputed from a full scan of the collections it needs.

pub async fn stats(state: &AppState) -> AppResult<ApiResponse<DashboardStats>> {
    let orders = order_service::load_orders(&state.orm, Condition::all()).await?;
    let customers = customer_service::load_customers(&state.orm).await?;

    Ok(ApiResponse::success(
        "Dashboard stats",
        metrics::dashboard_summary(&orders, &customers),
        Some(Meta::empty()),
    ))
}

pub async fn recent_orders(
    state: &AppState,
    limit: usize,
) -> AppResult<ApiResponse<RecentOrderList>> {
    let orders = order_service::load_orders(&state.orm, Condition::all()).await?;
    let customers = customer_service::load_customers(&state.orm).await?;

    Ok(ApiResponse::success(
        "Recent orders",
        RecentOrderList {
            items: metrics::recent_orders(&orders, &customers, limit),
        },
        Some(Meta::empty()),
    ))
}

pub async fn status_counts(state: &AppState) -> AppResult<ApiResponse<StatusCountList>> {
    let orders = order_service::load_orders(&state.orm, Condition::all()).await?;

    Ok(ApiResponse::success(
        "Order status counts",
        StatusCountList {
            items: metrics::status_counts(&orders),
        },
        Some(Meta::empty()),
    ))
}

pub async fn order_trends(state: &AppState) -> AppResult<ApiResponse<MonthlyTrendList>> {
    let orders = order_service::load_orders(&state.orm, Condition::all()).await?;

    Ok(ApiResponse::success(
        "Order trends",
        MonthlyTrendList {
            items: metrics::order_trends(&orders),
        },
        Some(Meta::empty()),
    ))
}

pub async fn top_products(state: &AppState, limit: usize) -> AppResult<ApiResponse<TopProducts>> {
    let orders = order_service::load_orders(&state.orm, Condition::all()).await?;
    let products = product_service::load_products(&state.orm).await?;

    Ok(ApiResponse::success(
        "Top products",
        metrics::top_products(&orders, &products, limit),
        Some(Meta::empty()),
    ))
}

pub async fn top_customers(
    state: &AppState,
    limit: usize,
) -> AppResult<ApiResponse<TopCustomerList>> {
    let orders = order_service::load_orders(&state.orm, Condition::all()).await?;
    let customers = customer_service::load_customers(&state.orm).await?;

    Ok(ApiResponse::success(
        "Top customers",
        TopCustomerList {
            items: metrics::top_customers(&orders, &customers, limit),
        },
        Some(Meta::empty()),
    ))
}

pub async fn sales_by_category(state: &AppState) -> AppResult<ApiResponse<CategorySalesList>> {
    let orders = order_service::load_orders(&state.orm, Condition::all()).await?;
    let products = product_service::load_products(&state.orm).await?;

    Ok(ApiResponse::success(
        "Sales by category",
        CategorySalesList {
            items: metrics::sales_by_category(&orders, &products),
        },
        Some(Meta::empty()),
    ))
}
