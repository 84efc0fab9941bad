use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::dashboard::{
        CategorySalesList, DashboardStats, LimitQuery, MonthlyTrendList, RecentOrderList,
        StatusCountList, TopCustomerList, TopProducts,
    },
    error::AppResult,
    middleware::extract::ApiQuery,
    response::ApiResponse,
    services::dashboard_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/recent-orders", get(recent_orders))
        .route("/status-counts", get(status_counts))
        .route("/trends", get(order_trends))
        .route("/top-products", get(top_products))
        .route("/top-customers", get(top_customers))
        .route("/sales-by-category", get(sales_by_category))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    responses(
        (status = 200, description = "Headline figures", body = ApiResponse<DashboardStats>)
    ),
    tag = "Dashboard"
)]
pub async fn stats(State(state): State<AppState>) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    let resp = dashboard_service::stats(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/recent-orders",
    params(LimitQuery),
    responses(
        (status = 200, description = "Most recent orders first", body = ApiResponse<RecentOrderList>)
    ),
    tag = "Dashboard"
)]
pub async fn recent_orders(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> AppResult<Json<ApiResponse<RecentOrderList>>> {
    let resp = dashboard_service::recent_orders(&state, query.normalize()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/status-counts",
    responses(
        (status = 200, description = "One entry per status", body = ApiResponse<StatusCountList>)
    ),
    tag = "Dashboard"
)]
pub async fn status_counts(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<StatusCountList>>> {
    let resp = dashboard_service::status_counts(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/trends",
    responses(
        (status = 200, description = "Orders and revenue per month", body = ApiResponse<MonthlyTrendList>)
    ),
    tag = "Dashboard"
)]
pub async fn order_trends(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<MonthlyTrendList>>> {
    let resp = dashboard_service::order_trends(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/top-products",
    params(LimitQuery),
    responses(
        (status = 200, description = "Best sellers by quantity", body = ApiResponse<TopProducts>)
    ),
    tag = "Dashboard"
)]
pub async fn top_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> AppResult<Json<ApiResponse<TopProducts>>> {
    let resp = dashboard_service::top_products(&state, query.normalize()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/top-customers",
    params(LimitQuery),
    responses(
        (status = 200, description = "Customers ranked by spend", body = ApiResponse<TopCustomerList>)
    ),
    tag = "Dashboard"
)]
pub async fn top_customers(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> AppResult<Json<ApiResponse<TopCustomerList>>> {
    let resp = dashboard_service::top_customers(&state, query.normalize()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/sales-by-category",
    responses(
        (status = 200, description = "Revenue per product category", body = ApiResponse<CategorySalesList>)
    ),
    tag = "Dashboard"
)]
pub async fn sales_by_category(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CategorySalesList>>> {
    let resp = dashboard_service::sales_by_category(&state).await?;
    Ok(Json(resp))
}
