use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::OrderStatus;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_revenue: Decimal,
    pub total_orders: i64,
    pub total_customers: i64,
    pub pending_orders: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecentOrder {
    pub id: Uuid,
    /// Customer display name, "Unknown" when the reference does not resolve.
    pub customer: String,
    pub date: DateTime<Utc>,
    pub status: OrderStatus,
    /// Currency formatted, e.g. `$1,250.00`.
    pub total: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusCount {
    pub key: OrderStatus,
    pub status: String,
    pub count: i64,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonthlyTrend {
    /// `YYYY-MM`
    pub month: String,
    pub name: String,
    pub orders: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TopProduct {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub image_url: Option<String>,
    pub quantity: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TopProducts {
    pub items: Vec<TopProduct>,
    /// Units sold across `items` only.
    pub total_sold: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TopCustomer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub total_orders: i64,
    pub total_spent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CustomerOrderSummary {
    pub total_orders: i64,
    pub total_spent: Decimal,
    pub last_order_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategorySales {
    pub category: String,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(transparent)]
pub struct RecentOrderList {
    #[schema(value_type = Vec<RecentOrder>)]
    pub items: Vec<RecentOrder>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitQuery {
    /// Number of rows to return, default 5, max 50.
    pub limit: Option<usize>,
}

impl LimitQuery {
    pub fn normalize(&self) -> usize {
        self.limit.unwrap_or(5).clamp(1, 50)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(transparent)]
pub struct StatusCountList {
    #[schema(value_type = Vec<StatusCount>)]
    pub items: Vec<StatusCount>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(transparent)]
pub struct MonthlyTrendList {
    #[schema(value_type = Vec<MonthlyTrend>)]
    pub items: Vec<MonthlyTrend>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(transparent)]
pub struct TopCustomerList {
    #[schema(value_type = Vec<TopCustomer>)]
    pub items: Vec<TopCustomer>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategorySalesList {
    #[schema(value_type = Vec<CategorySales>)]
    pub items: Vec<CategorySales>,
}
