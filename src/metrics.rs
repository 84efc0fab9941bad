//! Derived dashboard and analytics figures.
//!
//! Every function here is a pure full scan over records already loaded into
//! memory. Cancelled orders never contribute revenue; plain order counts
//! (`total_orders`, status counts, monthly `orders`) still include them.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    dto::dashboard::{
        CategorySales, CustomerOrderSummary, DashboardStats, MonthlyTrend, RecentOrder,
        StatusCount, TopCustomer, TopProduct, TopProducts,
    },
    models::{Customer, Order, OrderStatus, Product},
};

pub const DEFAULT_LIMIT: usize = 5;

const UNKNOWN_CUSTOMER: &str = "Unknown Customer";

/// Revenue an order contributes: its total, or zero once cancelled.
pub fn order_revenue(order: &Order) -> Decimal {
    if order.status.is_cancelled() {
        Decimal::ZERO
    } else {
        order.total
    }
}

pub fn dashboard_summary(orders: &[Order], customers: &[Customer]) -> DashboardStats {
    let total_revenue = orders.iter().map(order_revenue).sum::<Decimal>();
    let pending_orders = orders
        .iter()
        .filter(|order| order.status == OrderStatus::Placed)
        .count();

    DashboardStats {
        total_revenue: total_revenue.round_dp(2),
        total_orders: orders.len() as i64,
        total_customers: customers.len() as i64,
        pending_orders: pending_orders as i64,
    }
}

pub fn recent_orders(orders: &[Order], customers: &[Customer], limit: usize) -> Vec<RecentOrder> {
    let names: HashMap<Uuid, &str> = customers
        .iter()
        .map(|customer| (customer.id, customer.name.as_str()))
        .collect();

    let mut sorted: Vec<&Order> = orders.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    sorted
        .into_iter()
        .take(limit)
        .map(|order| RecentOrder {
            id: order.id,
            customer: names
                .get(&order.customer_id)
                .copied()
                .unwrap_or("Unknown")
                .to_string(),
            date: order.created_at,
            status: order.status,
            total: format_currency(order.total),
        })
        .collect()
}

fn status_color(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Placed => "#3b82f6",
        OrderStatus::Shipped => "#f59e0b",
        OrderStatus::Delivered => "#10b981",
        OrderStatus::Cancelled => "#ef4444",
    }
}

pub fn status_counts(orders: &[Order]) -> Vec<StatusCount> {
    OrderStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            key: status,
            status: status.label().to_string(),
            count: orders.iter().filter(|order| order.status == status).count() as i64,
            color: status_color(status).to_string(),
        })
        .collect()
}

pub fn order_trends(orders: &[Order]) -> Vec<MonthlyTrend> {
    let mut months: BTreeMap<String, MonthlyTrend> = BTreeMap::new();

    for order in orders {
        let key = order.created_at.format("%Y-%m").to_string();
        let entry = months.entry(key.clone()).or_insert_with(|| MonthlyTrend {
            month: key,
            name: order.created_at.format("%b").to_string(),
            orders: 0,
            revenue: Decimal::ZERO,
        });
        entry.orders += 1;
        entry.revenue += order_revenue(order);
    }

    months
        .into_values()
        .map(|mut trend| {
            trend.revenue = trend.revenue.round_dp(2);
            trend
        })
        .collect()
}

pub fn top_products(orders: &[Order], products: &[Product], n: usize) -> TopProducts {
    let catalog: HashMap<Uuid, &Product> =
        products.iter().map(|product| (product.id, product)).collect();
    let mut sold: HashMap<Uuid, (i64, Decimal)> = HashMap::new();

    for order in orders.iter().filter(|order| !order.status.is_cancelled()) {
        for item in &order.items {
            let Some(product) = catalog.get(&item.product_id) else {
                continue;
            };
            let entry = sold.entry(product.id).or_insert((0, Decimal::ZERO));
            entry.0 += i64::from(item.quantity);
            entry.1 += product.price * Decimal::from(item.quantity);
        }
    }

    let mut items: Vec<TopProduct> = sold
        .into_iter()
        .filter_map(|(id, (quantity, revenue))| {
            catalog.get(&id).map(|product| TopProduct {
                id,
                name: product.name.clone(),
                category: product.category.clone(),
                image_url: product.image_url.clone(),
                quantity,
                revenue: revenue.round_dp(2),
            })
        })
        .collect();
    items.sort_by(|a, b| b.quantity.cmp(&a.quantity).then_with(|| a.name.cmp(&b.name)));
    items.truncate(n);

    let total_sold = items.iter().map(|item| item.quantity).sum();
    TopProducts { items, total_sold }
}

pub fn top_customers(orders: &[Order], customers: &[Customer], n: usize) -> Vec<TopCustomer> {
    let directory: HashMap<Uuid, &Customer> = customers
        .iter()
        .map(|customer| (customer.id, customer))
        .collect();
    let mut spending: HashMap<Uuid, (i64, Decimal)> = HashMap::new();

    for order in orders.iter().filter(|order| !order.status.is_cancelled()) {
        let entry = spending
            .entry(order.customer_id)
            .or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += order.total;
    }

    let mut ranked: Vec<TopCustomer> = spending
        .into_iter()
        .map(|(id, (total_orders, total_spent))| {
            let customer = directory.get(&id);
            TopCustomer {
                id,
                name: customer
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string()),
                email: customer.map(|c| c.email.clone()).unwrap_or_default(),
                total_orders,
                total_spent: total_spent.round_dp(2),
            }
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.total_spent
            .cmp(&a.total_spent)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(n);
    ranked
}

/// `None` when the customer has no non-cancelled orders.
pub fn customer_order_summary(customer_id: Uuid, orders: &[Order]) -> Option<CustomerOrderSummary> {
    let placed: Vec<&Order> = orders
        .iter()
        .filter(|order| order.customer_id == customer_id && !order.status.is_cancelled())
        .collect();

    let last_order_date = placed.iter().map(|order| order.created_at).max()?;
    let total_spent = placed.iter().map(|order| order.total).sum::<Decimal>();

    Some(CustomerOrderSummary {
        total_orders: placed.len() as i64,
        total_spent: total_spent.round_dp(2),
        last_order_date,
    })
}

pub fn sales_by_category(orders: &[Order], products: &[Product]) -> Vec<CategorySales> {
    let catalog: HashMap<Uuid, &Product> =
        products.iter().map(|product| (product.id, product)).collect();
    let mut by_category: HashMap<&str, Decimal> = HashMap::new();

    for order in orders.iter().filter(|order| !order.status.is_cancelled()) {
        for item in &order.items {
            if let Some(product) = catalog.get(&item.product_id) {
                *by_category
                    .entry(product.category.as_str())
                    .or_insert(Decimal::ZERO) += product.price * Decimal::from(item.quantity);
            }
        }
    }

    let mut sales: Vec<CategorySales> = by_category
        .into_iter()
        .map(|(category, revenue)| CategorySales {
            category: category.to_string(),
            revenue: revenue.round_dp(2),
        })
        .collect();
    sales.sort_by(|a, b| {
        b.revenue
            .cmp(&a.revenue)
            .then_with(|| a.category.cmp(&b.category))
    });
    sales
}

/// US-dollar rendering with thousands separators, e.g. `$1,234.50`.
pub fn format_currency(amount: Decimal) -> String {
    let amount = amount.round_dp(2);
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${grouped}.{cents}")
}
