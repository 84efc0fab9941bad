use chrono::{DateTime, TimeZone, Utc};
use order_admin_api::{
    metrics,
    models::{Customer, LineItem, Order, OrderStatus, Product},
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
}

fn money(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

fn customer(name: &str, email: &str) -> Customer {
    Customer {
        id: Uuid::new_v4(),
        name: name.into(),
        email: email.into(),
        phone: String::new(),
        address: String::new(),
        created_at: at(2024, 12, 1),
        updated_at: at(2024, 12, 1),
    }
}

fn product(name: &str, category: &str, price: Decimal) -> Product {
    Product {
        id: Uuid::new_v4(),
        name: name.into(),
        category: category.into(),
        price,
        description: None,
        image_url: None,
        created_at: at(2024, 12, 1),
        updated_at: at(2024, 12, 1),
    }
}

fn order(
    customer_id: Uuid,
    items: &[(Uuid, i32)],
    status: OrderStatus,
    total: Decimal,
    created_at: DateTime<Utc>,
) -> Order {
    Order {
        id: Uuid::new_v4(),
        customer_id,
        items: items
            .iter()
            .map(|(product_id, quantity)| LineItem {
                product_id: *product_id,
                quantity: *quantity,
            })
            .collect(),
        status,
        notes: None,
        total,
        created_at,
        updated_at: created_at,
    }
}

struct Store {
    ada: Customer,
    bob: Customer,
    ghost: Uuid,
    keyboard: Product,
    notebook: Product,
    customers: Vec<Customer>,
    products: Vec<Product>,
    orders: Vec<Order>,
}

// Keyboard $10 (Electronics), Notebook $5 (Books).
// Ada: placed $25 in Jan, delivered $20 in Feb. Bob: cancelled $10 in Feb.
// A deleted customer: shipped $30 in Mar.
fn store() -> Store {
    let ada = customer("Ada", "ada@example.com");
    let bob = customer("Bob", "bob@example.com");
    let ghost = Uuid::new_v4();
    let keyboard = product("Keyboard", "Electronics", money(1000));
    let notebook = product("Notebook", "Books", money(500));

    let orders = vec![
        order(
            ada.id,
            &[(keyboard.id, 2), (notebook.id, 1)],
            OrderStatus::Placed,
            money(2500),
            at(2025, 1, 15),
        ),
        order(
            ada.id,
            &[(notebook.id, 4)],
            OrderStatus::Delivered,
            money(2000),
            at(2025, 2, 3),
        ),
        order(
            bob.id,
            &[(keyboard.id, 1)],
            OrderStatus::Cancelled,
            money(1000),
            at(2025, 2, 10),
        ),
        order(
            ghost,
            &[(keyboard.id, 3)],
            OrderStatus::Shipped,
            money(3000),
            at(2025, 3, 1),
        ),
    ];

    Store {
        customers: vec![ada.clone(), bob.clone()],
        products: vec![keyboard.clone(), notebook.clone()],
        ada,
        bob,
        ghost,
        keyboard,
        notebook,
        orders,
    }
}

#[test]
fn dashboard_summary_excludes_cancelled_revenue_but_counts_every_order() {
    let s = store();
    let stats = metrics::dashboard_summary(&s.orders, &s.customers);

    assert_eq!(stats.total_revenue, money(7500));
    assert_eq!(stats.total_orders, 4);
    assert_eq!(stats.total_customers, 2);
    assert_eq!(stats.pending_orders, 1);
}

#[test]
fn dashboard_summary_of_empty_store_is_all_zero() {
    let stats = metrics::dashboard_summary(&[], &[]);

    assert_eq!(stats.total_revenue, Decimal::ZERO);
    assert_eq!(stats.total_orders, 0);
    assert_eq!(stats.total_customers, 0);
    assert_eq!(stats.pending_orders, 0);
}

#[test]
fn recent_orders_are_newest_first_and_limited() {
    let s = store();
    let recent = metrics::recent_orders(&s.orders, &s.customers, 2);

    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].customer, "Unknown");
    assert_eq!(recent[0].total, "$30.00");
    assert_eq!(recent[0].date, at(2025, 3, 1));
    assert_eq!(recent[1].customer, s.bob.name);
    assert_eq!(recent[1].status, OrderStatus::Cancelled);
}

#[test]
fn status_counts_cover_every_status_in_order() {
    let s = store();
    let counts = metrics::status_counts(&s.orders);

    let keys: Vec<OrderStatus> = counts.iter().map(|c| c.key).collect();
    assert_eq!(keys, OrderStatus::ALL.to_vec());
    assert!(counts.iter().all(|c| c.count == 1));
    assert_eq!(counts[0].status, "Placed");
    assert_eq!(counts[3].color, "#ef4444");

    let empty = metrics::status_counts(&[]);
    assert_eq!(empty.len(), 4);
    assert!(empty.iter().all(|c| c.count == 0));
}

#[test]
fn trends_group_by_month_in_chronological_order() {
    let s = store();
    let trends = metrics::order_trends(&s.orders);

    let months: Vec<&str> = trends.iter().map(|t| t.month.as_str()).collect();
    assert_eq!(months, vec!["2025-01", "2025-02", "2025-03"]);
    assert_eq!(trends[0].name, "Jan");

    // February holds a delivered and a cancelled order.
    assert_eq!(trends[1].orders, 2);
    assert_eq!(trends[1].revenue, money(2000));
}

#[test]
fn trends_merge_orders_placed_in_the_same_month() {
    let customer_id = Uuid::new_v4();
    let orders = vec![
        order(customer_id, &[], OrderStatus::Placed, money(10000), at(2025, 1, 5)),
        order(customer_id, &[], OrderStatus::Shipped, money(5000), at(2025, 1, 28)),
    ];

    let trends = metrics::order_trends(&orders);
    assert_eq!(trends.len(), 1);
    assert_eq!(trends[0].orders, 2);
    assert_eq!(trends[0].revenue, money(15000));
}

#[test]
fn top_products_rank_by_quantity_then_name() {
    let s = store();
    let top = metrics::top_products(&s.orders, &s.products, 5);

    // Both sold 5 units outside the cancelled order.
    let names: Vec<&str> = top.items.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Keyboard", "Notebook"]);
    assert_eq!(top.items[0].quantity, 5);
    assert_eq!(top.items[0].revenue, money(5000));
    assert_eq!(top.items[1].revenue, money(2500));
    assert_eq!(top.total_sold, 10);

    let first = metrics::top_products(&s.orders, &s.products, 1);
    assert_eq!(first.items.len(), 1);
    assert_eq!(first.items[0].id, s.keyboard.id);
    assert_eq!(first.total_sold, 5);
}

#[test]
fn top_products_skip_unknown_products() {
    let s = store();
    let only_notebook = vec![s.notebook.clone()];
    let top = metrics::top_products(&s.orders, &only_notebook, 5);

    assert_eq!(top.items.len(), 1);
    assert_eq!(top.items[0].id, s.notebook.id);
}

#[test]
fn top_products_of_only_cancelled_orders_is_empty() {
    let s = store();
    let cancelled: Vec<Order> = s
        .orders
        .iter()
        .filter(|o| o.status.is_cancelled())
        .cloned()
        .collect();

    let top = metrics::top_products(&cancelled, &s.products, 5);
    assert!(top.items.is_empty());
    assert_eq!(top.total_sold, 0);
}

#[test]
fn top_customers_rank_by_spend_with_unknown_fallback() {
    let s = store();
    let top = metrics::top_customers(&s.orders, &s.customers, 5);

    assert_eq!(top.len(), 2);
    assert_eq!(top[0].id, s.ada.id);
    assert_eq!(top[0].total_orders, 2);
    assert_eq!(top[0].total_spent, money(4500));
    assert_eq!(top[1].id, s.ghost);
    assert_eq!(top[1].name, "Unknown Customer");
    assert_eq!(top[1].email, "");
    assert!(top.iter().all(|c| c.id != s.bob.id));
}

#[test]
fn customer_summary_totals_non_cancelled_orders() {
    let s = store();

    let summary = metrics::customer_order_summary(s.ada.id, &s.orders).expect("summary");
    assert_eq!(summary.total_orders, 2);
    assert_eq!(summary.total_spent, money(4500));
    assert_eq!(summary.last_order_date, at(2025, 2, 3));

    assert!(metrics::customer_order_summary(s.bob.id, &s.orders).is_none());
    assert!(metrics::customer_order_summary(Uuid::new_v4(), &s.orders).is_none());
}

#[test]
fn customer_summary_of_a_single_order() {
    let customer_id = Uuid::new_v4();
    let placed_at = at(2025, 4, 2);
    let orders = vec![order(
        customer_id,
        &[],
        OrderStatus::Placed,
        money(4250),
        placed_at,
    )];

    let summary = metrics::customer_order_summary(customer_id, &orders).expect("summary");
    assert_eq!(summary.total_orders, 1);
    assert_eq!(summary.total_spent, money(4250));
    assert_eq!(summary.last_order_date, placed_at);
}

#[test]
fn sales_by_category_sorted_by_revenue() {
    let s = store();
    let sales = metrics::sales_by_category(&s.orders, &s.products);

    assert_eq!(sales.len(), 2);
    assert_eq!(sales[0].category, "Electronics");
    assert_eq!(sales[0].revenue, money(5000));
    assert_eq!(sales[1].category, "Books");
    assert_eq!(sales[1].revenue, money(2500));
}

#[test]
fn order_revenue_is_zero_once_cancelled() {
    let s = store();
    let cancelled = &s.orders[2];
    assert_eq!(metrics::order_revenue(cancelled), Decimal::ZERO);
    assert_eq!(metrics::order_revenue(&s.orders[0]), money(2500));
}

#[test]
fn format_currency_groups_thousands() {
    assert_eq!(metrics::format_currency(Decimal::ZERO), "$0.00");
    assert_eq!(metrics::format_currency(money(4250)), "$42.50");
    assert_eq!(metrics::format_currency(money(123450)), "$1,234.50");
    assert_eq!(metrics::format_currency(money(100000000)), "$1,000,000.00");
    assert_eq!(metrics::format_currency(money(-99999)), "-$999.99");
}

#[test]
fn format_currency_rounds_before_choosing_the_sign() {
    assert_eq!(metrics::format_currency(Decimal::new(-1, 3)), "$0.00");
    assert_eq!(metrics::format_currency(Decimal::new(-4, 3)), "$0.00");
    assert_eq!(metrics::format_currency(Decimal::new(-6, 3)), "-$0.01");
    assert_eq!(metrics::format_currency(Decimal::new(12346, 3)), "$12.35");
}
