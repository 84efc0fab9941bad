use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{
        CreateOrderRequest, CustomerRef, OrderDetail, OrderList, ResolvedLineItem,
        UpdateOrderRequest, UpdateOrderStatusRequest,
    },
    entity::{
        customers::{Column as CustomerCol, Entity as Customers},
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    models::{Customer, LineItem, Order, Product},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{customer_service::customer_from_entity, product_service::product_from_entity},
    state::AppState,
};

pub const UNKNOWN_CUSTOMER: &str = "Unknown Customer";
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Largest value `orders.total` (NUMERIC(14,2)) can hold.
pub const MAX_TOTAL: Decimal = Decimal::from_parts(
    (99_999_999_999_999u64 & 0xFFFF_FFFF) as u32,
    (99_999_999_999_999u64 >> 32) as u32,
    0,
    false,
    2,
);

pub async fn list_orders(
    state: &AppState,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status));
    }

    if let Some(customer_id) = query.customer_id {
        condition = condition.add(OrderCol::CustomerId.eq(customer_id));
    }

    if let Some(category) = query.category.as_ref().filter(|c| !c.trim().is_empty()) {
        let product_ids = Products::find()
            .select_only()
            .column(ProdCol::Id)
            .filter(ProdCol::Category.eq(category.trim()))
            .into_query();
        let order_ids = OrderItems::find()
            .select_only()
            .column(OrderItemCol::OrderId)
            .filter(OrderItemCol::ProductId.in_subquery(product_ids))
            .into_query();
        condition = condition.add(OrderCol::Id.in_subquery(order_ids));
    }

    if let Some(search) = query.q.as_ref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        let customer_ids = Customers::find()
            .select_only()
            .column(CustomerCol::Id)
            .filter(Expr::col(CustomerCol::Name).ilike(pattern.clone()))
            .into_query();
        condition = condition.add(
            Condition::any()
                .add(OrderCol::CustomerId.in_subquery(customer_ids))
                .add(
                    Expr::expr(Expr::col(OrderCol::Id).cast_as(Alias::new("TEXT")))
                        .ilike(pattern),
                ),
        );
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder
            .order_by_asc(OrderCol::CreatedAt)
            .order_by_asc(OrderCol::Id),
        SortOrder::Desc => finder
            .order_by_desc(OrderCol::CreatedAt)
            .order_by_desc(OrderCol::Id),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let models = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let orders = attach_items(&state.orm, models).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders fetched successfully",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn create_order(
    state: &AppState,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    validate_items(&payload.items)?;

    let txn = state.orm.begin().await?;

    let prices = load_prices(&txn, &payload.items).await?;
    let total = check_total(compute_total(&payload.items, &prices))?;
    let now = Utc::now();

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        customer_id: Set(payload.customer_id),
        status: Set(payload.status.unwrap_or_default()),
        notes: Set(clean_notes(payload.notes)),
        total: Set(total),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let items = insert_items(&txn, order.id, &payload.items).await?;

    txn.commit().await?;

    tracing::info!(order_id = %order.id, total = %order.total, "order created");
    audit::record(
        state,
        Some(order.customer_id),
        "order_create",
        "orders",
        serde_json::json!({ "order_id": order.id, "total": order.total }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order created successfully",
        order_from_entity(order, items),
        Some(Meta::empty()),
    ))
}

pub async fn get_order(state: &AppState, id: Uuid) -> AppResult<ApiResponse<OrderDetail>> {
    let order = find_order(&state.orm, id).await?;

    let customer = Customers::find_by_id(order.customer_id)
        .one(&state.orm)
        .await?
        .map(customer_from_entity);

    let product_ids: Vec<Uuid> = order.items.iter().map(|item| item.product_id).collect();
    let products: Vec<Product> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Order fetched successfully",
        resolve_order(order, customer.as_ref(), &products),
        Some(Meta::empty()),
    ))
}

/// Overwrites the status unconditionally; every status may follow every other.
pub async fn set_status(
    state: &AppState,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    let existing = Orders::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::NotFound("Order")),
    };
    let previous = existing.status;

    let mut active: OrderActive = existing.into();
    active.status = Set(payload.status);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    let items = load_items(&state.orm, &[order.id])
        .await?
        .remove(&order.id)
        .unwrap_or_default();

    tracing::info!(
        order_id = %order.id,
        from = previous.as_str(),
        to = order.status.as_str(),
        "order status updated"
    );
    audit::record(
        state,
        None,
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "status": order.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order status updated successfully",
        order_from_entity(order, items),
        Some(Meta::empty()),
    ))
}

pub async fn update_order(
    state: &AppState,
    id: Uuid,
    payload: UpdateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    if let Some(items) = payload.items.as_ref() {
        validate_items(items)?;
    }

    let txn = state.orm.begin().await?;

    let existing = Orders::find_by_id(id).one(&txn).await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::NotFound("Order")),
    };

    let mut active: OrderActive = existing.into();
    if let Some(customer_id) = payload.customer_id {
        active.customer_id = Set(customer_id);
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    if let Some(notes) = payload.notes {
        active.notes = Set(clean_notes(Some(notes)));
    }

    let replaced_items = match payload.items {
        Some(items) => {
            let prices = load_prices(&txn, &items).await?;
            active.total = Set(check_total(compute_total(&items, &prices))?);
            OrderItems::delete_many()
                .filter(OrderItemCol::OrderId.eq(id))
                .exec(&txn)
                .await?;
            Some(insert_items(&txn, id, &items).await?)
        }
        None => None,
    };

    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    let items = match replaced_items {
        Some(items) => items,
        None => load_items(&txn, &[id])
            .await?
            .remove(&id)
            .unwrap_or_default(),
    };

    txn.commit().await?;

    audit::record(
        state,
        None,
        "order_update",
        "orders",
        serde_json::json!({ "order_id": order.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order updated successfully",
        order_from_entity(order, items),
        Some(Meta::empty()),
    ))
}

pub async fn delete_order(state: &AppState, id: Uuid) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Orders::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Order"));
    }

    audit::record(
        state,
        None,
        "order_delete",
        "orders",
        serde_json::json!({ "order_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order deleted successfully",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

/// Σ price × quantity over the line items; products missing from `prices` add nothing.
pub fn compute_total(items: &[LineItem], prices: &HashMap<Uuid, Decimal>) -> Decimal {
    items
        .iter()
        .filter_map(|item| {
            prices
                .get(&item.product_id)
                .map(|price| *price * Decimal::from(item.quantity))
        })
        .sum::<Decimal>()
        .round_dp(2)
}

/// Rejects totals the orders table cannot store.
pub fn check_total(total: Decimal) -> AppResult<Decimal> {
    if total > MAX_TOTAL {
        return Err(AppError::BadRequest(format!(
            "Order total must not exceed {MAX_TOTAL}"
        )));
    }
    Ok(total)
}

pub fn validate_items(items: &[LineItem]) -> AppResult<()> {
    if items.is_empty() {
        return Err(AppError::BadRequest(
            "Order must contain at least one item".into(),
        ));
    }
    if let Some(item) = items.iter().find(|item| item.quantity < 1) {
        return Err(AppError::BadRequest(format!(
            "Quantity for product {} must be at least 1",
            item.product_id
        )));
    }
    Ok(())
}

/// Resolves references for display. Dangling references degrade to
/// "Unknown" names and a zero price instead of failing.
pub fn resolve_order(order: Order, customer: Option<&Customer>, products: &[Product]) -> OrderDetail {
    let catalog: HashMap<Uuid, &Product> =
        products.iter().map(|product| (product.id, product)).collect();

    let customer = match customer {
        Some(c) if c.id == order.customer_id => CustomerRef {
            id: c.id,
            name: c.name.clone(),
            email: c.email.clone(),
        },
        _ => CustomerRef {
            id: order.customer_id,
            name: UNKNOWN_CUSTOMER.to_string(),
            email: String::new(),
        },
    };

    let items = order
        .items
        .iter()
        .map(|item| {
            let product = catalog.get(&item.product_id);
            let unit_price = product.map(|p| p.price).unwrap_or(Decimal::ZERO);
            ResolvedLineItem {
                product_id: item.product_id,
                product_name: product
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| UNKNOWN_PRODUCT.to_string()),
                category: product
                    .map(|p| p.category.clone())
                    .unwrap_or_else(|| UNCATEGORIZED.to_string()),
                unit_price,
                quantity: item.quantity,
                subtotal: (unit_price * Decimal::from(item.quantity)).round_dp(2),
            }
        })
        .collect();

    OrderDetail {
        order,
        customer,
        items,
    }
}

/// Every order matching `condition`, oldest first, with line items attached.
pub(crate) async fn load_orders<C>(db: &C, condition: Condition) -> AppResult<Vec<Order>>
where
    C: ConnectionTrait,
{
    let models = Orders::find()
        .filter(condition)
        .order_by_asc(OrderCol::CreatedAt)
        .all(db)
        .await?;
    attach_items(db, models).await
}

async fn find_order<C>(db: &C, id: Uuid) -> AppResult<Order>
where
    C: ConnectionTrait,
{
    let order = Orders::find_by_id(id).one(db).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound("Order")),
    };
    let mut items = load_items(db, &[order.id]).await?;
    let order_items = items.remove(&order.id).unwrap_or_default();
    Ok(order_from_entity(order, order_items))
}

async fn attach_items<C>(db: &C, models: Vec<OrderModel>) -> AppResult<Vec<Order>>
where
    C: ConnectionTrait,
{
    let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
    let mut items = load_items(db, &ids).await?;
    Ok(models
        .into_iter()
        .map(|model| {
            let order_items = items.remove(&model.id).unwrap_or_default();
            order_from_entity(model, order_items)
        })
        .collect())
}

async fn load_items<C>(db: &C, order_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<OrderItemModel>>>
where
    C: ConnectionTrait,
{
    let mut grouped: HashMap<Uuid, Vec<OrderItemModel>> = HashMap::new();
    if order_ids.is_empty() {
        return Ok(grouped);
    }

    let rows = OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids.to_vec()))
        .order_by_asc(OrderItemCol::Position)
        .all(db)
        .await?;
    for row in rows {
        grouped.entry(row.order_id).or_default().push(row);
    }
    Ok(grouped)
}

async fn load_prices<C>(db: &C, items: &[LineItem]) -> AppResult<HashMap<Uuid, Decimal>>
where
    C: ConnectionTrait,
{
    let ids: Vec<Uuid> = items.iter().map(|item| item.product_id).collect();
    let prices = Products::find()
        .filter(ProdCol::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|product| (product.id, product.price))
        .collect();
    Ok(prices)
}

async fn insert_items<C>(db: &C, order_id: Uuid, items: &[LineItem]) -> AppResult<Vec<OrderItemModel>>
where
    C: ConnectionTrait,
{
    let mut inserted = Vec::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        let row = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            product_id: Set(item.product_id),
            quantity: Set(item.quantity),
            position: Set(position as i32),
            created_at: Set(Utc::now().into()),
        }
        .insert(db)
        .await?;
        inserted.push(row);
    }
    Ok(inserted)
}

fn clean_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

pub(crate) fn order_from_entity(model: OrderModel, items: Vec<OrderItemModel>) -> Order {
    Order {
        id: model.id,
        customer_id: model.customer_id,
        items: items
            .into_iter()
            .map(|item| LineItem {
                product_id: item.product_id,
                quantity: item.quantity,
            })
            .collect(),
        status: model.status,
        notes: model.notes,
        total: model.total,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
