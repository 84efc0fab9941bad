use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        customers::{CreateCustomerRequest, CustomerList, UpdateCustomerRequest},
        dashboard::CustomerOrderSummary,
    },
    entity::{
        customers::{ActiveModel, Column, Entity as Customers, Model as CustomerModel},
        orders::Column as OrderCol,
    },
    error::{AppError, AppResult},
    metrics,
    models::Customer,
    response::{ApiResponse, Meta},
    routes::params::CustomerQuery,
    services::order_service,
    state::AppState,
};

pub async fn list_customers(
    state: &AppState,
    query: CustomerQuery,
) -> AppResult<ApiResponse<CustomerList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Email).ilike(pattern)),
        );
    }

    let finder = Customers::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt)
        .order_by_asc(Column::Id);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(customer_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Customers fetched successfully",
        CustomerList { items },
        Some(meta),
    ))
}

pub async fn get_customer(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Customer>> {
    let customer = find_customer(&state.orm, id).await?;
    Ok(ApiResponse::success(
        "Customer fetched successfully",
        customer_from_entity(customer),
        Some(Meta::empty()),
    ))
}

pub async fn create_customer(
    state: &AppState,
    payload: CreateCustomerRequest,
) -> AppResult<ApiResponse<Customer>> {
    let name = required("name", &payload.name)?;
    let email = validate_email(&payload.email)?;
    let now = Utc::now();

    let customer = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email),
        phone: Set(payload.phone.trim().to_string()),
        address: Set(payload.address.trim().to_string()),
        password_hash: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        state,
        Some(customer.id),
        "customer_create",
        "customers",
        serde_json::json!({ "customer_id": customer.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Customer created successfully",
        customer_from_entity(customer),
        Some(Meta::empty()),
    ))
}

pub async fn update_customer(
    state: &AppState,
    id: Uuid,
    payload: UpdateCustomerRequest,
) -> AppResult<ApiResponse<Customer>> {
    let existing = find_customer(&state.orm, id).await?;
    let registered = existing.password_hash.is_some();

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(required("name", &name)?);
    }
    if let Some(email) = payload.email {
        let email = validate_email(&email)?;
        if registered && email_taken(&state.orm, &email, id).await? {
            return Err(AppError::BadRequest("Email is already taken".to_string()));
        }
        active.email = Set(email);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(phone.trim().to_string());
    }
    if let Some(address) = payload.address {
        active.address = Set(address.trim().to_string());
    }
    active.updated_at = Set(Utc::now().into());

    let customer = active.update(&state.orm).await?;

    audit::record(
        state,
        Some(customer.id),
        "customer_update",
        "customers",
        serde_json::json!({ "customer_id": customer.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Customer updated successfully",
        customer_from_entity(customer),
        Some(Meta::empty()),
    ))
}

/// Deletes the customer only. Their orders stay and resolve as "Unknown".
pub async fn delete_customer(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Customer>> {
    let existing = find_customer(&state.orm, id).await?;
    Customers::delete_by_id(id).exec(&state.orm).await?;

    audit::record(
        state,
        None,
        "customer_delete",
        "customers",
        serde_json::json!({ "customer_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Customer deleted successfully",
        customer_from_entity(existing),
        Some(Meta::empty()),
    ))
}

pub async fn order_summary(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<CustomerOrderSummary>> {
    find_customer(&state.orm, id).await?;

    let orders =
        order_service::load_orders(&state.orm, Condition::all().add(OrderCol::CustomerId.eq(id)))
            .await?;

    Ok(match metrics::customer_order_summary(id, &orders) {
        Some(summary) => ApiResponse::success("Order summary", summary, Some(Meta::empty())),
        None => ApiResponse::empty("No orders for customer"),
    })
}

pub(crate) async fn load_customers<C>(db: &C) -> AppResult<Vec<Customer>>
where
    C: ConnectionTrait,
{
    Ok(Customers::find()
        .all(db)
        .await?
        .into_iter()
        .map(customer_from_entity)
        .collect())
}

pub(crate) async fn find_customer<C>(db: &C, id: Uuid) -> AppResult<CustomerModel>
where
    C: ConnectionTrait,
{
    match Customers::find_by_id(id).one(db).await? {
        Some(c) => Ok(c),
        None => Err(AppError::NotFound("Customer")),
    }
}

/// Whether another customer with a login already uses `email`.
pub(crate) async fn email_taken<C>(db: &C, email: &str, except: Uuid) -> AppResult<bool>
where
    C: ConnectionTrait,
{
    let taken = Customers::find()
        .filter(Column::Email.eq(email))
        .filter(Column::PasswordHash.is_not_null())
        .filter(Column::Id.ne(except))
        .one(db)
        .await?;
    Ok(taken.is_some())
}

pub(crate) fn required(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// Trims and lowercases; rejects anything without a `local@domain` shape.
pub(crate) fn validate_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if !valid {
        return Err(AppError::BadRequest("A valid email is required".into()));
    }
    Ok(email)
}

pub(crate) fn customer_from_entity(model: CustomerModel) -> Customer {
    Customer {
        id: model.id,
        name: model.name,
        email: model.email,
        phone: model.phone,
        address: model.address,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
