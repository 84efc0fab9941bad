use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::products::{
        CATEGORY_SUGGESTIONS, CategoryList, CreateProductRequest, ProductList,
        UpdateProductRequest,
    },
    entity::products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::customer_service::required,
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    if let Some(category) = query.category.as_ref().filter(|c| !c.trim().is_empty()) {
        condition = condition.add(Column::Category.eq(category.trim()));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };
    finder = finder.order_by_asc(Column::Id);

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
    let data = ProductList { items };
    Ok(ApiResponse::success("Products fetched successfully", data, Some(meta)))
}

/// The fixed suggestions followed by any other category already in use.
pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let in_use: Vec<String> = Products::find()
        .select_only()
        .column(Column::Category)
        .distinct()
        .order_by_asc(Column::Category)
        .into_tuple()
        .all(&state.orm)
        .await?;

    let mut items: Vec<String> = CATEGORY_SUGGESTIONS.iter().map(|c| c.to_string()).collect();
    for category in in_use {
        if !items.contains(&category) {
            items.push(category);
        }
    }

    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let result = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(product_from_entity);
    let result = match result {
        Some(p) => p,
        None => return Err(AppError::NotFound("Product")),
    };
    Ok(ApiResponse::success("Product fetched successfully", result, None))
}

pub async fn create_product(
    state: &AppState,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let name = required("name", &payload.name)?;
    let category = required("category", &payload.category)?;
    let price = validate_price(payload.price)?;
    let now = Utc::now();

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        category: Set(category),
        price: Set(price),
        description: Set(optional_text(payload.description)),
        image_url: Set(optional_text(payload.image_url)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    let product = active.insert(&state.orm).await?;

    audit::record(
        state,
        None,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created successfully",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

/// Price changes never touch existing order totals.
pub async fn update_product(
    state: &AppState,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let name = payload
        .name
        .as_deref()
        .map(|name| required("name", name))
        .transpose()?;
    let category = payload
        .category
        .as_deref()
        .map(|category| required("category", category))
        .transpose()?;
    let price = payload.price.map(validate_price).transpose()?;

    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound("Product")),
    };

    let mut active: ActiveModel = existing.into();
    if let Some(name) = name {
        active.name = Set(name);
    }
    if let Some(category) = category {
        active.category = Set(category);
    }
    if let Some(price) = price {
        active.price = Set(price);
    }
    if let Some(description) = payload.description {
        active.description = Set(optional_text(Some(description)));
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(optional_text(Some(image_url)));
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    audit::record(
        state,
        None,
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product updated successfully",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

/// Orders referencing the product are kept and show it as "Unknown Product".
pub async fn delete_product(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Products::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Product"));
    }

    audit::record(
        state,
        None,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product deleted successfully",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

pub(crate) async fn load_products<C>(db: &C) -> AppResult<Vec<Product>>
where
    C: ConnectionTrait,
{
    Ok(Products::find()
        .all(db)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect())
}

/// Largest value `products.price` (NUMERIC(12,2)) can hold.
pub const MAX_PRICE: Decimal = Decimal::from_parts(
    (999_999_999_999u64 & 0xFFFF_FFFF) as u32,
    (999_999_999_999u64 >> 32) as u32,
    0,
    false,
    2,
);

pub fn validate_price(price: Decimal) -> AppResult<Decimal> {
    if price <= Decimal::ZERO {
        return Err(AppError::BadRequest("price must be greater than 0".into()));
    }
    if price > MAX_PRICE {
        return Err(AppError::BadRequest(format!(
            "price must not exceed {MAX_PRICE}"
        )));
    }
    if price.round_dp(2) != price {
        return Err(AppError::BadRequest(
            "price must have at most 2 decimal places".into(),
        ));
    }
    Ok(price)
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        category: model.category,
        price: model.price,
        description: model.description,
        image_url: model.image_url,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
