use chrono::{Duration, Utc};
use order_admin_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{
        auth::RegisterRequest,
        customers::CreateCustomerRequest,
        orders::{CreateOrderRequest, UpdateOrderStatusRequest},
        products::CreateProductRequest,
    },
    entity::{Orders, Products, orders::ActiveModel as OrderActive},
    models::{LineItem, OrderStatus},
    services::{auth_service, customer_service, order_service, product_service},
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
use uuid::Uuid;

const PRODUCTS: &[(&str, &str, i64, &str)] = &[
    ("Wireless Headphones", "Electronics", 12999, "Over-ear, noise cancelling"),
    ("Mechanical Keyboard", "Electronics", 8950, "Hot-swappable switches"),
    ("Cotton T-Shirt", "Clothing", 1999, "Crew neck, unisex"),
    ("Rust in Action", "Books", 3999, "Systems programming handbook"),
    ("Espresso Maker", "Home & Kitchen", 24900, "15 bar pump"),
    ("Yoga Mat", "Sports", 2950, "6mm non-slip"),
];

const CUSTOMERS: &[(&str, &str, &str, &str)] = &[
    ("Ada Lovelace", "ada@example.com", "+44 20 7946 0001", "12 St James's Square, London"),
    ("Grace Hopper", "grace@example.com", "+1 202 555 0143", "Arlington, VA"),
    ("Alan Turing", "alan@example.com", "+44 161 496 0002", "Wilmslow, Cheshire"),
    ("Katherine Johnson", "katherine@example.com", "+1 757 555 0199", "Hampton, VA"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    let state = AppState::new(orm, config.jwt_secret);

    if Products::find().count(&state.orm).await? > 0 {
        tracing::info!("catalog already populated, skipping seed");
        return Ok(());
    }

    let admin_id = match auth_service::register_customer(
        &state,
        RegisterRequest {
            name: "Store Admin".into(),
            email: "admin@example.com".into(),
            password: "admin123".into(),
        },
    )
    .await
    {
        Ok(resp) => resp.data.map(|c| c.id),
        Err(err) => {
            tracing::warn!(error = %err, "admin login not created");
            None
        }
    };

    let mut product_ids = Vec::with_capacity(PRODUCTS.len());
    for (name, category, cents, description) in PRODUCTS {
        let resp = product_service::create_product(
            &state,
            CreateProductRequest {
                name: name.to_string(),
                category: category.to_string(),
                price: Decimal::new(*cents, 2),
                description: Some(description.to_string()),
                image_url: None,
            },
        )
        .await?;
        product_ids.extend(resp.data.map(|p| p.id));
    }

    let mut customer_ids = Vec::with_capacity(CUSTOMERS.len());
    for (name, email, phone, address) in CUSTOMERS {
        let resp = customer_service::create_customer(
            &state,
            CreateCustomerRequest {
                name: name.to_string(),
                email: email.to_string(),
                phone: phone.to_string(),
                address: address.to_string(),
            },
        )
        .await?;
        customer_ids.extend(resp.data.map(|c| c.id));
    }

    let statuses = OrderStatus::ALL;
    let mut seeded = 0;
    for i in 0..12usize {
        let customer_id = customer_ids[i % customer_ids.len()];
        let items = vec![
            LineItem {
                product_id: product_ids[i % product_ids.len()],
                quantity: (i % 3 + 1) as i32,
            },
            LineItem {
                product_id: product_ids[(i + 2) % product_ids.len()],
                quantity: 1,
            },
        ];

        let resp = order_service::create_order(
            &state,
            CreateOrderRequest {
                customer_id,
                items,
                status: None,
                notes: None,
            },
        )
        .await?;
        let Some(order) = resp.data else { continue };

        let status = statuses[i % statuses.len()];
        if status != OrderStatus::Placed {
            order_service::set_status(&state, order.id, UpdateOrderStatusRequest { status })
                .await?;
        }

        // Spread orders over the last few months so the trend chart has data.
        backdate(&state, order.id, (i as i64 % 4) * 30 + i as i64).await?;
        seeded += 1;
    }

    tracing::info!(
        admin_id = ?admin_id,
        products = product_ids.len(),
        customers = customer_ids.len(),
        orders = seeded,
        "seed completed"
    );
    Ok(())
}

async fn backdate(state: &AppState, order_id: Uuid, days: i64) -> anyhow::Result<()> {
    let Some(order) = Orders::find_by_id(order_id).one(&state.orm).await? else {
        return Ok(());
    };
    let created_at = Utc::now() - Duration::days(days);
    let mut active: OrderActive = order.into();
    active.created_at = Set(created_at.into());
    active.updated_at = Set(created_at.into());
    active.update(&state.orm).await?;
    Ok(())
}
