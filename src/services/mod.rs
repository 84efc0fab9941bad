pub mod auth_service;
pub mod customer_service;
pub mod dashboard_service;
pub mod order_service;
pub mod product_service;
