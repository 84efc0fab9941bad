use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        customers::{CreateCustomerRequest, CustomerList, UpdateCustomerRequest},
        dashboard::{
            CategorySales, CategorySalesList, CustomerOrderSummary, DashboardStats, MonthlyTrend,
            MonthlyTrendList, RecentOrder, RecentOrderList, StatusCount, StatusCountList,
            TopCustomer, TopCustomerList, TopProduct, TopProducts,
        },
        orders::{
            CreateOrderRequest, CustomerRef, OrderDetail, OrderList, ResolvedLineItem,
            UpdateOrderRequest, UpdateOrderStatusRequest,
        },
        products::{CategoryList, CreateProductRequest, ProductList, UpdateProductRequest},
    },
    models::{Customer, LineItem, Order, OrderStatus, Product},
    response::{ApiResponse, Meta, ResponseStatus},
    routes::{auth, customers, dashboard, health, orders, products},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::me,
        customers::list_customers,
        customers::create_customer,
        customers::get_customer,
        customers::update_customer,
        customers::delete_customer,
        customers::customer_order_summary,
        products::list_products,
        products::list_categories,
        products::create_product,
        products::get_product,
        products::update_product,
        products::delete_product,
        orders::list_orders,
        orders::create_order,
        orders::get_order,
        orders::update_order,
        orders::update_order_status,
        orders::delete_order,
        dashboard::stats,
        dashboard::recent_orders,
        dashboard::status_counts,
        dashboard::order_trends,
        dashboard::top_products,
        dashboard::top_customers,
        dashboard::sales_by_category
    ),
    components(
        schemas(
            Customer,
            Product,
            Order,
            OrderStatus,
            LineItem,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateCustomerRequest,
            UpdateCustomerRequest,
            CustomerList,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            CategoryList,
            CreateOrderRequest,
            UpdateOrderRequest,
            UpdateOrderStatusRequest,
            CustomerRef,
            ResolvedLineItem,
            OrderDetail,
            OrderList,
            DashboardStats,
            RecentOrder,
            RecentOrderList,
            StatusCount,
            MonthlyTrend,
            TopProduct,
            TopProducts,
            TopCustomer,
            CustomerOrderSummary,
            CategorySales,
            StatusCountList,
            MonthlyTrendList,
            TopCustomerList,
            CategorySalesList,
            Meta,
            ResponseStatus,
            ApiResponse<Customer>,
            ApiResponse<Product>,
            ApiResponse<Order>,
            ApiResponse<OrderDetail>,
            ApiResponse<OrderList>,
            ApiResponse<ProductList>,
            ApiResponse<CustomerList>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Customers", description = "Customer directory"),
        (name = "Products", description = "Product catalog"),
        (name = "Orders", description = "Order management"),
        (name = "Dashboard", description = "Derived metrics for the admin dashboard"),
        (name = "Auth", description = "Customer authentication"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
