use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use caisse_core::health::{healthz, readyz};
use caisse_core::middleware::{propagate_request_id_layer, set_request_id_layer};

use crate::handlers::{
    category::{create_category, delete_category, get_category, list_categories, update_category},
    dashboard::dashboard,
    employee::{create_employee, delete_employee, get_employee, list_employees, update_employee},
    product::{create_product, delete_product, get_product, list_products, update_product},
    sale::{
        bulk_delete_sales, checkout, create_sale, delete_sale, get_sale, list_sales, next_invoice,
        sale_json, update_sale,
    },
    supplier::{create_supplier, delete_supplier, get_supplier, list_suppliers, update_supplier},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Dashboard
        .route("/dashboard", get(dashboard))
        // Employees
        .route("/employees", get(list_employees).post(create_employee))
        .route(
            "/employees/{id}",
            get(get_employee)
                .patch(update_employee)
                .delete(delete_employee),
        )
        // Suppliers
        .route("/suppliers", get(list_suppliers).post(create_supplier))
        .route(
            "/suppliers/{id}",
            get(get_supplier)
                .patch(update_supplier)
                .delete(delete_supplier),
        )
        // Categories
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category)
                .patch(update_category)
                .delete(delete_category),
        )
        // Products
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).patch(update_product).delete(delete_product),
        )
        // Sales
        .route("/sales", get(list_sales).post(create_sale))
        .route("/sales/bulk-delete", post(bulk_delete_sales))
        .route("/sales/next-invoice", get(next_invoice))
        .route(
            "/sales/{id}",
            get(get_sale).patch(update_sale).delete(delete_sale),
        )
        .route("/sales/{id}/json", get(sale_json))
        // Checkout
        .route("/checkout", post(checkout))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(set_request_id_layer())
        .with_state(state)
}
