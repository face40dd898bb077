use axum::{Json, extract::State};
use serde::Serialize;

use caisse_auth_types::identity::IdentityHeaders;
use caisse_domain::money::format_cents;

use crate::error::BackofficeError;
use crate::handlers::require_admin;
use crate::state::AppState;
use crate::usecase::dashboard::DashboardUseCase;

#[derive(Serialize)]
pub struct DashboardResponse {
    pub employees: u64,
    pub suppliers: u64,
    pub categories: u64,
    pub products: u64,
    pub sales: u64,
    /// All-time revenue, two-decimal string.
    pub revenue: String,
}

// ── GET /dashboard ───────────────────────────────────────────────────────────

pub async fn dashboard(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, BackofficeError> {
    require_admin(&identity)?;
    let uc = DashboardUseCase {
        employees: state.employee_repo(),
        suppliers: state.supplier_repo(),
        categories: state.category_repo(),
        products: state.product_repo(),
        sales: state.sale_repo(),
    };
    let summary = uc.execute(identity.user_id).await?;
    Ok(Json(DashboardResponse {
        employees: summary.employees,
        suppliers: summary.suppliers,
        categories: summary.categories,
        products: summary.products,
        sales: summary.sales,
        revenue: format_cents(summary.revenue_cents),
    }))
}
