use uuid::Uuid;

use crate::domain::repository::{
    CategoryRepository, EmployeeRepository, ProductRepository, SaleRepository, SupplierRepository,
};
use crate::domain::types::{
    CategoryFilter, EmployeeFilter, ProductFilter, SaleFilter, SupplierFilter,
};
use crate::error::BackofficeError;

/// Unfiltered headline numbers for the admin landing screen.
#[derive(Debug, Clone, Copy)]
pub struct DashboardSummary {
    pub employees: u64,
    pub suppliers: u64,
    pub categories: u64,
    pub products: u64,
    pub sales: u64,
    pub revenue_cents: i64,
}

pub struct DashboardUseCase<E, S, C, P, L>
where
    E: EmployeeRepository,
    S: SupplierRepository,
    C: CategoryRepository,
    P: ProductRepository,
    L: SaleRepository,
{
    pub employees: E,
    pub suppliers: S,
    pub categories: C,
    pub products: P,
    pub sales: L,
}

impl<E, S, C, P, L> DashboardUseCase<E, S, C, P, L>
where
    E: EmployeeRepository,
    S: SupplierRepository,
    C: CategoryRepository,
    P: ProductRepository,
    L: SaleRepository,
{
    pub async fn execute(&self, acting_id: Uuid) -> Result<DashboardSummary, BackofficeError> {
        let employees = self
            .employees
            .counts(acting_id, &EmployeeFilter::default())
            .await?
            .total;
        let suppliers = self.suppliers.counts(&SupplierFilter::default()).await?.total;
        let categories = self.categories.count(&CategoryFilter::default()).await?;
        let products = self.products.counts(&ProductFilter::default()).await?.total;
        let sales = self.sales.count(&SaleFilter::default()).await?;
        let revenue_cents = self.sales.revenue_cents().await?;
        Ok(DashboardSummary {
            employees,
            suppliers,
            categories,
            products,
            sales,
            revenue_cents,
        })
    }
}
