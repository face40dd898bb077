#![allow(async_fn_in_trait)]

use uuid::Uuid;

use caisse_domain::pagination::PageRequest;

use crate::domain::types::{
    ActivityLog, Category, CategoryFilter, Employee, EmployeeCounts, EmployeeFilter, Product,
    ProductCounts, ProductFilter, Sale, SaleFilter, SaleItemDraft, SaleWithItems, Supplier,
    SupplierCounts, SupplierFilter,
};
use crate::error::BackofficeError;

/// Repository for employee accounts.
///
/// Every method except `exists`/`find_by_email` takes the acting user's
/// id and excludes that row from the queryable set — an admin cannot
/// see or touch their own record through this surface.
pub trait EmployeeRepository: Send + Sync {
    async fn list(
        &self,
        acting_id: Uuid,
        filter: &EmployeeFilter,
        page: PageRequest,
    ) -> Result<Vec<Employee>, BackofficeError>;

    /// Tallies over the same filtered set as `list`.
    async fn counts(
        &self,
        acting_id: Uuid,
        filter: &EmployeeFilter,
    ) -> Result<EmployeeCounts, BackofficeError>;

    async fn find_by_id(
        &self,
        acting_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Employee>, BackofficeError>;

    /// Unscoped lookup, used for email-uniqueness checks.
    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, BackofficeError>;

    /// Unscoped existence check, used to validate cashier references.
    async fn exists(&self, id: Uuid) -> Result<bool, BackofficeError>;

    async fn create(&self, employee: &Employee) -> Result<(), BackofficeError>;

    /// Returns `false` if the row is absent or is the acting user's own.
    async fn update(&self, acting_id: Uuid, employee: &Employee) -> Result<bool, BackofficeError>;

    /// Returns `false` if the row is absent or is the acting user's own.
    async fn delete(&self, acting_id: Uuid, id: Uuid) -> Result<bool, BackofficeError>;
}

/// Repository for suppliers.
pub trait SupplierRepository: Send + Sync {
    async fn list(
        &self,
        filter: &SupplierFilter,
        page: PageRequest,
    ) -> Result<Vec<Supplier>, BackofficeError>;

    async fn counts(&self, filter: &SupplierFilter) -> Result<SupplierCounts, BackofficeError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Supplier>, BackofficeError>;

    async fn create(&self, supplier: &Supplier) -> Result<(), BackofficeError>;

    /// Returns `false` if no such row.
    async fn update(&self, supplier: &Supplier) -> Result<bool, BackofficeError>;

    /// Returns `false` if no such row.
    async fn delete(&self, id: Uuid) -> Result<bool, BackofficeError>;
}

/// Repository for product categories.
pub trait CategoryRepository: Send + Sync {
    async fn list(
        &self,
        filter: &CategoryFilter,
        page: PageRequest,
    ) -> Result<Vec<Category>, BackofficeError>;

    async fn count(&self, filter: &CategoryFilter) -> Result<u64, BackofficeError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, BackofficeError>;

    /// Exact-name lookup, used for uniqueness checks.
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, BackofficeError>;

    async fn create(&self, category: &Category) -> Result<(), BackofficeError>;

    async fn update(&self, category: &Category) -> Result<bool, BackofficeError>;

    async fn delete(&self, id: Uuid) -> Result<bool, BackofficeError>;
}

/// Repository for products.
pub trait ProductRepository: Send + Sync {
    async fn list(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Vec<Product>, BackofficeError>;

    async fn counts(&self, filter: &ProductFilter) -> Result<ProductCounts, BackofficeError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, BackofficeError>;

    /// Batch lookup for line-item validation.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, BackofficeError>;

    async fn create(&self, product: &Product) -> Result<(), BackofficeError>;

    async fn update(&self, product: &Product) -> Result<bool, BackofficeError>;

    /// Delete the product and every sale item referencing it in one
    /// transaction, recomputing the totals of the affected sales before
    /// the product row goes away. Returns `false` if no such product.
    async fn delete_cascading(&self, id: Uuid) -> Result<bool, BackofficeError>;
}

/// Repository for sales and their line items.
pub trait SaleRepository: Send + Sync {
    async fn list(
        &self,
        filter: &SaleFilter,
        page: PageRequest,
    ) -> Result<Vec<Sale>, BackofficeError>;

    async fn count(&self, filter: &SaleFilter) -> Result<u64, BackofficeError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Sale>, BackofficeError>;

    /// Exact-invoice lookup, used for uniqueness checks.
    async fn find_by_invoice_number(
        &self,
        invoice_number: &str,
    ) -> Result<Option<Sale>, BackofficeError>;

    /// Load a sale with cashier display name and ordered items.
    async fn load_with_items(&self, id: Uuid) -> Result<Option<SaleWithItems>, BackofficeError>;

    /// Insert the header, insert all items, recompute the total from the
    /// rows just written and persist it — one transaction. Returns the
    /// stored total in cents.
    async fn create_with_items(
        &self,
        sale: &Sale,
        items: &[SaleItemDraft],
    ) -> Result<i64, BackofficeError>;

    /// Rewrite the header, replace the item set wholesale and recompute
    /// the total — one transaction. `None` if the sale is absent.
    async fn update_with_items(
        &self,
        sale: &Sale,
        items: &[SaleItemDraft],
    ) -> Result<Option<i64>, BackofficeError>;

    /// Returns `false` if no such row. Items go with the sale.
    async fn delete(&self, id: Uuid) -> Result<bool, BackofficeError>;

    /// Delete all sales matching `ids` in one statement; returns the
    /// number of rows removed (zero matches is not an error).
    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, BackofficeError>;

    /// All-time revenue: sum of stored totals over every sale.
    async fn revenue_cents(&self) -> Result<i64, BackofficeError>;
}

/// Append-only store for audit entries. No read surface.
pub trait ActivityLogRepository: Send + Sync {
    async fn append(&self, entry: &ActivityLog) -> Result<(), BackofficeError>;
}
