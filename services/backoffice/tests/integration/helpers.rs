use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use caisse_backoffice::domain::repository::{
    ActivityLogRepository, EmployeeRepository, ProductRepository, SaleRepository,
};
use caisse_backoffice::domain::types::{
    ActivityLog, Employee, EmployeeCounts, EmployeeFilter, Product, ProductCounts, ProductFilter,
    ProductStatus, Sale, SaleFilter, SaleItemDraft, SaleItemLine, SaleWithItems,
};
use caisse_backoffice::error::BackofficeError;
use caisse_domain::money::line_total_cents;
use caisse_domain::pagination::PageRequest;
use caisse_domain::user::UserRole;

// ── Shared in-memory store ───────────────────────────────────────────────────
//
// One store backs every mock repository so cross-entity behavior (sale
// items following products, totals following items) can be asserted the
// same way it would be against the real schema.

#[derive(Debug, Clone)]
pub struct StoredItem {
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub position: i32,
}

#[derive(Default)]
pub struct Store {
    pub employees: Vec<Employee>,
    pub products: Vec<Product>,
    pub sales: Vec<Sale>,
    pub items: Vec<StoredItem>,
    pub activities: Vec<ActivityLog>,
    pub fail_activity: bool,
}

pub type SharedStore = Arc<Mutex<Store>>;

pub fn new_store() -> SharedStore {
    Arc::new(Mutex::new(Store::default()))
}

impl Store {
    fn product_names_for(&self, sale_id: Uuid) -> Vec<String> {
        self.items
            .iter()
            .filter(|item| item.sale_id == sale_id)
            .filter_map(|item| {
                self.products
                    .iter()
                    .find(|p| p.id == item.product_id)
                    .map(|p| p.name.clone())
            })
            .collect()
    }

    fn recompute_total(&mut self, sale_id: Uuid) -> i64 {
        let total = self
            .items
            .iter()
            .filter(|item| item.sale_id == sale_id)
            .map(|item| line_total_cents(item.quantity, item.unit_price_cents))
            .sum();
        if let Some(sale) = self.sales.iter_mut().find(|s| s.id == sale_id) {
            sale.total_amount_cents = total;
        }
        total
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn test_employee(first: &str, last: &str, email: &str) -> Employee {
    Employee {
        id: Uuid::now_v7(),
        first_name: first.to_owned(),
        last_name: last.to_owned(),
        email: email.to_owned(),
        role: UserRole::Cashier,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn test_product(name: &str, unit_price_cents: i64) -> Product {
    Product {
        id: Uuid::now_v7(),
        name: name.to_owned(),
        category_id: Uuid::now_v7(),
        unit_price_cents,
        status: ProductStatus::Active,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn draft(product_id: Uuid, quantity: i32, unit_price_cents: i64) -> SaleItemDraft {
    SaleItemDraft {
        product_id,
        quantity,
        unit_price_cents,
    }
}

// ── MockEmployeeRepo ─────────────────────────────────────────────────────────

pub struct MockEmployeeRepo {
    pub store: SharedStore,
}

impl EmployeeRepository for MockEmployeeRepo {
    async fn list(
        &self,
        acting_id: Uuid,
        filter: &EmployeeFilter,
        _page: PageRequest,
    ) -> Result<Vec<Employee>, BackofficeError> {
        Ok(self
            .store
            .lock()
            .unwrap()
            .employees
            .iter()
            .filter(|e| e.id != acting_id && filter.matches(e))
            .cloned()
            .collect())
    }

    async fn counts(
        &self,
        acting_id: Uuid,
        filter: &EmployeeFilter,
    ) -> Result<EmployeeCounts, BackofficeError> {
        let matching = self.list(acting_id, filter, PageRequest::default()).await?;
        Ok(EmployeeCounts {
            total: matching.len() as u64,
            active: matching.iter().filter(|e| e.is_active).count() as u64,
            inactive: matching.iter().filter(|e| !e.is_active).count() as u64,
        })
    }

    async fn find_by_id(
        &self,
        acting_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Employee>, BackofficeError> {
        Ok(self
            .store
            .lock()
            .unwrap()
            .employees
            .iter()
            .find(|e| e.id == id && e.id != acting_id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, BackofficeError> {
        Ok(self
            .store
            .lock()
            .unwrap()
            .employees
            .iter()
            .find(|e| e.email == email)
            .cloned())
    }

    async fn exists(&self, id: Uuid) -> Result<bool, BackofficeError> {
        Ok(self
            .store
            .lock()
            .unwrap()
            .employees
            .iter()
            .any(|e| e.id == id))
    }

    async fn create(&self, employee: &Employee) -> Result<(), BackofficeError> {
        self.store.lock().unwrap().employees.push(employee.clone());
        Ok(())
    }

    async fn update(&self, acting_id: Uuid, employee: &Employee) -> Result<bool, BackofficeError> {
        let mut store = self.store.lock().unwrap();
        match store
            .employees
            .iter_mut()
            .find(|e| e.id == employee.id && e.id != acting_id)
        {
            Some(slot) => {
                *slot = employee.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, acting_id: Uuid, id: Uuid) -> Result<bool, BackofficeError> {
        let mut store = self.store.lock().unwrap();
        let before = store.employees.len();
        store.employees.retain(|e| !(e.id == id && e.id != acting_id));
        Ok(store.employees.len() < before)
    }
}

// ── MockProductRepo ──────────────────────────────────────────────────────────

pub struct MockProductRepo {
    pub store: SharedStore,
}

impl ProductRepository for MockProductRepo {
    async fn list(
        &self,
        filter: &ProductFilter,
        _page: PageRequest,
    ) -> Result<Vec<Product>, BackofficeError> {
        Ok(self
            .store
            .lock()
            .unwrap()
            .products
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn counts(&self, filter: &ProductFilter) -> Result<ProductCounts, BackofficeError> {
        let matching = self.list(filter, PageRequest::default()).await?;
        Ok(ProductCounts {
            total: matching.len() as u64,
            active: matching
                .iter()
                .filter(|p| p.status == ProductStatus::Active)
                .count() as u64,
            out_of_stock: matching
                .iter()
                .filter(|p| p.status == ProductStatus::OutOfStock)
                .count() as u64,
            inactive: matching
                .iter()
                .filter(|p| p.status == ProductStatus::Inactive)
                .count() as u64,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, BackofficeError> {
        Ok(self
            .store
            .lock()
            .unwrap()
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, BackofficeError> {
        Ok(self
            .store
            .lock()
            .unwrap()
            .products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn create(&self, product: &Product) -> Result<(), BackofficeError> {
        self.store.lock().unwrap().products.push(product.clone());
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<bool, BackofficeError> {
        let mut store = self.store.lock().unwrap();
        match store.products.iter_mut().find(|p| p.id == product.id) {
            Some(slot) => {
                *slot = product.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_cascading(&self, id: Uuid) -> Result<bool, BackofficeError> {
        let mut store = self.store.lock().unwrap();
        if !store.products.iter().any(|p| p.id == id) {
            return Ok(false);
        }
        let affected: Vec<Uuid> = store
            .items
            .iter()
            .filter(|item| item.product_id == id)
            .map(|item| item.sale_id)
            .collect();
        store.items.retain(|item| item.product_id != id);
        for sale_id in affected {
            store.recompute_total(sale_id);
        }
        store.products.retain(|p| p.id != id);
        Ok(true)
    }
}

// ── MockSaleRepo ─────────────────────────────────────────────────────────────

pub struct MockSaleRepo {
    pub store: SharedStore,
}

impl SaleRepository for MockSaleRepo {
    async fn list(
        &self,
        filter: &SaleFilter,
        page: PageRequest,
    ) -> Result<Vec<Sale>, BackofficeError> {
        let store = self.store.lock().unwrap();
        let mut matching: Vec<Sale> = store
            .sales
            .iter()
            .filter(|sale| {
                let names = store.product_names_for(sale.id);
                let names: Vec<&str> = names.iter().map(String::as_str).collect();
                filter.matches(sale, &names)
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.date.cmp(&a.date));
        let page = page.clamped();
        Ok(matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .collect())
    }

    async fn count(&self, filter: &SaleFilter) -> Result<u64, BackofficeError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .sales
            .iter()
            .filter(|sale| {
                let names = store.product_names_for(sale.id);
                let names: Vec<&str> = names.iter().map(String::as_str).collect();
                filter.matches(sale, &names)
            })
            .count() as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Sale>, BackofficeError> {
        Ok(self
            .store
            .lock()
            .unwrap()
            .sales
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn find_by_invoice_number(
        &self,
        invoice_number: &str,
    ) -> Result<Option<Sale>, BackofficeError> {
        Ok(self
            .store
            .lock()
            .unwrap()
            .sales
            .iter()
            .find(|s| s.invoice_number == invoice_number)
            .cloned())
    }

    async fn load_with_items(&self, id: Uuid) -> Result<Option<SaleWithItems>, BackofficeError> {
        let store = self.store.lock().unwrap();
        let Some(sale) = store.sales.iter().find(|s| s.id == id).cloned() else {
            return Ok(None);
        };
        let cashier_name = store
            .employees
            .iter()
            .find(|e| e.id == sale.cashier_id)
            .map(Employee::full_name)
            .unwrap_or_default();
        let mut rows: Vec<&StoredItem> =
            store.items.iter().filter(|item| item.sale_id == id).collect();
        rows.sort_by_key(|item| item.position);
        let items = rows
            .into_iter()
            .map(|item| SaleItemLine {
                product_name: store
                    .products
                    .iter()
                    .find(|p| p.id == item.product_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_default(),
                quantity: item.quantity,
                unit_price_cents: item.unit_price_cents,
            })
            .collect();
        Ok(Some(SaleWithItems {
            sale,
            cashier_name,
            items,
        }))
    }

    async fn create_with_items(
        &self,
        sale: &Sale,
        items: &[SaleItemDraft],
    ) -> Result<i64, BackofficeError> {
        let mut store = self.store.lock().unwrap();
        store.sales.push(sale.clone());
        for (index, item) in items.iter().enumerate() {
            store.items.push(StoredItem {
                sale_id: sale.id,
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price_cents: item.unit_price_cents,
                position: index as i32,
            });
        }
        Ok(store.recompute_total(sale.id))
    }

    async fn update_with_items(
        &self,
        sale: &Sale,
        items: &[SaleItemDraft],
    ) -> Result<Option<i64>, BackofficeError> {
        let mut store = self.store.lock().unwrap();
        let Some(slot) = store.sales.iter_mut().find(|s| s.id == sale.id) else {
            return Ok(None);
        };
        *slot = sale.clone();
        store.items.retain(|item| item.sale_id != sale.id);
        for (index, item) in items.iter().enumerate() {
            store.items.push(StoredItem {
                sale_id: sale.id,
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price_cents: item.unit_price_cents,
                position: index as i32,
            });
        }
        Ok(Some(store.recompute_total(sale.id)))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, BackofficeError> {
        let mut store = self.store.lock().unwrap();
        let before = store.sales.len();
        store.sales.retain(|s| s.id != id);
        store.items.retain(|item| item.sale_id != id);
        Ok(store.sales.len() < before)
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, BackofficeError> {
        let mut store = self.store.lock().unwrap();
        let before = store.sales.len();
        store.sales.retain(|s| !ids.contains(&s.id));
        store.items.retain(|item| !ids.contains(&item.sale_id));
        Ok((before - store.sales.len()) as u64)
    }

    async fn revenue_cents(&self) -> Result<i64, BackofficeError> {
        Ok(self
            .store
            .lock()
            .unwrap()
            .sales
            .iter()
            .map(|s| s.total_amount_cents)
            .sum())
    }
}

// ── MockActivityRepo ─────────────────────────────────────────────────────────

pub struct MockActivityRepo {
    pub store: SharedStore,
}

impl ActivityLogRepository for MockActivityRepo {
    async fn append(&self, entry: &ActivityLog) -> Result<(), BackofficeError> {
        let mut store = self.store.lock().unwrap();
        if store.fail_activity {
            return Err(BackofficeError::Internal(anyhow::anyhow!(
                "activity store unavailable"
            )));
        }
        store.activities.push(entry.clone());
        Ok(())
    }
}

// ── Recorder shorthand ───────────────────────────────────────────────────────

pub fn recorder(
    store: &SharedStore,
) -> caisse_backoffice::usecase::activity::ActivityRecorder<MockActivityRepo> {
    caisse_backoffice::usecase::activity::ActivityRecorder {
        repo: MockActivityRepo {
            store: Arc::clone(store),
        },
    }
}
