use std::collections::HashSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use caisse_domain::pagination::PageRequest;

use crate::domain::repository::{
    ActivityLogRepository, EmployeeRepository, ProductRepository, SaleRepository,
};
use crate::domain::types::{
    ActivityLevel, FieldErrors, Sale, SaleFilter, SaleItemDraft, SaleStatus, SaleWithItems,
    format_invoice_number,
};
use crate::error::BackofficeError;
use crate::usecase::activity::ActivityRecorder;

// ── Input & validation ───────────────────────────────────────────────────────

pub struct SaleInput {
    pub invoice_number: String,
    /// Defaults to now when absent.
    pub date: Option<DateTime<Utc>>,
    pub cashier_id: Uuid,
    /// Defaults to `completed` when absent.
    pub status: Option<String>,
    pub discount_cents: i64,
    pub items: Vec<SaleItemDraft>,
}

struct SaleDraft {
    invoice_number: String,
    status: SaleStatus,
}

/// Validate every line item as part of the whole-submission check.
/// Any failing item rejects the submission — nothing is persisted.
async fn validate_items<P: ProductRepository>(
    products: &P,
    items: &[SaleItemDraft],
    errors: &mut FieldErrors,
) -> Result<(), BackofficeError> {
    let ids: Vec<Uuid> = {
        let unique: HashSet<Uuid> = items.iter().map(|item| item.product_id).collect();
        unique.into_iter().collect()
    };
    let known: HashSet<Uuid> = products
        .find_by_ids(&ids)
        .await?
        .into_iter()
        .map(|product| product.id)
        .collect();

    for (index, item) in items.iter().enumerate() {
        if item.quantity < 1 {
            errors.add(
                format!("items[{index}].quantity"),
                "quantity must be at least 1",
            );
        }
        if item.unit_price_cents < 0 {
            errors.add(
                format!("items[{index}].unit_price"),
                "unit price cannot be negative",
            );
        }
        if !known.contains(&item.product_id) {
            errors.add(format!("items[{index}].product"), "unknown product");
        }
    }
    Ok(())
}

/// Validate header and items as one unit. `existing_id` relaxes the
/// invoice-uniqueness check for the record being updated.
async fn validate_sale<S, P, E>(
    sales: &S,
    products: &P,
    employees: &E,
    input: &SaleInput,
    existing_id: Option<Uuid>,
) -> Result<SaleDraft, BackofficeError>
where
    S: SaleRepository,
    P: ProductRepository,
    E: EmployeeRepository,
{
    let mut errors = FieldErrors::default();

    let invoice_number = input.invoice_number.trim().to_owned();
    if invoice_number.is_empty() {
        errors.add("invoice_number", "invoice number is required");
    } else if let Some(found) = sales.find_by_invoice_number(&invoice_number).await? {
        if existing_id != Some(found.id) {
            errors.add("invoice_number", "invoice number already in use");
        }
    }

    if !employees.exists(input.cashier_id).await? {
        errors.add("cashier", "unknown cashier");
    }

    if input.discount_cents < 0 {
        errors.add("discount", "discount cannot be negative");
    }

    let status = match input.status.as_deref().map(str::trim) {
        None | Some("") => Some(SaleStatus::Completed),
        Some(raw) => {
            let parsed = SaleStatus::parse(raw);
            if parsed.is_none() {
                errors.add("status", "unknown status");
            }
            parsed
        }
    };

    validate_items(products, &input.items, &mut errors).await?;

    match (errors.is_empty(), status) {
        (true, Some(status)) => Ok(SaleDraft {
            invoice_number,
            status,
        }),
        _ => Err(BackofficeError::Validation(errors)),
    }
}

// ── ListSales ────────────────────────────────────────────────────────────────

pub struct ListSalesUseCase<S: SaleRepository> {
    pub repo: S,
}

impl<S: SaleRepository> ListSalesUseCase<S> {
    pub async fn execute(
        &self,
        filter: &SaleFilter,
        page: PageRequest,
    ) -> Result<(Vec<Sale>, u64), BackofficeError> {
        let sales = self.repo.list(filter, page).await?;
        let total = self.repo.count(filter).await?;
        Ok((sales, total))
    }
}

// ── GetSale ──────────────────────────────────────────────────────────────────

pub struct GetSaleUseCase<S: SaleRepository> {
    pub repo: S,
}

impl<S: SaleRepository> GetSaleUseCase<S> {
    pub async fn execute(&self, id: Uuid) -> Result<Sale, BackofficeError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(BackofficeError::SaleNotFound)
    }
}

// ── GetSaleDocument ──────────────────────────────────────────────────────────

/// Read-only projection source: sale + cashier name + ordered items.
pub struct GetSaleDocumentUseCase<S: SaleRepository> {
    pub repo: S,
}

impl<S: SaleRepository> GetSaleDocumentUseCase<S> {
    pub async fn execute(&self, id: Uuid) -> Result<SaleWithItems, BackofficeError> {
        self.repo
            .load_with_items(id)
            .await?
            .ok_or(BackofficeError::SaleNotFound)
    }
}

// ── CreateSale ───────────────────────────────────────────────────────────────

pub struct CreateSaleUseCase<S, P, E, A>
where
    S: SaleRepository,
    P: ProductRepository,
    E: EmployeeRepository,
    A: ActivityLogRepository,
{
    pub repo: S,
    pub products: P,
    pub employees: E,
    pub activity: ActivityRecorder<A>,
}

impl<S, P, E, A> CreateSaleUseCase<S, P, E, A>
where
    S: SaleRepository,
    P: ProductRepository,
    E: EmployeeRepository,
    A: ActivityLogRepository,
{
    pub async fn execute(&self, acting_id: Uuid, input: SaleInput) -> Result<Sale, BackofficeError> {
        let draft = validate_sale(&self.repo, &self.products, &self.employees, &input, None).await?;
        let now = Utc::now();
        let mut sale = Sale {
            id: Uuid::now_v7(),
            invoice_number: draft.invoice_number,
            date: input.date.unwrap_or(now),
            cashier_id: input.cashier_id,
            status: draft.status,
            discount_cents: input.discount_cents,
            total_amount_cents: 0,
            created_at: now,
        };
        sale.total_amount_cents = self.repo.create_with_items(&sale, &input.items).await?;
        self.activity
            .record(acting_id, "Sale created", ActivityLevel::Success, "shopping-cart")
            .await;
        Ok(sale)
    }
}

// ── UpdateSale ───────────────────────────────────────────────────────────────

/// Replaces the item set wholesale and rederives the stored total; the
/// previous total is never trusted.
pub struct UpdateSaleUseCase<S, P, E, A>
where
    S: SaleRepository,
    P: ProductRepository,
    E: EmployeeRepository,
    A: ActivityLogRepository,
{
    pub repo: S,
    pub products: P,
    pub employees: E,
    pub activity: ActivityRecorder<A>,
}

impl<S, P, E, A> UpdateSaleUseCase<S, P, E, A>
where
    S: SaleRepository,
    P: ProductRepository,
    E: EmployeeRepository,
    A: ActivityLogRepository,
{
    pub async fn execute(
        &self,
        acting_id: Uuid,
        id: Uuid,
        input: SaleInput,
    ) -> Result<Sale, BackofficeError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(BackofficeError::SaleNotFound)?;
        let draft = validate_sale(
            &self.repo,
            &self.products,
            &self.employees,
            &input,
            Some(existing.id),
        )
        .await?;
        let mut sale = Sale {
            invoice_number: draft.invoice_number,
            date: input.date.unwrap_or(existing.date),
            cashier_id: input.cashier_id,
            status: draft.status,
            discount_cents: input.discount_cents,
            ..existing
        };
        let total = self
            .repo
            .update_with_items(&sale, &input.items)
            .await?
            .ok_or(BackofficeError::SaleNotFound)?;
        sale.total_amount_cents = total;
        self.activity
            .record(acting_id, "Sale updated", ActivityLevel::Info, "edit")
            .await;
        Ok(sale)
    }
}

// ── DeleteSale ───────────────────────────────────────────────────────────────

pub struct DeleteSaleUseCase<S: SaleRepository, A: ActivityLogRepository> {
    pub repo: S,
    pub activity: ActivityRecorder<A>,
}

impl<S: SaleRepository, A: ActivityLogRepository> DeleteSaleUseCase<S, A> {
    pub async fn execute(&self, acting_id: Uuid, id: Uuid) -> Result<Sale, BackofficeError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(BackofficeError::SaleNotFound)?;
        if !self.repo.delete(id).await? {
            return Err(BackofficeError::SaleNotFound);
        }
        self.activity
            .record(acting_id, "Sale deleted", ActivityLevel::Danger, "trash")
            .await;
        Ok(existing)
    }
}

// ── BulkDeleteSales ──────────────────────────────────────────────────────────

pub struct BulkDeleteSalesUseCase<S: SaleRepository, A: ActivityLogRepository> {
    pub repo: S,
    pub activity: ActivityRecorder<A>,
}

impl<S: SaleRepository, A: ActivityLogRepository> BulkDeleteSalesUseCase<S, A> {
    /// Returns the number of sales removed. An empty id list is a no-op,
    /// not an error.
    pub async fn execute(&self, acting_id: Uuid, ids: &[Uuid]) -> Result<u64, BackofficeError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let deleted = self.repo.delete_many(ids).await?;
        self.activity
            .record(
                acting_id,
                format!("{deleted} sale(s) bulk-deleted"),
                ActivityLevel::Danger,
                "trash",
            )
            .await;
        Ok(deleted)
    }
}

// ── Invoice numbers ──────────────────────────────────────────────────────────

/// Next free `INV-YYYYMMDD-NNNN` for the given instant: one past the
/// number of sales dated today, probing forward past any gap left by
/// deletions.
async fn next_invoice_number<S: SaleRepository>(
    sales: &S,
    now: DateTime<Utc>,
) -> Result<String, BackofficeError> {
    let today = now.date_naive();
    let filter = SaleFilter {
        date_from: Some(today),
        date_to: Some(today),
        ..Default::default()
    };
    let mut seq = sales.count(&filter).await? + 1;
    loop {
        let candidate = format_invoice_number(today, seq);
        if sales.find_by_invoice_number(&candidate).await?.is_none() {
            return Ok(candidate);
        }
        seq += 1;
    }
}

pub struct NextInvoiceUseCase<S: SaleRepository> {
    pub repo: S,
}

impl<S: SaleRepository> NextInvoiceUseCase<S> {
    pub async fn execute(&self, now: DateTime<Utc>) -> Result<String, BackofficeError> {
        next_invoice_number(&self.repo, now).await
    }
}

// ── Checkout ─────────────────────────────────────────────────────────────────

pub struct CheckoutInput {
    pub items: Vec<SaleItemDraft>,
    pub discount_cents: i64,
}

/// The till flow: the caller is the cashier, the invoice number is
/// generated, the sale lands as `completed` dated now.
pub struct CheckoutUseCase<S, P, E, A>
where
    S: SaleRepository,
    P: ProductRepository,
    E: EmployeeRepository,
    A: ActivityLogRepository,
{
    pub repo: S,
    pub products: P,
    pub employees: E,
    pub activity: ActivityRecorder<A>,
}

impl<S, P, E, A> CheckoutUseCase<S, P, E, A>
where
    S: SaleRepository,
    P: ProductRepository,
    E: EmployeeRepository,
    A: ActivityLogRepository,
{
    pub async fn execute(
        &self,
        acting_id: Uuid,
        input: CheckoutInput,
    ) -> Result<Sale, BackofficeError> {
        let mut errors = FieldErrors::default();
        if !self.employees.exists(acting_id).await? {
            errors.add("cashier", "unknown cashier");
        }
        if input.discount_cents < 0 {
            errors.add("discount", "discount cannot be negative");
        }
        validate_items(&self.products, &input.items, &mut errors).await?;
        errors.into_result()?;

        let now = Utc::now();
        let mut sale = Sale {
            id: Uuid::now_v7(),
            invoice_number: next_invoice_number(&self.repo, now).await?,
            date: now,
            cashier_id: acting_id,
            status: SaleStatus::Completed,
            discount_cents: input.discount_cents,
            total_amount_cents: 0,
            created_at: now,
        };
        sale.total_amount_cents = self.repo.create_with_items(&sale, &input.items).await?;
        self.activity
            .record(
                acting_id,
                "Sale completed at the till",
                ActivityLevel::Success,
                "shopping-cart",
            )
            .await;
        Ok(sale)
    }
}
