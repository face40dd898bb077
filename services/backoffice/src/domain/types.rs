use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use caisse_domain::money::line_total_cents;
use caisse_domain::user::UserRole;

// ── Employees ────────────────────────────────────────────────────────────────

/// Employee account managed through the back office.
#[derive(Debug, Clone)]
pub struct Employee {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// ── Suppliers ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupplierStatus {
    Active,
    Inactive,
    Suspended,
}

impl SupplierStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "suspended" => Some(Self::Suspended),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Suspended => "suspended",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub status: SupplierStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ── Categories ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ── Products ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductStatus {
    Active,
    OutOfStock,
    Inactive,
}

impl ProductStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "out_of_stock" => Some(Self::OutOfStock),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::OutOfStock => "out_of_stock",
            Self::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category_id: Uuid,
    pub unit_price_cents: i64,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ── Sales ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleStatus {
    Pending,
    Completed,
    Cancelled,
}

impl SaleStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Sale header. `total_amount_cents` is derived from the current item
/// rows; it is rewritten on every write to the sale or its items and
/// never trusted as-is.
#[derive(Debug, Clone)]
pub struct Sale {
    pub id: Uuid,
    pub invoice_number: String,
    pub date: DateTime<Utc>,
    pub cashier_id: Uuid,
    pub status: SaleStatus,
    pub discount_cents: i64,
    pub total_amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// A line item as submitted, before any row exists.
#[derive(Debug, Clone)]
pub struct SaleItemDraft {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price_cents: i64,
}

impl SaleItemDraft {
    pub fn line_total_cents(&self) -> i64 {
        line_total_cents(self.quantity, self.unit_price_cents)
    }
}

/// A stored line item joined with its product name, in stored order.
#[derive(Debug, Clone)]
pub struct SaleItemLine {
    pub product_name: String,
    pub quantity: i32,
    pub unit_price_cents: i64,
}

impl SaleItemLine {
    pub fn line_total_cents(&self) -> i64 {
        line_total_cents(self.quantity, self.unit_price_cents)
    }
}

/// A sale loaded with its cashier's display name and ordered items —
/// the source of the JSON projection.
#[derive(Debug, Clone)]
pub struct SaleWithItems {
    pub sale: Sale,
    pub cashier_name: String,
    pub items: Vec<SaleItemLine>,
}

impl SaleWithItems {
    pub fn subtotal_cents(&self) -> i64 {
        self.items.iter().map(SaleItemLine::line_total_cents).sum()
    }
}

// ── Activity log ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityLevel {
    Success,
    Info,
    Warning,
    Danger,
}

impl ActivityLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

/// Append-only audit entry: who did what, when, at which severity.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub verb: String,
    pub level: ActivityLevel,
    pub icon: String,
    pub created_at: DateTime<Utc>,
}

// ── Search filters ───────────────────────────────────────────────────────────
//
// Each filter combines its fields with AND; a free-text term matches its
// target fields with OR, case-insensitively, as a substring. `matches`
// is the reference definition of that composition — the SQL built in
// `infra::db` mirrors it, and mock repositories reuse it in tests.

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    /// Matches first name OR last name OR email.
    pub term: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

impl EmployeeFilter {
    pub fn matches(&self, employee: &Employee) -> bool {
        if let Some(term) = &self.term {
            let hit = contains_ci(&employee.first_name, term)
                || contains_ci(&employee.last_name, term)
                || contains_ci(&employee.email, term);
            if !hit {
                return false;
            }
        }
        if let Some(role) = self.role {
            if employee.role != role {
                return false;
            }
        }
        if let Some(active) = self.is_active {
            if employee.is_active != active {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct SupplierFilter {
    pub term: Option<String>,
    pub status: Option<SupplierStatus>,
}

impl SupplierFilter {
    pub fn matches(&self, supplier: &Supplier) -> bool {
        if let Some(term) = &self.term {
            if !contains_ci(&supplier.name, term) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if supplier.status != status {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    pub term: Option<String>,
}

impl CategoryFilter {
    pub fn matches(&self, category: &Category) -> bool {
        match &self.term {
            Some(term) => contains_ci(&category.name, term),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub term: Option<String>,
    pub category_id: Option<Uuid>,
    pub status: Option<ProductStatus>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(term) = &self.term {
            if !contains_ci(&product.name, term) {
                return false;
            }
        }
        if let Some(category_id) = self.category_id {
            if product.category_id != category_id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if product.status != status {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct SaleFilter {
    /// Matches any of the sale's item product names.
    pub product_name: Option<String>,
    pub invoice_number: Option<String>,
    pub cashier_id: Option<Uuid>,
    pub status: Option<SaleStatus>,
    /// Inclusive civil-date lower bound on `sale.date`.
    pub date_from: Option<NaiveDate>,
    /// Inclusive civil-date upper bound on `sale.date`.
    pub date_to: Option<NaiveDate>,
}

impl SaleFilter {
    pub fn matches(&self, sale: &Sale, product_names: &[&str]) -> bool {
        if let Some(product_name) = &self.product_name {
            if !product_names.iter().any(|name| contains_ci(name, product_name)) {
                return false;
            }
        }
        if let Some(invoice) = &self.invoice_number {
            if !contains_ci(&sale.invoice_number, invoice) {
                return false;
            }
        }
        if let Some(cashier_id) = self.cashier_id {
            if sale.cashier_id != cashier_id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if sale.status != status {
                return false;
            }
        }
        let date = sale.date.date_naive();
        if let Some(from) = self.date_from {
            if date < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if date > to {
                return false;
            }
        }
        true
    }
}

// ── Summary counts ───────────────────────────────────────────────────────────
//
// Computed from the same filtered set as the listing they accompany.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EmployeeCounts {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SupplierCounts {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    pub suspended: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProductCounts {
    pub total: u64,
    pub active: u64,
    pub out_of_stock: u64,
    pub inactive: u64,
}

// ── Field-level validation errors ────────────────────────────────────────────

/// Per-field validation messages, accumulated during input checking.
/// Rendered as `{"errors": {"field": ["message", ...]}}` in the 422 body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Err(Validation)` if any message was recorded, `Ok` otherwise.
    pub fn into_result(self) -> Result<(), crate::error::BackofficeError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(crate::error::BackofficeError::Validation(self))
        }
    }
}

// ── Invoice numbers ──────────────────────────────────────────────────────────

/// Format an invoice number as `INV-YYYYMMDD-NNNN`.
pub fn format_invoice_number(date: NaiveDate, seq: u64) -> String {
    format!("INV-{}-{:04}", date.format("%Y%m%d"), seq)
}
