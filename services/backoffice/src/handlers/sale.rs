use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use caisse_auth_types::identity::IdentityHeaders;
use caisse_core::serde::format_dmy_hm;
use caisse_domain::money::format_cents;
use caisse_domain::pagination::PageRequest;

use crate::domain::types::{Sale, SaleFilter, SaleItemDraft, SaleStatus, SaleWithItems};
use crate::error::BackofficeError;
use crate::handlers::{
    NoticeResponse, SALES_PAGE_SIZE, clean_term, parse_date, parse_page, parse_uuid,
};
use crate::state::AppState;
use crate::usecase::sale::{
    BulkDeleteSalesUseCase, CheckoutInput, CheckoutUseCase, CreateSaleUseCase, DeleteSaleUseCase,
    GetSaleDocumentUseCase, GetSaleUseCase, ListSalesUseCase, NextInvoiceUseCase, SaleInput,
    UpdateSaleUseCase,
};

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct SaleListQuery {
    pub page: Option<String>,
    pub product_name: Option<String>,
    pub invoice_number: Option<String>,
    pub cashier: Option<String>,
    pub status: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl SaleListQuery {
    pub fn filter(&self) -> SaleFilter {
        SaleFilter {
            product_name: clean_term(self.product_name.as_deref()),
            invoice_number: clean_term(self.invoice_number.as_deref()),
            cashier_id: parse_uuid(self.cashier.as_deref()),
            status: self.status.as_deref().and_then(SaleStatus::parse),
            date_from: parse_date(self.date_from.as_deref()),
            date_to: parse_date(self.date_to.as_deref()),
        }
    }

    pub fn page(&self) -> PageRequest {
        PageRequest::new(SALES_PAGE_SIZE, parse_page(self.page.as_deref()))
    }
}

// ── Request / response types ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SaleItemRequest {
    pub product_id: Uuid,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub unit_price_cents: i64,
}

impl SaleItemRequest {
    fn into_draft(self) -> SaleItemDraft {
        SaleItemDraft {
            product_id: self.product_id,
            quantity: self.quantity,
            unit_price_cents: self.unit_price_cents,
        }
    }
}

#[derive(Deserialize)]
pub struct SaleRequest {
    #[serde(default)]
    pub invoice_number: String,
    pub date: Option<DateTime<Utc>>,
    pub cashier_id: Option<Uuid>,
    pub status: Option<String>,
    #[serde(default)]
    pub discount_cents: i64,
    #[serde(default)]
    pub items: Vec<SaleItemRequest>,
}

impl SaleRequest {
    fn into_input(self) -> SaleInput {
        SaleInput {
            invoice_number: self.invoice_number,
            date: self.date,
            // A missing cashier can never match a row; it surfaces as
            // the "unknown cashier" field error.
            cashier_id: self.cashier_id.unwrap_or_else(Uuid::nil),
            status: self.status,
            discount_cents: self.discount_cents,
            items: self
                .items
                .into_iter()
                .map(SaleItemRequest::into_draft)
                .collect(),
        }
    }
}

#[derive(Serialize)]
pub struct SaleResponse {
    pub id: Uuid,
    pub invoice_number: String,
    #[serde(serialize_with = "caisse_core::serde::to_rfc3339_ms")]
    pub date: DateTime<Utc>,
    pub cashier_id: Uuid,
    pub status: String,
    pub discount: String,
    pub total_amount: String,
}

impl From<Sale> for SaleResponse {
    fn from(sale: Sale) -> Self {
        Self {
            id: sale.id,
            invoice_number: sale.invoice_number,
            date: sale.date,
            cashier_id: sale.cashier_id,
            status: sale.status.as_str().to_owned(),
            discount: format_cents(sale.discount_cents),
            total_amount: format_cents(sale.total_amount_cents),
        }
    }
}

#[derive(Serialize)]
pub struct SaleListResponse {
    pub items: Vec<SaleResponse>,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u64,
    pub total: u64,
    /// Sum of the returned page's totals, two-decimal string.
    pub page_revenue: String,
}

/// The read-only JSON projection of a sale: monetary values as strings
/// fixed to two decimals, date as `dd/mm/yyyy HH:MM`, items in stored
/// order.
#[derive(Serialize)]
pub struct SaleJson {
    pub invoice_number: String,
    pub date: String,
    pub cashier: String,
    pub subtotal: String,
    pub discount: String,
    pub total_amount: String,
    pub items: Vec<SaleItemJson>,
}

#[derive(Serialize)]
pub struct SaleItemJson {
    pub product: String,
    pub quantity: i32,
    pub unit_price: String,
    pub line_total: String,
}

impl From<SaleWithItems> for SaleJson {
    fn from(document: SaleWithItems) -> Self {
        let subtotal = document.subtotal_cents();
        Self {
            invoice_number: document.sale.invoice_number.clone(),
            date: format_dmy_hm(&document.sale.date),
            cashier: document.cashier_name.clone(),
            subtotal: format_cents(subtotal),
            discount: format_cents(document.sale.discount_cents),
            total_amount: format_cents(document.sale.total_amount_cents),
            items: document
                .items
                .into_iter()
                .map(|item| SaleItemJson {
                    product: item.product_name.clone(),
                    quantity: item.quantity,
                    unit_price: format_cents(item.unit_price_cents),
                    line_total: format_cents(item.line_total_cents()),
                })
                .collect(),
        }
    }
}

#[derive(Deserialize)]
pub struct BulkDeleteRequest {
    #[serde(default)]
    pub sale_ids: Vec<Uuid>,
}

#[derive(Serialize)]
pub struct BulkDeleteResponse {
    pub message: String,
    pub deleted: u64,
}

#[derive(Serialize)]
pub struct InvoiceNumberResponse {
    pub invoice_number: String,
}

#[derive(Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub items: Vec<SaleItemRequest>,
    #[serde(default)]
    pub discount_cents: i64,
}

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub message: String,
    pub id: Uuid,
    pub invoice_number: String,
    pub total_amount: String,
}

// ── GET /sales ───────────────────────────────────────────────────────────────

pub async fn list_sales(
    _identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<SaleListQuery>,
) -> Result<Json<SaleListResponse>, BackofficeError> {
    let filter = query.filter();
    let page = query.page();
    let uc = ListSalesUseCase {
        repo: state.sale_repo(),
    };
    let (sales, total) = uc.execute(&filter, page).await?;
    let page_revenue: i64 = sales.iter().map(|sale| sale.total_amount_cents).sum();
    Ok(Json(SaleListResponse {
        items: sales.into_iter().map(SaleResponse::from).collect(),
        page: page.page,
        per_page: page.per_page,
        total_pages: page.total_pages(total),
        total,
        page_revenue: format_cents(page_revenue),
    }))
}

// ── POST /sales ──────────────────────────────────────────────────────────────

pub async fn create_sale(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<SaleRequest>,
) -> Result<(StatusCode, Json<NoticeResponse>), BackofficeError> {
    let uc = CreateSaleUseCase {
        repo: state.sale_repo(),
        products: state.product_repo(),
        employees: state.employee_repo(),
        activity: state.activity(),
    };
    let sale = uc.execute(identity.user_id, body.into_input()).await?;
    Ok((
        StatusCode::CREATED,
        Json(NoticeResponse {
            message: format!("Sale {} recorded", sale.invoice_number),
            id: Some(sale.id),
        }),
    ))
}

// ── GET /sales/{id} ──────────────────────────────────────────────────────────

pub async fn get_sale(
    _identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SaleResponse>, BackofficeError> {
    let uc = GetSaleUseCase {
        repo: state.sale_repo(),
    };
    let sale = uc.execute(id).await?;
    Ok(Json(sale.into()))
}

// ── PATCH /sales/{id} ────────────────────────────────────────────────────────

pub async fn update_sale(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SaleRequest>,
) -> Result<Json<NoticeResponse>, BackofficeError> {
    let uc = UpdateSaleUseCase {
        repo: state.sale_repo(),
        products: state.product_repo(),
        employees: state.employee_repo(),
        activity: state.activity(),
    };
    let sale = uc.execute(identity.user_id, id, body.into_input()).await?;
    Ok(Json(NoticeResponse {
        message: format!("Sale {} updated", sale.invoice_number),
        id: Some(sale.id),
    }))
}

// ── DELETE /sales/{id} ───────────────────────────────────────────────────────

pub async fn delete_sale(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<NoticeResponse>, BackofficeError> {
    let uc = DeleteSaleUseCase {
        repo: state.sale_repo(),
        activity: state.activity(),
    };
    let sale = uc.execute(identity.user_id, id).await?;
    Ok(Json(NoticeResponse {
        message: format!("Sale {} deleted", sale.invoice_number),
        id: None,
    }))
}

// ── GET /sales/{id}/json ─────────────────────────────────────────────────────

pub async fn sale_json(
    _identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SaleJson>, BackofficeError> {
    let uc = GetSaleDocumentUseCase {
        repo: state.sale_repo(),
    };
    let document = uc.execute(id).await?;
    Ok(Json(document.into()))
}

// ── POST /sales/bulk-delete ──────────────────────────────────────────────────

pub async fn bulk_delete_sales(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<BulkDeleteRequest>,
) -> Result<Json<BulkDeleteResponse>, BackofficeError> {
    let uc = BulkDeleteSalesUseCase {
        repo: state.sale_repo(),
        activity: state.activity(),
    };
    let deleted = uc.execute(identity.user_id, &body.sale_ids).await?;
    let message = if body.sale_ids.is_empty() {
        "no sales selected".to_owned()
    } else {
        format!("{deleted} sale(s) deleted")
    };
    Ok(Json(BulkDeleteResponse { message, deleted }))
}

// ── GET /sales/next-invoice ──────────────────────────────────────────────────

pub async fn next_invoice(
    _identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<InvoiceNumberResponse>, BackofficeError> {
    let uc = NextInvoiceUseCase {
        repo: state.sale_repo(),
    };
    let invoice_number = uc.execute(Utc::now()).await?;
    Ok(Json(InvoiceNumberResponse { invoice_number }))
}

// ── POST /checkout ───────────────────────────────────────────────────────────

pub async fn checkout(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), BackofficeError> {
    let uc = CheckoutUseCase {
        repo: state.sale_repo(),
        products: state.product_repo(),
        employees: state.employee_repo(),
        activity: state.activity(),
    };
    let sale = uc
        .execute(
            identity.user_id,
            CheckoutInput {
                items: body
                    .items
                    .into_iter()
                    .map(SaleItemRequest::into_draft)
                    .collect(),
                discount_cents: body.discount_cents,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            message: format!("Sale {} recorded", sale.invoice_number),
            id: sale.id,
            invoice_number: sale.invoice_number,
            total_amount: format_cents(sale.total_amount_cents),
        }),
    ))
}
