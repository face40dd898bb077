use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use caisse_auth_types::identity::IdentityHeaders;
use caisse_domain::pagination::PageRequest;

use crate::domain::types::{Supplier, SupplierCounts, SupplierFilter, SupplierStatus};
use crate::error::BackofficeError;
use crate::handlers::{
    MANAGEMENT_PAGE_SIZE, NoticeResponse, clean_term, parse_page, require_admin,
};
use crate::state::AppState;
use crate::usecase::supplier::{
    CreateSupplierUseCase, DeleteSupplierUseCase, GetSupplierUseCase, ListSuppliersUseCase,
    SupplierInput, UpdateSupplierUseCase,
};

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct SupplierListQuery {
    pub page: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
}

impl SupplierListQuery {
    pub fn filter(&self) -> SupplierFilter {
        SupplierFilter {
            term: clean_term(self.search.as_deref()),
            status: self.status.as_deref().and_then(SupplierStatus::parse),
        }
    }

    pub fn page(&self) -> PageRequest {
        PageRequest::new(MANAGEMENT_PAGE_SIZE, parse_page(self.page.as_deref()))
    }
}

// ── Request / response types ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SupplierRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    pub status: Option<String>,
}

impl SupplierRequest {
    fn into_input(self) -> SupplierInput {
        SupplierInput {
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            status: self.status,
        }
    }
}

#[derive(Serialize)]
pub struct SupplierResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub status: String,
    #[serde(serialize_with = "caisse_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "caisse_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Supplier> for SupplierResponse {
    fn from(supplier: Supplier) -> Self {
        Self {
            id: supplier.id,
            name: supplier.name,
            email: supplier.email,
            phone: supplier.phone,
            address: supplier.address,
            status: supplier.status.as_str().to_owned(),
            created_at: supplier.created_at,
            updated_at: supplier.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct SupplierListResponse {
    pub items: Vec<SupplierResponse>,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u64,
    pub counts: SupplierCounts,
}

// ── GET /suppliers ───────────────────────────────────────────────────────────

pub async fn list_suppliers(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<SupplierListQuery>,
) -> Result<Json<SupplierListResponse>, BackofficeError> {
    require_admin(&identity)?;
    let filter = query.filter();
    let page = query.page();
    let uc = ListSuppliersUseCase {
        repo: state.supplier_repo(),
    };
    let (suppliers, counts) = uc.execute(&filter, page).await?;
    Ok(Json(SupplierListResponse {
        items: suppliers.into_iter().map(SupplierResponse::from).collect(),
        page: page.page,
        per_page: page.per_page,
        total_pages: page.total_pages(counts.total),
        counts,
    }))
}

// ── POST /suppliers ──────────────────────────────────────────────────────────

pub async fn create_supplier(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<SupplierRequest>,
) -> Result<(StatusCode, Json<NoticeResponse>), BackofficeError> {
    require_admin(&identity)?;
    let uc = CreateSupplierUseCase {
        repo: state.supplier_repo(),
        activity: state.activity(),
    };
    let supplier = uc.execute(identity.user_id, body.into_input()).await?;
    Ok((
        StatusCode::CREATED,
        Json(NoticeResponse {
            message: format!("Supplier {} created", supplier.name),
            id: Some(supplier.id),
        }),
    ))
}

// ── GET /suppliers/{id} ──────────────────────────────────────────────────────

pub async fn get_supplier(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SupplierResponse>, BackofficeError> {
    require_admin(&identity)?;
    let uc = GetSupplierUseCase {
        repo: state.supplier_repo(),
    };
    let supplier = uc.execute(id).await?;
    Ok(Json(supplier.into()))
}

// ── PATCH /suppliers/{id} ────────────────────────────────────────────────────

pub async fn update_supplier(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SupplierRequest>,
) -> Result<Json<NoticeResponse>, BackofficeError> {
    require_admin(&identity)?;
    let uc = UpdateSupplierUseCase {
        repo: state.supplier_repo(),
        activity: state.activity(),
    };
    let supplier = uc.execute(identity.user_id, id, body.into_input()).await?;
    Ok(Json(NoticeResponse {
        message: format!("Supplier {} updated", supplier.name),
        id: Some(supplier.id),
    }))
}

// ── DELETE /suppliers/{id} ───────────────────────────────────────────────────

pub async fn delete_supplier(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<NoticeResponse>, BackofficeError> {
    require_admin(&identity)?;
    let uc = DeleteSupplierUseCase {
        repo: state.supplier_repo(),
        activity: state.activity(),
    };
    let supplier = uc.execute(identity.user_id, id).await?;
    Ok(Json(NoticeResponse {
        message: format!("Supplier {} deleted", supplier.name),
        id: None,
    }))
}
