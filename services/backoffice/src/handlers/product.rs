use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use caisse_auth_types::identity::IdentityHeaders;
use caisse_domain::money::format_cents;
use caisse_domain::pagination::PageRequest;

use crate::domain::types::{Product, ProductCounts, ProductFilter, ProductStatus};
use crate::error::BackofficeError;
use crate::handlers::{
    MANAGEMENT_PAGE_SIZE, NoticeResponse, clean_term, parse_page, parse_uuid, require_admin,
};
use crate::state::AppState;
use crate::usecase::product::{
    CreateProductUseCase, DeleteProductUseCase, GetProductUseCase, ListProductsUseCase,
    ProductInput, UpdateProductUseCase,
};

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub page: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

impl ProductListQuery {
    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            term: clean_term(self.search.as_deref()),
            category_id: parse_uuid(self.category.as_deref()),
            status: self.status.as_deref().and_then(ProductStatus::parse),
        }
    }

    pub fn page(&self) -> PageRequest {
        PageRequest::new(MANAGEMENT_PAGE_SIZE, parse_page(self.page.as_deref()))
    }
}

// ── Request / response types ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ProductRequest {
    #[serde(default)]
    pub name: String,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub unit_price_cents: i64,
    pub status: Option<String>,
}

impl ProductRequest {
    fn into_input(self) -> ProductInput {
        ProductInput {
            name: self.name,
            // A missing category can never match a row; it surfaces as
            // the "unknown category" field error.
            category_id: self.category_id.unwrap_or_else(Uuid::nil),
            unit_price_cents: self.unit_price_cents,
            status: self.status,
        }
    }
}

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub category_id: Uuid,
    pub unit_price: String,
    pub status: String,
    #[serde(serialize_with = "caisse_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "caisse_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            category_id: product.category_id,
            unit_price: format_cents(product.unit_price_cents),
            status: product.status.as_str().to_owned(),
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct ProductListResponse {
    pub items: Vec<ProductResponse>,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u64,
    pub counts: ProductCounts,
}

// ── GET /products ────────────────────────────────────────────────────────────

pub async fn list_products(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ProductListResponse>, BackofficeError> {
    require_admin(&identity)?;
    let filter = query.filter();
    let page = query.page();
    let uc = ListProductsUseCase {
        repo: state.product_repo(),
    };
    let (products, counts) = uc.execute(&filter, page).await?;
    Ok(Json(ProductListResponse {
        items: products.into_iter().map(ProductResponse::from).collect(),
        page: page.page,
        per_page: page.per_page,
        total_pages: page.total_pages(counts.total),
        counts,
    }))
}

// ── POST /products ───────────────────────────────────────────────────────────

pub async fn create_product(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<ProductRequest>,
) -> Result<(StatusCode, Json<NoticeResponse>), BackofficeError> {
    require_admin(&identity)?;
    let uc = CreateProductUseCase {
        repo: state.product_repo(),
        categories: state.category_repo(),
        activity: state.activity(),
    };
    let product = uc.execute(identity.user_id, body.into_input()).await?;
    Ok((
        StatusCode::CREATED,
        Json(NoticeResponse {
            message: format!("Product '{}' created", product.name),
            id: Some(product.id),
        }),
    ))
}

// ── GET /products/{id} ───────────────────────────────────────────────────────

pub async fn get_product(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductResponse>, BackofficeError> {
    require_admin(&identity)?;
    let uc = GetProductUseCase {
        repo: state.product_repo(),
    };
    let product = uc.execute(id).await?;
    Ok(Json(product.into()))
}

// ── PATCH /products/{id} ─────────────────────────────────────────────────────

pub async fn update_product(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ProductRequest>,
) -> Result<Json<NoticeResponse>, BackofficeError> {
    require_admin(&identity)?;
    let uc = UpdateProductUseCase {
        repo: state.product_repo(),
        categories: state.category_repo(),
        activity: state.activity(),
    };
    let product = uc.execute(identity.user_id, id, body.into_input()).await?;
    Ok(Json(NoticeResponse {
        message: format!("Product '{}' updated", product.name),
        id: Some(product.id),
    }))
}

// ── DELETE /products/{id} ────────────────────────────────────────────────────

pub async fn delete_product(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<NoticeResponse>, BackofficeError> {
    require_admin(&identity)?;
    let uc = DeleteProductUseCase {
        repo: state.product_repo(),
        activity: state.activity(),
    };
    let product = uc.execute(identity.user_id, id).await?;
    Ok(Json(NoticeResponse {
        message: format!(
            "Product '{}' and its associated sale items deleted",
            product.name
        ),
        id: None,
    }))
}
