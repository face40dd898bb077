use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use caisse_auth_types::identity::IdentityHeaders;
use caisse_domain::pagination::PageRequest;

use crate::domain::types::{Category, CategoryFilter};
use crate::error::BackofficeError;
use crate::handlers::{
    MANAGEMENT_PAGE_SIZE, NoticeResponse, clean_term, parse_page, require_admin,
};
use crate::state::AppState;
use crate::usecase::category::{
    CategoryInput, CreateCategoryUseCase, DeleteCategoryUseCase, GetCategoryUseCase,
    ListCategoriesUseCase, UpdateCategoryUseCase,
};

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CategoryListQuery {
    pub page: Option<String>,
    pub search: Option<String>,
}

impl CategoryListQuery {
    pub fn filter(&self) -> CategoryFilter {
        CategoryFilter {
            term: clean_term(self.search.as_deref()),
        }
    }

    pub fn page(&self) -> PageRequest {
        PageRequest::new(MANAGEMENT_PAGE_SIZE, parse_page(self.page.as_deref()))
    }
}

// ── Request / response types ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CategoryRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Serialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(serialize_with = "caisse_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "caisse_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct CategoryListResponse {
    pub items: Vec<CategoryResponse>,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u64,
    pub total: u64,
}

// ── GET /categories ──────────────────────────────────────────────────────────

pub async fn list_categories(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<CategoryListQuery>,
) -> Result<Json<CategoryListResponse>, BackofficeError> {
    require_admin(&identity)?;
    let filter = query.filter();
    let page = query.page();
    let uc = ListCategoriesUseCase {
        repo: state.category_repo(),
    };
    let (categories, total) = uc.execute(&filter, page).await?;
    Ok(Json(CategoryListResponse {
        items: categories.into_iter().map(CategoryResponse::from).collect(),
        page: page.page,
        per_page: page.per_page,
        total_pages: page.total_pages(total),
        total,
    }))
}

// ── POST /categories ─────────────────────────────────────────────────────────

pub async fn create_category(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<NoticeResponse>), BackofficeError> {
    require_admin(&identity)?;
    let uc = CreateCategoryUseCase {
        repo: state.category_repo(),
        activity: state.activity(),
    };
    let category = uc
        .execute(identity.user_id, CategoryInput { name: body.name })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(NoticeResponse {
            message: format!("Category '{}' created", category.name),
            id: Some(category.id),
        }),
    ))
}

// ── GET /categories/{id} ─────────────────────────────────────────────────────

pub async fn get_category(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CategoryResponse>, BackofficeError> {
    require_admin(&identity)?;
    let uc = GetCategoryUseCase {
        repo: state.category_repo(),
    };
    let category = uc.execute(id).await?;
    Ok(Json(category.into()))
}

// ── PATCH /categories/{id} ───────────────────────────────────────────────────

pub async fn update_category(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CategoryRequest>,
) -> Result<Json<NoticeResponse>, BackofficeError> {
    require_admin(&identity)?;
    let uc = UpdateCategoryUseCase {
        repo: state.category_repo(),
        activity: state.activity(),
    };
    let category = uc
        .execute(identity.user_id, id, CategoryInput { name: body.name })
        .await?;
    Ok(Json(NoticeResponse {
        message: format!("Category '{}' updated", category.name),
        id: Some(category.id),
    }))
}

// ── DELETE /categories/{id} ──────────────────────────────────────────────────

pub async fn delete_category(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<NoticeResponse>, BackofficeError> {
    require_admin(&identity)?;
    let uc = DeleteCategoryUseCase {
        repo: state.category_repo(),
        activity: state.activity(),
    };
    let category = uc.execute(identity.user_id, id).await?;
    Ok(Json(NoticeResponse {
        message: format!("Category '{}' deleted", category.name),
        id: None,
    }))
}
