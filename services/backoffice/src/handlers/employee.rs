use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use caisse_auth_types::identity::IdentityHeaders;
use caisse_domain::pagination::PageRequest;
use caisse_domain::user::UserRole;

use crate::domain::types::{Employee, EmployeeCounts, EmployeeFilter};
use crate::error::BackofficeError;
use crate::handlers::{
    MANAGEMENT_PAGE_SIZE, NoticeResponse, clean_term, parse_page, require_admin,
};
use crate::state::AppState;
use crate::usecase::employee::{
    CreateEmployeeUseCase, DeleteEmployeeUseCase, EmployeeInput, GetEmployeeUseCase,
    ListEmployeesUseCase, UpdateEmployeeUseCase,
};

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct EmployeeListQuery {
    pub page: Option<String>,
    pub search: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

impl EmployeeListQuery {
    pub fn filter(&self) -> EmployeeFilter {
        EmployeeFilter {
            term: clean_term(self.search.as_deref()),
            role: self.role.as_deref().and_then(UserRole::parse),
            is_active: match self.status.as_deref() {
                Some("active") => Some(true),
                Some("inactive") => Some(false),
                _ => None,
            },
        }
    }

    pub fn page(&self) -> PageRequest {
        PageRequest::new(MANAGEMENT_PAGE_SIZE, parse_page(self.page.as_deref()))
    }
}

// ── Request / response types ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct EmployeeRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_is_active() -> bool {
    true
}

impl EmployeeRequest {
    fn into_input(self) -> EmployeeInput {
        EmployeeInput {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            role: self.role,
            is_active: self.is_active,
        }
    }
}

#[derive(Serialize)]
pub struct EmployeeResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: UserRole,
    pub is_active: bool,
    #[serde(serialize_with = "caisse_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "caisse_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Employee> for EmployeeResponse {
    fn from(employee: Employee) -> Self {
        Self {
            id: employee.id,
            first_name: employee.first_name,
            last_name: employee.last_name,
            email: employee.email,
            role: employee.role,
            is_active: employee.is_active,
            created_at: employee.created_at,
            updated_at: employee.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct EmployeeListResponse {
    pub items: Vec<EmployeeResponse>,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u64,
    pub counts: EmployeeCounts,
}

// ── GET /employees ───────────────────────────────────────────────────────────

pub async fn list_employees(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<EmployeeListQuery>,
) -> Result<Json<EmployeeListResponse>, BackofficeError> {
    require_admin(&identity)?;
    let filter = query.filter();
    let page = query.page();
    let uc = ListEmployeesUseCase {
        repo: state.employee_repo(),
    };
    let (employees, counts) = uc.execute(identity.user_id, &filter, page).await?;
    Ok(Json(EmployeeListResponse {
        items: employees.into_iter().map(EmployeeResponse::from).collect(),
        page: page.page,
        per_page: page.per_page,
        total_pages: page.total_pages(counts.total),
        counts,
    }))
}

// ── POST /employees ──────────────────────────────────────────────────────────

pub async fn create_employee(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<EmployeeRequest>,
) -> Result<(StatusCode, Json<NoticeResponse>), BackofficeError> {
    require_admin(&identity)?;
    let uc = CreateEmployeeUseCase {
        repo: state.employee_repo(),
        activity: state.activity(),
    };
    let employee = uc.execute(identity.user_id, body.into_input()).await?;
    Ok((
        StatusCode::CREATED,
        Json(NoticeResponse {
            message: format!("Employee {} created", employee.full_name()),
            id: Some(employee.id),
        }),
    ))
}

// ── GET /employees/{id} ──────────────────────────────────────────────────────

pub async fn get_employee(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EmployeeResponse>, BackofficeError> {
    require_admin(&identity)?;
    let uc = GetEmployeeUseCase {
        repo: state.employee_repo(),
    };
    let employee = uc.execute(identity.user_id, id).await?;
    Ok(Json(employee.into()))
}

// ── PATCH /employees/{id} ────────────────────────────────────────────────────

pub async fn update_employee(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<EmployeeRequest>,
) -> Result<Json<NoticeResponse>, BackofficeError> {
    require_admin(&identity)?;
    let uc = UpdateEmployeeUseCase {
        repo: state.employee_repo(),
        activity: state.activity(),
    };
    let employee = uc.execute(identity.user_id, id, body.into_input()).await?;
    Ok(Json(NoticeResponse {
        message: format!("Employee {} updated", employee.full_name()),
        id: Some(employee.id),
    }))
}

// ── DELETE /employees/{id} ───────────────────────────────────────────────────

pub async fn delete_employee(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<NoticeResponse>, BackofficeError> {
    require_admin(&identity)?;
    let uc = DeleteEmployeeUseCase {
        repo: state.employee_repo(),
        activity: state.activity(),
    };
    let employee = uc.execute(identity.user_id, id).await?;
    Ok(Json(NoticeResponse {
        message: format!("Employee {} deleted", employee.full_name()),
        id: None,
    }))
}
