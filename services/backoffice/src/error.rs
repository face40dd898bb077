use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::domain::types::FieldErrors;

/// Back-office service error variants.
#[derive(Debug, thiserror::Error)]
pub enum BackofficeError {
    #[error("access denied: administrators only")]
    Forbidden,
    #[error("employee not found")]
    EmployeeNotFound,
    #[error("supplier not found")]
    SupplierNotFound,
    #[error("category not found")]
    CategoryNotFound,
    #[error("product not found")]
    ProductNotFound,
    #[error("sale not found")]
    SaleNotFound,
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl BackofficeError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Forbidden => "FORBIDDEN",
            Self::EmployeeNotFound => "EMPLOYEE_NOT_FOUND",
            Self::SupplierNotFound => "SUPPLIER_NOT_FOUND",
            Self::CategoryNotFound => "CATEGORY_NOT_FOUND",
            Self::ProductNotFound => "PRODUCT_NOT_FOUND",
            Self::SaleNotFound => "SALE_NOT_FOUND",
            Self::Validation(_) => "VALIDATION",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for BackofficeError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::EmployeeNotFound
            | Self::SupplierNotFound
            | Self::CategoryNotFound
            | Self::ProductNotFound
            | Self::SaleNotFound => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status
        // for all requests. 4xx are expected client errors.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = match &self {
            Self::Validation(errors) => serde_json::json!({
                "kind": self.kind(),
                "message": self.to_string(),
                "errors": errors,
            }),
            _ => serde_json::json!({
                "kind": self.kind(),
                "message": self.to_string(),
            }),
        };
        (status, axum::Json(body)).into_response()
    }
}
