pub mod category;
pub mod dashboard;
pub mod employee;
pub mod product;
pub mod sale;
pub mod supplier;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use caisse_auth_types::identity::IdentityHeaders;

use crate::error::BackofficeError;

/// Fixed page size for the management list screens.
pub const MANAGEMENT_PAGE_SIZE: u32 = 15;
/// Fixed page size for the sales list screen.
pub const SALES_PAGE_SIZE: u32 = 7;

/// Admin guard applied at the top of every management handler, before
/// any other work. Sales and checkout surfaces only require an
/// authenticated identity (the extractor already enforced that).
pub fn require_admin(identity: &IdentityHeaders) -> Result<(), BackofficeError> {
    if identity.is_admin() {
        Ok(())
    } else {
        Err(BackofficeError::Forbidden)
    }
}

/// Success notice accompanying a mutation, naming the affected record.
#[derive(Serialize)]
pub struct NoticeResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
}

// Lenient query-parameter parsing: a malformed value means "no filter
// for that field", never an error.

pub(crate) fn clean_term(raw: Option<&str>) -> Option<String> {
    let term = raw?.trim();
    if term.is_empty() {
        None
    } else {
        Some(term.to_owned())
    }
}

pub(crate) fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(1)
}

pub(crate) fn parse_uuid(raw: Option<&str>) -> Option<Uuid> {
    raw?.trim().parse().ok()
}

pub(crate) fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw?.trim(), "%Y-%m-%d").ok()
}
