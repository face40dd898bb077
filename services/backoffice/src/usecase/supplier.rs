use chrono::Utc;
use uuid::Uuid;

use caisse_domain::pagination::PageRequest;

use crate::domain::repository::{ActivityLogRepository, SupplierRepository};
use crate::domain::types::{
    ActivityLevel, FieldErrors, Supplier, SupplierCounts, SupplierFilter, SupplierStatus,
};
use crate::error::BackofficeError;
use crate::usecase::activity::ActivityRecorder;

// ── Input & validation ───────────────────────────────────────────────────────

pub struct SupplierInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Defaults to `active` when absent.
    pub status: Option<String>,
}

struct SupplierDraft {
    name: String,
    status: SupplierStatus,
}

fn validate_supplier(input: &SupplierInput) -> Result<SupplierDraft, BackofficeError> {
    let mut errors = FieldErrors::default();

    let name = input.name.trim().to_owned();
    if name.is_empty() {
        errors.add("name", "name is required");
    }

    let email = input.email.trim();
    if !email.is_empty() && !email.contains('@') {
        errors.add("email", "email must be a valid address");
    }

    let status = match input.status.as_deref().map(str::trim) {
        None | Some("") => Some(SupplierStatus::Active),
        Some(raw) => {
            let parsed = SupplierStatus::parse(raw);
            if parsed.is_none() {
                errors.add("status", "unknown status");
            }
            parsed
        }
    };

    match (errors.is_empty(), status) {
        (true, Some(status)) => Ok(SupplierDraft { name, status }),
        _ => Err(BackofficeError::Validation(errors)),
    }
}

// ── ListSuppliers ────────────────────────────────────────────────────────────

pub struct ListSuppliersUseCase<R: SupplierRepository> {
    pub repo: R,
}

impl<R: SupplierRepository> ListSuppliersUseCase<R> {
    pub async fn execute(
        &self,
        filter: &SupplierFilter,
        page: PageRequest,
    ) -> Result<(Vec<Supplier>, SupplierCounts), BackofficeError> {
        let suppliers = self.repo.list(filter, page).await?;
        let counts = self.repo.counts(filter).await?;
        Ok((suppliers, counts))
    }
}

// ── GetSupplier ──────────────────────────────────────────────────────────────

pub struct GetSupplierUseCase<R: SupplierRepository> {
    pub repo: R,
}

impl<R: SupplierRepository> GetSupplierUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<Supplier, BackofficeError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(BackofficeError::SupplierNotFound)
    }
}

// ── CreateSupplier ───────────────────────────────────────────────────────────

pub struct CreateSupplierUseCase<R: SupplierRepository, A: ActivityLogRepository> {
    pub repo: R,
    pub activity: ActivityRecorder<A>,
}

impl<R: SupplierRepository, A: ActivityLogRepository> CreateSupplierUseCase<R, A> {
    pub async fn execute(
        &self,
        acting_id: Uuid,
        input: SupplierInput,
    ) -> Result<Supplier, BackofficeError> {
        let draft = validate_supplier(&input)?;
        let now = Utc::now();
        let supplier = Supplier {
            id: Uuid::now_v7(),
            name: draft.name,
            email: input.email.trim().to_owned(),
            phone: input.phone.trim().to_owned(),
            address: input.address.trim().to_owned(),
            status: draft.status,
            created_at: now,
            updated_at: now,
        };
        self.repo.create(&supplier).await?;
        self.activity
            .record(acting_id, "Supplier created", ActivityLevel::Success, "truck")
            .await;
        Ok(supplier)
    }
}

// ── UpdateSupplier ───────────────────────────────────────────────────────────

pub struct UpdateSupplierUseCase<R: SupplierRepository, A: ActivityLogRepository> {
    pub repo: R,
    pub activity: ActivityRecorder<A>,
}

impl<R: SupplierRepository, A: ActivityLogRepository> UpdateSupplierUseCase<R, A> {
    pub async fn execute(
        &self,
        acting_id: Uuid,
        id: Uuid,
        input: SupplierInput,
    ) -> Result<Supplier, BackofficeError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(BackofficeError::SupplierNotFound)?;
        let draft = validate_supplier(&input)?;
        let supplier = Supplier {
            name: draft.name,
            email: input.email.trim().to_owned(),
            phone: input.phone.trim().to_owned(),
            address: input.address.trim().to_owned(),
            status: draft.status,
            updated_at: Utc::now(),
            ..existing
        };
        if !self.repo.update(&supplier).await? {
            return Err(BackofficeError::SupplierNotFound);
        }
        self.activity
            .record(acting_id, "Supplier updated", ActivityLevel::Info, "edit")
            .await;
        Ok(supplier)
    }
}

// ── DeleteSupplier ───────────────────────────────────────────────────────────

pub struct DeleteSupplierUseCase<R: SupplierRepository, A: ActivityLogRepository> {
    pub repo: R,
    pub activity: ActivityRecorder<A>,
}

impl<R: SupplierRepository, A: ActivityLogRepository> DeleteSupplierUseCase<R, A> {
    pub async fn execute(&self, acting_id: Uuid, id: Uuid) -> Result<Supplier, BackofficeError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(BackofficeError::SupplierNotFound)?;
        if !self.repo.delete(id).await? {
            return Err(BackofficeError::SupplierNotFound);
        }
        self.activity
            .record(acting_id, "Supplier deleted", ActivityLevel::Danger, "trash")
            .await;
        Ok(existing)
    }
}
