use chrono::Utc;
use uuid::Uuid;

use caisse_domain::pagination::PageRequest;

use crate::domain::repository::{ActivityLogRepository, CategoryRepository, ProductRepository};
use crate::domain::types::{
    ActivityLevel, FieldErrors, Product, ProductCounts, ProductFilter, ProductStatus,
};
use crate::error::BackofficeError;
use crate::usecase::activity::ActivityRecorder;

// ── Input & validation ───────────────────────────────────────────────────────

pub struct ProductInput {
    pub name: String,
    pub category_id: Uuid,
    pub unit_price_cents: i64,
    /// Defaults to `active` when absent.
    pub status: Option<String>,
}

struct ProductDraft {
    name: String,
    status: ProductStatus,
}

async fn validate_product<C: CategoryRepository>(
    categories: &C,
    input: &ProductInput,
) -> Result<ProductDraft, BackofficeError> {
    let mut errors = FieldErrors::default();

    let name = input.name.trim().to_owned();
    if name.is_empty() {
        errors.add("name", "name is required");
    }

    if input.unit_price_cents < 0 {
        errors.add("unit_price", "unit price cannot be negative");
    }

    if categories.find_by_id(input.category_id).await?.is_none() {
        errors.add("category", "unknown category");
    }

    let status = match input.status.as_deref().map(str::trim) {
        None | Some("") => Some(ProductStatus::Active),
        Some(raw) => {
            let parsed = ProductStatus::parse(raw);
            if parsed.is_none() {
                errors.add("status", "unknown status");
            }
            parsed
        }
    };

    match (errors.is_empty(), status) {
        (true, Some(status)) => Ok(ProductDraft { name, status }),
        _ => Err(BackofficeError::Validation(errors)),
    }
}

// ── ListProducts ─────────────────────────────────────────────────────────────

pub struct ListProductsUseCase<R: ProductRepository> {
    pub repo: R,
}

impl<R: ProductRepository> ListProductsUseCase<R> {
    pub async fn execute(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<(Vec<Product>, ProductCounts), BackofficeError> {
        let products = self.repo.list(filter, page).await?;
        let counts = self.repo.counts(filter).await?;
        Ok((products, counts))
    }
}

// ── GetProduct ───────────────────────────────────────────────────────────────

pub struct GetProductUseCase<R: ProductRepository> {
    pub repo: R,
}

impl<R: ProductRepository> GetProductUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<Product, BackofficeError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(BackofficeError::ProductNotFound)
    }
}

// ── CreateProduct ────────────────────────────────────────────────────────────

pub struct CreateProductUseCase<R: ProductRepository, C: CategoryRepository, A: ActivityLogRepository>
{
    pub repo: R,
    pub categories: C,
    pub activity: ActivityRecorder<A>,
}

impl<R: ProductRepository, C: CategoryRepository, A: ActivityLogRepository>
    CreateProductUseCase<R, C, A>
{
    pub async fn execute(
        &self,
        acting_id: Uuid,
        input: ProductInput,
    ) -> Result<Product, BackofficeError> {
        let draft = validate_product(&self.categories, &input).await?;
        let now = Utc::now();
        let product = Product {
            id: Uuid::now_v7(),
            name: draft.name,
            category_id: input.category_id,
            unit_price_cents: input.unit_price_cents,
            status: draft.status,
            created_at: now,
            updated_at: now,
        };
        self.repo.create(&product).await?;
        self.activity
            .record(acting_id, "Product added", ActivityLevel::Success, "plus")
            .await;
        Ok(product)
    }
}

// ── UpdateProduct ────────────────────────────────────────────────────────────

pub struct UpdateProductUseCase<R: ProductRepository, C: CategoryRepository, A: ActivityLogRepository>
{
    pub repo: R,
    pub categories: C,
    pub activity: ActivityRecorder<A>,
}

impl<R: ProductRepository, C: CategoryRepository, A: ActivityLogRepository>
    UpdateProductUseCase<R, C, A>
{
    pub async fn execute(
        &self,
        acting_id: Uuid,
        id: Uuid,
        input: ProductInput,
    ) -> Result<Product, BackofficeError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(BackofficeError::ProductNotFound)?;
        let draft = validate_product(&self.categories, &input).await?;
        let product = Product {
            name: draft.name,
            category_id: input.category_id,
            unit_price_cents: input.unit_price_cents,
            status: draft.status,
            updated_at: Utc::now(),
            ..existing
        };
        if !self.repo.update(&product).await? {
            return Err(BackofficeError::ProductNotFound);
        }
        self.activity
            .record(acting_id, "Product updated", ActivityLevel::Info, "edit")
            .await;
        Ok(product)
    }
}

// ── DeleteProduct ────────────────────────────────────────────────────────────

/// Deletes a product and, first, every sale item referencing it — the
/// explicit cascade. The repository runs both steps (plus the totals
/// recompute for affected sales) in one transaction.
pub struct DeleteProductUseCase<R: ProductRepository, A: ActivityLogRepository> {
    pub repo: R,
    pub activity: ActivityRecorder<A>,
}

impl<R: ProductRepository, A: ActivityLogRepository> DeleteProductUseCase<R, A> {
    pub async fn execute(&self, acting_id: Uuid, id: Uuid) -> Result<Product, BackofficeError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(BackofficeError::ProductNotFound)?;
        if !self.repo.delete_cascading(id).await? {
            return Err(BackofficeError::ProductNotFound);
        }
        self.activity
            .record(
                acting_id,
                "Product and its sale items deleted",
                ActivityLevel::Danger,
                "trash",
            )
            .await;
        Ok(existing)
    }
}
