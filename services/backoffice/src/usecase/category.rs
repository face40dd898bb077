use chrono::Utc;
use uuid::Uuid;

use caisse_domain::pagination::PageRequest;

use crate::domain::repository::{ActivityLogRepository, CategoryRepository};
use crate::domain::types::{ActivityLevel, Category, CategoryFilter, FieldErrors};
use crate::error::BackofficeError;
use crate::usecase::activity::ActivityRecorder;

pub struct CategoryInput {
    pub name: String,
}

/// Category names are unique; `existing_id` relaxes the check for the
/// record being updated.
async fn validate_category<R: CategoryRepository>(
    repo: &R,
    input: &CategoryInput,
    existing_id: Option<Uuid>,
) -> Result<String, BackofficeError> {
    let mut errors = FieldErrors::default();
    let name = input.name.trim().to_owned();
    if name.is_empty() {
        errors.add("name", "name is required");
    } else if let Some(found) = repo.find_by_name(&name).await? {
        if existing_id != Some(found.id) {
            errors.add("name", "category name already in use");
        }
    }
    errors.into_result()?;
    Ok(name)
}

pub struct ListCategoriesUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> ListCategoriesUseCase<R> {
    pub async fn execute(
        &self,
        filter: &CategoryFilter,
        page: PageRequest,
    ) -> Result<(Vec<Category>, u64), BackofficeError> {
        let categories = self.repo.list(filter, page).await?;
        let total = self.repo.count(filter).await?;
        Ok((categories, total))
    }
}

pub struct GetCategoryUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> GetCategoryUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<Category, BackofficeError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(BackofficeError::CategoryNotFound)
    }
}

pub struct CreateCategoryUseCase<R: CategoryRepository, A: ActivityLogRepository> {
    pub repo: R,
    pub activity: ActivityRecorder<A>,
}

impl<R: CategoryRepository, A: ActivityLogRepository> CreateCategoryUseCase<R, A> {
    pub async fn execute(
        &self,
        acting_id: Uuid,
        input: CategoryInput,
    ) -> Result<Category, BackofficeError> {
        let name = validate_category(&self.repo, &input, None).await?;
        let now = Utc::now();
        let category = Category {
            id: Uuid::now_v7(),
            name,
            created_at: now,
            updated_at: now,
        };
        self.repo.create(&category).await?;
        self.activity
            .record(acting_id, "Category created", ActivityLevel::Success, "tags")
            .await;
        Ok(category)
    }
}

pub struct UpdateCategoryUseCase<R: CategoryRepository, A: ActivityLogRepository> {
    pub repo: R,
    pub activity: ActivityRecorder<A>,
}

impl<R: CategoryRepository, A: ActivityLogRepository> UpdateCategoryUseCase<R, A> {
    pub async fn execute(
        &self,
        acting_id: Uuid,
        id: Uuid,
        input: CategoryInput,
    ) -> Result<Category, BackofficeError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(BackofficeError::CategoryNotFound)?;
        let name = validate_category(&self.repo, &input, Some(existing.id)).await?;
        let category = Category {
            name,
            updated_at: Utc::now(),
            ..existing
        };
        if !self.repo.update(&category).await? {
            return Err(BackofficeError::CategoryNotFound);
        }
        self.activity
            .record(acting_id, "Category updated", ActivityLevel::Info, "edit")
            .await;
        Ok(category)
    }
}

pub struct DeleteCategoryUseCase<R: CategoryRepository, A: ActivityLogRepository> {
    pub repo: R,
    pub activity: ActivityRecorder<A>,
}

impl<R: CategoryRepository, A: ActivityLogRepository> DeleteCategoryUseCase<R, A> {
    pub async fn execute(&self, acting_id: Uuid, id: Uuid) -> Result<Category, BackofficeError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(BackofficeError::CategoryNotFound)?;
        if !self.repo.delete(id).await? {
            return Err(BackofficeError::CategoryNotFound);
        }
        self.activity
            .record(acting_id, "Category deleted", ActivityLevel::Danger, "trash")
            .await;
        Ok(existing)
    }
}
