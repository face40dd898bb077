use chrono::Utc;
use uuid::Uuid;

use caisse_domain::pagination::PageRequest;
use caisse_domain::user::UserRole;

use crate::domain::repository::{ActivityLogRepository, EmployeeRepository};
use crate::domain::types::{
    ActivityLevel, Employee, EmployeeCounts, EmployeeFilter, FieldErrors,
};
use crate::error::BackofficeError;
use crate::usecase::activity::ActivityRecorder;

// ── Input & validation ───────────────────────────────────────────────────────

pub struct EmployeeInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
}

struct EmployeeDraft {
    first_name: String,
    last_name: String,
    email: String,
    role: UserRole,
}

/// Validate the whole submission as one unit, accumulating per-field
/// messages. `existing_id` relaxes the email-uniqueness check for the
/// record being updated.
async fn validate_employee<R: EmployeeRepository>(
    repo: &R,
    input: &EmployeeInput,
    existing_id: Option<Uuid>,
) -> Result<EmployeeDraft, BackofficeError> {
    let mut errors = FieldErrors::default();

    let first_name = input.first_name.trim().to_owned();
    if first_name.is_empty() {
        errors.add("first_name", "first name is required");
    }
    let last_name = input.last_name.trim().to_owned();
    if last_name.is_empty() {
        errors.add("last_name", "last name is required");
    }

    let email = input.email.trim().to_lowercase();
    if email.is_empty() {
        errors.add("email", "email is required");
    } else if !email.contains('@') {
        errors.add("email", "email must be a valid address");
    } else if let Some(found) = repo.find_by_email(&email).await? {
        if existing_id != Some(found.id) {
            errors.add("email", "email already in use");
        }
    }

    let role = UserRole::parse(input.role.trim());
    if role.is_none() {
        errors.add("role", "unknown role");
    }

    match (errors.is_empty(), role) {
        (true, Some(role)) => Ok(EmployeeDraft {
            first_name,
            last_name,
            email,
            role,
        }),
        _ => Err(BackofficeError::Validation(errors)),
    }
}

// ── ListEmployees ────────────────────────────────────────────────────────────

pub struct ListEmployeesUseCase<R: EmployeeRepository> {
    pub repo: R,
}

impl<R: EmployeeRepository> ListEmployeesUseCase<R> {
    pub async fn execute(
        &self,
        acting_id: Uuid,
        filter: &EmployeeFilter,
        page: PageRequest,
    ) -> Result<(Vec<Employee>, EmployeeCounts), BackofficeError> {
        let employees = self.repo.list(acting_id, filter, page).await?;
        let counts = self.repo.counts(acting_id, filter).await?;
        Ok((employees, counts))
    }
}

// ── GetEmployee ──────────────────────────────────────────────────────────────

pub struct GetEmployeeUseCase<R: EmployeeRepository> {
    pub repo: R,
}

impl<R: EmployeeRepository> GetEmployeeUseCase<R> {
    pub async fn execute(&self, acting_id: Uuid, id: Uuid) -> Result<Employee, BackofficeError> {
        self.repo
            .find_by_id(acting_id, id)
            .await?
            .ok_or(BackofficeError::EmployeeNotFound)
    }
}

// ── CreateEmployee ───────────────────────────────────────────────────────────

pub struct CreateEmployeeUseCase<R: EmployeeRepository, A: ActivityLogRepository> {
    pub repo: R,
    pub activity: ActivityRecorder<A>,
}

impl<R: EmployeeRepository, A: ActivityLogRepository> CreateEmployeeUseCase<R, A> {
    pub async fn execute(
        &self,
        acting_id: Uuid,
        input: EmployeeInput,
    ) -> Result<Employee, BackofficeError> {
        let draft = validate_employee(&self.repo, &input, None).await?;
        let now = Utc::now();
        let employee = Employee {
            id: Uuid::now_v7(),
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            role: draft.role,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        };
        self.repo.create(&employee).await?;
        self.activity
            .record(acting_id, "Employee added", ActivityLevel::Success, "user-plus")
            .await;
        Ok(employee)
    }
}

// ── UpdateEmployee ───────────────────────────────────────────────────────────

pub struct UpdateEmployeeUseCase<R: EmployeeRepository, A: ActivityLogRepository> {
    pub repo: R,
    pub activity: ActivityRecorder<A>,
}

impl<R: EmployeeRepository, A: ActivityLogRepository> UpdateEmployeeUseCase<R, A> {
    pub async fn execute(
        &self,
        acting_id: Uuid,
        id: Uuid,
        input: EmployeeInput,
    ) -> Result<Employee, BackofficeError> {
        let existing = self
            .repo
            .find_by_id(acting_id, id)
            .await?
            .ok_or(BackofficeError::EmployeeNotFound)?;
        let draft = validate_employee(&self.repo, &input, Some(existing.id)).await?;
        let employee = Employee {
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            role: draft.role,
            is_active: input.is_active,
            updated_at: Utc::now(),
            ..existing
        };
        if !self.repo.update(acting_id, &employee).await? {
            return Err(BackofficeError::EmployeeNotFound);
        }
        self.activity
            .record(acting_id, "Employee updated", ActivityLevel::Info, "edit")
            .await;
        Ok(employee)
    }
}

// ── DeleteEmployee ───────────────────────────────────────────────────────────

pub struct DeleteEmployeeUseCase<R: EmployeeRepository, A: ActivityLogRepository> {
    pub repo: R,
    pub activity: ActivityRecorder<A>,
}

impl<R: EmployeeRepository, A: ActivityLogRepository> DeleteEmployeeUseCase<R, A> {
    pub async fn execute(&self, acting_id: Uuid, id: Uuid) -> Result<Employee, BackofficeError> {
        let existing = self
            .repo
            .find_by_id(acting_id, id)
            .await?
            .ok_or(BackofficeError::EmployeeNotFound)?;
        if !self.repo.delete(acting_id, id).await? {
            return Err(BackofficeError::EmployeeNotFound);
        }
        self.activity
            .record(acting_id, "Employee deleted", ActivityLevel::Danger, "trash")
            .await;
        Ok(existing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::domain::types::ActivityLog;

    struct MockEmployeeRepo {
        employees: Arc<Mutex<Vec<Employee>>>,
    }

    impl MockEmployeeRepo {
        fn new(employees: Vec<Employee>) -> Self {
            Self {
                employees: Arc::new(Mutex::new(employees)),
            }
        }

        fn handle(&self) -> Arc<Mutex<Vec<Employee>>> {
            Arc::clone(&self.employees)
        }
    }

    impl EmployeeRepository for MockEmployeeRepo {
        async fn list(
            &self,
            acting_id: Uuid,
            filter: &EmployeeFilter,
            _page: PageRequest,
        ) -> Result<Vec<Employee>, BackofficeError> {
            Ok(self
                .employees
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.id != acting_id && filter.matches(e))
                .cloned()
                .collect())
        }

        async fn counts(
            &self,
            acting_id: Uuid,
            filter: &EmployeeFilter,
        ) -> Result<EmployeeCounts, BackofficeError> {
            let matching = self.list(acting_id, filter, PageRequest::default()).await?;
            Ok(EmployeeCounts {
                total: matching.len() as u64,
                active: matching.iter().filter(|e| e.is_active).count() as u64,
                inactive: matching.iter().filter(|e| !e.is_active).count() as u64,
            })
        }

        async fn find_by_id(
            &self,
            acting_id: Uuid,
            id: Uuid,
        ) -> Result<Option<Employee>, BackofficeError> {
            Ok(self
                .employees
                .lock()
                .unwrap()
                .iter()
                .find(|e| e.id == id && e.id != acting_id)
                .cloned())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, BackofficeError> {
            Ok(self
                .employees
                .lock()
                .unwrap()
                .iter()
                .find(|e| e.email == email)
                .cloned())
        }

        async fn exists(&self, id: Uuid) -> Result<bool, BackofficeError> {
            Ok(self.employees.lock().unwrap().iter().any(|e| e.id == id))
        }

        async fn create(&self, employee: &Employee) -> Result<(), BackofficeError> {
            self.employees.lock().unwrap().push(employee.clone());
            Ok(())
        }

        async fn update(
            &self,
            acting_id: Uuid,
            employee: &Employee,
        ) -> Result<bool, BackofficeError> {
            let mut employees = self.employees.lock().unwrap();
            match employees
                .iter_mut()
                .find(|e| e.id == employee.id && e.id != acting_id)
            {
                Some(slot) => {
                    *slot = employee.clone();
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn delete(&self, acting_id: Uuid, id: Uuid) -> Result<bool, BackofficeError> {
            let mut employees = self.employees.lock().unwrap();
            let before = employees.len();
            employees.retain(|e| !(e.id == id && e.id != acting_id));
            Ok(employees.len() < before)
        }
    }

    struct NullActivityRepo;

    impl ActivityLogRepository for NullActivityRepo {
        async fn append(&self, _entry: &ActivityLog) -> Result<(), BackofficeError> {
            Ok(())
        }
    }

    fn recorder() -> ActivityRecorder<NullActivityRepo> {
        ActivityRecorder {
            repo: NullActivityRepo,
        }
    }

    fn employee(first: &str, last: &str, email: &str) -> Employee {
        Employee {
            id: Uuid::now_v7(),
            first_name: first.to_owned(),
            last_name: last.to_owned(),
            email: email.to_owned(),
            role: UserRole::Cashier,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn valid_input() -> EmployeeInput {
        EmployeeInput {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane@shop.test".into(),
            role: "cashier".into(),
            is_active: true,
        }
    }

    #[tokio::test]
    async fn should_create_employee_with_valid_input() {
        let repo = MockEmployeeRepo::new(vec![]);
        let handle = repo.handle();
        let uc = CreateEmployeeUseCase {
            repo,
            activity: recorder(),
        };
        let created = uc.execute(Uuid::now_v7(), valid_input()).await.unwrap();
        assert_eq!(created.full_name(), "Jane Doe");
        assert_eq!(handle.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_reject_blank_names_with_field_errors() {
        let uc = CreateEmployeeUseCase {
            repo: MockEmployeeRepo::new(vec![]),
            activity: recorder(),
        };
        let result = uc
            .execute(
                Uuid::now_v7(),
                EmployeeInput {
                    first_name: "  ".into(),
                    last_name: "".into(),
                    ..valid_input()
                },
            )
            .await;
        let Err(BackofficeError::Validation(errors)) = result else {
            panic!("expected validation error");
        };
        assert!(errors.field("first_name").is_some());
        assert!(errors.field("last_name").is_some());
    }

    #[tokio::test]
    async fn should_reject_duplicate_email() {
        let existing = employee("John", "Doe", "jane@shop.test");
        let repo = MockEmployeeRepo::new(vec![existing]);
        let handle = repo.handle();
        let uc = CreateEmployeeUseCase {
            repo,
            activity: recorder(),
        };
        let result = uc.execute(Uuid::now_v7(), valid_input()).await;
        let Err(BackofficeError::Validation(errors)) = result else {
            panic!("expected validation error");
        };
        assert_eq!(
            errors.field("email"),
            Some(&["email already in use".to_owned()][..])
        );
        // Nothing persisted.
        assert_eq!(handle.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_reject_unknown_role() {
        let uc = CreateEmployeeUseCase {
            repo: MockEmployeeRepo::new(vec![]),
            activity: recorder(),
        };
        let result = uc
            .execute(
                Uuid::now_v7(),
                EmployeeInput {
                    role: "manager".into(),
                    ..valid_input()
                },
            )
            .await;
        let Err(BackofficeError::Validation(errors)) = result else {
            panic!("expected validation error");
        };
        assert!(errors.field("role").is_some());
    }

    #[tokio::test]
    async fn should_not_get_own_record() {
        let me = employee("Admin", "Own", "admin@shop.test");
        let uc = GetEmployeeUseCase {
            repo: MockEmployeeRepo::new(vec![me.clone()]),
        };
        let result = uc.execute(me.id, me.id).await;
        assert!(matches!(result, Err(BackofficeError::EmployeeNotFound)));
    }

    #[tokio::test]
    async fn should_not_update_own_record() {
        let me = employee("Admin", "Own", "admin@shop.test");
        let uc = UpdateEmployeeUseCase {
            repo: MockEmployeeRepo::new(vec![me.clone()]),
            activity: recorder(),
        };
        let result = uc.execute(me.id, me.id, valid_input()).await;
        assert!(matches!(result, Err(BackofficeError::EmployeeNotFound)));
    }

    #[tokio::test]
    async fn should_not_delete_own_record() {
        let me = employee("Admin", "Own", "admin@shop.test");
        let repo = MockEmployeeRepo::new(vec![me.clone()]);
        let handle = repo.handle();
        let uc = DeleteEmployeeUseCase {
            repo,
            activity: recorder(),
        };
        let result = uc.execute(me.id, me.id).await;
        assert!(matches!(result, Err(BackofficeError::EmployeeNotFound)));
        assert_eq!(handle.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_update_other_record_and_allow_keeping_email() {
        let other = employee("John", "Smith", "john@shop.test");
        let uc = UpdateEmployeeUseCase {
            repo: MockEmployeeRepo::new(vec![other.clone()]),
            activity: recorder(),
        };
        let updated = uc
            .execute(
                Uuid::now_v7(),
                other.id,
                EmployeeInput {
                    first_name: "Johnny".into(),
                    last_name: "Smith".into(),
                    email: "john@shop.test".into(),
                    role: "admin".into(),
                    is_active: false,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.first_name, "Johnny");
        assert_eq!(updated.role, UserRole::Admin);
        assert!(!updated.is_active);
    }

    #[tokio::test]
    async fn should_exclude_self_from_list_and_counts() {
        let me = employee("Admin", "Own", "admin@shop.test");
        let other = employee("Jane", "Doe", "jane@shop.test");
        let uc = ListEmployeesUseCase {
            repo: MockEmployeeRepo::new(vec![me.clone(), other.clone()]),
        };
        let (employees, counts) = uc
            .execute(me.id, &EmployeeFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(employees.len(), 1);
        assert_eq!(employees[0].id, other.id);
        assert_eq!(counts.total, 1);
    }
}
