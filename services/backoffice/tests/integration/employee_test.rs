use std::sync::Arc;

use uuid::Uuid;

use caisse_backoffice::domain::types::EmployeeFilter;
use caisse_backoffice::error::BackofficeError;
use caisse_backoffice::usecase::employee::{
    CreateEmployeeUseCase, DeleteEmployeeUseCase, EmployeeInput, ListEmployeesUseCase,
};
use caisse_domain::pagination::PageRequest;

use crate::helpers::{MockEmployeeRepo, SharedStore, new_store, recorder, test_employee};

fn employee_repo(store: &SharedStore) -> MockEmployeeRepo {
    MockEmployeeRepo {
        store: Arc::clone(store),
    }
}

/// Seed three employees; returns (admin_id, martin_id). Greta Martin is
/// active, Hugo Martin is not.
fn seed(store: &SharedStore) -> (Uuid, Uuid) {
    let admin = test_employee("Alice", "Admin", "alice@shop.test");
    let greta = test_employee("Greta", "Martin", "greta@shop.test");
    let mut hugo = test_employee("Hugo", "Martin", "hugo@shop.test");
    hugo.is_active = false;
    let ids = (admin.id, greta.id);
    let mut s = store.lock().unwrap();
    s.employees.push(admin);
    s.employees.push(greta);
    s.employees.push(hugo);
    ids
}

fn term(t: &str) -> EmployeeFilter {
    EmployeeFilter {
        term: Some(t.to_owned()),
        ..Default::default()
    }
}

#[tokio::test]
async fn should_find_same_record_by_first_name_last_name_or_email() {
    let store = new_store();
    let (admin, greta) = seed(&store);
    let uc = ListEmployeesUseCase {
        repo: employee_repo(&store),
    };

    for t in ["greta", "GRETA", "greta@shop"] {
        let (found, _) = uc
            .execute(admin, &term(t), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(found.len(), 1, "term {t:?}");
        assert_eq!(found[0].id, greta);
    }

    // Last name hits both Martins.
    let (found, _) = uc
        .execute(admin, &term("martin"), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn should_intersect_search_term_with_status() {
    let store = new_store();
    let (admin, greta) = seed(&store);
    let uc = ListEmployeesUseCase {
        repo: employee_repo(&store),
    };

    let filter = EmployeeFilter {
        is_active: Some(true),
        ..term("martin")
    };
    let (found, counts) = uc
        .execute(admin, &filter, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, greta);
    // Counts come from the filtered set, not the whole table.
    assert_eq!(counts.total, 1);
    assert_eq!(counts.active, 1);
    assert_eq!(counts.inactive, 0);
}

#[tokio::test]
async fn should_never_surface_the_acting_admins_own_record() {
    let store = new_store();
    let (admin, _) = seed(&store);
    let uc = ListEmployeesUseCase {
        repo: employee_repo(&store),
    };

    let (found, counts) = uc
        .execute(admin, &EmployeeFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|e| e.id != admin));
    assert_eq!(counts.total, 2);

    // Even an exact-match search cannot reach it.
    let (found, _) = uc
        .execute(admin, &term("alice@shop.test"), PageRequest::default())
        .await
        .unwrap();
    assert!(found.is_empty());

    let delete = DeleteEmployeeUseCase {
        repo: employee_repo(&store),
        activity: recorder(&store),
    };
    let result = delete.execute(admin, admin).await;
    assert!(matches!(result, Err(BackofficeError::EmployeeNotFound)));
    assert_eq!(store.lock().unwrap().employees.len(), 3);
}

#[tokio::test]
async fn should_create_employee_and_record_activity() {
    let store = new_store();
    let (admin, _) = seed(&store);
    let uc = CreateEmployeeUseCase {
        repo: employee_repo(&store),
        activity: recorder(&store),
    };

    let created = uc
        .execute(
            admin,
            EmployeeInput {
                first_name: "Nadia".into(),
                last_name: "Osei".into(),
                email: "nadia@shop.test".into(),
                role: "cashier".into(),
                is_active: true,
            },
        )
        .await
        .unwrap();

    let stored = store.lock().unwrap();
    assert!(stored.employees.iter().any(|e| e.id == created.id));
    assert_eq!(stored.activities.len(), 1);
    assert_eq!(stored.activities[0].verb, "Employee added");
    assert_eq!(stored.activities[0].user_id, Some(admin));
}
