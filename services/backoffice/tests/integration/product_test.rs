use std::sync::Arc;

use uuid::Uuid;

use caisse_backoffice::error::BackofficeError;
use caisse_backoffice::usecase::product::DeleteProductUseCase;
use caisse_backoffice::usecase::sale::{CreateSaleUseCase, SaleInput};

use crate::helpers::{
    MockEmployeeRepo, MockProductRepo, MockSaleRepo, SharedStore, draft, new_store, recorder,
    test_employee, test_product,
};

fn delete_uc(
    store: &SharedStore,
) -> DeleteProductUseCase<MockProductRepo, crate::helpers::MockActivityRepo> {
    DeleteProductUseCase {
        repo: MockProductRepo {
            store: Arc::clone(store),
        },
        activity: recorder(store),
    }
}

async fn seed_sale_with_items(store: &SharedStore) -> (Uuid, Uuid, Uuid) {
    let cashier = test_employee("Jane", "Doe", "jane@shop.test");
    let beans = test_product("Espresso Beans", 1000);
    let cups = test_product("Paper Cups", 500);
    let (cashier_id, beans_id, cups_id) = (cashier.id, beans.id, cups.id);
    {
        let mut s = store.lock().unwrap();
        s.employees.push(cashier);
        s.products.push(beans);
        s.products.push(cups);
    }

    let uc = CreateSaleUseCase {
        repo: MockSaleRepo {
            store: Arc::clone(store),
        },
        products: MockProductRepo {
            store: Arc::clone(store),
        },
        employees: MockEmployeeRepo {
            store: Arc::clone(store),
        },
        activity: recorder(store),
    };
    uc.execute(
        cashier_id,
        SaleInput {
            invoice_number: "INV-20260307-0001".to_owned(),
            date: None,
            cashier_id,
            status: None,
            discount_cents: 0,
            items: vec![draft(beans_id, 2, 1000), draft(cups_id, 1, 500)],
        },
    )
    .await
    .unwrap();

    (cashier_id, beans_id, cups_id)
}

#[tokio::test]
async fn should_delete_product_and_all_its_sale_items() {
    let store = new_store();
    let (cashier_id, beans_id, _cups_id) = seed_sale_with_items(&store).await;

    let deleted = delete_uc(&store)
        .execute(cashier_id, beans_id)
        .await
        .unwrap();
    assert_eq!(deleted.name, "Espresso Beans");

    let stored = store.lock().unwrap();
    assert!(
        stored.products.iter().all(|p| p.id != beans_id),
        "product row gone"
    );
    assert!(
        stored.items.iter().all(|item| item.product_id != beans_id),
        "no sale items reference the product"
    );
    assert_eq!(stored.items.len(), 1, "other products' items untouched");
}

#[tokio::test]
async fn should_recompute_affected_sale_totals_after_cascade() {
    let store = new_store();
    let (cashier_id, beans_id, _cups_id) = seed_sale_with_items(&store).await;
    assert_eq!(store.lock().unwrap().sales[0].total_amount_cents, 2500);

    delete_uc(&store)
        .execute(cashier_id, beans_id)
        .await
        .unwrap();

    // Only the cups line (1 × 5.00) remains on the sale.
    assert_eq!(store.lock().unwrap().sales[0].total_amount_cents, 500);
}

#[tokio::test]
async fn should_record_cascade_activity_entry() {
    let store = new_store();
    let (cashier_id, beans_id, _cups_id) = seed_sale_with_items(&store).await;

    delete_uc(&store)
        .execute(cashier_id, beans_id)
        .await
        .unwrap();

    let stored = store.lock().unwrap();
    let verbs: Vec<&str> = stored.activities.iter().map(|a| a.verb.as_str()).collect();
    assert!(verbs.contains(&"Product and its sale items deleted"));
}

#[tokio::test]
async fn should_return_not_found_for_missing_product() {
    let store = new_store();
    let result = delete_uc(&store).execute(Uuid::now_v7(), Uuid::now_v7()).await;
    assert!(matches!(result, Err(BackofficeError::ProductNotFound)));
}
