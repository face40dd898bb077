use std::sync::Arc;

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use caisse_backoffice::domain::types::format_invoice_number;
use caisse_backoffice::error::BackofficeError;
use caisse_backoffice::usecase::sale::{
    BulkDeleteSalesUseCase, CheckoutInput, CheckoutUseCase, CreateSaleUseCase,
    GetSaleDocumentUseCase, NextInvoiceUseCase, SaleInput, UpdateSaleUseCase,
};

use crate::helpers::{
    MockEmployeeRepo, MockProductRepo, MockSaleRepo, SharedStore, draft, new_store, recorder,
    test_employee, test_product,
};

fn sale_repo(store: &SharedStore) -> MockSaleRepo {
    MockSaleRepo {
        store: Arc::clone(store),
    }
}

fn product_repo(store: &SharedStore) -> MockProductRepo {
    MockProductRepo {
        store: Arc::clone(store),
    }
}

fn employee_repo(store: &SharedStore) -> MockEmployeeRepo {
    MockEmployeeRepo {
        store: Arc::clone(store),
    }
}

fn create_uc(
    store: &SharedStore,
) -> CreateSaleUseCase<MockSaleRepo, MockProductRepo, MockEmployeeRepo, crate::helpers::MockActivityRepo>
{
    CreateSaleUseCase {
        repo: sale_repo(store),
        products: product_repo(store),
        employees: employee_repo(store),
        activity: recorder(store),
    }
}

/// Seed a cashier and two products, returning (cashier_id, beans_id, cups_id).
fn seed(store: &SharedStore) -> (Uuid, Uuid, Uuid) {
    let cashier = test_employee("Jane", "Doe", "jane@shop.test");
    let beans = test_product("Espresso Beans", 1000);
    let cups = test_product("Paper Cups", 500);
    let ids = (cashier.id, beans.id, cups.id);
    let mut s = store.lock().unwrap();
    s.employees.push(cashier);
    s.products.push(beans);
    s.products.push(cups);
    ids
}

fn valid_input(cashier_id: Uuid, beans: Uuid, cups: Uuid) -> SaleInput {
    SaleInput {
        invoice_number: "INV-20260307-0001".to_owned(),
        date: None,
        cashier_id,
        status: None,
        discount_cents: 0,
        items: vec![draft(beans, 2, 1000), draft(cups, 1, 500)],
    }
}

#[tokio::test]
async fn should_store_total_equal_to_sum_of_line_totals() {
    let store = new_store();
    let (cashier, beans, cups) = seed(&store);

    let sale = create_uc(&store)
        .execute(cashier, valid_input(cashier, beans, cups))
        .await
        .unwrap();

    assert_eq!(sale.total_amount_cents, 2500);
    let stored = store.lock().unwrap();
    assert_eq!(stored.sales.len(), 1);
    assert_eq!(stored.sales[0].total_amount_cents, 2500);
    assert_eq!(stored.items.len(), 2);
}

#[tokio::test]
async fn should_persist_nothing_when_one_item_invalid() {
    let store = new_store();
    let (cashier, beans, cups) = seed(&store);

    let mut input = valid_input(cashier, beans, cups);
    input.items[1].quantity = 0; // second line invalid

    let result = create_uc(&store).execute(cashier, input).await;

    let Err(BackofficeError::Validation(errors)) = result else {
        panic!("expected validation error");
    };
    assert!(errors.field("items[1].quantity").is_some());

    // Atomicity: no header, no items, no audit entry.
    let stored = store.lock().unwrap();
    assert!(stored.sales.is_empty());
    assert!(stored.items.is_empty());
    assert!(stored.activities.is_empty());
}

#[tokio::test]
async fn should_reject_unknown_product_in_any_line() {
    let store = new_store();
    let (cashier, beans, _cups) = seed(&store);

    let input = SaleInput {
        items: vec![draft(beans, 1, 1000), draft(Uuid::now_v7(), 1, 500)],
        ..valid_input(cashier, beans, beans)
    };
    let result = create_uc(&store).execute(cashier, input).await;

    let Err(BackofficeError::Validation(errors)) = result else {
        panic!("expected validation error");
    };
    assert!(errors.field("items[1].product").is_some());
    assert!(store.lock().unwrap().sales.is_empty());
}

#[tokio::test]
async fn should_reject_duplicate_invoice_number() {
    let store = new_store();
    let (cashier, beans, cups) = seed(&store);

    create_uc(&store)
        .execute(cashier, valid_input(cashier, beans, cups))
        .await
        .unwrap();
    let result = create_uc(&store)
        .execute(cashier, valid_input(cashier, beans, cups))
        .await;

    let Err(BackofficeError::Validation(errors)) = result else {
        panic!("expected validation error");
    };
    assert_eq!(
        errors.field("invoice_number"),
        Some(&["invoice number already in use".to_owned()][..])
    );
}

#[tokio::test]
async fn should_replace_items_and_rederive_total_on_update() {
    let store = new_store();
    let (cashier, beans, cups) = seed(&store);

    let sale = create_uc(&store)
        .execute(cashier, valid_input(cashier, beans, cups))
        .await
        .unwrap();

    let uc = UpdateSaleUseCase {
        repo: sale_repo(&store),
        products: product_repo(&store),
        employees: employee_repo(&store),
        activity: recorder(&store),
    };
    let updated = uc
        .execute(
            cashier,
            sale.id,
            SaleInput {
                invoice_number: sale.invoice_number.clone(),
                date: None,
                cashier_id: cashier,
                status: Some("completed".into()),
                discount_cents: 0,
                items: vec![draft(cups, 3, 500)],
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.total_amount_cents, 1500);
    let stored = store.lock().unwrap();
    assert_eq!(stored.sales[0].total_amount_cents, 1500);
    assert_eq!(stored.items.len(), 1, "old items replaced wholesale");
}

#[tokio::test]
async fn should_return_not_found_when_updating_missing_sale() {
    let store = new_store();
    let (cashier, beans, cups) = seed(&store);

    let uc = UpdateSaleUseCase {
        repo: sale_repo(&store),
        products: product_repo(&store),
        employees: employee_repo(&store),
        activity: recorder(&store),
    };
    let result = uc
        .execute(cashier, Uuid::now_v7(), valid_input(cashier, beans, cups))
        .await;
    assert!(matches!(result, Err(BackofficeError::SaleNotFound)));
}

#[tokio::test]
async fn should_bulk_delete_exactly_the_given_ids() {
    let store = new_store();
    let (cashier, beans, cups) = seed(&store);

    let mut ids = Vec::new();
    for n in 1..=3 {
        let sale = create_uc(&store)
            .execute(
                cashier,
                SaleInput {
                    invoice_number: format!("INV-20260307-000{n}"),
                    ..valid_input(cashier, beans, cups)
                },
            )
            .await
            .unwrap();
        ids.push(sale.id);
    }

    let uc = BulkDeleteSalesUseCase {
        repo: sale_repo(&store),
        activity: recorder(&store),
    };
    let deleted = uc.execute(cashier, &ids[..2]).await.unwrap();

    assert_eq!(deleted, 2);
    let stored = store.lock().unwrap();
    assert_eq!(stored.sales.len(), 1);
    assert_eq!(stored.sales[0].id, ids[2]);
}

#[tokio::test]
async fn should_treat_empty_bulk_delete_as_noop() {
    let store = new_store();
    let (cashier, beans, cups) = seed(&store);
    create_uc(&store)
        .execute(cashier, valid_input(cashier, beans, cups))
        .await
        .unwrap();
    let activities_before = store.lock().unwrap().activities.len();

    let uc = BulkDeleteSalesUseCase {
        repo: sale_repo(&store),
        activity: recorder(&store),
    };
    let deleted = uc.execute(cashier, &[]).await.unwrap();

    assert_eq!(deleted, 0);
    let stored = store.lock().unwrap();
    assert_eq!(stored.sales.len(), 1, "nothing deleted");
    assert_eq!(
        stored.activities.len(),
        activities_before,
        "no audit entry for a no-op"
    );
}

#[tokio::test]
async fn should_record_activity_entry_on_create() {
    let store = new_store();
    let (cashier, beans, cups) = seed(&store);

    create_uc(&store)
        .execute(cashier, valid_input(cashier, beans, cups))
        .await
        .unwrap();

    let stored = store.lock().unwrap();
    assert_eq!(stored.activities.len(), 1);
    assert_eq!(stored.activities[0].verb, "Sale created");
    assert_eq!(stored.activities[0].user_id, Some(cashier));
}

#[tokio::test]
async fn should_succeed_even_when_activity_append_fails() {
    let store = new_store();
    let (cashier, beans, cups) = seed(&store);
    store.lock().unwrap().fail_activity = true;

    let sale = create_uc(&store)
        .execute(cashier, valid_input(cashier, beans, cups))
        .await
        .expect("audit failure must not fail the sale");

    let stored = store.lock().unwrap();
    assert_eq!(stored.sales.len(), 1);
    assert_eq!(stored.sales[0].id, sale.id);
    assert!(stored.activities.is_empty());
}

#[tokio::test]
async fn should_load_document_with_ordered_items() {
    let store = new_store();
    let (cashier, beans, cups) = seed(&store);

    let sale = create_uc(&store)
        .execute(cashier, valid_input(cashier, beans, cups))
        .await
        .unwrap();

    let uc = GetSaleDocumentUseCase {
        repo: sale_repo(&store),
    };
    let document = uc.execute(sale.id).await.unwrap();

    assert_eq!(document.cashier_name, "Jane Doe");
    assert_eq!(document.subtotal_cents(), 2500);
    assert_eq!(document.items[0].product_name, "Espresso Beans");
    assert_eq!(document.items[1].product_name, "Paper Cups");
}

#[tokio::test]
async fn should_generate_first_invoice_of_the_day() {
    let store = new_store();
    let uc = NextInvoiceUseCase {
        repo: sale_repo(&store),
    };
    let now = Utc.with_ymd_and_hms(2026, 3, 7, 10, 0, 0).unwrap();
    let invoice = uc.execute(now).await.unwrap();
    assert_eq!(invoice, "INV-20260307-0001");
}

#[tokio::test]
async fn should_probe_past_taken_invoice_numbers() {
    let store = new_store();
    let (cashier, beans, cups) = seed(&store);
    let now = Utc.with_ymd_and_hms(2026, 3, 7, 10, 0, 0).unwrap();

    create_uc(&store)
        .execute(
            cashier,
            SaleInput {
                invoice_number: format_invoice_number(now.date_naive(), 1),
                date: Some(now),
                ..valid_input(cashier, beans, cups)
            },
        )
        .await
        .unwrap();

    let uc = NextInvoiceUseCase {
        repo: sale_repo(&store),
    };
    let invoice = uc.execute(now).await.unwrap();
    assert_eq!(invoice, "INV-20260307-0002");
}

#[tokio::test]
async fn should_checkout_with_caller_as_cashier() {
    let store = new_store();
    let (cashier, beans, cups) = seed(&store);

    let uc = CheckoutUseCase {
        repo: sale_repo(&store),
        products: product_repo(&store),
        employees: employee_repo(&store),
        activity: recorder(&store),
    };
    let sale = uc
        .execute(
            cashier,
            CheckoutInput {
                items: vec![draft(beans, 1, 1000), draft(cups, 2, 500)],
                discount_cents: 0,
            },
        )
        .await
        .unwrap();

    assert_eq!(sale.cashier_id, cashier);
    assert!(sale.invoice_number.starts_with("INV-"));
    assert_eq!(sale.total_amount_cents, 2000);
    let stored = store.lock().unwrap();
    assert_eq!(stored.activities[0].verb, "Sale completed at the till");
}

#[tokio::test]
async fn should_reject_checkout_from_unknown_cashier() {
    let store = new_store();
    let (_cashier, beans, _cups) = seed(&store);

    let uc = CheckoutUseCase {
        repo: sale_repo(&store),
        products: product_repo(&store),
        employees: employee_repo(&store),
        activity: recorder(&store),
    };
    let result = uc
        .execute(
            Uuid::now_v7(),
            CheckoutInput {
                items: vec![draft(beans, 1, 1000)],
                discount_cents: 0,
            },
        )
        .await;

    let Err(BackofficeError::Validation(errors)) = result else {
        panic!("expected validation error");
    };
    assert!(errors.field("cashier").is_some());
    assert!(store.lock().unwrap().sales.is_empty());
}
