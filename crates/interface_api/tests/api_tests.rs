//! End-to-end API tests
//!
//! Each test boots a fresh in-process engine with the standard chart
//! of accounts and drives it through the HTTP surface.

use axum_test::TestServer;
use serde_json::{json, Value};

use interface_api::auth::create_token;
use interface_api::config::ApiConfig;
use interface_api::state::{AppState, Engine};
use interface_api::create_router;

const TEST_SECRET: &str = "test-secret";

fn test_config() -> ApiConfig {
    ApiConfig {
        jwt_secret: TEST_SECRET.to_string(),
        ..ApiConfig::default()
    }
}

fn test_server() -> (TestServer, String) {
    let config = test_config();
    let engine = Engine::bootstrap(core_kernel::Currency::USD).expect("bootstrap");
    let app = create_router(AppState::new(engine, config));
    let server = TestServer::new(app).expect("test server");
    let token = create_token(
        "test-user",
        vec!["admin".to_string()],
        TEST_SECRET,
        3600,
    )
    .expect("token");
    (server, token)
}

/// Finds an account id in the standard chart by display number
async fn account_id(server: &TestServer, token: &str, number: &str) -> String {
    let response = server
        .get("/api/v1/accounts")
        .authorization_bearer(token)
        .await;
    response.assert_status_ok();
    let accounts: Vec<Value> = response.json();
    accounts
        .iter()
        .find(|a| a["number"] == number)
        .unwrap_or_else(|| panic!("no account numbered {number}"))["id"]
        .as_str()
        .expect("id")
        .to_string()
}

#[tokio::test]
async fn health_needs_no_auth() {
    let (server, _) = test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn protected_routes_reject_missing_token() {
    let (server, _) = test_server();
    let response = server.get("/api/v1/accounts").await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn protected_routes_reject_bad_token() {
    let (server, _) = test_server();
    let response = server
        .get("/api/v1/accounts")
        .authorization_bearer("not-a-jwt")
        .await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn create_and_list_accounts() {
    let (server, token) = test_server();

    let response = server
        .post("/api/v1/accounts")
        .authorization_bearer(&token)
        .json(&json!({
            "number": "1020",
            "name": "Petty Cash",
            "account_type": "Cash",
            "description": "Office float"
        }))
        .await;
    response.assert_status_ok();
    let created: Value = response.json();
    assert_eq!(created["number"], "1020");
    assert_eq!(created["normal_balance"], "DEBIT");
    assert_eq!(created["balance"], "0");

    let response = server
        .get("/api/v1/accounts")
        .authorization_bearer(&token)
        .await;
    let accounts: Vec<Value> = response.json();
    assert!(accounts.iter().any(|a| a["number"] == "1020"));
}

#[tokio::test]
async fn duplicate_account_number_conflicts() {
    let (server, token) = test_server();
    let body = json!({
        "number": "1000",
        "name": "Second Cash",
        "account_type": "Cash"
    });
    let response = server
        .post("/api/v1/accounts")
        .authorization_bearer(&token)
        .json(&body)
        .await;
    assert_eq!(response.status_code(), 409);
}

#[tokio::test]
async fn journal_entry_post_moves_balances() {
    let (server, token) = test_server();
    let cash = account_id(&server, &token, "1000").await;
    let sales = account_id(&server, &token, "4000").await;

    let response = server
        .post("/api/v1/journal-entries")
        .authorization_bearer(&token)
        .json(&json!({
            "entry_date": "2024-03-01",
            "description": "Cash sale",
            "lines": [
                { "account_id": cash, "debit": "500.00" },
                { "account_id": sales, "credit": "500.00" }
            ]
        }))
        .await;
    response.assert_status_ok();
    let entry: Value = response.json();
    assert_eq!(entry["status"], "DRAFT");
    let entry_id = entry["id"].as_str().expect("id").to_string();

    let response = server
        .post(&format!("/api/v1/journal-entries/{entry_id}/post"))
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let posted: Value = response.json();
    assert_eq!(posted["status"], "POSTED");
    assert_eq!(posted["posted_by"], "test-user");
    assert_eq!(posted["entry_number"], "JE-0001");

    let response = server
        .get(&format!("/api/v1/accounts/{cash}"))
        .authorization_bearer(&token)
        .await;
    let account: Value = response.json();
    assert_eq!(account["balance"], "500.00");
}

#[tokio::test]
async fn unbalanced_entry_post_is_unprocessable() {
    let (server, token) = test_server();
    let cash = account_id(&server, &token, "1000").await;
    let sales = account_id(&server, &token, "4000").await;

    let response = server
        .post("/api/v1/journal-entries")
        .authorization_bearer(&token)
        .json(&json!({
            "entry_date": "2024-03-01",
            "description": "Lopsided",
            "lines": [
                { "account_id": cash, "debit": "500.00" },
                { "account_id": sales, "credit": "400.00" }
            ]
        }))
        .await;
    let entry_id = response.json::<Value>()["id"]
        .as_str()
        .expect("id")
        .to_string();

    let response = server
        .post(&format!("/api/v1/journal-entries/{entry_id}/post"))
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), 422);
    let body: Value = response.json();
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn void_restores_trial_balance() {
    let (server, token) = test_server();
    let cash = account_id(&server, &token, "1000").await;
    let sales = account_id(&server, &token, "4000").await;

    let response = server
        .post("/api/v1/journal-entries")
        .authorization_bearer(&token)
        .json(&json!({
            "entry_date": "2024-03-01",
            "description": "Cash sale",
            "lines": [
                { "account_id": cash, "debit": "500.00" },
                { "account_id": sales, "credit": "500.00" }
            ]
        }))
        .await;
    let entry_id = response.json::<Value>()["id"]
        .as_str()
        .expect("id")
        .to_string();
    server
        .post(&format!("/api/v1/journal-entries/{entry_id}/post"))
        .authorization_bearer(&token)
        .await
        .assert_status_ok();

    let response = server
        .post(&format!("/api/v1/journal-entries/{entry_id}/void"))
        .authorization_bearer(&token)
        .json(&json!({ "reason": "entered twice" }))
        .await;
    response.assert_status_ok();
    let voided: Value = response.json();
    assert_eq!(voided["status"], "VOID");
    assert_eq!(voided["void_reason"], "entered twice");

    let response = server
        .get(&format!("/api/v1/accounts/{cash}"))
        .authorization_bearer(&token)
        .await;
    let account: Value = response.json();
    assert_eq!(account["balance"], "0.00");
}

#[tokio::test]
async fn invoice_issue_and_settle_by_payment() {
    let (server, token) = test_server();
    let party = uuid::Uuid::new_v4();

    let response = server
        .post("/api/v1/documents/invoices")
        .authorization_bearer(&token)
        .json(&json!({
            "party_id": party,
            "document_date": "2024-04-01",
            "due_date": "2024-04-30",
            "lines": [
                { "description": "Consulting", "quantity": "10", "unit_price": "100.00" }
            ]
        }))
        .await;
    response.assert_status_ok();
    let draft: Value = response.json();
    assert_eq!(draft["status"], "DRAFT");
    assert_eq!(draft["total"], "1000.00");
    let id = draft["id"].as_str().expect("id").to_string();

    let response = server
        .post(&format!("/api/v1/documents/invoices/{id}/issue"))
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let issued: Value = response.json();
    assert_eq!(issued["status"], "SENT");
    assert_eq!(issued["number"], "INV-0001");
    assert!(issued["journal_entry_id"].is_string());

    // A/R carries the open balance
    let ar = account_id(&server, &token, "1100").await;
    let response = server
        .get(&format!("/api/v1/accounts/{ar}"))
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.json::<Value>()["balance"], "1000.00");

    let response = server
        .post(&format!("/api/v1/documents/invoices/{id}/payments"))
        .authorization_bearer(&token)
        .json(&json!({
            "amount": "400.00",
            "payment_date": "2024-04-10",
            "method": "BANK_TRANSFER"
        }))
        .await;
    response.assert_status_ok();

    let response = server
        .get(&format!("/api/v1/documents/invoices/{id}"))
        .authorization_bearer(&token)
        .await;
    let partial: Value = response.json();
    assert_eq!(partial["status"], "PARTIALLY_PAID");
    assert_eq!(partial["remaining_balance"], "600.00");

    let response = server
        .post(&format!("/api/v1/documents/invoices/{id}/payments"))
        .authorization_bearer(&token)
        .json(&json!({
            "amount": "600.00",
            "payment_date": "2024-04-20",
            "method": "BANK_TRANSFER"
        }))
        .await;
    response.assert_status_ok();

    let response = server
        .get(&format!("/api/v1/documents/invoices/{id}"))
        .authorization_bearer(&token)
        .await;
    let settled: Value = response.json();
    assert_eq!(settled["status"], "PAID");
    assert_eq!(settled["remaining_balance"], "0.00");
}

#[tokio::test]
async fn recorded_payments_are_listed() {
    let (server, token) = test_server();
    let party = uuid::Uuid::new_v4();

    let response = server
        .post("/api/v1/documents/invoices")
        .authorization_bearer(&token)
        .json(&json!({
            "party_id": party,
            "document_date": "2024-04-01",
            "lines": [
                { "description": "Consulting", "quantity": "1", "unit_price": "300.00" }
            ]
        }))
        .await;
    let id = response.json::<Value>()["id"]
        .as_str()
        .expect("id")
        .to_string();
    server
        .post(&format!("/api/v1/documents/invoices/{id}/issue"))
        .authorization_bearer(&token)
        .await
        .assert_status_ok();
    server
        .post(&format!("/api/v1/documents/invoices/{id}/payments"))
        .authorization_bearer(&token)
        .json(&json!({
            "amount": "300.00",
            "payment_date": "2024-04-10",
            "method": "CARD",
            "reference": "AUTH-99231"
        }))
        .await
        .assert_status_ok();

    let response = server
        .get("/api/v1/payments")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let payments: Vec<Value> = response.json();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0]["amount"], "300.00");
    assert_eq!(payments[0]["method"], "CARD");
    assert_eq!(payments[0]["reference"], "AUTH-99231");
    assert_eq!(payments[0]["applied_to"], id.as_str());

    let payment_id = payments[0]["id"].as_str().expect("id").to_string();
    server
        .get(&format!("/api/v1/payments/{payment_id}"))
        .authorization_bearer(&token)
        .await
        .assert_status_ok();

    let missing = uuid::Uuid::new_v4();
    let response = server
        .get(&format!("/api/v1/payments/{missing}"))
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn issued_invoice_rejects_edit_and_reissue() {
    let (server, token) = test_server();
    let party = uuid::Uuid::new_v4();

    let response = server
        .post("/api/v1/documents/invoices")
        .authorization_bearer(&token)
        .json(&json!({
            "party_id": party,
            "document_date": "2024-04-01",
            "lines": [
                { "description": "Widget", "quantity": "1", "unit_price": "50.00" }
            ]
        }))
        .await;
    let id = response.json::<Value>()["id"]
        .as_str()
        .expect("id")
        .to_string();
    server
        .post(&format!("/api/v1/documents/invoices/{id}/issue"))
        .authorization_bearer(&token)
        .await
        .assert_status_ok();

    let response = server
        .put(&format!("/api/v1/documents/invoices/{id}"))
        .authorization_bearer(&token)
        .json(&json!({
            "lines": [
                { "description": "Widget", "quantity": "2", "unit_price": "50.00" }
            ]
        }))
        .await;
    assert_eq!(response.status_code(), 409);

    let response = server
        .post(&format!("/api/v1/documents/invoices/{id}/issue"))
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), 409);
}

#[tokio::test]
async fn debit_note_allocates_against_bill() {
    let (server, token) = test_server();
    let party = uuid::Uuid::new_v4();

    let response = server
        .post("/api/v1/documents/bills")
        .authorization_bearer(&token)
        .json(&json!({
            "party_id": party,
            "document_date": "2024-05-01",
            "lines": [
                { "description": "Supplies", "quantity": "1", "unit_price": "150.00" }
            ]
        }))
        .await;
    let bill_id = response.json::<Value>()["id"]
        .as_str()
        .expect("id")
        .to_string();
    server
        .post(&format!("/api/v1/documents/bills/{bill_id}/issue"))
        .authorization_bearer(&token)
        .await
        .assert_status_ok();

    let response = server
        .post("/api/v1/documents/debit-notes")
        .authorization_bearer(&token)
        .json(&json!({
            "party_id": party,
            "document_date": "2024-05-02",
            "lines": [
                { "description": "Returned supplies", "quantity": "1", "unit_price": "200.00" }
            ]
        }))
        .await;
    let note_id = response.json::<Value>()["id"]
        .as_str()
        .expect("id")
        .to_string();
    server
        .post(&format!("/api/v1/documents/debit-notes/{note_id}/issue"))
        .authorization_bearer(&token)
        .await
        .assert_status_ok();

    let response = server
        .post(&format!("/api/v1/documents/debit-notes/{note_id}/allocations"))
        .authorization_bearer(&token)
        .json(&json!({
            "targets": [
                { "target_id": bill_id, "amount": "150.00" }
            ]
        }))
        .await;
    response.assert_status_ok();
    let allocations: Vec<Value> = response.json();
    assert_eq!(allocations.len(), 1);
    assert_eq!(allocations[0]["amount"], "150.00");

    let response = server
        .get(&format!("/api/v1/documents/bills/{bill_id}"))
        .authorization_bearer(&token)
        .await;
    let bill: Value = response.json();
    assert_eq!(bill["status"], "PAID");
    assert_eq!(bill["remaining_balance"], "0.00");

    let response = server
        .get(&format!("/api/v1/documents/debit-notes/{note_id}"))
        .authorization_bearer(&token)
        .await;
    let note: Value = response.json();
    assert_eq!(note["status"], "PARTIALLY_APPLIED");
    assert_eq!(note["remaining_balance"], "50.00");
}

#[tokio::test]
async fn over_allocation_is_unprocessable() {
    let (server, token) = test_server();
    let party = uuid::Uuid::new_v4();

    let response = server
        .post("/api/v1/documents/credit-notes")
        .authorization_bearer(&token)
        .json(&json!({
            "party_id": party,
            "document_date": "2024-05-01",
            "lines": [
                { "description": "Credit", "quantity": "1", "unit_price": "100.00" }
            ]
        }))
        .await;
    let note_id = response.json::<Value>()["id"]
        .as_str()
        .expect("id")
        .to_string();
    server
        .post(&format!("/api/v1/documents/credit-notes/{note_id}/issue"))
        .authorization_bearer(&token)
        .await
        .assert_status_ok();

    let response = server
        .post("/api/v1/documents/invoices")
        .authorization_bearer(&token)
        .json(&json!({
            "party_id": party,
            "document_date": "2024-05-01",
            "lines": [
                { "description": "Work", "quantity": "1", "unit_price": "60.00" }
            ]
        }))
        .await;
    let invoice_id = response.json::<Value>()["id"]
        .as_str()
        .expect("id")
        .to_string();
    server
        .post(&format!("/api/v1/documents/invoices/{invoice_id}/issue"))
        .authorization_bearer(&token)
        .await
        .assert_status_ok();

    let response = server
        .post(&format!("/api/v1/documents/credit-notes/{note_id}/allocations"))
        .authorization_bearer(&token)
        .json(&json!({
            "targets": [
                { "target_id": invoice_id, "amount": "80.00" }
            ]
        }))
        .await;
    assert_eq!(response.status_code(), 422);

    // Nothing was applied
    let response = server
        .get(&format!("/api/v1/documents/invoices/{invoice_id}"))
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.json::<Value>()["remaining_balance"], "60.00");
}

#[tokio::test]
async fn unknown_document_family_and_id_are_not_found() {
    let (server, token) = test_server();

    let response = server
        .get("/api/v1/documents/purchase-orders")
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), 404);

    let missing = uuid::Uuid::new_v4();
    let response = server
        .get(&format!("/api/v1/documents/invoices/{missing}"))
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn document_is_unreachable_through_another_family() {
    let (server, token) = test_server();
    let party = uuid::Uuid::new_v4();

    let response = server
        .post("/api/v1/documents/invoices")
        .authorization_bearer(&token)
        .json(&json!({
            "party_id": party,
            "document_date": "2024-05-01",
            "lines": [
                { "description": "Work", "quantity": "1", "unit_price": "75.00" }
            ]
        }))
        .await;
    let id = response.json::<Value>()["id"]
        .as_str()
        .expect("id")
        .to_string();

    // The invoice exists under its own family only
    let response = server
        .get(&format!("/api/v1/documents/bills/{id}"))
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), 404);

    let response = server
        .post(&format!("/api/v1/documents/credit-notes/{id}/issue"))
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), 404);

    server
        .get(&format!("/api/v1/documents/invoices/{id}"))
        .authorization_bearer(&token)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn stale_document_version_conflicts() {
    let (server, token) = test_server();
    let party = uuid::Uuid::new_v4();

    let response = server
        .post("/api/v1/documents/invoices")
        .authorization_bearer(&token)
        .json(&json!({
            "party_id": party,
            "document_date": "2024-05-01",
            "lines": [
                { "description": "Work", "quantity": "1", "unit_price": "75.00" }
            ]
        }))
        .await;
    let draft: Value = response.json();
    let id = draft["id"].as_str().expect("id").to_string();
    let version = draft["version"].as_u64().expect("version");

    let update = json!({
        "lines": [
            { "description": "Work", "quantity": "2", "unit_price": "75.00" }
        ],
        "version": version
    });
    let response = server
        .put(&format!("/api/v1/documents/invoices/{id}"))
        .authorization_bearer(&token)
        .json(&update)
        .await;
    response.assert_status_ok();

    // Same expected version again: another writer already moved it
    let response = server
        .put(&format!("/api/v1/documents/invoices/{id}"))
        .authorization_bearer(&token)
        .json(&update)
        .await;
    assert_eq!(response.status_code(), 409);
    assert_eq!(response.json::<Value>()["error"], "conflict");

    // Omitting the version keeps the old last-write-wins behavior
    let response = server
        .put(&format!("/api/v1/documents/invoices/{id}"))
        .authorization_bearer(&token)
        .json(&json!({
            "lines": [
                { "description": "Work", "quantity": "3", "unit_price": "75.00" }
            ]
        }))
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn next_number_and_capabilities() {
    let (server, token) = test_server();

    let response = server
        .get("/api/v1/documents/invoices/next-number")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["next_number"], "INV-0001");

    let response = server
        .get("/api/v1/documents/invoices/capabilities")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let table: Vec<Value> = response.json();
    assert_eq!(table.len(), 5);
    let draft = table
        .iter()
        .find(|row| row["status"] == "DRAFT")
        .expect("draft row");
    assert_eq!(draft["allow_issue"], true);
    assert_eq!(draft["allow_pay"], false);
}

#[tokio::test]
async fn trial_balance_stays_balanced_through_document_flow() {
    let (server, token) = test_server();
    let party = uuid::Uuid::new_v4();

    let response = server
        .post("/api/v1/documents/invoices")
        .authorization_bearer(&token)
        .json(&json!({
            "party_id": party,
            "document_date": "2024-06-01",
            "lines": [
                { "description": "Service", "quantity": "2", "unit_price": "250.00", "tax_percent": "10" }
            ]
        }))
        .await;
    let id = response.json::<Value>()["id"]
        .as_str()
        .expect("id")
        .to_string();
    server
        .post(&format!("/api/v1/documents/invoices/{id}/issue"))
        .authorization_bearer(&token)
        .await
        .assert_status_ok();
    server
        .post(&format!("/api/v1/documents/invoices/{id}/payments"))
        .authorization_bearer(&token)
        .json(&json!({
            "amount": "550.00",
            "payment_date": "2024-06-05",
            "method": "CASH"
        }))
        .await
        .assert_status_ok();

    let response = server
        .get("/api/v1/reports/trial-balance")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let report: Value = response.json();
    assert_eq!(report["is_balanced"], true);
    assert_eq!(report["total_debits"], report["total_credits"]);

    let response = server
        .get("/api/v1/reports/income-statement?from=2024-06-01&to=2024-06-30")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let statement: Value = response.json();
    assert_eq!(statement["total_income"], "500.00");

    let response = server
        .get("/api/v1/reports/balance-sheet?as_of=2024-06-30")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let sheet: Value = response.json();
    let dec = |v: &Value| {
        v.as_str()
            .expect("decimal string")
            .parse::<rust_decimal::Decimal>()
            .expect("decimal")
    };
    assert_eq!(
        dec(&sheet["total_assets"]),
        dec(&sheet["total_liabilities"]) + dec(&sheet["total_equity"])
    );
}

#[tokio::test]
async fn income_statement_rejects_inverted_range() {
    let (server, token) = test_server();
    let response = server
        .get("/api/v1/reports/income-statement?from=2024-06-30&to=2024-06-01")
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), 422);
}
