mod common;

use common::{PASSWORD, cipher, row_for};
use pronto_cli::repair::run_repair;
use pronto_cli::verify::{Classification, run_verify};
use pronto_db::MemoryEmployeeStore;
use pronto_models::default_targets;
use serde_json::Value;

async fn repaired_store() -> MemoryEmployeeStore {
    let mut store = MemoryEmployeeStore::new();
    run_repair(store.begin(), &cipher(), &default_targets(), PASSWORD, false)
        .await
        .unwrap();
    store
}

fn row_id(store: &MemoryEmployeeStore, email: &str) -> String {
    row_for(store, &cipher(), email).unwrap().id.clone()
}

#[tokio::test]
async fn test_verify_after_repair_reports_all_ok() {
    let mut store = repaired_store().await;

    let report = run_verify(&mut store, &cipher(), &default_targets(), PASSWORD)
        .await
        .unwrap();

    assert_eq!(report.exit_code(), 0);
    let json: Value = serde_json::from_str(&report.to_json()).unwrap();
    let groups = json.as_object().unwrap();
    let roles: Vec<&str> = groups.keys().map(String::as_str).collect();
    assert_eq!(roles, vec!["admin", "cashier", "chef", "system", "waiter"]);

    let statuses: Vec<&str> = groups
        .values()
        .flat_map(|entries| entries.as_array().unwrap())
        .map(|entry| entry["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["OK"; 5]);
    assert_eq!(json["system"][0]["email"], "system@cafeteria.test");
}

#[tokio::test]
async fn test_deleted_row_is_missing() {
    let mut store = repaired_store().await;
    let id = row_id(&store, "chef@cafeteria.test");
    store.remove(&id).unwrap();

    let report = run_verify(&mut store, &cipher(), &default_targets(), PASSWORD)
        .await
        .unwrap();

    assert_eq!(report.exit_code(), 2);
    assert_eq!(
        report.status_of("chef@cafeteria.test"),
        Some(Classification::Missing)
    );
    assert_eq!(
        report.entries().iter().filter(|e| e.status.is_drift()).count(),
        1
    );
}

#[tokio::test]
async fn test_inactive_and_drifted_rows() {
    let mut store = repaired_store().await;
    let cashier = row_id(&store, "cashier@cafeteria.test");
    let waiter = row_id(&store, "waiter@cafeteria.test");
    let admin = row_id(&store, "admin@cafeteria.test");
    store.update_raw(&cashier, |row| row.is_active = false);
    store.update_raw(&waiter, |row| row.allowed_scopes = r#"["admin"]"#.to_string());
    store.update_raw(&admin, |row| row.credential_hash = Some("stale".to_string()));

    let report = run_verify(&mut store, &cipher(), &default_targets(), PASSWORD)
        .await
        .unwrap();

    assert_eq!(report.exit_code(), 2);
    assert_eq!(
        report.status_of("cashier@cafeteria.test"),
        Some(Classification::Inactive)
    );
    assert_eq!(
        report.status_of("waiter@cafeteria.test"),
        Some(Classification::ScopeDrift)
    );
    assert_eq!(
        report.status_of("admin@cafeteria.test"),
        Some(Classification::PasswordDrift)
    );
    assert_eq!(
        report.status_of("system@cafeteria.test"),
        Some(Classification::Ok)
    );
}

#[tokio::test]
async fn test_verify_with_rotated_password_reports_drift_until_repaired() {
    let mut store = repaired_store().await;
    let c = cipher();

    let report = run_verify(&mut store, &c, &default_targets(), "Rotated#2026")
        .await
        .unwrap();
    assert!(report
        .entries()
        .iter()
        .all(|e| e.status == Classification::PasswordDrift));

    run_repair(store.begin(), &c, &default_targets(), "Rotated#2026", false)
        .await
        .unwrap();
    let report = run_verify(&mut store, &c, &default_targets(), "Rotated#2026")
        .await
        .unwrap();
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_verify_on_empty_store_is_all_missing() {
    let mut store = MemoryEmployeeStore::new();

    let report = run_verify(&mut store, &cipher(), &default_targets(), PASSWORD)
        .await
        .unwrap();

    assert_eq!(report.exit_code(), 2);
    assert!(report
        .entries()
        .iter()
        .all(|e| e.status == Classification::Missing));
    assert!(store.rows().is_empty());
}

#[tokio::test]
async fn test_stored_role_contradiction_is_drift_until_repaired() {
    let mut store = repaired_store().await;
    let c = cipher();
    let chef = row_id(&store, "chef@cafeteria.test");
    store.update_raw(&chef, |row| row.role = "cashier".to_string());

    let report = run_verify(&mut store, &c, &default_targets(), PASSWORD)
        .await
        .unwrap();
    assert_eq!(report.exit_code(), 2);
    assert_eq!(
        report.status_of("chef@cafeteria.test"),
        Some(Classification::ScopeDrift)
    );

    run_repair(store.begin(), &c, &default_targets(), PASSWORD, false)
        .await
        .unwrap();
    assert_eq!(store.get(&chef).unwrap().role, "chef");

    let report = run_verify(&mut store, &c, &default_targets(), PASSWORD)
        .await
        .unwrap();
    assert!(report.is_clean());
}
