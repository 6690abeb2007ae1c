use std::sync::Arc;

use chrono::Utc;
use tempfile::TempDir;

use onboard_api::db::DatabaseManager;
use onboard_api::domain::NewCustomer;
use onboard_api::repos::{
    CptCodeRepo, CrosswalkField, CrosswalkRepo, CustomerRepo, InstituteRepo, ManualInstituteRepo,
    ProgressRepo, UploadRepo,
};

async fn test_db() -> (TempDir, Arc<DatabaseManager>) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("test.db");
    let db = DatabaseManager::open_local(path.to_str().unwrap())
        .await
        .expect("open db");
    db.run_migrations().await.expect("migrations");
    (dir, Arc::new(db))
}

fn sample_customer(email: &str) -> NewCustomer {
    NewCustomer {
        first_name: "Ada".to_string(),
        middle_name: String::new(),
        last_name: "Lovelace".to_string(),
        email: email.to_string(),
        password: "$argon2id$fake-hash".to_string(),
        phone_number: "555-0100".to_string(),
        npi_number: "1234567890".to_string(),
        city: "Seattle".to_string(),
        taxonomy_description: "Orthopaedic Surgery".to_string(),
        taxonomy_code: "207X00000X".to_string(),
    }
}

#[tokio::test]
async fn creating_a_customer_sets_progress_step_one() {
    let (_dir, db) = test_db().await;
    let customers = CustomerRepo::new(db);

    let id = customers.create(&sample_customer("ada@example.com")).await.unwrap();

    let found = customers.find_by_id(id).await.unwrap().expect("customer");
    assert_eq!(found.email, "ada@example.com");
    assert_eq!(found.latest_step, Some(1));
    assert_eq!(found.active, 1);
    assert!(found.otp.is_none());

    let by_email = customers
        .find_by_email("ada@example.com")
        .await
        .unwrap()
        .expect("customer by email");
    assert_eq!(by_email.id, id);

    assert!(customers
        .find_by_email("nobody@example.com")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn otp_round_trips_through_storage() {
    let (_dir, db) = test_db().await;
    let customers = CustomerRepo::new(db);
    let id = customers.create(&sample_customer("otp@example.com")).await.unwrap();

    let issued_at = Utc::now();
    customers.set_otp(id, 4321, issued_at).await.unwrap();

    let found = customers.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(found.otp, Some(4321));
    let stored_at = found.otp_created_at.expect("otp timestamp");
    assert!((stored_at - issued_at).num_seconds().abs() < 2);
}

#[tokio::test]
async fn progress_replace_is_idempotent() {
    let (_dir, db) = test_db().await;
    let customers = CustomerRepo::new(db.clone());
    let progress = ProgressRepo::new(db);
    let id = customers.create(&sample_customer("p@example.com")).await.unwrap();

    progress.set_step(id, 2).await.unwrap();
    progress.set_step(id, 2).await.unwrap();
    progress.set_step(id, 3).await.unwrap();

    // Exactly one row survives; the join in find_by_id would break otherwise.
    assert_eq!(progress.latest_step(id).await.unwrap(), Some(3));
    let found = customers.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(found.latest_step, Some(3));
}

#[tokio::test]
async fn institute_replace_all_is_a_full_replacement() {
    let (_dir, db) = test_db().await;
    let institutes = InstituteRepo::new(db);

    institutes
        .replace_all(1, &["111".to_string(), "222".to_string()])
        .await
        .unwrap();
    institutes
        .replace_all(1, &["333".to_string()])
        .await
        .unwrap();

    assert_eq!(institutes.npi_numbers(1).await.unwrap(), vec!["333".to_string()]);

    // An empty replacement clears the set.
    institutes.replace_all(1, &[]).await.unwrap();
    assert!(institutes.npi_numbers(1).await.unwrap().is_empty());
}

#[tokio::test]
async fn cpt_code_replace_all_is_a_full_replacement() {
    let (_dir, db) = test_db().await;
    let codes = CptCodeRepo::new(db);

    codes
        .replace_all(7, &["99213".to_string(), "29881".to_string()])
        .await
        .unwrap();
    codes.replace_all(7, &["11111".to_string()]).await.unwrap();

    assert_eq!(codes.codes(7).await.unwrap(), vec!["11111".to_string()]);
}

#[tokio::test]
async fn manual_institute_deletion_is_owner_scoped() {
    let (_dir, db) = test_db().await;
    let manual = ManualInstituteRepo::new(db);

    manual.add(1, "Clinic A", "98101").await.unwrap();
    manual.add(2, "Clinic B", "98102").await.unwrap();

    let owned_by_two: Vec<i64> = manual.list(2).await.unwrap().iter().map(|m| m.id).collect();

    // Customer 1 cannot delete customer 2's rows.
    let deleted = manual.delete_by_ids(1, &owned_by_two).await.unwrap();
    assert_eq!(deleted, 0);
    assert_eq!(manual.list(2).await.unwrap().len(), 1);

    // The owner can.
    let deleted = manual.delete_by_ids(2, &owned_by_two).await.unwrap();
    assert_eq!(deleted, 1);
    assert!(manual.list(2).await.unwrap().is_empty());

    // Empty id list deletes nothing.
    assert_eq!(manual.delete_by_ids(1, &[]).await.unwrap(), 0);
}

#[tokio::test]
async fn upload_ledger_round_trips() {
    let (_dir, db) = test_db().await;
    let uploads = UploadRepo::new(db);

    uploads
        .record(5, "https://bucket/uploads/abc-file.csv", "chargemaster")
        .await
        .unwrap();

    let listed = uploads.list(5).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].file, "https://bucket/uploads/abc-file.csv");
    assert_eq!(listed[0].comments.as_deref(), Some("chargemaster"));
    assert!(uploads.list(6).await.unwrap().is_empty());
}

#[tokio::test]
async fn crosswalk_search_matches_the_requested_field_exactly() {
    let (_dir, db) = test_db().await;
    let crosswalk = CrosswalkRepo::new(db.clone());

    let conn = db.get_connection().await.unwrap();
    conn.execute(
        "INSERT INTO crosswalk (taxonomy_code, cpt_code) VALUES \
         ('207X00000X', '29881'), ('207X00000X', '29880'), ('208000000X', '99213')",
        (),
    )
    .await
    .unwrap();

    let entries = crosswalk
        .search_by(CrosswalkField::TaxonomyCode, "207X00000X")
        .await
        .unwrap();
    let codes: Vec<&str> = entries.iter().map(|e| e.cpt_code.as_str()).collect();
    assert_eq!(codes, vec!["29881", "29880"]);

    let by_code = crosswalk
        .search_by(CrosswalkField::CptCode, "99213")
        .await
        .unwrap();
    assert_eq!(by_code.len(), 1);
    assert_eq!(by_code[0].taxonomy_code, "208000000X");

    assert!(crosswalk
        .search_by(CrosswalkField::TaxonomyCode, "nope")
        .await
        .unwrap()
        .is_empty());
}
