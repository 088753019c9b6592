//! Worker registration and login.

mod common;

use common::*;
use stockseguro_core::api::{ErrorCode, LoginRequest};
use stockseguro_core::AuthError;
use stockseguro_db::DbError;

#[tokio::test]
async fn test_login_is_case_insensitive_on_email() {
    let (db, worker) = setup(&[]).await;

    let session = db
        .workers()
        .authenticate("  Kevin@Demo.COM ", " 1234 ")
        .await
        .unwrap();
    assert_eq!(session.id, worker.id);
    assert_eq!(session.name, "Kevin Demo");
    assert_eq!(session.email, DEMO_EMAIL);
    assert_eq!(session.rut, "12.345.678-9");
}

#[tokio::test]
async fn test_login_failures() {
    let (db, worker) = setup(&[]).await;
    let workers = db.workers();

    assert!(matches!(
        workers.authenticate("  ", DEMO_PIN).await,
        Err(AuthError::MissingEmail)
    ));
    assert!(matches!(
        workers.authenticate(DEMO_EMAIL, " ").await,
        Err(AuthError::MissingPin)
    ));
    assert!(matches!(
        workers.authenticate("nadie@demo.com", DEMO_PIN).await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        workers.authenticate(DEMO_EMAIL, "9999").await,
        Err(AuthError::InvalidCredentials)
    ));

    workers.set_active(worker.id, false).await.unwrap();
    assert!(matches!(
        workers.authenticate(DEMO_EMAIL, DEMO_PIN).await,
        Err(AuthError::Inactive)
    ));
}

#[tokio::test]
async fn test_login_envelope() {
    let (db, _) = setup(&[]).await;

    let outcome = db
        .workers()
        .login(&LoginRequest {
            email: DEMO_EMAIL.to_string(),
            pin: DEMO_PIN.to_string(),
        })
        .await;
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["ok"], true);
    assert_eq!(json["user"]["email"], DEMO_EMAIL);
    assert!(json["user"].get("pinHash").is_none());

    let outcome = db
        .workers()
        .login(&LoginRequest {
            email: DEMO_EMAIL.to_string(),
            pin: "0000".to_string(),
        })
        .await;
    assert!(!outcome.ok);
    assert_eq!(outcome.code, Some(ErrorCode::Unauthorized));
    assert_eq!(outcome.error.as_deref(), Some("Invalid credentials"));
}

#[tokio::test]
async fn test_email_and_rut_are_unique() {
    let (db, _) = setup(&[]).await;
    let workers = db.workers();

    let err = workers
        .register("11.111.111-1", "Otra Persona", "KEVIN@demo.com", "5678")
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::UniqueViolation { .. }));

    let err = workers
        .register("12.345.678-9", "Otra Persona", "otra@demo.com", "5678")
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::UniqueViolation { .. }));

    assert_eq!(workers.count().await.unwrap(), 1);
    assert!(workers.find_by_email("KEVIN@DEMO.COM").await.unwrap().is_some());
}
