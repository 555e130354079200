//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{item, material, payment, project, stage, user},
    entities::{self, Role},
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates an active user named after the local part of `email`.
pub async fn create_test_user(
    db: &DatabaseConnection,
    email: &str,
    role: Role,
) -> Result<entities::user::Model> {
    let name = email.split('@').next().unwrap_or(email).to_string();
    user::create_user(db, name, email.to_string(), role).await
}

/// Creates the usual pair of project participants.
/// Returns (client, constructor).
pub async fn create_participants(
    db: &DatabaseConnection,
) -> Result<(entities::user::Model, entities::user::Model)> {
    let client = create_test_user(db, "ana@example.com", Role::Cliente).await?;
    let constructor = create_test_user(db, "obras@example.com", Role::Constructor).await?;
    Ok((client, constructor))
}

/// Creates a test project in `PLANIFICACION`.
///
/// # Defaults
/// * `name`: "Casa de prueba"
/// * `total_budget`: None (the budget lines decide the total)
pub async fn create_test_project(
    db: &DatabaseConnection,
    client_id: Option<i64>,
    constructor_id: Option<i64>,
) -> Result<entities::project::Model> {
    project::create_project(
        db,
        project::NewProject {
            name: "Casa de prueba".to_string(),
            address: Some("Calle Falsa 123".to_string()),
            client_id,
            constructor_id,
            ..Default::default()
        },
    )
    .await
}

/// Creates a public catalog material measured in units ("u").
pub async fn create_test_material(
    db: &DatabaseConnection,
    name: &str,
    base_price: Option<f64>,
) -> Result<entities::material::Model> {
    material::create_material(
        db,
        material::NewMaterial {
            name: name.to_string(),
            unit: "u".to_string(),
            base_price,
            custom_price: None,
        },
        None,
    )
    .await
}

/// Creates a work item measured in square meters with no materials.
pub async fn create_test_item(
    db: &DatabaseConnection,
    name: &str,
    labor_rate: f64,
) -> Result<entities::item::Model> {
    item::create_item(
        db,
        item::NewItem {
            name: name.to_string(),
            description: None,
            unit: "m2".to_string(),
            labor_rate,
        },
    )
    .await
}

/// Appends a stage with no budget amount or dates.
pub async fn create_test_stage(
    db: &DatabaseConnection,
    project_id: i64,
    name: &str,
) -> Result<entities::stage::Model> {
    stage::create_stage(
        db,
        project_id,
        stage::NewStage {
            name: name.to_string(),
            ..Default::default()
        },
    )
    .await
}

/// Records a `PENDING` payment not tied to a stage.
pub async fn create_test_payment(
    db: &DatabaseConnection,
    project_id: i64,
    recorded_by: i64,
    amount: f64,
) -> Result<entities::payment::Model> {
    payment::record_payment(
        db,
        project_id,
        recorded_by,
        payment::NewPayment {
            amount,
            method: Some("transferencia".to_string()),
            ..Default::default()
        },
    )
    .await
}
