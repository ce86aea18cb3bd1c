//! Shared test utilities for the CRM service.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    api::{CrmSchema, build_schema},
    config::PaginationConfig,
    core::{
        customer::{self, NewCustomer},
        product::{self, NewProduct},
    },
    entities,
    errors::Result,
};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use std::str::FromStr;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Parses a decimal literal.
///
/// # Panics
/// Panics if `value` is not a decimal number.
#[allow(clippy::unwrap_used)]
pub fn decimal(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

/// Creates a test customer without a phone number.
pub async fn create_test_customer(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
) -> Result<entities::customer::Model> {
    customer::create_customer(db, NewCustomer::new(name, email)).await
}

/// Creates a test product with sensible defaults.
///
/// # Defaults
/// * `stock`: 10
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    price: &str,
) -> Result<entities::product::Model> {
    create_custom_product(db, name, price, 10).await
}

/// Creates a test product with a custom stock level.
pub async fn create_custom_product(
    db: &DatabaseConnection,
    name: &str,
    price: &str,
    stock: i32,
) -> Result<entities::product::Model> {
    product::create_product(db, NewProduct::new(name, price, Some(stock))).await
}

/// Sets up a complete test environment with a customer.
/// Returns (db, customer) for order-related tests.
pub async fn setup_with_customer() -> Result<(DatabaseConnection, entities::customer::Model)> {
    let db = setup_test_db().await?;
    let customer = create_test_customer(&db, "Test Customer", "test@example.com").await?;
    Ok((db, customer))
}

/// Builds the GraphQL schema over a fresh in-memory database.
/// Returns (schema, db) so tests can seed data directly.
pub async fn setup_test_schema() -> Result<(CrmSchema, DatabaseConnection)> {
    let db = setup_test_db().await?;
    let schema = build_schema(db.clone(), PaginationConfig::default());
    Ok((schema, db))
}

/// Executes a GraphQL document that is expected to succeed and returns its data.
///
/// # Panics
/// Panics if the response carries errors.
#[allow(clippy::unwrap_used, clippy::panic)]
pub async fn execute(schema: &CrmSchema, document: &str) -> serde_json::Value {
    let response = schema.execute(document).await;
    if !response.errors.is_empty() {
        panic!("unexpected GraphQL errors: {:?}", response.errors);
    }
    response.data.into_json().unwrap()
}

/// Routes `tracing` output through the test harness so it shows up for failing tests.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
