//! Database configuration module.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust models
//! without hand-written SQL.

use crate::config::settings::DatabaseConfig;
use crate::entities::{Customer, Order, OrderProduct, Product};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{info, instrument};

/// Establishes a connection to the configured database.
#[instrument(skip(config))]
pub async fn create_connection(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    let db = Database::connect(&config.url).await?;
    info!("Connected to database");
    Ok(db)
}

/// Creates all necessary database tables if they do not exist yet.
///
/// Referenced tables are created before the tables pointing at them: customers and
/// products, then orders, then the order/product join table.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, Customer).await?;
    create_table(db, &schema, Product).await?;
    create_table(db, &schema, Order).await?;
    create_table(db, &schema, OrderProduct).await?;

    info!("Database tables ensured");
    Ok(())
}

async fn create_table<E: EntityTrait>(
    db: &DatabaseConnection,
    schema: &Schema,
    entity: E,
) -> Result<()> {
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CustomerModel, OrderModel, OrderProductModel, ProductModel};
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_connection() -> Result<()> {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
        };
        let db = create_connection(&config).await?;
        create_tables(&db).await?;

        let _: Vec<CustomerModel> = Customer::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        let _: Vec<CustomerModel> = Customer::find().limit(1).all(&db).await?;
        let _: Vec<ProductModel> = Product::find().limit(1).all(&db).await?;
        let _: Vec<OrderModel> = Order::find().limit(1).all(&db).await?;
        let _: Vec<OrderProductModel> = OrderProduct::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
