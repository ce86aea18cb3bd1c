//! GraphQL API module
//!
//! Builds the schema over the core operations and serves it over HTTP. The
//! resolvers only translate between GraphQL types and core types; validation and
//! persistence live in [`crate::core`].

mod mutation;
mod payload;
mod query;
mod types;

pub use mutation::MutationRoot;
pub use payload::{
    BulkCreateCustomersPayload, CreateCustomerPayload, CreateOrderPayload, CreateProductPayload,
};
pub use query::{CrmConnection, QueryRoot};
pub use types::*;

use crate::config::PaginationConfig;
use async_graphql::{EmptySubscription, Schema, http::GraphiQLSource};
use axum::{
    Json, Router,
    extract::State,
    response::{Html, IntoResponse},
    routing::get,
};
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;

/// GraphQL schema type
pub type CrmSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Shared state every resolver reads from the schema data.
#[derive(Debug, Clone)]
pub struct ApiContext {
    /// Connection pool for the relational store
    pub db: DatabaseConnection,
    /// Page size limits for connection fields
    pub pagination: PaginationConfig,
}

/// Creates the schema over `db`.
#[must_use]
pub fn build_schema(db: DatabaseConnection, pagination: PaginationConfig) -> CrmSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(ApiContext { db, pagination })
        .finish()
}

/// GraphQL query handler
pub async fn graphql_handler(
    State(schema): State<CrmSchema>,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    Json(schema.execute(request).await)
}

/// In-browser IDE pointed at the GraphQL endpoint
pub async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

async fn health() -> &'static str {
    "ok"
}

/// HTTP routes: `POST /graphql`, `GET /graphql` (GraphiQL) and `GET /health`.
pub fn router(schema: CrmSchema) -> Router {
    Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(schema)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{errors::Result, test_utils::*};

    #[tokio::test]
    async fn test_schema_exposes_connection_types() -> Result<()> {
        let (schema, _db) = setup_test_schema().await?;
        let sdl = schema.sdl();
        for name in [
            "type CustomerConnection",
            "type ProductConnection",
            "type OrderConnection",
            "totalCount",
            "scalar DecimalInput",
            "bulkCreateCustomers",
        ] {
            assert!(sdl.contains(name), "schema is missing {name}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_handler_executes_requests() -> Result<()> {
        let (schema, db) = setup_test_schema().await?;
        create_test_customer(&db, "Ann", "ann@x.com").await?;

        let request = async_graphql::Request::new("{ allCustomers { totalCount } }");
        let Json(response) = graphql_handler(State(schema), Json(request)).await;
        assert!(response.errors.is_empty());
        let data = response.data.into_json().unwrap();
        assert_eq!(data["allCustomers"]["totalCount"], 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(health().await, "ok");
    }
}
