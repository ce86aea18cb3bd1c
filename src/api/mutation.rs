//! Write side of the schema.
//!
//! Business failures never surface as GraphQL errors; they come back inside the
//! payload with `success: false`.

use super::{
    ApiContext,
    payload::{
        BulkCreateCustomersPayload, CreateCustomerPayload, CreateOrderPayload,
        CreateProductPayload,
    },
    types::{CreateCustomerInput, CreateOrderInput, CreateProductInput},
};
use crate::core::{customer, order, product};
use async_graphql::{Context, Object, Result};

/// Root of all mutations
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Creates one customer
    async fn create_customer(
        &self,
        ctx: &Context<'_>,
        input: CreateCustomerInput,
    ) -> Result<CreateCustomerPayload> {
        let api = ctx.data::<ApiContext>()?;
        Ok(customer::create_customer(&api.db, input.into()).await.into())
    }

    /// Creates several customers; each record succeeds or fails on its own
    async fn bulk_create_customers(
        &self,
        ctx: &Context<'_>,
        input: Vec<CreateCustomerInput>,
    ) -> Result<BulkCreateCustomersPayload> {
        let api = ctx.data::<ApiContext>()?;
        let submitted = input.len();
        let outcome =
            customer::bulk_create_customers(&api.db, input.into_iter().map(Into::into).collect())
                .await;
        Ok(BulkCreateCustomersPayload::new(outcome, submitted))
    }

    /// Creates one product; the price may be given as a string or a number
    async fn create_product(
        &self,
        ctx: &Context<'_>,
        input: CreateProductInput,
    ) -> Result<CreateProductPayload> {
        let api = ctx.data::<ApiContext>()?;
        Ok(product::create_product(&api.db, input.into()).await.into())
    }

    /// Places an order; the total is the sum of the product prices at this moment
    async fn create_order(
        &self,
        ctx: &Context<'_>,
        input: CreateOrderInput,
    ) -> Result<CreateOrderPayload> {
        let api = ctx.data::<ApiContext>()?;
        Ok(order::create_order(&api.db, input.into()).await.into())
    }
}
