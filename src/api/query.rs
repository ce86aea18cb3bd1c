//! Read side of the schema: filtered connections and single-record lookups.

use super::{
    ApiContext,
    types::{
        ConnectionTotals, CustomerFilterInput, CustomerNode, OrderFilterInput, OrderNode,
        ProductFilterInput, ProductNode,
    },
};
use crate::core::{
    customer::get_customer_by_id,
    filters::{CustomerFilter, OrderFilter, ProductFilter},
    order::get_order_by_id,
    pagination::{Page, PageRequest, fetch_page},
    product::get_product_by_id,
};
use async_graphql::{
    Context, ID, Object, OutputType, Result,
    connection::{Connection, Edge},
};

/// Connection type returned by every list field.
pub type CrmConnection<N> = Connection<String, N, ConnectionTotals>;

fn into_connection<M, N>(page: Page<M>) -> CrmConnection<N>
where
    N: OutputType + From<M>,
{
    let mut connection = Connection::with_additional_fields(
        page.has_previous,
        page.has_next,
        ConnectionTotals {
            total_count: page.total_count,
        },
    );
    connection.edges.extend(
        page.into_edges()
            .map(|(cursor, item)| Edge::new(cursor, N::from(item))),
    );
    connection
}

/// Lookups take database ids; anything that is not one simply matches nothing.
fn parse_id(id: &ID) -> Option<i64> {
    id.trim().parse().ok()
}

/// Root of all queries
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Customers matching `filter`, ordered by `orderBy` (e.g. `["-createdAt", "name"]`)
    async fn all_customers(
        &self,
        ctx: &Context<'_>,
        filter: Option<CustomerFilterInput>,
        order_by: Option<Vec<String>>,
        first: Option<i32>,
        after: Option<String>,
    ) -> Result<CrmConnection<CustomerNode>> {
        let api = ctx.data::<ApiContext>()?;
        let request = PageRequest::from_relay(first, after.as_deref(), &api.pagination)?;
        let select = CustomerFilter::from(filter.unwrap_or_default())
            .select(order_by.as_deref().unwrap_or_default());
        Ok(into_connection(fetch_page(&api.db, select, request).await?))
    }

    /// Products matching `filter`, ordered by `orderBy` (e.g. `["-price"]`)
    async fn all_products(
        &self,
        ctx: &Context<'_>,
        filter: Option<ProductFilterInput>,
        order_by: Option<Vec<String>>,
        first: Option<i32>,
        after: Option<String>,
    ) -> Result<CrmConnection<ProductNode>> {
        let api = ctx.data::<ApiContext>()?;
        let request = PageRequest::from_relay(first, after.as_deref(), &api.pagination)?;
        let select = ProductFilter::from(filter.unwrap_or_default())
            .select(order_by.as_deref().unwrap_or_default());
        Ok(into_connection(fetch_page(&api.db, select, request).await?))
    }

    /// Orders matching `filter`, ordered by `orderBy` (e.g. `["-orderDate"]`)
    async fn all_orders(
        &self,
        ctx: &Context<'_>,
        filter: Option<OrderFilterInput>,
        order_by: Option<Vec<String>>,
        first: Option<i32>,
        after: Option<String>,
    ) -> Result<CrmConnection<OrderNode>> {
        let api = ctx.data::<ApiContext>()?;
        let request = PageRequest::from_relay(first, after.as_deref(), &api.pagination)?;
        let select = OrderFilter::from(filter.unwrap_or_default())
            .select(order_by.as_deref().unwrap_or_default());
        Ok(into_connection(fetch_page(&api.db, select, request).await?))
    }

    async fn customer(&self, ctx: &Context<'_>, id: ID) -> Result<Option<CustomerNode>> {
        let api = ctx.data::<ApiContext>()?;
        let Some(id) = parse_id(&id) else {
            return Ok(None);
        };
        Ok(get_customer_by_id(&api.db, id).await?.map(CustomerNode::from))
    }

    async fn product(&self, ctx: &Context<'_>, id: ID) -> Result<Option<ProductNode>> {
        let api = ctx.data::<ApiContext>()?;
        let Some(id) = parse_id(&id) else {
            return Ok(None);
        };
        Ok(get_product_by_id(&api.db, id).await?.map(ProductNode::from))
    }

    async fn order(&self, ctx: &Context<'_>, id: ID) -> Result<Option<OrderNode>> {
        let api = ctx.data::<ApiContext>()?;
        let Some(id) = parse_id(&id) else {
            return Ok(None);
        };
        Ok(get_order_by_id(&api.db, id).await?.map(OrderNode::from))
    }
}
