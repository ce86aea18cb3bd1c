//! GraphQL object and input types.

use super::ApiContext;
use crate::{
    core::{
        customer::NewCustomer,
        filters::{CustomerFilter, OrderFilter, ProductFilter, parse_date_from, parse_date_until},
        order::{NewOrder, get_order_products},
        product::{NewProduct, PRICE_SCALE},
    },
    entities::{Customer, customer, order, product},
};
use async_graphql::{
    Context, ID, InputObject, InputValueError, InputValueResult, Object, Result, Scalar,
    ScalarType, SimpleObject, Value,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::EntityTrait;
use std::str::FromStr;

fn money(mut amount: Decimal) -> Decimal {
    amount.rescale(PRICE_SCALE);
    amount
}

/// Decimal number accepted as either a string or a number.
///
/// The text is kept as-is so that a value which is not a number surfaces as a
/// validation error in the mutation payload instead of a request error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalInput(pub String);

#[Scalar]
impl ScalarType for DecimalInput {
    fn parse(value: Value) -> InputValueResult<Self> {
        match value {
            Value::String(text) => Ok(Self(text)),
            Value::Number(number) => Ok(Self(number.to_string())),
            other => Err(InputValueError::expected_type(other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.0.clone())
    }
}

impl DecimalInput {
    /// The value as a decimal, or `None` if it is not a number.
    #[must_use]
    pub fn to_decimal(&self) -> Option<Decimal> {
        let text = self.0.trim();
        Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .ok()
    }
}

/// A customer record
#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Customer")]
pub struct CustomerNode {
    pub id: ID,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<customer::Model> for CustomerNode {
    fn from(model: customer::Model) -> Self {
        Self {
            id: ID::from(model.id),
            name: model.name,
            email: model.email,
            phone: model.phone,
            created_at: model.created_at,
        }
    }
}

/// A product record
#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Product")]
pub struct ProductNode {
    pub id: ID,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

impl From<product::Model> for ProductNode {
    fn from(model: product::Model) -> Self {
        Self {
            id: ID::from(model.id),
            name: model.name,
            price: money(model.price),
            stock: model.stock,
            created_at: model.created_at,
        }
    }
}

/// An order record; its customer and products are loaded on demand.
#[derive(Debug, Clone)]
pub struct OrderNode(pub order::Model);

impl From<order::Model> for OrderNode {
    fn from(model: order::Model) -> Self {
        Self(model)
    }
}

/// An order placed by a customer
#[Object(name = "Order")]
impl OrderNode {
    async fn id(&self) -> ID {
        ID::from(self.0.id)
    }

    async fn order_date(&self) -> DateTime<Utc> {
        self.0.order_date
    }

    /// Sum of the product prices when the order was placed
    async fn total_amount(&self) -> Decimal {
        money(self.0.total_amount)
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    async fn customer(&self, ctx: &Context<'_>) -> Result<Option<CustomerNode>> {
        let api = ctx.data::<ApiContext>()?;
        let customer = Customer::find_by_id(self.0.customer_id).one(&api.db).await?;
        Ok(customer.map(CustomerNode::from))
    }

    async fn products(&self, ctx: &Context<'_>) -> Result<Vec<ProductNode>> {
        let api = ctx.data::<ApiContext>()?;
        let products = get_order_products(&api.db, &self.0).await?;
        Ok(products.into_iter().map(ProductNode::from).collect())
    }
}

/// Extra fields shared by every connection
#[derive(Debug, Clone, Copy, SimpleObject)]
pub struct ConnectionTotals {
    /// Number of records matching the filter, across all pages
    pub total_count: u64,
}

/// Fields of a new customer
#[derive(Debug, Clone, InputObject)]
pub struct CreateCustomerInput {
    /// Display name, required
    pub name: String,
    /// Email address, unique regardless of case
    pub email: String,
    /// `+1234567890` or `123-456-7890`; empty means none
    pub phone: Option<String>,
}

impl From<CreateCustomerInput> for NewCustomer {
    fn from(input: CreateCustomerInput) -> Self {
        Self {
            name: input.name,
            email: input.email,
            phone: input.phone,
        }
    }
}

/// Fields of a new product
#[derive(Debug, Clone, InputObject)]
pub struct CreateProductInput {
    /// Product name, required
    pub name: String,
    /// Unit price, greater than zero; rounded to two places
    pub price: DecimalInput,
    /// Defaults to 0
    pub stock: Option<i32>,
}

impl From<CreateProductInput> for NewProduct {
    fn from(input: CreateProductInput) -> Self {
        Self {
            name: input.name,
            price: input.price.0,
            stock: input.stock,
        }
    }
}

/// Customer and products of a new order
#[derive(Debug, Clone, InputObject)]
pub struct CreateOrderInput {
    /// Customer placing the order
    pub customer_id: ID,
    /// Products in the order, at least one; repeats count once
    pub product_ids: Vec<ID>,
    /// ISO 8601 date or datetime; defaults to now
    pub order_date: Option<String>,
}

impl From<CreateOrderInput> for NewOrder {
    fn from(input: CreateOrderInput) -> Self {
        Self {
            customer_id: input.customer_id.0,
            product_ids: input.product_ids.into_iter().map(|id| id.0).collect(),
            order_date: input.order_date,
        }
    }
}

/// Customer list filter; present fields must all match
#[derive(Debug, Clone, Default, InputObject)]
pub struct CustomerFilterInput {
    /// Name contains, any case
    pub name_icontains: Option<String>,
    /// Email contains, any case
    pub email_icontains: Option<String>,
    /// Created on or after this date or datetime
    pub created_at_gte: Option<String>,
    /// Created on or before this date (whole day) or datetime
    pub created_at_lte: Option<String>,
    /// Prefix match when starting with `+` or a digit, otherwise substring
    pub phone_pattern: Option<String>,
}

impl From<CustomerFilterInput> for CustomerFilter {
    fn from(input: CustomerFilterInput) -> Self {
        Self {
            name_icontains: input.name_icontains,
            email_icontains: input.email_icontains,
            created_at_gte: input.created_at_gte.as_deref().and_then(parse_date_from),
            created_at_lte: input.created_at_lte.as_deref().and_then(parse_date_until),
            phone_pattern: input.phone_pattern,
        }
    }
}

/// Product list filter; present fields must all match
#[derive(Debug, Clone, Default, InputObject)]
pub struct ProductFilterInput {
    /// Name contains, any case
    pub name_icontains: Option<String>,
    /// Price at least
    pub price_gte: Option<DecimalInput>,
    /// Price at most
    pub price_lte: Option<DecimalInput>,
    /// Stock at least
    pub stock_gte: Option<i32>,
    /// Stock at most
    pub stock_lte: Option<i32>,
    /// Products with stock below this number
    pub low_stock: Option<String>,
}

impl From<ProductFilterInput> for ProductFilter {
    fn from(input: ProductFilterInput) -> Self {
        Self {
            name_icontains: input.name_icontains,
            price_gte: input.price_gte.as_ref().and_then(DecimalInput::to_decimal),
            price_lte: input.price_lte.as_ref().and_then(DecimalInput::to_decimal),
            stock_gte: input.stock_gte,
            stock_lte: input.stock_lte,
            low_stock: input.low_stock,
        }
    }
}

/// Order list filter; present fields must all match
#[derive(Debug, Clone, Default, InputObject)]
pub struct OrderFilterInput {
    /// Total at least
    pub total_amount_gte: Option<DecimalInput>,
    /// Total at most
    pub total_amount_lte: Option<DecimalInput>,
    /// Placed on or after this date or datetime
    pub order_date_gte: Option<String>,
    /// Placed on or before this date (whole day) or datetime
    pub order_date_lte: Option<String>,
    /// Customer name contains, any case
    pub customer_name_icontains: Option<String>,
    /// Some product's name contains, any case
    pub product_name_icontains: Option<String>,
    /// Contains this product
    pub product_id: Option<ID>,
}

impl From<OrderFilterInput> for OrderFilter {
    fn from(input: OrderFilterInput) -> Self {
        Self {
            total_amount_gte: input.total_amount_gte.as_ref().and_then(DecimalInput::to_decimal),
            total_amount_lte: input.total_amount_lte.as_ref().and_then(DecimalInput::to_decimal),
            order_date_gte: input.order_date_gte.as_deref().and_then(parse_date_from),
            order_date_lte: input.order_date_lte.as_deref().and_then(parse_date_until),
            customer_name_icontains: input.customer_name_icontains,
            product_name_icontains: input.product_name_icontains,
            product_id: input.product_id.map(|id| id.0),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::decimal;

    #[test]
    fn test_decimal_input_accepts_strings_and_numbers() {
        let from_string = DecimalInput::parse(Value::String("10.50".into())).unwrap();
        assert_eq!(from_string.0, "10.50");

        let from_number = DecimalInput::parse(Value::Number(3.into())).unwrap();
        assert_eq!(from_number.to_decimal(), Some(decimal("3")));

        assert!(DecimalInput::parse(Value::Boolean(true)).is_err());
    }

    #[test]
    fn test_decimal_input_keeps_garbage_for_validation() {
        let input = DecimalInput::parse(Value::String("cheap".into())).unwrap();
        assert_eq!(input.to_decimal(), None);
        let product = NewProduct::from(CreateProductInput {
            name: "Laptop".into(),
            price: input,
            stock: None,
        });
        assert_eq!(product.price, "cheap");
    }

    #[test]
    fn test_filter_inputs_drop_malformed_amounts() {
        let filter = ProductFilter::from(ProductFilterInput {
            price_gte: Some(DecimalInput("abc".into())),
            price_lte: Some(DecimalInput("-2".into())),
            ..Default::default()
        });
        assert_eq!(filter.price_gte, None);
        assert_eq!(filter.price_lte, Some(decimal("-2")));
    }

    #[test]
    fn test_date_filters_accept_dates_and_drop_garbage() {
        let filter = CustomerFilter::from(CustomerFilterInput {
            created_at_gte: Some("2024-01-01".into()),
            created_at_lte: Some("not a date".into()),
            ..Default::default()
        });
        assert_eq!(
            filter.created_at_gte.map(|d| d.to_rfc3339()),
            Some("2024-01-01T00:00:00+00:00".to_string())
        );
        assert_eq!(filter.created_at_lte, None);

        let filter = OrderFilter::from(OrderFilterInput {
            order_date_lte: Some("2024-01-31".into()),
            ..Default::default()
        });
        let until = filter.order_date_lte.unwrap();
        assert_eq!(until.date_naive().to_string(), "2024-01-31");
    }

    #[test]
    fn test_money_has_two_places() {
        assert_eq!(money(decimal("10.5")).to_string(), "10.50");
        assert_eq!(money(decimal("3")).to_string(), "3.00");
    }
}
