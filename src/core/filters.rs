//! Predicate builders for the list queries.
//!
//! Each filter struct translates named, optional parameters into a `SeaORM`
//! condition. Present parameters are combined with AND; absent ones add nothing.
//! Malformed values never fail a read: they are dropped and the dimension is left
//! unconstrained.
//!
//! Ordering comes in as a list of field names, `-` prefixed for descending; an entry
//! may hold several names separated by commas. Unknown names are ignored and the
//! primary key is always appended so pages are stable.

use crate::{
    core::order::parse_order_date,
    entities::{Customer, Order, OrderProduct, Product, customer, order, order_product, product},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Select,
    sea_query::{Expr, Func, LikeExpr, Order as SortOrder, Query, SimpleExpr},
};
use std::str::FromStr;

const LIKE_ESCAPE: char = '!';

/// Escapes LIKE wildcards so user text is matched literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Case-insensitive substring match.
fn icontains<C: ColumnTrait>(column: C, needle: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
    Expr::expr(Func::lower(Expr::col((column.entity_name(), column))))
        .like(LikeExpr::new(pattern).escape(LIKE_ESCAPE))
}

/// Prefix match.
fn starts_with<C: ColumnTrait>(column: C, prefix: &str) -> SimpleExpr {
    let pattern = format!("{}%", escape_like(prefix));
    Expr::col((column.entity_name(), column)).like(LikeExpr::new(pattern).escape(LIKE_ESCAPE))
}

/// Text filters only count when they contain something besides whitespace.
fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}

/// A field list entities can be ordered by.
pub trait OrderField: Sized + Copy {
    /// Column type of the entity being ordered
    type Column: ColumnTrait;

    /// Looks a field up by name; `snake_case` and `camelCase` both match.
    fn parse(name: &str) -> Option<Self>;

    /// Column backing the field.
    fn column(self) -> Self::Column;
}

/// One parsed ordering specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSpec<F> {
    /// Field to order by
    pub field: F,
    /// Largest first when true
    pub descending: bool,
}

/// Parses ordering specifiers such as `["-price", "name"]`, dropping unknown fields.
///
/// An entry may also hold several comma-separated specifiers (`"-price,name"`).
pub fn parse_ordering<F: OrderField>(specs: &[String]) -> Vec<OrderSpec<F>> {
    specs
        .iter()
        .flat_map(|entry| entry.split(','))
        .filter_map(|spec| {
            let spec = spec.trim();
            let (descending, name) = spec
                .strip_prefix('-')
                .map_or((false, spec), |rest| (true, rest));
            F::parse(name).map(|field| OrderSpec { field, descending })
        })
        .collect()
}

/// Parses the lower bound of a date range. A bare date means midnight UTC.
#[must_use]
pub fn parse_date_from(raw: &str) -> Option<DateTime<Utc>> {
    parse_order_date(raw)
}

/// Parses the upper bound of a date range. A bare date covers the whole day.
#[must_use]
pub fn parse_date_until(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date
            .and_hms_nano_opt(23, 59, 59, 999_999_999)
            .map(|naive| naive.and_utc()),
        Err(_) => parse_order_date(raw),
    }
}

fn normalize_field_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

fn apply_ordering<E, F>(mut select: Select<E>, specs: &[String], tiebreak: E::Column) -> Select<E>
where
    E: EntityTrait,
    F: OrderField<Column = E::Column>,
{
    for spec in parse_ordering::<F>(specs) {
        let direction = if spec.descending {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        };
        select = select.order_by(spec.field.column(), direction);
    }
    select.order_by_asc(tiebreak)
}

/// Fields customers can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerOrderField {
    /// Alphabetical by name
    Name,
    /// By creation time
    CreatedAt,
    /// Alphabetical by email
    Email,
}

impl OrderField for CustomerOrderField {
    type Column = customer::Column;

    fn parse(name: &str) -> Option<Self> {
        match normalize_field_name(name).as_str() {
            "name" => Some(Self::Name),
            "createdat" => Some(Self::CreatedAt),
            "email" => Some(Self::Email),
            _ => None,
        }
    }

    fn column(self) -> customer::Column {
        match self {
            Self::Name => customer::Column::Name,
            Self::CreatedAt => customer::Column::CreatedAt,
            Self::Email => customer::Column::Email,
        }
    }
}

/// Fields products can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductOrderField {
    /// Alphabetical by name
    Name,
    /// By unit price
    Price,
    /// By units on hand
    Stock,
}

impl OrderField for ProductOrderField {
    type Column = product::Column;

    fn parse(name: &str) -> Option<Self> {
        match normalize_field_name(name).as_str() {
            "name" => Some(Self::Name),
            "price" => Some(Self::Price),
            "stock" => Some(Self::Stock),
            _ => None,
        }
    }

    fn column(self) -> product::Column {
        match self {
            Self::Name => product::Column::Name,
            Self::Price => product::Column::Price,
            Self::Stock => product::Column::Stock,
        }
    }
}

/// Fields orders can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderOrderField {
    /// By order date
    OrderDate,
    /// By order total
    TotalAmount,
}

impl OrderField for OrderOrderField {
    type Column = order::Column;

    fn parse(name: &str) -> Option<Self> {
        match normalize_field_name(name).as_str() {
            "orderdate" => Some(Self::OrderDate),
            "totalamount" => Some(Self::TotalAmount),
            _ => None,
        }
    }

    fn column(self) -> order::Column {
        match self {
            Self::OrderDate => order::Column::OrderDate,
            Self::TotalAmount => order::Column::TotalAmount,
        }
    }
}

/// Customer list parameters.
#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    /// Name contains, any case
    pub name_icontains: Option<String>,
    /// Email contains, any case
    pub email_icontains: Option<String>,
    /// Created at or after
    pub created_at_gte: Option<DateTime<Utc>>,
    /// Created at or before
    pub created_at_lte: Option<DateTime<Utc>>,
    /// Prefix when starting with `+` or a digit, otherwise contains (any case)
    pub phone_pattern: Option<String>,
}

impl CustomerFilter {
    /// Builds the condition for this filter.
    #[must_use]
    pub fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(name) = present(self.name_icontains.as_ref()) {
            condition = condition.add(icontains(customer::Column::Name, name));
        }
        if let Some(email) = present(self.email_icontains.as_ref()) {
            condition = condition.add(icontains(customer::Column::Email, email));
        }
        if let Some(after) = self.created_at_gte {
            condition = condition.add(customer::Column::CreatedAt.gte(after));
        }
        if let Some(before) = self.created_at_lte {
            condition = condition.add(customer::Column::CreatedAt.lte(before));
        }
        if let Some(pattern) = present(self.phone_pattern.as_ref()) {
            let pattern = pattern.trim();
            let is_prefix = pattern.starts_with('+')
                || pattern.chars().next().is_some_and(|c| c.is_ascii_digit());
            condition = condition.add(if is_prefix {
                starts_with(customer::Column::Phone, pattern)
            } else {
                icontains(customer::Column::Phone, pattern)
            });
        }
        condition
    }

    /// Filtered and ordered customer query.
    #[must_use]
    pub fn select(&self, order_by: &[String]) -> Select<Customer> {
        let select = Customer::find().filter(self.condition());
        apply_ordering::<_, CustomerOrderField>(select, order_by, customer::Column::Id)
    }
}

/// Product list parameters.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Name contains, any case
    pub name_icontains: Option<String>,
    /// Price at least
    pub price_gte: Option<Decimal>,
    /// Price at most
    pub price_lte: Option<Decimal>,
    /// Stock at least
    pub stock_gte: Option<i32>,
    /// Stock at most
    pub stock_lte: Option<i32>,
    /// Stock strictly below this number; text that is not a number is ignored
    pub low_stock: Option<String>,
}

impl ProductFilter {
    /// Parsed low-stock threshold. Fractions are truncated toward zero; text that is
    /// not a number yields `None`.
    #[must_use]
    pub fn low_stock_threshold(&self) -> Option<i64> {
        let raw = self.low_stock.as_deref()?.trim();
        Decimal::from_str(raw)
            .or_else(|_| Decimal::from_scientific(raw))
            .ok()?
            .trunc()
            .to_i64()
    }

    /// Builds the condition for this filter.
    #[must_use]
    pub fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(name) = present(self.name_icontains.as_ref()) {
            condition = condition.add(icontains(product::Column::Name, name));
        }
        if let Some(min) = self.price_gte {
            condition = condition.add(product::Column::Price.gte(min));
        }
        if let Some(max) = self.price_lte {
            condition = condition.add(product::Column::Price.lte(max));
        }
        if let Some(min) = self.stock_gte {
            condition = condition.add(product::Column::Stock.gte(min));
        }
        if let Some(max) = self.stock_lte {
            condition = condition.add(product::Column::Stock.lte(max));
        }
        if let Some(threshold) = self.low_stock_threshold() {
            condition = condition.add(product::Column::Stock.lt(threshold));
        }
        condition
    }

    /// Filtered and ordered product query.
    #[must_use]
    pub fn select(&self, order_by: &[String]) -> Select<Product> {
        let select = Product::find().filter(self.condition());
        apply_ordering::<_, ProductOrderField>(select, order_by, product::Column::Id)
    }
}

/// Order list parameters.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Total at least
    pub total_amount_gte: Option<Decimal>,
    /// Total at most
    pub total_amount_lte: Option<Decimal>,
    /// Placed at or after
    pub order_date_gte: Option<DateTime<Utc>>,
    /// Placed at or before
    pub order_date_lte: Option<DateTime<Utc>>,
    /// Customer name contains, any case
    pub customer_name_icontains: Option<String>,
    /// Some product's name contains, any case
    pub product_name_icontains: Option<String>,
    /// Contains the product with this ID; non-numeric IDs are ignored
    pub product_id: Option<String>,
}

impl OrderFilter {
    /// Builds the condition for this filter.
    ///
    /// Relation filters are sub-selects on the order's key, so an order matching
    /// through several products still appears once.
    #[must_use]
    pub fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(min) = self.total_amount_gte {
            condition = condition.add(order::Column::TotalAmount.gte(min));
        }
        if let Some(max) = self.total_amount_lte {
            condition = condition.add(order::Column::TotalAmount.lte(max));
        }
        if let Some(after) = self.order_date_gte {
            condition = condition.add(order::Column::OrderDate.gte(after));
        }
        if let Some(before) = self.order_date_lte {
            condition = condition.add(order::Column::OrderDate.lte(before));
        }
        if let Some(name) = present(self.customer_name_icontains.as_ref()) {
            condition = condition.add(
                order::Column::CustomerId.in_subquery(
                    Query::select()
                        .column((Customer, customer::Column::Id))
                        .from(Customer)
                        .and_where(icontains(customer::Column::Name, name))
                        .to_owned(),
                ),
            );
        }
        if let Some(name) = present(self.product_name_icontains.as_ref()) {
            condition = condition.add(
                order::Column::Id.in_subquery(
                    Query::select()
                        .column((OrderProduct, order_product::Column::OrderId))
                        .from(OrderProduct)
                        .inner_join(
                            Product,
                            Expr::col((Product, product::Column::Id))
                                .equals((OrderProduct, order_product::Column::ProductId)),
                        )
                        .and_where(icontains(product::Column::Name, name))
                        .to_owned(),
                ),
            );
        }
        if let Some(product_id) = self
            .product_id
            .as_deref()
            .and_then(|id| id.trim().parse::<i64>().ok())
        {
            condition = condition.add(
                order::Column::Id.in_subquery(
                    Query::select()
                        .column((OrderProduct, order_product::Column::OrderId))
                        .from(OrderProduct)
                        .and_where(order_product::Column::ProductId.eq(product_id))
                        .to_owned(),
                ),
            );
        }
        condition
    }

    /// Filtered and ordered order query.
    #[must_use]
    pub fn select(&self, order_by: &[String]) -> Select<Order> {
        let select = Order::find().filter(self.condition());
        apply_ordering::<_, OrderOrderField>(select, order_by, order::Column::Id)
    }
}
