//! Order business logic - Handles order creation and lookups.
//!
//! Creating an order touches three tables. All reads and writes happen inside one
//! database transaction: when anything fails, including a lookup that comes back
//! empty, the transaction is dropped without commit and nothing is persisted.

use crate::{
    entities::{Customer, Order, OrderProduct, Product, order, order_product, product},
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Raw order input as received from the API.
///
/// IDs are kept as text so that malformed references are reported the same way as
/// references to missing records.
#[derive(Debug, Clone, Default)]
pub struct NewOrder {
    /// Customer placing the order
    pub customer_id: String,
    /// Products in the order, at least one
    pub product_ids: Vec<String>,
    /// Optional ISO-8601 order date
    pub order_date: Option<String>,
}

/// Parses a client-supplied order date.
///
/// Accepts RFC 3339 (`2024-05-01T10:00:00+02:00`), a naive ISO datetime
/// (`2024-05-01T10:00:00`, taken as UTC) or a bare date (midnight UTC). Returns
/// `None` for anything else.
#[must_use]
pub fn parse_order_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Resolves the order date, silently falling back to `now` when the supplied value
/// is missing or unparseable.
fn resolve_order_date(raw: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        None => now,
        Some(value) => parse_order_date(value).unwrap_or_else(|| {
            debug!(value, "Unparseable order date, using current time");
            now
        }),
    }
}

/// Removes repeated references, keeping the first occurrence of each.
fn dedup_references(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .map(|id| id.trim().to_string())
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Retrieves a specific order by its unique ID.
pub async fn get_order_by_id(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Option<order::Model>> {
    Order::find_by_id(order_id).one(db).await.map_err(Into::into)
}

/// Loads the products attached to an order, ordered by product ID.
pub async fn get_order_products(
    db: &DatabaseConnection,
    order: &order::Model,
) -> Result<Vec<product::Model>> {
    order
        .find_related(Product)
        .order_by_asc(product::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates an order for an existing customer and a non-empty set of existing products.
///
/// The total is the sum of the attached products' current prices and is written once.
///
/// # Errors
/// Returns an error if:
/// - The customer reference does not resolve (`Error::NotFound`)
/// - No products are given (`Error::Validation`)
/// - Any product reference does not resolve (`Error::Validation`, listing every
///   unresolved reference)
/// - Any database operation fails; nothing is persisted in that case
#[instrument(skip(db, input), fields(customer_id = %input.customer_id))]
pub async fn create_order(db: &DatabaseConnection, input: NewOrder) -> Result<order::Model> {
    let now = Utc::now();
    let order_date = resolve_order_date(input.order_date.as_deref(), now);
    let references = dedup_references(&input.product_ids);

    let txn = db.begin().await?;

    let customer_ref = input.customer_id.trim();
    let customer = match customer_ref.parse::<i64>() {
        Ok(id) => Customer::find_by_id(id).one(&txn).await?,
        Err(_) => None,
    }
    .ok_or_else(|| Error::NotFound {
        entity: "customer",
        id: customer_ref.to_string(),
    })
    .inspect_err(|e| warn!("Rejected order: {e}"))?;

    if references.is_empty() {
        warn!("Rejected order: no products");
        return Err(Error::Validation {
            errors: vec!["At least one product must be provided.".to_string()],
        });
    }

    let parsed_ids: Vec<i64> = references
        .iter()
        .filter_map(|r| r.parse::<i64>().ok())
        .collect();
    let found = Product::find()
        .filter(product::Column::Id.is_in(parsed_ids))
        .all(&txn)
        .await?;

    let mut products: Vec<product::Model> = Vec::with_capacity(references.len());
    let mut unresolved = Vec::new();
    for reference in &references {
        let resolved = reference
            .parse::<i64>()
            .ok()
            .and_then(|id| found.iter().find(|p| p.id == id));
        match resolved {
            // "7" and "007" name the same product
            Some(product) if products.iter().any(|p| p.id == product.id) => {}
            Some(product) => products.push(product.clone()),
            None => unresolved.push(reference.clone()),
        }
    }

    if !unresolved.is_empty() {
        warn!(?unresolved, "Rejected order: unknown products");
        return Err(Error::Validation {
            errors: vec![format!("Invalid product IDs: {}", unresolved.join(", "))],
        });
    }

    let total: Decimal = products.iter().map(|p| p.price).sum();

    let created = order::ActiveModel {
        customer_id: Set(customer.id),
        order_date: Set(order_date),
        total_amount: Set(total.round_dp(2)),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    OrderProduct::insert_many(products.iter().map(|p| order_product::ActiveModel {
        order_id: Set(created.id),
        product_id: Set(p.id),
    }))
    .exec_without_returning(&txn)
    .await?;

    txn.commit().await?;

    info!(
        order_id = created.id,
        products = products.len(),
        total = %created.total_amount,
        "Created order"
    );
    Ok(created)
}
