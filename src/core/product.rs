//! Product business logic - Handles product creation and lookups.
//!
//! Prices arrive as raw text so that values which are not numbers at all reach
//! validation instead of being rejected by the transport. A valid price is rounded
//! to two decimal places and must stay strictly positive after rounding.

use crate::{
    entities::{Product, product},
    errors::{Error, Result},
};
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{Set, prelude::*};
use std::str::FromStr;
use tracing::{info, instrument, warn};

/// Scale prices are stored with.
pub const PRICE_SCALE: u32 = 2;

/// Raw product input as received from the API.
#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    /// Product name, required
    pub name: String,
    /// Price text, e.g. `"10.50"` or `"1e2"`
    pub price: String,
    /// Units on hand, defaults to zero
    pub stock: Option<i32>,
}

impl NewProduct {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, price: impl Into<String>, stock: Option<i32>) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
            stock,
        }
    }
}

/// Parses a price, accepting plain and scientific notation.
///
/// # Errors
/// Returns `Error::InvalidValue` if the text is not a decimal number or is not
/// strictly positive once rounded to [`PRICE_SCALE`] places.
pub fn parse_price(raw: &str) -> Result<Decimal> {
    let raw = raw.trim();
    let price = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| Error::InvalidValue {
            message: "Price must be a number.".to_string(),
        })?
        .round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);

    if price <= Decimal::ZERO {
        return Err(Error::InvalidValue {
            message: "Price must be positive.".to_string(),
        });
    }
    Ok(price)
}

/// Retrieves a specific product by its unique ID.
pub async fn get_product_by_id(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Option<product::Model>> {
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new product, performing input validation.
///
/// # Errors
/// Returns an error if:
/// - The product name is empty or whitespace-only (`Error::Validation`)
/// - The price is not a number or not positive (`Error::InvalidValue`)
/// - The stock is negative (`Error::InvalidValue`)
/// - The database insert operation fails
#[instrument(skip(db, input), fields(name = %input.name.trim()))]
pub async fn create_product(db: &DatabaseConnection, input: NewProduct) -> Result<product::Model> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        warn!("Rejected product: empty name");
        return Err(Error::Validation {
            errors: vec!["Name is required.".to_string()],
        });
    }

    let price = parse_price(&input.price).inspect_err(|e| warn!("Rejected product: {e}"))?;

    let stock = input.stock.unwrap_or(0);
    if stock < 0 {
        warn!(stock, "Rejected product: negative stock");
        return Err(Error::InvalidValue {
            message: "Stock cannot be negative.".to_string(),
        });
    }

    let product = product::ActiveModel {
        name: Set(name),
        price: Set(price),
        stock: Set(stock),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let created = product.insert(db).await?;

    info!(product_id = created.id, %price, stock, "Created product");
    Ok(created)
}
