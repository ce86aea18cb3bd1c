//! Customer business logic - Handles customer creation and lookups.
//!
//! Input is normalised before validation: names and emails are trimmed, emails are
//! lower-cased, and an empty phone counts as no phone. Validation collects every
//! violation at once instead of stopping at the first one.

use crate::{
    core::phone::{INVALID_PHONE_MESSAGE, is_valid_phone},
    entities::{Customer, customer},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use tracing::{info, instrument, warn};

/// Message used for both the pre-insert check and a unique-index rejection.
pub const DUPLICATE_EMAIL_MESSAGE: &str = "Email already exists.";

/// Raw customer input as received from the API.
#[derive(Debug, Clone, Default)]
pub struct NewCustomer {
    /// Display name, required
    pub name: String,
    /// Email address, required, compared case-insensitively
    pub email: String,
    /// Optional phone number
    pub phone: Option<String>,
}

impl NewCustomer {
    /// Convenience constructor for a customer without a phone number.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: None,
        }
    }

    /// Sets the phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// The email as it will be stored: trimmed and lower-cased.
    #[must_use]
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

/// Result of a bulk creation: what was stored and what was rejected.
#[derive(Debug, Default)]
pub struct BulkOutcome {
    /// Customers created, in input order
    pub created: Vec<customer::Model>,
    /// One message per rejected field or record, tagged with the 1-based position
    pub errors: Vec<String>,
    /// Number of records that were not stored
    pub rejected: usize,
}

struct ValidCustomer {
    name: String,
    email: String,
    phone: Option<String>,
}

fn validate(input: &NewCustomer) -> Result<ValidCustomer> {
    let name = input.name.trim().to_string();
    let email = input.normalized_email();
    let phone = input
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(ToString::to_string);

    let mut errors = Vec::new();
    if name.is_empty() {
        errors.push("Name is required.".to_string());
    }
    if email.is_empty() {
        errors.push("Email is required.".to_string());
    }
    if !is_valid_phone(phone.as_deref()) {
        errors.push(INVALID_PHONE_MESSAGE.to_string());
    }

    if errors.is_empty() {
        Ok(ValidCustomer { name, email, phone })
    } else {
        Err(Error::Validation { errors })
    }
}

/// Finds a customer by its ID.
pub async fn get_customer_by_id(
    db: &DatabaseConnection,
    customer_id: i64,
) -> Result<Option<customer::Model>> {
    Customer::find_by_id(customer_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a customer by email, ignoring case and surrounding whitespace.
pub async fn get_customer_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<customer::Model>> {
    Customer::find()
        .filter(customer::Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Validates and stores a new customer.
///
/// # Errors
/// Returns an error if:
/// - The name or email is empty, or the phone is malformed (`Error::Validation`,
///   listing every problem)
/// - Another customer already uses the email (`Error::Duplicate`)
/// - The database insert fails
#[instrument(skip(db, input), fields(email = %input.normalized_email()))]
pub async fn create_customer(db: &DatabaseConnection, input: NewCustomer) -> Result<customer::Model> {
    let valid = validate(&input).inspect_err(|e| warn!("Rejected customer: {e}"))?;

    if get_customer_by_email(db, &valid.email).await?.is_some() {
        warn!("Rejected customer: duplicate email");
        return Err(Error::Duplicate {
            message: DUPLICATE_EMAIL_MESSAGE.to_string(),
        });
    }

    let customer = customer::ActiveModel {
        name: Set(valid.name),
        email: Set(valid.email),
        phone: Set(valid.phone),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let created = customer
        .insert(db)
        .await
        .map_err(|e| Error::from_insert(e, DUPLICATE_EMAIL_MESSAGE))?;

    info!(customer_id = created.id, "Created customer");
    Ok(created)
}

/// Creates many customers, each independently.
///
/// Every record is validated and committed on its own, so a failure on one record
/// never undoes or blocks the others. Each record is stored before the next one is
/// checked, which means a later record repeating an earlier email in the same batch
/// is reported as a duplicate.
#[instrument(skip(db, inputs), fields(count = inputs.len()))]
pub async fn bulk_create_customers(
    db: &DatabaseConnection,
    inputs: Vec<NewCustomer>,
) -> BulkOutcome {
    let mut outcome = BulkOutcome::default();

    for (index, input) in inputs.into_iter().enumerate() {
        let position = index + 1;
        let email = input.normalized_email();

        match create_customer(db, input).await {
            Ok(customer) => outcome.created.push(customer),
            Err(e) => {
                outcome.rejected += 1;
                let tag = if email.is_empty() {
                    format!("Record {position}")
                } else {
                    format!("Record {position} ({email})")
                };
                outcome
                    .errors
                    .extend(e.messages().into_iter().map(|m| format!("{tag}: {m}")));
            }
        }
    }

    info!(
        created = outcome.created.len(),
        failed = outcome.rejected,
        "Bulk customer creation finished"
    );
    outcome
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::PaginatorTrait;

    #[tokio::test]
    async fn test_create_customer_validation_collects_all_errors() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_customer(&db, NewCustomer::new("  ", "").with_phone("abc")).await;
        let Err(Error::Validation { errors }) = result else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0], "Name is required.");
        assert_eq!(errors[1], "Email is required.");
        assert_eq!(errors[2], INVALID_PHONE_MESSAGE);

        assert_eq!(Customer::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_customer_normalizes_input() -> Result<()> {
        let db = setup_test_db().await?;

        let customer = create_customer(
            &db,
            NewCustomer::new("  Alice  ", "  Alice@Example.COM ").with_phone(" +1234567890 "),
        )
        .await?;

        assert_eq!(customer.name, "Alice");
        assert_eq!(customer.email, "alice@example.com");
        assert_eq!(customer.phone.as_deref(), Some("+1234567890"));
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_phone_is_stored_as_none() -> Result<()> {
        let db = setup_test_db().await?;

        let customer =
            create_customer(&db, NewCustomer::new("Bob", "bob@example.com").with_phone("   "))
                .await?;
        assert_eq!(customer.phone, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_email_is_case_insensitive() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_customer(&db, "Alice", "alice@example.com").await?;

        let result = create_customer(&db, NewCustomer::new("Other", "ALICE@example.com")).await;
        assert!(matches!(result, Err(Error::Duplicate { .. })));

        assert_eq!(Customer::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_customer_lookups() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_customer(&db, "Alice", "alice@example.com").await?;

        let by_id = get_customer_by_id(&db, created.id).await?.unwrap();
        assert_eq!(by_id, created);

        let by_email = get_customer_by_email(&db, " Alice@Example.com").await?.unwrap();
        assert_eq!(by_email.id, created.id);

        assert!(get_customer_by_id(&db, 999).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_bulk_create_isolates_failures() -> Result<()> {
        let db = setup_test_db().await?;

        let outcome = bulk_create_customers(
            &db,
            vec![
                NewCustomer::new("A", "a@x.com"),
                NewCustomer::new("", "b@x.com"),
                NewCustomer::new("C", "a@x.com"),
            ],
        )
        .await;

        assert_eq!(outcome.created.len(), 1);
        assert_eq!(outcome.created[0].name, "A");
        assert_eq!(outcome.rejected, 2);
        assert_eq!(outcome.errors.len(), 2);
        assert!(outcome.errors[0].starts_with("Record 2"));
        assert!(outcome.errors[0].contains("Name is required."));
        assert!(outcome.errors[1].starts_with("Record 3"));
        assert!(outcome.errors[1].contains(DUPLICATE_EMAIL_MESSAGE));

        assert_eq!(Customer::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_bulk_create_keeps_going_after_invalid_phone() -> Result<()> {
        let db = setup_test_db().await?;

        let outcome = bulk_create_customers(
            &db,
            vec![
                NewCustomer::new("A", "a@x.com").with_phone("12345"),
                NewCustomer::new("B", "b@x.com").with_phone("123-456-7890"),
            ],
        )
        .await;

        assert_eq!(outcome.created.len(), 1);
        assert_eq!(outcome.created[0].email, "b@x.com");
        assert_eq!(
            outcome.errors,
            vec![format!("Record 1 (a@x.com): {INVALID_PHONE_MESSAGE}")]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_bulk_create_counts_records_not_messages() -> Result<()> {
        let db = setup_test_db().await?;

        let outcome = bulk_create_customers(
            &db,
            vec![
                NewCustomer::new("", "").with_phone("abc"),
                NewCustomer::new("B", "b@x.com"),
            ],
        )
        .await;

        assert_eq!(outcome.created.len(), 1);
        assert_eq!(outcome.errors.len(), 3);
        assert!(outcome.errors.iter().all(|e| e.starts_with("Record 1: ")));
        assert_eq!(outcome.rejected, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_unique_email_violation_maps_to_duplicate() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_customer(&db, "Alice", "alice@x.com").await?;

        let clash = customer::ActiveModel {
            name: Set("Other Alice".to_string()),
            email: Set("alice@x.com".to_string()),
            phone: Set(None),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };
        let err = clash
            .insert(&db)
            .await
            .map_err(|e| Error::from_insert(e, DUPLICATE_EMAIL_MESSAGE))
            .unwrap_err();

        let Error::Duplicate { message } = err else {
            panic!("expected duplicate, got {err:?}");
        };
        assert_eq!(message, "Email already exists.");
        assert_eq!(Customer::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_bulk_create_empty_input() -> Result<()> {
        let db = setup_test_db().await?;
        let outcome = bulk_create_customers(&db, Vec::new()).await;
        assert!(outcome.created.is_empty());
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.rejected, 0);
        Ok(())
    }
}
