//! Mutation payloads.
//!
//! Mutations never fail at the GraphQL level. Every outcome, good or bad, is a
//! payload carrying the record (or null), a success flag, a message and a list of
//! error strings.

use super::types::{CustomerNode, OrderNode, ProductNode};
use crate::{
    core::customer::BulkOutcome,
    entities::{customer, order, product},
    errors::{Error, Result},
};
use async_graphql::SimpleObject;

macro_rules! record_payload {
    ($(#[$doc:meta])* $payload:ident { $field:ident: $node:ty }, $model:ty, $created:literal) => {
        $(#[$doc])*
        #[derive(Debug, SimpleObject)]
        pub struct $payload {
            /// The created record, null on failure
            pub $field: Option<$node>,
            /// Whether the record was created
            pub success: bool,
            /// Human-readable outcome
            pub message: String,
            /// Every problem found, empty on success
            pub errors: Vec<String>,
        }

        impl From<Result<$model>> for $payload {
            fn from(result: Result<$model>) -> Self {
                match result {
                    Ok(model) => Self {
                        $field: Some(<$node>::from(model)),
                        success: true,
                        message: $created.to_string(),
                        errors: Vec::new(),
                    },
                    Err(err) => Self::failed(&err),
                }
            }
        }

        impl $payload {
            /// Payload describing a failed mutation.
            #[must_use]
            pub fn failed(err: &Error) -> Self {
                Self {
                    $field: None,
                    success: false,
                    message: err.summary(),
                    errors: err.messages(),
                }
            }
        }
    };
}

record_payload!(
    /// Outcome of `createCustomer`
    CreateCustomerPayload { customer: CustomerNode },
    customer::Model,
    "Customer created."
);

record_payload!(
    /// Outcome of `createProduct`
    CreateProductPayload { product: ProductNode },
    product::Model,
    "Product created."
);

record_payload!(
    /// Outcome of `createOrder`
    CreateOrderPayload { order: OrderNode },
    order::Model,
    "Order created."
);

/// Outcome of `bulkCreateCustomers`
#[derive(Debug, SimpleObject)]
pub struct BulkCreateCustomersPayload {
    /// Customers created, in input order
    pub customers: Vec<CustomerNode>,
    /// One entry per rejected record field, prefixed with the record position
    pub errors: Vec<String>,
    /// True when every record was created
    pub success: bool,
    /// Human-readable summary
    pub message: String,
}

impl BulkCreateCustomersPayload {
    /// Summarises a bulk run over `submitted` records.
    #[must_use]
    pub fn new(outcome: BulkOutcome, submitted: usize) -> Self {
        let created = outcome.created.len();
        Self {
            customers: outcome.created.into_iter().map(CustomerNode::from).collect(),
            success: outcome.rejected == 0,
            message: format!("Created {created} of {submitted} customers."),
            errors: outcome.errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_payload_is_never_empty() {
        let err = Error::NotFound {
            entity: "customer",
            id: "abc".into(),
        };
        let payload = CreateOrderPayload::from(Err(err));
        assert!(!payload.success);
        assert!(payload.order.is_none());
        assert_eq!(payload.message, "Invalid customer ID.");
        assert_eq!(payload.errors, vec!["Invalid customer ID: abc".to_string()]);
    }

    #[test]
    fn test_bulk_payload_summary() {
        let outcome = BulkOutcome {
            created: Vec::new(),
            errors: vec!["Record 1: Name is required.".into()],
            rejected: 1,
        };
        let payload = BulkCreateCustomersPayload::new(outcome, 1);
        assert!(!payload.success);
        assert_eq!(payload.message, "Created 0 of 1 customers.");
        assert_eq!(payload.errors.len(), 1);
    }
}
