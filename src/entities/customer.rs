//! Customer entity - People who place orders.
//!
//! Emails are stored lower-cased and carry a unique index, which is the final
//! guard against duplicate customers under concurrent creation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Customer database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    /// Unique identifier for the customer
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name, trimmed
    pub name: String,
    /// Lower-cased email address, unique across all customers
    #[sea_orm(unique)]
    pub email: String,
    /// Optional phone number (`+1234567890` or `123-456-7890`)
    pub phone: Option<String>,
    /// When the customer was created; never changes afterwards
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Customer and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One customer has many orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
