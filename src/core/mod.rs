/// Customer creation, bulk import and lookups
pub mod customer;
/// List filters and ordering
pub mod filters;
/// Order placement and lookups
pub mod order;
/// Cursor pagination over filtered queries
pub mod pagination;
/// Phone number formats
pub mod phone;
/// Product creation and lookups
pub mod product;
