//! Offset pagination behind opaque cursors.
//!
//! A cursor names the absolute position of a row in the filtered, ordered result.
//! Fetching `first` rows `after` a cursor reads from the position right behind it.

use crate::{
    config::PaginationConfig,
    errors::{Error, Result},
};
use sea_orm::{
    ConnectionTrait, EntityTrait, FromQueryResult, PaginatorTrait, QuerySelect, Select,
};

const CURSOR_PREFIX: &str = "offset:";

/// Encodes a row position as a cursor.
#[must_use]
pub fn encode_cursor(position: u64) -> String {
    format!("{CURSOR_PREFIX}{position}")
}

/// Decodes a cursor produced by [`encode_cursor`].
#[must_use]
pub fn decode_cursor(cursor: &str) -> Option<u64> {
    cursor.strip_prefix(CURSOR_PREFIX)?.parse().ok()
}

/// Which slice of a result to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Position of the first row to return
    pub offset: u64,
    /// Maximum number of rows to return
    pub limit: u64,
}

impl PageRequest {
    /// Builds a request from relay-style `first` / `after` arguments.
    ///
    /// `first` defaults to the configured page size and is clamped to the configured
    /// maximum.
    ///
    /// # Errors
    /// Returns `Error::InvalidValue` if `first` is negative or `after` is not a cursor
    /// issued by this service.
    pub fn from_relay(
        first: Option<i32>,
        after: Option<&str>,
        config: &PaginationConfig,
    ) -> Result<Self> {
        let limit = match first {
            None => config.default_page_size,
            Some(n) => u64::try_from(n).map_err(|_| Error::InvalidValue {
                message: "`first` must not be negative.".to_string(),
            })?,
        }
        .min(config.max_page_size);

        let offset = match after {
            None => 0,
            Some(cursor) => decode_cursor(cursor)
                .ok_or_else(|| Error::InvalidValue {
                    message: format!("Invalid cursor: {cursor}"),
                })?
                .saturating_add(1),
        };

        Ok(Self { offset, limit })
    }
}

/// One loaded slice of a result.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Rows in this slice
    pub items: Vec<T>,
    /// Position of the first row in `items`
    pub offset: u64,
    /// Whether rows exist before this slice
    pub has_previous: bool,
    /// Whether rows exist after this slice
    pub has_next: bool,
    /// Number of rows across all slices
    pub total_count: u64,
}

impl<T> Page<T> {
    /// Pairs every row with its cursor.
    pub fn into_edges(self) -> impl Iterator<Item = (String, T)> {
        let offset = self.offset;
        self.items
            .into_iter()
            .zip(offset..)
            .map(|(item, position)| (encode_cursor(position), item))
    }
}

/// Loads one page of `select`, together with the total row count.
pub async fn fetch_page<E, C>(
    db: &C,
    select: Select<E>,
    request: PageRequest,
) -> Result<Page<E::Model>>
where
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync,
    C: ConnectionTrait,
{
    let total_count = select.clone().count(db).await?;
    let items = select
        .offset(request.offset)
        .limit(request.limit)
        .all(db)
        .await?;

    let loaded = items.len() as u64;
    Ok(Page {
        items,
        offset: request.offset,
        has_previous: request.offset > 0,
        has_next: request.offset.saturating_add(loaded) < total_count,
        total_count,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{core::product::NewProduct, entities::Product, test_utils::*};
    use sea_orm::{EntityTrait, QueryOrder};

    fn config() -> PaginationConfig {
        PaginationConfig {
            default_page_size: 2,
            max_page_size: 3,
        }
    }

    #[test]
    fn test_cursor_round_trip_and_garbage() {
        assert_eq!(decode_cursor(&encode_cursor(7)), Some(7));
        assert_eq!(decode_cursor("7"), None);
        assert_eq!(decode_cursor("offset:x"), None);
    }

    #[test]
    fn test_page_request_defaults_and_clamping() {
        let request = PageRequest::from_relay(None, None, &config()).unwrap();
        assert_eq!(request, PageRequest { offset: 0, limit: 2 });

        let request = PageRequest::from_relay(Some(50), None, &config()).unwrap();
        assert_eq!(request.limit, 3);

        let request =
            PageRequest::from_relay(Some(1), Some(&encode_cursor(4)), &config()).unwrap();
        assert_eq!(request, PageRequest { offset: 5, limit: 1 });
    }

    #[test]
    fn test_page_request_rejects_bad_arguments() {
        assert!(matches!(
            PageRequest::from_relay(Some(-1), None, &config()),
            Err(Error::InvalidValue { .. })
        ));
        assert!(matches!(
            PageRequest::from_relay(None, Some("bogus"), &config()),
            Err(Error::InvalidValue { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_page_walks_through_results() -> Result<()> {
        let db = setup_test_db().await?;
        for name in ["A", "B", "C", "D", "E"] {
            crate::core::product::create_product(&db, NewProduct::new(name, "1", None)).await?;
        }
        let select = || Product::find().order_by_asc(crate::entities::product::Column::Name);

        let first = fetch_page(&db, select(), PageRequest { offset: 0, limit: 2 }).await?;
        assert_eq!(first.total_count, 5);
        assert!(!first.has_previous);
        assert!(first.has_next);
        let edges: Vec<_> = first.into_edges().collect();
        assert_eq!(edges[0].0, encode_cursor(0));
        assert_eq!(edges[1].1.name, "B");

        let after = PageRequest::from_relay(Some(3), Some(&edges[1].0), &config())?;
        let last = fetch_page(&db, select(), after).await?;
        let names: Vec<_> = last.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["C", "D", "E"]);
        assert!(last.has_previous);
        assert!(!last.has_next);
        Ok(())
    }
}
