//! FoodDel Store — SQLite persistence for accounts, catalog, orders, and payments.

/// Store a `FromStr`/`as_str` enum as a TEXT column.
macro_rules! text_column {
    ($ty:ty) => {
        impl rusqlite::types::ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(rusqlite::types::ToSqlOutput::from(self.as_str()))
            }
        }

        impl rusqlite::types::FromSql for $ty {
            fn column_result(
                value: rusqlite::types::ValueRef<'_>,
            ) -> rusqlite::types::FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: fooddel_core::Error| rusqlite::types::FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

pub mod credentials;
pub mod orders;
pub mod revenue;
pub mod schema;
pub mod seed;
pub mod sqlite;
pub mod status;
pub mod types;

pub use revenue::{RevenueSummary, RevenueWindows};
pub use sqlite::SqliteStore;
pub use status::OrderStatus;
pub use types::*;
