//! Row-store access for feature handlers.
//!
//! Handlers issue parameterized `Statement`s through the `RowStore` trait
//! and get back affected-row counts or plain rows. `PgRowStore` runs them
//! against PostgreSQL; `MockRowStore` records them for tests.

pub mod error;
pub mod mock;
pub mod postgres;
pub mod statement;

pub use error::{StoreError, StoreResult};
pub use mock::MockRowStore;
pub use postgres::PgRowStore;
pub use statement::{Row, RowStore, Statement, Value};
