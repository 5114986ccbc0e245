//! SQL generation module.
//!
//! - [`query`] - the fragment-accumulating [`QueryBuilder`]
//! - [`token`] - token types for SQL generation
//! - [`dialect`] - vendor-specific constructs (PostgreSQL/PostGIS)

pub mod dialect;
pub mod query;
pub mod token;

#[cfg(test)]
pub mod test_utils;

pub use dialect::{Postgres, SqlDialect};
pub use query::{Join, OrderByExpr, QueryBuilder, SortDir};
pub use token::{Token, TokenStream};
