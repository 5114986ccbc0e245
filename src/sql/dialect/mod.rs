//! SQL Dialect definitions and formatting rules.
//!
//! The observation store targets PostgreSQL/PostGIS. The vendor-specific
//! constructs the compilers rely on are collected behind [`SqlDialect`] so
//! that condition text is produced in one place:
//!
//! - closed-interval containment over a timestamp column
//!   (`tstzrange(min, max, '[]') @> col`)
//! - comparison of a stored validity period against a filter period
//! - case-insensitive regular expression matching
//! - spatial predicates
//!
//! # Usage
//!
//! ```ignore
//! use obsql::sql::dialect::{Postgres, SqlDialect};
//!
//! let quoted = Postgres.quote_string("it's");  // 'it''s'
//! ```

pub mod helpers;
mod postgres;

pub use postgres::Postgres;

use chrono::{DateTime, Utc};

use crate::filter::{RangeOp, SpatialOp};

/// SQL dialect trait - defines how vendor-specific constructs are rendered.
pub trait SqlDialect: std::fmt::Debug + Sync {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    /// Quote a string literal.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Render an instant as a range bound (unquoted).
    fn format_timestamp(&self, instant: &DateTime<Utc>) -> String {
        helpers::format_timestamp_bound(instant)
    }

    /// Condition: `column` lies within the closed interval `[lower, upper]`.
    fn range_contains(&self, lower: &DateTime<Utc>, upper: &DateTime<Utc>, column: &str)
        -> String;

    /// Condition: the period `[begin_expr, end_expr]` relates to the closed
    /// filter interval `[lower, upper]` according to `op`.
    fn range_compare(
        &self,
        begin_expr: &str,
        end_expr: &str,
        op: RangeOp,
        lower: &DateTime<Utc>,
        upper: &DateTime<Utc>,
    ) -> String;

    /// Condition: `expr` matches `pattern`, ignoring case.
    fn regex_match_ci(&self, expr: &str, pattern: &str) -> String;

    /// Condition: `geometry_column` relates to the WKT geometry according to `op`.
    fn spatial_predicate(&self, geometry_column: &str, op: SpatialOp, wkt: &str, srid: i32)
        -> String;
}

impl std::fmt::Display for dyn SqlDialect + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
