//! PostgreSQL / PostGIS SQL dialect.
//!
//! PostgreSQL features used by the observation store:
//! - `tstzrange` range type with `@>`, `&&` and `=` operators
//! - `DISTINCT ON`
//! - `~*` case-insensitive regex match
//! - PostGIS `ST_*` predicates

use chrono::{DateTime, Utc};

use super::SqlDialect;
use crate::filter::{RangeOp, SpatialOp};

/// PostgreSQL SQL dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Postgres {
    fn range_operator(op: RangeOp) -> &'static str {
        match op {
            RangeOp::Contains => "@>",
            RangeOp::Equals => "=",
            RangeOp::Intersects => "&&",
        }
    }
}

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn range_contains(
        &self,
        lower: &DateTime<Utc>,
        upper: &DateTime<Utc>,
        column: &str,
    ) -> String {
        format!(
            "tstzrange({},{}, '[]') @> {}",
            self.quote_string(&self.format_timestamp(lower)),
            self.quote_string(&self.format_timestamp(upper)),
            column
        )
    }

    fn range_compare(
        &self,
        begin_expr: &str,
        end_expr: &str,
        op: RangeOp,
        lower: &DateTime<Utc>,
        upper: &DateTime<Utc>,
    ) -> String {
        format!(
            "tstzrange(({})::timestamptz,({})::timestamptz) {} '[{},{}]'::tstzrange",
            begin_expr,
            end_expr,
            Self::range_operator(op),
            self.format_timestamp(lower),
            self.format_timestamp(upper)
        )
    }

    fn regex_match_ci(&self, expr: &str, pattern: &str) -> String {
        format!("({}) ~* {}", expr, self.quote_string(pattern))
    }

    fn spatial_predicate(
        &self,
        geometry_column: &str,
        op: SpatialOp,
        wkt: &str,
        srid: i32,
    ) -> String {
        let function = match op {
            SpatialOp::Intersects => "ST_Intersects",
            SpatialOp::Contains => "ST_Contains",
            SpatialOp::Within => "ST_Within",
        };
        format!(
            "{}({}, ST_GeomFromText({}, {}))",
            function,
            geometry_column,
            self.quote_string(wkt),
            srid
        )
    }
}
