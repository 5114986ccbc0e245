//! Temporal criteria resolution: closed range or latest-per-group.
//!
//! A [`TemporalFilter`] is resolved once into a [`TemporalCriterion`], then
//! applied to the builder. The two outcomes never combine for one field: a
//! range is a WHERE condition, latest reshapes the query with `DISTINCT ON`
//! and ORDER BY and adds no condition.
//!
//! Only the compiler owning the query's FROM table reshapes it. A joined
//! entity's latest criterion becomes a condition on the joined rows' key
//! (`key IN (SELECT DISTINCT ON (..) key FROM t ORDER BY ..)`), so the root
//! keeps its own `DISTINCT ON` and ORDER BY keys first.

use tracing::debug;

use super::{CompileError, CompileResult};
use crate::filter::TemporalFilter;
use crate::sql::{OrderByExpr, QueryBuilder, SqlDialect};

/// What a temporal filter constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeTarget<'c> {
    /// A single timestamp column. Ranges test that the instant lies inside.
    Instant { column: &'c str },
    /// A validity period stored as begin/end expressions. Ranges compare the
    /// period with the filter interval; latest orders versions by `latest_key`.
    Period {
        begin: &'c str,
        end: &'c str,
        latest_key: &'c str,
    },
}

impl TimeTarget<'_> {
    fn latest_key(&self) -> &str {
        match self {
            TimeTarget::Instant { column } => column,
            TimeTarget::Period { latest_key, .. } => latest_key,
        }
    }
}

/// A single WHERE condition on the time column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeCriterion {
    pub condition: String,
}

/// One row per group: distinct on the group columns, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestCriterion {
    pub group: Vec<String>,
    pub time: String,
}

impl LatestCriterion {
    fn shape<'b>(&self, builder: &'b mut QueryBuilder) -> &'b mut QueryBuilder {
        debug!(group = ?self.group, time = %self.time, "latest value query");
        for column in &self.group {
            builder.add_distinct(column.as_str());
        }
        for column in &self.group {
            builder.add_order_by(OrderByExpr::new(column.as_str()));
        }
        builder.add_order_by(OrderByExpr::desc(self.time.as_str()))
    }

    /// `key IN (..)` over the latest row of each group of `table`. A
    /// compound key compares as a row, `(a, b) IN (SELECT a, b ..)`.
    pub fn key_condition(&self, table: &str, key: &[&str], dialect: &dyn SqlDialect) -> String {
        let mut latest = QueryBuilder::new(table);
        for column in key {
            latest.add_select_field(*column);
        }
        self.shape(&mut latest);
        let lhs = match key {
            [column] => column.to_string(),
            columns => format!("({})", columns.join(", ")),
        };
        format!("{} IN ({})", lhs, latest.to_sql(dialect))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemporalCriterion {
    Range(RangeCriterion),
    Latest(LatestCriterion),
}

impl TemporalCriterion {
    /// Resolve `filter` against `target`.
    ///
    /// `group` identifies the logical series for latest queries (for
    /// observations, the data stream id column).
    pub fn resolve(
        filter: &TemporalFilter,
        target: TimeTarget<'_>,
        group: &[&str],
        dialect: &dyn SqlDialect,
    ) -> CompileResult<Self> {
        match filter {
            TemporalFilter::Range { min, max, op } => {
                if min > max {
                    return Err(CompileError::InvalidFilter(format!(
                        "time range ends before it begins: {} > {}",
                        min.to_rfc3339(),
                        max.to_rfc3339()
                    )));
                }
                let condition = match target {
                    TimeTarget::Instant { column } => dialect.range_contains(min, max, column),
                    TimeTarget::Period { begin, end, .. } => {
                        dialect.range_compare(begin, end, *op, min, max)
                    }
                };
                Ok(TemporalCriterion::Range(RangeCriterion { condition }))
            }
            TemporalFilter::Latest => Ok(TemporalCriterion::Latest(LatestCriterion {
                group: group.iter().map(|g| g.to_string()).collect(),
                time: target.latest_key().to_string(),
            })),
        }
    }

    /// Apply to a query selecting from the criterion's own table.
    pub fn apply<'b>(&self, builder: &'b mut QueryBuilder) -> &'b mut QueryBuilder {
        match self {
            TemporalCriterion::Range(range) => builder.add_condition(range.condition.as_str()),
            TemporalCriterion::Latest(latest) => latest.shape(builder),
        }
    }

    /// Apply for rows of `table` identified by `key`. When `builder` selects
    /// from another table, `table` is joined and latest narrows `key` instead.
    pub fn apply_to<'b>(
        &self,
        table: &str,
        key: &[&str],
        dialect: &dyn SqlDialect,
        builder: &'b mut QueryBuilder,
    ) -> &'b mut QueryBuilder {
        match self {
            TemporalCriterion::Latest(latest) if builder.table() != table => {
                builder.add_condition(latest.key_condition(table, key, dialect))
            }
            _ => self.apply(builder),
        }
    }
}

/// Rows a temporal criterion selects among: their table and the columns
/// identifying one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rows<'c> {
    pub table: &'c str,
    pub key: &'c [&'c str],
}

/// Resolve and apply in one step.
pub fn apply_temporal<'b>(
    filter: &TemporalFilter,
    target: TimeTarget<'_>,
    group: &[&str],
    rows: Rows<'_>,
    dialect: &dyn SqlDialect,
    builder: &'b mut QueryBuilder,
) -> CompileResult<&'b mut QueryBuilder> {
    let criterion = TemporalCriterion::resolve(filter, target, group, dialect)?;
    Ok(criterion.apply_to(rows.table, rows.key, dialect, builder))
}
