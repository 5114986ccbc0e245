//! Query builder - accumulates SQL fragments and assembles one SELECT.
//!
//! The filter compilers share a single [`QueryBuilder`] across a whole filter
//! graph: every linked-entity compiler pushes its joins and conditions into the
//! same instance, so multi-hop filters end up as one flat query.

use tracing::warn;

use super::dialect::{Postgres, SqlDialect};
use super::token::{Token, TokenStream};

// =============================================================================
// Joins
// =============================================================================

/// An INNER JOIN clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub table: String,
    pub on: String,
}

impl Join {
    pub fn new(table: &str, on: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            on: on.into(),
        }
    }

    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Inner)
            .space()
            .push(Token::Join)
            .space()
            .raw(&self.table)
            .space()
            .push(Token::On)
            .space()
            .raw(&self.on);
        ts
    }
}

// =============================================================================
// ORDER BY
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

/// An ORDER BY expression.
///
/// `dir: None` leaves the direction to the database default (ascending).
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "builders have no effect until used"]
pub struct OrderByExpr {
    pub expr: String,
    pub dir: Option<SortDir>,
}

impl OrderByExpr {
    pub fn new(expr: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            dir: None,
        }
    }

    pub fn asc(expr: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            dir: Some(SortDir::Asc),
        }
    }

    pub fn desc(expr: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            dir: Some(SortDir::Desc),
        }
    }

    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.raw(&self.expr);
        if let Some(dir) = &self.dir {
            ts.space().push(match dir {
                SortDir::Asc => Token::Asc,
                SortDir::Desc => Token::Desc,
            });
        }
        ts
    }
}

// =============================================================================
// Query Builder
// =============================================================================

/// Mutable accumulator of SQL fragments for a query over one table.
///
/// Conditions and DISTINCT columns behave as ordered sets, joins are unique per
/// table, ORDER BY is positional. Assembly ([`QueryBuilder::build`]) only reads
/// the accumulated state.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBuilder {
    table: String,
    select: Vec<String>,
    distinct: Vec<String>,
    joins: Vec<Join>,
    conditions: Vec<String>,
    order_by: Vec<OrderByExpr>,
    limit: Option<u64>,
}

impl QueryBuilder {
    /// Create a builder selecting from `table`.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.into(),
            select: Vec::new(),
            distinct: Vec::new(),
            joins: Vec::new(),
            conditions: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Add a WHERE predicate (ANDed with the others).
    ///
    /// The fragment is trusted: no SQL validation happens here.
    pub fn add_condition(&mut self, condition: impl Into<String>) -> &mut Self {
        let condition = condition.into();
        if !self.conditions.contains(&condition) {
            self.conditions.push(condition);
        }
        self
    }

    /// Add an INNER JOIN. A second join on an already joined table is ignored.
    pub fn add_join(&mut self, table: &str, on: impl Into<String>) -> &mut Self {
        let join = Join::new(table, on);
        match self.joins.iter().find(|j| j.table == join.table) {
            Some(existing) if existing.on != join.on => {
                warn!(
                    table = %join.table,
                    kept = %existing.on,
                    ignored = %join.on,
                    "table already joined with a different predicate"
                );
            }
            Some(_) => {}
            None => self.joins.push(join),
        }
        self
    }

    /// Whether `table` has already been joined.
    pub fn has_join(&self, table: &str) -> bool {
        self.joins.iter().any(|j| j.table == table)
    }

    /// Add a column to the `DISTINCT ON` list.
    pub fn add_distinct(&mut self, column: impl Into<String>) -> &mut Self {
        let column = column.into();
        if !self.distinct.contains(&column) {
            self.distinct.push(column);
        }
        self
    }

    /// Append an ORDER BY key.
    pub fn add_order_by(&mut self, order: OrderByExpr) -> &mut Self {
        if !self.order_by.contains(&order) {
            self.order_by.push(order);
        }
        self
    }

    /// Select a specific field instead of `<table>.*`.
    pub fn add_select_field(&mut self, field: impl Into<String>) -> &mut Self {
        let field = field.into();
        if !self.select.contains(&field) {
            self.select.push(field);
        }
        self
    }

    /// Set LIMIT.
    pub fn set_limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn distinct(&self) -> &[String] {
        &self.distinct
    }

    pub fn order_by(&self) -> &[OrderByExpr] {
        &self.order_by
    }

    /// FROM, JOINs and WHERE, shared by the select and count forms.
    fn from_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::From).space().raw(&self.table);

        for join in &self.joins {
            ts.space().append(&join.to_tokens());
        }

        if !self.conditions.is_empty() {
            ts.space().push(Token::Where).space();
            ts.separated(self.conditions.iter().map(String::as_str), Token::And);
        }
        ts
    }

    /// Convert to a token stream.
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(Token::Select).space();
        if !self.distinct.is_empty() {
            ts.push(Token::Distinct)
                .space()
                .push(Token::On)
                .space()
                .lparen();
            ts.separated(self.distinct.iter().map(String::as_str), Token::Comma);
            ts.rparen().space();
        }

        if self.select.is_empty() {
            ts.raw(&self.table).push(Token::Dot).push(Token::Star);
        } else {
            ts.separated(self.select.iter().map(String::as_str), Token::Comma);
        }

        ts.space().append(&self.from_tokens());

        if !self.order_by.is_empty() {
            ts.space().push(Token::OrderBy).space();
            for (i, order) in self.order_by.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.append(&order.to_tokens());
            }
        }

        if let Some(limit) = self.limit {
            ts.space()
                .push(Token::Limit)
                .space()
                .push(Token::LitInt(limit));
        }

        ts
    }

    /// Convert to a token stream counting the matching rows.
    ///
    /// With `DISTINCT ON` columns the count runs over the distinct query, since
    /// only one row per group survives.
    pub fn to_count_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Select)
            .space()
            .push(Token::Count)
            .lparen()
            .push(Token::Star)
            .rparen()
            .space();

        if self.distinct.is_empty() {
            ts.append(&self.from_tokens());
        } else {
            let mut inner = self.clone();
            inner.limit = None;
            ts.push(Token::From)
                .space()
                .lparen()
                .append(&inner.to_tokens())
                .rparen()
                .space()
                .push(Token::As)
                .space()
                .raw("counted");
        }
        ts
    }

    /// Generate SQL for a specific dialect.
    pub fn to_sql(&self, dialect: &dyn SqlDialect) -> String {
        self.to_tokens().serialize(dialect)
    }

    /// Assemble the final query text.
    ///
    /// Deterministic and side-effect free: calling it twice without mutation
    /// yields the same text.
    pub fn build(&self) -> String {
        self.to_sql(&Postgres)
    }

    /// Assemble the `SELECT COUNT(*)` form of the query.
    pub fn build_count(&self) -> String {
        self.to_count_tokens().serialize(&Postgres)
    }
}

impl std::fmt::Display for QueryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.build())
    }
}

// =============================================================================
// Tests
// =============================================================================
