//! Compilation from filters to SQL.
//!
//! One compiler per entity kind turns a filter into [`QueryBuilder`]
//! mutations. Linked-entity filters are compiled by the linked entity's own
//! compiler into the same builder, so a filter graph ends up as one query:
//!
//! ```text
//! ObsFilter ──► ObsQueryCompiler ──join──► DataStreamQueryCompiler ──join──► SystemQueryCompiler
//!                      │                           │                               │
//!                      └───────────────────────────┴───────────── QueryBuilder ◄───┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use obsql::compile::{compile_filter, CompileContext};
//! use obsql::config::TableNames;
//! use obsql::filter::{EntityFilter, ObsFilter, TemporalFilter};
//!
//! let tables = TableNames::default();
//! let filter = ObsFilter::new()
//!     .with_data_stream_ids([7])
//!     .with_result_time(TemporalFilter::Latest);
//!
//! let output = compile_filter(&EntityFilter::Observation(filter), CompileContext::new(&tables))?;
//! println!("{}", output.sql);
//! ```

mod command;
mod conditions;
mod datastream;
mod feature;
pub mod linked;
mod obs;
mod obs_stats;
mod stream;
mod system;
pub mod temporal;

pub use command::{
    CommandQueryCompiler, CommandStreamQueryCompiler, COMMANDSTREAM_ID, ISSUE_TIME, SENDER_ID,
};
pub use datastream::DataStreamQueryCompiler;
pub use feature::FoiQueryCompiler;
pub use obs::{ObsQueryCompiler, DATASTREAM_ID, FOI_ID, PHENOMENON_TIME, RESULT_TIME};
pub use obs_stats::ObsStatsQueryCompiler;
pub use system::SystemQueryCompiler;

use tracing::debug;

use crate::config::TableNames;
use crate::filter::{EntityFilter, EntityKind, FilterLimit};
use crate::sql::{Postgres, QueryBuilder, SqlDialect};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during compilation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// A nested filter needs a table that is not configured.
    #[error("No linked {entity} store (filter field '{field}')")]
    NoLinkedStore {
        entity: EntityKind,
        field: &'static str,
    },

    #[error("No table configured for {0}")]
    MissingTable(EntityKind),

    #[error("Filtering {entity} on '{field}' is not supported")]
    Unsupported {
        entity: EntityKind,
        field: &'static str,
    },

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
}

pub type CompileResult<T> = Result<T, CompileError>;

// ============================================================================
// Context
// ============================================================================

/// Read-only inputs shared by every compiler of one compilation.
#[derive(Debug, Clone, Copy)]
pub struct CompileContext<'a> {
    /// Which stores are deployed, and their tables.
    pub tables: &'a TableNames,
    /// Renders vendor-specific conditions.
    pub dialect: &'a dyn SqlDialect,
}

impl<'a> CompileContext<'a> {
    pub fn new(tables: &'a TableNames) -> Self {
        Self {
            tables,
            dialect: &Postgres,
        }
    }

    pub fn with_dialect(mut self, dialect: &'a dyn SqlDialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Table for `entity`, or [`CompileError::MissingTable`].
    pub fn require_table(&self, entity: EntityKind) -> CompileResult<&'a str> {
        self.tables
            .table_for(entity)
            .ok_or(CompileError::MissingTable(entity))
    }

    pub fn linked_table(&self, entity: EntityKind) -> Option<&'a str> {
        self.tables.table_for(entity)
    }
}

// ============================================================================
// Compiler trait
// ============================================================================

/// Turns one entity kind's filter into query builder mutations.
pub trait EntityQueryCompiler {
    type Filter: FilterLimit;

    fn entity(&self) -> EntityKind;

    /// Table (or schema-qualified table) this compiler qualifies columns with.
    fn table(&self) -> &str;

    /// Add the filter's joins, conditions and ordering to `builder`.
    ///
    /// Dispatch order: linked entities, flat criteria, then temporal fields.
    fn compile<'b>(
        &self,
        filter: &Self::Filter,
        builder: &'b mut QueryBuilder,
    ) -> CompileResult<&'b mut QueryBuilder>;

    /// Compile into a fresh builder over this compiler's table, applying the
    /// filter's limit. LIMIT is a `bigint`, so larger limits are rejected.
    fn query(&self, filter: &Self::Filter) -> CompileResult<QueryBuilder> {
        let mut builder = QueryBuilder::new(self.table());
        self.compile(filter, &mut builder)?;
        if let Some(limit) = filter.limit() {
            if i64::try_from(limit).is_err() {
                return Err(CompileError::InvalidFilter(format!(
                    "limit {} exceeds {}",
                    limit,
                    i64::MAX
                )));
            }
            builder.set_limit(limit);
        }
        Ok(builder)
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result of compiling a filter.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// The generated query.
    pub sql: String,

    /// Row count form of the same query.
    pub count_sql: String,

    /// The accumulated builder, for further manipulation.
    pub query: QueryBuilder,
}

// ============================================================================
// Compilation Functions
// ============================================================================

/// Compile a top-level filter with the compiler for its entity kind.
pub fn compile_filter(filter: &EntityFilter, ctx: CompileContext<'_>) -> CompileResult<CompileOutput> {
    let query = match filter {
        EntityFilter::Observation(f) => ObsQueryCompiler::new(ctx)?.query(f)?,
        EntityFilter::ObservationStatistics(f) => ObsStatsQueryCompiler::new(ctx)?.query(f)?,
        EntityFilter::DataStream(f) => DataStreamQueryCompiler::new(ctx)?.query(f)?,
        EntityFilter::FeatureOfInterest(f) => FoiQueryCompiler::new(ctx)?.query(f)?,
        EntityFilter::System(f) => SystemQueryCompiler::new(ctx)?.query(f)?,
        EntityFilter::CommandStream(f) => CommandStreamQueryCompiler::new(ctx)?.query(f)?,
        EntityFilter::Command(f) => CommandQueryCompiler::new(ctx)?.query(f)?,
    };

    let sql = query.to_sql(ctx.dialect);
    let count_sql = query.to_count_tokens().serialize(ctx.dialect);
    debug!(entity = %filter.entity(), dialect = %ctx.dialect, %sql, "compiled filter");

    Ok(CompileOutput {
        sql,
        count_sql,
        query,
    })
}

/// Qualify `column` with `table`.
pub(crate) fn qualified(table: &str, column: &str) -> String {
    format!("{}.{}", table, column)
}

// ============================================================================
// Tests
// ============================================================================
