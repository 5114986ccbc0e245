//! # obsql
//!
//! Compiles declarative observation-store filters to PostgreSQL.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Filter graph (filter::ObsFilter, ...)             │
//! │  (observations, streams, features, systems, commands)    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compile: one compiler per entity]
//! ┌─────────────────────────────────────────────────────────┐
//! │  linked entities ─► flat criteria ─► temporal fields     │
//! │  (join or foreign key)               (range or latest)   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sql::QueryBuilder]
//! ┌─────────────────────────────────────────────────────────┐
//! │                    SQL text                              │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Which linked stores exist (and their table names) comes from
//! [`config::TableNames`].

pub mod compile;
pub mod config;
pub mod filter;
pub mod sql;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compile::{
        compile_filter, CommandQueryCompiler, CommandStreamQueryCompiler, CompileContext,
        CompileError, CompileOutput, CompileResult, DataStreamQueryCompiler, EntityQueryCompiler, FoiQueryCompiler, ObsQueryCompiler,
        ObsStatsQueryCompiler, SystemQueryCompiler,
    };
    pub use crate::config::{Settings, TableNames};
    pub use crate::filter::{
        CommandFilter, CommandStreamFilter, DataStreamFilter, EntityFilter, EntityKind, FoiFilter, FullTextFilter, Linked, ObsFilter,
        ObsStatsFilter, RangeOp, SpatialFilter, SpatialOp, SystemFilter, TemporalFilter,
    };
    pub use crate::sql::{OrderByExpr, QueryBuilder, SqlDialect};
}

pub use compile::{compile_filter, CompileContext, CompileError};
pub use sql::QueryBuilder;
