//! System compiler.

use super::conditions::{any_of, id_condition};
use super::feature::FeatureTable;
use super::{CompileContext, CompileError, CompileResult, EntityQueryCompiler};
use crate::filter::{EntityKind, SystemFilter};
use crate::sql::QueryBuilder;

/// Compiles [`SystemFilter`]s over a feature-shaped system table.
#[derive(Debug, Clone, Copy)]
pub struct SystemQueryCompiler<'a> {
    ctx: CompileContext<'a>,
    columns: FeatureTable<'a>,
}

impl<'a> SystemQueryCompiler<'a> {
    pub fn new(ctx: CompileContext<'a>) -> CompileResult<Self> {
        let table = ctx.require_table(EntityKind::System)?;
        Ok(Self::with_table(ctx, table))
    }

    pub fn with_table(ctx: CompileContext<'a>, table: &'a str) -> Self {
        Self {
            ctx,
            columns: FeatureTable::new(table, EntityKind::System),
        }
    }

    /// Selected systems, and their direct members if requested.
    fn add_internal_ids(&self, filter: &SystemFilter, builder: &mut QueryBuilder) {
        let mut alternatives = Vec::new();
        alternatives.extend(id_condition(&self.columns.id(), &filter.internal_ids));
        if filter.include_members {
            alternatives.extend(id_condition(&self.columns.parent_id(), &filter.internal_ids));
        }
        if let Some(condition) = any_of(alternatives) {
            builder.add_condition(condition);
        }
    }

    fn unsupported(&self, field: &'static str) -> CompileError {
        CompileError::Unsupported {
            entity: EntityKind::System,
            field,
        }
    }
}

impl EntityQueryCompiler for SystemQueryCompiler<'_> {
    type Filter = SystemFilter;

    fn entity(&self) -> EntityKind {
        EntityKind::System
    }

    fn table(&self) -> &str {
        self.columns.table
    }

    fn compile<'b>(
        &self,
        filter: &SystemFilter,
        builder: &'b mut QueryBuilder,
    ) -> CompileResult<&'b mut QueryBuilder> {
        let dialect = self.ctx.dialect;

        if let Some(parent) = &filter.parent {
            self.columns.add_parent(parent, builder)?;
        }
        if filter.procedure.is_some() {
            return Err(self.unsupported("procedure"));
        }
        if filter.data_streams.is_some() {
            return Err(self.unsupported("dataStreams"));
        }

        self.add_internal_ids(filter, builder);
        self.columns
            .add_unique_ids(&filter.unique_ids, dialect, builder);
        if let Some(location) = &filter.location {
            self.columns.add_location(location, dialect, builder)?;
        }
        if let Some(full_text) = &filter.full_text {
            self.columns.add_full_text(full_text, dialect, builder)?;
        }

        if let Some(valid_time) = &filter.valid_time {
            self.columns.add_valid_time(valid_time, dialect, builder)?;
        }

        Ok(builder)
    }
}
