//! Data stream compiler.
//!
//! Data streams are stream-shaped rows (see [`StreamTable`]) produced by a
//! system and carrying observations of one output.

use super::conditions::string_in_condition;
use super::stream::StreamTable;
use super::{CompileContext, CompileError, CompileResult, EntityQueryCompiler};
use crate::filter::{DataStreamFilter, EntityKind};
use crate::sql::QueryBuilder;

/// Compiles [`DataStreamFilter`]s.
#[derive(Debug, Clone, Copy)]
pub struct DataStreamQueryCompiler<'a> {
    ctx: CompileContext<'a>,
    columns: StreamTable<'a>,
    pinned_id: Option<i64>,
}

impl<'a> DataStreamQueryCompiler<'a> {
    pub fn new(ctx: CompileContext<'a>) -> CompileResult<Self> {
        let table = ctx.require_table(EntityKind::DataStream)?;
        Ok(Self::with_table(ctx, table))
    }

    pub fn with_table(ctx: CompileContext<'a>, table: &'a str) -> Self {
        Self {
            ctx,
            columns: StreamTable::new(table),
            pinned_id: None,
        }
    }

    /// Select exactly this stream, in place of the filter's internal ids.
    pub fn pin_id(mut self, id: i64) -> Self {
        self.pinned_id = Some(id);
        self
    }

    /// Owning system's internal id.
    pub fn system_id(&self) -> String {
        self.columns.system_id()
    }
}

impl EntityQueryCompiler for DataStreamQueryCompiler<'_> {
    type Filter = DataStreamFilter;

    fn entity(&self) -> EntityKind {
        EntityKind::DataStream
    }

    fn table(&self) -> &str {
        self.columns.table
    }

    fn compile<'b>(
        &self,
        filter: &DataStreamFilter,
        builder: &'b mut QueryBuilder,
    ) -> CompileResult<&'b mut QueryBuilder> {
        let dialect = self.ctx.dialect;
        let columns = &self.columns;

        if let Some(system) = &filter.system {
            columns.add_system_link(self.ctx, system, builder)?;
        }
        if filter.observations.is_some() {
            return Err(CompileError::Unsupported {
                entity: EntityKind::DataStream,
                field: "observations",
            });
        }

        columns.add_internal_ids(&filter.internal_ids, self.pinned_id, builder);
        if let Some(full_text) = &filter.full_text {
            columns.add_full_text(full_text, dialect, builder)?;
        }
        let output_name = columns.text("outputName");
        if let Some(condition) = string_in_condition(&output_name, &filter.output_names, dialect)
        {
            builder.add_condition(condition);
        }
        if let Some(condition) = columns.property_condition(&filter.observed_properties, dialect)
        {
            builder.add_condition(condition);
        }

        if let Some(valid_time) = &filter.valid_time {
            columns.add_valid_time(valid_time, dialect, builder)?;
        }

        Ok(builder)
    }
}
