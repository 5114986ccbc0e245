//! Command stream and command compilers.
//!
//! Command streams are stream-shaped rows (see [`StreamTable`]) accepting
//! commands on one control input of a system. Command rows reference their
//! stream through `commandstreamid`.

use super::conditions::{feature_id_condition, id_condition, string_in_condition};
use super::linked::{self, LinkResolution};
use super::stream::StreamTable;
use super::temporal::{apply_temporal, Rows, TimeTarget};
use super::{qualified, CompileContext, CompileError, CompileResult, EntityQueryCompiler, FOI_ID};
use crate::filter::{CommandFilter, CommandStreamFilter, EntityKind, Linked};
use crate::sql::QueryBuilder;

/// Foreign key to the command stream table.
pub const COMMANDSTREAM_ID: &str = "commandstreamid";
pub const SENDER_ID: &str = "senderid";
pub const ISSUE_TIME: &str = "issueTime";

// ============================================================================
// Command streams
// ============================================================================

/// Compiles [`CommandStreamFilter`]s.
#[derive(Debug, Clone, Copy)]
pub struct CommandStreamQueryCompiler<'a> {
    ctx: CompileContext<'a>,
    columns: StreamTable<'a>,
}

impl<'a> CommandStreamQueryCompiler<'a> {
    pub fn new(ctx: CompileContext<'a>) -> CompileResult<Self> {
        let table = ctx.require_table(EntityKind::CommandStream)?;
        Ok(Self::with_table(ctx, table))
    }

    pub fn with_table(ctx: CompileContext<'a>, table: &'a str) -> Self {
        Self {
            ctx,
            columns: StreamTable::new(table),
        }
    }

    /// Streams with at least one matching command, as a semi-join so each
    /// stream row appears once.
    fn add_commands(&self, commands: &CommandFilter, builder: &mut QueryBuilder) -> CompileResult<()> {
        let table = self
            .ctx
            .linked_table(EntityKind::Command)
            .ok_or(CompileError::NoLinkedStore {
                entity: EntityKind::Command,
                field: "commands",
            })?;

        let compiler = CommandQueryCompiler::with_table(self.ctx, table).within_stream();
        let mut matching = QueryBuilder::new(table);
        matching.add_select_field(compiler.column(COMMANDSTREAM_ID));
        compiler.compile(commands, &mut matching)?;

        builder.add_condition(format!(
            "{} IN ({})",
            self.columns.id(),
            matching.to_sql(self.ctx.dialect)
        ));
        Ok(())
    }
}

impl EntityQueryCompiler for CommandStreamQueryCompiler<'_> {
    type Filter = CommandStreamFilter;

    fn entity(&self) -> EntityKind {
        EntityKind::CommandStream
    }

    fn table(&self) -> &str {
        self.columns.table
    }

    fn compile<'b>(
        &self,
        filter: &CommandStreamFilter,
        builder: &'b mut QueryBuilder,
    ) -> CompileResult<&'b mut QueryBuilder> {
        let dialect = self.ctx.dialect;
        let columns = &self.columns;

        if let Some(system) = &filter.system {
            columns.add_system_link(self.ctx, system, builder)?;
        }
        if let Some(commands) = &filter.commands {
            self.add_commands(commands, builder)?;
        }

        columns.add_internal_ids(&filter.internal_ids, None, builder);
        if let Some(full_text) = &filter.full_text {
            columns.add_full_text(full_text, dialect, builder)?;
        }
        let input_name = columns.text("controlInputName");
        if let Some(condition) =
            string_in_condition(&input_name, &filter.control_input_names, dialect)
        {
            builder.add_condition(condition);
        }
        if let Some(condition) = columns.property_condition(&filter.taskable_properties, dialect)
        {
            builder.add_condition(condition);
        }

        if let Some(valid_time) = &filter.valid_time {
            columns.add_valid_time(valid_time, dialect, builder)?;
        }

        Ok(builder)
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Compiles [`CommandFilter`]s.
#[derive(Debug, Clone, Copy)]
pub struct CommandQueryCompiler<'a> {
    ctx: CompileContext<'a>,
    table: &'a str,
    within_stream: bool,
}

impl<'a> CommandQueryCompiler<'a> {
    pub fn new(ctx: CompileContext<'a>) -> CompileResult<Self> {
        let table = ctx.require_table(EntityKind::Command)?;
        Ok(Self::with_table(ctx, table))
    }

    pub fn with_table(ctx: CompileContext<'a>, table: &'a str) -> Self {
        Self {
            ctx,
            table,
            within_stream: false,
        }
    }

    /// Compile commands already scoped to an enclosing command stream.
    fn within_stream(mut self) -> Self {
        self.within_stream = true;
        self
    }

    fn column(&self, name: &str) -> String {
        qualified(self.table, name)
    }

    fn add_command_stream(
        &self,
        link: &Linked<CommandStreamFilter>,
        builder: &mut QueryBuilder,
    ) -> CompileResult<()> {
        if self.within_stream {
            return Err(CompileError::Unsupported {
                entity: EntityKind::Command,
                field: "commandStream",
            });
        }

        let fk = self.column(COMMANDSTREAM_ID);
        let linked_table = self.ctx.linked_table(EntityKind::CommandStream);
        match linked::resolve(link, linked_table, EntityKind::CommandStream, "commandStream")? {
            LinkResolution::Join { table, filter } => {
                builder.add_join(table, format!("{} = {}", fk, qualified(table, "id")));
                CommandStreamQueryCompiler::with_table(self.ctx, table).compile(filter, builder)?;
            }
            LinkResolution::Flat(flat) => {
                if let Some(condition) = id_condition(&fk, flat.internal_ids) {
                    builder.add_condition(condition);
                }
            }
        }
        Ok(())
    }
}

impl EntityQueryCompiler for CommandQueryCompiler<'_> {
    type Filter = CommandFilter;

    fn entity(&self) -> EntityKind {
        EntityKind::Command
    }

    fn table(&self) -> &str {
        self.table
    }

    fn compile<'b>(
        &self,
        filter: &CommandFilter,
        builder: &'b mut QueryBuilder,
    ) -> CompileResult<&'b mut QueryBuilder> {
        let dialect = self.ctx.dialect;

        if let Some(link) = &filter.command_stream {
            self.add_command_stream(link, builder)?;
        }

        if let Some(condition) = id_condition(&self.column("id"), &filter.internal_ids) {
            builder.add_condition(condition);
        }
        if let Some(condition) =
            string_in_condition(&self.column(SENDER_ID), &filter.sender_ids, dialect)
        {
            builder.add_condition(condition);
        }
        if let Some(condition) = feature_id_condition(&self.column(FOI_ID), &filter.foi_ids) {
            builder.add_condition(condition);
        }

        // Latest: newest command of each stream.
        if let Some(issue_time) = &filter.issue_time {
            let column = self.column(ISSUE_TIME);
            let group = self.column(COMMANDSTREAM_ID);
            let key = self.column("id");
            let rows = Rows {
                table: self.table,
                key: &[key.as_str()],
            };
            apply_temporal(
                issue_time,
                TimeTarget::Instant { column: &column },
                &[group.as_str()],
                rows,
                dialect,
                builder,
            )?;
        }

        Ok(builder)
    }
}
