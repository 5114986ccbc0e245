//! Stream-shaped tables (data streams, command streams).
//!
//! Stream rows are `(id, data)` with the stream description as JSON. The
//! owning system is referenced from inside the document
//! (`system@id.internalID.id` and `system@id.uniqueID`), and a row is one
//! version of the stream, valid over `validTime.begin..end`.

use std::collections::BTreeSet;

use super::conditions::{full_text_condition, id_condition, uid_condition};
use super::linked::{self, LinkResolution};
use super::temporal::{apply_temporal, Rows, TimeTarget};
use super::{qualified, CompileContext, CompileResult, EntityQueryCompiler, SystemQueryCompiler};
use crate::filter::{EntityKind, FullTextFilter, Linked, SystemFilter, TemporalFilter};
use crate::sql::{QueryBuilder, SqlDialect};

/// Column expressions of one stream-shaped table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StreamTable<'a> {
    pub table: &'a str,
}

impl<'a> StreamTable<'a> {
    pub fn new(table: &'a str) -> Self {
        Self { table }
    }

    pub fn id(&self) -> String {
        qualified(self.table, "id")
    }

    /// Owning system's internal id.
    pub fn system_id(&self) -> String {
        format!("({}.data->'system@id'->'internalID'->>'id')::bigint", self.table)
    }

    fn system_uid(&self) -> String {
        format!("({}.data->'system@id'->>'uniqueID')", self.table)
    }

    /// Top-level text member of the stream document.
    pub fn text(&self, member: &str) -> String {
        format!("({}.data->>'{}')", self.table, member)
    }

    fn valid_bound(&self, bound: &str) -> String {
        format!("{}.data->'validTime'->>'{}'", self.table, bound)
    }

    /// Owning system: joined and compiled when the system table is
    /// configured, otherwise matched on the ids embedded in the document.
    pub fn add_system_link(
        &self,
        ctx: CompileContext<'_>,
        link: &Linked<SystemFilter>,
        builder: &mut QueryBuilder,
    ) -> CompileResult<()> {
        let linked_table = ctx.linked_table(EntityKind::System);
        match linked::resolve(link, linked_table, EntityKind::System, "system")? {
            LinkResolution::Join { table, filter } => {
                builder.add_join(
                    table,
                    format!("{} = {}", self.system_id(), qualified(table, "id")),
                );
                SystemQueryCompiler::with_table(ctx, table).compile(filter, builder)?;
            }
            LinkResolution::Flat(flat) => {
                if let Some(condition) = id_condition(&self.system_id(), flat.internal_ids) {
                    builder.add_condition(condition);
                }
                if let Some(condition) =
                    uid_condition(&self.system_uid(), flat.unique_ids, ctx.dialect)
                {
                    builder.add_condition(condition);
                }
            }
        }
        Ok(())
    }

    /// `id = pinned`, or the filter's ids.
    pub fn add_internal_ids(
        &self,
        ids: &BTreeSet<i64>,
        pinned: Option<i64>,
        builder: &mut QueryBuilder,
    ) {
        let id = self.id();
        let condition = match pinned {
            Some(pinned) => Some(format!("{} = {}", id, pinned)),
            None => id_condition(&id, ids),
        };
        if let Some(condition) = condition {
            builder.add_condition(condition);
        }
    }

    /// Keywords match the record schema description.
    pub fn add_full_text(
        &self,
        full_text: &FullTextFilter,
        dialect: &dyn SqlDialect,
        builder: &mut QueryBuilder,
    ) -> CompileResult<()> {
        let description = format!("{}.data->'recordSchema'->>'description'", self.table);
        builder.add_condition(full_text_condition(&[description], full_text, dialect)?);
        Ok(())
    }

    /// Any of the property URIs appears anywhere in the stream document.
    pub fn property_condition(
        &self,
        uris: &BTreeSet<String>,
        dialect: &dyn SqlDialect,
    ) -> Option<String> {
        if uris.is_empty() {
            return None;
        }
        let tests = uris
            .iter()
            .map(|uri| format!("@ == \"{}\"", uri.replace('\\', "\\\\").replace('"', "\\\"")))
            .collect::<Vec<_>>()
            .join(" || ");
        let path = format!("$.** ? ({})", tests);
        Some(format!(
            "jsonb_path_exists({}.data, {})",
            self.table,
            dialect.quote_string(&path)
        ))
    }

    /// Range: validity compared with the interval. Latest: current version
    /// of each named stream of each system.
    pub fn add_valid_time(
        &self,
        time: &TemporalFilter,
        dialect: &dyn SqlDialect,
        builder: &mut QueryBuilder,
    ) -> CompileResult<()> {
        let begin = self.valid_bound("begin");
        let end = self.valid_bound("end");
        let latest_key = format!("({})::timestamptz", end);
        let target = TimeTarget::Period {
            begin: &begin,
            end: &end,
            latest_key: &latest_key,
        };
        let name = self.text("name");
        let system = self.system_id();
        let id = self.id();
        let rows = Rows {
            table: self.table,
            key: &[id.as_str()],
        };
        apply_temporal(
            time,
            target,
            &[name.as_str(), system.as_str()],
            rows,
            dialect,
            builder,
        )?;
        Ok(())
    }
}
