//! Feature-shaped tables (features of interest, systems) and the feature of
//! interest compiler.
//!
//! Feature rows keep their properties in a `data` JSON document; a row is one
//! version of a feature, valid over `properties.validTime[0..1]`.

use std::collections::BTreeSet;

use super::conditions::{full_text_condition, id_condition, spatial_condition, uid_condition};
use super::temporal::{apply_temporal, Rows, TimeTarget};
use super::{qualified, CompileContext, CompileError, CompileResult, EntityQueryCompiler};
use crate::filter::{
    EntityKind, FoiFilter, FullTextFilter, Linked, LinkedFilter, SpatialFilter, TemporalFilter,
};
use crate::sql::{QueryBuilder, SqlDialect};

/// Column expressions of one feature-shaped table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FeatureTable<'a> {
    pub table: &'a str,
    pub entity: EntityKind,
}

impl<'a> FeatureTable<'a> {
    pub fn new(table: &'a str, entity: EntityKind) -> Self {
        Self { table, entity }
    }

    pub fn id(&self) -> String {
        qualified(self.table, "id")
    }

    pub fn parent_id(&self) -> String {
        qualified(self.table, "parentid")
    }

    fn geometry(&self) -> String {
        qualified(self.table, "geometry")
    }

    fn property(&self, name: &str) -> String {
        format!("{}.data->'properties'->>'{}'", self.table, name)
    }

    pub fn uid(&self) -> String {
        format!("({})", self.property("uid"))
    }

    fn valid_bound(&self, index: u8) -> String {
        format!("{}.data->'properties'->'validTime'->>{}", self.table, index)
    }

    pub fn add_unique_ids(
        &self,
        uids: &BTreeSet<String>,
        dialect: &dyn SqlDialect,
        builder: &mut QueryBuilder,
    ) {
        if let Some(condition) = uid_condition(&self.uid(), uids, dialect) {
            builder.add_condition(condition);
        }
    }

    /// Parent by id. Nested parent criteria would need a self-join.
    pub fn add_parent<F: LinkedFilter>(
        &self,
        parent: &Linked<F>,
        builder: &mut QueryBuilder,
    ) -> CompileResult<()> {
        let ids = match parent {
            Linked::Ids(ids) => ids,
            Linked::Filter(filter) => match filter.flat_ids() {
                Some(flat) if flat.unique_ids.is_empty() => flat.internal_ids,
                _ => {
                    return Err(CompileError::Unsupported {
                        entity: self.entity,
                        field: "parent",
                    })
                }
            },
        };
        if let Some(condition) = id_condition(&self.parent_id(), ids) {
            builder.add_condition(condition);
        }
        Ok(())
    }

    pub fn add_location(
        &self,
        location: &SpatialFilter,
        dialect: &dyn SqlDialect,
        builder: &mut QueryBuilder,
    ) -> CompileResult<()> {
        builder.add_condition(spatial_condition(&self.geometry(), location, dialect)?);
        Ok(())
    }

    /// Keywords match the feature name or description.
    pub fn add_full_text(
        &self,
        full_text: &FullTextFilter,
        dialect: &dyn SqlDialect,
        builder: &mut QueryBuilder,
    ) -> CompileResult<()> {
        let exprs = [self.property("name"), self.property("description")];
        builder.add_condition(full_text_condition(&exprs, full_text, dialect)?);
        Ok(())
    }

    /// Range: version validity compared with the interval. Latest: newest
    /// version of each feature. Versions share `id`, so when the table is
    /// joined the condition is on `(id, validity begin)`.
    pub fn add_valid_time(
        &self,
        time: &TemporalFilter,
        dialect: &dyn SqlDialect,
        builder: &mut QueryBuilder,
    ) -> CompileResult<()> {
        let begin = self.valid_bound(0);
        let end = self.valid_bound(1);
        let latest_key = format!("({})::timestamptz", begin);
        let target = TimeTarget::Period {
            begin: &begin,
            end: &end,
            latest_key: &latest_key,
        };
        let id = self.id();
        let rows = Rows {
            table: self.table,
            key: &[id.as_str(), latest_key.as_str()],
        };
        apply_temporal(time, target, &[id.as_str()], rows, dialect, builder)?;
        Ok(())
    }
}

/// Compiles [`FoiFilter`]s.
#[derive(Debug, Clone, Copy)]
pub struct FoiQueryCompiler<'a> {
    ctx: CompileContext<'a>,
    columns: FeatureTable<'a>,
}

impl<'a> FoiQueryCompiler<'a> {
    pub fn new(ctx: CompileContext<'a>) -> CompileResult<Self> {
        let table = ctx.require_table(EntityKind::FeatureOfInterest)?;
        Ok(Self::with_table(ctx, table))
    }

    /// Compiler for a feature table joined under another name.
    pub fn with_table(ctx: CompileContext<'a>, table: &'a str) -> Self {
        Self {
            ctx,
            columns: FeatureTable::new(table, EntityKind::FeatureOfInterest),
        }
    }

    /// Restrict feature versions to those valid during `time`.
    pub fn add_valid_time(
        &self,
        time: &TemporalFilter,
        builder: &mut QueryBuilder,
    ) -> CompileResult<()> {
        self.columns.add_valid_time(time, self.ctx.dialect, builder)
    }

    fn unsupported(&self, field: &'static str) -> CompileError {
        CompileError::Unsupported {
            entity: EntityKind::FeatureOfInterest,
            field,
        }
    }
}

impl EntityQueryCompiler for FoiQueryCompiler<'_> {
    type Filter = FoiFilter;

    fn entity(&self) -> EntityKind {
        EntityKind::FeatureOfInterest
    }

    fn table(&self) -> &str {
        self.columns.table
    }

    fn compile<'b>(
        &self,
        filter: &FoiFilter,
        builder: &'b mut QueryBuilder,
    ) -> CompileResult<&'b mut QueryBuilder> {
        let dialect = self.ctx.dialect;

        if let Some(parent) = &filter.parent {
            self.columns.add_parent(parent, builder)?;
        }
        if filter.observations.is_some() {
            return Err(self.unsupported("observations"));
        }
        if filter.sampled_feature.is_some() {
            return Err(self.unsupported("sampledFeature"));
        }

        if let Some(condition) = id_condition(&self.columns.id(), &filter.internal_ids) {
            builder.add_condition(condition);
        }
        self.columns
            .add_unique_ids(&filter.unique_ids, dialect, builder);
        if let Some(location) = &filter.location {
            self.columns.add_location(location, dialect, builder)?;
        }
        if let Some(full_text) = &filter.full_text {
            self.columns.add_full_text(full_text, dialect, builder)?;
        }

        if let Some(valid_time) = &filter.valid_time {
            self.add_valid_time(valid_time, builder)?;
        }

        Ok(builder)
    }
}
