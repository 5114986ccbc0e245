//! Observation compiler.

use std::collections::BTreeSet;

use super::conditions::{feature_id_condition, id_condition};
use super::linked::{self, LinkResolution};
use super::temporal::{apply_temporal, Rows, TimeTarget};
use super::{
    qualified, CompileContext, CompileError, CompileResult, DataStreamQueryCompiler,
    EntityQueryCompiler, FoiQueryCompiler,
};
use crate::filter::{
    DataStreamFilter, EntityKind, FoiFilter, Linked, LinkedFilter, ObsFilter, TemporalFilter,
    NO_FEATURE,
};
use crate::sql::QueryBuilder;

/// Foreign key to the data stream table.
pub const DATASTREAM_ID: &str = "datastreamid";
/// Foreign key to the feature of interest table; NULL when there is none.
pub const FOI_ID: &str = "foiid";
pub const PHENOMENON_TIME: &str = "phenomenonTime";
pub const RESULT_TIME: &str = "resultTime";

/// Compiles [`ObsFilter`]s.
#[derive(Debug, Clone, Copy)]
pub struct ObsQueryCompiler<'a> {
    ctx: CompileContext<'a>,
    table: &'a str,
}

impl<'a> ObsQueryCompiler<'a> {
    pub fn new(ctx: CompileContext<'a>) -> CompileResult<Self> {
        let table = ctx.require_table(EntityKind::Observation)?;
        Ok(Self { ctx, table })
    }

    fn column(&self, name: &str) -> String {
        qualified(self.table, name)
    }

    /// Data stream link; `pinned_id` selects one stream on top of it.
    pub(crate) fn add_data_stream(
        &self,
        link: Option<&Linked<DataStreamFilter>>,
        pinned_id: Option<i64>,
        builder: &mut QueryBuilder,
    ) -> CompileResult<()> {
        let fk = self.column(DATASTREAM_ID);
        let resolution = match link {
            Some(link) => Some(linked::resolve(
                link,
                self.ctx.linked_table(EntityKind::DataStream),
                EntityKind::DataStream,
                "dataStream",
            )?),
            None => None,
        };

        if let Some(LinkResolution::Join { table, filter }) = resolution {
            builder.add_join(table, format!("{} = {}", fk, qualified(table, "id")));
            let mut compiler = DataStreamQueryCompiler::with_table(self.ctx, table);
            if let Some(id) = pinned_id {
                compiler = compiler.pin_id(id);
            }
            compiler.compile(filter, builder)?;
            return Ok(());
        }

        if let Some(LinkResolution::Flat(flat)) = resolution {
            if let Some(condition) = id_condition(&fk, flat.internal_ids) {
                builder.add_condition(condition);
            }
        }
        if let Some(id) = pinned_id {
            builder.add_condition(format!("{} = {}", fk, id));
        }
        Ok(())
    }

    /// Feature of interest link. When the feature table is joined and the
    /// phenomenon time is a range, only feature versions valid during that
    /// range match.
    ///
    /// [`NO_FEATURE`] has no feature row to join, so an ids-only filter naming
    /// it stays on the foreign key whether or not the feature table exists.
    pub(crate) fn add_foi(
        &self,
        link: &Linked<FoiFilter>,
        phenomenon_time: Option<&TemporalFilter>,
        builder: &mut QueryBuilder,
    ) -> CompileResult<()> {
        let linked_table = self.ctx.linked_table(EntityKind::FeatureOfInterest);
        match linked::resolve(link, linked_table, EntityKind::FeatureOfInterest, "foi")? {
            LinkResolution::Join { filter, .. } if filter.internal_ids.contains(&NO_FEATURE) => {
                match filter.flat_ids() {
                    Some(flat) => self.add_foi_ids(flat.internal_ids, builder),
                    None => {
                        return Err(CompileError::InvalidFilter(format!(
                            "feature id {} (no feature) cannot be combined with other feature criteria",
                            NO_FEATURE
                        )))
                    }
                }
            }
            LinkResolution::Join { table, filter } => {
                builder.add_join(
                    table,
                    format!("{} = {}", self.column(FOI_ID), qualified(table, "id")),
                );
                let foi = FoiQueryCompiler::with_table(self.ctx, table);
                foi.compile(filter, builder)?;
                if let Some(range @ TemporalFilter::Range { .. }) = phenomenon_time {
                    foi.add_valid_time(range, builder)?;
                }
            }
            LinkResolution::Flat(flat) => self.add_foi_ids(flat.internal_ids, builder),
        }
        Ok(())
    }

    /// Flat feature ids; [`NO_FEATURE`] matches observations without one.
    pub(crate) fn add_foi_ids(&self, ids: &BTreeSet<i64>, builder: &mut QueryBuilder) {
        if let Some(condition) = feature_id_condition(&self.column(FOI_ID), ids) {
            builder.add_condition(condition);
        }
    }

    /// Phenomenon time, then result time. Latest is per data stream.
    pub(crate) fn add_times(
        &self,
        phenomenon_time: Option<&TemporalFilter>,
        result_time: Option<&TemporalFilter>,
        builder: &mut QueryBuilder,
    ) -> CompileResult<()> {
        let group = self.column(DATASTREAM_ID);
        let key = self.column("id");
        let rows = Rows {
            table: self.table,
            key: &[key.as_str()],
        };
        let fields = [
            (phenomenon_time, PHENOMENON_TIME),
            (result_time, RESULT_TIME),
        ];
        for (time, name) in fields {
            if let Some(time) = time {
                let column = self.column(name);
                let target = TimeTarget::Instant { column: &column };
                apply_temporal(time, target, &[group.as_str()], rows, self.ctx.dialect, builder)?;
            }
        }
        Ok(())
    }
}

impl EntityQueryCompiler for ObsQueryCompiler<'_> {
    type Filter = ObsFilter;

    fn entity(&self) -> EntityKind {
        EntityKind::Observation
    }

    fn table(&self) -> &str {
        self.table
    }

    fn compile<'b>(
        &self,
        filter: &ObsFilter,
        builder: &'b mut QueryBuilder,
    ) -> CompileResult<&'b mut QueryBuilder> {
        self.add_data_stream(filter.data_stream.as_ref(), None, builder)?;
        if let Some(foi) = &filter.foi {
            self.add_foi(foi, filter.phenomenon_time.as_ref(), builder)?;
        }
        self.add_times(
            filter.phenomenon_time.as_ref(),
            filter.result_time.as_ref(),
            builder,
        )?;
        Ok(builder)
    }
}
