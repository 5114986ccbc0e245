//! Observation statistics compiler.
//!
//! Statistics are computed over the observation table, optionally pinned to
//! one data stream and one feature of interest.

use std::collections::BTreeSet;

use super::{CompileContext, CompileResult, EntityQueryCompiler, ObsQueryCompiler};
use crate::filter::{EntityKind, ObsStatsFilter};
use crate::sql::QueryBuilder;

/// Compiles [`ObsStatsFilter`]s over the observation table.
///
/// Both the data stream and the feature of interest constraints are always
/// applied; a pinned id narrows whatever the nested observation filter
/// selects.
#[derive(Debug, Clone, Copy)]
pub struct ObsStatsQueryCompiler<'a> {
    obs: ObsQueryCompiler<'a>,
}

impl<'a> ObsStatsQueryCompiler<'a> {
    pub fn new(ctx: CompileContext<'a>) -> CompileResult<Self> {
        Ok(Self {
            obs: ObsQueryCompiler::new(ctx)?,
        })
    }
}

impl EntityQueryCompiler for ObsStatsQueryCompiler<'_> {
    type Filter = ObsStatsFilter;

    fn entity(&self) -> EntityKind {
        EntityKind::ObservationStatistics
    }

    fn table(&self) -> &str {
        self.obs.table()
    }

    fn compile<'b>(
        &self,
        filter: &ObsStatsFilter,
        builder: &'b mut QueryBuilder,
    ) -> CompileResult<&'b mut QueryBuilder> {
        let obs = &filter.obs;

        self.obs
            .add_data_stream(obs.data_stream.as_ref(), filter.data_stream_id, builder)?;
        if let Some(foi) = &obs.foi {
            self.obs
                .add_foi(foi, obs.phenomenon_time.as_ref(), builder)?;
        }
        if let Some(foi_id) = filter.foi_id {
            self.obs.add_foi_ids(&BTreeSet::from([foi_id]), builder);
        }

        self.obs.add_times(
            obs.phenomenon_time.as_ref(),
            obs.result_time.as_ref(),
            builder,
        )?;
        Ok(builder)
    }
}
