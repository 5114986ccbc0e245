use serde::{Deserialize, Serialize};

use super::{DataStreamFilter, FilterLimit, FoiFilter, Linked, TemporalFilter};

/// Selects observations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObsFilter {
    /// Parent data streams.
    pub data_stream: Option<Linked<DataStreamFilter>>,
    /// Observed features.
    pub foi: Option<Linked<FoiFilter>>,
    pub phenomenon_time: Option<TemporalFilter>,
    pub result_time: Option<TemporalFilter>,
    pub limit: Option<u64>,
}

impl ObsFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_stream_ids(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.data_stream = Some(Linked::ids(ids));
        self
    }

    pub fn with_data_streams(mut self, filter: DataStreamFilter) -> Self {
        self.data_stream = Some(Linked::filter(filter));
        self
    }

    pub fn with_foi_ids(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.foi = Some(Linked::ids(ids));
        self
    }

    pub fn with_fois(mut self, filter: FoiFilter) -> Self {
        self.foi = Some(Linked::filter(filter));
        self
    }

    pub fn with_phenomenon_time(mut self, time: TemporalFilter) -> Self {
        self.phenomenon_time = Some(time);
        self
    }

    pub fn with_result_time(mut self, time: TemporalFilter) -> Self {
        self.result_time = Some(time);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl FilterLimit for ObsFilter {
    fn limit(&self) -> Option<u64> {
        self.limit
    }
}

/// Selects observations for statistics, pinned to at most one data stream
/// and one feature.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObsStatsFilter {
    pub obs: ObsFilter,
    pub data_stream_id: Option<i64>,
    pub foi_id: Option<i64>,
    pub limit: Option<u64>,
}

impl ObsStatsFilter {
    pub fn new(obs: ObsFilter) -> Self {
        Self {
            obs,
            ..Self::default()
        }
    }

    pub fn with_data_stream_id(mut self, id: i64) -> Self {
        self.data_stream_id = Some(id);
        self
    }

    pub fn with_foi_id(mut self, id: i64) -> Self {
        self.foi_id = Some(id);
        self
    }
}

impl FilterLimit for ObsStatsFilter {
    fn limit(&self) -> Option<u64> {
        self.limit.or(self.obs.limit)
    }
}
