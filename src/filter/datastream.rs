use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{
    FilterLimit, FlatIds, FullTextFilter, Linked, LinkedFilter, ObsFilter, SystemFilter,
    TemporalFilter, EMPTY_UIDS,
};

/// Selects data streams.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataStreamFilter {
    pub internal_ids: BTreeSet<i64>,
    /// Producing systems.
    pub system: Option<Linked<SystemFilter>>,
    pub full_text: Option<FullTextFilter>,
    pub valid_time: Option<TemporalFilter>,
    pub output_names: BTreeSet<String>,
    /// Observable property URIs, matched anywhere in the record schema.
    pub observed_properties: BTreeSet<String>,
    /// Streams having at least one matching observation. Not compilable.
    pub observations: Option<Box<ObsFilter>>,
    pub limit: Option<u64>,
}

impl DataStreamFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_internal_ids(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.internal_ids.extend(ids);
        self
    }

    pub fn with_system_ids(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.system = Some(Linked::ids(ids));
        self
    }

    pub fn with_systems(mut self, filter: SystemFilter) -> Self {
        self.system = Some(Linked::filter(filter));
        self
    }

    pub fn with_output_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.output_names.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_observed_properties<S: Into<String>>(
        mut self,
        uris: impl IntoIterator<Item = S>,
    ) -> Self {
        self.observed_properties
            .extend(uris.into_iter().map(Into::into));
        self
    }

    pub fn with_full_text(mut self, full_text: FullTextFilter) -> Self {
        self.full_text = Some(full_text);
        self
    }

    pub fn with_valid_time(mut self, time: TemporalFilter) -> Self {
        self.valid_time = Some(time);
        self
    }
}

impl LinkedFilter for DataStreamFilter {
    fn flat_ids(&self) -> Option<FlatIds<'_>> {
        let only_ids = self.system.is_none()
            && self.full_text.is_none()
            && self.valid_time.is_none()
            && self.output_names.is_empty()
            && self.observed_properties.is_empty()
            && self.observations.is_none();
        only_ids.then_some(FlatIds {
            internal_ids: &self.internal_ids,
            unique_ids: &EMPTY_UIDS,
        })
    }
}

impl FilterLimit for DataStreamFilter {
    fn limit(&self) -> Option<u64> {
        self.limit
    }
}
