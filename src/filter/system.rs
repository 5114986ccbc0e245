use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{
    DataStreamFilter, FilterLimit, FlatIds, FullTextFilter, Linked, LinkedFilter, SpatialFilter,
    TemporalFilter,
};

/// Selects systems (sensors, platforms, processes).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SystemFilter {
    pub internal_ids: BTreeSet<i64>,
    /// Unique ids; `*` acts as a wildcard.
    pub unique_ids: BTreeSet<String>,
    /// Also match members of the selected systems.
    pub include_members: bool,
    pub parent: Option<Linked<SystemFilter>>,
    pub procedure: Option<Box<SystemFilter>>,
    pub data_streams: Option<Box<DataStreamFilter>>,
    pub full_text: Option<FullTextFilter>,
    pub location: Option<SpatialFilter>,
    pub valid_time: Option<TemporalFilter>,
    pub limit: Option<u64>,
}

impl SystemFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_internal_ids(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.internal_ids.extend(ids);
        self
    }

    pub fn with_unique_ids<S: Into<String>>(mut self, uids: impl IntoIterator<Item = S>) -> Self {
        self.unique_ids.extend(uids.into_iter().map(Into::into));
        self
    }

    pub fn including_members(mut self) -> Self {
        self.include_members = true;
        self
    }

    pub fn with_parent_ids(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.parent = Some(Linked::ids(ids));
        self
    }

    pub fn with_location(mut self, location: SpatialFilter) -> Self {
        self.location = Some(location);
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

impl LinkedFilter for SystemFilter {
    /// Data stream rows embed both the internal and the unique system id.
    fn flat_ids(&self) -> Option<FlatIds<'_>> {
        let only_ids = !self.include_members
            && self.parent.is_none()
            && self.procedure.is_none()
            && self.data_streams.is_none()
            && self.full_text.is_none()
            && self.location.is_none()
            && self.valid_time.is_none();
        only_ids.then_some(FlatIds {
            internal_ids: &self.internal_ids,
            unique_ids: &self.unique_ids,
        })
    }
}

impl FilterLimit for SystemFilter {
    fn limit(&self) -> Option<u64> {
        self.limit
    }
}
