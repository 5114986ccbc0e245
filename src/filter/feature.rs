use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{
    FilterLimit, FlatIds, FullTextFilter, Linked, LinkedFilter, ObsFilter, SpatialFilter,
    TemporalFilter,
};

/// Selects features of interest.
///
/// Internal id [`NO_FEATURE`](super::NO_FEATURE) stands for observations
/// recorded without a feature.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FoiFilter {
    pub internal_ids: BTreeSet<i64>,
    /// Unique ids; `*` acts as a wildcard.
    pub unique_ids: BTreeSet<String>,
    pub parent: Option<Linked<FoiFilter>>,
    pub observations: Option<Box<ObsFilter>>,
    pub location: Option<SpatialFilter>,
    pub sampled_feature: Option<Box<FoiFilter>>,
    pub full_text: Option<FullTextFilter>,
    pub valid_time: Option<TemporalFilter>,
    pub limit: Option<u64>,
}

impl FoiFilter {
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

impl LinkedFilter for FoiFilter {
    /// Unique ids live in the feature table, so only internal ids count.
    fn flat_ids(&self) -> Option<FlatIds<'_>> {
        let only_ids = self.unique_ids.is_empty()
            && self.parent.is_none()
            && self.observations.is_none()
            && self.location.is_none()
            && self.sampled_feature.is_none()
            && self.full_text.is_none()
            && self.valid_time.is_none();
        only_ids.then_some(FlatIds {
            internal_ids: &self.internal_ids,
            unique_ids: &self.unique_ids,
        })
    }
}

impl FilterLimit for FoiFilter {
    fn limit(&self) -> Option<u64> {
        self.limit
    }
}
