//! Filter model.
//!
//! Immutable descriptions of which entities a query should return. A filter
//! may reference filters over other entity types ([`Linked`]), forming a
//! graph the compilers walk while building a single query.
//!
//! All filters deserialize from camelCase JSON:
//!
//! ```json
//! {
//!   "dataStream": { "ids": [7] },
//!   "resultTime": { "type": "latest" }
//! }
//! ```

mod command;
mod datastream;
mod feature;
mod obs;
mod spatial;
mod system;
mod temporal;

pub use command::{CommandFilter, CommandStreamFilter};
pub use datastream::DataStreamFilter;
pub use feature::FoiFilter;
pub use obs::{ObsFilter, ObsStatsFilter};
pub use spatial::{SpatialFilter, SpatialOp, DEFAULT_SRID};
pub use system::SystemFilter;
pub use temporal::{RangeOp, TemporalFilter};

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Feature id meaning "no feature of interest".
pub const NO_FEATURE: i64 = 0;

/// The entity types a query can be compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Observation,
    ObservationStatistics,
    DataStream,
    FeatureOfInterest,
    System,
    CommandStream,
    Command,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Observation => "obs",
            EntityKind::ObservationStatistics => "obs stats",
            EntityKind::DataStream => "datastream",
            EntityKind::FeatureOfInterest => "foi",
            EntityKind::System => "system",
            EntityKind::CommandStream => "command stream",
            EntityKind::Command => "command",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Reference from one filter to another entity type.
///
/// Either a plain set of internal ids, or a full nested filter over the
/// linked entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Linked<F> {
    Ids(BTreeSet<i64>),
    Filter(Box<F>),
}

impl<F> Linked<F> {
    pub fn ids(ids: impl IntoIterator<Item = i64>) -> Self {
        Linked::Ids(ids.into_iter().collect())
    }

    pub fn filter(filter: F) -> Self {
        Linked::Filter(Box::new(filter))
    }
}

/// Identifier-only view of a nested filter.
///
/// Returned by [`LinkedFilter::flat_ids`] when a nested filter carries nothing
/// beyond identifiers, so it can be answered from a foreign-key column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatIds<'f> {
    pub internal_ids: &'f BTreeSet<i64>,
    pub unique_ids: &'f BTreeSet<String>,
}

/// A filter that can appear at the far end of a [`Linked`] reference.
pub trait LinkedFilter {
    /// The identifiers, if the filter holds nothing else.
    fn flat_ids(&self) -> Option<FlatIds<'_>>;
}

/// Top-level row limit carried by a filter.
pub trait FilterLimit {
    fn limit(&self) -> Option<u64>;
}

/// Keyword search over descriptive text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FullTextFilter {
    pub keywords: Vec<String>,
}

impl FullTextFilter {
    pub fn new<S: Into<String>>(keywords: impl IntoIterator<Item = S>) -> Self {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}

pub(crate) static EMPTY_UIDS: BTreeSet<String> = BTreeSet::new();

/// A top-level filter together with the entity kind it selects.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityFilter {
    Observation(ObsFilter),
    ObservationStatistics(ObsStatsFilter),
    DataStream(DataStreamFilter),
    FeatureOfInterest(FoiFilter),
    System(SystemFilter),
    CommandStream(CommandStreamFilter),
    Command(CommandFilter),
}

impl EntityFilter {
    /// Parse a JSON filter document for `entity`.
    pub fn from_json(entity: EntityKind, json: &str) -> serde_json::Result<Self> {
        Ok(match entity {
            EntityKind::Observation => EntityFilter::Observation(serde_json::from_str(json)?),
            EntityKind::ObservationStatistics => {
                EntityFilter::ObservationStatistics(serde_json::from_str(json)?)
            }
            EntityKind::DataStream => EntityFilter::DataStream(serde_json::from_str(json)?),
            EntityKind::FeatureOfInterest => {
                EntityFilter::FeatureOfInterest(serde_json::from_str(json)?)
            }
            EntityKind::System => EntityFilter::System(serde_json::from_str(json)?),
            EntityKind::CommandStream => EntityFilter::CommandStream(serde_json::from_str(json)?),
            EntityKind::Command => EntityFilter::Command(serde_json::from_str(json)?),
        })
    }

    pub fn entity(&self) -> EntityKind {
        match self {
            EntityFilter::Observation(_) => EntityKind::Observation,
            EntityFilter::ObservationStatistics(_) => EntityKind::ObservationStatistics,
            EntityFilter::DataStream(_) => EntityKind::DataStream,
            EntityFilter::FeatureOfInterest(_) => EntityKind::FeatureOfInterest,
            EntityFilter::System(_) => EntityKind::System,
            EntityFilter::CommandStream(_) => EntityKind::CommandStream,
            EntityFilter::Command(_) => EntityKind::Command,
        }
    }
}
