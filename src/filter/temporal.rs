//! Temporal criteria.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a stored validity period must relate to the filter interval.
///
/// Instant columns (phenomenon time, result time) always use containment of
/// the instant in the interval and ignore this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeOp {
    /// Stored period contains the filter interval.
    Contains,
    /// Stored period overlaps the filter interval.
    #[default]
    Intersects,
    /// Stored period equals the filter interval.
    Equals,
}

/// A criterion over a time column: a closed interval, or "latest value only".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TemporalFilter {
    /// Closed interval `[min, max]`, both ends inclusive.
    Range {
        min: DateTime<Utc>,
        max: DateTime<Utc>,
        #[serde(default)]
        op: RangeOp,
    },
    /// Only the most recent value of each logical group.
    Latest,
}

impl TemporalFilter {
    pub fn range(min: DateTime<Utc>, max: DateTime<Utc>) -> Self {
        TemporalFilter::Range {
            min,
            max,
            op: RangeOp::default(),
        }
    }

    /// Single instant, as the degenerate interval `[t, t]`.
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self::range(instant, instant)
    }

    pub fn latest() -> Self {
        TemporalFilter::Latest
    }

    /// Change the range operator. No effect on `Latest`.
    pub fn with_op(self, new_op: RangeOp) -> Self {
        match self {
            TemporalFilter::Range { min, max, .. } => TemporalFilter::Range {
                min,
                max,
                op: new_op,
            },
            latest => latest,
        }
    }

    pub fn is_latest(&self) -> bool {
        matches!(self, TemporalFilter::Latest)
    }
}
