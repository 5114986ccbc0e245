//! Spatial criteria over feature geometries.

use serde::{Deserialize, Serialize};

/// Default spatial reference (WGS 84).
pub const DEFAULT_SRID: i32 = 4326;

/// Spatial relation between the stored geometry and the filter geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpatialOp {
    #[default]
    Intersects,
    /// Stored geometry contains the filter geometry.
    Contains,
    /// Stored geometry lies within the filter geometry.
    Within,
}

/// A geometry given as WKT plus the relation to test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpatialFilter {
    pub wkt: String,
    #[serde(default = "default_srid")]
    pub srid: i32,
    #[serde(default)]
    pub op: SpatialOp,
}

fn default_srid() -> i32 {
    DEFAULT_SRID
}

impl SpatialFilter {
    pub fn intersects(wkt: &str) -> Self {
        Self {
            wkt: wkt.into(),
            srid: DEFAULT_SRID,
            op: SpatialOp::Intersects,
        }
    }

    pub fn within(wkt: &str) -> Self {
        Self {
            op: SpatialOp::Within,
            ..Self::intersects(wkt)
        }
    }

    pub fn with_srid(mut self, srid: i32) -> Self {
        self.srid = srid;
        self
    }
}
