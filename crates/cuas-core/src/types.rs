//! Identifiers and plain data types shared across the workspace.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Milliseconds since an arbitrary epoch, as supplied by the embedder's clock.
pub type TimestampMs = u64;

/// Monotonically issued track identifier. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TrackId(pub u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TRK-{:06}", self.0)
    }
}

/// Monotonically issued alert identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AlertId(pub u64);

/// Stable identifier assigned to a registered effector by its driver.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EffectorId(pub String);

impl fmt::Display for EffectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Engagement record identifier, rendered as `ENG-XXXXXX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EngagementId(pub u32);

impl fmt::Display for EngagementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ENG-{:06}", self.0)
    }
}

impl Serialize for EngagementId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EngagementId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let digits = raw.strip_prefix("ENG-").ok_or_else(|| {
            serde::de::Error::custom(format!("not an engagement id: {raw}"))
        })?;
        let n: u32 = digits
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("not an engagement id: {raw}")))?;
        Ok(EngagementId(n))
    }
}

/// Geodetic position: latitude/longitude in degrees, altitude in meters AGL.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub alt_m: f64,
}

impl GeoPosition {
    pub fn new(lat_deg: f64, lon_deg: f64, alt_m: f64) -> Self {
        Self { lat_deg, lon_deg, alt_m }
    }
}

/// Velocity in north/east/down meters-per-second components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NedVelocity {
    pub north_mps: f64,
    pub east_mps: f64,
    pub down_mps: f64,
}

impl NedVelocity {
    pub const ZERO: Self = Self { north_mps: 0.0, east_mps: 0.0, down_mps: 0.0 };

    pub fn new(north_mps: f64, east_mps: f64, down_mps: f64) -> Self {
        Self { north_mps, east_mps, down_mps }
    }

    pub fn speed(&self) -> f64 {
        (self.north_mps.powi(2) + self.east_mps.powi(2) + self.down_mps.powi(2)).sqrt()
    }

    pub fn horizontal_speed(&self) -> f64 {
        (self.north_mps.powi(2) + self.east_mps.powi(2)).sqrt()
    }

    /// Heading in degrees, [0, 360), clockwise from true north.
    pub fn heading_deg(&self) -> f64 {
        let h = self.east_mps.atan2(self.north_mps).to_degrees();
        (h + 360.0) % 360.0
    }

    pub fn climb_rate_mps(&self) -> f64 {
        -self.down_mps
    }

    pub fn delta(&self, other: &NedVelocity) -> f64 {
        ((self.north_mps - other.north_mps).powi(2)
            + (self.east_mps - other.east_mps).powi(2)
            + (self.down_mps - other.down_mps).powi(2))
        .sqrt()
    }
}

/// Normalized image-space bounding box plus the camera it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub camera_id: String,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub observed_at_ms: TimestampMs,
}
