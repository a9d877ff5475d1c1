//! Core types for the railway simulation
//!
//! Plain data shared by the network, the trains and the scheduler.

/// Dense identifier of a station inside a [`RailNetwork`](super::RailNetwork).
/// Ids are assigned in insertion order starting from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StationId(pub usize);

/// A wrapper type for train indices (`TrainId(0)` is displayed as `T1`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrainId(pub usize);

impl TrainId {
    /// Display name used in traces, one-based
    pub fn display_name(self) -> String {
        format!("T{}", self.0 + 1)
    }
}

/// A station of the network map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Station {
    pub name: String,
    pub x: u64,
    pub y: u64,
}

impl Station {
    pub fn new(name: impl Into<String>, x: u64, y: u64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
        }
    }
}

/// An undirected track segment between two adjacent stations.
///
/// Stored with the smaller id first so both travel directions map to the
/// same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment {
    low: StationId,
    high: StationId,
}

impl Segment {
    pub fn new(a: StationId, b: StationId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn endpoints(&self) -> (StationId, StationId) {
        (self.low, self.high)
    }
}

/// Maximum number of stations a network may hold
pub const MAX_STATIONS: usize = 10_000;

/// Consecutive turns without any move after which the run is declared faulty
pub const STUCK_TURN_LIMIT: u32 = 2;

/// Default number of path extensions the exhaustive search may perform per call
pub const DEFAULT_SEARCH_BUDGET: usize = 1_000_000;
