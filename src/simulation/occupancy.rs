//! Per-turn occupancy view
//!
//! Rebuilt from scratch at the start of every turn and dropped at its end.
//! Origin and destination never count as occupied: any number of trains may
//! wait there.

use std::collections::HashSet;

use super::train::Train;
use super::types::{Segment, StationId};

#[derive(Debug, Clone)]
pub struct Occupancy {
    origin: StationId,
    destination: StationId,
    occupied: Vec<bool>,
    used_segments: HashSet<Segment>,
}

impl Occupancy {
    /// Builds the view for a new turn from the positions of unfinished trains
    pub fn build(
        station_count: usize,
        origin: StationId,
        destination: StationId,
        trains: &[Train],
    ) -> Self {
        let mut occupancy = Self {
            origin,
            destination,
            occupied: vec![false; station_count],
            used_segments: HashSet::new(),
        };
        for train in trains.iter().filter(|train| !train.is_finished()) {
            occupancy.claim(train.current());
        }
        occupancy
    }

    fn is_endpoint(&self, station: StationId) -> bool {
        station == self.origin || station == self.destination
    }

    fn claim(&mut self, station: StationId) {
        if self.is_endpoint(station) {
            return;
        }
        if let Some(slot) = self.occupied.get_mut(station.0) {
            *slot = true;
        }
    }

    fn release(&mut self, station: StationId) {
        if let Some(slot) = self.occupied.get_mut(station.0) {
            *slot = false;
        }
    }

    pub fn station_free(&self, station: StationId) -> bool {
        !self.occupied.get(station.0).copied().unwrap_or(false)
    }

    /// A segment is used once any train crossed it this turn, in either direction
    pub fn segment_free(&self, from: StationId, to: StationId) -> bool {
        !self.used_segments.contains(&Segment::new(from, to))
    }

    /// Whether a train standing on `from` may enter `to` right now
    pub fn hop_free(&self, from: StationId, to: StationId) -> bool {
        self.station_free(to) && self.segment_free(from, to)
    }

    /// Records a committed move from `from` to `to`
    pub fn commit(&mut self, from: StationId, to: StationId) {
        self.release(from);
        self.claim(to);
        self.used_segments.insert(Segment::new(from, to));
    }

    pub fn occupied_stations(&self) -> impl Iterator<Item = StationId> + '_ {
        self.occupied
            .iter()
            .enumerate()
            .filter(|(_, occupied)| **occupied)
            .map(|(index, _)| StationId(index))
    }

    pub fn used_segment_count(&self) -> usize {
        self.used_segments.len()
    }
}
