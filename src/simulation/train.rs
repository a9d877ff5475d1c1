//! Train state for the railway simulation

use std::collections::HashSet;

use super::types::{StationId, TrainId};

/// Where a train is in its journey
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainState {
    AtOrigin,
    InTransit,
    AtDestination,
}

/// A train travelling from the origin to the destination
#[derive(Debug, Clone)]
pub struct Train {
    pub id: TrainId,
    pub name: String,
    current: StationId,
    state: TrainState,
    /// Stations this train has stood on at the end of a turn, origin included
    history: HashSet<StationId>,
}

impl Train {
    /// A train waiting at the origin
    pub fn new(id: TrainId, origin: StationId) -> Self {
        Self {
            id,
            name: id.display_name(),
            current: origin,
            state: TrainState::AtOrigin,
            history: HashSet::from([origin]),
        }
    }

    /// A train placed at an arbitrary station with a known history.
    ///
    /// The current station is always part of the history.
    pub fn at(
        id: TrainId,
        current: StationId,
        state: TrainState,
        visited: impl IntoIterator<Item = StationId>,
    ) -> Self {
        let mut history: HashSet<StationId> = visited.into_iter().collect();
        history.insert(current);
        Self {
            id,
            name: id.display_name(),
            current,
            state,
            history,
        }
    }

    pub fn current(&self) -> StationId {
        self.current
    }

    pub fn state(&self) -> TrainState {
        self.state
    }

    pub fn history(&self) -> &HashSet<StationId> {
        &self.history
    }

    pub fn has_visited(&self, station: StationId) -> bool {
        self.history.contains(&station)
    }

    pub fn is_finished(&self) -> bool {
        self.state == TrainState::AtDestination
    }

    /// Moves the train one hop. Only the scheduler calls this.
    pub(crate) fn commit(&mut self, next: StationId, destination: StationId) {
        self.current = next;
        self.history.insert(next);
        self.state = if next == destination {
            TrainState::AtDestination
        } else {
            TrainState::InTransit
        };
    }
}
