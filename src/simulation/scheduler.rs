//! Turn scheduler that drives the simulation
//!
//! Every turn rebuilds the occupancy view, then walks the unfinished trains in
//! index order. Each train asks the selector for a route; the scheduler
//! re-checks the proposed first hop against the occupancy (which already
//! reflects the moves of lower-index trains this turn) and commits it or
//! skips the train. Nothing is retried within a turn.

use anyhow::{bail, Result};
use log::{debug, info, warn};

use super::config::{SearchStrategy, SimConfig};
use super::network::RailNetwork;
use super::occupancy::Occupancy;
use super::path_search::SearchBudgetExceeded;
use super::path_selector::PathSelector;
use super::train::{Train, TrainState};
use super::types::{StationId, TrainId, STUCK_TURN_LIMIT};

/// A single committed hop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub train: TrainId,
    pub from: StationId,
    pub to: StationId,
}

/// Moves committed during one turn, in commit order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRecord {
    /// One-based turn number
    pub turn: u32,
    pub moves: Vec<Move>,
}

/// How a simulation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every train reached the destination
    Completed { turns: u32 },
    /// No train moved for [`STUCK_TURN_LIMIT`] consecutive turns
    Livelock { turns: u32 },
    /// A path search ran out of budget during the given turn
    SearchBudgetExceeded { turns: u32, budget: usize },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Completed { .. })
    }
}

/// Full result of a simulation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    pub turns: Vec<TurnRecord>,
    pub outcome: Outcome,
}

/// A running simulation over a borrowed network
pub struct Simulation<'n> {
    network: &'n RailNetwork,
    origin: StationId,
    destination: StationId,
    trains: Vec<Train>,
    selector: PathSelector,
    /// Number of turns played so far
    turn: u32,
    /// Consecutive turns without a single move
    stuck_turns: u32,
    /// Set once a path search gives up; ends the run
    search_failure: Option<SearchBudgetExceeded>,
}

/// Resolves and checks the endpoints of a run
fn resolve_endpoints(
    network: &RailNetwork,
    start: &str,
    end: &str,
) -> Result<(StationId, StationId)> {
    let Some(origin) = network.station_id(start) else {
        bail!("Start station does not exist: {start}");
    };
    let Some(destination) = network.station_id(end) else {
        bail!("End station does not exist: {end}");
    };
    if origin == destination {
        bail!("Start and end station are the same");
    }
    if !network.has_path(origin, destination) {
        bail!("No path exists between {start} and {end}");
    }
    Ok((origin, destination))
}

fn check_config(config: &SimConfig) -> Result<()> {
    if let SearchStrategy::KShortest { k: 0 } = config.search {
        bail!("K-shortest search needs k of at least 1");
    }
    Ok(())
}

impl<'n> Simulation<'n> {
    /// Places `train_count` trains at `start`, bound for `end`
    pub fn new(
        network: &'n RailNetwork,
        start: &str,
        end: &str,
        train_count: usize,
        config: SimConfig,
    ) -> Result<Self> {
        if train_count == 0 {
            bail!("Number of trains is not a valid positive integer");
        }
        check_config(&config)?;
        let (origin, destination) = resolve_endpoints(network, start, end)?;
        let trains = (0..train_count)
            .map(|index| Train::new(TrainId(index), origin))
            .collect();

        info!(
            "Simulating {} trains from {} to {} over {} stations ({})",
            train_count,
            start,
            end,
            network.station_count(),
            config.search
        );
        Ok(Self::assemble(network, origin, destination, trains, config))
    }

    /// Resumes from explicit train states.
    ///
    /// Trains must be indexed `0..n` in order and stand on stations of
    /// `network`; no two of them may share a station other than the endpoints.
    /// A train's state has to agree with where it stands: `AtDestination`
    /// exactly on `end`, `AtOrigin` only on `start`.
    pub fn from_trains(
        network: &'n RailNetwork,
        start: &str,
        end: &str,
        trains: Vec<Train>,
        config: SimConfig,
    ) -> Result<Self> {
        if trains.is_empty() {
            bail!("Number of trains is not a valid positive integer");
        }
        check_config(&config)?;
        let (origin, destination) = resolve_endpoints(network, start, end)?;

        let mut seen = vec![false; network.station_count()];
        for (index, train) in trains.iter().enumerate() {
            if train.id != TrainId(index) {
                bail!("Train {} is out of order at position {}", train.name, index);
            }
            let current = train.current();
            let Some(slot) = seen.get_mut(current.0) else {
                bail!("Train {} stands on an unknown station", train.name);
            };
            let consistent = match train.state() {
                TrainState::AtOrigin => current == origin,
                TrainState::InTransit => current != destination,
                TrainState::AtDestination => current == destination,
            };
            if !consistent {
                bail!(
                    "Train {} is {:?} but stands on {}",
                    train.name,
                    train.state(),
                    network.name(current)
                );
            }
            if current == origin || current == destination {
                continue;
            }
            if *slot {
                bail!(
                    "Train {} shares station {} with another train",
                    train.name,
                    network.name(current)
                );
            }
            *slot = true;
        }

        Ok(Self::assemble(network, origin, destination, trains, config))
    }

    fn assemble(
        network: &'n RailNetwork,
        origin: StationId,
        destination: StationId,
        trains: Vec<Train>,
        config: SimConfig,
    ) -> Self {
        Self {
            network,
            origin,
            destination,
            trains,
            selector: PathSelector::new(config),
            turn: 0,
            stuck_turns: 0,
            search_failure: None,
        }
    }

    pub fn network(&self) -> &RailNetwork {
        self.network
    }

    pub fn origin(&self) -> StationId {
        self.origin
    }

    pub fn destination(&self) -> StationId {
        self.destination
    }

    pub fn trains(&self) -> &[Train] {
        &self.trains
    }

    /// Number of turns played so far
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn all_arrived(&self) -> bool {
        self.trains.iter().all(Train::is_finished)
    }

    /// Plays one turn and returns the moves committed during it.
    ///
    /// A path search running out of budget ends the turn early; moves
    /// committed before that still count.
    pub fn step(&mut self) -> TurnRecord {
        let turn = self.turn + 1;
        let train_count = self.trains.len();
        let mut occupancy = Occupancy::build(
            self.network.station_count(),
            self.origin,
            self.destination,
            &self.trains,
        );
        let mut moves = Vec::new();

        for index in 0..train_count {
            let train = &self.trains[index];
            if train.is_finished() {
                continue;
            }

            let selection = match self.selector.select(
                self.network,
                train,
                self.destination,
                &occupancy,
                train_count,
            ) {
                Ok(selection) => selection,
                Err(exceeded) => {
                    warn!("{}: {}", train.name, exceeded);
                    self.search_failure = Some(exceeded);
                    break;
                }
            };

            let Some(next) = selection.next_hop() else {
                continue;
            };
            let from = train.current();
            if !occupancy.hop_free(from, next) {
                debug!(
                    "{}: {} -> {} blocked, waiting",
                    train.name,
                    self.network.name(from),
                    self.network.name(next)
                );
                continue;
            }

            occupancy.commit(from, next);
            self.trains[index].commit(next, self.destination);
            moves.push(Move {
                train: TrainId(index),
                from,
                to: next,
            });
        }

        self.turn = turn;
        if moves.is_empty() {
            self.stuck_turns += 1;
        } else {
            self.stuck_turns = 0;
        }

        debug!("Turn {}: {} moves", turn, moves.len());
        TurnRecord { turn, moves }
    }

    /// Whether the run is over, and how
    pub fn outcome(&self) -> Option<Outcome> {
        if let Some(exceeded) = self.search_failure {
            Some(Outcome::SearchBudgetExceeded {
                turns: self.turn,
                budget: exceeded.budget,
            })
        } else if self.all_arrived() {
            Some(Outcome::Completed { turns: self.turn })
        } else if self.stuck_turns >= STUCK_TURN_LIMIT {
            Some(Outcome::Livelock { turns: self.turn })
        } else {
            None
        }
    }

    /// Plays turns until every train arrives or the run is declared faulty
    pub fn run(&mut self) -> SimulationReport {
        let mut turns = Vec::new();

        let outcome = loop {
            if let Some(outcome) = self.outcome() {
                break outcome;
            }
            turns.push(self.step());
        };

        info!("Simulation finished after {} turns: {:?}", turns.len(), outcome);
        SimulationReport { turns, outcome }
    }
}
