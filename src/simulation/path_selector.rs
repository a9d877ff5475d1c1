//! Next-hop selection for a single train
//!
//! The selector is a pure function of the network, the current occupancy and
//! the train's own state. It proposes a full route whose first hop is the
//! move the train would like to make this turn:
//!
//! 1. enumerate candidate routes to the destination (see [`path_search`]),
//! 2. keep the largest family of routes that share no interior station (the
//!    comparison gets its own allowance of the configured work budget),
//!    preferring the family with the smallest total length,
//! 3. take the shortest route in that family whose first hop is free,
//! 4. failing that, propose the shortest blocked route if the detour
//!    heuristic accepts it, or give up for this turn.
//!
//! [`path_search`]: super::path_search

use log::{debug, trace};
use std::collections::HashSet;

use super::config::{SearchStrategy, SimConfig};
use super::network::RailNetwork;
use super::occupancy::Occupancy;
use super::path_search::{enumerate_all_paths, k_shortest_paths, SearchBudgetExceeded};
use super::train::Train;
use super::types::StationId;

/// What the selector proposes for one train this turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Shortest route in the best combination whose first hop is free
    Shortest(Vec<StationId>),
    /// Blocked route accepted by the detour threshold
    Alternative(Vec<StationId>),
    /// Nothing worth proposing
    NoMove,
}

impl Selection {
    pub fn path(&self) -> Option<&[StationId]> {
        match self {
            Selection::Shortest(path) | Selection::Alternative(path) => Some(path),
            Selection::NoMove => None,
        }
    }

    /// The station the train proposes to enter this turn
    pub fn next_hop(&self) -> Option<StationId> {
        self.path().and_then(|path| path.get(1).copied())
    }
}

/// Outcome of classifying the first hops of a route family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadRanking<'p> {
    /// Shortest route whose first hop is free
    pub shortest: Option<&'p [StationId]>,
    /// Shortest route whose first hop is blocked, or the runner-up free
    /// route when nothing is blocked
    pub alternative: Option<&'p [StationId]>,
    /// Length of the shortest route regardless of availability
    pub shortest_len: usize,
}

fn interior(path: &[StationId]) -> &[StationId] {
    if path.len() <= 2 {
        &[]
    } else {
        &path[1..path.len() - 1]
    }
}

/// Two routes are compatible when they share no interior station
pub fn interior_disjoint(a: &[StationId], b: &[StationId]) -> bool {
    let inner = interior(a);
    interior(b).iter().all(|station| !inner.contains(station))
}

/// Indices of the best combination of mutually compatible routes.
///
/// Each route seeds a family that greedily absorbs every other compatible
/// route in enumeration order. The largest family wins; ties go to the
/// smaller total length, then to the earlier seed.
///
/// Every interior station inspected costs one unit of `budget`, so a
/// route count that is cheap to enumerate cannot stall the comparison.
pub fn best_combination(
    paths: &[Vec<StationId>],
    budget: usize,
) -> Result<Vec<usize>, SearchBudgetExceeded> {
    let mut best: Vec<usize> = Vec::new();
    let mut best_total = usize::MAX;
    let mut spent = 0usize;

    for seed in 0..paths.len() {
        let mut members = vec![seed];
        let mut claimed: HashSet<StationId> = interior(&paths[seed]).iter().copied().collect();

        for (index, path) in paths.iter().enumerate() {
            if index == seed {
                continue;
            }
            let inner = interior(path);
            spent = spent.saturating_add(inner.len().max(1));
            if spent > budget {
                return Err(SearchBudgetExceeded { budget });
            }
            if inner.iter().any(|station| claimed.contains(station)) {
                continue;
            }
            claimed.extend(inner.iter().copied());
            members.push(index);
        }

        let total: usize = members.iter().map(|&index| paths[index].len()).sum();
        if members.len() > best.len() || (members.len() == best.len() && total < best_total) {
            best = members;
            best_total = total;
        }
    }

    Ok(best)
}

/// Splits a route family by whether each route's first hop is free
pub fn rank_heads<'p>(family: &[&'p [StationId]], occupancy: &Occupancy) -> HeadRanking<'p> {
    let free: Vec<bool> = family
        .iter()
        .map(|path| path.len() > 1 && occupancy.hop_free(path[0], path[1]))
        .collect();

    let shortest_where = |want_free: bool, skip: Option<usize>| {
        family
            .iter()
            .enumerate()
            .filter(|(index, path)| {
                path.len() > 1 && free[*index] == want_free && Some(*index) != skip
            })
            .min_by_key(|(_, path)| path.len())
            .map(|(index, _)| index)
    };

    let shortest = shortest_where(true, None);
    let alternative = shortest_where(false, None).or_else(|| shortest_where(true, shortest));

    HeadRanking {
        shortest: shortest.map(|index| family[index]),
        alternative: alternative.map(|index| family[index]),
        shortest_len: family.iter().map(|path| path.len()).min().unwrap_or(0),
    }
}

/// Whether a train may commit to a longer route instead of waiting.
///
/// `position` is the train's one-based place in the turn order. The longer
/// route is accepted while it is no longer than the trains still queued
/// behind this one plus the nominal shortest length. This is a heuristic,
/// not an optimality bound.
pub fn detour_acceptable(
    train_count: usize,
    position: usize,
    shortest_len: usize,
    alternative_len: usize,
) -> bool {
    train_count.saturating_sub(position) + shortest_len >= alternative_len
}

/// Path selector configured with a search strategy and history policy
#[derive(Debug, Clone, Copy)]
pub struct PathSelector {
    config: SimConfig,
}

impl PathSelector {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> SimConfig {
        self.config
    }

    /// Candidate routes for `train`, before combination pruning
    pub fn candidates(
        &self,
        network: &RailNetwork,
        train: &Train,
        destination: StationId,
    ) -> Result<Vec<Vec<StationId>>, SearchBudgetExceeded> {
        let use_history = self.config.use_history;
        let excluded = |station: StationId| use_history && train.has_visited(station);

        match self.config.search {
            SearchStrategy::Exhaustive { budget } => {
                enumerate_all_paths(network, train.current(), destination, excluded, budget)
            }
            SearchStrategy::KShortest { k } => Ok(k_shortest_paths(
                network,
                train.current(),
                destination,
                excluded,
                k,
            )),
        }
    }

    /// Proposes a route for `train` given the occupancy of the current turn
    pub fn select(
        &self,
        network: &RailNetwork,
        train: &Train,
        destination: StationId,
        occupancy: &Occupancy,
        train_count: usize,
    ) -> Result<Selection, SearchBudgetExceeded> {
        if train.current() == destination {
            return Ok(Selection::NoMove);
        }

        let paths = self.candidates(network, train, destination)?;
        if paths.is_empty() {
            debug!("{}: no route to {}", train.name, network.name(destination));
            return Ok(Selection::NoMove);
        }

        let budget = match self.config.search {
            SearchStrategy::Exhaustive { budget } => budget,
            // at most k routes, so the comparison is already bounded
            SearchStrategy::KShortest { .. } => usize::MAX,
        };
        let family: Vec<&[StationId]> = best_combination(&paths, budget)?
            .into_iter()
            .map(|index| paths[index].as_slice())
            .collect();
        trace!(
            "{}: best combination holds {} of {} routes",
            train.name,
            family.len(),
            paths.len()
        );

        let ranking = rank_heads(&family, occupancy);
        let position = train.id.0 + 1;

        let selection = match (ranking.shortest, ranking.alternative) {
            (Some(path), _) => Selection::Shortest(path.to_vec()),
            (None, Some(path))
                if detour_acceptable(train_count, position, ranking.shortest_len, path.len()) =>
            {
                Selection::Alternative(path.to_vec())
            }
            _ => Selection::NoMove,
        };

        debug!(
            "{}: {}",
            train.name,
            match &selection {
                Selection::Shortest(path) => format!("shortest {}", describe(network, path)),
                Selection::Alternative(path) => format!("alternative {}", describe(network, path)),
                Selection::NoMove => "waits".to_string(),
            }
        );
        Ok(selection)
    }
}

fn describe(network: &RailNetwork, path: &[StationId]) -> String {
    path.iter()
        .map(|&station| network.name(station))
        .collect::<Vec<_>>()
        .join("->")
}
