//! Candidate route enumeration
//!
//! Both enumerators walk neighbors in declaration order and skip every
//! station for which `excluded` returns true (the train's history, when the
//! history filter is on). The starting station itself is never tested.

use log::trace;
use petgraph::algo::dijkstra;
use petgraph::graph::{EdgeReference, NodeIndex};
use petgraph::visit::{EdgeFiltered, EdgeRef};
use sorted_vec::SortedVec;
use std::collections::HashSet;
use std::error::Error;
use std::fmt;

use super::network::RailNetwork;
use super::types::{Segment, StationId};

/// The exhaustive search ran past its work budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBudgetExceeded {
    pub budget: usize,
}

impl fmt::Display for SearchBudgetExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "path search exceeded its budget of {} steps",
            self.budget
        )
    }
}

impl Error for SearchBudgetExceeded {}

/// Every simple path from `from` to `to`, in depth-first discovery order.
///
/// Each path extension costs one unit of `budget`.
pub fn enumerate_all_paths<F>(
    network: &RailNetwork,
    from: StationId,
    to: StationId,
    excluded: F,
    budget: usize,
) -> Result<Vec<Vec<StationId>>, SearchBudgetExceeded>
where
    F: Fn(StationId) -> bool,
{
    let mut paths = Vec::new();
    if from.0 >= network.station_count() {
        return Ok(paths);
    }
    if from == to {
        paths.push(vec![from]);
        return Ok(paths);
    }

    let mut on_path = vec![false; network.station_count()];
    let mut path = vec![from];
    // Index of the next neighbor to try at each depth
    let mut cursor = vec![0usize];
    let mut steps = 0usize;
    if let Some(slot) = on_path.get_mut(from.0) {
        *slot = true;
    }

    while let Some(&tip) = path.last() {
        let depth = path.len() - 1;
        let neighbors = network.neighbors(tip);
        let index = cursor[depth];

        if index >= neighbors.len() {
            on_path[tip.0] = false;
            path.pop();
            cursor.pop();
            continue;
        }
        cursor[depth] += 1;

        let next = neighbors[index];
        if on_path[next.0] || excluded(next) {
            continue;
        }

        steps += 1;
        if steps > budget {
            return Err(SearchBudgetExceeded { budget });
        }

        if next == to {
            let mut found = path.clone();
            found.push(next);
            paths.push(found);
            continue;
        }

        on_path[next.0] = true;
        path.push(next);
        cursor.push(0);
    }

    trace!(
        "enumerated {} paths from {} to {} in {} steps",
        paths.len(),
        network.name(from),
        network.name(to),
        steps
    );
    Ok(paths)
}

/// Shortest path by hop count avoiding the given stations and segments.
///
/// Distances to `to` come from petgraph's Dijkstra over a filtered view of
/// the graph; the path is then walked from `from`, taking the first
/// declared neighbor that gets one hop closer, so ties resolve the same way
/// on every run.
fn shortest_path<F>(
    network: &RailNetwork,
    from: StationId,
    to: StationId,
    excluded: &F,
    removed_stations: &HashSet<StationId>,
    removed_segments: &HashSet<Segment>,
) -> Option<Vec<StationId>>
where
    F: Fn(StationId) -> bool,
{
    if from.0 >= network.station_count() || to.0 >= network.station_count() {
        return None;
    }

    // The search start is the only station exempt from the filters
    let usable = |station: StationId| {
        station == from || !(removed_stations.contains(&station) || excluded(station))
    };
    let passable = |a: StationId, b: StationId| {
        usable(a) && usable(b) && !removed_segments.contains(&Segment::new(a, b))
    };

    let view = EdgeFiltered::from_fn(network.graph(), |edge: EdgeReference<'_, ()>| {
        passable(
            StationId(edge.source().index()),
            StationId(edge.target().index()),
        )
    });
    let distance = dijkstra(&view, NodeIndex::new(to.0), None, |_| 1usize);
    let hops_from = |station: StationId| {
        let node: NodeIndex = NodeIndex::new(station.0);
        distance.get(&node).copied()
    };

    let mut remaining = hops_from(from)?;
    let mut path = vec![from];
    let mut at = from;
    while remaining > 0 {
        let next = network
            .neighbors(at)
            .iter()
            .copied()
            .find(|&next| passable(at, next) && hops_from(next) == Some(remaining - 1))?;
        path.push(next);
        at = next;
        remaining -= 1;
    }
    Some(path)
}

/// Up to `k` loopless paths from `from` to `to`, shortest first (Yen's algorithm)
pub fn k_shortest_paths<F>(
    network: &RailNetwork,
    from: StationId,
    to: StationId,
    excluded: F,
    k: usize,
) -> Vec<Vec<StationId>>
where
    F: Fn(StationId) -> bool,
{
    let mut accepted: Vec<Vec<StationId>> = Vec::new();
    if k == 0 {
        return accepted;
    }
    let Some(first) = shortest_path(
        network,
        from,
        to,
        &excluded,
        &HashSet::new(),
        &HashSet::new(),
    ) else {
        return accepted;
    };
    accepted.push(first);

    // Candidates ordered by hop count, then by station ids
    let mut candidates: SortedVec<(usize, Vec<StationId>)> = SortedVec::new();

    while accepted.len() < k {
        let previous = accepted[accepted.len() - 1].clone();

        for spur_index in 0..previous.len().saturating_sub(1) {
            let spur = previous[spur_index];
            let root = &previous[..=spur_index];

            let removed_segments: HashSet<Segment> = accepted
                .iter()
                .filter(|path| path.len() > spur_index + 1 && path[..=spur_index] == *root)
                .map(|path| Segment::new(path[spur_index], path[spur_index + 1]))
                .collect();
            let removed_stations: HashSet<StationId> =
                root[..spur_index].iter().copied().collect();

            let Some(spur_path) = shortest_path(
                network,
                spur,
                to,
                &excluded,
                &removed_stations,
                &removed_segments,
            ) else {
                continue;
            };

            let mut candidate = root[..spur_index].to_vec();
            candidate.extend(spur_path);
            if accepted.contains(&candidate) {
                continue;
            }
            let entry = (candidate.len(), candidate);
            if candidates.binary_search(&entry).is_err() {
                candidates.insert(entry);
            }
        }

        if candidates.is_empty() {
            break;
        }
        let (_, next) = candidates.remove_index(0);
        accepted.push(next);
    }

    trace!(
        "found {} of {} requested shortest paths from {} to {}",
        accepted.len(),
        k,
        network.name(from),
        network.name(to)
    );
    accepted
}
