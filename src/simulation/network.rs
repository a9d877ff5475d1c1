//! Railway network graph
//!
//! Stations are interned to dense [`StationId`]s when they are added. The
//! graph itself lives in a petgraph `UnGraph`; the ordered adjacency is kept
//! alongside because path enumeration depends on the order in which
//! connections were declared, and petgraph hands edges back newest first.

use anyhow::{bail, Result};
use petgraph::algo::has_path_connecting;
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::HashMap;

use super::types::{Station, StationId, MAX_STATIONS};

/// Immutable-once-built undirected network of stations
#[derive(Debug, Default, Clone)]
pub struct RailNetwork {
    /// Underlying undirected graph, node index == station id
    graph: UnGraph<Station, ()>,

    /// Maps station names to their ids
    name_to_id: HashMap<String, StationId>,

    /// Maps coordinates to the station placed there
    coordinates: HashMap<(u64, u64), StationId>,

    /// Neighbors of every station in declaration order
    adjacency: Vec<Vec<StationId>>,
}

/// Whether `name` is a legal station name (`[A-Za-z0-9_]+`)
pub fn is_valid_station_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl RailNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a station and returns its id
    pub fn add_station(&mut self, name: &str, x: u64, y: u64) -> Result<StationId> {
        if !is_valid_station_name(name) {
            bail!("Invalid station name: {name:?}");
        }
        if self.name_to_id.contains_key(name) {
            bail!("Duplicate station name: {name}");
        }
        if let Some(other) = self.coordinates.get(&(x, y)) {
            bail!(
                "Stations {} and {name} have the same coordinates ({x}, {y})",
                self.name(*other)
            );
        }
        if self.station_count() >= MAX_STATIONS {
            bail!("Map contains more than 10,000 stations");
        }

        let node = self.graph.add_node(Station::new(name, x, y));
        let id = StationId(node.index());
        self.name_to_id.insert(name.to_string(), id);
        self.coordinates.insert((x, y), id);
        self.adjacency.push(Vec::new());
        Ok(id)
    }

    /// Adds a bidirectional connection between two existing stations
    pub fn add_connection(&mut self, from: &str, to: &str) -> Result<()> {
        if from == to {
            bail!("Connection between the same station: {from}");
        }
        let Some(a) = self.station_id(from) else {
            bail!("Connection with non-existing station: {from}");
        };
        let Some(b) = self.station_id(to) else {
            bail!("Connection with non-existing station: {to}");
        };
        if self.are_adjacent(a, b) {
            bail!("Duplicate connection between {from} and {to}");
        }

        self.graph.add_edge(NodeIndex::new(a.0), NodeIndex::new(b.0), ());
        self.adjacency[a.0].push(b);
        self.adjacency[b.0].push(a);
        Ok(())
    }

    /// The underlying graph; node index == station id
    pub(crate) fn graph(&self) -> &UnGraph<Station, ()> {
        &self.graph
    }

    /// Neighbors of a station, in the order the connections were declared
    pub fn neighbors(&self, id: StationId) -> &[StationId] {
        self.adjacency.get(id.0).map_or(&[], Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name_to_id.contains_key(name)
    }

    pub fn station_id(&self, name: &str) -> Option<StationId> {
        self.name_to_id.get(name).copied()
    }

    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.graph.node_weight(NodeIndex::new(id.0))
    }

    /// Name of a station; empty for ids that do not belong to this network
    pub fn name(&self, id: StationId) -> &str {
        self.station(id).map_or("", |station| station.name.as_str())
    }

    pub fn are_adjacent(&self, a: StationId, b: StationId) -> bool {
        self.neighbors(a).contains(&b)
    }

    /// Whether any route links the two stations
    pub fn has_path(&self, from: StationId, to: StationId) -> bool {
        if from.0 >= self.station_count() || to.0 >= self.station_count() {
            return false;
        }
        has_path_connecting(
            &self.graph,
            NodeIndex::new(from.0),
            NodeIndex::new(to.0),
            None,
        )
    }

    /// All stations in insertion order
    pub fn stations(&self) -> impl Iterator<Item = (StationId, &Station)> {
        self.graph
            .node_indices()
            .map(|node| (StationId(node.index()), &self.graph[node]))
    }

    /// All connections in declaration order, endpoints as declared
    pub fn connections(&self) -> impl Iterator<Item = (StationId, StationId)> + '_ {
        self.graph.edge_indices().filter_map(|edge| {
            self.graph
                .edge_endpoints(edge)
                .map(|(a, b)| (StationId(a.index()), StationId(b.index())))
        })
    }

    pub fn station_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn connection_count(&self) -> usize {
        self.graph.edge_count()
    }
}
