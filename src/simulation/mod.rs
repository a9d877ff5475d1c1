//! Railway simulation core
//!
//! Network model, per-turn occupancy, path selection and the turn scheduler.
//! Nothing in here performs I/O; the map file reader and the command line
//! live outside this module.

mod config;
mod network;
mod occupancy;
mod path_search;
mod path_selector;
mod scheduler;
pub mod trace;
mod train;
mod types;

pub use config::{SearchStrategy, SimConfig};
pub use network::{is_valid_station_name, RailNetwork};
pub use occupancy::Occupancy;
pub use path_search::{enumerate_all_paths, k_shortest_paths, SearchBudgetExceeded};
pub use path_selector::{
    best_combination, detour_acceptable, interior_disjoint, rank_heads, HeadRanking, PathSelector,
    Selection,
};
pub use scheduler::{Move, Outcome, Simulation, SimulationReport, TurnRecord};
pub use train::{Train, TrainState};
pub use types::{
    Segment, Station, StationId, TrainId, DEFAULT_SEARCH_BUDGET, MAX_STATIONS, STUCK_TURN_LIMIT,
};
