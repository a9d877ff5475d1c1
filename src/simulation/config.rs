//! Tuning knobs for the path selector

use std::fmt;

use super::types::DEFAULT_SEARCH_BUDGET;

/// How candidate routes are enumerated before the best combination is picked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    /// Every simple route, depth first in connection order. Enumeration
    /// gives up after `budget` path extensions, and the best-combination
    /// comparison after inspecting `budget` interior stations.
    Exhaustive { budget: usize },
    /// The `k` shortest simple routes (Yen), for maps too large to enumerate
    KShortest { k: usize },
}

impl Default for SearchStrategy {
    fn default() -> Self {
        SearchStrategy::Exhaustive {
            budget: DEFAULT_SEARCH_BUDGET,
        }
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchStrategy::Exhaustive { budget } => write!(f, "exhaustive (budget {budget})"),
            SearchStrategy::KShortest { k } => write!(f, "{k} shortest paths"),
        }
    }
}

/// Simulation configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    pub search: SearchStrategy,
    /// Refuse routes through stations a train has already stood on
    pub use_history: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            search: SearchStrategy::default(),
            use_history: true,
        }
    }
}
