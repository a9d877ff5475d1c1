//! Human-readable trace of a simulation run
//!
//! One line per turn listing `Tk-station` tokens in commit order, followed by
//! a single summary line.

use super::network::RailNetwork;
use super::scheduler::{Outcome, SimulationReport, TurnRecord};

pub const COMPLETED_LINE: &str = "All trains have reached their destinations. Simulation ending.";

pub const LIVELOCK_LINE: &str =
    "Faulty simulation detected: No trains moved for 2 consecutive turns. Exiting simulation.";

/// Formats the moves of one turn; an idle turn yields an empty string
pub fn format_turn(network: &RailNetwork, record: &TurnRecord) -> String {
    record
        .moves
        .iter()
        .map(|hop| format!("{}-{}", hop.train.display_name(), network.name(hop.to)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Summary line printed after the last turn
pub fn outcome_line(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Completed { .. } => COMPLETED_LINE.to_string(),
        Outcome::Livelock { .. } => LIVELOCK_LINE.to_string(),
        Outcome::SearchBudgetExceeded { turns, budget } => format!(
            "Faulty simulation detected: Path search exceeded {budget} steps in turn {turns}. Exiting simulation."
        ),
    }
}

/// Per-turn lines without the summary
pub fn turn_lines(network: &RailNetwork, report: &SimulationReport) -> Vec<String> {
    report
        .turns
        .iter()
        .map(|record| format_turn(network, record))
        .collect()
}

/// The whole trace, summary included, newline terminated
pub fn render_report(network: &RailNetwork, report: &SimulationReport) -> String {
    let mut out = String::new();
    for line in turn_lines(network, report) {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str(&outcome_line(&report.outcome));
    out.push('\n');
    out
}
