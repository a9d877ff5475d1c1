//! Railway Simulation Library
//!
//! Moves a fleet of identical trains from one station to another over a
//! shared network, one turn at a time, without two trains ever sharing a
//! station or a track segment.

pub mod map_file;
pub mod simulation;
