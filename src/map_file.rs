//! Network map file reader and writer
//!
//! A map holds a `stations:` section (`name, x, y` per line) and a
//! `connections:` section (`name1 - name2` per line), in either order.
//! Blank lines and `#` comments are ignored. Connections are checked once
//! every station is known, so a map may list them first.

use anyhow::{bail, Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

use crate::simulation::{is_valid_station_name, RailNetwork};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Stations,
    Connections,
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(index) => &line[..index],
        None => line,
    }
}

fn parse_coordinate(raw: &str) -> Result<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        bail!("Invalid coordinate: {raw:?}");
    }
    raw.parse::<u64>()
        .with_context(|| format!("Coordinate out of range: {raw}"))
}

fn parse_station_line(line: &str) -> Result<(&str, u64, u64)> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let [name, x, y] = fields[..] else {
        bail!("Invalid station format: {line}");
    };
    if !is_valid_station_name(name) {
        bail!("Invalid station name: {name:?}");
    }
    Ok((name, parse_coordinate(x)?, parse_coordinate(y)?))
}

fn parse_connection_line(line: &str) -> Result<(&str, &str)> {
    let Some((from, to)) = line.split_once('-') else {
        bail!("Invalid connection format: {line}");
    };
    let (from, to) = (from.trim(), to.trim());
    if !is_valid_station_name(from) || !is_valid_station_name(to) {
        bail!("Invalid connection format: {line}");
    }
    if from == to {
        bail!("Connection between the same station: {from}");
    }
    Ok((from, to))
}

/// Keeps whichever error sits on the earliest line
fn note_error(first: &mut Option<(usize, anyhow::Error)>, number: usize, error: anyhow::Error) {
    if first.as_ref().map_or(true, |(line, _)| number < *line) {
        *first = Some((number, error.context(format!("line {number}"))));
    }
}

/// Parses the text of a network map.
///
/// Fails with the violation on the earliest line. Connections are checked
/// against the full station list, so a bad connection listed before the
/// `stations:` section still wins over a later station error.
pub fn parse_network_map(text: &str) -> Result<RailNetwork> {
    let mut network = RailNetwork::new();
    let mut section: Option<Section> = None;
    let mut seen_stations = false;
    let mut seen_connections = false;
    let mut connections: Vec<(usize, &str, &str)> = Vec::new();
    let mut first_error: Option<(usize, anyhow::Error)> = None;

    for (index, raw) in text.lines().enumerate() {
        let number = index + 1;
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        match line {
            "stations:" => {
                section = Some(Section::Stations);
                seen_stations = true;
                continue;
            }
            "connections:" => {
                section = Some(Section::Connections);
                seen_connections = true;
                continue;
            }
            _ => {}
        }

        match section {
            None => bail!("line {number}: Content outside of any section: {line}"),
            Some(Section::Stations) => {
                // Later stations are still registered so deferred
                // connections are judged against the whole list
                let added = parse_station_line(line)
                    .and_then(|(name, x, y)| network.add_station(name, x, y));
                if let Err(error) = added {
                    note_error(&mut first_error, number, error);
                }
            }
            Some(Section::Connections) => match parse_connection_line(line) {
                Ok((from, to)) => connections.push((number, from, to)),
                Err(error) => note_error(&mut first_error, number, error),
            },
        }
    }

    for (number, from, to) in connections {
        if first_error.as_ref().is_some_and(|(line, _)| *line < number) {
            break;
        }
        if let Err(error) = network.add_connection(from, to) {
            note_error(&mut first_error, number, error);
            break;
        }
    }

    if let Some((_, error)) = first_error {
        return Err(error);
    }
    if !seen_stations {
        bail!("Map is missing the stations: section");
    }
    if !seen_connections {
        bail!("Map is missing the connections: section");
    }

    debug!(
        "Parsed map with {} stations and {} connections",
        network.station_count(),
        network.connection_count()
    );
    Ok(network)
}

/// Reads and parses a network map file
pub fn load_network_map(path: impl AsRef<Path>) -> Result<RailNetwork> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read map file {}", path.display()))?;
    parse_network_map(&text).with_context(|| format!("Invalid map file {}", path.display()))
}

/// Serialises a network back into map file syntax
pub fn write_network_map(network: &RailNetwork) -> String {
    let mut out = String::from("stations:\n");
    for (_, station) in network.stations() {
        out.push_str(&format!("{},{},{}\n", station.name, station.x, station.y));
    }
    out.push_str("\nconnections:\n");
    for (from, to) in network.connections() {
        out.push_str(&format!("{}-{}\n", network.name(from), network.name(to)));
    }
    out
}
