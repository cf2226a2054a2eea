//! Transport catalogue - the network snapshot the router is built from
//!
//! Read-only to the routing subsystem. Stops live in an arena `Vec` and
//! are referenced everywhere else by `StopId` (insertion order), which is
//! also the stable integer id of the persistence format.

use std::collections::HashMap;
use tracing::warn;
use transit_common::{Error, Result};

/// Stable stop identifier: index into the catalogue's stop arena,
/// assigned by insertion order and never renumbered.
pub type StopId = u32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone)]
pub struct Stop {
    pub name: String,
    pub coord: Coordinates,
}

/// A bus line: ordered stop sequence plus the loop flag.
///
/// A roundtrip line closes on itself and is traversed forward only;
/// a linear line is ridden forward and backward.
#[derive(Debug, Clone)]
pub struct Bus {
    pub name: String,
    pub route: Vec<StopId>,
    pub is_roundtrip: bool,
}

#[derive(Debug, Default)]
pub struct TransportCatalogue {
    stops: Vec<Stop>,
    buses: Vec<Bus>,
    stop_index: HashMap<String, StopId>,
    // Directed distances as entered; reverse lookup falls back to the
    // forward pair.
    distances: HashMap<(StopId, StopId), f64>,
}

impl TransportCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stop, returning its stable id. Re-adding an existing name
    /// returns the original id and leaves the stored stop untouched.
    pub fn add_stop(&mut self, name: &str, coord: Coordinates) -> StopId {
        if let Some(&id) = self.stop_index.get(name) {
            return id;
        }
        let id = self.stops.len() as StopId;
        self.stops.push(Stop {
            name: name.to_string(),
            coord,
        });
        self.stop_index.insert(name.to_string(), id);
        id
    }

    /// Record the directed road distance between two named stops.
    pub fn set_distance(&mut self, from: &str, to: &str, distance: f64) -> Result<()> {
        let from_id = self
            .find_stop(from)
            .ok_or_else(|| self.unknown_stop_error(from))?;
        let to_id = self
            .find_stop(to)
            .ok_or_else(|| self.unknown_stop_error(to))?;
        self.insert_distance(from_id, to_id, distance);
        Ok(())
    }

    pub(crate) fn insert_distance(&mut self, from: StopId, to: StopId, distance: f64) {
        self.distances.insert((from, to), distance);
    }

    /// Add a bus line over named stops. Every stop must already exist.
    pub fn add_bus(&mut self, name: &str, stops: &[String], is_roundtrip: bool) -> Result<()> {
        let mut route = Vec::with_capacity(stops.len());
        for stop_name in stops {
            let id = self
                .find_stop(stop_name)
                .ok_or_else(|| self.unknown_stop_error(stop_name))?;
            route.push(id);
        }
        self.push_bus(Bus {
            name: name.to_string(),
            route,
            is_roundtrip,
        });
        Ok(())
    }

    pub(crate) fn push_bus(&mut self, bus: Bus) {
        self.buses.push(bus);
    }

    pub fn find_stop(&self, name: &str) -> Option<StopId> {
        self.stop_index.get(name).copied()
    }

    pub fn stop(&self, id: StopId) -> &Stop {
        &self.stops[id as usize]
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn buses(&self) -> &[Bus] {
        &self.buses
    }

    /// Road distance between two stops.
    ///
    /// Falls back to the reverse pair when no forward entry exists; an
    /// entirely undefined pair resolves to zero, surfaced as a warning
    /// rather than failing the build.
    pub fn distance_between(&self, from: StopId, to: StopId) -> f64 {
        if let Some(&d) = self.distances.get(&(from, to)) {
            return d;
        }
        if let Some(&d) = self.distances.get(&(to, from)) {
            return d;
        }
        warn!(
            from = %self.stop(from).name,
            to = %self.stop(to).name,
            "no road distance defined between stops, defaulting to 0"
        );
        0.0
    }

    /// All directed distance entries as entered (forward pairs only).
    pub fn distance_entries(&self) -> impl Iterator<Item = (StopId, StopId, f64)> + '_ {
        self.distances.iter().map(|(&(from, to), &d)| (from, to, d))
    }

    /// Typed error for a name that failed lookup, with a fuzzy
    /// "did you mean" suggestion drawn from the known stop names.
    pub fn unknown_stop_error(&self, name: &str) -> Error {
        Error::unknown_stop(name, self.stops.iter().map(|s| s.name.as_str()))
    }
}
