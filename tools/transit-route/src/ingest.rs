//! Network description ingestion - build phase input
//!
//! A deliberately thin layer: serde structs mirroring the authored JSON
//! network description, loaded straight into the catalogue. Everything
//! downstream works on the catalogue, never on these structs.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::catalogue::{Coordinates, TransportCatalogue};
use crate::transit_router::RoutingSettings;

#[derive(Debug, Deserialize)]
pub struct NetworkSpec {
    pub routing_settings: RoutingSettings,
    pub stops: Vec<StopSpec>,
    pub buses: Vec<BusSpec>,
}

#[derive(Debug, Deserialize)]
pub struct StopSpec {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    /// Directed road distances to named neighbors. BTreeMap keeps the
    /// insertion deterministic for identical inputs.
    #[serde(default)]
    pub road_distances: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
pub struct BusSpec {
    pub name: String,
    pub stops: Vec<String>,
    #[serde(default)]
    pub is_roundtrip: bool,
}

/// Load a JSON network description into a fresh catalogue.
pub fn load_network<P: AsRef<Path>>(path: P) -> Result<(TransportCatalogue, RoutingSettings)> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read network description {}", path.display()))?;
    let spec: NetworkSpec = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse network description {}", path.display()))?;
    build_catalogue(spec)
}

/// Populate a catalogue from a parsed description.
///
/// Stops are registered first so that distance entries and bus routes can
/// reference any stop regardless of declaration order.
pub fn build_catalogue(spec: NetworkSpec) -> Result<(TransportCatalogue, RoutingSettings)> {
    let mut catalogue = TransportCatalogue::new();

    for stop in &spec.stops {
        catalogue.add_stop(
            &stop.name,
            Coordinates {
                lat: stop.lat,
                lng: stop.lng,
            },
        );
    }
    for stop in &spec.stops {
        for (neighbor, &distance) in &stop.road_distances {
            catalogue
                .set_distance(&stop.name, neighbor, distance)
                .with_context(|| format!("Bad distance entry on stop '{}'", stop.name))?;
        }
    }
    for bus in &spec.buses {
        catalogue
            .add_bus(&bus.name, &bus.stops, bus.is_roundtrip)
            .with_context(|| format!("Bad route on bus '{}'", bus.name))?;
    }

    Ok((catalogue, spec.routing_settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NETWORK: &str = r#"{
        "routing_settings": { "bus_wait_time": 2, "bus_velocity": 30 },
        "stops": [
            { "name": "A", "lat": 55.0, "lng": 37.0, "road_distances": { "B": 1000 } },
            { "name": "B", "lat": 55.1, "lng": 37.1 }
        ],
        "buses": [
            { "name": "X", "stops": ["A", "B"], "is_roundtrip": true }
        ]
    }"#;

    #[test]
    fn test_build_catalogue_from_json() {
        let spec: NetworkSpec = serde_json::from_str(NETWORK).unwrap();
        let (catalogue, settings) = build_catalogue(spec).unwrap();

        assert_eq!(settings.bus_wait_time, 2.0);
        assert_eq!(catalogue.stops().len(), 2);
        let (a, b) = (
            catalogue.find_stop("A").unwrap(),
            catalogue.find_stop("B").unwrap(),
        );
        assert_eq!(catalogue.distance_between(a, b), 1000.0);
        assert_eq!(catalogue.buses().len(), 1);
        assert!(catalogue.buses()[0].is_roundtrip);
    }

    #[test]
    fn test_unknown_stop_in_bus_route_fails() {
        let spec: NetworkSpec = serde_json::from_str(
            r#"{
                "routing_settings": { "bus_wait_time": 2, "bus_velocity": 30 },
                "stops": [ { "name": "A", "lat": 55.0, "lng": 37.0 } ],
                "buses": [ { "name": "X", "stops": ["A", "Nowhere"] } ]
            }"#,
        )
        .unwrap();
        let err = build_catalogue(spec).unwrap_err();
        assert!(err.to_string().contains("Bad route on bus 'X'"));
    }
}
