//! Transit network routing engine
//!
//! Builds a directed weighted graph from a catalogue of stops and bus
//! lines (two vertices per stop: waiting and ready-to-ride), precomputes
//! all-pairs shortest paths, translates raw paths into rider-facing
//! itineraries, and persists the whole routable state to a single binary
//! file so a later process can skip the build entirely.

pub mod catalogue;
pub mod formats;
pub mod graph;
pub mod ingest;
pub mod router;
pub mod transit_router;

pub use catalogue::{Coordinates, Stop, StopId, TransportCatalogue};
pub use transit_router::{OptimalRoute, RouteItem, RoutingSettings, TransitRouter};
