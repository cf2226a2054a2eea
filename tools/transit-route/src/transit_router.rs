//! Transit router - graph construction and rider-facing queries
//!
//! Splits every stop into a waiting vertex and a ready-to-ride vertex
//! joined by a wait edge, then adds one ride edge for every ordered pair
//! of positions along each bus line's traversal (not just adjacent
//! stops). Cumulative ride weights make any multi-stop segment a single
//! O(1) hop for the shortest-path engine and give the rider-facing span
//! count for free.

use serde::Deserialize;
use tracing::info;
use transit_common::Result;

use crate::catalogue::{StopId, TransportCatalogue};
use crate::graph::{Edge, PathGraph, VertexId};
use crate::router::{RouteInfo, Router};

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RoutingSettings {
    /// Fixed boarding wait at every stop, minutes
    pub bus_wait_time: f64,
    /// Effective bus speed, km/h
    pub bus_velocity: f64,
}

/// One rider-facing itinerary segment.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteItem {
    Wait {
        stop_name: String,
        time: f64,
    },
    Ride {
        bus_name: String,
        span_count: u32,
        time: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimalRoute {
    pub total_time: f64,
    pub items: Vec<RouteItem>,
}

#[derive(Debug)]
pub struct TransitRouter {
    settings: RoutingSettings,
    graph: PathGraph,
    router: Router,
    // StopId -> (waiting vertex, ready-to-ride vertex)
    stop_vertices: Vec<(VertexId, VertexId)>,
    // EdgeId -> itinerary item; edge ids are dense so this is a plain Vec
    edge_items: Vec<RouteItem>,
}

fn kmph_to_mpm(kmph: f64) -> f64 {
    kmph * 1000.0 / 60.0
}

impl TransitRouter {
    /// Build the path graph and precompute the shortest-path tables.
    ///
    /// The catalogue is only read; it must outlive nothing here, since the
    /// router keeps stop ids rather than references. Any change to the
    /// network requires discarding this router and building a new one.
    pub fn build(catalogue: &TransportCatalogue, settings: RoutingSettings) -> Self {
        let mut graph = PathGraph::new(catalogue.stops().len() * 2);
        let mut stop_vertices = Vec::with_capacity(catalogue.stops().len());
        let mut edge_items = Vec::new();

        // Vertex allocation is local to this build invocation.
        let mut next_vertex: VertexId = 0;
        for stop in catalogue.stops() {
            let wait_vertex = next_vertex;
            let ride_vertex = next_vertex + 1;
            next_vertex += 2;
            stop_vertices.push((wait_vertex, ride_vertex));

            graph.add_edge(Edge {
                from: wait_vertex,
                to: ride_vertex,
                weight: settings.bus_wait_time,
            });
            edge_items.push(RouteItem::Wait {
                stop_name: stop.name.clone(),
                time: settings.bus_wait_time,
            });
        }

        let velocity_mpm = kmph_to_mpm(settings.bus_velocity);
        for bus in catalogue.buses() {
            add_line_edges(
                catalogue,
                &bus.name,
                &bus.route,
                velocity_mpm,
                &stop_vertices,
                &mut graph,
                &mut edge_items,
            );
            if !bus.is_roundtrip {
                let reversed: Vec<StopId> = bus.route.iter().rev().copied().collect();
                add_line_edges(
                    catalogue,
                    &bus.name,
                    &reversed,
                    velocity_mpm,
                    &stop_vertices,
                    &mut graph,
                    &mut edge_items,
                );
            }
        }

        info!(
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            "built path graph, precomputing shortest paths"
        );
        let router = Router::new(&graph);

        Self {
            settings,
            graph,
            router,
            stop_vertices,
            edge_items,
        }
    }

    /// Fastest route between two named stops.
    ///
    /// `Err` means a name is not in the network (with a suggestion when
    /// one is close enough); `Ok(None)` means both stops exist but no
    /// path connects them; `query(x, x)` is a zero-item, zero-time
    /// itinerary.
    pub fn query(
        &self,
        catalogue: &TransportCatalogue,
        from: &str,
        to: &str,
    ) -> Result<Option<OptimalRoute>> {
        let from_id = catalogue
            .find_stop(from)
            .ok_or_else(|| catalogue.unknown_stop_error(from))?;
        let to_id = catalogue
            .find_stop(to)
            .ok_or_else(|| catalogue.unknown_stop_error(to))?;

        let (from_wait, _) = self.stop_vertices[from_id as usize];
        let (to_wait, _) = self.stop_vertices[to_id as usize];

        Ok(self
            .router
            .build_route(&self.graph, from_wait, to_wait)
            .map(|route| self.translate(&route)))
    }

    /// Map a raw edge sequence onto the recorded itinerary items.
    fn translate(&self, route: &RouteInfo) -> OptimalRoute {
        let items = route
            .edges
            .iter()
            .map(|&id| self.edge_items[id as usize].clone())
            .collect();
        OptimalRoute {
            total_time: route.weight,
            items,
        }
    }

    pub fn settings(&self) -> RoutingSettings {
        self.settings
    }

    pub fn graph(&self) -> &PathGraph {
        &self.graph
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn stop_vertices(&self) -> &[(VertexId, VertexId)] {
        &self.stop_vertices
    }

    pub fn edge_items(&self) -> &[RouteItem] {
        &self.edge_items
    }

    /// Rehydrate a router from persisted parts, skipping the build and
    /// precompute phases entirely.
    pub fn from_parts(
        settings: RoutingSettings,
        graph: PathGraph,
        router: Router,
        stop_vertices: Vec<(VertexId, VertexId)>,
        edge_items: Vec<RouteItem>,
    ) -> Self {
        Self {
            settings,
            graph,
            router,
            stop_vertices,
            edge_items,
        }
    }
}

/// Ride edges for one traversal direction of one bus line.
///
/// For every ordered pair of positions (i, j), i < j, the edge weight is
/// the accumulated stop-to-stop distance divided by the effective speed,
/// and the span count is j - i.
fn add_line_edges(
    catalogue: &TransportCatalogue,
    bus_name: &str,
    route: &[StopId],
    velocity_mpm: f64,
    stop_vertices: &[(VertexId, VertexId)],
    graph: &mut PathGraph,
    edge_items: &mut Vec<RouteItem>,
) {
    if route.len() < 2 {
        return;
    }
    for i in 0..route.len() - 1 {
        let mut accumulated = 0.0;
        let mut span_count = 0u32;
        for j in i + 1..route.len() {
            span_count += 1;
            accumulated += catalogue.distance_between(route[j - 1], route[j]) / velocity_mpm;

            let (_, ride_from) = stop_vertices[route[i] as usize];
            let (wait_to, _) = stop_vertices[route[j] as usize];
            graph.add_edge(Edge {
                from: ride_from,
                to: wait_to,
                weight: accumulated,
            });
            edge_items.push(RouteItem::Ride {
                bus_name: bus_name.to_string(),
                span_count,
                time: accumulated,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::Coordinates;
    use transit_common::Error;

    fn coord(lat: f64, lng: f64) -> Coordinates {
        Coordinates { lat, lng }
    }

    fn settings() -> RoutingSettings {
        RoutingSettings {
            bus_wait_time: 2.0,
            bus_velocity: 30.0, // 500 distance units per minute
        }
    }

    /// Stop A at (55.00, 37.00), stop B at (55.10, 37.10), A->B = 1000,
    /// loop line X over [A, B], wait 2, speed 30 km/h.
    fn two_stop_network() -> TransportCatalogue {
        let mut catalogue = TransportCatalogue::new();
        catalogue.add_stop("A", coord(55.0, 37.0));
        catalogue.add_stop("B", coord(55.1, 37.1));
        catalogue.set_distance("A", "B", 1000.0).unwrap();
        catalogue
            .add_bus("X", &["A".to_string(), "B".to_string()], true)
            .unwrap();
        catalogue
    }

    #[test]
    fn test_reference_scenario() {
        let catalogue = two_stop_network();
        let router = TransitRouter::build(&catalogue, settings());

        let route = router.query(&catalogue, "A", "B").unwrap().unwrap();
        assert_eq!(route.total_time, 4.0);
        assert_eq!(
            route.items,
            vec![
                RouteItem::Wait {
                    stop_name: "A".to_string(),
                    time: 2.0,
                },
                RouteItem::Ride {
                    bus_name: "X".to_string(),
                    span_count: 1,
                    time: 2.0,
                },
            ]
        );
    }

    #[test]
    fn test_loop_line_has_no_reverse_edges() {
        let catalogue = two_stop_network();
        let router = TransitRouter::build(&catalogue, settings());
        // X is a loop over [A, B]: riders cannot go B -> A
        assert_eq!(router.query(&catalogue, "B", "A").unwrap(), None);
    }

    #[test]
    fn test_linear_line_rides_both_ways() {
        let mut catalogue = TransportCatalogue::new();
        catalogue.add_stop("A", coord(55.0, 37.0));
        catalogue.add_stop("B", coord(55.1, 37.1));
        catalogue.set_distance("A", "B", 1000.0).unwrap();
        catalogue
            .add_bus("X", &["A".to_string(), "B".to_string()], false)
            .unwrap();
        let router = TransitRouter::build(&catalogue, settings());

        let forward = router.query(&catalogue, "A", "B").unwrap().unwrap();
        let back = router.query(&catalogue, "B", "A").unwrap().unwrap();
        assert_eq!(forward.total_time, 4.0);
        assert_eq!(back.total_time, 4.0);
    }

    #[test]
    fn test_same_stop_query_is_empty_itinerary() {
        let catalogue = two_stop_network();
        let router = TransitRouter::build(&catalogue, settings());

        let route = router.query(&catalogue, "A", "A").unwrap().unwrap();
        assert_eq!(route.total_time, 0.0);
        assert!(route.items.is_empty());
    }

    #[test]
    fn test_isolated_stop_is_not_found() {
        let mut catalogue = two_stop_network();
        catalogue.add_stop("C", coord(55.2, 37.2));
        catalogue.set_distance("B", "C", 800.0).unwrap();
        let router = TransitRouter::build(&catalogue, settings());

        // distances exist but no line serves C
        assert_eq!(router.query(&catalogue, "A", "C").unwrap(), None);
    }

    #[test]
    fn test_unknown_stop_is_typed_error() {
        let catalogue = two_stop_network();
        let router = TransitRouter::build(&catalogue, settings());

        let err = router.query(&catalogue, "A", "Z").unwrap_err();
        assert!(matches!(err, Error::UnknownStop { .. }));
    }

    #[test]
    fn test_ride_edge_weights_monotonic_along_line() {
        let mut catalogue = TransportCatalogue::new();
        for (name, lat) in [("A", 55.0), ("B", 55.1), ("C", 55.2), ("D", 55.3)] {
            catalogue.add_stop(name, coord(lat, 37.0));
        }
        catalogue.set_distance("A", "B", 600.0).unwrap();
        catalogue.set_distance("B", "C", 900.0).unwrap();
        catalogue.set_distance("C", "D", 300.0).unwrap();
        catalogue
            .add_bus(
                "7",
                &["A", "B", "C", "D"].map(str::to_string),
                true,
            )
            .unwrap();
        let router = TransitRouter::build(&catalogue, settings());

        // group ride items by their origin: weights must strictly increase
        // with span count for a fixed start position
        let rides: Vec<(u32, f64)> = router
            .edge_items()
            .iter()
            .filter_map(|item| match item {
                RouteItem::Ride {
                    span_count, time, ..
                } => Some((*span_count, *time)),
                RouteItem::Wait { .. } => None,
            })
            .collect();
        // 4 stops -> origins with 3, 2, 1 spans, emitted in span order
        assert_eq!(rides.len(), 6);
        let mut prev_span = 0;
        let mut prev_time = 0.0;
        for (span, time) in rides {
            if span > prev_span {
                assert!(time > prev_time, "cumulative weight must grow with span");
            }
            prev_span = span;
            prev_time = time;
        }
    }

    #[test]
    fn test_multi_stop_ride_is_single_segment() {
        let mut catalogue = TransportCatalogue::new();
        for (name, lat) in [("A", 55.0), ("B", 55.1), ("C", 55.2)] {
            catalogue.add_stop(name, coord(lat, 37.0));
        }
        catalogue.set_distance("A", "B", 500.0).unwrap();
        catalogue.set_distance("B", "C", 500.0).unwrap();
        catalogue
            .add_bus("9", &["A", "B", "C"].map(str::to_string), true)
            .unwrap();
        let router = TransitRouter::build(&catalogue, settings());

        // riding straight through B must not pay B's wait time
        let route = router.query(&catalogue, "A", "C").unwrap().unwrap();
        assert_eq!(route.total_time, 4.0); // 2 wait + (500+500)/500
        assert_eq!(route.items.len(), 2);
        assert_eq!(
            route.items[1],
            RouteItem::Ride {
                bus_name: "9".to_string(),
                span_count: 2,
                time: 2.0,
            }
        );
    }
}
