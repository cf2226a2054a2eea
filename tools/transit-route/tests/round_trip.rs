//! Full build -> persist -> load -> query round trip over a small but
//! non-trivial network: one loop line, one linear line, a transfer stop
//! and an isolated stop.

use tempfile::NamedTempFile;
use transit_route::formats::TransitDbFile;
use transit_route::ingest::{build_catalogue, NetworkSpec};
use transit_route::{RouteItem, TransitRouter, TransportCatalogue};

const NETWORK: &str = r#"{
    "routing_settings": { "bus_wait_time": 6, "bus_velocity": 40 },
    "stops": [
        { "name": "Biryulyovo Zapadnoye", "lat": 55.574371, "lng": 37.651700,
          "road_distances": { "Biryulyovo Tovarnaya": 2600 } },
        { "name": "Biryulyovo Tovarnaya", "lat": 55.592028, "lng": 37.653656,
          "road_distances": { "Universam": 890 } },
        { "name": "Universam", "lat": 55.587655, "lng": 37.645687,
          "road_distances": { "Prazhskaya": 4650, "Biryulyovo Tovarnaya": 1380 } },
        { "name": "Prazhskaya", "lat": 55.611717, "lng": 37.603938 },
        { "name": "Lonely Outpost", "lat": 55.700000, "lng": 37.500000,
          "road_distances": { "Prazhskaya": 3000 } }
    ],
    "buses": [
        { "name": "297",
          "stops": ["Biryulyovo Zapadnoye", "Biryulyovo Tovarnaya", "Universam", "Biryulyovo Zapadnoye"],
          "is_roundtrip": true },
        { "name": "635",
          "stops": ["Biryulyovo Tovarnaya", "Universam", "Prazhskaya"],
          "is_roundtrip": false }
    ]
}"#;

fn build() -> (TransportCatalogue, TransitRouter) {
    let spec: NetworkSpec = serde_json::from_str(NETWORK).unwrap();
    let (catalogue, settings) = build_catalogue(spec).unwrap();
    let router = TransitRouter::build(&catalogue, settings);
    (catalogue, router)
}

fn stop_names(catalogue: &TransportCatalogue) -> Vec<String> {
    catalogue.stops().iter().map(|s| s.name.clone()).collect()
}

#[test]
fn persisted_network_answers_identically() {
    let (catalogue, router) = build();
    let tmpfile = NamedTempFile::new().unwrap();
    TransitDbFile::write(tmpfile.path(), &catalogue, &router).unwrap();

    let (loaded_catalogue, loaded_router) = TransitDbFile::read(tmpfile.path()).unwrap();

    let names = stop_names(&catalogue);
    assert_eq!(names, stop_names(&loaded_catalogue), "stop ids must be stable");

    let mut reachable_pairs = 0;
    for from in &names {
        for to in &names {
            let original = router.query(&catalogue, from, to).unwrap();
            let reloaded = loaded_router.query(&loaded_catalogue, from, to).unwrap();
            assert_eq!(original, reloaded, "route {from} -> {to} must survive persistence");
            if original.is_some() {
                reachable_pairs += 1;
            }
        }
    }
    // every self pair plus the connected component must be reachable
    assert!(reachable_pairs > names.len());
}

#[test]
fn known_route_with_transfer() {
    let (catalogue, router) = build();

    let route = router
        .query(&catalogue, "Biryulyovo Zapadnoye", "Prazhskaya")
        .unwrap()
        .expect("stops are connected via 297 + 635");

    // itinerary alternates wait and ride, starting with a wait
    assert!(matches!(route.items[0], RouteItem::Wait { .. }));
    let ride_time: f64 = route
        .items
        .iter()
        .filter_map(|item| match item {
            RouteItem::Ride { time, .. } => Some(*time),
            RouteItem::Wait { .. } => None,
        })
        .sum();
    let wait_time: f64 = route
        .items
        .iter()
        .filter_map(|item| match item {
            RouteItem::Wait { time, .. } => Some(*time),
            RouteItem::Ride { .. } => None,
        })
        .sum();
    assert!((ride_time + wait_time - route.total_time).abs() < 1e-9);
}

#[test]
fn isolated_stop_reports_not_found_not_error() {
    let (catalogue, router) = build();

    // distances exist toward the outpost, but no line serves it
    assert_eq!(
        router
            .query(&catalogue, "Universam", "Lonely Outpost")
            .unwrap(),
        None
    );
    // while an unknown name is a typed error, not a silent "not found"
    assert!(router.query(&catalogue, "Universam", "Universan").is_err());
}

#[test]
fn same_stop_round_trip_stays_empty() {
    let (catalogue, router) = build();
    let tmpfile = NamedTempFile::new().unwrap();
    TransitDbFile::write(tmpfile.path(), &catalogue, &router).unwrap();
    let (loaded_catalogue, loaded_router) = TransitDbFile::read(tmpfile.path()).unwrap();

    let route = loaded_router
        .query(&loaded_catalogue, "Universam", "Universam")
        .unwrap()
        .unwrap();
    assert_eq!(route.total_time, 0.0);
    assert!(route.items.is_empty());
}
