//! transit.db format - the persisted routable network
//!
//! Single little-endian binary file carrying everything the query phase
//! needs: the network snapshot (stops, distances, bus lines), the path
//! graph, the engine's all-pairs table, the stop-to-vertex index and the
//! edge-to-itinerary-item index. Loading is a pure deserialization - no
//! graph build, no precompute.
//!
//! Layout:
//!   header (32 bytes): magic, version, reserved, created_unix,
//!                      n_stops, n_buses, n_vertices, n_edges
//!   section 1: stops (id, name, coordinates, neighbor distances)
//!   section 2: bus lines (name, loop flag, stop ids)
//!   section 3: graph (edge list, per-vertex incidence lists)
//!   section 4: routing settings + all-pairs table (tagged optionals)
//!   section 5: stop id -> (wait vertex, ride vertex)
//!   section 6: edge id -> itinerary item (tagged Wait/Ride)
//!   footer (16 bytes): body CRC-64, file CRC-64
//!
//! Stop ids are enumeration order at save time; the loader reproduces
//! them by inserting stops in file order, which is a precondition of the
//! format, not something it can verify.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use super::crc;
use crate::catalogue::{Bus, Coordinates, StopId, TransportCatalogue};
use crate::graph::{Edge, EdgeId, PathGraph, VertexId};
use crate::router::{RouteInternalData, Router};
use crate::transit_router::{RouteItem, RoutingSettings, TransitRouter};

const MAGIC: u32 = 0x54524442; // "TRDB"
const VERSION: u16 = 1;

const HEADER_LEN: usize = 32;
const FOOTER_LEN: usize = 16;

const TAG_NONE: u8 = 0;
const TAG_NO_PREV: u8 = 1;
const TAG_WITH_PREV: u8 = 2;

const ITEM_WAIT: u8 = 1;
const ITEM_RIDE: u8 = 2;

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("invalid magic number: expected 0x{expected:08x}, got 0x{found:08x}")]
    BadMagic { expected: u32, found: u32 },

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u16),

    #[error("file too short: {len} bytes")]
    TooShort { len: usize },

    #[error("truncated record at offset {offset}")]
    Truncated { offset: usize },

    #[error("file CRC mismatch: stored {stored:016x}, computed {computed:016x}")]
    CrcMismatch { stored: u64, computed: u64 },

    #[error("{what} id {id} out of range")]
    BadId { what: &'static str, id: u32 },

    #[error("unknown tag {tag} in {section} section")]
    BadTag { section: &'static str, tag: u8 },

    #[error("invalid UTF-8 in {0}")]
    BadString(&'static str),

    #[error("{what} count mismatch: expected {expected}, found {found}")]
    CountMismatch {
        what: &'static str,
        expected: u64,
        found: u64,
    },

    #[error("unexpected {remaining} trailing bytes")]
    Trailing { remaining: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub struct TransitDbFile;

impl TransitDbFile {
    /// Persist the snapshot and the fully-built router state.
    pub fn write<P: AsRef<Path>>(
        path: P,
        catalogue: &TransportCatalogue,
        router: &TransitRouter,
    ) -> Result<(), FormatError> {
        let graph = router.graph();
        let n_stops = catalogue.stops().len();
        let n_vertices = graph.vertex_count();
        let n_edges = graph.edge_count();

        let created_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let mut buf = Vec::new();

        // Header
        put_u32(&mut buf, MAGIC);
        put_u16(&mut buf, VERSION);
        put_u16(&mut buf, 0); // reserved
        put_u64(&mut buf, created_unix);
        put_u32(&mut buf, n_stops as u32);
        put_u32(&mut buf, catalogue.buses().len() as u32);
        put_u32(&mut buf, n_vertices as u32);
        put_u32(&mut buf, n_edges as u32);
        debug_assert_eq!(buf.len(), HEADER_LEN);

        // Section 1: stops with their forward distance entries
        let mut neighbors: Vec<Vec<(StopId, f64)>> = vec![Vec::new(); n_stops];
        for (from, to, distance) in catalogue.distance_entries() {
            neighbors[from as usize].push((to, distance));
        }
        for list in &mut neighbors {
            list.sort_by_key(|&(to, _)| to);
        }
        for (id, stop) in catalogue.stops().iter().enumerate() {
            put_u32(&mut buf, id as u32);
            put_str(&mut buf, &stop.name);
            put_f64(&mut buf, stop.coord.lat);
            put_f64(&mut buf, stop.coord.lng);
            let list = &neighbors[id];
            put_u32(&mut buf, list.len() as u32);
            for &(to, distance) in list {
                put_u32(&mut buf, to);
                put_f64(&mut buf, distance);
            }
        }

        // Section 2: bus lines
        for bus in catalogue.buses() {
            put_str(&mut buf, &bus.name);
            put_u8(&mut buf, bus.is_roundtrip as u8);
            put_u32(&mut buf, bus.route.len() as u32);
            for &stop_id in &bus.route {
                put_u32(&mut buf, stop_id);
            }
        }

        // Section 3: graph
        for edge in graph.edges() {
            put_u32(&mut buf, edge.from);
            put_u32(&mut buf, edge.to);
            put_f64(&mut buf, edge.weight);
        }
        for list in graph.incidence_lists() {
            put_u32(&mut buf, list.len() as u32);
            for &edge_id in list {
                put_u32(&mut buf, edge_id);
            }
        }

        // Section 4: settings + all-pairs table
        let settings = router.settings();
        put_f64(&mut buf, settings.bus_wait_time);
        put_f64(&mut buf, settings.bus_velocity);
        for row in router.router().table() {
            for cell in row {
                match cell {
                    None => put_u8(&mut buf, TAG_NONE),
                    Some(data) => match data.prev_edge {
                        None => {
                            put_u8(&mut buf, TAG_NO_PREV);
                            put_f64(&mut buf, data.weight);
                        }
                        Some(edge_id) => {
                            put_u8(&mut buf, TAG_WITH_PREV);
                            put_f64(&mut buf, data.weight);
                            put_u32(&mut buf, edge_id);
                        }
                    },
                }
            }
        }

        // Section 5: stop -> vertex pair
        for (id, &(wait_vertex, ride_vertex)) in router.stop_vertices().iter().enumerate() {
            put_u32(&mut buf, id as u32);
            put_u32(&mut buf, wait_vertex);
            put_u32(&mut buf, ride_vertex);
        }

        // Section 6: edge id -> itinerary item
        put_u32(&mut buf, router.edge_items().len() as u32);
        for (id, item) in router.edge_items().iter().enumerate() {
            put_u32(&mut buf, id as u32);
            match item {
                RouteItem::Wait { stop_name, time } => {
                    put_u8(&mut buf, ITEM_WAIT);
                    put_str(&mut buf, stop_name);
                    put_f64(&mut buf, *time);
                }
                RouteItem::Ride {
                    bus_name,
                    span_count,
                    time,
                } => {
                    put_u8(&mut buf, ITEM_RIDE);
                    put_str(&mut buf, bus_name);
                    put_u32(&mut buf, *span_count);
                    put_f64(&mut buf, *time);
                }
            }
        }

        // Footer
        let body_crc = crc::checksum(&buf);
        let file_crc = body_crc;

        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(&buf)?;
        writer.write_all(&body_crc.to_le_bytes())?;
        writer.write_all(&file_crc.to_le_bytes())?;
        writer.flush()?;

        Ok(())
    }

    /// Load a persisted network.
    ///
    /// Builds a fresh catalogue and router; nothing is handed to the
    /// caller unless the whole file decodes, so a corrupt file can never
    /// leave stale or partial network state behind.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<(TransportCatalogue, TransitRouter), FormatError> {
        let bytes = read_and_check(path)?;
        let content = &bytes[..bytes.len() - FOOTER_LEN];
        let mut reader = Reader::new(content);

        // Header
        let magic = reader.take_u32()?;
        if magic != MAGIC {
            return Err(FormatError::BadMagic {
                expected: MAGIC,
                found: magic,
            });
        }
        let version = reader.take_u16()?;
        if version != VERSION {
            return Err(FormatError::UnsupportedVersion(version));
        }
        let _reserved = reader.take_u16()?;
        let _created_unix = reader.take_u64()?;
        let n_stops = reader.take_u32()?;
        let n_buses = reader.take_u32()?;
        let n_vertices = reader.take_u32()?;
        let n_edges = reader.take_u32()?;

        // Section 1: stops
        let mut catalogue = TransportCatalogue::new();
        let mut distance_lists: Vec<(StopId, Vec<(StopId, f64)>)> = Vec::new();
        for index in 0..n_stops {
            let id = reader.take_u32()?;
            if id != index {
                return Err(FormatError::BadId { what: "stop", id });
            }
            let name = reader.take_str("stop name")?;
            let lat = reader.take_f64()?;
            let lng = reader.take_f64()?;
            catalogue.add_stop(&name, Coordinates { lat, lng });

            let n_neighbors = reader.take_u32()?;
            let mut list = Vec::with_capacity(n_neighbors as usize);
            for _ in 0..n_neighbors {
                let to = reader.take_u32()?;
                let distance = reader.take_f64()?;
                list.push((to, distance));
            }
            distance_lists.push((id, list));
        }
        for (from, list) in distance_lists {
            for (to, distance) in list {
                if to >= n_stops {
                    return Err(FormatError::BadId {
                        what: "neighbor stop",
                        id: to,
                    });
                }
                catalogue.insert_distance(from, to, distance);
            }
        }

        // Section 2: bus lines
        for _ in 0..n_buses {
            let name = reader.take_str("bus name")?;
            let is_roundtrip = reader.take_u8()? != 0;
            let n_route = reader.take_u32()?;
            let mut route = Vec::with_capacity(n_route as usize);
            for _ in 0..n_route {
                let stop_id = reader.take_u32()?;
                if stop_id >= n_stops {
                    return Err(FormatError::BadId {
                        what: "route stop",
                        id: stop_id,
                    });
                }
                route.push(stop_id);
            }
            catalogue.push_bus(Bus {
                name,
                route,
                is_roundtrip,
            });
        }

        // Section 3: graph
        let mut edges = Vec::with_capacity(n_edges as usize);
        for _ in 0..n_edges {
            let from = reader.take_u32()?;
            let to = reader.take_u32()?;
            let weight = reader.take_f64()?;
            if from >= n_vertices {
                return Err(FormatError::BadId {
                    what: "edge source vertex",
                    id: from,
                });
            }
            if to >= n_vertices {
                return Err(FormatError::BadId {
                    what: "edge target vertex",
                    id: to,
                });
            }
            edges.push(Edge { from, to, weight });
        }
        let mut incidence_lists: Vec<Vec<EdgeId>> = Vec::with_capacity(n_vertices as usize);
        for _ in 0..n_vertices {
            let len = reader.take_u32()?;
            let mut list = Vec::with_capacity(len as usize);
            for _ in 0..len {
                let edge_id = reader.take_u32()?;
                if edge_id >= n_edges {
                    return Err(FormatError::BadId {
                        what: "incident edge",
                        id: edge_id,
                    });
                }
                list.push(edge_id);
            }
            incidence_lists.push(list);
        }
        let graph = PathGraph::from_parts(edges, incidence_lists);

        // Section 4: settings + all-pairs table
        let settings = RoutingSettings {
            bus_wait_time: reader.take_f64()?,
            bus_velocity: reader.take_f64()?,
        };
        let mut table: Vec<Vec<Option<RouteInternalData>>> =
            Vec::with_capacity(n_vertices as usize);
        for _ in 0..n_vertices {
            let mut row = Vec::with_capacity(n_vertices as usize);
            for _ in 0..n_vertices {
                let tag = reader.take_u8()?;
                let cell = match tag {
                    TAG_NONE => None,
                    TAG_NO_PREV => Some(RouteInternalData {
                        weight: reader.take_f64()?,
                        prev_edge: None,
                    }),
                    TAG_WITH_PREV => {
                        let weight = reader.take_f64()?;
                        let edge_id = reader.take_u32()?;
                        if edge_id >= n_edges {
                            return Err(FormatError::BadId {
                                what: "predecessor edge",
                                id: edge_id,
                            });
                        }
                        Some(RouteInternalData {
                            weight,
                            prev_edge: Some(edge_id),
                        })
                    }
                    tag => {
                        return Err(FormatError::BadTag {
                            section: "router table",
                            tag,
                        })
                    }
                };
                row.push(cell);
            }
            table.push(row);
        }
        let router = Router::from_table(table);

        // Section 5: stop -> vertex pair
        let mut stop_vertices: Vec<(VertexId, VertexId)> = Vec::with_capacity(n_stops as usize);
        for index in 0..n_stops {
            let id = reader.take_u32()?;
            if id != index {
                return Err(FormatError::BadId {
                    what: "vertex-index stop",
                    id,
                });
            }
            let wait_vertex = reader.take_u32()?;
            let ride_vertex = reader.take_u32()?;
            if wait_vertex >= n_vertices || ride_vertex >= n_vertices {
                return Err(FormatError::BadId {
                    what: "stop vertex",
                    id: wait_vertex.max(ride_vertex),
                });
            }
            stop_vertices.push((wait_vertex, ride_vertex));
        }

        // Section 6: edge id -> itinerary item
        let n_items = reader.take_u32()?;
        if n_items != n_edges {
            return Err(FormatError::CountMismatch {
                what: "itinerary item",
                expected: n_edges as u64,
                found: n_items as u64,
            });
        }
        let mut edge_items = Vec::with_capacity(n_items as usize);
        for index in 0..n_items {
            let id = reader.take_u32()?;
            if id != index {
                return Err(FormatError::BadId {
                    what: "item edge",
                    id,
                });
            }
            let tag = reader.take_u8()?;
            let item = match tag {
                ITEM_WAIT => RouteItem::Wait {
                    stop_name: reader.take_str("wait item stop name")?,
                    time: reader.take_f64()?,
                },
                ITEM_RIDE => RouteItem::Ride {
                    bus_name: reader.take_str("ride item bus name")?,
                    span_count: reader.take_u32()?,
                    time: reader.take_f64()?,
                },
                tag => {
                    return Err(FormatError::BadTag {
                        section: "itinerary item",
                        tag,
                    })
                }
            };
            edge_items.push(item);
        }

        if reader.remaining() != 0 {
            return Err(FormatError::Trailing {
                remaining: reader.remaining(),
            });
        }

        let transit_router =
            TransitRouter::from_parts(settings, graph, router, stop_vertices, edge_items);
        Ok((catalogue, transit_router))
    }

    /// Verify header and checksums without decoding the body.
    pub fn verify<P: AsRef<Path>>(path: P) -> Result<(), FormatError> {
        let bytes = read_and_check(path)?;
        let mut reader = Reader::new(&bytes[..HEADER_LEN]);
        let magic = reader.take_u32()?;
        if magic != MAGIC {
            return Err(FormatError::BadMagic {
                expected: MAGIC,
                found: magic,
            });
        }
        let version = reader.take_u16()?;
        if version != VERSION {
            return Err(FormatError::UnsupportedVersion(version));
        }
        Ok(())
    }
}

/// Read the whole file and verify the footer CRC over the content.
fn read_and_check<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, FormatError> {
    let mut file = File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    if bytes.len() < HEADER_LEN + FOOTER_LEN {
        return Err(FormatError::TooShort { len: bytes.len() });
    }

    let content = &bytes[..bytes.len() - FOOTER_LEN];
    let footer = &bytes[bytes.len() - FOOTER_LEN..];
    let stored = u64::from_le_bytes(footer[8..16].try_into().expect("footer slice is 8 bytes"));
    let computed = crc::checksum(content);
    if stored != computed {
        return Err(FormatError::CrcMismatch { stored, computed });
    }

    Ok(bytes)
}

fn put_u8(buf: &mut Vec<u8>, value: u8) {
    buf.push(value);
}

fn put_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_u64(buf: &mut Vec<u8>, value: u64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_f64(buf: &mut Vec<u8>, value: f64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_str(buf: &mut Vec<u8>, value: &str) {
    // string fields carry a u16 length prefix; longer names cannot be encoded
    debug_assert!(
        value.len() <= u16::MAX as usize,
        "string field too long: {} bytes",
        value.len()
    );
    put_u16(buf, value.len() as u16);
    buf.extend_from_slice(value.as_bytes());
}

/// Bounds-checked little-endian cursor over the file content.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], FormatError> {
        if self.pos + len > self.bytes.len() {
            return Err(FormatError::Truncated { offset: self.pos });
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn take_u8(&mut self) -> Result<u8, FormatError> {
        Ok(self.take(1)?[0])
    }

    fn take_u16(&mut self) -> Result<u16, FormatError> {
        Ok(u16::from_le_bytes(self.take(2)?.try_into().expect("2 bytes")))
    }

    fn take_u32(&mut self) -> Result<u32, FormatError> {
        Ok(u32::from_le_bytes(self.take(4)?.try_into().expect("4 bytes")))
    }

    fn take_u64(&mut self) -> Result<u64, FormatError> {
        Ok(u64::from_le_bytes(self.take(8)?.try_into().expect("8 bytes")))
    }

    fn take_f64(&mut self) -> Result<f64, FormatError> {
        Ok(f64::from_le_bytes(self.take(8)?.try_into().expect("8 bytes")))
    }

    fn take_str(&mut self, what: &'static str) -> Result<String, FormatError> {
        let len = self.take_u16()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| FormatError::BadString(what))
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }
}
