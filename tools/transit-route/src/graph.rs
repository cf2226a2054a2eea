//! Directed weighted path graph with per-vertex incidence lists
//!
//! Vertices are dense ids fixed at construction (two per stop, allocated
//! by the builder); edges are appended once during the build and never
//! mutated afterwards. Edge ids are dense and monotonically assigned,
//! which the itinerary index and the persistence codec rely on.

pub type VertexId = u32;
pub type EdgeId = u32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub from: VertexId,
    pub to: VertexId,
    pub weight: f64,
}

#[derive(Debug, Default)]
pub struct PathGraph {
    edges: Vec<Edge>,
    incidence_lists: Vec<Vec<EdgeId>>,
}

impl PathGraph {
    pub fn new(vertex_count: usize) -> Self {
        Self {
            edges: Vec::new(),
            incidence_lists: vec![Vec::new(); vertex_count],
        }
    }

    pub fn add_edge(&mut self, edge: Edge) -> EdgeId {
        let id = self.edges.len() as EdgeId;
        self.incidence_lists[edge.from as usize].push(id);
        self.edges.push(edge);
        id
    }

    pub fn vertex_count(&self) -> usize {
        self.incidence_lists.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id as usize]
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges leaving `vertex`, in insertion order.
    pub fn incident_edges(&self, vertex: VertexId) -> &[EdgeId] {
        &self.incidence_lists[vertex as usize]
    }

    /// Full incidence structure, for the persistence codec.
    pub fn incidence_lists(&self) -> &[Vec<EdgeId>] {
        &self.incidence_lists
    }

    /// Rebuild a graph from persisted parts. The codec is responsible for
    /// handing back lists consistent with the edge list.
    pub fn from_parts(edges: Vec<Edge>, incidence_lists: Vec<Vec<EdgeId>>) -> Self {
        Self {
            edges,
            incidence_lists,
        }
    }
}
