//! All-pairs shortest-path engine over a finalized `PathGraph`
//!
//! Precomputes, for every ordered vertex pair, the best path weight and
//! the last edge on that path; point-to-point queries then reduce to a
//! table lookup plus backward edge walking. The table is immutable once
//! built and is itself part of the persisted state, so loading a saved
//! network skips this precompute entirely.

use crate::graph::{EdgeId, PathGraph, VertexId};

/// One cell of the all-pairs table: best known weight from `from` to
/// `to`, plus the last edge of that path (`None` only on the diagonal).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteInternalData {
    pub weight: f64,
    pub prev_edge: Option<EdgeId>,
}

/// A resolved point-to-point path: edge ids in travel order.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteInfo {
    pub weight: f64,
    pub edges: Vec<EdgeId>,
}

#[derive(Debug)]
pub struct Router {
    // table[from][to], row-major over the dense vertex ids
    table: Vec<Vec<Option<RouteInternalData>>>,
}

impl Router {
    /// Precompute the full all-pairs table.
    ///
    /// Tie-break among equal-weight paths: entries are only ever replaced
    /// on a strictly smaller weight. Direct edges are seeded in ascending
    /// edge-id order and vertices relaxed in ascending vertex-id order, so
    /// the earliest-seeded path wins deterministically (lowest intermediate
    /// vertex ids, then lowest edge ids).
    pub fn new(graph: &PathGraph) -> Self {
        let n = graph.vertex_count();
        let mut table: Vec<Vec<Option<RouteInternalData>>> = vec![vec![None; n]; n];

        for v in 0..n {
            table[v][v] = Some(RouteInternalData {
                weight: 0.0,
                prev_edge: None,
            });
        }

        for (id, edge) in graph.edges().iter().enumerate() {
            let cell = &mut table[edge.from as usize][edge.to as usize];
            let improves = match cell {
                Some(existing) => edge.weight < existing.weight,
                None => true,
            };
            if improves {
                *cell = Some(RouteInternalData {
                    weight: edge.weight,
                    prev_edge: Some(id as EdgeId),
                });
            }
        }

        // Close the table by relaxing every pair through every vertex.
        for k in 0..n {
            for i in 0..n {
                let Some(left) = table[i][k] else { continue };
                for j in 0..n {
                    let Some(right) = table[k][j] else { continue };
                    let candidate = left.weight + right.weight;
                    let improves = match table[i][j] {
                        Some(existing) => candidate < existing.weight,
                        None => true,
                    };
                    if improves {
                        table[i][j] = Some(RouteInternalData {
                            weight: candidate,
                            prev_edge: right.prev_edge,
                        });
                    }
                }
            }
        }

        Self { table }
    }

    /// Resolve the precomputed path from `from` to `to`.
    ///
    /// `None` means unreachable. `from == to` yields an empty edge
    /// sequence with zero weight, not `None`.
    pub fn build_route(&self, graph: &PathGraph, from: VertexId, to: VertexId) -> Option<RouteInfo> {
        let data = self.table[from as usize][to as usize]?;

        let mut edges = Vec::new();
        let mut last_edge = data.prev_edge;
        while let Some(id) = last_edge {
            edges.push(id);
            let mid = graph.edge(id).from;
            last_edge = self.table[from as usize][mid as usize]
                .and_then(|cell| cell.prev_edge);
        }
        edges.reverse();

        Some(RouteInfo {
            weight: data.weight,
            edges,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.table.len()
    }

    /// Internal table, for the persistence codec.
    pub fn table(&self) -> &[Vec<Option<RouteInternalData>>] {
        &self.table
    }

    /// Rehydrate from a persisted table.
    pub fn from_table(table: Vec<Vec<Option<RouteInternalData>>>) -> Self {
        Self { table }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Edge;

    fn edge(from: VertexId, to: VertexId, weight: f64) -> Edge {
        Edge { from, to, weight }
    }

    fn diamond() -> PathGraph {
        // 0 -> 1 -> 3 costs 3.0, 0 -> 2 -> 3 costs 2.5, 0 -> 3 costs 4.0
        let mut graph = PathGraph::new(5); // vertex 4 is isolated
        graph.add_edge(edge(0, 1, 1.0)); // e0
        graph.add_edge(edge(1, 3, 2.0)); // e1
        graph.add_edge(edge(0, 2, 1.5)); // e2
        graph.add_edge(edge(2, 3, 1.0)); // e3
        graph.add_edge(edge(0, 3, 4.0)); // e4
        graph
    }

    #[test]
    fn test_picks_cheapest_path() {
        let graph = diamond();
        let router = Router::new(&graph);
        let route = router.build_route(&graph, 0, 3).unwrap();
        assert_eq!(route.weight, 2.5);
        assert_eq!(route.edges, vec![2, 3]);
    }

    #[test]
    fn test_direct_edge_when_cheapest() {
        let mut graph = PathGraph::new(2);
        graph.add_edge(edge(0, 1, 0.5));
        let router = Router::new(&graph);
        let route = router.build_route(&graph, 0, 1).unwrap();
        assert_eq!(route.weight, 0.5);
        assert_eq!(route.edges, vec![0]);
    }

    #[test]
    fn test_parallel_edges_keep_lowest_id_on_tie() {
        let mut graph = PathGraph::new(2);
        graph.add_edge(edge(0, 1, 1.0)); // e0
        graph.add_edge(edge(0, 1, 1.0)); // e1, same weight
        let router = Router::new(&graph);
        let route = router.build_route(&graph, 0, 1).unwrap();
        assert_eq!(route.edges, vec![0]);
    }

    #[test]
    fn test_unreachable_is_none() {
        let graph = diamond();
        let router = Router::new(&graph);
        assert!(router.build_route(&graph, 0, 4).is_none());
        // edges are directed
        assert!(router.build_route(&graph, 3, 0).is_none());
    }

    #[test]
    fn test_self_route_is_empty_not_none() {
        let graph = diamond();
        let router = Router::new(&graph);
        let route = router.build_route(&graph, 2, 2).unwrap();
        assert_eq!(route.weight, 0.0);
        assert!(route.edges.is_empty());
    }

    #[test]
    fn test_table_round_trip() {
        let graph = diamond();
        let router = Router::new(&graph);
        let rebuilt = Router::from_table(router.table().to_vec());
        assert_eq!(
            rebuilt.build_route(&graph, 0, 3),
            router.build_route(&graph, 0, 3)
        );
    }
}
