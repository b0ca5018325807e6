//! Undirected contact networks.
//!
//! Nodes are `0..n`, backed by a petgraph [`UnGraph`] whose node indices
//! coincide with node ids. No self-loops, no parallel edges.

use petgraph::graph::{NodeIndex, UnGraph};

use super::rng::SimRng;
use crate::error::{SimError, SimResult};

/// Undirected simple graph over a fixed population.
#[derive(Debug, Clone)]
pub struct ContactGraph {
    graph: UnGraph<(), ()>,
}

impl ContactGraph {
    /// Graph with `n` isolated nodes.
    #[must_use]
    pub fn empty(n: usize) -> Self {
        let mut graph = UnGraph::with_capacity(n, 0);
        for _ in 0..n {
            graph.add_node(());
        }
        Self { graph }
    }

    /// Graph with every pair of distinct nodes connected.
    #[must_use]
    pub fn complete(n: usize) -> Self {
        let mut contacts = Self::empty(n);
        for u in 0..n {
            for v in (u + 1)..n {
                contacts.connect(u, v);
            }
        }
        contacts
    }

    /// Erdős–Rényi `G(n, p)` graph.
    ///
    /// Every unordered pair `{u, v}` is connected independently with
    /// probability `p`. `p <= 0` yields [`ContactGraph::empty`] and `p >= 1`
    /// yields [`ContactGraph::complete`] without consuming randomness.
    ///
    /// # Errors
    ///
    /// Returns an error if `p` is NaN.
    pub fn erdos_renyi(n: usize, p: f64, rng: &mut SimRng) -> SimResult<Self> {
        if p.is_nan() {
            return Err(SimError::NonFiniteValue {
                location: "edge probability".to_string(),
            });
        }
        if p <= 0.0 {
            return Ok(Self::empty(n));
        }
        if p >= 1.0 {
            return Ok(Self::complete(n));
        }

        let mut contacts = Self::empty(n);
        for u in 0..n {
            for v in (u + 1)..n {
                if rng.gen_bool(p) {
                    contacts.connect(u, v);
                }
            }
        }
        Ok(contacts)
    }

    /// Graph over `n` nodes with exactly the listed edges.
    #[cfg(test)]
    pub(crate) fn from_edges(n: usize, edges: &[(usize, usize)]) -> Self {
        let mut contacts = Self::empty(n);
        for &(u, v) in edges {
            contacts.connect(u, v);
        }
        contacts
    }

    // Callers visit each unordered pair once, so no duplicate check.
    fn connect(&mut self, u: usize, v: usize) {
        self.graph.add_edge(NodeIndex::new(u), NodeIndex::new(v), ());
    }

    /// Neighbours of `u` (none for unknown nodes).
    pub fn neighbors(&self, u: usize) -> impl Iterator<Item = usize> + '_ {
        self.graph.neighbors(NodeIndex::new(u)).map(NodeIndex::index)
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use petgraph::visit::EdgeRef;

    fn linked(g: &ContactGraph, u: usize, v: usize) -> bool {
        g.graph
            .find_edge(NodeIndex::new(u), NodeIndex::new(v))
            .is_some()
    }

    fn edge_list(g: &ContactGraph) -> Vec<(usize, usize)> {
        let mut edges: Vec<(usize, usize)> = g
            .graph
            .edge_references()
            .map(|e| {
                let (a, b) = (e.source().index(), e.target().index());
                (a.min(b), a.max(b))
            })
            .collect();
        edges.sort_unstable();
        edges
    }

    #[test]
    fn test_empty_graph() {
        let g = ContactGraph::empty(5);
        assert_eq!(g.node_count(), 5);
        assert_eq!(g.edge_count(), 0);
        assert_eq!(g.neighbors(3).count(), 0);
    }

    #[test]
    fn test_complete_graph() {
        let g = ContactGraph::complete(5);
        assert_eq!(g.edge_count(), 10);
        assert_eq!(g.neighbors(0).count(), 4);
        assert!(linked(&g, 1, 4));
        assert!(linked(&g, 4, 1));
        assert!(!linked(&g, 2, 2));
    }

    #[test]
    fn test_unknown_node_has_no_neighbors() {
        let g = ContactGraph::complete(3);
        assert_eq!(g.neighbors(7).count(), 0);
    }

    #[test]
    fn test_from_edges() {
        let g = ContactGraph::from_edges(4, &[(2, 0), (2, 1)]);
        let mut around = g.neighbors(2).collect::<Vec<_>>();
        around.sort_unstable();
        assert_eq!(around, vec![0, 1]);
        assert_eq!(g.neighbors(0).collect::<Vec<_>>(), vec![2]);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn test_erdos_renyi_degenerate_probabilities() {
        let mut rng = SimRng::new(42);
        assert_eq!(ContactGraph::erdos_renyi(6, 0.0, &mut rng).unwrap().edge_count(), 0);
        assert_eq!(ContactGraph::erdos_renyi(6, 1.0, &mut rng).unwrap().edge_count(), 15);
        assert_eq!(ContactGraph::erdos_renyi(6, -0.5, &mut rng).unwrap().edge_count(), 0);
    }

    #[test]
    fn test_erdos_renyi_rejects_nan() {
        let mut rng = SimRng::new(42);
        assert!(ContactGraph::erdos_renyi(6, f64::NAN, &mut rng).is_err());
    }

    #[test]
    fn test_erdos_renyi_density_close_to_p() {
        let mut rng = SimRng::new(7);
        let g = ContactGraph::erdos_renyi(200, 0.05, &mut rng).unwrap();
        // 19_900 pairs; std of the density is about 0.0015
        let density = g.edge_count() as f64 / 19_900.0;
        assert!((density - 0.05).abs() < 0.01, "density = {density}");
    }

    #[test]
    fn test_erdos_renyi_is_symmetric_and_simple() {
        let mut rng = SimRng::new(11);
        let g = ContactGraph::erdos_renyi(40, 0.2, &mut rng).unwrap();
        let mut degree_sum = 0;
        for u in 0..g.node_count() {
            assert!(!linked(&g, u, u));
            let mut around: Vec<usize> = g.neighbors(u).collect();
            for &v in &around {
                assert!(linked(&g, v, u));
            }
            degree_sum += around.len();
            around.sort_unstable();
            around.dedup();
            assert_eq!(around.len(), g.neighbors(u).count(), "parallel edge at {u}");
        }
        assert_eq!(degree_sum, 2 * g.edge_count());
    }

    #[test]
    fn test_erdos_renyi_reproducible() {
        let a = ContactGraph::erdos_renyi(30, 0.1, &mut SimRng::new(5)).unwrap();
        let b = ContactGraph::erdos_renyi(30, 0.1, &mut SimRng::new(5)).unwrap();
        assert_eq!(edge_list(&a), edge_list(&b));
    }
}
