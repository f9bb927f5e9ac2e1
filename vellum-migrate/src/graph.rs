//! Dependency graph over migration descriptors.

use std::collections::HashSet;
use std::collections::VecDeque;

use indexmap::IndexMap;
use vellum_schema::{IdentityToken, MigrationDescriptor};

use crate::error::{MigrateResult, MigrationError};

/// A node wrapping one descriptor, keyed by its identity in the node table.
#[derive(Debug)]
struct DependencyNode {
    descriptor: MigrationDescriptor,
    in_degree: usize,
    out_degree: usize,
    /// Indices of successor nodes, in edge-insertion order.
    successors: Vec<usize>,
}

impl DependencyNode {
    fn new(descriptor: MigrationDescriptor) -> Self {
        Self {
            descriptor,
            in_degree: 0,
            out_degree: 0,
            successors: Vec::new(),
        }
    }
}

/// A directed graph of "pre must execute before post" relationships between
/// migrations.
///
/// A graph instance belongs to one planning session: build it with
/// [`add_dependency`](Self::add_dependency), consume it with
/// [`compute_order`](Self::compute_order), then drop it. There is no node or
/// edge removal, and mutation takes `&mut self` so concurrent building needs
/// external synchronization.
///
/// Edges form a set, not a multiset: adding the same (pre, post) pair twice
/// leaves degrees and adjacency untouched, so degree counts always reflect
/// distinct dependencies.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Node table in insertion order; the order seeds the FIFO tie-break of
    /// the topological sort.
    nodes: IndexMap<IdentityToken, DependencyNode>,
    /// Distinct (pre, post) index pairs already recorded.
    edges: HashSet<(usize, usize)>,
}

impl DependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of migrations known to the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph holds no migrations.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether a migration with the given identity is in the graph.
    pub fn contains(&self, identity: &IdentityToken) -> bool {
        self.nodes.contains_key(identity)
    }

    /// Number of distinct dependencies pointing at the given migration.
    pub fn in_degree(&self, identity: &IdentityToken) -> Option<usize> {
        self.nodes.get(identity).map(|node| node.in_degree)
    }

    /// Number of distinct dependencies departing from the given migration.
    pub fn out_degree(&self, identity: &IdentityToken) -> Option<usize> {
        self.nodes.get(identity).map(|node| node.out_degree)
    }

    /// Declare that `pre` must execute before `post`.
    ///
    /// Both descriptors get a node on first sight, keyed by identity. A pair
    /// that was already declared is a no-op.
    pub fn add_dependency(&mut self, pre: &MigrationDescriptor, post: &MigrationDescriptor) {
        let pre_index = self.ensure_node(pre);
        let post_index = self.ensure_node(post);

        if !self.edges.insert((pre_index, post_index)) {
            return;
        }

        self.nodes[pre_index].successors.push(post_index);
        self.nodes[pre_index].out_degree += 1;
        self.nodes[post_index].in_degree += 1;
    }

    /// Compute a valid execution order via Kahn's algorithm.
    ///
    /// Ties break FIFO: initially-free nodes enter the queue in node-insertion
    /// order, nodes freed during relaxation in discovery order. An empty graph
    /// yields an empty order.
    ///
    /// If any migration cannot be ordered, a cycle exists among the remainder
    /// and [`MigrationError::CycleDetected`] is returned carrying the
    /// identities left unordered.
    pub fn compute_order(&self) -> MigrateResult<Vec<MigrationDescriptor>> {
        let mut in_degrees: Vec<usize> = self.nodes.values().map(|node| node.in_degree).collect();

        let mut queue: VecDeque<usize> = in_degrees
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(index, _)| index)
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        let mut ordered = vec![false; self.nodes.len()];

        while let Some(index) = queue.pop_front() {
            ordered[index] = true;
            order.push(self.nodes[index].descriptor.clone());

            for &successor in &self.nodes[index].successors {
                in_degrees[successor] -= 1;
                if in_degrees[successor] == 0 {
                    queue.push_back(successor);
                }
            }
        }

        if order.len() != self.nodes.len() {
            let remaining = self
                .nodes
                .keys()
                .enumerate()
                .filter(|(index, _)| !ordered[*index])
                .map(|(_, identity)| identity.clone())
                .collect();
            return Err(MigrationError::CycleDetected { remaining });
        }

        Ok(order)
    }

    fn ensure_node(&mut self, descriptor: &MigrationDescriptor) -> usize {
        let identity = descriptor.identity();
        if let Some(index) = self.nodes.get_index_of(&identity) {
            return index;
        }
        self.nodes
            .insert_full(identity, DependencyNode::new(descriptor.clone()))
            .0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vellum_schema::{ExtensionId, MigrationParameters};

    fn descriptor(name: &str) -> MigrationDescriptor {
        MigrationDescriptor::new(
            ExtensionId::new("org.example.blog").with_version("2.1"),
            name,
            format!("migration {name}"),
            MigrationParameters::Document {
                reference: format!("Blog.{name}"),
                delete_children: false,
            },
        )
    }

    fn names(order: &[MigrationDescriptor]) -> Vec<&str> {
        order.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_empty_graph_yields_empty_order() {
        let graph = DependencyGraph::new();
        assert!(graph.is_empty());
        assert_eq!(graph.compute_order().unwrap(), Vec::new());
    }

    #[test]
    fn test_nodes_created_on_first_sight() {
        let mut graph = DependencyGraph::new();
        let a = descriptor("a");
        let b = descriptor("b");
        graph.add_dependency(&a, &b);

        assert_eq!(graph.len(), 2);
        assert!(graph.contains(&a.identity()));
        assert_eq!(graph.in_degree(&b.identity()), Some(1));
        assert_eq!(graph.out_degree(&a.identity()), Some(1));
        assert_eq!(graph.out_degree(&b.identity()), Some(0));
    }

    #[test]
    fn test_duplicate_edges_are_deduplicated() {
        let mut graph = DependencyGraph::new();
        let a = descriptor("a");
        let b = descriptor("b");
        graph.add_dependency(&a, &b);
        graph.add_dependency(&a, &b);

        assert_eq!(graph.in_degree(&b.identity()), Some(1));
        assert_eq!(graph.out_degree(&a.identity()), Some(1));
        assert_eq!(names(&graph.compute_order().unwrap()), vec!["a", "b"]);
    }

    #[test]
    fn test_diamond_orders_fifo() {
        // 1 -> 2, 1 -> 3, 2 -> 3, 2 -> 4, 3 -> 4 must order exactly 1,2,3,4.
        let mut graph = DependencyGraph::new();
        let m1 = descriptor("1");
        let m2 = descriptor("2");
        let m3 = descriptor("3");
        let m4 = descriptor("4");
        graph.add_dependency(&m1, &m2);
        graph.add_dependency(&m1, &m3);
        graph.add_dependency(&m2, &m3);
        graph.add_dependency(&m2, &m4);
        graph.add_dependency(&m3, &m4);

        assert_eq!(names(&graph.compute_order().unwrap()), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_initially_free_nodes_keep_insertion_order() {
        let mut graph = DependencyGraph::new();
        let a = descriptor("a");
        let b = descriptor("b");
        let c = descriptor("c");
        let d = descriptor("d");
        // Two independent chains; roots a and c were inserted in that order.
        graph.add_dependency(&a, &b);
        graph.add_dependency(&c, &d);

        assert_eq!(names(&graph.compute_order().unwrap()), vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn test_order_respects_every_edge() {
        let mut graph = DependencyGraph::new();
        let descriptors: Vec<_> = ["a", "b", "c", "d", "e"].iter().map(|n| descriptor(n)).collect();
        let edges = [(0, 2), (1, 2), (2, 3), (1, 4), (4, 3)];
        for (pre, post) in edges {
            graph.add_dependency(&descriptors[pre], &descriptors[post]);
        }

        let order = graph.compute_order().unwrap();
        let position = |descriptor: &MigrationDescriptor| {
            order
                .iter()
                .position(|d| d.identity() == descriptor.identity())
                .unwrap()
        };
        for (pre, post) in edges {
            assert!(position(&descriptors[pre]) < position(&descriptors[post]));
        }
    }

    #[test]
    fn test_three_node_cycle_reports_all_members() {
        let mut graph = DependencyGraph::new();
        let a = descriptor("a");
        let b = descriptor("b");
        let c = descriptor("c");
        graph.add_dependency(&a, &b);
        graph.add_dependency(&b, &c);
        graph.add_dependency(&c, &a);

        match graph.compute_order() {
            Err(MigrationError::CycleDetected { remaining }) => {
                assert_eq!(remaining.len(), 3);
                for descriptor in [&a, &b, &c] {
                    assert!(remaining.contains(&descriptor.identity()));
                }
            }
            other => panic!("expected CycleDetected, got {other:?}"),
        }
    }

    #[test]
    fn test_cycle_remainder_excludes_orderable_nodes() {
        let mut graph = DependencyGraph::new();
        let a = descriptor("a");
        let b = descriptor("b");
        let c = descriptor("c");
        let standalone = descriptor("standalone");
        graph.add_dependency(&a, &b);
        graph.add_dependency(&b, &c);
        graph.add_dependency(&c, &a);
        graph.add_dependency(&standalone, &a);

        match graph.compute_order() {
            Err(MigrationError::CycleDetected { remaining }) => {
                assert_eq!(remaining.len(), 3);
                assert!(!remaining.contains(&standalone.identity()));
            }
            other => panic!("expected CycleDetected, got {other:?}"),
        }
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let mut graph = DependencyGraph::new();
        let a = descriptor("a");
        graph.add_dependency(&a, &a);

        assert!(matches!(
            graph.compute_order(),
            Err(MigrationError::CycleDetected { remaining }) if remaining.len() == 1
        ));
    }
}
