//! Sub-graphs carved out of a parent graph by an edge subset

use crate::error::{Error, Result};
use crate::geometry;
use crate::graph::{Edge, Graph, Node};
use crate::ids::{EdgeId, NodeId};
use geo::{ConvexHull, Coord, MultiPoint, Point, Polygon};
use std::collections::{BTreeSet, HashMap};

/// A graph derived from a parent graph, with two-way id tables
///
/// Nodes and edges keep every attribute of their parent counterparts but are
/// renumbered densely; the parent is never touched.
#[derive(Debug, Clone, Default)]
pub struct SubGraph {
    graph: Graph,
    node_parent: Vec<NodeId>,
    edge_parent: Vec<EdgeId>,
    node_child: HashMap<NodeId, NodeId>,
}

impl SubGraph {
    /// Derive the sub-graph spanned by `edges` of `parent`
    pub fn derive(parent: &Graph, edges: impl IntoIterator<Item = EdgeId>) -> Result<Self> {
        let selected: BTreeSet<EdgeId> = edges.into_iter().collect();

        let mut nodes: Vec<Node> = Vec::new();
        let mut node_parent = Vec::new();
        let mut node_child = HashMap::new();
        let mut child_edges: Vec<Edge> = Vec::with_capacity(selected.len());
        let mut edge_parent = Vec::with_capacity(selected.len());

        for parent_edge_id in selected {
            let parent_edge = parent.try_edge(parent_edge_id)?;

            let mut child_endpoint = |parent_id: NodeId| -> Result<NodeId> {
                if let Some(&child) = node_child.get(&parent_id) {
                    return Ok(child);
                }
                let child = NodeId::new(nodes.len());
                let mut node = parent.try_node(parent_id)?.clone();
                node.id = child;
                nodes.push(node);
                node_parent.push(parent_id);
                node_child.insert(parent_id, child);
                Ok(child)
            };

            let from = child_endpoint(parent_edge.from)?;
            let to = child_endpoint(parent_edge.to)?;

            let child_id = EdgeId::new(child_edges.len());
            let mut edge = parent_edge.clone();
            edge.id = child_id;
            edge.from = from;
            edge.to = to;
            child_edges.push(edge);
            edge_parent.push(parent_edge_id);
        }

        Ok(Self {
            graph: Graph::new(nodes, child_edges)?,
            node_parent,
            edge_parent,
            node_child,
        })
    }

    /// Sub-graph of the edges lying inside the convex hull around `nodes`
    ///
    /// The hull is grown by `buffer` metres in every direction so that the
    /// corner nodes themselves keep some surrounding streets.
    pub fn within_hull(parent: &Graph, nodes: &[NodeId], buffer: f64) -> Result<Self> {
        let hull = Self::buffered_hull(parent, nodes, buffer)?;
        let edges = parent.edges().iter().filter(|e| {
            let inside = |id: NodeId| {
                parent
                    .node(id)
                    .map_or(false, |n| geometry::covers(&hull, n.coord))
            };
            inside(e.from) && inside(e.to)
        });
        Self::derive(parent, edges.map(|e| e.id).collect::<Vec<_>>())
    }

    fn buffered_hull(parent: &Graph, nodes: &[NodeId], buffer: f64) -> Result<Polygon<f64>> {
        const DIRECTIONS: usize = 8;
        let mut points: Vec<Point<f64>> = Vec::with_capacity(nodes.len() * DIRECTIONS);
        for &id in nodes {
            let centre = parent.try_node(id)?.coord;
            for k in 0..DIRECTIONS {
                let angle = (k as f64 * 360.0 / DIRECTIONS as f64).to_radians();
                points.push(Point::from(Coord {
                    x: centre.x + buffer * angle.cos(),
                    y: centre.y + buffer * angle.sin(),
                }));
            }
        }
        if points.is_empty() {
            return Err(Error::InvalidWorld("convex hull needs at least one node".to_string()));
        }
        Ok(MultiPoint::new(points).convex_hull())
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn parent_node(&self, child: NodeId) -> Option<NodeId> {
        self.node_parent.get(child.index()).copied()
    }

    pub fn parent_edge(&self, child: EdgeId) -> Option<EdgeId> {
        self.edge_parent.get(child.index()).copied()
    }

    pub fn child_node(&self, parent: NodeId) -> Option<NodeId> {
        self.node_child.get(&parent).copied()
    }

    pub fn contains_parent_node(&self, parent: NodeId) -> bool {
        self.node_child.contains_key(&parent)
    }

    pub fn is_empty(&self) -> bool {
        self.graph.edge_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    fn create_test_graph() -> Graph {
        // 0 - 1 - 2 - 3 along the x axis, plus 4 far away above 3
        let nodes = vec![
            Node::new(NodeId(0), c(0.0, 0.0)).with_centrality(0.2),
            Node::new(NodeId(1), c(10.0, 0.0)).with_centrality(0.4),
            Node::new(NodeId(2), c(20.0, 0.0)).with_centrality(0.6),
            Node::new(NodeId(3), c(30.0, 0.0)).with_centrality(0.8),
            Node::new(NodeId(4), c(30.0, 500.0)).with_centrality(1.0),
        ];
        let edges = vec![
            Edge::new(EdgeId(0), NodeId(0), NodeId(1), 10.0),
            Edge::new(EdgeId(1), NodeId(1), NodeId(2), 10.0),
            Edge::new(EdgeId(2), NodeId(2), NodeId(3), 10.0),
            Edge::new(EdgeId(3), NodeId(3), NodeId(4), 500.0),
        ];
        Graph::new(nodes, edges).unwrap()
    }

    #[test]
    fn test_derive_maps_both_ways() {
        let parent = create_test_graph();
        let sub = SubGraph::derive(&parent, [EdgeId(2), EdgeId(1)]).unwrap();
        // children are numbered in ascending parent order
        assert_eq!(sub.parent_edge(EdgeId(0)), Some(EdgeId(1)));
        assert_eq!(sub.parent_edge(EdgeId(2)), None);

        assert_eq!(sub.graph().edge_count(), 2);
        assert_eq!(sub.graph().node_count(), 3);

        for child in sub.graph().nodes() {
            let parent_id = sub.parent_node(child.id).unwrap();
            assert_eq!(sub.child_node(parent_id), Some(child.id));
            // attributes survive the copy
            assert_eq!(child.centrality, parent.node(parent_id).unwrap().centrality);
        }
        for child in sub.graph().edges() {
            let parent_id = sub.parent_edge(child.id).unwrap();
            let parent_edge = parent.edge(parent_id).unwrap();
            assert_eq!(sub.parent_node(child.from), Some(parent_edge.from));
            assert_eq!(sub.parent_node(child.to), Some(parent_edge.to));
        }

        assert!(!sub.contains_parent_node(NodeId(0)));
        assert!(sub.contains_parent_node(NodeId(3)));
        // parent untouched
        assert_eq!(parent.edge_count(), 4);
    }

    #[test]
    fn test_within_hull_excludes_distant_edges() {
        let parent = create_test_graph();
        let sub = SubGraph::within_hull(&parent, &[NodeId(0), NodeId(3)], 5.0).unwrap();
        assert_eq!(sub.graph().edge_count(), 3);
        assert!(sub.graph().edges().iter().all(|e| sub.parent_edge(e.id) != Some(EdgeId(3))));
        assert!(!sub.contains_parent_node(NodeId(4)));
    }

    #[test]
    fn test_unknown_edge_is_error() {
        let parent = create_test_graph();
        assert!(matches!(
            SubGraph::derive(&parent, [EdgeId(42)]),
            Err(Error::EdgeNotFound(EdgeId(42)))
        ));
    }
}
