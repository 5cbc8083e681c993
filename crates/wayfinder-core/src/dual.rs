//! Dual graph derivation: street segments become nodes, turns become edges

use crate::error::Result;
use crate::geometry;
use crate::graph::{Edge, Graph, Node};
use crate::ids::{EdgeId, NodeId};

/// Dual representation of a primal graph plus its primal-edge id tables
#[derive(Debug, Clone, Default)]
pub struct DualGraph {
    pub graph: Graph,
    /// Dual node standing for each primal edge, indexed by primal edge
    pub node_of_edge: Vec<NodeId>,
    /// Primal edge behind each dual node, indexed by dual node
    pub edge_of_node: Vec<EdgeId>,
}

impl DualGraph {
    /// Build the dual of `primal`
    ///
    /// Every pair of segments meeting at a junction is joined by a dual edge
    /// whose `deflection` is the heading change through that junction and
    /// whose `length` is the distance between the two segment midpoints.
    pub fn derive(primal: &Graph) -> Result<Self> {
        let mut nodes = Vec::with_capacity(primal.edge_count());
        let mut node_of_edge = Vec::with_capacity(primal.edge_count());
        let mut edge_of_node = Vec::with_capacity(primal.edge_count());

        for edge in primal.edges() {
            let from = primal.try_node(edge.from)?;
            let to = primal.try_node(edge.to)?;
            let id = NodeId::new(nodes.len());
            let mut node = Node::new(id, geometry::midpoint(from.coord, to.coord));
            node.region = edge.region;
            nodes.push(node);
            node_of_edge.push(id);
            edge_of_node.push(edge.id);
        }

        let mut edges = Vec::new();
        for junction in primal.nodes() {
            let incident = primal.incident_edges(junction.id);
            for (i, &a) in incident.iter().enumerate() {
                for &b in &incident[i + 1..] {
                    let (ea, eb) = (primal.try_edge(a)?, primal.try_edge(b)?);
                    let (Some(far_a), Some(far_b)) = (ea.opposite(junction.id), eb.opposite(junction.id)) else {
                        continue;
                    };
                    let far_a = primal.try_node(far_a)?.coord;
                    let far_b = primal.try_node(far_b)?.coord;

                    let (na, nb) = (node_of_edge[a.index()], node_of_edge[b.index()]);
                    let length = geometry::distance(nodes[na.index()].coord, nodes[nb.index()].coord);
                    let mut turn = Edge::new(EdgeId::new(edges.len()), na, nb, length);
                    turn.deflection = geometry::deflection(far_a, junction.coord, far_b);
                    turn.region = match (ea.region, eb.region) {
                        (Some(ra), Some(rb)) if ra == rb => Some(ra),
                        _ => None,
                    };
                    edges.push(turn);
                }
            }
        }

        tracing::debug!(
            "Derived dual graph: {} segment nodes, {} turn edges",
            nodes.len(),
            edges.len()
        );

        Ok(Self {
            graph: Graph::new(nodes, edges)?,
            node_of_edge,
            edge_of_node,
        })
    }
}
