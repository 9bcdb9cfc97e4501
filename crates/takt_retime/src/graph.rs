//! Weighted circuit graph and retiming vector data structures.
//!
//! The [`CircuitGraph`] is the retiming engine's view of one module: nodes
//! carry propagation delay, directed edges carry a register count and the
//! concrete wire [`Connection`]s they stand for. Register primitives never
//! appear as nodes; they exist purely as edge weight.
//!
//! A [`Retiming`] assigns each node an integer lag. The graph itself is
//! never mutated by retiming; retimed edge weights are derived on the fly
//! from the lags and materialized only by the applicator.

use crate::error::RetimeError;
use crate::ids::{GraphEdgeId, GraphNodeId};
use serde::{Deserialize, Serialize};
use takt_netlist::{Connection, NodeId};

/// A weighted directed graph over the non-register nodes of one module.
///
/// Nodes and edges live in flat arenas addressed by [`GraphNodeId`] /
/// [`GraphEdgeId`]. Adjacency side tables are maintained at insertion so
/// incoming and outgoing edge lookups are index reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CircuitGraph {
    /// All nodes in the graph.
    pub nodes: Vec<CircuitNode>,
    /// All directed edges in the graph.
    pub edges: Vec<CircuitEdge>,
    outgoing: Vec<Vec<GraphEdgeId>>,
    incoming: Vec<Vec<GraphEdgeId>>,
}

impl CircuitGraph {
    /// Creates an empty circuit graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node with the given propagation delay and returns its ID.
    pub fn add_node(&mut self, name: String, node: NodeId, weight: u64) -> GraphNodeId {
        let id = GraphNodeId::from_raw(self.nodes.len() as u32);
        self.nodes.push(CircuitNode {
            id,
            name,
            node,
            weight,
        });
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        id
    }

    /// Adds a directed edge carrying `weight` registers and returns its ID.
    ///
    /// A self-loop with weight 0 is a combinational short and is rejected as
    /// a [`RetimeError::CombinationalCycle`].
    pub fn add_edge(
        &mut self,
        from: GraphNodeId,
        to: GraphNodeId,
        weight: u32,
        payload: Vec<Connection>,
    ) -> Result<GraphEdgeId, RetimeError> {
        if from == to && weight == 0 {
            return Err(RetimeError::CombinationalCycle {
                nodes: vec![self.node(from).name.clone()],
            });
        }
        let id = GraphEdgeId::from_raw(self.edges.len() as u32);
        self.edges.push(CircuitEdge {
            id,
            from,
            to,
            weight,
            payload,
        });
        self.outgoing[from.as_raw() as usize].push(id);
        self.incoming[to.as_raw() as usize].push(id);
        Ok(id)
    }

    /// Returns the node with the given ID.
    pub fn node(&self, id: GraphNodeId) -> &CircuitNode {
        &self.nodes[id.as_raw() as usize]
    }

    /// Returns the edge with the given ID.
    pub fn edge(&self, id: GraphEdgeId) -> &CircuitEdge {
        &self.edges[id.as_raw() as usize]
    }

    /// Returns the IDs of all edges originating at the given node.
    pub fn outgoing_edges(&self, node: GraphNodeId) -> &[GraphEdgeId] {
        &self.outgoing[node.as_raw() as usize]
    }

    /// Returns the IDs of all edges arriving at the given node.
    pub fn incoming_edges(&self, node: GraphNodeId) -> &[GraphEdgeId] {
        &self.incoming[node.as_raw() as usize]
    }

    /// Returns the total number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the total number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// A node in the weighted circuit graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitNode {
    /// The unique ID of this node within its graph.
    pub id: GraphNodeId,
    /// Human-readable name, resolved from the netlist node.
    pub name: String,
    /// The underlying netlist node this graph node wraps.
    pub node: NodeId,
    /// Propagation delay of this node, in abstract time units.
    pub weight: u64,
}

/// A directed edge in the weighted circuit graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitEdge {
    /// The unique ID of this edge within its graph.
    pub id: GraphEdgeId,
    /// The source node of this edge.
    pub from: GraphNodeId,
    /// The destination node of this edge.
    pub to: GraphNodeId,
    /// Number of registers currently on this connection.
    pub weight: u32,
    /// The concrete wire connections this edge stands for, reattached by
    /// the applicator after registers are relocated.
    pub payload: Vec<Connection>,
}

/// A per-node lag assignment describing a relocation of registers.
///
/// An edge `u -> v` with weight `w` carries `w + lag(v) - lag(u)` registers
/// under the retiming. The assignment is legal iff that value is
/// non-negative for every edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Retiming {
    lags: Vec<i64>,
}

impl Retiming {
    /// Creates the identity retiming (all lags zero) for the given graph.
    pub fn identity(graph: &CircuitGraph) -> Self {
        Self {
            lags: vec![0; graph.node_count()],
        }
    }

    /// Creates a retiming from an explicit lag vector, one entry per node
    /// in ID order.
    pub fn from_lags(lags: Vec<i64>) -> Self {
        Self { lags }
    }

    /// Returns the lag of the given node.
    pub fn lag(&self, node: GraphNodeId) -> i64 {
        self.lags[node.as_raw() as usize]
    }

    /// Increments the lag of the given node, pulling one register backward
    /// across it.
    pub(crate) fn increment(&mut self, node: GraphNodeId) {
        self.lags[node.as_raw() as usize] += 1;
    }

    /// Returns the number of registers the given edge carries under this
    /// retiming. Negative values indicate an illegal assignment.
    pub fn retimed_weight(&self, edge: &CircuitEdge) -> i64 {
        i64::from(edge.weight) + self.lag(edge.to) - self.lag(edge.from)
    }

    /// Returns `true` if every edge carries a non-negative register count
    /// under this retiming.
    pub fn is_legal(&self, graph: &CircuitGraph) -> bool {
        graph.edges.iter().all(|e| self.retimed_weight(e) >= 0)
    }
}
