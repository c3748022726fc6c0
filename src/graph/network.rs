use log::debug;

use crate::models::{Job, TimeStep, Work};
use crate::utils::constants::EPSILON;

pub type NodeId = usize;
pub type EdgeId = usize;

/// What a node of the network stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Source,
    Job(usize),   // Index into the job list
    Frame(usize), // Frame number
    Sink,
}

/// A directed edge together with its residual twin.
///
/// Every edge added through [`FlowNetwork::add_edge`] is stored next to a reverse
/// edge of capacity zero, so `edge ^ 1` is always the twin.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub capacity: Work,
    pub flow: Work,
}

impl Edge {
    pub fn residual(&self) -> Work {
        self.capacity - self.flow
    }
}

/// Capacitated network `source -> jobs -> frames -> sink` stored as index arenas.
///
/// Node layout: `0` is the source, jobs follow in input order, then frames, then the sink.
#[derive(Debug, Clone)]
pub struct FlowNetwork {
    edges: Vec<Edge>,
    adjacency: Vec<Vec<EdgeId>>, // Outgoing edges (forward and residual) in insertion order
    job_count: usize,
    frame_count: usize,
    job_edges: Vec<Vec<(usize, EdgeId)>>, // Per job: (frame, job -> frame edge)
}

impl FlowNetwork {
    /// Creates a network with all nodes and no edges.
    pub fn with_nodes(job_count: usize, frame_count: usize) -> Self {
        Self {
            edges: Vec::new(),
            adjacency: vec![Vec::new(); job_count + frame_count + 2],
            job_count,
            frame_count,
            job_edges: vec![Vec::new(); job_count],
        }
    }

    /// Builds the assignment network of a job list.
    ///
    /// Edges are inserted source -> job first, then job -> frame per job in frame
    /// order, then frame -> sink. A job without eligible frame only gets its source
    /// edge and can never receive flow.
    pub fn build(jobs: &[Job], frame_count: usize, frame_size: TimeStep) -> Self {
        let mut network = Self::with_nodes(jobs.len(), frame_count);
        let source = network.node(NodeKind::Source);
        let frame_capacity = frame_size as Work;

        for (index, job) in jobs.iter().enumerate() {
            let job_node = network.node(NodeKind::Job(index));
            network.add_edge(source, job_node, job.requirement());
        }

        for (index, job) in jobs.iter().enumerate() {
            let job_node = network.node(NodeKind::Job(index));
            let capacity = frame_capacity.min(job.requirement());
            for frame in job.eligible_frames().filter(|&f| f < frame_count) {
                let frame_node = network.node(NodeKind::Frame(frame));
                let edge = network.add_edge(job_node, frame_node, capacity);
                network.job_edges[index].push((frame, edge));
            }
        }

        let sink = network.node(NodeKind::Sink);
        for frame in 0..frame_count {
            let frame_node = network.node(NodeKind::Frame(frame));
            network.add_edge(frame_node, sink, frame_capacity);
        }

        debug!(
            "flow network: {} nodes, {} edges",
            network.node_count(),
            network.edges.len() / 2
        );

        network
    }

    pub fn node(&self, kind: NodeKind) -> NodeId {
        match kind {
            NodeKind::Source => 0,
            NodeKind::Job(index) => 1 + index,
            NodeKind::Frame(frame) => 1 + self.job_count + frame,
            NodeKind::Sink => 1 + self.job_count + self.frame_count,
        }
    }

    pub fn kind(&self, node: NodeId) -> NodeKind {
        if node == 0 {
            NodeKind::Source
        } else if node <= self.job_count {
            NodeKind::Job(node - 1)
        } else if node <= self.job_count + self.frame_count {
            NodeKind::Frame(node - 1 - self.job_count)
        } else {
            NodeKind::Sink
        }
    }

    pub fn source(&self) -> NodeId {
        self.node(NodeKind::Source)
    }

    pub fn sink(&self) -> NodeId {
        self.node(NodeKind::Sink)
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn job_count(&self) -> usize {
        self.job_count
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Adds `from -> to` with the given capacity and its zero-capacity twin.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, capacity: Work) -> EdgeId {
        let id = self.edges.len();
        self.edges.push(Edge { from, to, capacity, flow: 0.0 });
        self.edges.push(Edge { from: to, to: from, capacity: 0.0, flow: 0.0 });
        self.adjacency[from].push(id);
        self.adjacency[to].push(id + 1);
        id
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    pub fn outgoing(&self, node: NodeId) -> &[EdgeId] {
        &self.adjacency[node]
    }

    /// Pushes `amount` along an edge, updating its twin.
    pub fn push(&mut self, id: EdgeId, amount: Work) {
        self.edges[id].flow += amount;
        self.edges[id ^ 1].flow -= amount;
    }

    /// `(frame, flow)` for every job -> frame edge of a job, in frame order.
    pub fn job_flows(&self, job: usize) -> impl Iterator<Item = (usize, Work)> + '_ {
        self.job_edges[job].iter().map(move |&(frame, edge)| (frame, self.edges[edge].flow))
    }

    /// Sum of flow entering a node over forward edges.
    pub fn inflow(&self, node: NodeId) -> Work {
        self.forward_edges().filter(|e| e.to == node).map(|e| e.flow).sum()
    }

    /// Sum of flow leaving a node over forward edges.
    pub fn outflow(&self, node: NodeId) -> Work {
        self.forward_edges().filter(|e| e.from == node).map(|e| e.flow).sum()
    }

    /// Whether inflow equals outflow at every inner node and no edge is over capacity.
    pub fn is_valid_flow(&self) -> bool {
        let conserved = (0..self.node_count())
            .filter(|&n| n != self.source() && n != self.sink())
            .all(|n| (self.inflow(n) - self.outflow(n)).abs() <= EPSILON * self.edges.len() as f64);

        conserved
            && self
                .forward_edges()
                .all(|e| e.flow >= -EPSILON && e.flow <= e.capacity + EPSILON)
    }

    fn forward_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().step_by(2)
    }
}
