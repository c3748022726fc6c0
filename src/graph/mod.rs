//! Flow network construction and the Edmonds-Karp max-flow solver.

pub mod edmonds_karp;
pub mod network;

pub use edmonds_karp::{max_flow, MaxFlow};
pub use network::{Edge, EdgeId, FlowNetwork, NodeId, NodeKind};
