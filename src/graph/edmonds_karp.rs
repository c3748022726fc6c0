use std::collections::VecDeque;

use log::debug;

use super::network::{EdgeId, FlowNetwork, NodeId};
use crate::models::Work;
use crate::utils::constants::EPSILON;

/// Result of a max-flow computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxFlow {
    pub value: Work,         // Total flow leaving the source
    pub augmentations: usize, // Number of augmenting paths used
}

/// Computes a maximum flow from source to sink, in place.
///
/// Each round takes the shortest augmenting path found by a breadth-first search
/// over residual capacities. Edges are explored in insertion order, so the same
/// network always yields the same flow.
pub fn max_flow(network: &mut FlowNetwork) -> MaxFlow {
    let source = network.source();
    let sink = network.sink();
    let mut value = 0.0;
    let mut augmentations = 0;

    while let Some(path) = shortest_augmenting_path(network, source, sink) {
        let bottleneck = path
            .iter()
            .map(|&e| network.edge(e).residual())
            .fold(Work::INFINITY, Work::min);

        for &edge in path.iter() {
            network.push(edge, bottleneck);
        }

        value += bottleneck;
        augmentations += 1;
    }

    debug!("max flow {} after {} augmenting paths", value, augmentations);

    MaxFlow { value, augmentations }
}

/// Breadth-first search for a path with positive residual capacity.
///
/// # Returns
/// * `Option<Vec<EdgeId>>` - The edges of the path from source to sink, or `None`
///   once the sink is unreachable.
fn shortest_augmenting_path(network: &FlowNetwork, source: NodeId, sink: NodeId) -> Option<Vec<EdgeId>> {
    let mut parent: Vec<Option<EdgeId>> = vec![None; network.node_count()];
    let mut visited = vec![false; network.node_count()];
    let mut queue = VecDeque::new();

    visited[source] = true;
    queue.push_back(source);

    'search: while let Some(node) = queue.pop_front() {
        for &edge in network.outgoing(node) {
            let next = network.edge(edge).to;
            if visited[next] || network.edge(edge).residual() <= EPSILON {
                continue;
            }
            visited[next] = true;
            parent[next] = Some(edge);
            if next == sink {
                break 'search;
            }
            queue.push_back(next);
        }
    }

    if !visited[sink] {
        return None;
    }

    let mut path = Vec::new();
    let mut node = sink;
    while let Some(edge) = parent[node] {
        path.push(edge);
        node = network.edge(edge).from;
    }
    path.reverse();
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::network::NodeKind;
    use crate::models::{Job, JobId};

    #[test]
    fn test_textbook_network() {
        // 0 -> 1 (3), 0 -> 2 (2), 1 -> 2 (1), 1 -> 3 (2), 2 -> 3 (3)
        let mut network = FlowNetwork::with_nodes(1, 1);
        network.add_edge(0, 1, 3.0);
        network.add_edge(0, 2, 2.0);
        network.add_edge(1, 2, 1.0);
        network.add_edge(1, 3, 2.0);
        network.add_edge(2, 3, 3.0);

        let result = max_flow(&mut network);
        assert_eq!(result.value, 5.0);
        assert!(network.is_valid_flow());
    }

    #[test]
    fn test_single_job_single_frame() {
        let jobs = vec![Job::new(JobId::new(1, 0), 0, 12, 4.0, 0..1)];
        let mut network = FlowNetwork::build(&jobs, 1, 12);

        let result = max_flow(&mut network);
        assert_eq!(result.value, 4.0);
        assert_eq!(result.augmentations, 1);
        assert_eq!(network.job_flows(0).collect::<Vec<_>>(), vec![(0, 4.0)]);
    }

    #[test]
    fn test_flow_splits_job_across_frames() {
        // J1 may only run in frame 0, J2 in frames 0 and 1
        let jobs = vec![
            Job::new(JobId::new(1, 0), 0, 6, 4.0, 0..1),
            Job::new(JobId::new(2, 0), 0, 12, 5.0, 0..2),
        ];
        let mut network = FlowNetwork::build(&jobs, 2, 6);

        let result = max_flow(&mut network);
        assert_eq!(result.value, 9.0);
        assert!(network.is_valid_flow());

        let job1: Vec<(usize, Work)> = network.job_flows(0).collect();
        assert_eq!(job1, vec![(0, 4.0)]);
        let job2_total: Work = network.job_flows(1).map(|(_, f)| f).sum();
        assert_eq!(job2_total, 5.0);

        for frame in 0..2 {
            let node = network.node(NodeKind::Frame(frame));
            assert!(network.outflow(node) <= 6.0);
        }
    }

    #[test]
    fn test_unreachable_job_gets_nothing() {
        let jobs = vec![
            Job::new(JobId::new(1, 0), 3, 9, 1.0, 1..1),
            Job::new(JobId::new(2, 0), 0, 6, 2.0, 0..1),
        ];
        let mut network = FlowNetwork::build(&jobs, 1, 6);

        let result = max_flow(&mut network);
        assert_eq!(result.value, 2.0);
        assert_eq!(network.outflow(network.node(NodeKind::Job(0))), 0.0);
    }

    #[test]
    fn test_deterministic_flow() {
        let jobs = vec![
            Job::new(JobId::new(1, 0), 0, 12, 3.0, 0..2),
            Job::new(JobId::new(2, 0), 0, 12, 3.0, 0..2),
            Job::new(JobId::new(3, 0), 0, 12, 5.0, 0..2),
        ];
        let mut first = FlowNetwork::build(&jobs, 2, 6);
        let mut second = FlowNetwork::build(&jobs, 2, 6);
        max_flow(&mut first);
        max_flow(&mut second);

        for job in 0..jobs.len() {
            assert_eq!(
                first.job_flows(job).collect::<Vec<_>>(),
                second.job_flows(job).collect::<Vec<_>>()
            );
        }
    }
}
