use super::ReachabilityTree;
use crate::network::RoadNetwork;
use reachforest_types::NodeId;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Strategy that builds the reachability tree for one root.
///
/// Forests call this once per new root. Any closure with the matching
/// signature is a builder too, which keeps test doubles short:
///
/// ```rust
/// use reachforest::tree::{ReachabilityTree, TreeBuilder};
///
/// let star = |_: &(), root: i64, _range: f64, _threshold: f64| {
///     let mut tree = ReachabilityTree::new(root);
///     tree.attach(root, root + 1, 1.0).unwrap();
///     tree
/// };
/// assert_eq!(star.build(&(), 7, 4.0, 0.0).children(7), &[8]);
/// ```
pub trait TreeBuilder<N: ?Sized> {
    fn build(
        &self,
        network: &N,
        root: NodeId,
        time_range_km: f64,
        probability_threshold: f64,
    ) -> ReachabilityTree;
}

impl<N, F> TreeBuilder<N> for F
where
    N: ?Sized,
    F: Fn(&N, NodeId, f64, f64) -> ReachabilityTree,
{
    fn build(
        &self,
        network: &N,
        root: NodeId,
        time_range_km: f64,
        probability_threshold: f64,
    ) -> ReachabilityTree {
        self(network, root, time_range_km, probability_threshold)
    }
}

/// Bounded uniform-cost expansion over a [`RoadNetwork`].
///
/// Every node is attached under the parent of its shortest known path, and
/// expansion stops once the closest queued candidate is at or beyond the
/// time range. Probabilities are split evenly among siblings afterwards.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortestPathTreeBuilder;

impl ShortestPathTreeBuilder {
    pub fn new() -> Self {
        Self
    }
}

impl TreeBuilder<RoadNetwork> for ShortestPathTreeBuilder {
    fn build(
        &self,
        network: &RoadNetwork,
        root: NodeId,
        time_range_km: f64,
        _probability_threshold: f64,
    ) -> ReachabilityTree {
        let mut tree = ReachabilityTree::new(root);
        let mut frontier = Frontier::default();

        for (next, length) in network.successors(root) {
            if next != root {
                frontier.offer(next, root, length);
            }
        }

        while let Some(candidate) = frontier.pop_within(time_range_km) {
            if tree.contains(candidate.id) {
                continue;
            }
            tree.link(candidate.parent, candidate.id, candidate.distance);

            for (next, length) in network.successors(candidate.id) {
                if !tree.contains(next) {
                    frontier.offer(next, candidate.id, candidate.distance + length);
                }
            }
        }

        tree.assign_uniform_probabilities();
        log::trace!(
            "Expanded tree from {root}: {} nodes within {time_range_km} km",
            tree.len()
        );
        tree
    }
}

/// Queued node with the path it would be attached through.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance: f64,
    seq: u64,
    id: NodeId,
    parent: NodeId,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Candidate {}
impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on distance, earlier insertions first on ties
        other
            .distance
            .partial_cmp(&self.distance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Priority queue with decrease-key by lazy deletion.
///
/// `queued` remembers the live entry per node; heap entries whose sequence
/// number no longer matches were superseded and are skipped on pop.
#[derive(Debug, Default)]
struct Frontier {
    heap: BinaryHeap<Candidate>,
    queued: FxHashMap<NodeId, (f64, u64)>,
    next_seq: u64,
}

impl Frontier {
    /// Queue `id` unless an equal or shorter path to it is already queued.
    fn offer(&mut self, id: NodeId, parent: NodeId, distance: f64) {
        if let Some((queued, _)) = self.queued.get(&id)
            && distance >= *queued
        {
            return;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.queued.insert(id, (distance, seq));
        self.heap.push(Candidate {
            distance,
            seq,
            id,
            parent,
        });
    }

    /// Pop the closest live candidate whose distance is below `limit`.
    fn pop_within(&mut self, limit: f64) -> Option<Candidate> {
        while let Some(top) = self.heap.peek() {
            if top.distance >= limit {
                return None;
            }
            let candidate = self.heap.pop()?;
            match self.queued.get(&candidate.id) {
                Some((_, seq)) if *seq == candidate.seq => {
                    self.queued.remove(&candidate.id);
                    return Some(candidate);
                }
                _ => continue,
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reachforest_types::Coordinate;

    /// Nodes along the equator, 0.01° (~1.11 km) apart.
    ///
    /// 1 -> 2 -> 3 -> 4 is a straight line and 1 -> 5 -> 3 a detour through a
    /// node north of 2.
    fn line_network() -> RoadNetwork {
        let mut builder = RoadNetwork::builder().grid_size(4);
        builder
            .add_node(1, Coordinate::new(0.0, 0.00))
            .add_node(2, Coordinate::new(0.0, 0.01))
            .add_node(3, Coordinate::new(0.0, 0.02))
            .add_node(4, Coordinate::new(0.0, 0.03))
            .add_node(5, Coordinate::new(0.01, 0.01));
        builder
            .add_edge(10, 1, 2)
            .add_edge(11, 2, 3)
            .add_edge(12, 3, 4)
            .add_edge(13, 1, 5)
            .add_edge(14, 5, 3)
            .add_edge(15, 4, 1);
        builder.build().unwrap()
    }

    fn hop() -> f64 {
        Coordinate::new(0.0, 0.0).haversine_km(&Coordinate::new(0.0, 0.01))
    }

    #[test]
    fn test_expansion_respects_range() {
        let network = line_network();
        let builder = ShortestPathTreeBuilder::new();

        let tree = builder.build(&network, 1, hop() * 1.5, 0.0);
        let mut ids: Vec<_> = tree.iter().map(|n| n.id()).collect();
        ids.sort();
        // 2 is one hop away, 5 about 1.41 hops, 3 two hops
        assert_eq!(ids, vec![1, 2, 5]);

        let tree = builder.build(&network, 1, hop() * 2.5, 0.0);
        assert!(tree.contains(3));
        assert!(!tree.contains(4));
    }

    #[test]
    fn test_shortest_parent_wins() {
        let network = line_network();
        let tree = ShortestPathTreeBuilder.build(&network, 1, 100.0, 0.0);

        // 1 -> 2 -> 3 is shorter than 1 -> 5 -> 3
        let three = tree.get(3).unwrap();
        assert_eq!(three.parent(), Some(2));
        assert!((three.distance_to_root() - 2.0 * hop()).abs() < 1e-9);

        // The back edge 4 -> 1 never re-adds the root
        assert_eq!(tree.root().parent(), None);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_uniform_probabilities_after_expansion() {
        let network = line_network();
        let tree = ShortestPathTreeBuilder.build(&network, 1, 100.0, 0.0);

        assert_eq!(tree.root().probability(), 1.0);
        assert_eq!(tree.get(2).unwrap().probability(), 0.5);
        assert_eq!(tree.get(5).unwrap().probability(), 0.5);
        assert_eq!(tree.get(3).unwrap().probability(), 0.5);
        assert_eq!(tree.get(4).unwrap().probability(), 0.5);
    }

    #[test]
    fn test_unknown_root_yields_single_node() {
        let network = line_network();
        let tree = ShortestPathTreeBuilder.build(&network, 99, 10.0, 0.0);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root_id(), 99);
    }

    #[test]
    fn test_frontier_decrease_key() {
        let mut frontier = Frontier::default();
        frontier.offer(7, 1, 5.0);
        frontier.offer(7, 2, 3.0);
        frontier.offer(7, 3, 4.0);
        frontier.offer(8, 1, 3.0);

        let first = frontier.pop_within(10.0).unwrap();
        assert_eq!((first.id, first.parent), (7, 2));
        let second = frontier.pop_within(10.0).unwrap();
        assert_eq!(second.id, 8);
        // The superseded 7@5.0 entry is skipped
        assert!(frontier.pop_within(10.0).is_none());
    }

    #[test]
    fn test_frontier_stops_at_limit() {
        let mut frontier = Frontier::default();
        frontier.offer(1, 0, 2.0);
        frontier.offer(2, 0, 1.0);
        assert_eq!(frontier.pop_within(1.5).unwrap().id, 2);
        assert!(frontier.pop_within(1.5).is_none());
        assert_eq!(frontier.pop_within(2.5).unwrap().id, 1);
    }
}
