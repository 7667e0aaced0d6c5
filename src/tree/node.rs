use reachforest_types::NodeId;
use smallvec::SmallVec;

/// Child list; most road junctions have only a handful of successors.
pub(crate) type Children = SmallVec<[NodeId; 4]>;

/// One node of a reachability tree or predictive forest.
///
/// Links are plain ids resolved through the owning table, so a node never
/// holds a reference to its parent or children.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    id: NodeId,
    parent: Option<NodeId>,
    children: Children,
    probability: f64,
    distance_to_root: f64,
}

impl TreeNode {
    pub(crate) fn new(id: NodeId, parent: Option<NodeId>, distance_to_root: f64) -> Self {
        Self {
            id,
            parent,
            children: Children::new(),
            probability: 0.0,
            distance_to_root,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Parent id, `None` for a root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child ids in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Travel distance (km) from the root of the tree this node was built in.
    pub fn distance_to_root(&self) -> f64 {
        self.distance_to_root
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Copy of the scalar fields with no children, re-parented under `parent`.
    pub(crate) fn detached(&self, parent: Option<NodeId>) -> Self {
        Self {
            id: self.id,
            parent,
            children: Children::new(),
            probability: self.probability,
            distance_to_root: self.distance_to_root,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(crate) fn set_probability(&mut self, probability: f64) {
        self.probability = probability;
    }

    pub(crate) fn push_child(&mut self, child: NodeId) {
        assert!(
            !self.children.contains(&child),
            "node {child} is already a child of {}",
            self.id
        );
        self.children.push(child);
    }

    /// Remove `child` from the child list, returning whether it was present.
    pub(crate) fn remove_child(&mut self, child: NodeId) -> bool {
        let before = self.children.len();
        self.children.retain(|id| *id != child);
        self.children.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_drops_children() {
        let mut node = TreeNode::new(5, Some(1), 2.5);
        node.push_child(7);
        node.set_probability(0.25);

        let copy = node.detached(Some(3));
        assert_eq!(copy.id(), 5);
        assert_eq!(copy.parent(), Some(3));
        assert!(copy.is_leaf());
        assert_eq!(copy.probability(), 0.25);
        assert_eq!(copy.distance_to_root(), 2.5);
        assert_eq!(node.children(), &[7]);
    }

    #[test]
    fn test_remove_child() {
        let mut node = TreeNode::new(1, None, 0.0);
        node.push_child(2);
        node.push_child(3);
        assert!(node.remove_child(2));
        assert!(!node.remove_child(2));
        assert_eq!(node.children(), &[3]);
    }

    #[test]
    #[should_panic(expected = "already a child")]
    fn test_duplicate_child_panics() {
        let mut node = TreeNode::new(1, None, 0.0);
        node.push_child(2);
        node.push_child(2);
    }
}
