//! MCTS tree structure with arena allocation.
//!
//! The tree uses arena allocation for efficient node storage and
//! cache-friendly traversal. Nodes are stored in a contiguous Vec
//! and referenced by NodeId indices. A tree lives for one search.

use engine_core::ActionId;

use crate::node::{MctsNode, NodeId};

/// MCTS tree with arena-based node storage.
#[derive(Debug)]
pub struct MctsTree {
    /// Arena storing all nodes
    nodes: Vec<MctsNode>,

    /// Root node index (always 0)
    root: NodeId,
}

impl Default for MctsTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MctsTree {
    /// Create a tree holding only an unexpanded root.
    pub fn new() -> Self {
        Self {
            nodes: vec![MctsNode::new_root()],
            root: NodeId(0),
        }
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &MctsNode {
        &self.nodes[id.0 as usize]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode {
        &mut self.nodes[id.0 as usize]
    }

    /// Allocate a new node and return its ID.
    pub fn allocate(&mut self, node: MctsNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty (never true after construction).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Select the child of a node with the highest PUCT score.
    /// Ties go to the earliest child, i.e. the lowest legal action.
    pub fn select_child(&self, node_id: NodeId, c_puct: f32) -> Option<NodeId> {
        let node = self.get(node_id);
        let parent_visits_sqrt = (node.visit_count as f32).sqrt();

        let mut best: Option<(NodeId, f32)> = None;
        for &(_, child_id) in &node.children {
            let score = self.get(child_id).puct_score(parent_visits_sqrt, c_puct);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((child_id, score)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Add a child to a parent node.
    /// Returns the new child's NodeId.
    pub fn add_child(&mut self, parent_id: NodeId, action: ActionId, prior: f32) -> NodeId {
        let child_id = self.allocate(MctsNode::new_child(parent_id, action, prior));
        self.get_mut(parent_id).children.push((action, child_id));
        child_id
    }

    /// Backpropagate a leaf evaluation to the root.
    ///
    /// `value` is from the perspective of the player to move at the leaf.
    /// Each node stores values for the player who moved into it, so the
    /// leaf receives `-value` and the sign flips at every level above.
    pub fn backpropagate(&mut self, leaf_id: NodeId, value: f32) {
        let mut current_id = leaf_id;
        let mut current_value = -value;

        while current_id.is_some() {
            let node = self.get_mut(current_id);
            node.visit_count += 1;
            node.value_sum += current_value;

            current_value = -current_value;
            current_id = node.parent;
        }
    }

    /// Most visited root action. Ties go to the lowest action.
    /// Returns (action, visit_count) or None if root has no children.
    pub fn best_action(&self) -> Option<(ActionId, u32)> {
        let root = self.get(self.root);
        let mut best: Option<(ActionId, u32)> = None;
        for &(action, id) in &root.children {
            let visits = self.get(id).visit_count;
            if best.map_or(true, |(_, b)| visits > b) {
                best = Some((action, visits));
            }
        }
        best
    }

    /// Visit counts of the root children, indexed by action.
    pub fn root_visit_counts(&self, num_actions: usize) -> Vec<u32> {
        let mut counts = vec![0; num_actions];
        for &(action, id) in &self.get(self.root).children {
            counts[action] = self.get(id).visit_count;
        }
        counts
    }

    /// Root children visit counts normalized to a distribution.
    /// Illegal actions get 0; all zeros if nothing was visited.
    pub fn root_policy(&self, num_actions: usize) -> Vec<f32> {
        let counts = self.root_visit_counts(num_actions);
        let total: u32 = counts.iter().sum();
        if total == 0 {
            return vec![0.0; num_actions];
        }
        counts
            .into_iter()
            .map(|c| c as f32 / total as f32)
            .collect()
    }

    /// Root value from the perspective of the player to move at the root.
    pub fn root_value(&self) -> f32 {
        -self.get(self.root).mean_value()
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: self.get(self.root).visit_count,
            root_value: self.root_value(),
            max_depth: self.compute_max_depth(self.root, 0),
        }
    }

    fn compute_max_depth(&self, node_id: NodeId, current_depth: u32) -> u32 {
        self.get(node_id)
            .children
            .iter()
            .map(|(_, id)| self.compute_max_depth(*id, current_depth + 1))
            .max()
            .unwrap_or(current_depth)
    }
}

/// Statistics about an MCTS tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub root_value: f32,
    pub max_depth: u32,
}
