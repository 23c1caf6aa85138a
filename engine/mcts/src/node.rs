//! MCTS tree node representation.
//!
//! Each node represents a position reached by taking an action from the
//! parent. Values are stored from the perspective of the player who chose
//! that action (the player to move at the parent), so a parent compares its
//! children's mean values directly.

use engine_core::ActionId;

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// A node in the MCTS tree.
#[derive(Debug, Clone)]
pub struct MctsNode {
    /// Parent node index (NONE for root)
    pub parent: NodeId,

    /// Action that led to this node from parent
    pub action: ActionId,

    /// Number of values backed up through this node
    pub visit_count: u32,

    /// Sum of backed-up values, from the parent mover's perspective.
    pub value_sum: f32,

    /// Prior probability of the inbound action.
    pub prior: f32,

    /// Whether the position is finished
    pub is_terminal: bool,

    /// Terminal outcome for the player to move at this node
    /// (only valid if is_terminal)
    pub terminal_value: f32,

    /// Set once children have been created; never unset.
    pub expanded: bool,

    /// Children in legal-action order. Empty until node is expanded.
    pub children: Vec<(ActionId, NodeId)>,
}

impl MctsNode {
    /// Create a new root node.
    pub fn new_root() -> Self {
        Self::new_child(NodeId::NONE, 0, 1.0)
    }

    /// Create a new, unvisited child node.
    pub fn new_child(parent: NodeId, action: ActionId, prior: f32) -> Self {
        Self {
            parent,
            action,
            visit_count: 0,
            value_sum: 0.0,
            prior,
            is_terminal: false,
            terminal_value: 0.0,
            expanded: false,
            children: Vec::new(),
        }
    }

    /// Mean backed-up value, 0.0 if never visited.
    #[inline]
    pub fn mean_value(&self) -> f32 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.value_sum / self.visit_count as f32
        }
    }

    /// PUCT score of this node as a child candidate.
    /// PUCT(s,a) = Q(s,a) + c_puct * P(s,a) * sqrt(N_parent) / (1 + N(s,a))
    ///
    /// Takes a pre-computed sqrt(parent_visits) so comparing many children
    /// costs one sqrt.
    #[inline]
    pub fn puct_score(&self, parent_visits_sqrt: f32, c_puct: f32) -> f32 {
        let u = c_puct * self.prior * parent_visits_sqrt / (1.0 + self.visit_count as f32);
        self.mean_value() + u
    }

    /// Check if this node has been expanded.
    #[inline]
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Check if this is a leaf node (not expanded or terminal).
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.is_terminal || !self.expanded
    }
}
