use serde::{Deserialize, Serialize};

/// A node in a boosted decision tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Internal split on one descriptor dimension.
    Split {
        /// Index into the standardized descriptor.
        feature: u32,
        threshold: f64,
        left: u32,
        right: u32,
    },
    /// Leaf node contributing a raw margin weight.
    Leaf { weight: f64 },
}

/// A single decision tree over standardized descriptors.
///
/// The tree produces a raw margin contribution by:
/// 1. Starting at node 0 (the root)
/// 2. At each split, comparing the descriptor value at `feature` against
///    the threshold: less-than goes left, otherwise right
/// 3. Returning the weight at the reached leaf
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Create a new tree with the given nodes. Node 0 is the root.
    pub fn new(nodes: Vec<TreeNode>) -> Self {
        Self { nodes }
    }

    /// Traverse the tree and return the leaf weight for this descriptor.
    pub fn predict(&self, descriptor: &[f64]) -> f64 {
        let mut node_idx = 0usize;

        loop {
            match &self.nodes[node_idx] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node_idx = if descriptor[*feature as usize] < *threshold {
                        *left as usize
                    } else {
                        *right as usize
                    };
                }
                TreeNode::Leaf { weight } => {
                    return *weight;
                }
            }
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Depth of the tree (for debugging/validation).
    pub fn depth(&self) -> usize {
        self.depth_from(0)
    }

    fn depth_from(&self, node_idx: usize) -> usize {
        match &self.nodes[node_idx] {
            TreeNode::Split { left, right, .. } => {
                1 + self
                    .depth_from(*left as usize)
                    .max(self.depth_from(*right as usize))
            }
            TreeNode::Leaf { .. } => 1,
        }
    }

    /// Check that the tree has at least one node and that every split's
    /// children point strictly forward into the node vector. Forward-only
    /// references guarantee traversal always terminates at a leaf.
    pub fn is_well_formed(&self) -> bool {
        !self.nodes.is_empty()
            && self.nodes.iter().enumerate().all(|(i, node)| match node {
                TreeNode::Split { left, right, .. } => {
                    let (l, r) = (*left as usize, *right as usize);
                    l > i && r > i && l < self.nodes.len() && r < self.nodes.len()
                }
                TreeNode::Leaf { .. } => true,
            })
    }

    /// Largest feature index referenced by any split, if the tree has one.
    pub fn max_feature_index(&self) -> Option<u32> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                TreeNode::Split { feature, .. } => Some(*feature),
                TreeNode::Leaf { .. } => None,
            })
            .max()
    }
}

/// An additive ensemble of boosted decision trees.
///
/// Leaf weights are summed over a base margin and squashed through the
/// logistic function to produce a probability of the positive class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub trees: Vec<DecisionTree>,
    /// Margin before any tree contributes (0.0 for a balanced prior).
    pub base_margin: f64,
}

impl TreeEnsemble {
    pub fn new(trees: Vec<DecisionTree>, base_margin: f64) -> Self {
        Self { trees, base_margin }
    }

    /// Probability of the positive class in [0, 1].
    pub fn predict(&self, descriptor: &[f64]) -> f64 {
        let margin: f64 = self.base_margin
            + self
                .trees
                .iter()
                .map(|tree| tree.predict(descriptor))
                .sum::<f64>();
        sigmoid(margin)
    }
}

#[inline]
fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
