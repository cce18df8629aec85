//! CART (Classification and Regression Tree) builder
//!
//! Exact-greedy regression trees fitted to squared-error gradients.
//! Split search scans each candidate feature in sorted order with prefix
//! sums; ties are broken by feature index, then threshold, so identical
//! inputs always yield identical trees.

use std::cmp::Ordering;

/// Training parameters for a single tree
#[derive(Clone, Debug)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 6,
            min_samples_leaf: 20,
        }
    }
}

/// A decision tree node (internal or leaf)
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub feature_index: usize,
    /// Rows with `feature <= threshold` go left
    pub threshold: f64,
    pub left: usize,
    pub right: usize,
    /// Some for leaves
    pub value: Option<f64>,
}

impl Node {
    fn leaf(value: f64) -> Self {
        Self {
            feature_index: 0,
            threshold: 0.0,
            left: 0,
            right: 0,
            value: Some(value),
        }
    }
}

/// A fitted regression tree; node 0 is the root
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Evaluate the tree on one feature row
    pub fn predict(&self, features: &[f64]) -> f64 {
        let mut idx = 0usize;

        loop {
            let Some(node) = self.nodes.get(idx) else {
                return 0.0;
            };

            if let Some(value) = node.value {
                return value;
            }

            let Some(&x) = features.get(node.feature_index) else {
                return 0.0;
            };

            idx = if x <= node.threshold {
                node.left
            } else {
                node.right
            };
        }
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.value.is_some()).count()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match nodes.get(idx) {
                Some(node) if node.value.is_none() => {
                    1 + walk(nodes, node.left).max(walk(nodes, node.right))
                }
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }
}

/// Split candidate
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

impl SplitCandidate {
    /// Higher gain wins; equal gains fall back to lower feature, then
    /// lower threshold.
    fn beats(&self, other: &SplitCandidate) -> bool {
        match self.gain.total_cmp(&other.gain) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => {
                (self.feature_idx, OrderedThreshold(self.threshold))
                    < (other.feature_idx, OrderedThreshold(other.threshold))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct OrderedThreshold(f64);

impl PartialOrd for OrderedThreshold {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.0.total_cmp(&other.0))
    }
}

/// Build a regression tree over a subset of rows and features
pub struct CartBuilder<'a> {
    config: TreeConfig,
    features: &'a [Vec<f64>],
    gradients: &'a [f64],
    feature_subset: Vec<usize>,
}

impl<'a> CartBuilder<'a> {
    pub fn new(
        features: &'a [Vec<f64>],
        gradients: &'a [f64],
        feature_subset: Vec<usize>,
        config: TreeConfig,
    ) -> Self {
        debug_assert_eq!(features.len(), gradients.len());

        Self {
            config,
            features,
            gradients,
            feature_subset,
        }
    }

    /// Build a tree from the given sample rows
    pub fn build(&self, rows: &[usize]) -> Tree {
        let mut nodes = Vec::new();
        self.build_node(rows, 0, &mut nodes);
        Tree { nodes }
    }

    fn build_node(&self, indices: &[usize], depth: usize, nodes: &mut Vec<Node>) -> usize {
        let current_idx = nodes.len();
        let leaf_value = self.calculate_leaf_value(indices);

        if depth >= self.config.max_depth || indices.len() < 2 * self.config.min_samples_leaf.max(1)
        {
            nodes.push(Node::leaf(leaf_value));
            return current_idx;
        }

        let Some(split) = self.find_best_split(indices) else {
            nodes.push(Node::leaf(leaf_value));
            return current_idx;
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| self.features[i][split.feature_idx] <= split.threshold);

        // Reserve space for current node
        nodes.push(Node {
            feature_index: split.feature_idx,
            threshold: split.threshold,
            left: 0,
            right: 0,
            value: None,
        });

        let left_idx = self.build_node(&left_indices, depth + 1, nodes);
        let right_idx = self.build_node(&right_indices, depth + 1, nodes);

        nodes[current_idx].left = left_idx;
        nodes[current_idx].right = right_idx;

        current_idx
    }

    /// Exact-greedy search: every boundary between distinct sorted values
    /// is a candidate, placed at the midpoint.
    fn find_best_split(&self, indices: &[usize]) -> Option<SplitCandidate> {
        let n = indices.len();
        let min_leaf = self.config.min_samples_leaf.max(1);
        let g_total: f64 = indices.iter().map(|&i| self.gradients[i]).sum();
        let parent_score = g_total * g_total / n as f64;

        let mut best: Option<SplitCandidate> = None;
        let mut sorted = indices.to_vec();

        for &feature_idx in &self.feature_subset {
            sorted.sort_by(|&a, &b| {
                self.features[a][feature_idx].total_cmp(&self.features[b][feature_idx])
            });

            let mut g_left = 0.0;
            for pos in 0..n - 1 {
                g_left += self.gradients[sorted[pos]];
                let n_left = pos + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let x = self.features[sorted[pos]][feature_idx];
                let x_next = self.features[sorted[pos + 1]][feature_idx];
                if x == x_next {
                    continue;
                }

                let g_right = g_total - g_left;
                let gain = g_left * g_left / n_left as f64 + g_right * g_right / n_right as f64
                    - parent_score;
                if gain <= f64::EPSILON {
                    continue;
                }

                let candidate = SplitCandidate {
                    feature_idx,
                    threshold: x + (x_next - x) / 2.0,
                    gain,
                };
                if best.map_or(true, |current| candidate.beats(&current)) {
                    best = Some(candidate);
                }
            }
        }

        best
    }

    /// Optimal squared-error leaf: the negative mean gradient
    fn calculate_leaf_value(&self, indices: &[usize]) -> f64 {
        if indices.is_empty() {
            return 0.0;
        }
        let sum_g: f64 = indices.iter().map(|&i| self.gradients[i]).sum();
        -sum_g / indices.len() as f64
    }
}
