//! Regression tree with cost-complexity pruning

use crate::error::{FlowcastError, Result};
use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Tree node. Split nodes keep their subset mean and sum of squared errors
/// so pruning can collapse them without revisiting the training data.
#[derive(Debug, Clone)]
pub enum TreeNode {
    Leaf {
        value: f64,
        n_samples: usize,
        sse: f64,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
        value: f64,
        sse: f64,
    },
}

/// Bounded-depth regression tree splitting on squared-error reduction.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features drawn at random per split; None considers all.
    pub max_features: Option<usize>,
    /// Weakest-link pruning strength; 0.0 keeps the full tree.
    pub ccp_alpha: f64,
    pub seed: u64,
    n_features: usize,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTree {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            ccp_alpha: 0.0,
            seed: 42,
            n_features: 0,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    pub fn with_ccp_alpha(mut self, alpha: f64) -> Self {
        self.ccp_alpha = alpha;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fit the tree. A subset too small to split becomes a single leaf
    /// rather than an error, so bootstrap callers never fail on thin draws.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(FlowcastError::Shape {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(FlowcastError::DataShape(
                "cannot fit a tree on zero samples".to_string(),
            ));
        }

        self.n_features = x.ncols();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let indices: Vec<usize> = (0..n_samples).collect();
        let mut root = self.build_node(x, y, &indices, 0, &mut rng);

        if self.ccp_alpha > 0.0 {
            root = prune(root, n_samples as f64, self.ccp_alpha);
        }
        self.root = Some(root);
        Ok(self)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(FlowcastError::ModelNotFitted)?;
        let predictions: Vec<f64> = (0..x.nrows())
            .map(|i| {
                let row: Vec<f64> = x.row(i).to_vec();
                predict_row(root, &row)
            })
            .collect();
        Ok(Array1::from_vec(predictions))
    }

    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, node_depth)
    }

    pub fn n_leaves(&self) -> usize {
        self.root.as_ref().map_or(0, count_leaves)
    }

    fn build_node(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n = indices.len();
        let (sum, sq_sum) = indices
            .iter()
            .fold((0.0, 0.0), |(s, q), &i| (s + y[i], q + y[i] * y[i]));
        let value = sum / n as f64;
        let sse = (sq_sum - sum * sum / n as f64).max(0.0);

        let at_depth_limit = self.max_depth.map_or(false, |d| depth >= d);
        if n < self.min_samples_split || at_depth_limit || sse <= 1e-12 {
            return TreeNode::Leaf { value, n_samples: n, sse };
        }

        let features = self.candidate_features(rng);
        let best = find_best_split(x, y, indices, &features, self.min_samples_leaf, sse);

        match best {
            Some((feature_idx, threshold, _gain)) => {
                let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| x[[i, feature_idx]] <= threshold);
                if left_idx.len() < self.min_samples_leaf
                    || right_idx.len() < self.min_samples_leaf
                {
                    return TreeNode::Leaf { value, n_samples: n, sse };
                }
                let left = Box::new(self.build_node(x, y, &left_idx, depth + 1, rng));
                let right = Box::new(self.build_node(x, y, &right_idx, depth + 1, rng));
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                    n_samples: n,
                    value,
                    sse,
                }
            }
            None => TreeNode::Leaf { value, n_samples: n, sse },
        }
    }

    fn candidate_features(&self, rng: &mut ChaCha8Rng) -> Vec<usize> {
        let mut features: Vec<usize> = (0..self.n_features).collect();
        if let Some(k) = self.max_features {
            if k < self.n_features {
                features.shuffle(rng);
                features.truncate(k.max(1));
            }
        }
        features
    }
}

/// Scan each candidate feature in sorted order with running sums, so every
/// threshold evaluation is O(1) instead of a re-pass over the subset.
fn find_best_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    indices: &[usize],
    features: &[usize],
    min_samples_leaf: usize,
    parent_sse: f64,
) -> Option<(usize, f64, f64)> {
    let n = indices.len();
    let mut best: Option<(usize, f64, f64)> = None;

    for &feature_idx in features {
        let mut pairs: Vec<(f64, f64)> = indices
            .iter()
            .map(|&i| (x[[i, feature_idx]], y[i]))
            .collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let total_sum: f64 = pairs.iter().map(|p| p.1).sum();
        let total_sq: f64 = pairs.iter().map(|p| p.1 * p.1).sum();

        let mut left_n = 0usize;
        let mut left_sum = 0.0;
        let mut left_sq = 0.0;

        for i in 0..n - 1 {
            left_n += 1;
            left_sum += pairs[i].1;
            left_sq += pairs[i].1 * pairs[i].1;

            // Only cut between distinct feature values.
            if pairs[i + 1].0 <= pairs[i].0 {
                continue;
            }
            let right_n = n - left_n;
            if left_n < min_samples_leaf || right_n < min_samples_leaf {
                continue;
            }

            let left_sse = (left_sq - left_sum * left_sum / left_n as f64).max(0.0);
            let right_sum = total_sum - left_sum;
            let right_sse =
                ((total_sq - left_sq) - right_sum * right_sum / right_n as f64).max(0.0);
            let gain = parent_sse - left_sse - right_sse;

            if gain > 1e-12 && best.map_or(true, |(_, _, g)| gain > g) {
                let threshold = (pairs[i].0 + pairs[i + 1].0) / 2.0;
                best = Some((feature_idx, threshold, gain));
            }
        }
    }
    best
}

/// Bottom-up weakest-link pruning: collapse a split whose per-leaf error
/// reduction is worth less than `alpha`.
fn prune(node: TreeNode, n_total: f64, alpha: f64) -> TreeNode {
    match node {
        leaf @ TreeNode::Leaf { .. } => leaf,
        TreeNode::Split {
            feature_idx,
            threshold,
            left,
            right,
            n_samples,
            value,
            sse,
        } => {
            let left = prune(*left, n_total, alpha);
            let right = prune(*right, n_total, alpha);

            let (left_sse, left_leaves) = subtree_stats(&left);
            let (right_sse, right_leaves) = subtree_stats(&right);
            let n_leaves = left_leaves + right_leaves;
            let gain = (sse - left_sse - right_sse) / n_total;

            if n_leaves > 1 && gain / (n_leaves as f64 - 1.0) <= alpha {
                TreeNode::Leaf { value, n_samples, sse }
            } else {
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left: Box::new(left),
                    right: Box::new(right),
                    n_samples,
                    value,
                    sse,
                }
            }
        }
    }
}

fn subtree_stats(node: &TreeNode) -> (f64, usize) {
    match node {
        TreeNode::Leaf { sse, .. } => (*sse, 1),
        TreeNode::Split { left, right, .. } => {
            let (ls, ln) = subtree_stats(left);
            let (rs, rn) = subtree_stats(right);
            (ls + rs, ln + rn)
        }
    }
}

fn predict_row(node: &TreeNode, row: &[f64]) -> f64 {
    match node {
        TreeNode::Leaf { value, .. } => *value,
        TreeNode::Split { feature_idx, threshold, left, right, .. } => {
            if row[*feature_idx] <= *threshold {
                predict_row(left, row)
            } else {
                predict_row(right, row)
            }
        }
    }
}

fn node_depth(node: &TreeNode) -> usize {
    match node {
        TreeNode::Leaf { .. } => 1,
        TreeNode::Split { left, right, .. } => 1 + node_depth(left).max(node_depth(right)),
    }
}

fn count_leaves(node: &TreeNode) -> usize {
    match node {
        TreeNode::Leaf { .. } => 1,
        TreeNode::Split { left, right, .. } => count_leaves(left) + count_leaves(right),
    }
}
