use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::model::{
    DecisionTree, FOREST_MODEL_TYPE, FOREST_MODEL_VERSION, ForestParams, RandomForestModel,
    TreeNode,
};

/// In-memory dataset used for training and evaluation.
#[derive(Debug, Clone)]
pub struct TrainDataset {
    /// Number of `f32` values in each feature vector.
    pub feature_len: usize,
    /// Feature matrix, row-major.
    pub x: Vec<Vec<f32>>,
    /// Binary labels (`0` or `1`) aligned with `x`.
    pub y: Vec<u8>,
}

/// Grow a random forest with bootstrap sampling and Gini splits.
///
/// Each tree gets its own seed drawn from `params.seed`, so the result is a
/// pure function of the data and the parameters.
pub fn train_random_forest(
    dataset: &TrainDataset,
    params: &ForestParams,
) -> Result<RandomForestModel, String> {
    if dataset.x.len() != dataset.y.len() {
        return Err("Mismatched X/Y lengths".to_string());
    }
    if dataset.x.is_empty() {
        return Err("Empty dataset".to_string());
    }
    if dataset.feature_len == 0 || dataset.feature_len > u16::MAX as usize {
        return Err(format!(
            "Unsupported feature length {}",
            dataset.feature_len
        ));
    }
    if let Some(row) = dataset.x.iter().position(|r| r.len() != dataset.feature_len) {
        return Err(format!(
            "Row {row} has {} features but expected {}",
            dataset.x[row].len(),
            dataset.feature_len
        ));
    }
    if let Some(row) = dataset.y.iter().position(|&label| label > 1) {
        return Err(format!("Row {row} has non-binary label {}", dataset.y[row]));
    }
    if params.n_trees == 0 {
        return Err("Need at least one tree".to_string());
    }
    if params.min_samples_split < 2 || params.min_samples_leaf == 0 {
        return Err("min_samples_split must be >= 2 and min_samples_leaf >= 1".to_string());
    }

    let builder = TreeBuilder {
        x: &dataset.x,
        y: &dataset.y,
        params,
        feature_len: dataset.feature_len,
        max_features: params.max_features.resolve(dataset.feature_len),
    };
    let n = dataset.x.len();
    let mut master = StdRng::seed_from_u64(params.seed);
    let mut trees = Vec::with_capacity(params.n_trees);
    for _ in 0..params.n_trees {
        let mut rng = StdRng::seed_from_u64(master.random());
        let bootstrap: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
        trees.push(builder.build(&mut rng, bootstrap));
    }

    Ok(RandomForestModel {
        model_version: FOREST_MODEL_VERSION,
        model_type: FOREST_MODEL_TYPE.to_string(),
        feature_len: dataset.feature_len,
        params: params.clone(),
        trees,
    })
}

struct TreeBuilder<'a> {
    x: &'a [Vec<f32>],
    y: &'a [u8],
    params: &'a ForestParams,
    feature_len: usize,
    max_features: usize,
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f32,
    impurity: f64,
}

const PENDING: TreeNode = TreeNode::Leaf {
    positive_rate: 0.0,
    samples: 0,
};

impl TreeBuilder<'_> {
    fn build(&self, rng: &mut StdRng, samples: Vec<usize>) -> DecisionTree {
        let mut nodes = vec![PENDING];
        // Left is pushed last so it is expanded first, keeping preorder.
        let mut stack = vec![(0usize, samples, 0usize)];
        while let Some((node_idx, samples, depth)) = stack.pop() {
            let n = samples.len();
            let positives = samples.iter().filter(|&&i| self.y[i] == 1).count();
            let splittable = n >= self.params.min_samples_split
                && positives > 0
                && positives < n
                && self.params.max_depth.is_none_or(|max| depth < max);
            let split = if splittable {
                self.best_split(rng, &samples, positives)
            } else {
                None
            };

            let Some(split) = split else {
                nodes[node_idx] = TreeNode::Leaf {
                    positive_rate: positives as f32 / n.max(1) as f32,
                    samples: n as u32,
                };
                continue;
            };

            let (left, right): (Vec<usize>, Vec<usize>) = samples
                .into_iter()
                .partition(|&i| self.x[i][split.feature] <= split.threshold);
            let left_idx = nodes.len();
            let right_idx = left_idx + 1;
            nodes.push(PENDING);
            nodes.push(PENDING);
            nodes[node_idx] = TreeNode::Split {
                feature_index: split.feature as u16,
                threshold: split.threshold,
                left: left_idx as u32,
                right: right_idx as u32,
            };
            stack.push((right_idx, right, depth + 1));
            stack.push((left_idx, left, depth + 1));
        }
        DecisionTree { nodes }
    }

    /// Visit features in random order until `max_features` non-constant ones
    /// were scanned; keep going past that while no valid split was found.
    fn best_split(
        &self,
        rng: &mut StdRng,
        samples: &[usize],
        positives: usize,
    ) -> Option<SplitCandidate> {
        let mut features: Vec<usize> = (0..self.feature_len).collect();
        features.shuffle(rng);

        let mut best: Option<SplitCandidate> = None;
        let mut visited = 0usize;
        let mut pairs: Vec<(f32, u8)> = Vec::with_capacity(samples.len());
        for feature in features {
            if visited >= self.max_features && best.is_some() {
                break;
            }
            pairs.clear();
            pairs.extend(samples.iter().map(|&i| (self.x[i][feature], self.y[i])));
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
            let constant = match (pairs.first(), pairs.last()) {
                (Some(first), Some(last)) => first.0 == last.0,
                _ => true,
            };
            if constant {
                continue;
            }
            visited += 1;
            if let Some(candidate) =
                scan_feature(feature, &pairs, positives, self.params.min_samples_leaf)
                && best.is_none_or(|b| candidate.impurity < b.impurity)
            {
                best = Some(candidate);
            }
        }
        best
    }
}

/// Best threshold on one sorted feature column.
fn scan_feature(
    feature: usize,
    pairs: &[(f32, u8)],
    positives: usize,
    min_leaf: usize,
) -> Option<SplitCandidate> {
    let n = pairs.len();
    let mut left_pos = 0usize;
    let mut best: Option<(f64, usize)> = None;
    for i in 0..n.saturating_sub(1) {
        left_pos += pairs[i].1 as usize;
        if pairs[i].0 == pairs[i + 1].0 {
            continue;
        }
        let left_n = i + 1;
        let right_n = n - left_n;
        if left_n < min_leaf || right_n < min_leaf {
            continue;
        }
        let impurity =
            weighted_gini(left_pos, left_n) + weighted_gini(positives - left_pos, right_n);
        if best.is_none_or(|(b, _)| impurity < b) {
            best = Some((impurity, i));
        }
    }
    best.map(|(impurity, i)| SplitCandidate {
        feature,
        threshold: midpoint(pairs[i].0, pairs[i + 1].0),
        impurity,
    })
}

/// Gini impurity scaled by node size.
fn weighted_gini(positives: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p = positives as f64 / n as f64;
    n as f64 * 2.0 * p * (1.0 - p)
}

fn midpoint(a: f32, b: f32) -> f32 {
    let mid = a + (b - a) / 2.0;
    // Adjacent floats can round the midpoint up to `b`.
    if mid < b { mid } else { a }
}
