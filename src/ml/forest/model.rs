use serde::{Deserialize, Serialize};

/// Serialized format version of [`RandomForestModel`].
pub const FOREST_MODEL_VERSION: i64 = 1;
/// Value of [`RandomForestModel::model_type`].
pub const FOREST_MODEL_TYPE: &str = "random_forest";

/// How many candidate features each split considers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// `floor(sqrt(d))`, at least one.
    #[default]
    Sqrt,
    /// `floor(log2(d))`, at least one.
    Log2,
    /// Every feature.
    All,
}

impl MaxFeatures {
    /// Number of features to sample out of `n_features`.
    pub fn resolve(self, n_features: usize) -> usize {
        let n = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::Log2 => (n_features as f64).log2().floor() as usize,
            MaxFeatures::All => n_features,
        };
        n.clamp(1, n_features.max(1))
    }
}

/// Forest hyperparameters. Stored with the model so a bundle records how it was grown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of trees.
    pub n_trees: usize,
    /// Depth limit; `None` grows until leaves are pure or too small.
    pub max_depth: Option<usize>,
    /// Smallest node that may still be split.
    pub min_samples_split: usize,
    /// Smallest allowed child after a split.
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    /// Master seed; per-tree seeds are drawn from it.
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            seed: 42,
        }
    }
}

/// One node of a flattened decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// `feature <= threshold` goes to `left`, everything else to `right`.
    Split {
        feature_index: u16,
        threshold: f32,
        left: u32,
        right: u32,
    },
    Leaf {
        /// Share of positive bootstrap samples that reached this leaf.
        positive_rate: f32,
        samples: u32,
    },
}

/// Decision tree stored in preorder; the root is node 0 and children always
/// come after their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Positive rate of the leaf `features` falls into.
    pub fn predict(&self, features: &[f32]) -> f32 {
        let mut idx = 0usize;
        loop {
            match self.nodes.get(idx) {
                Some(TreeNode::Split {
                    feature_index,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = features
                        .get(*feature_index as usize)
                        .copied()
                        .unwrap_or(0.0);
                    idx = if value <= *threshold {
                        *left as usize
                    } else {
                        *right as usize
                    };
                }
                Some(TreeNode::Leaf { positive_rate, .. }) => return *positive_rate,
                None => return 0.0,
            }
        }
    }

    /// Longest root-to-leaf path, counted in edges.
    pub fn depth(&self) -> usize {
        let mut depths = vec![0usize; self.nodes.len()];
        let mut max = 0;
        for (idx, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split { left, right, .. } = node {
                let next = depths[idx] + 1;
                for child in [*left as usize, *right as usize] {
                    if let Some(slot) = depths.get_mut(child) {
                        *slot = next;
                        max = max.max(next);
                    }
                }
            }
        }
        max
    }

    fn validate(&self, tree_idx: usize, feature_len: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err(format!("Tree {tree_idx} has no nodes"));
        }
        let len = self.nodes.len();
        let mut referenced = vec![false; len];
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature_index,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature_index as usize >= feature_len {
                        return Err(format!(
                            "Tree {tree_idx} node {idx} splits on feature {feature_index} but the model has {feature_len}"
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("Tree {tree_idx} node {idx} has a non-finite threshold"));
                    }
                    for child in [*left as usize, *right as usize] {
                        if child <= idx || child >= len {
                            return Err(format!(
                                "Tree {tree_idx} node {idx} points at invalid child {child}"
                            ));
                        }
                        if std::mem::replace(&mut referenced[child], true) {
                            return Err(format!(
                                "Tree {tree_idx} node {child} has more than one parent"
                            ));
                        }
                    }
                }
                TreeNode::Leaf { positive_rate, .. } => {
                    if !(0.0..=1.0).contains(positive_rate) {
                        return Err(format!(
                            "Tree {tree_idx} leaf {idx} has rate {positive_rate} outside [0, 1]"
                        ));
                    }
                }
            }
        }
        if let Some(orphan) = referenced.iter().skip(1).position(|seen| !seen) {
            return Err(format!("Tree {tree_idx} node {} is unreachable", orphan + 1));
        }
        Ok(())
    }
}

/// Random-forest binary classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestModel {
    /// Model format version.
    pub model_version: i64,
    /// Always [`FOREST_MODEL_TYPE`].
    pub model_type: String,
    /// Number of `f32` values per feature vector.
    pub feature_len: usize,
    /// Hyperparameters the forest was grown with.
    pub params: ForestParams,
    pub trees: Vec<DecisionTree>,
}

impl RandomForestModel {
    /// Validate structural invariants of the model.
    pub fn validate(&self) -> Result<(), String> {
        if self.model_version != FOREST_MODEL_VERSION {
            return Err(format!(
                "Unsupported forest version {} (expected {FOREST_MODEL_VERSION})",
                self.model_version
            ));
        }
        if self.model_type != FOREST_MODEL_TYPE {
            return Err(format!("Unexpected model type '{}'", self.model_type));
        }
        if self.feature_len == 0 {
            return Err("Model must expect at least one feature".to_string());
        }
        if self.trees.is_empty() {
            return Err("Model must contain at least one tree".to_string());
        }
        for (tree_idx, tree) in self.trees.iter().enumerate() {
            tree.validate(tree_idx, self.feature_len)?;
        }
        Ok(())
    }

    /// Mean positive rate over all trees, in `[0, 1]`.
    pub fn predict_proba(&self, features: &[f32]) -> f32 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.trees.iter().map(|tree| tree.predict(features)).sum();
        (sum / self.trees.len() as f32).clamp(0.0, 1.0)
    }

    /// `1` when the positive probability reaches `threshold`.
    pub fn predict_label(&self, features: &[f32], threshold: f32) -> u8 {
        u8::from(self.predict_proba(features) >= threshold)
    }

    pub fn node_count(&self) -> usize {
        self.trees.iter().map(|tree| tree.nodes.len()).sum()
    }
}
