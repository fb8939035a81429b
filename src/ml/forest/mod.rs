//! Deterministic random-forest classifier for the binary risk label.
//!
//! Bootstrap-aggregated CART trees with Gini splits. Everything random is
//! drawn from seeded generators, so the same data and parameters produce
//! the same trees, and the model serializes to plain JSON with a version.

mod model;
mod train;

pub use model::{
    DecisionTree, FOREST_MODEL_TYPE, FOREST_MODEL_VERSION, ForestParams, MaxFeatures,
    RandomForestModel, TreeNode,
};
pub use train::{TrainDataset, train_random_forest};
