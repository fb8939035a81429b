//! Model training and inference building blocks.
//!
//! Feature vectors are plain `f32` slices in the order recorded by the
//! artifact bundle; this module knows nothing about survey fields.

pub mod forest;
pub mod metrics;
