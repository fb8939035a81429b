//! Offline training pipeline: dataset in, validated artifact bundle out.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::artifact::{self, ArtifactBundle, ArtifactError, BUNDLE_FORMAT_VERSION};
use crate::config::{AppSettings, TrainingSettings};
use crate::data::split::train_test_split;
use crate::data::{ColumnValues, DatasetError, StudentDataset, load_csv};
use crate::ml::forest::{ForestParams, TrainDataset, train_random_forest};
use crate::ml::metrics::BinaryConfusion;
use crate::predict::Predictor;
use crate::preprocess::{
    CategoryEncoder, FeatureLayout, ImputationStats, PreprocessError, RangePolicy,
};
use crate::schema::TARGET_COLUMN;

#[derive(Debug, Error)]
pub enum TrainError {
    /// The labeled CSV does not exist.
    #[error("Dataset file '{path}' not found")]
    DatasetMissing { path: PathBuf },
    #[error(transparent)]
    Dataset(DatasetError),
    #[error("Preprocessing failed: {0}")]
    Preprocess(String),
    #[error("Model training failed: {0}")]
    Model(String),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

impl From<DatasetError> for TrainError {
    fn from(err: DatasetError) -> Self {
        match err {
            DatasetError::Missing { path } => TrainError::DatasetMissing { path },
            other => TrainError::Dataset(other),
        }
    }
}

/// Split, forest and evaluation parameters for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingOptions {
    pub test_fraction: f64,
    pub forest: ForestParams,
    /// Threshold used when scoring the held-out rows.
    pub risk_threshold: f32,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self::from(&AppSettings::default())
    }
}

impl From<&AppSettings> for TrainingOptions {
    fn from(settings: &AppSettings) -> Self {
        let TrainingSettings {
            seed,
            test_fraction,
            trees,
            max_depth,
            min_samples_split,
            min_samples_leaf,
            max_features,
        } = settings.training.clone();
        Self {
            test_fraction,
            forest: ForestParams {
                n_trees: trees,
                max_depth,
                min_samples_split,
                min_samples_leaf,
                max_features,
                seed,
            },
            risk_threshold: settings.serving.risk_threshold,
        }
    }
}

/// Model decision for one held-out row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeldOutPrediction {
    /// Row index in the input file, header excluded.
    pub row: usize,
    pub truth: u8,
    pub predicted: u8,
    pub probability: f32,
}

/// Result of [`train_bundle`].
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub bundle: ArtifactBundle,
    pub train_rows: usize,
    pub imputed_cells: usize,
    pub held_out: Vec<HeldOutPrediction>,
}

impl TrainingOutcome {
    pub fn accuracy(&self) -> f32 {
        self.bundle.evaluation.accuracy
    }
}

/// Run the full pipeline on an in-memory dataset.
///
/// Imputation statistics come from the training split only. Encoders are fit
/// on every imputed row so held-out rows always encode.
pub fn train_bundle(
    mut dataset: StudentDataset,
    options: &TrainingOptions,
) -> Result<TrainingOutcome, TrainError> {
    let split = train_test_split(dataset.len(), options.test_fraction, options.forest.seed)
        .map_err(TrainError::Preprocess)?;
    tracing::info!(
        "Split {} rows into {} train / {} held out",
        dataset.len(),
        split.train.len(),
        split.test.len()
    );

    let imputation = ImputationStats::fit(&dataset, &split.train).map_err(TrainError::Preprocess)?;
    let imputed_cells = imputation.apply(&mut dataset);
    if imputed_cells > 0 {
        tracing::info!("Imputed {imputed_cells} missing cells");
    }

    let encoders = fit_encoders(&dataset);
    let feature_names = dataset.feature_names();
    let layout = FeatureLayout::new(&feature_names, &encoders);
    let x = (0..dataset.len())
        .map(|row| layout.encode(&dataset.row_record(row), RangePolicy::PassThrough))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| TrainError::Preprocess(err.to_string()))?;
    let y = dataset.target();

    let train = TrainDataset {
        feature_len: feature_names.len(),
        x: split.train.iter().map(|&row| x[row].clone()).collect(),
        y: split.train.iter().map(|&row| y[row]).collect(),
    };
    let model = train_random_forest(&train, &options.forest).map_err(TrainError::Model)?;
    tracing::info!(
        "Trained {} trees ({} nodes) on {} features",
        model.trees.len(),
        model.node_count(),
        model.feature_len
    );

    let held_out: Vec<HeldOutPrediction> = split
        .test
        .iter()
        .map(|&row| {
            let probability = model.predict_proba(&x[row]);
            HeldOutPrediction {
                row,
                truth: y[row],
                predicted: u8::from(probability >= options.risk_threshold),
                probability,
            }
        })
        .collect();
    let evaluation =
        BinaryConfusion::from_pairs(held_out.iter().map(|p| (p.truth, p.predicted))).summary();

    let bundle = ArtifactBundle {
        format_version: BUNDLE_FORMAT_VERSION,
        target: TARGET_COLUMN.to_string(),
        feature_names,
        encoders,
        imputation,
        model,
        evaluation,
    };
    bundle.validate()?;
    Ok(TrainingOutcome {
        bundle,
        train_rows: split.train.len(),
        imputed_cells,
        held_out,
    })
}

/// Load `dataset_path`, train, and write the bundle to `artifact_path`.
pub fn train_and_save(
    dataset_path: &Path,
    artifact_path: &Path,
    options: &TrainingOptions,
) -> Result<TrainingOutcome, TrainError> {
    let dataset = load_csv(dataset_path)?;
    let outcome = train_bundle(dataset, options)?;
    artifact::save(&outcome.bundle, artifact_path)?;
    Ok(outcome)
}

/// Scores of a labeled dataset against an already trained bundle.
#[derive(Debug, Clone, Default)]
pub struct DatasetEvaluation {
    pub confusion: BinaryConfusion,
    pub imputed_cells: usize,
    /// Rows the bundle cannot encode, mostly categories it never saw.
    pub rejected: usize,
    /// Row index and error of the first rejected row.
    pub first_rejection: Option<(usize, PreprocessError)>,
}

/// Impute with the bundle's stored statistics and score every row.
///
/// Rows that fail to encode are counted, never coerced.
pub fn evaluate_dataset(predictor: &Predictor, mut dataset: StudentDataset) -> DatasetEvaluation {
    let mut evaluation = DatasetEvaluation {
        imputed_cells: predictor.bundle().imputation.apply(&mut dataset),
        ..DatasetEvaluation::default()
    };
    for (row, &truth) in dataset.target().iter().enumerate() {
        match predictor.predict_with(&dataset.row_record(row), RangePolicy::PassThrough) {
            Ok(prediction) => evaluation.confusion.add(truth, prediction.label),
            Err(err) => {
                evaluation.rejected += 1;
                evaluation.first_rejection.get_or_insert((row, err));
            }
        }
    }
    tracing::info!(
        "Scored {} rows, rejected {}",
        evaluation.confusion.total(),
        evaluation.rejected
    );
    evaluation
}

fn fit_encoders(dataset: &StudentDataset) -> BTreeMap<String, CategoryEncoder> {
    dataset
        .columns()
        .iter()
        .filter_map(|column| match &column.values {
            ColumnValues::Categorical(values) => Some((
                column.name.clone(),
                CategoryEncoder::fit(
                    column.name.as_str(),
                    values.iter().flatten().map(String::as_str),
                ),
            )),
            ColumnValues::Numeric(_) => None,
        })
        .collect()
}
