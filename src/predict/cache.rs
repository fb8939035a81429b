use std::path::{Path, PathBuf};

use crate::artifact::ArtifactError;

use super::Predictor;

/// Lifecycle of the cached bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    NotLoaded,
    Loaded,
    /// Loading failed; the error is kept and never retried.
    Failed,
}

/// Loads the artifact bundle on first use and keeps the outcome for the
/// lifetime of the process.
#[derive(Debug)]
pub struct BundleCache {
    path: PathBuf,
    threshold: f32,
    slot: Option<Result<Predictor, ArtifactError>>,
    load_attempts: u32,
}

impl BundleCache {
    pub fn new(path: impl Into<PathBuf>, threshold: f32) -> Self {
        Self {
            path: path.into(),
            threshold,
            slot: None,
            load_attempts: 0,
        }
    }

    /// Already-loaded predictor, for callers that build the bundle in memory.
    pub fn preloaded(path: impl Into<PathBuf>, predictor: Predictor) -> Self {
        Self {
            path: path.into(),
            threshold: predictor.threshold(),
            slot: Some(Ok(predictor)),
            load_attempts: 0,
        }
    }

    /// The predictor, loading it on the first call.
    pub fn get(&mut self) -> Result<&Predictor, &ArtifactError> {
        let path = &self.path;
        let threshold = self.threshold;
        let attempts = &mut self.load_attempts;
        self.slot
            .get_or_insert_with(|| {
                *attempts += 1;
                let loaded = Predictor::load(path, threshold);
                if let Err(err) = &loaded {
                    tracing::error!("Model artifact unavailable: {err}");
                }
                loaded
            })
            .as_ref()
    }

    pub fn state(&self) -> CacheState {
        match &self.slot {
            None => CacheState::NotLoaded,
            Some(Ok(_)) => CacheState::Loaded,
            Some(Err(_)) => CacheState::Failed,
        }
    }

    /// How many times the artifact file was read.
    pub fn load_attempts(&self) -> u32 {
        self.load_attempts
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{self, fixture_bundle};

    #[test]
    fn loads_once_and_reuses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        artifact::save(&fixture_bundle(), &path).unwrap();

        let mut cache = BundleCache::new(&path, 0.5);
        assert_eq!(cache.state(), CacheState::NotLoaded);
        assert!(cache.get().is_ok());
        std::fs::remove_file(&path).unwrap();
        assert!(cache.get().is_ok());
        assert_eq!(cache.state(), CacheState::Loaded);
        assert_eq!(cache.load_attempts(), 1);
    }

    #[test]
    fn failure_is_sticky() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let mut cache = BundleCache::new(&path, 0.5);
        assert!(matches!(cache.get(), Err(ArtifactError::Missing { .. })));

        // A bundle appearing later is not picked up.
        artifact::save(&fixture_bundle(), &path).unwrap();
        assert!(cache.get().is_err());
        assert_eq!(cache.state(), CacheState::Failed);
        assert_eq!(cache.load_attempts(), 1);
    }

    #[test]
    fn preloaded_cache_never_reads_disk() {
        let predictor = Predictor::from_bundle(fixture_bundle(), 0.5).unwrap();
        let mut cache = BundleCache::preloaded("unused.json", predictor);
        assert!(cache.get().is_ok());
        assert_eq!(cache.load_attempts(), 0);
    }
}
