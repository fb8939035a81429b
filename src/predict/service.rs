use thiserror::Error;

use crate::config::AppSettings;
use crate::preprocess::{PreprocessError, RawRecord};

use super::{BundleCache, Prediction, Predictor};

#[derive(Debug, Error)]
pub enum ServeError {
    /// The bundle failed to load; every request is refused.
    #[error("Model unavailable: {0}")]
    Unavailable(String),
    /// This record could not be scored; the service stays usable.
    #[error(transparent)]
    Rejected(#[from] PreprocessError),
}

/// Single-model screening service behind the form.
#[derive(Debug)]
pub struct ScreeningService {
    cache: BundleCache,
}

impl ScreeningService {
    pub fn new(cache: BundleCache) -> Self {
        Self { cache }
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        Self::new(BundleCache::new(
            settings.paths.artifact.clone(),
            settings.serving.risk_threshold,
        ))
    }

    /// Load the bundle if needed; call once at startup before accepting input.
    pub fn ensure_ready(&mut self) -> Result<&Predictor, ServeError> {
        self.cache
            .get()
            .map_err(|err| ServeError::Unavailable(err.to_string()))
    }

    pub fn submit(&mut self, record: &RawRecord) -> Result<Prediction, ServeError> {
        let predictor = self.ensure_ready()?;
        match predictor.predict(record) {
            Ok(prediction) => {
                tracing::debug!(
                    "Scored record: label={} probability={:.4}",
                    prediction.label,
                    prediction.probability
                );
                Ok(prediction)
            }
            Err(err) => {
                tracing::warn!("Rejected submission: {err}");
                Err(err.into())
            }
        }
    }

    pub fn cache(&self) -> &BundleCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::fixture_bundle;
    use crate::predict::{CacheState, fixture_record};

    fn service() -> ScreeningService {
        let predictor = Predictor::from_bundle(fixture_bundle(), 0.5).unwrap();
        ScreeningService::new(BundleCache::preloaded("model.json", predictor))
    }

    #[test]
    fn unknown_category_is_rejected_then_recovers() {
        let mut service = service();
        let err = service.submit(&fixture_record("Other")).unwrap_err();
        assert!(matches!(
            err,
            ServeError::Rejected(PreprocessError::UnknownCategory { ref field, ref value })
                if field == "Gender" && value == "Other"
        ));
        assert_eq!(service.submit(&fixture_record("Male")).unwrap().label, 0);
    }

    #[test]
    fn out_of_range_answer_is_rejected() {
        let mut service = service();
        let record = fixture_record("Male").with_number("CGPA", 11.0);
        assert!(matches!(
            service.submit(&record),
            Err(ServeError::Rejected(PreprocessError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn missing_artifact_refuses_every_request() {
        let dir = tempfile::tempdir().unwrap();
        let mut service =
            ScreeningService::new(BundleCache::new(dir.path().join("missing.json"), 0.5));
        assert!(matches!(service.ensure_ready(), Err(ServeError::Unavailable(_))));
        for _ in 0..3 {
            assert!(matches!(
                service.submit(&fixture_record("Male")),
                Err(ServeError::Unavailable(_))
            ));
        }
        assert_eq!(service.cache().state(), CacheState::Failed);
        assert_eq!(service.cache().load_attempts(), 1);
    }
}
