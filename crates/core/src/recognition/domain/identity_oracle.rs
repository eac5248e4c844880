use super::face_classifier::FaceClassifier;
use super::face_sample::FaceSample;

/// Outcome of classifying one face sample.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identification {
    /// Every classifier predicted this label.
    Unanimous(String),
    /// Classifiers disagreed; predictions in classifier order.
    Split(Vec<String>),
}

impl Identification {
    /// Folds per-classifier predictions: unanimous iff all are equal.
    pub fn from_predictions(mut predictions: Vec<String>) -> Self {
        let unanimous = predictions
            .first()
            .is_some_and(|first| predictions.iter().all(|p| p == first));
        if unanimous {
            Identification::Unanimous(predictions.swap_remove(0))
        } else {
            Identification::Split(predictions)
        }
    }

    /// The agreed label, if any.
    pub fn label(&self) -> Option<&str> {
        match self {
            Identification::Unanimous(label) => Some(label.as_str()),
            Identification::Split(_) => None,
        }
    }

    pub fn is(&self, identity: &str) -> bool {
        self.label() == Some(identity)
    }
}

/// Maps a normalized face sample to an identity.
pub trait IdentityOracle: Send {
    fn classify(
        &mut self,
        sample: &FaceSample,
    ) -> Result<Identification, Box<dyn std::error::Error>>;
}

/// Require-all-agree ensemble over independent classifiers.
///
/// Every classifier is invoked on every sample; a single disagreement
/// yields [`Identification::Split`].
pub struct UnanimousEnsemble {
    classifiers: Vec<Box<dyn FaceClassifier>>,
}

impl UnanimousEnsemble {
    pub fn new(classifiers: Vec<Box<dyn FaceClassifier>>) -> Result<Self, &'static str> {
        if classifiers.is_empty() {
            return Err("ensemble needs at least one classifier");
        }
        Ok(Self { classifiers })
    }

    pub fn len(&self) -> usize {
        self.classifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classifiers.is_empty()
    }
}

impl IdentityOracle for UnanimousEnsemble {
    fn classify(
        &mut self,
        sample: &FaceSample,
    ) -> Result<Identification, Box<dyn std::error::Error>> {
        let mut predictions = Vec::with_capacity(self.classifiers.len());
        for classifier in &mut self.classifiers {
            let label = classifier.predict(sample)?;
            log::debug!("{} predicted {label}", classifier.name());
            predictions.push(label);
        }
        Ok(Identification::from_predictions(predictions))
    }
}
