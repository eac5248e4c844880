use super::face_sample::FaceSample;

/// A single pretrained identity classifier.
///
/// Implementations may hold inference sessions that need exclusive access,
/// hence `&mut self`.
pub trait FaceClassifier: Send {
    /// Short name used in logs (e.g. `"svm"`, `"knn-5"`).
    fn name(&self) -> &str;

    fn predict(&mut self, sample: &FaceSample) -> Result<String, Box<dyn std::error::Error>>;
}
