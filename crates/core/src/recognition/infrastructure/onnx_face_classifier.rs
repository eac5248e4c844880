use std::path::Path;

use crate::recognition::domain::face_classifier::FaceClassifier;
use crate::recognition::domain::face_sample::FaceSample;

/// Pretrained identity classifier exported to ONNX.
///
/// The model takes a `[1, 2500]` float tensor (one flattened 50x50 gray
/// face) and emits an integer class index as its first output. Indices are
/// mapped to identities through a labels file, one label per line.
pub struct OnnxFaceClassifier {
    session: ort::session::Session,
    labels: Vec<String>,
    name: String,
}

impl OnnxFaceClassifier {
    pub fn new(
        model_path: &Path,
        labels: Vec<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        if labels.is_empty() {
            return Err("classifier needs at least one label".into());
        }
        let session = ort::session::Session::builder()?.commit_from_file(model_path)?;
        let name = model_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("onnx")
            .to_string();
        log::debug!("Loaded classifier {name} with {} labels", labels.len());
        Ok(Self {
            session,
            labels,
            name,
        })
    }
}

impl FaceClassifier for OnnxFaceClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&mut self, sample: &FaceSample) -> Result<String, Box<dyn std::error::Error>> {
        let input = ort::value::Tensor::from_array(sample.to_ndarray())?;
        let outputs = self.session.run(ort::inputs![input])?;
        if outputs.len() == 0 {
            return Err(format!("{} produced no outputs", self.name).into());
        }
        let classes = outputs[0].try_extract_array::<i64>()?;
        let index = *classes
            .iter()
            .next()
            .ok_or_else(|| format!("{} produced an empty prediction", self.name))?;
        label_for(&self.labels, index)
            .map(str::to_string)
            .ok_or_else(|| format!("{} predicted unknown class {index}", self.name).into())
    }
}

fn label_for(labels: &[String], index: i64) -> Option<&str> {
    usize::try_from(index)
        .ok()
        .and_then(|i| labels.get(i))
        .map(String::as_str)
}

/// Read a labels file: one identity per line, blank lines skipped.
pub fn load_labels(path: &Path) -> Result<Vec<String>, std::io::Error> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn labels() -> Vec<String> {
        vec!["Eve".into(), "Gopal".into()]
    }

    #[rstest]
    #[case(0, Some("Eve"))]
    #[case(1, Some("Gopal"))]
    #[case(2, None)]
    #[case(-1, None)]
    fn test_label_for(#[case] index: i64, #[case] expected: Option<&str>) {
        assert_eq!(label_for(&labels(), index), expected);
    }

    #[test]
    fn test_load_labels_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.txt");
        std::fs::write(&path, "Eve\n\n  Gopal  \n").unwrap();
        assert_eq!(load_labels(&path).unwrap(), labels());
    }

    #[test]
    fn test_load_labels_missing_file() {
        assert!(load_labels(Path::new("/nonexistent/labels.txt")).is_err());
    }

    #[test]
    fn test_new_rejects_empty_labels() {
        let result = OnnxFaceClassifier::new(Path::new("/nonexistent/svm.onnx"), Vec::new());
        assert!(result.is_err());
    }
}
