use std::collections::HashMap;

use crate::recognition::domain::face_classifier::FaceClassifier;
use crate::recognition::domain::face_sample::FaceSample;

use super::gallery::Gallery;

/// Neighbour counts of the default gallery ensemble, one classifier each.
pub const DEFAULT_KNN_KS: [usize; 2] = [1, 5];

/// k-nearest-neighbour vote over an enrolled gallery (Euclidean distance
/// on raw 50x50 samples).
///
/// Ties in vote count go to the label whose closest neighbour is nearest.
pub struct NearestNeighbourClassifier {
    gallery: Gallery,
    k: usize,
    name: String,
}

impl NearestNeighbourClassifier {
    pub fn new(gallery: Gallery, k: usize) -> Result<Self, &'static str> {
        if k == 0 {
            return Err("k must be >= 1");
        }
        if gallery.is_empty() {
            return Err("gallery is empty");
        }
        Ok(Self {
            gallery,
            k,
            name: format!("knn-{k}"),
        })
    }

    fn vote(&self, sample: &FaceSample) -> Option<String> {
        let mut neighbours: Vec<(f32, &str)> = self
            .gallery
            .entries()
            .iter()
            .map(|(label, s)| (sample.squared_distance(s), label.as_str()))
            .collect();
        neighbours.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        neighbours.truncate(self.k);

        // label -> (votes, rank of nearest member)
        let mut tally: HashMap<&str, (usize, usize)> = HashMap::new();
        for (rank, (_, label)) in neighbours.iter().enumerate() {
            let entry = tally.entry(*label).or_insert((0, rank));
            entry.0 += 1;
        }

        tally
            .into_iter()
            .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(b.1 .1.cmp(&a.1 .1)))
            .map(|(label, _)| label.to_string())
    }
}

impl FaceClassifier for NearestNeighbourClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&mut self, sample: &FaceSample) -> Result<String, Box<dyn std::error::Error>> {
        self.vote(sample)
            .ok_or_else(|| "gallery produced no neighbours".into())
    }
}
