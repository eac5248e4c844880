pub mod gallery;
pub mod nearest_neighbour_classifier;
pub mod onnx_face_classifier;
