pub mod face_classifier;
pub mod face_sample;
pub mod identity_oracle;
