//! Face-authenticated banking kiosk.
//!
//! Each area is split into `domain` (traits and pure logic) and
//! `infrastructure` (camera, ONNX Runtime, filesystem and HTTP adapters).

pub mod audit;
pub mod auth;
pub mod banking;
pub mod capture;
pub mod detection;
pub mod pipeline;
pub mod recognition;
pub mod shared;
