//! Stereomatch computes dense disparity maps from a rectified stereo pair.
//!
//! The pipeline downscales both views to grayscale, runs a windowed ZNCC
//! search in each direction, rejects pixels where the two directions disagree
//! and fills the resulting holes from their nearest valid neighbours. Every
//! stage is a pure function of its inputs; with the `rayon` feature rows are
//! processed in parallel with bit-identical results.

pub mod image;
pub mod kernel;
pub mod matcher;
pub mod pipeline;
pub mod post;
mod trace;
pub mod util;

pub use crate::image::scale::scale_gray;
pub use crate::image::{DisparityMap, GrayImage, ImageView, OwnedImage, RgbaImage};
pub use kernel::{Kernel, Window, WindowScore};
pub use matcher::{DisparityMatcher, DisparityRange, MatchConfig};
pub use pipeline::{PipelineConfig, StereoOutput, StereoPipeline};
pub use post::{cross_check, fill_occlusions, normalize, normalize_gray, normalize_rgba};
pub use trace::StageTiming;
pub use util::{StereoError, StereoResult};

#[cfg(feature = "image-io")]
pub use crate::image::io;
