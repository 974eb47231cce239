//! Post-processing of raw disparity maps.
//!
//! Cross-checking rejects pixels on which the two search directions disagree,
//! occlusion filling copies the nearest surviving disparity into rejected
//! pixels, and normalization stretches a map to the displayable 0..=255 range.

pub mod consistency;
pub mod normalize;
pub mod occlusion;

pub use consistency::cross_check;
pub use normalize::{normalize, normalize_gray, normalize_rgba};
pub use occlusion::{fill_occlusions, ring_offsets};
