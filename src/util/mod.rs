//! Shared utility helpers.

pub mod error;
pub(crate) mod rows;

pub use error::{StereoError, StereoResult};
