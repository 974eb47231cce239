//! Left/right consistency check.

use crate::image::DisparityMap;
use crate::trace::{trace_event, trace_span};
use crate::util::rows::fill_rows;
use crate::util::{StereoError, StereoResult};

/// Keeps `lr[p]` where `|lr[p] - rl[p]| <= threshold`, writes 0 elsewhere.
///
/// Both maps must hold magnitudes on the same scale, i.e. the outputs of a
/// left-reference and a right-reference search.
pub fn cross_check(
    lr: &DisparityMap,
    rl: &DisparityMap,
    threshold: u32,
    parallel: bool,
) -> StereoResult<DisparityMap> {
    if lr.dims() != rl.dims() {
        return Err(StereoError::mismatch(lr.dims(), rl.dims()));
    }
    if threshold == 0 {
        return Err(StereoError::Configuration(
            "cross-check threshold must be positive",
        ));
    }
    let (width, height) = lr.dims();
    let _span = trace_span!("cross_check", threshold).entered();

    let lr_data = lr.data();
    let rl_data = rl.data();
    let mut out = vec![0u32; width * height];
    fill_rows(&mut out, width, parallel, |y, row| {
        let base = y * width;
        for (x, dst) in row.iter_mut().enumerate() {
            let a = lr_data[base + x];
            let b = rl_data[base + x];
            *dst = if a.abs_diff(b) > threshold { 0 } else { a };
        }
    });

    let map = DisparityMap::new(out, width, height)?;
    trace_event!("cross_check_done", holes = map.hole_count());
    Ok(map)
}
