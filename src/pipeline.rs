//! End-to-end disparity pipeline.
//!
//! Stages run strictly in order, each consuming the complete output of the
//! previous one:
//!
//! 1. downscale + grayscale both views,
//! 2. ZNCC search left-to-right over `[0, D]` and right-to-left over `[-D, 0]`,
//! 3. cross-check the two maps,
//! 4. fill occlusions,
//! 5. normalize for display.
//!
//! Any error aborts the run; no partial output is returned.

use crate::image::scale::scale_gray;
use crate::image::{DisparityMap, GrayImage, RgbaImage};
use crate::kernel::Window;
use crate::matcher::{DisparityMatcher, DisparityRange, MatchConfig};
use crate::post::{cross_check, fill_occlusions, normalize, normalize_gray};
use crate::trace::{trace_event, trace_span, StageTiming, StageTimer};
use crate::util::{StereoError, StereoResult};

/// Pipeline parameters, fixed for the duration of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Largest disparity searched, at the downscaled resolution.
    pub max_disparity: u32,
    /// Correlation window width (odd).
    pub window_width: usize,
    /// Correlation window height (odd).
    pub window_height: usize,
    /// Largest tolerated difference between the two directional maps.
    pub cross_check_threshold: u32,
    /// Occlusion search diameter; rings up to half of it are searched.
    pub occlusion_neighborhood: usize,
    /// Integer downscale factor applied to the input images.
    pub scale_factor: usize,
    /// Enable row parallelism (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_disparity: 64,
            window_width: 9,
            window_height: 9,
            cross_check_threshold: 2,
            occlusion_neighborhood: 256,
            scale_factor: 4,
            parallel: true,
        }
    }
}

impl PipelineConfig {
    /// Checks every parameter for degenerate values.
    pub fn validate(&self) -> StereoResult<()> {
        if self.scale_factor == 0 {
            return Err(StereoError::Configuration("scale factor must be at least 1"));
        }
        if self.cross_check_threshold == 0 {
            return Err(StereoError::Configuration(
                "cross-check threshold must be positive",
            ));
        }
        if self.occlusion_neighborhood < 2 {
            return Err(StereoError::Configuration(
                "occlusion neighborhood must be at least 2",
            ));
        }
        self.window()?;
        DisparityRange::left_to_right(self.max_disparity)?;
        Ok(())
    }

    /// Correlation window built from the configured extents.
    pub fn window(&self) -> StereoResult<Window> {
        Window::from_size(self.window_width, self.window_height)
    }

    fn match_config(&self) -> StereoResult<MatchConfig> {
        Ok(MatchConfig {
            window: self.window()?,
            parallel: self.parallel,
        })
    }
}

/// Every product of a pipeline run.
#[derive(Clone, Debug)]
pub struct StereoOutput {
    /// Downscaled grayscale left view.
    pub gray_left: GrayImage,
    /// Downscaled grayscale right view.
    pub gray_right: GrayImage,
    /// Left-reference disparity magnitudes.
    pub disparity_lr: DisparityMap,
    /// Right-reference disparity magnitudes.
    pub disparity_rl: DisparityMap,
    /// Cross-checked map, 0 marking rejected pixels.
    pub disparity_cc: DisparityMap,
    /// Occlusion-filled map.
    pub disparity: DisparityMap,
    /// `disparity` stretched to 0..=255.
    pub depth: GrayImage,
    /// Per-stage wall-clock timings in execution order.
    pub timings: Vec<StageTiming>,
}

impl StereoOutput {
    /// Working resolution shared by every map.
    pub fn dims(&self) -> (usize, usize) {
        self.disparity.dims()
    }

    /// Sum of all stage timings.
    pub fn total_millis(&self) -> f64 {
        self.timings.iter().map(StageTiming::millis).sum()
    }

    /// Normalized views of the intermediate products, keyed by a file stem.
    pub fn intermediates(&self) -> StereoResult<Vec<(&'static str, GrayImage)>> {
        Ok(vec![
            ("gray_left", normalize_gray(&self.gray_left)?),
            ("gray_right", normalize_gray(&self.gray_right)?),
            ("disparity_lr", normalize(&self.disparity_lr)?),
            ("disparity_rl", normalize(&self.disparity_rl)?),
            ("disparity_cc", normalize(&self.disparity_cc)?),
        ])
    }
}

/// Runs the stereo pipeline with a fixed configuration.
#[derive(Clone, Debug)]
pub struct StereoPipeline {
    cfg: PipelineConfig,
}

impl StereoPipeline {
    /// Creates a pipeline after validating `cfg`.
    pub fn new(cfg: PipelineConfig) -> StereoResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    /// Runs every stage on a full-resolution RGBA pair.
    pub fn run(&self, left: &RgbaImage, right: &RgbaImage) -> StereoResult<StereoOutput> {
        if left.dims() != right.dims() {
            return Err(StereoError::mismatch(left.dims(), right.dims()));
        }
        let _span = trace_span!(
            "pipeline",
            width = left.width(),
            height = left.height(),
            scale = self.cfg.scale_factor
        )
        .entered();

        let timer = StageTimer::start("scale_gray");
        let gray_left = scale_gray(left, self.cfg.scale_factor, self.cfg.parallel)?;
        let gray_right = scale_gray(right, self.cfg.scale_factor, self.cfg.parallel)?;
        let scale_timing = timer.finish();

        let mut out = self.run_gray(gray_left, gray_right)?;
        out.timings.insert(0, scale_timing);
        Ok(out)
    }

    /// Runs the matching and post-processing stages on a grayscale pair that
    /// is already at working resolution.
    pub fn run_gray(&self, gray_left: GrayImage, gray_right: GrayImage) -> StereoResult<StereoOutput> {
        if gray_left.dims() != gray_right.dims() {
            return Err(StereoError::mismatch(gray_left.dims(), gray_right.dims()));
        }
        let cfg = &self.cfg;
        let matcher = DisparityMatcher::default().with_config(cfg.match_config()?);
        let mut timings = Vec::with_capacity(6);

        let timer = StageTimer::start("zncc_lr");
        let disparity_lr = matcher.compute(
            gray_left.view(),
            gray_right.view(),
            DisparityRange::left_to_right(cfg.max_disparity)?,
        )?;
        timings.push(timer.finish());

        let timer = StageTimer::start("zncc_rl");
        let disparity_rl = matcher.compute(
            gray_right.view(),
            gray_left.view(),
            DisparityRange::right_to_left(cfg.max_disparity)?,
        )?;
        timings.push(timer.finish());

        let timer = StageTimer::start("cross_check");
        let disparity_cc = cross_check(
            &disparity_lr,
            &disparity_rl,
            cfg.cross_check_threshold,
            cfg.parallel,
        )?;
        timings.push(timer.finish());

        let timer = StageTimer::start("occlusion_fill");
        let disparity = fill_occlusions(&disparity_cc, cfg.occlusion_neighborhood, cfg.parallel)?;
        timings.push(timer.finish());

        let timer = StageTimer::start("normalize");
        let depth = normalize(&disparity)?;
        timings.push(timer.finish());

        trace_event!(
            "pipeline_done",
            holes_before_fill = disparity_cc.hole_count(),
            holes_after_fill = disparity.hole_count()
        );

        Ok(StereoOutput {
            gray_left,
            gray_right,
            disparity_lr,
            disparity_rl,
            disparity_cc,
            disparity,
            depth,
            timings,
        })
    }
}
