use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stereomatch::{GrayImage, PipelineConfig, RgbaImage, StereoError, StereoPipeline};

fn small_config() -> PipelineConfig {
    PipelineConfig {
        max_disparity: 4,
        window_width: 3,
        window_height: 3,
        cross_check_threshold: 2,
        occlusion_neighborhood: 256,
        scale_factor: 1,
        parallel: false,
    }
}

fn rgba_from_gray(values: &[u8], width: usize, height: usize) -> RgbaImage {
    let data = values.iter().flat_map(|&v| [v, v, v, 255]).collect();
    RgbaImage::new(data, width, height).unwrap()
}

#[test]
fn identical_flat_pair_yields_zero_disparity() {
    let gray = vec![120u8; 8 * 8];
    let left = rgba_from_gray(&gray, 8, 8);
    let right = left.clone();
    let pipeline = StereoPipeline::new(small_config()).unwrap();
    let out = pipeline.run(&left, &right).unwrap();

    assert_eq!(out.dims(), (8, 8));
    assert!(out.disparity.data().iter().all(|&d| d == 0));
    // Normalizing the all-zero map is defined.
    assert!(out.depth.data().iter().all(|&v| v == 0));
    let stages: Vec<_> = out.timings.iter().map(|t| t.stage).collect();
    assert_eq!(
        stages,
        vec![
            "scale_gray",
            "zncc_lr",
            "zncc_rl",
            "cross_check",
            "occlusion_fill",
            "normalize"
        ]
    );
}

#[test]
fn identical_textured_pairs_yield_zero_disparity() {
    let pipeline = StereoPipeline::new(small_config()).unwrap();
    for seed in 0..100u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let gray: Vec<u8> = (0..8 * 8).map(|_| rng.random_range(0..=255)).collect();
        let left = GrayImage::new(gray.clone(), 8, 8).unwrap();
        let right = GrayImage::new(gray, 8, 8).unwrap();
        let out = pipeline.run_gray(left, right).unwrap();

        assert!(
            out.disparity_lr.data().iter().all(|&d| d == 0),
            "seed {seed}: lr {:?}",
            out.disparity_lr.data()
        );
        assert!(
            out.disparity.data().iter().all(|&d| d == 0),
            "seed {seed}: final {:?}",
            out.disparity.data()
        );
        assert!(out.depth.data().iter().all(|&v| v == 0));
    }
}

#[test]
fn shifted_texture_is_recovered_at_working_resolution() {
    // Full resolution shift of 8 pixels becomes 4 after downscaling by 2.
    let (w, h, shift) = (96, 32, 8);
    let base_width = w + shift;
    let mut rng = StdRng::seed_from_u64(42);
    let base: Vec<u8> = (0..base_width * h).map(|_| rng.random_range(0..=255)).collect();
    let mut left = vec![0u8; w * h];
    let mut right = vec![0u8; w * h];
    for y in 0..h {
        for x in 0..w {
            left[y * w + x] = base[y * base_width + x];
            right[y * w + x] = base[y * base_width + x + shift];
        }
    }

    let cfg = PipelineConfig {
        max_disparity: 8,
        window_width: 5,
        window_height: 5,
        scale_factor: 2,
        ..small_config()
    };
    let pipeline = StereoPipeline::new(cfg).unwrap();
    let out = pipeline
        .run(&rgba_from_gray(&left, w, h), &rgba_from_gray(&right, w, h))
        .unwrap();

    let (ww, wh) = out.dims();
    assert_eq!((ww, wh), (48, 16));
    for y in 0..wh {
        for x in 11..ww - 11 {
            assert_eq!(out.disparity.get(x, y), Some(4), "{x},{y}");
        }
    }
    assert!(out.disparity_cc.hole_count() >= out.disparity.hole_count());
    assert_eq!(out.intermediates().unwrap().len(), 5);
}

#[test]
fn gray_entry_point_rejects_size_mismatch() {
    let pipeline = StereoPipeline::new(small_config()).unwrap();
    let a = GrayImage::new(vec![0; 16], 4, 4).unwrap();
    let b = GrayImage::new(vec![0; 20], 5, 4).unwrap();
    let err = pipeline.run_gray(a, b).unwrap_err();
    assert_eq!(
        err,
        StereoError::DimensionMismatch {
            left_width: 4,
            left_height: 4,
            right_width: 5,
            right_height: 4,
        }
    );
}

#[test]
fn non_divisible_scale_aborts() {
    let cfg = PipelineConfig {
        scale_factor: 3,
        ..small_config()
    };
    let pipeline = StereoPipeline::new(cfg).unwrap();
    let img = rgba_from_gray(&[0; 8 * 8], 8, 8);
    assert!(matches!(
        pipeline.run(&img, &img),
        Err(StereoError::ScaleNotDivisible { factor: 3, .. })
    ));
}
