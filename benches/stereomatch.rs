use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use stereomatch::{
    DisparityMatcher, DisparityRange, GrayImage, ImageView, MatchConfig, PipelineConfig,
    StereoPipeline, Window,
};

fn make_image(width: usize, height: usize, offset: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let x = x + offset;
            let value = ((x * 13) ^ (y * 7) ^ (x * y)) & 0xFF;
            data.push(value as u8);
        }
    }
    data
}

fn bench_matcher(c: &mut Criterion) {
    let (width, height) = (160, 120);
    let left = make_image(width, height, 0);
    let right = make_image(width, height, 6);
    let lv = ImageView::from_slice(&left, width, height).unwrap();
    let rv = ImageView::from_slice(&right, width, height).unwrap();
    let window = Window::new(4, 4);
    let range = DisparityRange::left_to_right(32).unwrap();

    for parallel in [false, true] {
        let matcher = DisparityMatcher::new(window).with_config(MatchConfig { window, parallel });
        let name = if parallel { "zncc_lr_par" } else { "zncc_lr_seq" };
        c.bench_function(name, |b| {
            b.iter(|| {
                let map = matcher
                    .compute(black_box(lv), black_box(rv), range)
                    .expect("match");
                black_box(map);
            })
        });
    }
}

fn bench_pipeline(c: &mut Criterion) {
    let (width, height) = (128, 96);
    let left = GrayImage::new(make_image(width, height, 0), width, height).unwrap();
    let right = GrayImage::new(make_image(width, height, 4), width, height).unwrap();
    let pipeline = StereoPipeline::new(PipelineConfig {
        max_disparity: 16,
        scale_factor: 1,
        ..PipelineConfig::default()
    })
    .unwrap();

    c.bench_function("pipeline_gray_128x96", |b| {
        b.iter(|| {
            let out = pipeline
                .run_gray(black_box(left.clone()), black_box(right.clone()))
                .expect("pipeline");
            black_box(out);
        })
    });
}

criterion_group!(benches, bench_matcher, bench_pipeline);
criterion_main!(benches);
