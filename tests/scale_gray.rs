use stereomatch::{scale_gray, RgbaImage};

fn put(data: &mut [u8], width: usize, x: usize, y: usize, rgb: [u8; 3]) {
    let idx = (y * width + x) * 4;
    data[idx..idx + 3].copy_from_slice(&rgb);
    data[idx + 3] = 255;
}

#[test]
fn output_dimensions_divide_by_factor() {
    for (w, h, s) in [(8, 4, 1), (8, 4, 2), (12, 8, 4), (20, 15, 5), (3, 3, 3)] {
        let rgba = RgbaImage::new(vec![17u8; w * h * 4], w, h).unwrap();
        let gray = scale_gray(&rgba, s, false).unwrap();
        assert_eq!(gray.dims(), (w / s, h / s), "{w}x{h} / {s}");
    }
}

#[test]
fn samples_match_hand_computed_block() {
    let (w, h) = (8, 4);
    let mut data = vec![0u8; w * h * 4];
    // Sampled source pixels for factor 2: columns 0, 1, 3, 5 and rows 0, 1.
    put(&mut data, w, 0, 0, [100, 200, 50]); // 167.91
    put(&mut data, w, 1, 0, [10, 0, 100]); // 9.346
    put(&mut data, w, 3, 0, [0, 255, 0]); // 182.376
    put(&mut data, w, 5, 0, [255, 0, 0]); // 54.213
    put(&mut data, w, 0, 1, [0, 0, 255]); // 18.411
    put(&mut data, w, 1, 1, [30, 10, 90]); // 20.028
    put(&mut data, w, 3, 1, [20, 40, 60]); // 37.192
    put(&mut data, w, 5, 1, [200, 100, 0]); // 114.04
    // Never sampled.
    put(&mut data, w, 2, 0, [250, 250, 250]);
    put(&mut data, w, 4, 1, [250, 250, 250]);
    put(&mut data, w, 0, 2, [250, 250, 250]);
    put(&mut data, w, 7, 3, [250, 250, 250]);

    let rgba = RgbaImage::new(data, w, h).unwrap();
    let gray = scale_gray(&rgba, 2, false).unwrap();
    assert_eq!(gray.dims(), (4, 2));
    assert_eq!(gray.data(), &[167, 9, 182, 54, 18, 20, 37, 114]);
}

#[test]
fn alpha_is_ignored() {
    let mut data = vec![0u8; 4];
    data.copy_from_slice(&[100, 200, 50, 0]);
    let rgba = RgbaImage::new(data, 1, 1).unwrap();
    assert_eq!(scale_gray(&rgba, 1, false).unwrap().data(), &[167]);
}
