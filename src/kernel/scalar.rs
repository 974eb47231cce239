//! Scalar reference kernel for ZNCC score evaluation.

use crate::kernel::{finish_score, window_sums, Kernel, Support, Window, WindowScore};
use crate::ImageView;

/// Scalar two-pass ZNCC kernel.
pub struct ZnccScalar;

impl Kernel for ZnccScalar {
    fn score_at(
        reference: ImageView<'_, u8>,
        comparison: ImageView<'_, u8>,
        x: usize,
        y: usize,
        d: i32,
        window: Window,
    ) -> Option<WindowScore> {
        let support = Support::clip(reference.width(), reference.height(), x, y, d, window)?;
        let samples = support.len();
        let n = samples as f32;
        let (sum_l, sum_r) = window_sums(reference, comparison, &support)?;
        let mean_l = sum_l as f32 / n;
        let mean_r = sum_r as f32 / n;

        let cols = support.cols();
        let mut cross = 0.0f32;
        let mut var_l = 0.0f32;
        let mut var_r = 0.0f32;
        for row in support.y0..=support.y1 {
            let l_row = reference.row(row)?.get(support.x0..support.x0 + cols)?;
            let r_row = comparison.row(row)?.get(support.cx0..support.cx0 + cols)?;
            for (&l, &r) in l_row.iter().zip(r_row) {
                let cl = l as f32 - mean_l;
                let cr = r as f32 - mean_r;
                cross += cl * cr;
                var_l += cl * cl;
                var_r += cr * cr;
            }
        }

        finish_score(cross, var_l, var_r, samples)
    }
}

#[cfg(test)]
mod tests {
    use super::ZnccScalar;
    use crate::kernel::{Kernel, Window};
    use crate::ImageView;

    fn brute_force(
        left: &[u8],
        right: &[u8],
        (w, h): (usize, usize),
        (x, y): (usize, usize),
        d: i32,
    ) -> Option<f64> {
        let mut pairs = Vec::new();
        for yy in y as i64 - 1..=y as i64 + 1 {
            for xx in x as i64 - 1..=x as i64 + 1 {
                let cx = xx - i64::from(d);
                let inside = |v: i64, n: usize| v >= 0 && v < n as i64;
                if !inside(yy, h) || !inside(xx, w) || !inside(cx, w) {
                    continue;
                }
                let row = yy as usize * w;
                pairs.push((left[row + xx as usize] as f64, right[row + cx as usize] as f64));
            }
        }
        if pairs.is_empty() {
            return None;
        }
        let n = pairs.len() as f64;
        let ml = pairs.iter().map(|p| p.0).sum::<f64>() / n;
        let mr = pairs.iter().map(|p| p.1).sum::<f64>() / n;
        let (mut c, mut vl, mut vr) = (0.0, 0.0, 0.0);
        for (l, r) in pairs {
            c += (l - ml) * (r - mr);
            vl += (l - ml) * (l - ml);
            vr += (r - mr) * (r - mr);
        }
        if vl == 0.0 || vr == 0.0 {
            return None;
        }
        Some(c / (vl.sqrt() * vr.sqrt()))
    }

    #[test]
    fn matches_brute_force_including_borders() {
        let (w, h) = (7, 5);
        let left: Vec<u8> = (0..w * h).map(|i| ((i * 37 + 11) % 251) as u8).collect();
        let right: Vec<u8> = (0..w * h).map(|i| ((i * 53 + 7) % 241) as u8).collect();
        let lv = ImageView::from_slice(&left, w, h).unwrap();
        let rv = ImageView::from_slice(&right, w, h).unwrap();
        let window = Window::new(1, 1);
        for y in 0..h {
            for x in 0..w {
                for d in -3..=3 {
                    let got = ZnccScalar::score_at(lv, rv, x, y, d, window);
                    let want = brute_force(&left, &right, (w, h), (x, y), d);
                    match (got, want) {
                        (Some(g), Some(e)) => {
                            assert!((g.score as f64 - e).abs() < 1e-4, "{x},{y},{d}");
                            assert!(g.samples > 0);
                        }
                        (None, None) => {}
                        (g, e) => panic!("{x},{y},{d}: {g:?} vs {e:?}"),
                    }
                }
            }
        }
    }

    #[test]
    fn identical_windows_score_one() {
        let data: Vec<u8> = (0..25).map(|i| ((i * 29) % 97) as u8).collect();
        let view = ImageView::from_slice(&data, 5, 5).unwrap();
        let score = ZnccScalar::score_at(view, view, 2, 2, 0, Window::new(1, 1)).unwrap();
        assert_eq!(score.score, 1.0);
        assert_eq!(score.samples, 9);
    }

    #[test]
    fn flat_window_is_undefined() {
        let flat = vec![42u8; 16];
        let textured: Vec<u8> = (0..16).map(|i| (i * 13) as u8).collect();
        let fv = ImageView::from_slice(&flat, 4, 4).unwrap();
        let tv = ImageView::from_slice(&textured, 4, 4).unwrap();
        assert!(ZnccScalar::score_at(fv, tv, 1, 1, 0, Window::new(1, 1)).is_none());
        assert!(ZnccScalar::score_at(tv, fv, 1, 1, 0, Window::new(1, 1)).is_none());
    }
}
