use image::GrayImage;

const K1: f64 = 0.01;
const K2: f64 = 0.03;
const DYNAMIC_RANGE: f64 = 255.0;
const WINDOW: u32 = 8;

/// Structural similarity index over two equally sized single-channel
/// images: mean SSIM over non-overlapping 8x8 windows (edge windows are
/// clipped). Result is in approximately [-1, 1]; identical inputs score
/// exactly 1.0 and the measure is symmetric.
pub fn score(a: &GrayImage, b: &GrayImage) -> f64 {
    debug_assert_eq!(a.dimensions(), b.dimensions());

    let (width, height) = a.dimensions();
    if width == 0 || height == 0 {
        return 0.0;
    }

    let c1 = (K1 * DYNAMIC_RANGE).powi(2);
    let c2 = (K2 * DYNAMIC_RANGE).powi(2);

    let mut total = 0.0;
    let mut windows = 0u32;

    let mut y = 0;
    while y < height {
        let win_h = WINDOW.min(height - y);
        let mut x = 0;
        while x < width {
            let win_w = WINDOW.min(width - x);
            total += window_score(a, b, x, y, win_w, win_h, c1, c2);
            windows += 1;
            x += WINDOW;
        }
        y += WINDOW;
    }

    total / f64::from(windows)
}

#[allow(clippy::too_many_arguments)]
fn window_score(
    a: &GrayImage,
    b: &GrayImage,
    x0: u32,
    y0: u32,
    win_w: u32,
    win_h: u32,
    c1: f64,
    c2: f64,
) -> f64 {
    let n = f64::from(win_w * win_h);

    let mut sum_a = 0.0;
    let mut sum_b = 0.0;
    for y in y0..y0 + win_h {
        for x in x0..x0 + win_w {
            sum_a += f64::from(a.get_pixel(x, y).0[0]);
            sum_b += f64::from(b.get_pixel(x, y).0[0]);
        }
    }
    let mean_a = sum_a / n;
    let mean_b = sum_b / n;

    let mut var_a = 0.0;
    let mut var_b = 0.0;
    let mut covar = 0.0;
    for y in y0..y0 + win_h {
        for x in x0..x0 + win_w {
            let da = f64::from(a.get_pixel(x, y).0[0]) - mean_a;
            let db = f64::from(b.get_pixel(x, y).0[0]) - mean_b;
            var_a += da * da;
            var_b += db * db;
            covar += da * db;
        }
    }
    var_a /= n;
    var_b /= n;
    covar /= n;

    ((2.0 * mean_a * mean_b + c1) * (2.0 * covar + c2))
        / ((mean_a * mean_a + mean_b * mean_b + c1) * (var_a + var_b + c2))
}
