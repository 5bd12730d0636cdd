//! Finite-difference derivative, interpolation and smoothing utilities.

use nalgebra::DVector;

/// Endpoint-clamped linear interpolation of `fs` (defined on ascending `xs`)
/// at the query position `x`.
pub fn interp(x: f64, xs: &DVector<f64>, fs: &DVector<f64>) -> f64 {
    let n = xs.len();
    debug_assert_eq!(n, fs.len());
    if x <= xs[0] {
        return fs[0];
    }
    if x >= xs[n - 1] {
        return fs[n - 1];
    }
    // first index with xs[i] > x; the bracket is then [i-1, i]
    let i = xs.as_slice().partition_point(|&p| p <= x);
    let (x0, x1) = (xs[i - 1], xs[i]);
    let t = (x - x0) / (x1 - x0);
    fs[i - 1] + t * (fs[i] - fs[i - 1])
}

/// Index of the grid point closest to `target`.
pub fn nearest_index(xs: &DVector<f64>, target: f64) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (k, &x) in xs.iter().enumerate() {
        let d = (x - target).abs();
        if d < best_dist {
            best_dist = d;
            best = k;
        }
    }
    best
}

/// Centered-difference derivative of `f` with respect to `r`.
///
/// Interior points use the two neighbours; both ends fall back to one-sided
/// slopes.
pub fn centered_derivative(f: &DVector<f64>, r: &DVector<f64>) -> DVector<f64> {
    let n = f.len();
    debug_assert_eq!(n, r.len());
    let mut dfdr = DVector::zeros(n);
    dfdr[0] = (f[1] - f[0]) / (r[1] - r[0]);
    for k in 1..n - 1 {
        dfdr[k] = (f[k + 1] - f[k - 1]) / (r[k + 1] - r[k - 1]);
    }
    dfdr[n - 1] = (f[n - 1] - f[n - 2]) / (r[n - 1] - r[n - 2]);
    dfdr
}

/// Bartlett (triangular) window of length `m`, zero at both endpoints.
fn bartlett(m: usize) -> Vec<f64> {
    (0..m)
        .map(|k| 1.0 - ((2.0 * k as f64) / (m as f64 - 1.0) - 1.0).abs())
        .collect()
}

/// Smooth `x` with a normalized Bartlett window of width `w_len`, padding
/// both ends by point reflection so the output has the input's length.
///
/// Windows shorter than 3, or inputs too short to pad, are returned
/// unchanged.
pub fn bartlett_smooth(x: &DVector<f64>, w_len: usize) -> DVector<f64> {
    let n = x.len();
    if w_len < 3 || n < w_len + 1 {
        return x.clone();
    }
    // reflected padding: w_len-1 points on each side
    let mut s = Vec::with_capacity(n + 2 * (w_len - 1));
    for i in 0..w_len - 1 {
        s.push(2.0 * x[0] - x[w_len - i]);
    }
    s.extend(x.iter().copied());
    for i in 0..w_len - 1 {
        s.push(2.0 * x[n - 1] - x[n - 1 - i]);
    }

    let mut w = bartlett(w_len);
    let wsum: f64 = w.iter().sum();
    for wk in w.iter_mut() {
        *wk /= wsum;
    }

    // valid-mode convolution (the window is symmetric)
    let m = s.len() - w_len + 1;
    let mut y = Vec::with_capacity(m);
    for i in 0..m {
        let mut acc = 0.0;
        for (k, &wk) in w.iter().enumerate() {
            acc += wk * s[i + k];
        }
        y.push(acc);
    }
    let half = w_len / 2;
    DVector::from_iterator(n, y[half..half + n].iter().copied())
}
