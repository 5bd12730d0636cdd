#[cfg(test)]
mod tests {
    use crate::Numerics::finite_diff::{
        bartlett_smooth, centered_derivative, interp, nearest_index,
    };
    use crate::Numerics::rk4::{SlopeSource, integrate};
    use crate::config::WindConfig;
    use approx::assert_relative_eq;
    use nalgebra::DVector;

    fn exp_decay_profiles(n: usize, length: f64) -> (DVector<f64>, DVector<f64>, DVector<f64>) {
        // f(r) = exp(-r/L), df/dr = -f/L on r in [0, 5L]
        let r = DVector::from_iterator(n, (0..n).map(|k| 5.0 * length * k as f64 / (n - 1) as f64));
        let f = r.map(|rv| (-rv / length).exp());
        let dfdr = f.map(|fv| -fv / length);
        (r, f, dfdr)
    }

    #[test]
    fn rk4_matches_exponential_decay_upward() {
        let config = WindConfig::default();
        let length = 2.0;
        let (r, _, dfdr) = exp_decay_profiles(400, length);
        let f0 = 1.0;
        let dr = 3.0;
        let out = integrate(f0, 0.0, dr, &r, SlopeSource::Plain(&dfdr), &config).unwrap();
        assert_relative_eq!(out.value, (-dr / length).exp(), max_relative = 1e-4);
        assert!(!out.capped);
    }

    #[test]
    fn rk4_matches_exponential_decay_downward() {
        let config = WindConfig::default();
        let length = 2.0;
        let (r, _, dfdr) = exp_decay_profiles(400, length);
        // start at r=4 with the analytic value there, integrate back by -3
        let f0 = (-4.0f64 / length).exp();
        let out = integrate(f0, 4.0, -3.0, &r, SlopeSource::Plain(&dfdr), &config).unwrap();
        assert_relative_eq!(out.value, (-1.0f64 / length).exp(), max_relative = 1e-4);
    }

    #[test]
    fn rk4_zero_distance_is_identity() {
        let config = WindConfig::default();
        let (r, _, dfdr) = exp_decay_profiles(50, 1.0);
        let out = integrate(3.7, 1.0, 0.0, &r, SlopeSource::Plain(&dfdr), &config).unwrap();
        assert_eq!(out.value, 3.7);
        assert_eq!(out.substeps, 0);
    }

    #[test]
    fn rk4_reports_substep_cap() {
        let mut config = WindConfig::default();
        config.max_substeps = 3;
        // steep logarithmic slope forces many tiny adaptive substeps
        config.adaptive_constant = 1e-4;
        let (r, _, dfdr) = exp_decay_profiles(400, 2.0);
        let out = integrate(1.0, 0.0, 3.0, &r, SlopeSource::Plain(&dfdr), &config).unwrap();
        assert!(out.capped);
        assert_eq!(out.substeps, 4); // 3 adaptive + 1 forced final step
    }

    #[test]
    fn critical_ode_slope_evaluation() {
        let r = DVector::from_vec(vec![0.0, 1.0, 2.0, 3.0]);
        let ucrit = DVector::from_vec(vec![2.0, 2.0, 2.0, 2.0]);
        let rhs = DVector::from_vec(vec![6.0, 6.0, 6.0, 6.0]);
        let source = SlopeSource::CriticalOde {
            ucrit: &ucrit,
            rhs: &rhs,
        };
        // u=4: slope = 6 / (4 - 4/4) = 6/3 = 2
        assert_relative_eq!(source.eval(4.0, 1.5, &r), 2.0);
    }

    #[test]
    fn interp_clamps_at_endpoints() {
        let xs = DVector::from_vec(vec![1.0, 2.0, 4.0]);
        let fs = DVector::from_vec(vec![10.0, 20.0, 40.0]);
        assert_eq!(interp(0.0, &xs, &fs), 10.0);
        assert_eq!(interp(9.0, &xs, &fs), 40.0);
        assert_relative_eq!(interp(3.0, &xs, &fs), 30.0);
    }

    #[test]
    fn nearest_index_picks_closest_point() {
        let xs = DVector::from_vec(vec![0.0, 0.5, 2.0, 10.0]);
        assert_eq!(nearest_index(&xs, 0.6), 1);
        assert_eq!(nearest_index(&xs, 7.0), 3);
        assert_eq!(nearest_index(&xs, -4.0), 0);
    }

    #[test]
    fn centered_derivative_is_exact_for_quadratic() {
        let n = 21;
        let r = DVector::from_iterator(n, (0..n).map(|k| k as f64 * 0.5));
        let f = r.map(|rv| 3.0 * rv * rv + 2.0 * rv + 1.0);
        let dfdr = centered_derivative(&f, &r);
        // centered differences are exact for quadratics at interior points
        for k in 1..n - 1 {
            assert_relative_eq!(dfdr[k], 6.0 * r[k] + 2.0, max_relative = 1e-12);
        }
    }

    #[test]
    fn smooth_returns_input_for_narrow_window() {
        let x = DVector::from_vec(vec![1.0, 5.0, 2.0, 8.0]);
        let y = bartlett_smooth(&x, 2);
        assert_eq!(x, y);
    }

    #[test]
    fn smooth_preserves_constant_profiles() {
        let x = DVector::from_element(40, 3.25);
        let y = bartlett_smooth(&x, 15);
        assert_eq!(y.len(), 40);
        for &v in y.iter() {
            assert_relative_eq!(v, 3.25, max_relative = 1e-12);
        }
    }
}
