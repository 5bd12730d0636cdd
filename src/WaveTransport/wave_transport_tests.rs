#[cfg(test)]
mod tests {
    use crate::WaveTransport::wave_action::wave_action;
    use crate::config::WindConfig;
    use crate::model::{Grid, ModelInput};
    use approx::assert_relative_eq;
    use nalgebra::DVector;

    fn log_grid(n: usize, z0: f64, z1: f64, config: &WindConfig) -> Grid {
        let (a0, a1) = (z0.log10(), z1.log10());
        let heights: Vec<f64> = (0..n)
            .map(|k| 10f64.powf(a0 + (a1 - a0) * k as f64 / (n - 1) as f64))
            .collect();
        Grid::from_heights(&heights, config).unwrap()
    }

    /// Flux tube with B ~ r^-2, constant outflow and density tied to B.
    fn setup(
        config: &WindConfig,
    ) -> (Grid, ModelInput, DVector<f64>, DVector<f64>, DVector<f64>) {
        let grid = log_grid(80, 1e-3, 10.0, config);
        let n = grid.len();
        let b = DVector::from_iterator(
            n,
            grid.zx.iter().map(|&z| 5.0 / ((1.0 + z) * (1.0 + z))),
        );
        let dbdr = DVector::from_iterator(n, (0..n).map(|k| -2.0 * b[k] / grid.rm[k]));
        let model = ModelInput {
            label: None,
            b: b.clone(),
            dbdr,
            temperature: DVector::from_element(n, 1.0e6),
            dtdr: DVector::zeros(n),
            z_tr: 0.006,
        };
        let u = DVector::from_element(n, 2.0e5);
        let rho = DVector::from_iterator(n, (0..n).map(|k| 1.0e-16 * b[k] / b[0]));
        let v_alfven = DVector::from_iterator(
            n,
            (0..n).map(|k| b[k] / (4.0 * std::f64::consts::PI * rho[k]).sqrt()),
        );
        (grid, model, u, rho, v_alfven)
    }

    #[test]
    fn zero_efficiency_recovers_undamped_wave_action() {
        let config = WindConfig::default();
        let (grid, model, u, rho, v_alfven) = setup(&config);
        let n = grid.len();
        let zeros = DVector::zeros(n);
        let mut events = Vec::new();
        let (u_a, q_a) =
            wave_action(&grid, &model, &u, &rho, &v_alfven, &zeros, &config, &mut events).unwrap();

        // S stays at its base value, no heating
        for k in 0..n {
            let upv = u[k] + v_alfven[k];
            let expected = v_alfven[k] * config.s_base * model.b[k] / (upv * upv);
            assert_relative_eq!(u_a[k], expected, max_relative = 1e-12);
            assert_eq!(q_a[k], 0.0);
        }
    }

    #[test]
    fn full_efficiency_damps_wave_action_monotonically() {
        let config = WindConfig::default();
        let (grid, model, u, rho, v_alfven) = setup(&config);
        let n = grid.len();
        let ones = DVector::from_element(n, 1.0);
        let mut events = Vec::new();
        let (u_a, q_a) =
            wave_action(&grid, &model, &u, &rho, &v_alfven, &ones, &config, &mut events).unwrap();

        let action = |k: usize| {
            let upv = u[k] + v_alfven[k];
            u_a[k] * upv * upv / (v_alfven[k] * model.b[k])
        };
        assert!(action(0) < config.s_base);
        for k in 0..n - 1 {
            assert!(
                action(k + 1) <= action(k) * (1.0 + 1e-9),
                "wave action grows at index {}",
                k
            );
            assert!(u_a[k] > 0.0);
            assert!(q_a[k] > 0.0);
        }
    }

    #[test]
    fn heating_scales_down_with_efficiency() {
        let config = WindConfig::default();
        let (grid, model, u, rho, v_alfven) = setup(&config);
        let n = grid.len();
        let mut events = Vec::new();
        let full = DVector::from_element(n, 1.0);
        let half = DVector::from_element(n, 0.5);
        let (_, q_full) =
            wave_action(&grid, &model, &u, &rho, &v_alfven, &full, &config, &mut events).unwrap();
        let (_, q_half) =
            wave_action(&grid, &model, &u, &rho, &v_alfven, &half, &config, &mut events).unwrap();
        // weaker cascade, less dissipation near the base
        assert!(q_half[0] < q_full[0]);
    }
}
