#[cfg(test)]
mod tests {
    use crate::EmpiricalFits::reflection_fit::fit_reflection;
    use crate::EmpiricalFits::temperature_fit::{fit_temperature, fit_temperature_batch};
    use crate::Numerics::finite_diff::nearest_index;
    use crate::config::WindConfig;
    use crate::model::Grid;
    use approx::assert_relative_eq;
    use nalgebra::DVector;

    fn log_grid(n: usize, z0: f64, z1: f64, config: &WindConfig) -> Grid {
        let (a0, a1) = (z0.log10(), z1.log10());
        let heights: Vec<f64> = (0..n)
            .map(|k| 10f64.powf(a0 + (a1 - a0) * k as f64 / (n - 1) as f64))
            .collect();
        Grid::from_heights(&heights, config).unwrap()
    }

    /// Open flux tube: strong chromospheric field decaying to an r^-2 tail.
    fn field(grid: &Grid) -> DVector<f64> {
        DVector::from_iterator(
            grid.len(),
            grid.zx
                .iter()
                .map(|&z| 1500.0 * (-z / 0.004).exp() + 10.0 / ((1.0 + z) * (1.0 + z))),
        )
    }

    #[test]
    fn temperature_has_chromospheric_plateau() {
        let config = WindConfig::default();
        let grid = log_grid(200, 1e-5, 250.0, &config);
        let b = field(&grid);
        let (t, dtdr, z_tr) = fit_temperature(&grid, &b, &config).unwrap();

        assert!(z_tr > 0.005 && z_tr < 0.01, "z_tr = {}", z_tr);
        // points whose whole smoothing window sits below z_TR keep the
        // plateau value exactly
        let mut checked = 0;
        for k in 0..grid.len() - 8 {
            if grid.zx[k + 8] < z_tr {
                assert_relative_eq!(t[k], config.t_transition, max_relative = 1e-9);
                assert!(dtdr[k].abs() < 1e-6);
                checked += 1;
            }
        }
        assert!(checked > 10, "plateau region too short to test");
    }

    #[test]
    fn temperature_is_finite_positive_and_coronal() {
        let config = WindConfig::default();
        let grid = log_grid(200, 1e-5, 250.0, &config);
        let b = field(&grid);
        let (t, _, _) = fit_temperature(&grid, &b, &config).unwrap();

        for k in 0..grid.len() {
            assert!(t[k].is_finite() && t[k] > 0.0);
        }
        // anchor value at z = 2: 10^(6.228 + 0.2660*log10(B(2)))
        let k2 = nearest_index(&grid.zx, 2.0);
        let expected = 10f64.powf(6.228 + 0.2660 * b[k2].log10());
        assert_relative_eq!(t[k2], expected, max_relative = 0.05);
        // corona is hotter than the transition region everywhere above it
        assert!(t[k2] > 1.0e6);
    }

    #[test]
    fn batch_fit_matches_individual_fits() {
        let config = WindConfig::default();
        let grid = log_grid(120, 1e-5, 250.0, &config);
        let b1 = field(&grid);
        let b2 = DVector::from_iterator(grid.len(), b1.iter().map(|&v| 0.5 * v));
        let batch = fit_temperature_batch(&grid, &[b1.clone(), b2.clone()], &config).unwrap();
        assert_eq!(batch.len(), 2);
        let (t1, _, ztr1) = fit_temperature(&grid, &b1, &config).unwrap();
        assert_eq!(batch[0].2, ztr1);
        for k in 0..grid.len() {
            assert_eq!(batch[0].0[k], t1[k]);
        }
        // weaker field, later transition region
        assert!(batch[1].2 > batch[0].2);
    }

    #[test]
    fn temperature_fit_rejects_mismatched_field() {
        let config = WindConfig::default();
        let grid = log_grid(60, 1e-5, 250.0, &config);
        let b = DVector::from_element(10, 1.0);
        assert!(fit_temperature(&grid, &b, &config).is_err());
    }

    #[test]
    fn reflection_is_a_fraction_and_chromosphere_constant() {
        let config = WindConfig::default();
        let grid = log_grid(200, 1e-5, 250.0, &config);
        let b = field(&grid);
        let (_, _, z_tr) = fit_temperature(&grid, &b, &config).unwrap();
        let refl = fit_reflection(&grid, &b, z_tr).unwrap();

        for k in 0..grid.len() {
            assert!(refl[k] > 0.0 && refl[k] < 1.0, "refl[{}] = {}", k, refl[k]);
        }
        // constant below the transition region (modulo the smoothing window)
        for k in 0..grid.len() - 8 {
            if grid.zx[k + 8] < z_tr {
                assert_relative_eq!(refl[k], refl[0], max_relative = 1e-9);
            }
        }
        // reflection falls off with distance in the wind
        let k_low = nearest_index(&grid.zx, 0.1);
        let k_high = nearest_index(&grid.zx, 100.0);
        assert!(refl[k_high] < refl[k_low]);
    }
}
