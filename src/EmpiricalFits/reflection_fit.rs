//! Alfven-wave reflection coefficient profiles from magnetic field strength.
//!
//! Anchor coefficients come from log10(B) at calibration heights; the profile
//! is constant below the transition region and beyond z = 200 Rsun, log-log
//! linear in between, then Bartlett smoothed.

use crate::EmpiricalFits::temperature_fit::SMOOTH_WINDOW;
use crate::Numerics::finite_diff::{bartlett_smooth, nearest_index};
use crate::model::{Grid, WindError, check_profile_finite};
use nalgebra::DVector;

/// Reflection-coefficient profile of one model.
pub fn fit_reflection(
    grid: &Grid,
    b: &DVector<f64>,
    z_tr: f64,
) -> Result<DVector<f64>, WindError> {
    let n = grid.len();
    if b.len() != n {
        return Err(WindError::ShapeMismatch(format!(
            "B has {} points, grid has {}",
            b.len(),
            n
        )));
    }
    let zx = &grid.zx;

    let z_set = [0.00975, 0.011, 0.573, 0.315, 3.0];
    let b_fit: Vec<f64> = z_set.iter().map(|&z| b[nearest_index(zx, z)]).collect();

    // anchor log-coefficients
    let a_refl = [
        (b_fit[0] / (0.7 + b_fit[0])).log10(),
        -1.081 + 0.3108 * b_fit[1].log10(),
        -1.293 + 0.6476 * b_fit[2].log10(),
        -2.238 + 0.6061 * b_fit[3].log10(),
        -2.940 - 0.2576 * b_fit[4].log10(),
        -3.404 - 0.4961 * b_fit[4].log10(),
    ];
    let z_fit = [z_tr, 0.02, 0.2, 2.0, 20.0, 200.0];
    let az_fit: Vec<f64> = z_fit.iter().map(|z| z.log10()).collect();

    let mut refl = DVector::zeros(n);
    for k in 0..n {
        let z = zx[k];
        refl[k] = if z <= z_tr {
            // constant in the chromosphere
            10f64.powf(a_refl[0])
        } else if z > z_fit[5] {
            10f64.powf(a_refl[5])
        } else {
            let seg = match z {
                z if z <= z_fit[1] => 0,
                z if z <= z_fit[2] => 1,
                z if z <= z_fit[3] => 2,
                z if z <= z_fit[4] => 3,
                _ => 4,
            };
            let az = z.log10();
            let ay = a_refl[seg]
                + ((a_refl[seg + 1] - a_refl[seg]) / (az_fit[seg + 1] - az_fit[seg]))
                    * (az - az_fit[seg]);
            10f64.powf(ay)
        };
    }

    let smoothed = bartlett_smooth(&refl, SMOOTH_WINDOW);
    check_profile_finite("reflection fit", &smoothed)?;
    Ok(smoothed)
}
