//! Temperature profiles from magnetic field strength.
//!
//! Anchor temperatures are set from log10(B) sampled at calibration heights
//! (with two residual corrections from additional heights), then the profile
//! is pieced together from a chromospheric plateau at the transition-region
//! temperature, a conductive T^3.5 bridge up to z = 0.02 and log-log linear
//! segments through z = {0.02, 0.2, 2, 20, 200}, extrapolated beyond. The
//! result is smoothed with a Bartlett window before differentiation.

use crate::Numerics::finite_diff::{bartlett_smooth, centered_derivative, nearest_index};
use crate::config::WindConfig;
use crate::model::{Grid, WindError, check_profile_finite};
use nalgebra::DVector;

/// Width of the Bartlett smoothing window applied to fitted profiles.
pub const SMOOTH_WINDOW: usize = 15;

/// Calibration heights (Rsun) of the log-log anchor temperatures.
const Z_FIT: [f64; 5] = [0.02, 0.2, 2.0, 20.0, 200.0];

/// Temperature fit of one model: (T, dT/dr, z_TR).
pub fn fit_temperature(
    grid: &Grid,
    b: &DVector<f64>,
    config: &WindConfig,
) -> Result<(DVector<f64>, DVector<f64>, f64), WindError> {
    let n = grid.len();
    if b.len() != n {
        return Err(WindError::ShapeMismatch(format!(
            "B has {} points, grid has {}",
            b.len(),
            n
        )));
    }
    let zx = &grid.zx;

    // field strengths at the calibration heights
    let z_set = [0.00314, 0.4206, 2.0, 3.0];
    let b_set: Vec<f64> = z_set.iter().map(|&z| b[nearest_index(zx, z)]).collect();

    let z_tr = 0.0057 + 7.0e-6 / b_set[2].powf(1.3);

    // residual corrections from two extra heights
    let b_resid0 = b[nearest_index(zx, 0.662)];
    let b_resid1 = b[nearest_index(zx, 0.0144)];
    let at_resid0 = 0.0559 + 0.13985 * b_resid0.log10();
    let at_resid1 = -0.0424 + 0.09285 * b_resid1.log10();

    // anchor log-temperatures
    let at_fit = [
        5.554 + 0.1646 * b_set[0].log10() + at_resid0,
        5.967 + 0.2054 * b_set[1].log10() + at_resid1,
        6.228 + 0.2660 * b_set[2].log10(),
        6.249 + 0.3121 * b_set[3].log10(),
        6.041 + 0.3547 * b_set[3].log10(),
    ];
    let az_fit: Vec<f64> = Z_FIT.iter().map(|z| z.log10()).collect();

    let t_tr = config.t_transition;
    let t_set0 = 10f64.powf(at_fit[0]);
    // conductive bridge constant between z_TR and the first anchor height
    let tr_con = (t_set0.powf(3.5) - t_tr.powf(3.5)) / (Z_FIT[0] * Z_FIT[0] - z_tr * z_tr);

    let mut t_try = DVector::zeros(n);
    for k in 0..n {
        let z = zx[k];
        let az = z.log10();
        t_try[k] = if z <= z_tr {
            t_tr
        } else if z <= Z_FIT[0] {
            (t_tr.powf(3.5) + tr_con * (z * z - z_tr * z_tr)).powf(2.0 / 7.0)
        } else {
            // log-log linear between consecutive anchors, extrapolated past
            // the last anchor with the final segment's slope
            let seg = match z {
                z if z <= Z_FIT[1] => 0,
                z if z <= Z_FIT[2] => 1,
                z if z <= Z_FIT[3] => 2,
                _ => 3,
            };
            let ay = at_fit[seg]
                + ((at_fit[seg + 1] - at_fit[seg]) / (az_fit[seg + 1] - az_fit[seg]))
                    * (az - az_fit[seg]);
            10f64.powf(ay)
        };
    }

    let temperature = bartlett_smooth(&t_try, SMOOTH_WINDOW);
    check_profile_finite("temperature fit", &temperature)?;
    let dtdr = centered_derivative(&temperature, &grid.rm);
    Ok((temperature, dtdr, z_tr))
}

/// Temperature fits for a whole batch of field profiles.
pub fn fit_temperature_batch(
    grid: &Grid,
    b_profiles: &[DVector<f64>],
    config: &WindConfig,
) -> Result<Vec<(DVector<f64>, DVector<f64>, f64)>, WindError> {
    b_profiles
        .iter()
        .map(|b| fit_temperature(grid, b, config))
        .collect()
}
