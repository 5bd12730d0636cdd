//! Momentum-equation RHS assembler.
//!
//! Two fidelity levels share the governing form
//! `(u - uc^2/u) du/dr = RHS`:
//!
//! - the **initial** (wave-free) assembler sums gravity, magnetic and thermal
//!   terms with the critical speed from the thermal sound speed alone;
//! - the **full** assembler adds density from mass-flux conservation anchored
//!   at the transition region, the Alfven speed, a wave-pressure blend of the
//!   critical speed and a reflection-driven turbulent heating term supplied
//!   by the wave-action transport solver.
//!
//! The full assembler calls the wave-transport solver twice: once with the
//! turbulence efficiency fixed at 1 to get a first-pass perpendicular wave
//! velocity, then again with the eddy-turnover-based efficiency profile
//! `eff = 1 / (1 + t_eddy/t_crossing)`.

use crate::Numerics::finite_diff::nearest_index;
use crate::WaveTransport::wave_action::wave_action;
use crate::config::WindConfig;
use crate::model::{
    DiagnosticEvent, Grid, ModelInput, WindError, check_profile_finite,
};
use nalgebra::DVector;

/// Critical-speed and RHS profiles of one model.
#[derive(Debug, Clone)]
pub struct RhsProfiles {
    /// Thermal sound speed a(r); equals `ucrit` in the wave-free model
    pub sound: DVector<f64>,
    /// Critical speed uc(r)
    pub ucrit: DVector<f64>,
    /// Right-hand side of the momentum equation
    pub rhs: DVector<f64>,
}

/// Wave-related state produced alongside the full RHS. Recomputed every outer
/// iteration; intermediate, never authoritative.
#[derive(Debug, Clone)]
pub struct WaveState {
    /// Mass density rho(r) (g/cm^3)
    pub rho: DVector<f64>,
    /// Alfven speed V_A(r) (cm/s)
    pub v_alfven: DVector<f64>,
    /// Damped Alfven wave energy density U_A(r) (erg/cm^3)
    pub u_a: DVector<f64>,
    /// Volumetric wave heating rate Q_A(r) (erg cm^-3 s^-1)
    pub q_a: DVector<f64>,
    /// Perpendicular wave velocity amplitude (cm/s)
    pub v_perp: DVector<f64>,
    /// Turbulence efficiency profile
    pub efficiency: DVector<f64>,
}

/// Thermal sound speed profile a(r) = sqrt((1+xion) kB T / mH), where the
/// ionization switch xion flips from 0 to 1 at the transition-region height.
fn sound_speed(grid: &Grid, model: &ModelInput, config: &WindConfig) -> DVector<f64> {
    let n = grid.len();
    DVector::from_iterator(
        n,
        (0..n).map(|k| {
            let ion = if grid.rm[k] / config.r_sun < model.z_tr + 1.0 {
                0.0
            } else {
                1.0
            };
            ((1.0 + ion) * config.boltz * model.temperature[k] / config.m_hydrogen).sqrt()
        }),
    )
}

/// Wave-free RHS: gravity, magnetic and thermal terms only; the critical
/// speed is the thermal sound speed.
pub fn initial_rhs(
    grid: &Grid,
    model: &ModelInput,
    config: &WindConfig,
) -> Result<RhsProfiles, WindError> {
    model.validate(grid)?;
    let n = grid.len();
    let ucrit = sound_speed(grid, model, config);
    let mut rhs = DVector::zeros(n);
    for k in 0..n {
        let grav_term = -config.grav * config.m_sun / (grid.rm[k] * grid.rm[k]);
        let mag_term = -ucrit[k] * ucrit[k] * (model.dbdr[k] / model.b[k]);
        let temp_term = -ucrit[k] * ucrit[k] * (model.dtdr[k] / model.temperature[k]);
        rhs[k] = grav_term + mag_term + temp_term;
    }
    check_profile_finite("initial ucrit", &ucrit)?;
    check_profile_finite("initial rhs", &rhs)?;
    Ok(RhsProfiles {
        sound: ucrit.clone(),
        ucrit,
        rhs,
    })
}

/// Density via mass-flux conservation: rho*u/B is held constant, anchored at
/// the grid index nearest the transition-region height, where the density is
/// set from the empirical log-log correlation with z_TR. Returns the density
/// profile (floored at `rho_min`) and the anchor index.
pub fn mass_flux_density(
    grid: &Grid,
    model: &ModelInput,
    u: &DVector<f64>,
    config: &WindConfig,
) -> Result<(DVector<f64>, usize), WindError> {
    let i_tr = nearest_index(&grid.zx, model.z_tr);
    let rho_tr = 10f64.powf(-21.904 - 3.349 * model.z_tr.log10());
    let flux = rho_tr * u[i_tr] / model.b[i_tr];
    let n = grid.len();
    let mut rho = DVector::zeros(n);
    for k in 0..n {
        rho[k] = (flux * model.b[k] / u[k]).max(config.rho_min);
    }
    check_profile_finite("rho", &rho)?;
    Ok((rho, i_tr))
}

/// Full RHS of the momentum equation, including wave pressure and damping.
///
/// `u_prev` is the previous outflow solution, used to determine density.
/// Any NaN/Inf in a produced profile is fatal for the model's computation.
pub fn full_rhs(
    grid: &Grid,
    model: &ModelInput,
    u_prev: &DVector<f64>,
    config: &WindConfig,
    events: &mut Vec<DiagnosticEvent>,
) -> Result<(RhsProfiles, WaveState), WindError> {
    model.validate(grid)?;
    let n = grid.len();
    if u_prev.len() != n {
        return Err(WindError::ShapeMismatch(format!(
            "velocity guess has {} points, grid has {}",
            u_prev.len(),
            n
        )));
    }

    let (rho, _i_tr) = mass_flux_density(grid, model, u_prev, config)?;
    let v_alfven = DVector::from_iterator(
        n,
        (0..n).map(|k| model.b[k] / (4.0 * std::f64::consts::PI * rho[k]).sqrt()),
    );
    check_profile_finite("v_alfven", &v_alfven)?;

    // first pass with efficiency = 1 gives the perpendicular velocity used to
    // form the eddy turnover time
    let ones = DVector::from_element(n, 1.0);
    let (u_a1, _) = wave_action(grid, model, u_prev, &rho, &v_alfven, &ones, config, events)?;
    let v_perp1 = DVector::from_iterator(n, (0..n).map(|k| (u_a1[k] / rho[k]).sqrt()));
    check_profile_finite("v_perp (first pass)", &v_perp1)?;

    let b_base = model.b[0];
    let mut efficiency = DVector::zeros(n);
    for k in 0..n {
        let rm = grid.rm[k];
        // wave crossing time of the reflection cavity
        let t_ref = ((rm + config.r_sun) * (rm - config.r_sun)) / (rm * v_alfven[k]);
        let ell_perp = config.ell_base * (b_base / model.b[k]).sqrt();
        let t_eddy = (ell_perp * (3.0 * std::f64::consts::PI).sqrt())
            / ((1.0 + u_prev[k] / v_alfven[k]) * v_perp1[k]);
        efficiency[k] = 1.0 / (1.0 + t_eddy / t_ref);
    }
    check_profile_finite("efficiency", &efficiency)?;

    // second, efficiency-weighted pass
    let (u_a, q_a) = wave_action(
        grid, model, u_prev, &rho, &v_alfven, &efficiency, config, events,
    )?;
    let v_perp = DVector::from_iterator(n, (0..n).map(|k| (u_a[k] / rho[k]).sqrt()));
    check_profile_finite("v_perp", &v_perp)?;

    let sound = sound_speed(grid, model, config);
    let mut ucrit = DVector::zeros(n);
    let mut rhs = DVector::zeros(n);
    for k in 0..n {
        let mach_a = u_prev[k] / v_alfven[k];
        ucrit[k] = (sound[k] * sound[k]
            + (u_a[k] / (4.0 * rho[k])) * ((1.0 + 3.0 * mach_a) / (1.0 + mach_a)))
            .sqrt();
        let grav_term = -config.grav * config.m_sun / (grid.rm[k] * grid.rm[k]);
        let mag_term = -ucrit[k] * ucrit[k] * (model.dbdr[k] / model.b[k]);
        let temp_term = -sound[k] * sound[k] * (model.dtdr[k] / model.temperature[k]);
        let wave_term = q_a[k] / (2.0 * rho[k] * (u_prev[k] + v_alfven[k]));
        rhs[k] = grav_term + mag_term + temp_term + wave_term;
    }
    check_profile_finite("full ucrit", &ucrit)?;
    check_profile_finite("full rhs", &rhs)?;

    Ok((
        RhsProfiles { sound, ucrit, rhs },
        WaveState {
            rho,
            v_alfven,
            u_a,
            q_a,
            v_perp,
            efficiency,
        },
    ))
}
