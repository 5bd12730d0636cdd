//! Critical-point locator and critical-slope resolver.
//!
//! Candidate roots of the RHS are detected with a 4-point symmetric
//! sign-change test, which filters single-sample numerical noise. When more
//! than one candidate exists, the physically valid one minimizes the running
//! integral of the RHS (Kopp & Holzer 1976). The slope of the outflow at the
//! singular point follows from L'Hopital's rule:
//!
//! ```text
//! du/dr = N/D = 0/0 at the critical point
//! N = RHS,  D = u - uc^2/u,  dD/dr = 2 du/dr - duc/dr at u = uc
//! => du/dr = 0.5*(duc/dr + sqrt((duc/dr)^2 + 2*dN/dr))
//! ```

use crate::Numerics::finite_diff::centered_derivative;
use crate::Numerics::rk4::{SlopeSource, integrate};
use crate::config::WindConfig;
use crate::model::{CriticalPoint, DiagnosticEvent, Grid, WindError};
use log::warn;
use nalgebra::DVector;

/// Running integral of the RHS from the start of the grid, F(0) = 1
/// (arbitrary unit amplitude), advanced interval by interval with the
/// adaptive RK4 integrator.
pub fn running_integral(
    grid: &Grid,
    rhs: &DVector<f64>,
    config: &WindConfig,
) -> Result<DVector<f64>, WindError> {
    let n = grid.len();
    let mut f = DVector::zeros(n);
    f[0] = 1.0;
    for k in 0..n - 1 {
        let dr = grid.rm[k + 1] - grid.rm[k];
        let out = integrate(f[k], grid.rm[k], dr, &grid.rm, SlopeSource::Plain(rhs), config)?;
        f[k + 1] = out.value;
    }
    Ok(f)
}

/// Candidate critical indices: k is a candidate when the RHS changes sign
/// between k and k+1 AND between k-1 and k+2.
pub fn candidate_roots(rhs: &DVector<f64>) -> Vec<usize> {
    let n = rhs.len();
    let mut roots = Vec::new();
    for k in 1..n.saturating_sub(2) {
        if rhs[k].signum() != rhs[k + 1].signum()
            && rhs[k - 1].signum() != rhs[k + 2].signum()
        {
            roots.push(k);
        }
    }
    roots
}

/// Select the single physically valid critical index, or None (with a
/// diagnostic) when the model has no usable critical point.
///
/// A winning index whose bracket lies within two grid points of either
/// boundary is rejected: the shooting propagator seeds indices iC-1 and iC+2
/// and would otherwise read past the profile ends.
pub fn locate(
    grid: &Grid,
    rhs: &DVector<f64>,
    config: &WindConfig,
    events: &mut Vec<DiagnosticEvent>,
) -> Result<Option<usize>, WindError> {
    let roots = candidate_roots(rhs);
    if roots.is_empty() {
        warn!("no critical point: RHS never changes sign");
        events.push(DiagnosticEvent::NoCriticalPoint);
        return Ok(None);
    }
    let f = running_integral(grid, rhs, config)?;
    let mut best = roots[0];
    for &k in &roots[1..] {
        if f[k] < f[best] {
            best = k;
        }
    }
    let n = grid.len();
    if best < 2 || best + 4 > n {
        warn!("critical point at index {} too near a grid boundary", best);
        events.push(DiagnosticEvent::CriticalPointNearBoundary { index: best });
        return Ok(None);
    }
    Ok(Some(best))
}

/// Analytic one-sided slope of the outflow at a bracketing index, together
/// with the radius and critical speed there.
///
/// A negative radicand is clamped to zero and reported, not treated as fatal.
pub fn critical_slope(
    grid: &Grid,
    rhs: &DVector<f64>,
    ucrit: &DVector<f64>,
    index: usize,
    events: &mut Vec<DiagnosticEvent>,
) -> (f64, f64, f64) {
    let dndr = centered_derivative(rhs, &grid.rm);
    let ducdr = centered_derivative(ucrit, &grid.rm);
    let mut radicand = ducdr[index] * ducdr[index] + 2.0 * dndr[index];
    if radicand <= 0.0 {
        warn!("invalid value under sqrt at index {}, clamped to 0", index);
        events.push(DiagnosticEvent::RadicandClamped { index });
        radicand = 0.0;
    }
    let slope = 0.5 * (ducdr[index] + radicand.sqrt());
    (grid.rm[index], ucrit[index], slope)
}

/// Locate and fully resolve the critical point of one model.
///
/// Both bracket sides are resolved independently; radius and speed are the
/// midpoint averages while the two one-sided slopes are retained separately.
pub fn resolve(
    grid: &Grid,
    rhs: &DVector<f64>,
    ucrit: &DVector<f64>,
    config: &WindConfig,
    events: &mut Vec<DiagnosticEvent>,
) -> Result<Option<CriticalPoint>, WindError> {
    let Some(index) = locate(grid, rhs, config, events)? else {
        return Ok(None);
    };
    let (r_minus, u_minus, slope_below) = critical_slope(grid, rhs, ucrit, index, events);
    let (r_plus, u_plus, slope_above) = critical_slope(grid, rhs, ucrit, index + 1, events);
    Ok(Some(CriticalPoint {
        index,
        r_crit: 0.5 * (r_minus + r_plus),
        u_crit: 0.5 * (u_minus + u_plus),
        slope_below,
        slope_above,
    }))
}
