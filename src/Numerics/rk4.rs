//! Adaptive fourth-order Runge-Kutta integration.
//!
//! The integrator advances a scalar quantity over a requested signed distance
//! along the radial grid. The substep length is chosen from the local
//! logarithmic slope and clamped so the integration never overshoots; a hard
//! substep cap guards against runaway refinement on pathological slopes and
//! is reported to the caller rather than swallowed.

use crate::Numerics::finite_diff::interp;
use crate::config::WindConfig;
use crate::model::WindError;
use nalgebra::DVector;

/// Source of slope values for the integrator.
///
/// The two variants are mutually exclusive and matched exhaustively:
/// a plain precomputed derivative profile, or the critical-ODE pair from
/// which the true momentum-equation slope is derived. The latter is undefined
/// exactly at u = ucrit and is therefore never evaluated at the critical
/// point itself.
#[derive(Debug, Clone, Copy)]
pub enum SlopeSource<'a> {
    /// df/dr given directly as a profile over the grid
    Plain(&'a DVector<f64>),
    /// du/dr = rhs / (u - ucrit^2/u), interpolated from the two profiles
    CriticalOde {
        ucrit: &'a DVector<f64>,
        rhs: &'a DVector<f64>,
    },
}

impl SlopeSource<'_> {
    /// Slope at the point (r = rval, f = fval).
    pub fn eval(&self, fval: f64, rval: f64, r: &DVector<f64>) -> f64 {
        match self {
            SlopeSource::Plain(dfdr) => interp(rval, r, dfdr),
            SlopeSource::CriticalOde { ucrit, rhs } => {
                let ucrit_val = interp(rval, r, ucrit);
                let rhs_val = interp(rval, r, rhs);
                rhs_val / (fval - ucrit_val * ucrit_val / fval)
            }
        }
    }
}

/// Result of one adaptive integration.
#[derive(Debug, Clone, Copy)]
pub struct IntegrationOutcome {
    /// Ending value at r0 + dr
    pub value: f64,
    /// Substeps actually taken
    pub substeps: usize,
    /// True when the substep cap forced a final full-distance step
    pub capped: bool,
}

/// Integrate `f` from (r0, f0) over the signed distance `dr` using classical
/// RK4 with adaptive substeps.
///
/// Each substep length is `adaptive_constant / |slope/f|`, signed in the
/// direction of travel and clamped to the remaining distance. A vanishing or
/// non-finite logarithmic slope takes the remaining distance in one step.
pub fn integrate(
    f0: f64,
    r0: f64,
    dr: f64,
    r: &DVector<f64>,
    source: SlopeSource<'_>,
    config: &WindConfig,
) -> Result<IntegrationOutcome, WindError> {
    if dr == 0.0 {
        return Ok(IntegrationOutcome {
            value: f0,
            substeps: 0,
            capped: false,
        });
    }
    let sign = dr.signum();
    let total = dr.abs();
    let mut rstep = r0;
    let mut fstep = f0;
    let mut travelled = 0.0;
    let mut substeps = 0usize;
    let mut capped = false;

    while travelled < total {
        // adaptive substep from the local logarithmic slope
        let dlnf = source.eval(fstep, rstep, r) / fstep;
        let mut delta = if dlnf != 0.0 && dlnf.is_finite() {
            sign * (config.adaptive_constant / dlnf).abs()
        } else {
            sign * (total - travelled)
        };
        if travelled + delta.abs() > total || substeps >= config.max_substeps {
            if substeps >= config.max_substeps {
                capped = true;
            }
            delta = sign * (total - travelled);
        }
        if delta == 0.0 {
            break;
        }

        let r1 = rstep;
        let r2 = r1 + 0.5 * delta;
        let r3 = r1 + delta;

        let k1 = delta * source.eval(fstep, r1, r);
        let k2 = delta * source.eval(fstep + 0.5 * k1, r2, r);
        let k3 = delta * source.eval(fstep + 0.5 * k2, r2, r);
        let k4 = delta * source.eval(fstep + k3, r3, r);

        fstep += (k1 + k4) / 6.0 + (k2 + k3) / 3.0;
        if !fstep.is_finite() {
            return Err(WindError::NumericFault {
                context: format!("RK4 step at r={:.6e}", rstep),
                value: fstep,
            });
        }
        travelled += delta.abs();
        rstep += delta;
        substeps += 1;
    }

    Ok(IntegrationOutcome {
        value: fstep,
        substeps,
        capped,
    })
}
