//! Shooting propagator: from a resolved critical point to the full outflow
//! speed profile.
//!
//! The two points adjacent to the critical bracket are seeded by linear
//! extrapolation with the respective one-sided slope; from there the profile
//! is extended inward and outward with the adaptive RK4 integrator in its
//! `CriticalOde` slope mode. A negative step result is physically invalid and
//! is replaced by the previous point's value with a diagnostic.

use crate::Numerics::rk4::{SlopeSource, integrate};
use crate::config::WindConfig;
use crate::model::{CriticalPoint, DiagnosticEvent, Grid, WindError};
use log::warn;
use nalgebra::DVector;

/// Reconstruct the full outflow speed profile from the critical point.
pub fn propagate(
    grid: &Grid,
    critical: &CriticalPoint,
    ucrit: &DVector<f64>,
    rhs: &DVector<f64>,
    config: &WindConfig,
    events: &mut Vec<DiagnosticEvent>,
) -> Result<DVector<f64>, WindError> {
    let n = grid.len();
    let ic = critical.index;
    debug_assert!(ic >= 2 && ic + 4 <= n, "critical bracket too near boundary");
    let r = &grid.rm;
    let mut u = DVector::zeros(n);

    // seed the bracket and its neighbours by linear extrapolation
    u[ic] = critical.u_crit + (r[ic] - critical.r_crit) * critical.slope_below;
    u[ic + 1] = critical.u_crit + (r[ic + 1] - critical.r_crit) * critical.slope_above;
    u[ic - 1] = u[ic] + (r[ic - 1] - r[ic]) * critical.slope_below;
    u[ic + 2] = u[ic + 1] + (r[ic + 2] - r[ic + 1]) * critical.slope_above;

    let source = SlopeSource::CriticalOde { ucrit, rhs };

    // inward: populate ic-2 down to 0
    let mut capped = false;
    for i in (1..=ic - 1).rev() {
        let dr = r[i - 1] - r[i]; // < 0
        let out = integrate(u[i], r[i], dr, r, source, config)?;
        capped |= out.capped;
        u[i - 1] = out.value;
        if u[i - 1] < 0.0 {
            warn!("negative velocity on inward shot at index {}", i - 1);
            events.push(DiagnosticEvent::NegativeVelocity {
                index: i - 1,
                inward: true,
            });
            u[i - 1] = u[i];
        }
    }

    // outward: populate ic+3 up to n-1
    for i in ic + 2..n - 1 {
        let dr = r[i + 1] - r[i];
        let out = integrate(u[i], r[i], dr, r, source, config)?;
        capped |= out.capped;
        u[i + 1] = out.value;
        if u[i + 1] < 0.0 {
            warn!("negative velocity on outward shot at index {}", i + 1);
            events.push(DiagnosticEvent::NegativeVelocity {
                index: i + 1,
                inward: false,
            });
            u[i + 1] = u[i];
        }
    }

    if capped {
        events.push(DiagnosticEvent::StepCapReached {
            position: critical.r_crit,
        });
    }
    Ok(u)
}
