//! # Numerics Module
//!
//! Numerical primitives shared by the wind solver and the wave-transport
//! model.
//!
//! ## Contents
//! - **`rk4`**: adaptive fourth-order Runge-Kutta integrator together with
//!   the tagged `SlopeSource` variant it consumes. The same integrator is
//!   reused for forward integration of monotonic transport quantities and,
//!   in `CriticalOde` mode, for shooting the singular velocity ODE.
//! - **`finite_diff`**: centered-difference derivatives, endpoint-clamped
//!   linear interpolation, nearest-index lookup and Bartlett-window
//!   smoothing used by the empirical fits.

pub mod finite_diff;
pub mod rk4;
mod numerics_tests;
