//! # Wave Transport Module
//!
//! Alfven wave-action conservation along a flux tube with reflection-driven
//! turbulent damping:
//!
//! ```text
//! S = (u + V_A)^2 * U_A / (V_A * B) = const   (undamped)
//! ```
//!
//! With damping one can show S^(-3/2) dS = RS dr, inverted in closed form
//! after integrating the damping-rate integrand RS along the grid. See
//! Jacques (1977), Isenberg & Hollweg (1982), Tu & Marsch (1995) and eq. 43
//! of Cranmer et al. (2007).

pub mod wave_action;
mod wave_transport_tests;
