//! # Wind Solver Module
//!
//! Solves the modified Parker wind equation for the steady-state outflow
//! speed u(r) along one open magnetic flux tube:
//!
//! ```text
//! {u(r) - [uc(r)^2 / u(r)]} * du/dr = RHS(r)
//! ```
//!
//! The equation is singular at the critical point where u = uc. The solver
//! proceeds in four stages:
//!
//! 1. **`momentum_rhs`** assembles the critical-speed and RHS profiles, at
//!    two fidelity levels: a wave-free initial model (gravity + magnetic +
//!    thermal terms only) and the full model with wave pressure, density via
//!    mass-flux conservation and turbulent wave heating.
//! 2. **`critical_point`** locates the unique physically valid root of the
//!    RHS (Kopp & Holzer running-integral criterion) and resolves the 0/0
//!    slope there in closed form (L'Hopital):
//!    `du/dr = 0.5*(duc/dr + sqrt((duc/dr)^2 + 2*dN/dr))`.
//! 3. **`shooting`** reconstructs the full u(r) profile by integrating the
//!    singular ODE outward and inward from the critical bracket.
//! 4. **`driver`** couples velocity and heating in a relaxed fixed-point
//!    iteration per model, then runs one final joint pass over the batch.

pub mod critical_point;
pub mod driver;
pub mod momentum_rhs;
pub mod shooting;
