//! # Empirical Fits Module
//!
//! Piecewise log-log curve fits that synthesize temperature and Alfven-wave
//! reflection-coefficient profiles from the magnetic field strength alone.
//! The fitting parameters come from statistically significant correlations
//! between field strength and full turbulence-driven coronal heating models
//! (ZEPHYR, Cranmer et al. 2007); they are calibrations, not physics derived
//! from first principles.
//!
//! - **`temperature_fit`**: temperature profile, its derivative and the
//!   transition-region height per model
//! - **`reflection_fit`**: wave reflection coefficient profile per model

pub mod reflection_fit;
pub mod temperature_fit;
mod fits_tests;
