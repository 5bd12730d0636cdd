//! # Configuration Module
//!
//! ## Purpose
//! Holds every named constant of the wind model in one immutable value that is
//! constructed once and passed by reference into all components. No component
//! reads process-wide state.
//!
//! ## Main Structures
//! - **`WindConfig`**: physical constants (cgs), standard heights, base-level
//!   turbulence parameters and the numerical knobs of the adaptive integrator
//! - **`IterationConfig`**: relaxation exponent, convergence tolerance and the
//!   iteration floor/cap of the outer fixed-point driver
//!
//! All values are in cgs units: cm, g, s, K, Gauss. Heights are expressed in
//! solar radii above the photosphere (z = r/Rsun - 1).

use crate::model::WindError;
use serde::{Deserialize, Serialize};

/// Physical and numerical constants of the wind model (cgs units).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindConfig {
    /// Gravitational constant (cm^3 g^-1 s^-2)
    pub grav: f64,
    /// Solar mass (g)
    pub m_sun: f64,
    /// Boltzmann constant (erg/K)
    pub boltz: f64,
    /// Hydrogen mass (g)
    pub m_hydrogen: f64,
    /// Solar radius (cm)
    pub r_sun: f64,

    /// Source-surface height (Rsun above photosphere)
    pub z_source_surface: f64,
    /// 1 AU expressed in Rsun above photosphere
    pub z_au: f64,
    /// Nominal transition-region height (Rsun)
    pub z_tran: f64,
    /// Low reference height used for expansion-factor calibration (Rsun)
    pub z_low: f64,

    /// Temperature at the top of the chromosphere / transition region (K)
    pub t_transition: f64,
    /// Minimum density floor (g/cm^3)
    pub rho_min: f64,
    /// Correlation length for turbulent eddies at the coronal base (cm)
    pub ell_base: f64,
    /// Wave-action conservation constant at the base (erg cm^-2 s^-1 G^-1)
    pub s_base: f64,

    /// Adaptiveness constant of the RK4 integrator: substep = const/|dlnf/dr|
    pub adaptive_constant: f64,
    /// Hard cap on RK4 substeps per requested integration distance
    pub max_substeps: usize,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            grav: 6.67e-8,
            m_sun: 1.988e33,
            boltz: 1.381e-16,
            m_hydrogen: 1.674e-24,
            r_sun: 6.955e10,
            z_source_surface: 1.5,
            z_au: 214.1,
            z_tran: 0.006,
            z_low: 0.04,
            t_transition: 1.2e4,
            rho_min: 1.0e-28,
            ell_base: 7.5e6,
            s_base: 9.0e4,
            adaptive_constant: 0.1,
            max_substeps: 100,
        }
    }
}

impl WindConfig {
    /// Validate the configuration; every constant must be strictly positive.
    pub fn validate(&self) -> Result<(), WindError> {
        let named = [
            ("grav", self.grav),
            ("m_sun", self.m_sun),
            ("boltz", self.boltz),
            ("m_hydrogen", self.m_hydrogen),
            ("r_sun", self.r_sun),
            ("z_source_surface", self.z_source_surface),
            ("z_au", self.z_au),
            ("z_tran", self.z_tran),
            ("z_low", self.z_low),
            ("t_transition", self.t_transition),
            ("rho_min", self.rho_min),
            ("ell_base", self.ell_base),
            ("s_base", self.s_base),
            ("adaptive_constant", self.adaptive_constant),
        ];
        for (name, value) in named {
            if !(value > 0.0) || !value.is_finite() {
                return Err(WindError::InvalidConfiguration(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }
        if self.max_substeps == 0 {
            return Err(WindError::InvalidConfiguration(
                "max_substeps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings of the outer relaxed fixed-point iteration coupling velocity and
/// heating. The new velocity guess is blended geometrically,
/// u <- u^(1-relax) * u_new^relax, to damp oscillatory non-convergence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationConfig {
    /// Relaxation exponent of the geometric blend (0 < relax <= 1)
    pub relax: f64,
    /// Convergence threshold on the mean absolute fractional change of u
    pub tolerance: f64,
    /// Minimum number of iterations before convergence may be declared
    pub min_iterations: usize,
    /// Iteration cap; reaching it is a reported soft failure
    pub max_iterations: usize,
}

impl Default for IterationConfig {
    fn default() -> Self {
        Self {
            relax: 0.1,
            tolerance: 0.005,
            min_iterations: 10,
            max_iterations: 300,
        }
    }
}

impl IterationConfig {
    pub fn validate(&self) -> Result<(), WindError> {
        if !(self.relax > 0.0 && self.relax <= 1.0) {
            return Err(WindError::InvalidConfiguration(format!(
                "relax must lie in (0, 1], got {}",
                self.relax
            )));
        }
        if !(self.tolerance > 0.0) {
            return Err(WindError::InvalidConfiguration(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.min_iterations > self.max_iterations {
            return Err(WindError::InvalidConfiguration(format!(
                "min_iterations {} exceeds max_iterations {}",
                self.min_iterations, self.max_iterations
            )));
        }
        Ok(())
    }
}
