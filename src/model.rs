//! # Data Model Module
//!
//! ## Purpose
//! Defines the shared grid, per-model input profiles, the derived critical
//! point, the per-model convergence state, structured diagnostics and the
//! error taxonomy of the crate.
//!
//! ## Ownership
//! Each model owns its profiles and never aliases another model's arrays; the
//! grid is shared read-only by all models. The critical point and convergence
//! state are owned by the solver driving that model's iteration.
//!
//! ## Error policy
//! Malformed shapes and grids fail fast with a descriptive `WindError`. Any
//! arithmetic that would silently produce NaN/Inf outside the explicitly
//! guarded points (radicand clamp, negative shooting velocity) is treated as
//! a fatal `NumericFault` for the affected computation, not masked.

use crate::config::WindConfig;
use nalgebra::DVector;
use thiserror::Error;

/// Error types of the wind solver.
#[derive(Debug, Error)]
pub enum WindError {
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("Missing data: {0}")]
    MissingData(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Fatal numeric condition in {context}: value {value}")]
    NumericFault { context: String, value: f64 },
    #[error("Input parse error: {0}")]
    Parse(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Fail on NaN/Inf anywhere in a freshly computed profile.
pub fn check_profile_finite(name: &str, profile: &DVector<f64>) -> Result<(), WindError> {
    for (k, &value) in profile.iter().enumerate() {
        if !value.is_finite() {
            return Err(WindError::NumericFault {
                context: format!("{}[{}]", name, k),
                value,
            });
        }
    }
    Ok(())
}

/// Shared radial grid of the batch.
///
/// `zx` holds heights in solar radii above the photosphere, `rm` the same
/// points as radii from Sun center in cm. Strictly increasing by construction.
#[derive(Debug, Clone)]
pub struct Grid {
    pub zx: DVector<f64>,
    pub rm: DVector<f64>,
}

impl Grid {
    /// Build the grid from heights in Rsun above the photosphere.
    ///
    /// A leading zero height is nudged to 1e-10 so that log10(zx) stays
    /// defined in the empirical fits.
    pub fn from_heights(heights: &[f64], config: &WindConfig) -> Result<Self, WindError> {
        if heights.len() < 5 {
            return Err(WindError::InvalidGrid(format!(
                "grid needs at least 5 points, got {}",
                heights.len()
            )));
        }
        let mut zx = heights.to_vec();
        if zx[0] == 0.0 {
            zx[0] = 1.0e-10;
        }
        for k in 0..zx.len() - 1 {
            if !(zx[k + 1] > zx[k]) {
                return Err(WindError::InvalidGrid(format!(
                    "heights must increase strictly: zx[{}]={} >= zx[{}]={}",
                    k,
                    zx[k],
                    k + 1,
                    zx[k + 1]
                )));
            }
        }
        let rm: Vec<f64> = zx.iter().map(|z| (z + 1.0) * config.r_sun).collect();
        Ok(Self {
            zx: DVector::from_vec(zx),
            rm: DVector::from_vec(rm),
        })
    }

    pub fn len(&self) -> usize {
        self.zx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zx.is_empty()
    }
}

/// One flux-tube configuration: input profiles over the shared grid.
///
/// The transition-region height is always a per-model scalar; there is no
/// separate single-model/batch representation.
#[derive(Debug, Clone)]
pub struct ModelInput {
    /// Optional label taken from the input file
    pub label: Option<String>,
    /// Magnetic field strength B(r) (Gauss)
    pub b: DVector<f64>,
    /// dB/dr (Gauss/cm)
    pub dbdr: DVector<f64>,
    /// Temperature T(r) (K)
    pub temperature: DVector<f64>,
    /// dT/dr (K/cm)
    pub dtdr: DVector<f64>,
    /// Transition-region height (Rsun above photosphere)
    pub z_tr: f64,
}

impl ModelInput {
    /// Check that all profiles match the grid and are physically admissible.
    pub fn validate(&self, grid: &Grid) -> Result<(), WindError> {
        let n = grid.len();
        let lengths = [
            ("B", self.b.len()),
            ("dB/dr", self.dbdr.len()),
            ("T", self.temperature.len()),
            ("dT/dr", self.dtdr.len()),
        ];
        for (name, len) in lengths {
            if len != n {
                return Err(WindError::ShapeMismatch(format!(
                    "{} has {} points, grid has {}",
                    name, len, n
                )));
            }
        }
        if self.b.iter().any(|&b| !(b > 0.0)) {
            return Err(WindError::MissingData(
                "magnetic field must be strictly positive".to_string(),
            ));
        }
        if self.temperature.iter().any(|&t| !(t > 0.0)) {
            return Err(WindError::MissingData(
                "temperature must be strictly positive".to_string(),
            ));
        }
        if !(self.z_tr > 0.0) || !self.z_tr.is_finite() {
            return Err(WindError::MissingData(format!(
                "transition-region height must be positive, got {}",
                self.z_tr
            )));
        }
        Ok(())
    }
}

/// Derived critical point of one model.
///
/// The true critical radius lies between grid indices `index` and `index+1`;
/// radius and speed are the midpoint averages of the two bracket sides while
/// the one-sided slopes are kept separately for the shooting propagator.
#[derive(Debug, Clone, Copy)]
pub struct CriticalPoint {
    /// Lower bracketing grid index
    pub index: usize,
    /// Critical radius (cm)
    pub r_crit: f64,
    /// Critical speed (cm/s)
    pub u_crit: f64,
    /// du/dr resolved at the lower bracket side
    pub slope_below: f64,
    /// du/dr resolved at the upper bracket side
    pub slope_above: f64,
}

/// Convergence state of one model's fixed-point loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvergenceState {
    /// Mean absolute fractional change between successive velocity iterates
    pub change: f64,
    /// Iterations performed
    pub iterations: usize,
    /// Whether the loop ended below tolerance (false = soft failure at cap)
    pub converged: bool,
}

/// One recoverable anomaly observed while solving a model.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent {
    /// RHS never changes sign: no critical point, velocity left undefined
    NoCriticalPoint,
    /// Selected critical bracket lies too close to a grid boundary
    CriticalPointNearBoundary { index: usize },
    /// Negative radicand in the critical-slope resolver, clamped to zero
    RadicandClamped { index: usize },
    /// Negative velocity during shooting, previous point's value substituted
    NegativeVelocity { index: usize, inward: bool },
    /// Adaptive RK4 hit its substep cap and finished in one forced step
    StepCapReached { position: f64 },
    /// Fixed-point loop reached the iteration cap above tolerance
    NotConverged { iterations: usize, change: f64 },
}

impl std::fmt::Display for DiagnosticEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticEvent::NoCriticalPoint => write!(f, "no critical point"),
            DiagnosticEvent::CriticalPointNearBoundary { index } => {
                write!(f, "critical point at index {} too near boundary", index)
            }
            DiagnosticEvent::RadicandClamped { index } => {
                write!(f, "radicand clamped to 0 at index {}", index)
            }
            DiagnosticEvent::NegativeVelocity { index, inward } => write!(
                f,
                "negative velocity ({}) at index {}",
                if *inward { "down" } else { "up" },
                index
            ),
            DiagnosticEvent::StepCapReached { position } => {
                write!(f, "RK4 substep cap reached near r={:.4e}", position)
            }
            DiagnosticEvent::NotConverged { iterations, change } => write!(
                f,
                "not converged after {} iterations (change {:.4})",
                iterations, change
            ),
        }
    }
}

/// Structured per-model diagnostics record, collected by the driver and
/// returned alongside results.
#[derive(Debug, Clone, Default)]
pub struct ModelDiagnostics {
    pub model: usize,
    pub events: Vec<DiagnosticEvent>,
}

impl ModelDiagnostics {
    pub fn new(model: usize) -> Self {
        Self {
            model,
            events: Vec::new(),
        }
    }

    pub fn has(&self, event: &DiagnosticEvent) -> bool {
        self.events.iter().any(|e| e == event)
    }
}
