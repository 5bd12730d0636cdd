//! Outer relaxed fixed-point driver coupling velocity and heating.
//!
//! Workflow per batch:
//! 1. `initial_solution` — wave-free RHS and outflow for every model, giving
//!    the first velocity guess.
//! 2. `relax_to_steady` — each model iterates {full RHS -> outflow -> blend}
//!    independently until its mean fractional velocity change drops below
//!    tolerance (after the iteration floor) or the cap is reached; the cap is
//!    a reported soft failure whose last iterate is kept.
//! 3. `joint_pass` — one final full-RHS + outflow pass across all models
//!    together produces the batch result and the persisted wave state.
//!
//! Models never share mutable state; the grid is read-only.

use crate::WindSolver::critical_point::resolve;
use crate::WindSolver::momentum_rhs::{RhsProfiles, WaveState, full_rhs, initial_rhs};
use crate::WindSolver::shooting::propagate;
use crate::config::{IterationConfig, WindConfig};
use crate::model::{
    ConvergenceState, CriticalPoint, DiagnosticEvent, Grid, ModelDiagnostics, ModelInput,
    WindError,
};
use log::{info, warn};
use nalgebra::DVector;

/// Outflow solution of one model. `u` and `z_crit` stay `None` when the
/// model has no valid critical point.
#[derive(Debug, Clone, Default)]
pub struct OutflowSolution {
    /// Outflow speed profile (cm/s)
    pub u: Option<DVector<f64>>,
    /// Critical-point height (Rsun above photosphere)
    pub z_crit: Option<f64>,
    /// Resolved critical point
    pub critical: Option<CriticalPoint>,
}

/// Locate, resolve and shoot one model's outflow from its RHS profiles.
pub fn solve_outflow(
    grid: &Grid,
    profiles: &RhsProfiles,
    config: &WindConfig,
    events: &mut Vec<DiagnosticEvent>,
) -> Result<OutflowSolution, WindError> {
    let Some(critical) = resolve(grid, &profiles.rhs, &profiles.ucrit, config, events)? else {
        return Ok(OutflowSolution::default());
    };
    let u = propagate(grid, &critical, &profiles.ucrit, &profiles.rhs, config, events)?;
    Ok(OutflowSolution {
        u: Some(u),
        z_crit: Some(critical.r_crit / config.r_sun - 1.0),
        critical: Some(critical),
    })
}

/// One batch of flux-tube models and everything solved for them.
#[derive(Debug, Clone)]
pub struct SolarWindTask {
    pub problem_name: Option<String>,
    pub config: WindConfig,
    pub iteration: IterationConfig,
    pub grid: Grid,
    pub models: Vec<ModelInput>,
    /// Wave-free RHS profiles per model
    pub initial_profiles: Vec<RhsProfiles>,
    /// Wave-free outflow solutions per model
    pub initial: Vec<OutflowSolution>,
    /// Full-RHS profiles of the final joint pass
    pub steady_profiles: Vec<Option<RhsProfiles>>,
    /// Steady-state outflow solutions of the final joint pass
    pub steady: Vec<OutflowSolution>,
    /// Wave state of the final joint pass
    pub wave_states: Vec<Option<WaveState>>,
    pub convergence: Vec<ConvergenceState>,
    pub diagnostics: Vec<ModelDiagnostics>,
}

impl SolarWindTask {
    pub fn new(
        config: WindConfig,
        iteration: IterationConfig,
        grid: Grid,
        models: Vec<ModelInput>,
    ) -> Result<Self, WindError> {
        config.validate()?;
        iteration.validate()?;
        if models.is_empty() {
            return Err(WindError::MissingData("no models given".to_string()));
        }
        for model in &models {
            model.validate(&grid)?;
        }
        let nmods = models.len();
        Ok(Self {
            problem_name: None,
            config,
            iteration,
            grid,
            models,
            initial_profiles: Vec::new(),
            initial: Vec::new(),
            steady_profiles: vec![None; nmods],
            steady: vec![OutflowSolution::default(); nmods],
            wave_states: vec![None; nmods],
            convergence: vec![ConvergenceState::default(); nmods],
            diagnostics: (0..nmods).map(ModelDiagnostics::new).collect(),
        })
    }

    pub fn set_problem_name(&mut self, name: &str) {
        self.problem_name = Some(name.to_string());
    }

    /// Wave-free initial solution for every model.
    pub fn initial_solution(&mut self) -> Result<(), WindError> {
        self.initial_profiles.clear();
        self.initial.clear();
        for j in 0..self.models.len() {
            let profiles = initial_rhs(&self.grid, &self.models[j], &self.config)?;
            let solution = solve_outflow(
                &self.grid,
                &profiles,
                &self.config,
                &mut self.diagnostics[j].events,
            )?;
            self.initial_profiles.push(profiles);
            self.initial.push(solution);
        }
        info!("initial (wave-free) solution computed for all models");
        Ok(())
    }

    /// Relax each model independently to a self-consistent velocity/heating
    /// state.
    pub fn relax_to_steady(&mut self) -> Result<(), WindError> {
        if self.initial.len() != self.models.len() {
            return Err(WindError::MissingData(
                "initial solution missing; call initial_solution() first".to_string(),
            ));
        }
        for j in 0..self.models.len() {
            let Some(mut guess) = self.initial[j].u.clone() else {
                warn!("model {} skipped: no initial critical point", j);
                continue;
            };
            let mut state = ConvergenceState {
                change: 1.0,
                iterations: 0,
                converged: false,
            };
            while (state.change > self.iteration.tolerance
                && state.iterations < self.iteration.max_iterations)
                || state.iterations < self.iteration.min_iterations
            {
                let events = &mut self.diagnostics[j].events;
                let (profiles, _waves) =
                    full_rhs(&self.grid, &self.models[j], &guess, &self.config, events)?;
                let solution = solve_outflow(&self.grid, &profiles, &self.config, events)?;
                let Some(u_new) = solution.u else {
                    // critical point lost mid-iteration: keep the previous
                    // iterate and stop this model
                    warn!("model {} lost its critical point at iteration {}", j, state.iterations);
                    break;
                };
                state.change = mean_fractional_change(&u_new, &guess);
                relax_guess(&mut guess, &u_new, self.iteration.relax);
                state.iterations += 1;
            }
            state.converged = state.change <= self.iteration.tolerance;
            if !state.converged {
                self.diagnostics[j].events.push(DiagnosticEvent::NotConverged {
                    iterations: state.iterations,
                    change: state.change,
                });
            }
            info!(
                "model {}: {} iterations, conv: {:.5}",
                j, state.iterations, state.change
            );
            self.convergence[j] = state;
            self.initial[j].u = Some(guess);
        }
        Ok(())
    }

    /// Final joint pass across all models with their relaxed velocities.
    pub fn joint_pass(&mut self) -> Result<(), WindError> {
        for j in 0..self.models.len() {
            let Some(guess) = self.initial[j].u.clone() else {
                continue;
            };
            let events = &mut self.diagnostics[j].events;
            let (profiles, waves) =
                full_rhs(&self.grid, &self.models[j], &guess, &self.config, events)?;
            let solution = solve_outflow(&self.grid, &profiles, &self.config, events)?;
            self.steady[j] = solution;
            self.steady_profiles[j] = Some(profiles);
            self.wave_states[j] = Some(waves);
        }
        info!("final joint pass finished");
        Ok(())
    }

    /// Complete pipeline: initial solution, per-model relaxation, joint pass.
    pub fn solve(&mut self) -> Result<(), WindError> {
        self.initial_solution()?;
        self.relax_to_steady()?;
        self.joint_pass()
    }
}

/// Mean absolute fractional change between successive velocity iterates.
pub fn mean_fractional_change(u_new: &DVector<f64>, u_old: &DVector<f64>) -> f64 {
    let n = u_new.len();
    let mut acc = 0.0;
    for k in 0..n {
        acc += ((u_new[k] - u_old[k]) / u_old[k]).abs();
    }
    acc / n as f64
}

/// Weighted geometric blend of the previous and new velocity guesses:
/// guess <- guess^(1-relax) * new^relax.
pub fn relax_guess(guess: &mut DVector<f64>, u_new: &DVector<f64>, relax: f64) {
    for k in 0..guess.len() {
        guess[k] = guess[k].powf(1.0 - relax) * u_new[k].powf(relax);
    }
}
