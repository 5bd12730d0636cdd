//! # Output Module
//!
//! Persists a solved batch as four JSON bundles (inputs, wave-free initial
//! solution, steady-state solution, full-RHS wave state) and prints a
//! per-model run summary table.

use crate::WindSolver::driver::SolarWindTask;
use crate::model::WindError;
use nalgebra::DVector;
use prettytable::{Table, row};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

fn vecify(profile: &DVector<f64>) -> Vec<f64> {
    profile.as_slice().to_vec()
}

fn vecify_opt(profile: &Option<DVector<f64>>) -> Option<Vec<f64>> {
    profile.as_ref().map(vecify)
}

/// Input profiles of the batch: heights, field, temperature, z_TR.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputsBundle {
    pub zx: Vec<f64>,
    pub b: Vec<Vec<f64>>,
    pub temperature: Vec<Vec<f64>>,
    pub z_tr: Vec<f64>,
}

/// Wave-free initial solution per model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialBundle {
    pub ucrit: Vec<Vec<f64>>,
    pub rhs: Vec<Vec<f64>>,
    pub u: Vec<Option<Vec<f64>>>,
    pub z_crit: Vec<Option<f64>>,
}

/// Steady-state outflow solution per model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteadyBundle {
    pub u: Vec<Option<Vec<f64>>>,
    pub z_crit: Vec<Option<f64>>,
    pub converged: Vec<bool>,
    pub iterations: Vec<usize>,
}

/// Full-RHS wave state of the final joint pass per model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullRhsBundle {
    pub rho: Vec<Option<Vec<f64>>>,
    pub wave_energy: Vec<Option<Vec<f64>>>,
    pub v_perp: Vec<Option<Vec<f64>>>,
    pub heating: Vec<Option<Vec<f64>>>,
    pub ucrit: Vec<Option<Vec<f64>>>,
    pub rhs: Vec<Option<Vec<f64>>>,
    pub efficiency: Vec<Option<Vec<f64>>>,
}

impl InputsBundle {
    pub fn from_task(task: &SolarWindTask) -> Self {
        Self {
            zx: vecify(&task.grid.zx),
            b: task.models.iter().map(|m| vecify(&m.b)).collect(),
            temperature: task.models.iter().map(|m| vecify(&m.temperature)).collect(),
            z_tr: task.models.iter().map(|m| m.z_tr).collect(),
        }
    }
}

impl InitialBundle {
    pub fn from_task(task: &SolarWindTask) -> Self {
        Self {
            ucrit: task.initial_profiles.iter().map(|p| vecify(&p.ucrit)).collect(),
            rhs: task.initial_profiles.iter().map(|p| vecify(&p.rhs)).collect(),
            u: task.initial.iter().map(|s| vecify_opt(&s.u)).collect(),
            z_crit: task.initial.iter().map(|s| s.z_crit).collect(),
        }
    }
}

impl SteadyBundle {
    pub fn from_task(task: &SolarWindTask) -> Self {
        Self {
            u: task.steady.iter().map(|s| vecify_opt(&s.u)).collect(),
            z_crit: task.steady.iter().map(|s| s.z_crit).collect(),
            converged: task.convergence.iter().map(|c| c.converged).collect(),
            iterations: task.convergence.iter().map(|c| c.iterations).collect(),
        }
    }
}

impl FullRhsBundle {
    pub fn from_task(task: &SolarWindTask) -> Self {
        let waves = &task.wave_states;
        Self {
            rho: waves.iter().map(|w| w.as_ref().map(|w| vecify(&w.rho))).collect(),
            wave_energy: waves.iter().map(|w| w.as_ref().map(|w| vecify(&w.u_a))).collect(),
            v_perp: waves.iter().map(|w| w.as_ref().map(|w| vecify(&w.v_perp))).collect(),
            heating: waves.iter().map(|w| w.as_ref().map(|w| vecify(&w.q_a))).collect(),
            ucrit: task
                .steady_profiles
                .iter()
                .map(|p| p.as_ref().map(|p| vecify(&p.ucrit)))
                .collect(),
            rhs: task
                .steady_profiles
                .iter()
                .map(|p| p.as_ref().map(|p| vecify(&p.rhs)))
                .collect(),
            efficiency: waves
                .iter()
                .map(|w| w.as_ref().map(|w| vecify(&w.efficiency)))
                .collect(),
        }
    }
}

fn write_json<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<(), WindError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}

/// Write the four result bundles as `<prefix>_inputs.json`,
/// `<prefix>_initial.json`, `<prefix>_steady.json`, `<prefix>_fullrhs.json`
/// in `dir`.
pub fn save_bundles<P: AsRef<Path>>(
    task: &SolarWindTask,
    dir: P,
    prefix: &str,
) -> Result<(), WindError> {
    let dir = dir.as_ref();
    write_json(&InputsBundle::from_task(task), dir.join(format!("{}_inputs.json", prefix)))?;
    write_json(&InitialBundle::from_task(task), dir.join(format!("{}_initial.json", prefix)))?;
    write_json(&SteadyBundle::from_task(task), dir.join(format!("{}_steady.json", prefix)))?;
    write_json(&FullRhsBundle::from_task(task), dir.join(format!("{}_fullrhs.json", prefix)))?;
    Ok(())
}

/// Per-model run summary.
pub fn summary_table(task: &SolarWindTask) -> Table {
    let mut table = Table::new();
    table.add_row(row![
        "Model",
        "Label",
        "z_crit (Rsun)",
        "Iterations",
        "Change",
        "Converged",
        "Diagnostics"
    ]);
    for j in 0..task.models.len() {
        let label = task.models[j].label.clone().unwrap_or_default();
        let z_crit = match task.steady[j].z_crit {
            Some(z) => format!("{:.4}", z),
            None => "-".to_string(),
        };
        let conv = &task.convergence[j];
        table.add_row(row![
            j,
            label,
            z_crit,
            conv.iterations,
            format!("{:.5}", conv.change),
            conv.converged,
            task.diagnostics[j].events.len()
        ]);
    }
    table
}

/// Print the run summary to stdout.
pub fn print_summary(task: &SolarWindTask) {
    println!("\n=== SOLAR WIND BATCH SUMMARY ===");
    if let Some(name) = &task.problem_name {
        println!("Problem: {}", name);
    }
    summary_table(task).printstd();
    for diag in &task.diagnostics {
        for event in &diag.events {
            println!("model {}: {}", diag.model, event);
        }
    }
}
