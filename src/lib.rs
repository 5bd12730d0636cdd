#[allow(non_snake_case)]
pub mod EmpiricalFits;
#[allow(non_snake_case)]
pub mod Numerics;
#[allow(non_snake_case)]
pub mod WaveTransport;
#[allow(non_snake_case)]
pub mod WindSolver;
pub mod bzfile;
pub mod config;
pub mod model;
pub mod output;
