use ParkerWind::EmpiricalFits::temperature_fit::fit_temperature;
use ParkerWind::Numerics::finite_diff::centered_derivative;
use ParkerWind::WindSolver::driver::SolarWindTask;
use ParkerWind::bzfile::{read_bz_file, refine};
use ParkerWind::config::{IterationConfig, WindConfig};
use ParkerWind::model::{Grid, ModelInput};
use ParkerWind::output::{print_summary, save_bundles};
use log::info;
use nalgebra::DVector;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let mut args = std::env::args().skip(1);
    let infile = args.next().unwrap_or_else(|| "demos/example_bz.in".to_string());
    let prefix = args.next().unwrap_or_else(|| "T".to_string());

    let config = WindConfig::default();
    let iteration = IterationConfig::default();

    let input = refine(&read_bz_file(&infile)?, 1)?;
    info!("read {} models at {} heights from {}", input.nmods(), input.nsteps(), infile);

    let grid = Grid::from_heights(&input.heights, &config)?;
    let mut models = Vec::with_capacity(input.nmods());
    for (label, b_raw) in input.labels.iter().zip(&input.b) {
        let b = DVector::from_vec(b_raw.clone());
        let dbdr = centered_derivative(&b, &grid.rm);
        let (temperature, dtdr, z_tr) = fit_temperature(&grid, &b, &config)?;
        models.push(ModelInput {
            label: Some(label.clone()),
            b,
            dbdr,
            temperature,
            dtdr,
            z_tr,
        });
    }

    let mut task = SolarWindTask::new(config, iteration, grid, models)?;
    task.set_problem_name(&infile);
    task.solve()?;

    save_bundles(&task, ".", &prefix)?;
    info!("saved result bundles with prefix '{}'", prefix);
    print_summary(&task);
    Ok(())
}
