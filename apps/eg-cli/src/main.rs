use clap::{Parser, Subcommand};
use eg_cli::{CliResult, Layout, Model, load_yaml, simulate, template};
use eg_core::units::s;
use eg_energy::ErrorFunction;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "eg-cli")]
#[command(about = "Ergon CLI - step point-mass scenarios by energy minimization", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario and print one sample per step
    Run {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
        /// Override the number of steps in the file
        #[arg(long)]
        steps: Option<usize>,
        /// Print samples as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Validate a scenario and show its state layout and terms
    Check {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
    },
    /// Print a starting scenario file
    Template,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            scenario_path,
            steps,
            json,
        } => cmd_run(&scenario_path, steps, json),
        Commands::Check { scenario_path } => cmd_check(&scenario_path),
        Commands::Template => cmd_template(),
    }
}

fn cmd_run(scenario_path: &Path, steps: Option<usize>, json: bool) -> CliResult<()> {
    let scenario = load_yaml(scenario_path)?;
    let samples = simulate(&scenario, steps)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&samples)?);
        return Ok(());
    }

    println!("Scenario: {}", scenario.name);
    println!(
        "{:>5} {:>9} {:>10} {:>34} {:>34} {:>10} {:>5}",
        "step", "t [s]", "m [kg]", "x [m]", "v [m/s]", "E [J]", "iter"
    );
    for sample in &samples {
        let [x, y, z] = sample.position;
        let [vx, vy, vz] = sample.velocity;
        println!(
            "{:>5} {:>9.4} {:>10.5} {:>10.4} {:>11.4} {:>11.4} {:>10.4} {:>11.4} {:>11.4} {:>10.2e} {:>5}{}",
            sample.step,
            sample.time,
            sample.mass,
            x,
            y,
            z,
            vx,
            vy,
            vz,
            sample.energy,
            sample.iterations,
            if sample.converged { "" } else { " !" }
        );
    }
    let unconverged = samples.iter().filter(|s| !s.converged).count();
    if unconverged == 0 {
        println!("✓ {} steps converged", samples.len() - 1);
    } else {
        println!("! {unconverged} steps stopped before converging");
    }
    Ok(())
}

fn cmd_check(scenario_path: &Path) -> CliResult<()> {
    println!("Checking scenario: {}", scenario_path.display());
    let scenario = load_yaml(scenario_path)?;
    let model = Model::build(&scenario)?;

    println!("State layout ({} slots):", Layout::DIMENSION);
    for (name, first, width) in model.layout.slots() {
        println!("  [{:>2}..{:>2}) {}", first, first + width, name);
    }

    // Energies of the previous state taken as its own next-state guess.
    let function = ErrorFunction::new(&model.initial, s(scenario.dt), &model.terms)?;
    println!("Terms at the initial guess:");
    for term in function.breakdown(&model.initial)? {
        println!("  {:<24} {:.6e} J", term.name, term.energy);
    }
    println!("✓ Scenario is valid");
    Ok(())
}

fn cmd_template() -> CliResult<()> {
    print!("{}", serde_yaml::to_string(&template())?);
    Ok(())
}
