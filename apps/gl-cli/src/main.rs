mod error;

use clap::{Parser, Subcommand};
use error::CliResult;
use gl_pipe::PipeSegment;
use gl_sim::run_sim;
use gl_solver::{SteadyConfig, solve_steady};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "gl-cli")]
#[command(about = "gasline CLI - compressible gas pipe simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax and structure
    Validate {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
    },
    /// Solve for the steady state of the scenario's network
    Steady {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
    },
    /// Integrate a single-pipe scenario in time
    Transient {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
        /// Time step in seconds (overrides the scenario)
        #[arg(long)]
        dt: Option<f64>,
        /// End time in seconds (overrides the scenario)
        #[arg(long)]
        t_end: Option<f64>,
        /// Output CSV file path (optional, prints a summary otherwise)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Steady { scenario_path } => cmd_steady(&scenario_path),
        Commands::Transient {
            scenario_path,
            dt,
            t_end,
            output,
        } => cmd_transient(&scenario_path, dt, t_end, output.as_deref()),
    }
}

fn cmd_validate(scenario_path: &Path) -> CliResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let scenario = gl_project::load(scenario_path)?;
    println!("✓ Scenario '{}' is valid", scenario.name);
    println!(
        "  {} pipes, {} boundaries, {} junctions",
        scenario.pipes.len(),
        scenario.boundaries.len(),
        scenario.junctions.len()
    );
    Ok(())
}

fn cmd_steady(scenario_path: &Path) -> CliResult<()> {
    let scenario = gl_project::load(scenario_path)?;
    let compiled = gl_project::compile_network(&scenario)?;
    let network = &compiled.network;

    println!("Solving steady state for: {}", scenario.name);
    let solution = solve_steady(network, &SteadyConfig::default())?;
    println!(
        "✓ Converged in {} iterations (residual {:.3e})",
        solution.iterations, solution.residual_norm
    );

    for (pipe, state) in network.pipe_states(&solution.state) {
        print_pipe(pipe, state);
    }
    let pressures = network.junction_pressures(&solution.state);
    let imbalance = network.junction_imbalance(&solution.state);
    for (k, junction) in network.junctions().iter().enumerate() {
        let (p, imbalance) = (pressures[k], imbalance[k]);
        println!(
            "\nJunction '{}': p = {:.1} Pa, net flow = {:.3e} kg/s",
            junction.name, p, imbalance
        );
    }
    Ok(())
}

fn print_pipe(pipe: &PipeSegment, state: &[f64]) {
    println!("\nPipe '{}':", pipe.name());
    println!("  pressures [Pa]:");
    for (i, p) in pipe.pressures(state).iter().enumerate() {
        println!("    p[{i}] = {p:.1}");
    }
    println!("  mass flows [kg/s]:");
    for (j, q) in pipe.fluxes(state).iter().enumerate() {
        println!("    qm[{j}] = {q:.6}");
    }
    let (inlet, outlet) = pipe.boundary_ports(state);
    println!(
        "  ports: inlet qm = {:.6} kg/s, outlet qm = {:.6} kg/s",
        inlet.mass_flow.value, outlet.mass_flow.value
    );
}

fn cmd_transient(
    scenario_path: &Path,
    dt: Option<f64>,
    t_end: Option<f64>,
    output: Option<&Path>,
) -> CliResult<()> {
    let scenario = gl_project::load(scenario_path)?;
    let mut model = gl_project::compile_transient(&scenario)?;
    let mut opts = gl_project::sim_options(&scenario.run);
    if let Some(dt) = dt {
        opts.dt = dt;
    }
    if let Some(t_end) = t_end {
        opts.t_end = t_end;
    }

    println!(
        "Running transient for: {} (dt = {} s, t_end = {} s)",
        scenario.name, opts.dt, opts.t_end
    );
    let record = run_sim(&mut model, &opts)?;
    tracing::info!(records = record.t.len(), "transient finished");
    let segment = model.segment();

    if let Some(path) = output {
        let mut csv = String::from("time_s");
        for name in segment.unknown_names() {
            csv.push(',');
            csv.push_str(&name);
        }
        csv.push_str(",mass_kg\n");
        for (t, x) in record.t.iter().zip(&record.x) {
            csv.push_str(&format!("{t}"));
            for v in x {
                csv.push_str(&format!(",{v}"));
            }
            csv.push_str(&format!(",{}\n", model.mass_inventory(x)));
        }
        std::fs::write(path, csv)?;
        println!(
            "✓ Exported {} time points to {}",
            record.t.len(),
            path.display()
        );
    } else if let Some((t, x)) = record.last() {
        println!("✓ Reached t = {t:.3} s");
        print_pipe(segment, x);
        let m0 = model.mass_inventory(&record.x[0]);
        println!(
            "  mass inventory: {:.6} kg (initial {:.6} kg)",
            model.mass_inventory(x),
            m0
        );
    }
    Ok(())
}
