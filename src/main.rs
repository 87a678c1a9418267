//! Nodal - Laplace-domain circuit solver
//!
//! Solves a linear R/L/C circuit driven by step sources, prints every node
//! voltage in the s-domain and the time domain, and samples the waveforms.
//!
//! # Usage
//!
//! ```bash
//! nodal rc.net --t-stop 5 --points 500 --csv rc.csv
//! RUST_LOG=debug nodal rc.net --components --system
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use nodal_core::{
    circuit::Circuit,
    dsl,
    error::{NodalError, Result},
    report,
    solver::{SampleConfig, SamplePolicy, TimeGrid},
    Analysis, DEFAULT_POINTS, DEFAULT_T_STOP,
};

/// Laplace-domain nodal analysis of linear circuits
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the netlist file
    #[arg(value_name = "NETLIST")]
    netlist: PathBuf,

    /// End of the sampled window in seconds (overrides `.tran`)
    #[arg(long)]
    t_stop: Option<f64>,

    /// Number of sample points (overrides `.tran`)
    #[arg(long)]
    points: Option<usize>,

    /// Keep going past samples that cannot be evaluated
    #[arg(long)]
    skip_failures: bool,

    /// With --skip-failures, give up after this many failures in a row
    #[arg(long, value_name = "N", requires = "skip_failures")]
    max_consecutive: Option<usize>,

    /// Also report voltage and current of every component
    #[arg(long)]
    components: bool,

    /// Print the assembled admittance system
    #[arg(long)]
    system: bool,

    /// Write sampled traces to a CSV file
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Parse the netlist
    let ast = dsl::parse_file(&args.netlist)?;

    // Build the circuit
    let circuit = Circuit::from_netlist(&ast)?;

    // Solve
    let solution = Analysis::new(circuit).run()?;

    // Sample grid: flags, then `.tran`, then defaults
    let t_stop = args
        .t_stop
        .or(ast.tran.map(|t| t.t_stop))
        .unwrap_or(DEFAULT_T_STOP);
    let points = args
        .points
        .or(ast.tran.map(|t| t.points))
        .unwrap_or(DEFAULT_POINTS);
    let policy = if args.skip_failures {
        match args.max_consecutive {
            Some(max_consecutive) => SamplePolicy::SkipAndContinue { max_consecutive },
            None => SamplePolicy::skip_all(),
        }
    } else {
        SamplePolicy::AbortOnFirst
    };
    let sampling = SampleConfig::new(TimeGrid::linspace(0.0, t_stop, points)?).with_policy(policy);

    let mut quantities = solution.node_quantities();
    if args.components {
        quantities.extend(solution.component_quantities());
    }
    let traces = solution.traces(&quantities, &sampling)?;

    // Report
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.system {
        report::write_system(&mut out, solution.system())?;
    }
    report::write_node_voltages(&mut out, &solution)?;
    report::write_traces(&mut out, &traces)?;

    if let Some(path) = &args.csv {
        let file = File::create(path).map_err(|e| NodalError::OutputError {
            message: format!("{}: {}", path.display(), e),
        })?;
        let mut writer = BufWriter::new(file);
        report::write_csv(&mut writer, &sampling.grid, &traces)?;
        writer.flush().map_err(|e| NodalError::OutputError {
            message: e.to_string(),
        })?;
        tracing::info!(path = %path.display(), "wrote samples");
    }

    // Any failed trace fails the run
    if let Some(err) = traces.into_iter().find_map(|t| t.samples.err()) {
        return Err(err);
    }

    Ok(())
}
