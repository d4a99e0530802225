use std::io::{self, Write};
use std::process;

use anyhow::{Context, Result};
use structopt::StructOpt;
use tracing::{debug, info};
use tracing_subscriber::filter::EnvFilter;

use child_capture::args::Opt;
use child_capture::{context, run_and_report, RunRecord};

/// Runs one child and prints its stdout followed by its exit code.
fn main() -> Result<()> {
    // Logs go to stderr so our stdout is exactly the child's plus the exit line.
    tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();

    let opt = Opt::from_args();
    let spec = opt.to_spec();
    debug!("Running {:?}", spec);

    // Child output is printed as soon as its stdout closes, before we wait.
    let stdout = io::stdout();
    let output = run_and_report(&spec, &mut stdout.lock())?;

    if !output.stderr().is_empty() {
        io::stderr()
            .write_all(output.stderr())
            .with_context(|| context!("Cannot forward captured stderr."))?;
    }

    if let Some(path) = &opt.record {
        RunRecord::new(&spec, &output)
            .save(path)
            .with_context(|| context!("Cannot save run record."))?;
        info!("Saved run record to {:?}", path);
    }

    if opt.propagate_exit_code {
        process::exit(output.exit_code());
    }
    Ok(())
}
