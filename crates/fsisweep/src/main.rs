use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use fsisweep::{Action, Options, init_logging, run};
use fsisweep_core::{ExitPolicy, ShellRunner};

#[derive(Parser, Debug)]
#[command(name = "fsisweep")]
#[command(about = "Builds and runs Abaqus/Star-CCM+ FSI models of parallel plate assemblies")]
struct Args {
    /// Parameter file shared with the model-building scripts (default: InputFile.txt in the working directory)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory the solvers run in and write their outputs to (default: current directory)
    #[arg(short = 'C', long)]
    work_dir: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Abort when a solver exits with a non-zero status
    #[arg(long)]
    strict_exit: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the models; sweeps one parameter when parametricSwitch is true (default)
    Run,
    /// Run an already-built coupled model in batch
    Solve {
        /// Parametric-study model number; omit to derive the name from the plate geometry
        #[arg(short, long)]
        model: Option<usize>,
    },
}

fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let args = Args::parse();
    let work_dir = match args.work_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let input = args
        .input
        .unwrap_or_else(|| work_dir.join("InputFile.txt"));

    init_logging(&work_dir, &args.log_level)?;

    let options = Options {
        input,
        work_dir: work_dir.clone(),
        policy: if args.strict_exit {
            ExitPolicy::Strict
        } else {
            ExitPolicy::Permissive
        },
        action: match args.command {
            None | Some(Command::Run) => Action::Build,
            Some(Command::Solve { model }) => Action::Solve { model },
        },
    };

    let runner = ShellRunner::new(work_dir);
    let outcome = run(&options, &runner)?;

    tracing::info!(?outcome, "Finished");
    Ok(ExitCode::from(outcome.exit_code()))
}
