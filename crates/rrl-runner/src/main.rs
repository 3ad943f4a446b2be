use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use rrl_runner::{
    load_params, render_classification, render_evaluation, LinkConfig, OutputFormat, RunnerError,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Radio-relay link obstruction analysis", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify the profile and estimate a diffraction loss per segment
    Evaluate(LinkArgs),
    /// Print per-sample categories and merged segments only
    Classify(LinkArgs),
}

#[derive(Parser, Debug)]
struct LinkArgs {
    /// YAML link description
    #[arg(value_hint = ValueHint::FilePath)]
    link: PathBuf,

    /// YAML file overriding the obstruction parameters
    #[arg(long, value_hint = ValueHint::FilePath)]
    params: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<String, RunnerError> {
    match cli.command {
        Command::Evaluate(args) => {
            let link = LinkConfig::load(&args.link)?;
            let overrides = args.params.as_ref().map(load_params).transpose()?;
            let evaluation = link.evaluate(overrides.as_ref())?;
            info!(
                link = %args.link.display(),
                segments = evaluation.reports.len(),
                "evaluation complete"
            );
            render_evaluation(link.name.as_deref(), &evaluation, args.format)
        }
        Command::Classify(args) => {
            let link = LinkConfig::load(&args.link)?;
            let overrides = args.params.as_ref().map(load_params).transpose()?;
            let classification = link.classify(overrides.as_ref())?;
            render_classification(&classification, args.format)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
