use clap::Parser;
use rayinit_core::{Args, Config, ProjectScaffolder, SystemRunner};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_error(err: &dyn std::error::Error) {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(&format!(": {}", cause));
        source = cause.source();
    }
    eprintln!("error: {}", message);
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.init_config {
        init_logging(args.log_level.as_deref().unwrap_or("info"));
        return match Config::create_config(&args.config) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                print_error(&e);
                ExitCode::FAILURE
            }
        };
    }

    let project_name = match args.project_name.clone() {
        Some(name) => name,
        None => {
            eprintln!("Usage: rayinit <project name>");
            return ExitCode::FAILURE;
        }
    };

    let config = Config::new(&args.config, &args, project_name);
    init_logging(&config.general.log_level);
    for warning in &config.warnings {
        tracing::warn!("{}", warning);
    }

    let runner = SystemRunner;
    match ProjectScaffolder::new(config, &runner).generate() {
        Ok(summary) => {
            tracing::info!(
                "Vendored {} files, skipped {}",
                summary.vendored.files_copied,
                summary.vendored.skipped.len()
            );
            println!("Finished!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_error(&e);
            ExitCode::FAILURE
        }
    }
}
