use clap::Parser;
use output_size::cli::{Cli, Commands};
use output_size::{actions, cmd};
use std::process;

fn main() {
    // Initialize logger (use RUST_LOG env var to control verbosity)
    env_logger::init();

    let cli = Cli::parse();

    // Set console emoji mode based on CLI flag
    if cli.no_emoji {
        std::env::set_var("NO_EMOJI", "1");
    }

    let result = match cli.command {
        Some(Commands::Measure(args)) => cmd::cmd_measure(args),
        Some(Commands::Render { report }) => cmd::cmd_render(&report),
        Some(Commands::Completions { shell }) => {
            cmd::cmd_completions(shell);
            Ok(())
        }
        None => cmd::cmd_measure(cli.measure),
    };

    if let Err(e) = result {
        use output_size::error::ErrorFormatter;
        actions::error_annotation(&ErrorFormatter::summary(&e));
        eprintln!("{}", ErrorFormatter::format(&e));
        let exit_code = ErrorFormatter::exit_code(&e);
        process::exit(exit_code);
    }
}
