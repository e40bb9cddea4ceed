//! Completions command implementation
//!
//! Handles the `output-size completions` command which generates
//! shell completion scripts for bash, zsh, fish, etc.

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::io::Write;

use crate::cli::Cli;

/// Generate shell completion scripts
///
/// Outputs completion script for the specified shell to stdout.
///
/// # Examples
///
/// ```bash
/// # Bash
/// output-size completions bash > /etc/bash_completion.d/output-size
///
/// # Zsh
/// output-size completions zsh > ~/.zfunc/_output-size
/// ```
pub fn cmd_completions(shell: Shell) {
    write_completions(shell, &mut std::io::stdout());
}

fn write_completions(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, out);
}
