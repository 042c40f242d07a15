//! Shell completions generation command.

use std::io::Write;

use clap::CommandFactory as _;
use clap_complete::{Generator, Shell};

use crate::cli::Cli;

/// Generate shell completions for the specified shell.
pub fn generate_completions(shell: Shell) {
    write_completions(shell, &mut std::io::stdout());
}

fn write_completions<G: Generator>(generator: G, buf: &mut dyn Write) {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_owned();
    clap_complete::generate(generator, &mut cmd, bin_name, buf);
    buf.flush().ok();
}
