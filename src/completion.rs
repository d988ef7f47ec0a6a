//! # Shell Completion Module
//!
//! ```bash
//! # Generate bash completions
//! segue completion bash > ~/.local/share/bash-completion/completions/segue
//!
//! # Generate zsh completions
//! segue completion zsh > ~/.config/zsh/completions/_segue
//! ```

use crate::cli::Shell;
use clap::Command;
use clap_complete::{generate, Generator, Shell as CompletionShell};
use std::io;

/// Generate shell completions for the given shell
pub fn generate_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate_completions_to(gen, cmd, &mut io::stdout());
}

/// Like [`generate_completions`], writing into `out`.
pub fn generate_completions_to<G: Generator>(gen: G, cmd: &mut Command, out: &mut dyn io::Write) {
    let name = cmd.get_name().to_string();
    generate(gen, cmd, name, out);
}

#[must_use]
pub fn shell_to_completion_shell(shell: Shell) -> CompletionShell {
    match shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    }
}
