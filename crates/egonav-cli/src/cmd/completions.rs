use clap::Args;
use clap_complete::{Shell, generate};

/// Arguments for `egonav completions`.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script generation.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `shell` to stdout.
pub fn run_completions(shell: Shell, command: &mut clap::Command) -> anyhow::Result<()> {
    let mut out = std::io::stdout();
    generate(shell, command, "egonav", &mut out);
    Ok(())
}
