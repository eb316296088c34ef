//! Command-line arguments and the prompt chosen for the current terminal.
use std::{
    env,
    io::{self, IsTerminal, Write},
    path::PathBuf,
};

use clap::Parser;

use crate::{
    app::Action,
    console::Console,
    interrupt::Interrupt,
    profile::ProfileSet,
    select::{LinePrompt, Prompt, PromptOutcome},
    select_box::SelectBox,
};

pub const PROPAGATE_EXIT_CODE_ENV: &str = "AASSH_PROPAGATE_EXIT_CODE";

/// Command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "aassh",
    about = "AASSH - Another Awesome SSH Client",
    long_about = "Connect to SSH servers described in ~/.aassh/config.yml, by name or through an interactive picker.",
    disable_version_flag = true
)]
pub struct Cli {
    /// SSH profile name to connect
    pub profile: Option<String>,
    /// List all available profiles
    #[arg(short, long)]
    pub list: bool,
    /// Interactive profile selection
    #[arg(short, long)]
    pub interactive: bool,
    /// Show version information
    #[arg(short = 'v', long)]
    pub version: bool,
    /// Create a sample configuration file
    #[arg(long)]
    pub create_sample_config: bool,
    /// Overwrite an existing file with --create-sample-config
    #[arg(long, requires = "create_sample_config")]
    pub force: bool,
    /// Path to the profile file (overrides AASSH_CONFIG)
    #[arg(long = "config", value_name = "PATH")]
    pub config_override: Option<PathBuf>,
    /// Exit with status 1 when the SSH connection fails
    #[arg(long)]
    pub propagate_exit_code: bool,
}

impl Cli {
    /// The action to run. Flags win over a profile name, in the order
    /// version, sample config, list, interactive.
    pub fn action(&self) -> Action {
        if self.version {
            Action::Version
        } else if self.create_sample_config {
            Action::CreateSampleConfig { force: self.force }
        } else if self.list {
            Action::List
        } else if self.interactive {
            Action::Interactive
        } else if let Some(name) = &self.profile {
            Action::Connect(name.clone())
        } else {
            Action::Interactive
        }
    }

    /// `--propagate-exit-code`, or `AASSH_PROPAGATE_EXIT_CODE` set to a true value.
    pub fn propagate_exit_code(&self) -> bool {
        self.propagate_exit_code
            || env::var(PROPAGATE_EXIT_CODE_ENV).is_ok_and(|value| is_truthy(&value))
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Table picker on a terminal, plain line prompt otherwise.
pub enum TerminalPrompt {
    Table(SelectBox),
    Line(LinePrompt),
}

impl TerminalPrompt {
    pub fn detect(interrupt: Interrupt) -> Self {
        if io::stdin().is_terminal() && io::stdout().is_terminal() {
            TerminalPrompt::Table(SelectBox::default())
        } else {
            TerminalPrompt::Line(LinePrompt::stdin(interrupt))
        }
    }
}

impl Prompt for TerminalPrompt {
    fn ask<W: Write>(
        &mut self,
        console: &mut Console<W>,
        profiles: &ProfileSet,
    ) -> anyhow::Result<PromptOutcome> {
        match self {
            TerminalPrompt::Table(select_box) => select_box.ask(console, profiles),
            TerminalPrompt::Line(line) => line.ask(console, profiles),
        }
    }
}
