use std::{
    io::Write,
    path::{Path, PathBuf},
};

use tracing::{info, warn};

use crate::{
    config::{self, LoadReport},
    console::Console,
    error::AppError,
    launcher::{LaunchOutcome, Launcher},
    profile::{Profile, ProfileSet},
    select::{self, Prompt, Selection},
};

pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const HOMEPAGE: &str = "https://github.com/C0dWiz/aassh";

const EDIT_SAMPLE: &str = "Please edit this file with your actual profiles";

/// The one thing a single invocation does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Version,
    CreateSampleConfig { force: bool },
    List,
    Interactive,
    Connect(String),
}

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Done,
    Cancelled,
    ConnectionFailed { code: Option<i32> },
}

impl Completion {
    /// Process exit status. A failed connection only counts as a failure
    /// when `propagate_connection_failure` is set.
    pub fn exit_status(self, propagate_connection_failure: bool) -> u8 {
        match self {
            Completion::ConnectionFailed { .. } if propagate_connection_failure => 1,
            _ => 0,
        }
    }
}

pub struct App<W: Write, P: Prompt, L: Launcher> {
    console: Console<W>,
    prompt: P,
    launcher: L,
}

impl<W: Write, P: Prompt, L: Launcher> App<W, P, L> {
    pub fn new(console: Console<W>, prompt: P, launcher: L) -> Self {
        App {
            console,
            prompt,
            launcher,
        }
    }

    pub fn console(&mut self) -> &mut Console<W> {
        &mut self.console
    }

    pub fn into_parts(self) -> (Console<W>, P, L) {
        (self.console, self.prompt, self.launcher)
    }

    /// Run `action`. `config_path` is only resolved for actions that need it.
    pub fn run(
        &mut self,
        action: Action,
        config_path: impl FnOnce() -> Result<PathBuf, AppError>,
    ) -> Result<Completion, AppError> {
        match action {
            Action::Version => {
                self.console.success(&format!("AASSH v{VERSION}"))?;
                self.console.line(&format!("GitHub: {HOMEPAGE}"))?;
                Ok(Completion::Done)
            }
            Action::CreateSampleConfig { force } => {
                let path = config_path()?;
                config::write_sample_config(&path, force)?;
                info!(path = %path.display(), "wrote sample config");
                self.console.success(&format!(
                    "Sample configuration created: {}",
                    path.display()
                ))?;
                self.console.info(EDIT_SAMPLE)?;
                Ok(Completion::Done)
            }
            Action::List => {
                let profiles = self.load(&config_path()?)?;
                self.console.profile_table(&profiles)?;
                Ok(Completion::Done)
            }
            Action::Interactive => {
                let path = config_path()?;
                let profiles = self.load(&path)?;
                match select::select(&mut self.prompt, &mut self.console, &profiles, &path)? {
                    Selection::Resolved(profile) => self.connect(profile),
                    Selection::Cancelled => {
                        self.console.warn("Operation cancelled by user")?;
                        Ok(Completion::Cancelled)
                    }
                }
            }
            Action::Connect(name) => {
                let profiles = self.load(&config_path()?)?;
                match profiles.get(&name) {
                    Some(profile) => self.connect(profile),
                    None => Err(AppError::ProfileNotFound {
                        name,
                        available: profiles.names(),
                    }),
                }
            }
        }
    }

    /// Load the config, reporting every skipped profile.
    fn load(&mut self, path: &Path) -> Result<ProfileSet, AppError> {
        let LoadReport {
            profiles,
            diagnostics,
        } = config::load(path)?;

        for diagnostic in &diagnostics {
            self.console.error(&format!(
                "Error: skipping profile '{}': {}",
                diagnostic.profile, diagnostic.error
            ))?;
        }
        if profiles.is_empty() {
            warn!(path = %path.display(), "no usable profiles loaded");
            self.console.warn(&format!(
                "Warning: no usable profiles in {}",
                path.display()
            ))?;
        }

        Ok(profiles)
    }

    fn connect(&mut self, profile: &Profile) -> Result<Completion, AppError> {
        self.console.line("")?;
        let connecting = format!("Connecting to {}...", profile.name);
        self.console.success(&connecting)?;
        self.console.info(&self.launcher.describe(profile))?;
        self.console.line("")?;

        match self.launcher.launch(profile)? {
            LaunchOutcome::Completed => Ok(Completion::Done),
            LaunchOutcome::Failed { code } => {
                let code_text = code.map_or_else(|| "none".to_string(), |code| code.to_string());
                self.console.error(&format!(
                    "SSH connection failed (exit code {code_text})"
                ))?;
                Ok(Completion::ConnectionFailed { code })
            }
            LaunchOutcome::Cancelled => {
                self.console.line("")?;
                self.console.warn("Connection terminated by user")?;
                Ok(Completion::Cancelled)
            }
        }
    }
}
