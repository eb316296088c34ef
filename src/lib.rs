mod app;
pub mod cli;
pub mod config;
mod console;
pub mod error;
mod input;
mod interrupt;
pub mod launcher;
pub mod profile;
pub mod select;
mod select_box;
pub mod telemetry;
mod terminal;

pub use app::{Action, App, Completion, CRATE_NAME, VERSION};
pub use console::Console;
pub use error::{AppError, ProfileError};
pub use interrupt::Interrupt;
pub use launcher::{LaunchOutcome, Launcher, SshLauncher};
pub use profile::{Profile, ProfileSet};
pub use select::{LinePrompt, Prompt, PromptOutcome};
pub use select_box::SelectBox;
