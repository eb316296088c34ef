use std::{io::Write, process::ExitCode};

use aassh::{
    cli::{Cli, TerminalPrompt},
    config, telemetry, App, AppError, Console, Interrupt, SshLauncher,
};
use clap::Parser;
use tracing::warn;

fn main() -> ExitCode {
    if let Err(err) = telemetry::init_tracing() {
        eprintln!("{err:#}");
    }

    let cli = Cli::parse();

    let interrupt = Interrupt::install().unwrap_or_else(|err| {
        warn!(%err, "failed to install Ctrl-C handler");
        Interrupt::default()
    });

    let prompt = TerminalPrompt::detect(interrupt.clone());
    let launcher = SshLauncher::new(interrupt);
    let mut app = App::new(Console::stdout(), prompt, launcher);

    let config_override = cli.config_override.clone();
    match app.run(cli.action(), || config::resolve_config_path(config_override)) {
        Ok(done) => ExitCode::from(done.exit_status(cli.propagate_exit_code())),
        Err(err) => {
            report(app.console(), &err);
            ExitCode::FAILURE
        }
    }
}

fn report<W: Write>(console: &mut Console<W>, err: &AppError) {
    let _ = console.error(&format!("Error: {err}"));
    if let Some(hint) = err.hint() {
        let _ = console.hint(&hint);
    }
}
