//! Running the system SSH client against a profile.
use std::{
    env,
    ffi::{OsStr, OsString},
    io,
    path::Path,
    process::{Command, ExitStatus},
};

use thiserror::Error;
use tracing::{debug, info};

use crate::{interrupt::Interrupt, profile::Profile};

pub const DEFAULT_SSH_PROGRAM: &str = "ssh";
pub const SSH_PROGRAM_ENV: &str = "AASSH_SSH_PROGRAM";
/// Refuse hosts whose key is not already in `known_hosts`.
pub const STRICT_HOST_KEY_CHECKING: &str = "StrictHostKeyChecking=yes";

#[cfg(unix)]
const SIGINT: i32 = 2;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("SSH client `{program}` not found")]
    ClientNotFound { program: String },
    #[error("failed to run `{program}`: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// How a connection attempt ended. None of these are process failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    Completed,
    Failed { code: Option<i32> },
    Cancelled,
}

pub trait Launcher {
    fn launch(&mut self, profile: &Profile) -> Result<LaunchOutcome, LaunchError>;

    fn describe(&self, profile: &Profile) -> String;
}

/// Arguments passed to the SSH client for `profile`, in order: host key
/// policy, port, identity file, destination.
pub fn ssh_args(profile: &Profile, home: Option<&Path>) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-o".into(), STRICT_HOST_KEY_CHECKING.into()];

    if let Some(port) = profile.port {
        args.push("-p".into());
        args.push(port.to_string().into());
    }

    if let Some(key) = profile.key_path(home) {
        args.push("-i".into());
        args.push(key.into_os_string());
    }

    args.push(profile.destination().into());
    args
}

pub fn command_line(program: &OsStr, args: &[OsString]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(OsString::as_os_str))
        .map(OsStr::to_string_lossy)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Runs the SSH client in the foreground with inherited stdio.
#[derive(Debug, Clone)]
pub struct SshLauncher {
    program: OsString,
    interrupt: Interrupt,
}

impl SshLauncher {
    /// Launcher for `$AASSH_SSH_PROGRAM`, or `ssh` when unset.
    pub fn new(interrupt: Interrupt) -> Self {
        let program =
            env::var_os(SSH_PROGRAM_ENV).unwrap_or_else(|| OsString::from(DEFAULT_SSH_PROGRAM));
        Self::with_program(program, interrupt)
    }

    pub fn with_program(program: impl Into<OsString>, interrupt: Interrupt) -> Self {
        Self {
            program: program.into(),
            interrupt,
        }
    }

    fn outcome(&self, status: ExitStatus) -> LaunchOutcome {
        let interrupted = self.interrupt.take();
        if interrupted || killed_by_interrupt(&status) {
            LaunchOutcome::Cancelled
        } else if status.success() {
            LaunchOutcome::Completed
        } else {
            LaunchOutcome::Failed {
                code: status.code(),
            }
        }
    }
}

impl Launcher for SshLauncher {
    fn launch(&mut self, profile: &Profile) -> Result<LaunchOutcome, LaunchError> {
        let args = ssh_args(profile, dirs::home_dir().as_deref());
        let program = self.program.to_string_lossy().into_owned();
        info!(profile = %profile.name, program = %program, "launching ssh client");

        // stale presses from the prompt must not cancel this session
        self.interrupt.take();

        let status = match Command::new(&self.program).args(&args).status() {
            Ok(status) => status,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(LaunchError::ClientNotFound { program })
            }
            Err(source) => return Err(LaunchError::Io { program, source }),
        };

        let outcome = self.outcome(status);
        debug!(profile = %profile.name, ?status, ?outcome, "ssh client exited");
        Ok(outcome)
    }

    fn describe(&self, profile: &Profile) -> String {
        command_line(
            &self.program,
            &ssh_args(profile, dirs::home_dir().as_deref()),
        )
    }
}

#[cfg(unix)]
fn killed_by_interrupt(status: &ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;

    status.signal() == Some(SIGINT)
}

#[cfg(not(unix))]
fn killed_by_interrupt(_status: &ExitStatus) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<OsString> {
        values.iter().map(OsString::from).collect()
    }

    #[test]
    fn full_profile_builds_every_argument() {
        let profile = Profile {
            user: Some("alice".to_string()),
            port: Some(2222),
            key: Some("~/.ssh/id".to_string()),
            ..Profile::new("work", "h")
        };

        assert_eq!(
            ssh_args(&profile, Some(Path::new("/home/alice"))),
            args(&[
                "-o",
                "StrictHostKeyChecking=yes",
                "-p",
                "2222",
                "-i",
                "/home/alice/.ssh/id",
                "alice@h",
            ])
        );
    }

    #[test]
    fn host_only_profile_has_no_port_or_identity() {
        let profile = Profile::new("plain", "h");

        assert_eq!(
            ssh_args(&profile, Some(Path::new("/home/alice"))),
            args(&["-o", "StrictHostKeyChecking=yes", "h"])
        );
    }

    #[test]
    fn command_line_joins_program_and_args() {
        let profile = Profile {
            port: Some(22),
            ..Profile::new("plain", "h")
        };
        let line = command_line(OsStr::new("ssh"), &ssh_args(&profile, None));
        assert_eq!(line, "ssh -o StrictHostKeyChecking=yes -p 22 h");
    }

    #[test]
    fn missing_client_is_reported() {
        let mut launcher =
            SshLauncher::with_program("aassh-no-such-ssh-client", Interrupt::default());

        let err = launcher
            .launch(&Profile::new("plain", "h"))
            .expect_err("client does not exist");
        assert!(
            matches!(&err, LaunchError::ClientNotFound { program } if program == "aassh-no-such-ssh-client"),
            "got {err:?}"
        );
    }

    #[cfg(unix)]
    #[test]
    fn exit_status_maps_to_outcome() {
        let profile = Profile::new("plain", "h");

        let mut ok = SshLauncher::with_program("true", Interrupt::default());
        assert_eq!(
            ok.launch(&profile).expect("true runs"),
            LaunchOutcome::Completed
        );

        let mut failing = SshLauncher::with_program("false", Interrupt::default());
        assert_eq!(
            failing.launch(&profile).expect("false runs"),
            LaunchOutcome::Failed { code: Some(1) }
        );
    }

    #[cfg(unix)]
    fn script(dir: &Path, body: &str) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-ssh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("can write script");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("can mark script executable");
        path
    }

    #[cfg(unix)]
    #[test]
    fn client_killed_by_sigint_is_cancelled() {
        let temp = tempfile::tempdir().expect("can create tempdir");
        let program = script(temp.path(), "kill -INT $$");
        let mut launcher = SshLauncher::with_program(program, Interrupt::default());

        assert_eq!(
            launcher.launch(&Profile::new("plain", "h")).expect("script runs"),
            LaunchOutcome::Cancelled
        );
    }

    #[cfg(unix)]
    #[test]
    fn interrupt_during_wait_is_cancelled() {
        let temp = tempfile::tempdir().expect("can create tempdir");
        let program = script(temp.path(), "sleep 1");
        let interrupt = Interrupt::default();
        let mut launcher = SshLauncher::with_program(program, interrupt.clone());

        let trigger = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(200));
            interrupt.trigger();
        });
        let outcome = launcher.launch(&Profile::new("plain", "h")).expect("script runs");
        trigger.join().expect("trigger thread finishes");

        assert_eq!(outcome, LaunchOutcome::Cancelled);
        assert!(!launcher.interrupt.is_set(), "flag is consumed");
    }

    #[cfg(unix)]
    #[test]
    fn stale_interrupt_does_not_cancel_next_session() {
        let interrupt = Interrupt::default();
        interrupt.trigger();
        let mut launcher = SshLauncher::with_program("true", interrupt);

        assert_eq!(
            launcher.launch(&Profile::new("plain", "h")).expect("true runs"),
            LaunchOutcome::Completed
        );
    }
}
