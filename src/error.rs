use std::{io, path::PathBuf};

use thiserror::Error;

use crate::launcher::LaunchError;

/// Why a single profile entry was left out of the loaded set.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile name is empty")]
    EmptyName,
    #[error("host is missing or empty")]
    MissingHost,
    #[error("port {0} is outside the range 1-65535")]
    PortOutOfRange(i64),
    #[error("key file {} does not exist", .0.display())]
    KeyNotFound(PathBuf),
    #[error("invalid profile definition: {0}")]
    Malformed(String),
}

/// Conditions that end the process with a non-zero status.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("could not determine the home directory")]
    HomeNotFound,
    #[error("config file not found: {}", .path.display())]
    ConfigNotFound { path: PathBuf },
    #[error("failed to read config file {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },
    #[error("no profiles found in {}", .path.display())]
    NoProfiles { path: PathBuf },
    #[error("profile '{name}' not found")]
    ProfileNotFound {
        name: String,
        available: Vec<String>,
    },
    #[error("invalid selection: '{input}'")]
    InvalidSelection { input: String },
    #[error("config file already exists: {}", .path.display())]
    SampleConfigExists { path: PathBuf },
    #[error("failed to write sample config {}: {source}", .path.display())]
    SampleConfigWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error("terminal prompt failed: {0:#}")]
    Prompt(anyhow::Error),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl AppError {
    /// Remediation shown under the error message.
    pub fn hint(&self) -> Option<String> {
        match self {
            AppError::HomeNotFound => Some("Set HOME or pass --config <PATH>.".to_string()),
            AppError::ConfigNotFound { path } => Some(format!(
                "Create one with `aassh --create-sample-config`, then add your profiles to {}.",
                path.display()
            )),
            AppError::ConfigParse { path, .. } => {
                Some(format!("Fix the YAML syntax in {}.", path.display()))
            }
            AppError::NoProfiles { path } => Some(format!(
                "Add at least one entry under `profiles:` in {}.",
                path.display()
            )),
            AppError::ProfileNotFound { available, .. } if available.is_empty() => {
                Some("No profiles are configured.".to_string())
            }
            AppError::ProfileNotFound { available, .. } => {
                Some(format!("Available profiles: {}", available.join(", ")))
            }
            AppError::InvalidSelection { .. } => {
                Some("Enter a profile name or its number from the list.".to_string())
            }
            AppError::SampleConfigExists { .. } => {
                Some("Pass --force to overwrite it.".to_string())
            }
            AppError::Launch(LaunchError::ClientNotFound { .. }) => {
                Some("Please ensure OpenSSH is installed and in your PATH.".to_string())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_hint_points_at_sample_command() {
        let err = AppError::ConfigNotFound {
            path: PathBuf::from("/home/alice/.aassh/config.yml"),
        };
        let hint = err.hint().expect("missing config has a hint");
        assert!(hint.contains("--create-sample-config"), "hint: {hint}");
    }

    #[test]
    fn profile_not_found_lists_available_names() {
        let err = AppError::ProfileNotFound {
            name: "db".to_string(),
            available: vec!["api".to_string(), "web".to_string()],
        };
        assert_eq!(err.to_string(), "profile 'db' not found");
        assert_eq!(err.hint().as_deref(), Some("Available profiles: api, web"));
    }

    #[test]
    fn client_not_found_suggests_installing_openssh() {
        let err = AppError::from(LaunchError::ClientNotFound {
            program: "ssh".to_string(),
        });
        assert!(err.hint().is_some_and(|hint| hint.contains("OpenSSH")));
    }
}
