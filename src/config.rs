//! Locating, reading and validating the profile document.
use std::{
    collections::BTreeMap,
    env, fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::debug;

use crate::{
    error::{AppError, ProfileError},
    profile::{Profile, ProfileEntry, ProfileSet},
};

pub const CONFIG_DIR_NAME: &str = ".aassh";
pub const CONFIG_FILE_NAME: &str = "config.yml";
pub const CONFIG_ENV: &str = "AASSH_CONFIG";

pub const SAMPLE_CONFIG: &str = "# AASSH Configuration
# Format:
# profiles:
#   profile_name:
#     host: server.example.com  # Required
#     user: username            # Optional
#     port: 22                  # Optional
#     key: ~/.ssh/id_rsa        # Optional
#     description: Production server
#     tags: [prod, web]
";

#[derive(Debug, Default, Deserialize)]
struct RawDocument {
    #[serde(default)]
    profiles: Option<BTreeMap<String, serde_yml::Value>>,
}

#[derive(Debug)]
pub struct Diagnostic {
    pub profile: String,
    pub error: ProfileError,
}

/// Result of loading the config: the usable profiles plus one diagnostic per
/// rejected entry.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub profiles: ProfileSet,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn default_config_path() -> Result<PathBuf, AppError> {
    let home = dirs::home_dir().ok_or(AppError::HomeNotFound)?;
    Ok(home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Resolve the config path in the order: CLI override, `AASSH_CONFIG`, default.
pub fn resolve_config_path(override_path: Option<PathBuf>) -> Result<PathBuf, AppError> {
    let path = override_path.or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));
    match path {
        Some(path) => Ok(expand_tilde_with(path, dirs::home_dir().as_deref())),
        None => default_config_path(),
    }
}

/// Expand a leading `~` against `home`. Paths without `~`, or with no home
/// available, are returned unchanged.
pub fn expand_tilde_with(path: impl AsRef<Path>, home: Option<&Path>) -> PathBuf {
    let path = path.as_ref();
    match (home, path.strip_prefix("~")) {
        (Some(home), Ok(rest)) if rest.as_os_str().is_empty() => home.to_path_buf(),
        (Some(home), Ok(rest)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Read and validate the document at `path`.
pub fn load(path: &Path) -> Result<LoadReport, AppError> {
    load_with_home(path, dirs::home_dir().as_deref())
}

pub fn load_with_home(path: &Path, home: Option<&Path>) -> Result<LoadReport, AppError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(AppError::ConfigNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(AppError::ConfigRead {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    debug!(path = %path.display(), bytes = text.len(), "read config file");

    let report = parse_document(&text, home).map_err(|source| AppError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })?;

    if report.profiles.is_empty() {
        debug!(path = %path.display(), "config contains no usable profiles");
    }

    Ok(report)
}

/// Turn document text into profiles. Only a malformed document is an error;
/// bad individual entries become diagnostics.
pub fn parse_document(text: &str, home: Option<&Path>) -> Result<LoadReport, serde_yml::Error> {
    if is_blank_document(text) {
        return Ok(LoadReport::default());
    }

    let document: RawDocument = serde_yml::from_str(text)?;
    let mut report = LoadReport::default();

    for (name, value) in document.profiles.unwrap_or_default() {
        let result = serde_yml::from_value::<ProfileEntry>(value)
            .map_err(|err| ProfileError::Malformed(err.to_string()))
            .and_then(|entry| Profile::from_entry(&name, entry, home));

        match result {
            Ok(profile) => {
                report.profiles.insert(profile);
            }
            Err(error) => {
                debug!(profile = %name, reason = %error, "skipping invalid profile");
                report.diagnostics.push(Diagnostic {
                    profile: name,
                    error,
                });
            }
        }
    }

    Ok(report)
}

// Comment-only or empty files carry no YAML document at all.
fn is_blank_document(text: &str) -> bool {
    text.lines().map(str::trim).all(|line| {
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

pub fn write_sample_config(path: &Path, force: bool) -> Result<(), AppError> {
    if path.exists() && !force {
        return Err(AppError::SampleConfigExists {
            path: path.to_path_buf(),
        });
    }

    let write = || -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, SAMPLE_CONFIG)
    };

    write().map_err(|source| AppError::SampleConfigWrite {
        path: path.to_path_buf(),
        source,
    })
}
