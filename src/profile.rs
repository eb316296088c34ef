//! Profile records and the rules a profile must satisfy to be usable.
use std::{
    collections::{btree_map, BTreeMap},
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{config::expand_tilde_with, error::ProfileError};

/// One entry under `profiles:` exactly as written in the config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileEntry {
    pub host: Option<String>,
    pub user: Option<String>,
    pub port: Option<i64>,
    pub key: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub host: String,
    pub user: Option<String>,
    pub port: Option<u16>,
    /// Key path as written, `~` not yet expanded.
    pub key: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

impl Profile {
    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            user: None,
            port: None,
            key: None,
            description: None,
            tags: Vec::new(),
        }
    }

    /// Build and validate a profile from its raw entry.
    ///
    /// `home` is used to expand a leading `~` in `key` before checking that
    /// the key file exists.
    pub fn from_entry(
        name: &str,
        entry: ProfileEntry,
        home: Option<&Path>,
    ) -> Result<Self, ProfileError> {
        if name.trim().is_empty() {
            return Err(ProfileError::EmptyName);
        }

        let port = match entry.port {
            Some(port) => Some(check_port(port)?),
            None => None,
        };

        let profile = Self {
            name: name.to_string(),
            host: entry.host.unwrap_or_default(),
            user: entry.user,
            port,
            key: entry.key,
            description: entry.description,
            tags: entry.tags.unwrap_or_default(),
        };
        profile.validate(home)?;

        Ok(profile)
    }

    /// Check the invariants every usable profile holds.
    pub fn validate(&self, home: Option<&Path>) -> Result<(), ProfileError> {
        if self.host.trim().is_empty() {
            return Err(ProfileError::MissingHost);
        }
        if self.port == Some(0) {
            return Err(ProfileError::PortOutOfRange(0));
        }
        if let Some(path) = self.key_path(home) {
            if !path.is_file() {
                return Err(ProfileError::KeyNotFound(path));
            }
        }
        Ok(())
    }

    pub fn destination(&self) -> String {
        match &self.user {
            Some(user) => format!("{user}@{}", self.host),
            None => self.host.clone(),
        }
    }

    pub fn connection(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{port}", self.destination()),
            None => self.destination(),
        }
    }

    pub fn key_path(&self, home: Option<&Path>) -> Option<PathBuf> {
        self.key.as_deref().map(|key| expand_tilde_with(key, home))
    }
}

fn check_port(port: i64) -> Result<u16, ProfileError> {
    u16::try_from(port)
        .ok()
        .filter(|port| *port != 0)
        .ok_or(ProfileError::PortOutOfRange(port))
}

/// Loaded profiles keyed by name; iteration is alphabetical.
#[derive(Debug, Clone, Default)]
pub struct ProfileSet {
    profiles: BTreeMap<String, Profile>,
}

impl ProfileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, profile: Profile) -> Option<Profile> {
        self.profiles.insert(profile.name.clone(), profile)
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    /// Profile at a 1-based position in display order.
    pub fn position(&self, position: usize) -> Option<&Profile> {
        position
            .checked_sub(1)
            .and_then(|index| self.profiles.values().nth(index))
    }

    pub fn names(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    pub fn iter(&self) -> btree_map::Values<'_, String, Profile> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl FromIterator<Profile> for ProfileSet {
    fn from_iter<I: IntoIterator<Item = Profile>>(iter: I) -> Self {
        let mut set = ProfileSet::new();
        for profile in iter {
            set.insert(profile);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ProfileSet {
    type Item = &'a Profile;
    type IntoIter = btree_map::Values<'a, String, Profile>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
