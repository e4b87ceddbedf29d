//! Per-platform values and their resolution for the running operating system
//!
//! Any task or settings field may be written either as a plain value or as a
//! bundle of a `default` plus optional `windows`, `mac` and `linux` overrides.
//! [`resolve`] turns either form into the value that applies to a [`Platform`].

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Operating system class used to pick overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Mac,
    Linux,
    /// Any other OS; only `default` entries apply
    Other,
}

impl Platform {
    /// The class of the operating system this binary was built for.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::Mac
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Windows => "windows",
            Self::Mac => "mac",
            Self::Linux => "linux",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// Whether a configured value counts as set.
///
/// Empty strings and empty lists are treated as "not configured", so they never
/// replace a default.
pub trait Setting {
    fn is_set(&self) -> bool;
}

impl Setting for String {
    fn is_set(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Setting for Vec<T> {
    fn is_set(&self) -> bool {
        !self.is_empty()
    }
}

/// A `default` value with optional per-OS overrides
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlatformBundle<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub windows: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linux: Option<T>,
}

impl<T> Default for PlatformBundle<T> {
    fn default() -> Self {
        Self {
            default: None,
            windows: None,
            mac: None,
            linux: None,
        }
    }
}

impl<T> PlatformBundle<T> {
    /// The override entry for `platform`, regardless of whether it is set.
    #[must_use]
    pub fn for_platform(&self, platform: Platform) -> Option<&T> {
        match platform {
            Platform::Windows => self.windows.as_ref(),
            Platform::Mac => self.mac.as_ref(),
            Platform::Linux => self.linux.as_ref(),
            Platform::Other => None,
        }
    }
}

/// Either a plain value or a per-platform bundle of values
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PlatformValue<T> {
    Value(T),
    Bundle(PlatformBundle<T>),
}

impl<T> From<T> for PlatformValue<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl<T: Setting + Clone> PlatformValue<T> {
    /// Shorthand for [`resolve`].
    #[must_use]
    pub fn resolve(&self, platform: Platform) -> Option<T> {
        resolve(self, platform)
    }
}

/// Resolve a value for `platform`.
///
/// A plain value is returned unchanged. A bundle yields its `default`, replaced by
/// the entry for `platform` when that entry is present and set. `None` means
/// nothing applies and the caller has to fall back on its own.
#[must_use]
pub fn resolve<T: Setting + Clone>(value: &PlatformValue<T>, platform: Platform) -> Option<T> {
    match value {
        PlatformValue::Value(value) => Some(value.clone()),
        PlatformValue::Bundle(bundle) => resolve_bundle(bundle, platform),
    }
}

/// [`resolve`] for a bare bundle, as used by settings.
#[must_use]
pub fn resolve_bundle<T: Setting + Clone>(
    bundle: &PlatformBundle<T>,
    platform: Platform,
) -> Option<T> {
    bundle
        .for_platform(platform)
        .filter(|value| value.is_set())
        .or(bundle.default.as_ref())
        .cloned()
}
