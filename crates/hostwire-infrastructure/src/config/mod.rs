//! Configuration tree
//!
//! A thin layer over [`Figment`] that addresses values by `:`-separated
//! section paths (`"Aspire:MySql:orders"`) and matches keys without regard
//! to case, so `ConnectionString` in a file and
//! `HOSTWIRE__ASPIRE__MYSQL__CONNECTIONSTRING` land on the same field.
//! Underscores and dashes are significant: `order_db` and `orderdb` are
//! different keys.
//!
//! Keys are lowercased before providers are merged, otherwise figment would
//! keep `HealthChecks` from a file and `healthchecks` from the environment
//! side by side instead of letting the later one win. Types bound from a
//! section name their fields in lowercase, typically via
//! `#[serde(rename = "...")]`, with an `alias` for the snake_case spelling.

pub mod loader;
pub mod logging;

pub use loader::ConfigLoader;
pub use logging::LoggingConfig;

use crate::constants::{CONFIG_SECTION_SEPARATOR, CONNECTION_STRINGS_SECTION};
use crate::error_ext::ErrorContext;
use figment::providers::{Format, Toml};
use figment::value::{Dict, Map, Value};
use figment::{Figment, Metadata, Profile, Provider};
use hostwire_domain::error::Result;
use serde::de::DeserializeOwned;

/// Hierarchical host configuration
#[derive(Debug, Clone)]
pub struct Configuration {
    figment: Figment,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new(Figment::new())
    }
}

impl Configuration {
    /// Wrap an already-assembled figment
    ///
    /// Wrap its providers in [`NormalizedKeys`] when they may spell keys differently.
    pub fn new(figment: Figment) -> Self {
        Self { figment }
    }

    /// Build a configuration from an inline TOML document
    pub fn from_toml_str(toml: &str) -> Self {
        Self::new(Figment::from(NormalizedKeys(Toml::string(toml))))
    }

    /// The underlying figment
    pub fn figment(&self) -> &Figment {
        &self.figment
    }

    /// Merge another provider on top of this configuration
    pub fn merge<P: Provider>(self, provider: P) -> Self {
        Self::new(self.figment.merge(NormalizedKeys(provider)))
    }

    /// Look up the value at `path`, or `None` if any segment is missing
    pub fn section(&self, path: &str) -> Result<Option<Value>> {
        let root: Value = self
            .figment
            .extract()
            .config_context("Failed to read configuration")?;

        let mut current = root;
        for segment in path
            .split(CONFIG_SECTION_SEPARATOR)
            .filter(|s| !s.is_empty())
        {
            let Value::Dict(_, mut dict) = current else {
                return Ok(None);
            };
            let wanted = normalize_key(segment);
            let Some(found) = dict
                .keys()
                .find(|k| normalize_key(k) == wanted)
                .cloned()
            else {
                return Ok(None);
            };
            current = match dict.remove(&found) {
                Some(value) => value,
                None => return Ok(None),
            };
        }

        Ok(Some(current))
    }

    /// Whether a section exists at `path`
    pub fn contains(&self, path: &str) -> Result<bool> {
        Ok(self.section(path)?.is_some())
    }

    /// Deserialize the section at `path` into a fresh `T`
    ///
    /// Returns `T::default()` when the section is absent. Fields missing from
    /// the section keep their defaults as long as `T` is `#[serde(default)]`.
    pub fn bind<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let Some(section) = self.section(path)? else {
            return Ok(T::default());
        };

        normalize_value(section)
            .deserialize::<T>()
            .config_context(format!("Failed to bind configuration section '{path}'"))
    }

    /// Named connection string from the `ConnectionStrings` section
    ///
    /// Only string values count; an empty string is still returned so that
    /// callers can tell "set to empty" apart from "not set".
    pub fn connection_string(&self, name: &str) -> Result<Option<String>> {
        let path = format!("{CONNECTION_STRINGS_SECTION}{CONFIG_SECTION_SEPARATOR}{name}");
        Ok(match self.section(&path)? {
            Some(Value::String(_, value)) => Some(value),
            _ => None,
        })
    }
}

/// Canonical form of a configuration key: lowercase
pub fn normalize_key(key: &str) -> String {
    key.to_lowercase()
}

fn normalize_dict(dict: Dict) -> Dict {
    dict.into_iter()
        .map(|(key, value)| (normalize_key(&key), normalize_value(value)))
        .collect()
}

fn normalize_value(value: Value) -> Value {
    match value {
        Value::Dict(tag, dict) => Value::Dict(tag, normalize_dict(dict)),
        other => other,
    }
}

/// Provider adapter that rewrites every key to its [`normalize_key`] form
#[derive(Debug, Clone)]
pub struct NormalizedKeys<P>(pub P);

impl<P: Provider> Provider for NormalizedKeys<P> {
    fn metadata(&self) -> Metadata {
        self.0.metadata()
    }

    fn data(&self) -> std::result::Result<Map<Profile, Dict>, figment::Error> {
        Ok(self
            .0
            .data()?
            .into_iter()
            .map(|(profile, dict)| (profile, normalize_dict(dict)))
            .collect())
    }

    fn profile(&self) -> Option<Profile> {
        self.0.profile()
    }
}
