//! Config files and credential resolution.
//!
//! Any long command-line option may be set in a config file. Files are merged
//! in increasing priority:
//! 1. `*.conf` files under `/etc/sputils.d/`
//! 2. `*.conf` files under the user config directory (`~/.config/sputils/` on Linux)
//! 3. An explicit `--config` file
//!
//! Flags given on the command line win over every file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::clients::errors::{Error, Result};

const SYSTEM_CONFIG_DIR: &str = "/etc/sputils.d";

/// Option values read from config files, keyed by long option name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileOptions {
    values: BTreeMap<String, String>,
}

impl FileOptions {
    /// Parse a config file body.
    ///
    /// TOML is tried first. Anything else is read line by line as
    /// `key = value`, `key: value` or `key value`, with `#`/`;` comments,
    /// `[section]` headers ignored and surrounding quotes stripped.
    pub fn parse(content: &str) -> Result<Self> {
        parse_options(content).map_err(Error::ConfigurationError)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigurationError(format!("Unable to read {}: {e}", path.display()))
        })?;
        let options = parse_options(&content)
            .map_err(|e| Error::ConfigurationError(format!("{}: {e}", path.display())))?;
        debug!("Loaded config file {}", path.display());
        Ok(options)
    }

    /// Values set in `other` win over values set in `self`.
    #[must_use]
    pub fn merge(mut self, other: FileOptions) -> FileOptions {
        self.values.extend(other.values);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().trim_start_matches("--").replace('-', "_")
}

fn parse_options(content: &str) -> std::result::Result<FileOptions, String> {
    let values = match toml::from_str::<toml::Table>(content) {
        Ok(table) => from_table(table)?,
        Err(_) => from_lines(content)?,
    };
    Ok(FileOptions { values })
}

fn from_table(table: toml::Table) -> std::result::Result<BTreeMap<String, String>, String> {
    let mut values = BTreeMap::new();
    for (key, value) in table {
        let text = match value {
            toml::Value::String(s) => s,
            toml::Value::Integer(i) => i.to_string(),
            toml::Value::Float(f) => f.to_string(),
            toml::Value::Boolean(b) => b.to_string(),
            other => return Err(format!("unsupported value for {key}: {other}")),
        };
        values.insert(normalize_key(&key), text);
    }
    Ok(values)
}

fn from_lines(content: &str) -> std::result::Result<BTreeMap<String, String>, String> {
    let mut values = BTreeMap::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(['#', ';']) {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            continue;
        }
        let split = line
            .find(['=', ':'])
            .or_else(|| line.find(char::is_whitespace));
        let Some(at) = split else {
            return Err(format!("line {}: expected `key = value`, got {line:?}", number + 1));
        };
        let key = normalize_key(&line[..at]);
        if key.is_empty() {
            return Err(format!("line {}: missing key", number + 1));
        }
        values.insert(key, unquote(line[at + 1..].trim()).to_string());
    }
    Ok(values)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Optional credential values, as given by flags and config files.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PartialSettings {
    pub user: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl PartialSettings {
    pub fn resolve(self) -> Result<Settings> {
        let missing = |name: &str| {
            Error::ConfigurationError(format!(
                "Missing {name}. Pass it as a flag or set it in a config file."
            ))
        };
        Ok(Settings {
            user: self.user.ok_or_else(|| missing("user"))?,
            client_id: self.client_id.ok_or_else(|| missing("client_id"))?,
            client_secret: self.client_secret.ok_or_else(|| missing("client_secret"))?,
        })
    }
}

/// Fully resolved credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub user: String,
    pub client_id: String,
    pub client_secret: String,
}

/// Directories scanned for `*.conf` files, lowest priority first.
fn default_config_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from(SYSTEM_CONFIG_DIR)];
    if let Some(user_dir) = dirs::config_dir() {
        dirs.push(user_dir.join("sputils"));
    }
    dirs
}

/// `*.conf` files directly inside `dir`, sorted by name. A missing directory
/// yields nothing.
fn conf_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "conf") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Default files that fail to load are skipped with a warning. The explicit
/// file must load.
fn load_from_dirs(dirs: &[PathBuf], explicit: Option<&Path>) -> Result<FileOptions> {
    let mut options = FileOptions::default();
    for dir in dirs {
        let files = conf_files(dir).unwrap_or_else(|e| {
            warn!("Skipping config directory {}: {e}", dir.display());
            Vec::new()
        });
        for file in files {
            match FileOptions::from_file(&file) {
                Ok(loaded) => options = options.merge(loaded),
                Err(e) => warn!("Skipping config file: {e}"),
            }
        }
    }
    if let Some(path) = explicit {
        options = options.merge(FileOptions::from_file(path)?);
    }
    Ok(options)
}

/// Merge the default config files and the explicit one.
pub fn load_options(explicit: Option<&Path>) -> Result<FileOptions> {
    load_from_dirs(&default_config_dirs(), explicit)
}
