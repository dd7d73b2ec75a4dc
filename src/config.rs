use crate::github::{GITHUB_API_URL, GITHUB_DOWNLOAD_URL};
use crate::types::*;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const APP_NAME: &str = "grab";
pub const CONFIG_FILE_NAME: &str = "config.yaml";
pub const LOCAL_BIN_PATH: &str = ".local/bin";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("binary #{index} has an empty name")]
    EmptyName { index: usize },
    #[error("binary {name:?} is declared more than once")]
    DuplicateName { name: String },
    #[error("binary {name:?} has an empty version")]
    EmptyVersion { name: String },
    #[error("binary {name:?} needs either a source or an asset")]
    MissingSource { name: String },
}

pub fn default_manifest_path() -> Result<PathBuf> {
    let path = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join(APP_NAME)
        .join(CONFIG_FILE_NAME);
    Ok(path)
}

/// `--config` / `GRAB_CONFIG` if given, otherwise the per-user default.
pub fn manifest_path(explicit: Option<&Path>) -> Result<PathBuf> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => default_manifest_path()?,
    };
    tracing::debug!("Manifest path: {}", path.display());
    Ok(path)
}

pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Could not read config file at {}", path.display()))?;

    let manifest = parse_manifest(&content)
        .with_context(|| format!("Could not load config file at {}", path.display()))?;

    tracing::debug!("Loaded {} binaries from manifest", manifest.binaries.len());
    Ok(manifest)
}

pub fn parse_manifest(content: &str) -> Result<Manifest> {
    let manifest: Manifest =
        serde_yaml::from_str(content).with_context(|| "Could not parse config file as YAML")?;
    validate_manifest(&manifest)?;
    Ok(manifest)
}

pub fn validate_manifest(manifest: &Manifest) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for (index, binary) in manifest.binaries.iter().enumerate() {
        if binary.name.trim().is_empty() {
            return Err(ConfigError::EmptyName { index });
        }
        if !seen.insert(binary.name.as_str()) {
            return Err(ConfigError::DuplicateName {
                name: binary.name.clone(),
            });
        }
        if binary.version.trim().is_empty() {
            return Err(ConfigError::EmptyVersion {
                name: binary.name.clone(),
            });
        }
        if binary.source.is_none() && binary.asset.is_none() {
            return Err(ConfigError::MissingSource {
                name: binary.name.clone(),
            });
        }
    }

    Ok(())
}

/// Rewrites the manifest at `path` with new `version:` values, leaving the rest
/// of the file as the user wrote it.
pub fn save_versions(path: &Path, versions: &[(&str, &str)]) -> Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Could not read config file at {}", path.display()))?;

    let updated = set_versions(&content, versions)
        .with_context(|| format!("Could not update config file at {}", path.display()))?;

    fs::write(path, updated)
        .with_context(|| format!("Could not write config file at {}", path.display()))?;
    Ok(())
}

#[derive(Debug, Default)]
struct Entry {
    name: Option<String>,
    version_line: Option<usize>,
}

/// Replaces the `version:` scalar of each named binary in the manifest text.
/// Comments, key spelling and layout are kept. Only block-style entries under
/// `binaries:` can be edited; anything else is an error rather than a rewrite.
pub fn set_versions(content: &str, versions: &[(&str, &str)]) -> Result<String> {
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
    let entries = manifest_entries(&lines);

    for (name, version) in versions {
        let line = entries
            .iter()
            .find(|entry| entry.name.as_deref() == Some(*name))
            .and_then(|entry| entry.version_line)
            .ok_or_else(|| anyhow::anyhow!("Could not find the version of {} to update", name))?;

        lines[line] = replace_scalar(&lines[line], version)
            .ok_or_else(|| anyhow::anyhow!("Could not update the version of {}", name))?;
    }

    let mut updated = lines.join("\n");
    if content.ends_with('\n') {
        updated.push('\n');
    }

    let manifest = parse_manifest(&updated)?;
    for (name, version) in versions {
        let written = manifest.binaries.iter().find(|b| b.name == *name);
        if written.map(|b| b.version.as_str()) != Some(*version) {
            anyhow::bail!("Version of {} did not survive the rewrite", name);
        }
    }

    Ok(updated)
}

fn manifest_entries(lines: &[String]) -> Vec<Entry> {
    let mut entries: Vec<Entry> = Vec::new();
    let mut in_binaries = false;
    let mut dash_indent = None;
    let mut key_indent = usize::MAX;

    for (index, line) in lines.iter().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let indent = line.len() - trimmed.len();

        if !in_binaries {
            in_binaries = indent == 0 && trimmed.starts_with("binaries:");
            continue;
        }

        let key = if trimmed.starts_with("- ") && dash_indent.map_or(true, |d| d == indent) {
            let after = trimmed[1..].trim_start();
            dash_indent = Some(indent);
            key_indent = indent + trimmed.len() - after.len();
            entries.push(Entry::default());
            after
        } else if indent < key_indent {
            break;
        } else if indent == key_indent {
            trimmed
        } else {
            continue;
        };

        let Some(entry) = entries.last_mut() else {
            continue;
        };
        match key.split_once(':') {
            Some(("name", value)) => entry.name = Some(unquote(value).to_string()),
            Some(("version", _)) => entry.version_line = Some(index),
            _ => {}
        }
    }

    entries
}

/// Byte range of the scalar after the first `:` in `line`, quotes included.
fn scalar_span(line: &str) -> Option<(usize, usize)> {
    let colon = line.find(':')?;
    let after = &line[colon + 1..];
    let start = colon + 1 + after.len() - after.trim_start().len();
    let rest = &line[start..];

    let len = match rest.chars().next() {
        Some(quote @ ('"' | '\'')) => rest[1..].find(quote)? + 2,
        _ => {
            let end = rest.find(" #").unwrap_or(rest.len());
            rest[..end].trim_end().len()
        }
    };
    Some((start, start + len))
}

fn replace_scalar(line: &str, value: &str) -> Option<String> {
    let (start, end) = scalar_span(line)?;
    let quote = match line[start..end].chars().next() {
        Some(quote @ ('"' | '\'')) => quote.to_string(),
        _ => String::new(),
    };
    Some(format!("{}{}{}{}{}", &line[..start], quote, value, quote, &line[end..]))
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    let value = value.split(" #").next().unwrap_or(value).trim_end();
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value)
}

/// Builds [`Settings`] from the process environment.
pub fn load_settings() -> Result<Settings> {
    settings_from(|key| std::env::var(key).ok(), dirs::home_dir())
}

pub fn settings_from<F>(env: F, home: Option<PathBuf>) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    let bin_dir = match non_empty("GRAB_BIN_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => home
            .ok_or_else(|| anyhow::anyhow!("Error determining home directory"))?
            .join(LOCAL_BIN_PATH),
    };

    let timeout_secs = match non_empty("GRAB_HTTP_TIMEOUT") {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .with_context(|| format!("Invalid GRAB_HTTP_TIMEOUT {:?}", value))?,
        None => DEFAULT_TIMEOUT_SECS,
    };

    Ok(Settings {
        bin_dir,
        github_token: non_empty("GH_TOKEN").or_else(|| non_empty("GITHUB_TOKEN")),
        timeout_secs,
        api_url: non_empty("GRAB_GITHUB_API_URL").unwrap_or_else(|| GITHUB_API_URL.to_string()),
        download_url: non_empty("GRAB_GITHUB_URL")
            .unwrap_or_else(|| GITHUB_DOWNLOAD_URL.to_string()),
    })
}
