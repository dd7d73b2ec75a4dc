use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Per-OS, per-arch replacement for the `Platform` and `Arch` template
/// variables, e.g. `linux -> amd64 -> [linux, x86_64]`.
pub type PlatformOverrides = HashMap<String, HashMap<String, [String; 2]>>;

fn default_release_name() -> String {
    "{{ .Version }}".to_string()
}

/// One installable executable as declared in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Binary {
    pub name: String,
    pub org: String,
    pub repo: String,
    pub version: String,
    #[serde(default = "default_release_name", alias = "releaseName")]
    pub release_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
    #[serde(
        default,
        alias = "fileName",
        skip_serializing_if = "HashMap::is_empty"
    )]
    pub file_name: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub platforms: PlatformOverrides,
}

impl Binary {
    /// Name of the entry to pull out of a tarball for this host. Keys are
    /// `"platform,arch"`; both the raw host pair and the overridden pair are
    /// tried before falling back to the binary name.
    pub fn archived_name(&self, platform: &PlatformInfo) -> &str {
        let (alias_os, alias_arch) = platform.resolve(&self.platforms);
        [
            format!("{},{}", platform.os, platform.arch),
            format!("{},{}", alias_os, alias_arch),
        ]
        .iter()
        .find_map(|key| self.file_name.get(key))
        .map(String::as_str)
        .unwrap_or(self.name.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Manifest {
    #[serde(default)]
    pub binaries: Vec<Binary>,
}

/// Runtime settings taken from the environment rather than the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bin_dir: PathBuf,
    pub github_token: Option<String>,
    pub timeout_secs: u64,
    pub api_url: String,
    pub download_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlatformInfo {
    pub os: String,
    pub arch: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitHubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<GitHubAsset>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitHubAsset {
    pub name: String,
    pub browser_download_url: String,
}
