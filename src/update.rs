//! Version-driven update flow. Unlike `install`, this never looks at the
//! files in the bin directory: it compares the manifest against the latest
//! upstream release and rewrites the declared versions.

use crate::config::save_versions;
use crate::github::ReleaseClient;
use crate::types::*;
use anyhow::{Context, Result};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpdate {
    pub name: String,
    pub current: String,
    pub latest: String,
}

/// Looks up the latest release of every binary and returns those whose
/// declared version differs from it.
pub fn check_updates<C: ReleaseClient>(
    client: &C,
    binaries: &[Binary],
) -> Result<Vec<PendingUpdate>> {
    let mut updates = Vec::new();

    for binary in binaries {
        tracing::info!("Checking for update for {}/{}", binary.org, binary.repo);

        let release = client
            .latest_release(&binary.org, &binary.repo)
            .with_context(|| format!("Error getting latest release for {}", binary.name))?;

        for asset in &release.assets {
            tracing::trace!(
                "  {} asset {} ({})",
                release.tag_name,
                asset.name,
                asset.browser_download_url
            );
        }

        let latest = release
            .tag_name
            .strip_prefix('v')
            .unwrap_or(&release.tag_name);
        let replace = binary
            .should_replace(latest)
            .with_context(|| format!("Error comparing versions for {}", binary.name))?;

        if replace {
            updates.push(PendingUpdate {
                name: binary.name.clone(),
                current: binary.version.clone(),
                latest: latest.to_string(),
            });
        } else {
            tracing::debug!("{} is up to date at {}", binary.name, binary.version);
        }
    }

    Ok(updates)
}

/// Writes the new versions into the manifest at `path`. Returns how many
/// entries changed.
pub fn apply_updates(path: &Path, updates: &[PendingUpdate]) -> Result<usize> {
    let versions: Vec<(&str, &str)> = updates
        .iter()
        .map(|update| (update.name.as_str(), update.latest.as_str()))
        .collect();
    save_versions(path, &versions)?;
    Ok(versions.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::install::tests::FakeClient;
    use std::fs;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"
binaries:
  - name: foo
    org: acme
    repo: foo
    version: 1.2.3
    source: "https://x/foo"
  - name: bar
    org: acme
    repo: bar
    version: 2.0.0
    source: "https://x/bar" # tracks main
"#;

    fn manifest() -> Manifest {
        serde_yaml::from_str(MANIFEST).unwrap()
    }

    #[test]
    fn test_reports_only_mismatches() {
        let mut client = FakeClient::default();
        client.latest.insert("acme/foo".to_string(), "v1.3.0".to_string());
        client.latest.insert("acme/bar".to_string(), "2.0.0".to_string());

        let updates = check_updates(&client, &manifest().binaries).unwrap();
        assert_eq!(
            updates,
            vec![PendingUpdate {
                name: "foo".to_string(),
                current: "1.2.3".to_string(),
                latest: "1.3.0".to_string(),
            }]
        );
    }

    #[test]
    fn test_older_upstream_still_counts() {
        let mut client = FakeClient::default();
        client.latest.insert("acme/foo".to_string(), "v1.0.0".to_string());
        client.latest.insert("acme/bar".to_string(), "v2.0.0".to_string());

        let updates = check_updates(&client, &manifest().binaries).unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].latest, "1.0.0");
    }

    #[test]
    fn test_lookup_failure_stops_check() {
        let client = FakeClient::default();
        let err = check_updates(&client, &manifest().binaries).unwrap_err();

        assert_eq!(format!("{:#}", err), "Error getting latest release for foo: Not Found");
        assert_eq!(client.calls.borrow().len(), 1);
    }

    #[test]
    fn test_unparseable_tag_is_error() {
        let mut client = FakeClient::default();
        client.latest.insert("acme/foo".to_string(), "nightly".to_string());

        let err = check_updates(&client, &manifest().binaries).unwrap_err();
        assert!(err.to_string().contains("Error comparing versions for foo"));
    }

    #[test]
    fn test_apply_updates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, MANIFEST).unwrap();

        let changed = apply_updates(
            &path,
            &[PendingUpdate {
                name: "bar".to_string(),
                current: "2.0.0".to_string(),
                latest: "2.1.0".to_string(),
            }],
        )
        .unwrap();

        assert_eq!(changed, 1);
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("# tracks main"));
        let manifest: Manifest = serde_yaml::from_str(&content).unwrap();
        assert_eq!(manifest.binaries[0].version, "1.2.3");
        assert_eq!(manifest.binaries[1].version, "2.1.0");
    }
}
