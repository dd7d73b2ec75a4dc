use crate::types::Binary;
use semver::Version;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("invalid version {version:?}: {source}")]
    Invalid {
        version: String,
        #[source]
        source: semver::Error,
    },
}

/// Parses a semver string, tolerating a leading `v`.
pub fn parse_version(version: &str) -> Result<Version, VersionError> {
    let trimmed = version.trim();
    let cleaned = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(cleaned).map_err(|source| VersionError::Invalid {
        version: version.to_string(),
        source,
    })
}

impl Binary {
    /// Whether the declared (desired) version differs from `current` in
    /// either direction. Build metadata does not take part in precedence.
    pub fn should_replace(&self, current: &str) -> Result<bool, VersionError> {
        let desired = parse_version(&self.version)?;
        let current = parse_version(current)?;
        Ok(!same_precedence(&desired, &current))
    }
}

fn same_precedence(a: &Version, b: &Version) -> bool {
    (a.major, a.minor, a.patch, &a.pre) == (b.major, b.minor, b.patch, &b.pre)
}
