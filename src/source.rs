//! Turns a binary declaration into the location its artifact is fetched from.

use crate::template::{render, TemplateError, Variables};
use crate::types::*;

/// Where a binary's artifact lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    /// Fully rendered `source` URL.
    Url(String),
    /// Named asset attached to a GitHub release.
    ReleaseAsset { tag: String, asset: String },
}

impl Artifact {
    /// The string whose suffix decides how the payload is unpacked.
    pub fn locator(&self) -> &str {
        match self {
            Artifact::Url(url) => url,
            Artifact::ReleaseAsset { asset, .. } => asset,
        }
    }
}

fn variables<'a>(binary: &'a Binary, platform: &'a PlatformInfo) -> Variables<'a> {
    let (os, arch) = platform.resolve(&binary.platforms);
    Variables::new()
        .with("Version", &binary.version)
        .with("Platform", os)
        .with("Arch", arch)
        .with("Name", &binary.name)
        .with("Org", &binary.org)
        .with("Repo", &binary.repo)
}

/// Renders the `source` template for this host.
pub fn resolve_url(binary: &Binary, platform: &PlatformInfo) -> Result<String, TemplateError> {
    let source = binary.source.as_deref().unwrap_or_default();
    let url = render(
        &format!("source:{}", binary.name),
        source,
        &variables(binary, platform),
    )?;
    tracing::debug!("Resolved source URL for {}: {}", binary.name, url);
    Ok(url)
}

/// Renders the `release_name` template, i.e. the release tag.
pub fn release_name(binary: &Binary, platform: &PlatformInfo) -> Result<String, TemplateError> {
    render(
        &format!("release_name:{}", binary.name),
        &binary.release_name,
        &variables(binary, platform),
    )
}

/// `source` wins when present; otherwise the artifact is the rendered
/// `asset` on the rendered release tag.
pub fn resolve_artifact(
    binary: &Binary,
    platform: &PlatformInfo,
) -> Result<Artifact, TemplateError> {
    match &binary.asset {
        Some(asset) if binary.source.is_none() => {
            let tag = release_name(binary, platform)?;
            let asset = render(
                &format!("asset:{}", binary.name),
                asset,
                &variables(binary, platform),
            )?;
            tracing::debug!("Resolved release asset for {}: {} @ {}", binary.name, asset, tag);
            Ok(Artifact::ReleaseAsset { tag, asset })
        }
        _ => resolve_url(binary, platform).map(Artifact::Url),
    }
}
