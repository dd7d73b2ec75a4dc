use crate::download::{download_spinner, extract_artifact};
use crate::github::ReleaseClient;
use crate::source::{resolve_artifact, Artifact};
use crate::types::*;
use anyhow::{Context, Result};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed(PathBuf),
    AlreadyInstalled(PathBuf),
}

/// Installs declared binaries into `bin_dir`, one after another. The first
/// failure stops the run.
pub struct Installer<'a, C: ReleaseClient> {
    client: &'a C,
    platform: PlatformInfo,
    bin_dir: PathBuf,
}

impl<'a, C: ReleaseClient> Installer<'a, C> {
    pub fn new(client: &'a C, platform: PlatformInfo, bin_dir: PathBuf) -> Self {
        Self {
            client,
            platform,
            bin_dir,
        }
    }

    pub fn destination(&self, binary: &Binary) -> PathBuf {
        self.bin_dir.join(&binary.name)
    }

    pub fn install_all(&self, binaries: &[Binary]) -> Result<Vec<InstallOutcome>> {
        tracing::debug!(
            "Installing {} binaries into {} for {}/{}",
            binaries.len(),
            self.bin_dir.display(),
            self.platform.os,
            self.platform.arch
        );

        binaries.iter().map(|binary| self.install(binary)).collect()
    }

    pub fn install(&self, binary: &Binary) -> Result<InstallOutcome> {
        let dest_path = self.destination(binary);
        if dest_path.exists() {
            println!("{} already installed", binary.name);
            tracing::debug!("Skipping {}, {} exists", binary.name, dest_path.display());
            return Ok(InstallOutcome::AlreadyInstalled(dest_path));
        }

        println!("Installing {}...", binary.name);

        let artifact = resolve_artifact(binary, &self.platform)
            .with_context(|| format!("Error getting source url for {}", binary.name))?;

        let data = self
            .fetch(binary, &artifact)
            .with_context(|| format!("Error downloading binary for {}", binary.name))?;
        tracing::info!("Downloaded {} bytes for {}", data.len(), binary.name);

        let file_name = binary.archived_name(&self.platform);
        let data = extract_artifact(file_name, data, artifact.locator())
            .with_context(|| format!("Error extracting binary for {}", binary.name))?;

        write_executable(&self.bin_dir, &dest_path, data.as_slice()).with_context(|| {
            format!(
                "Error writing binary for {} to {}",
                binary.name,
                dest_path.display()
            )
        })?;

        println!("{} has been installed", binary.name);
        tracing::info!("Installed {} to {}", binary.name, dest_path.display());
        Ok(InstallOutcome::Installed(dest_path))
    }

    fn fetch(&self, binary: &Binary, artifact: &Artifact) -> Result<Vec<u8>> {
        let spinner = download_spinner(&binary.name);
        let result = match artifact {
            Artifact::Url(url) => {
                tracing::debug!("Downloading {} from {}", binary.name, url);
                self.client.download(url)
            }
            Artifact::ReleaseAsset { tag, asset } => {
                self.client
                    .download_release_asset(&binary.org, &binary.repo, tag, asset)
            }
        };
        spinner.finish_and_clear();
        Ok(result?)
    }
}

/// Stages `data` next to `dest` and renames it into place once it is complete
/// and executable, so a failed write never leaves a partial file at `dest`.
fn write_executable<R: Read>(dir: &Path, dest: &Path, mut data: R) -> io::Result<()> {
    let mut staged = NamedTempFile::new_in(dir)?;
    io::copy(&mut data, &mut staged)?;
    staged.flush()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = staged.as_file().metadata()?.permissions();
        perms.set_mode(0o755);
        staged.as_file().set_permissions(perms)?;
    }

    staged.persist(dest).map_err(|err| err.error)?;
    Ok(())
}
