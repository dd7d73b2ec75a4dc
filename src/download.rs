use flate2::read::GzDecoder;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read};
use std::time::Duration;
use tar::{Archive, EntryType};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("error decompressing gzipped data: {0}")]
    Gzip(#[source] io::Error),
    #[error("error extracting from tar: {0}")]
    Tar(#[source] io::Error),
    #[error("no file named {name:?} found in archive")]
    NotFound { name: String },
}

/// How a downloaded payload is unpacked, decided by the URL suffix only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    TarGz,
    Gzip,
    Raw,
}

impl PayloadKind {
    pub fn from_url(url: &str) -> Self {
        if url.ends_with(".tar.gz") || url.ends_with(".tgz") {
            PayloadKind::TarGz
        } else if url.ends_with(".gz") {
            PayloadKind::Gzip
        } else {
            PayloadKind::Raw
        }
    }
}

/// Returns the executable bytes contained in `data`, which was fetched from
/// `source_url`. For tarballs the first regular file named `file_name` wins.
pub fn extract_artifact(
    file_name: &str,
    data: Vec<u8>,
    source_url: &str,
) -> Result<Vec<u8>, ArchiveError> {
    let kind = PayloadKind::from_url(source_url);
    tracing::debug!("Treating {} as {:?}", source_url, kind);

    match kind {
        PayloadKind::TarGz => extract_tar_gz(file_name, &data),
        PayloadKind::Gzip => gunzip(&data),
        PayloadKind::Raw => Ok(data),
    }
}

fn gunzip(data: &[u8]) -> Result<Vec<u8>, ArchiveError> {
    let mut out = Vec::new();
    GzDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(ArchiveError::Gzip)?;
    Ok(out)
}

fn extract_tar_gz(file_name: &str, data: &[u8]) -> Result<Vec<u8>, ArchiveError> {
    // Decompress up front so gzip faults are reported apart from tar faults.
    let tarball = gunzip(data)?;
    let mut archive = Archive::new(tarball.as_slice());

    for entry in archive.entries().map_err(ArchiveError::Tar)? {
        let mut entry = entry.map_err(ArchiveError::Tar)?;

        if entry.header().entry_type() != EntryType::Regular {
            continue;
        }

        let path = entry.path().map_err(ArchiveError::Tar)?.to_path_buf();
        let archived_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string());
        if archived_name.as_deref() != Some(file_name) {
            continue;
        }

        tracing::debug!("Found {} in archive at {}", file_name, path.display());
        let mut out = Vec::new();
        entry.read_to_end(&mut out).map_err(ArchiveError::Tar)?;
        return Ok(out);
    }

    Err(ArchiveError::NotFound {
        name: file_name.to_string(),
    })
}

/// Spinner shown while a download blocks. Hidden when stderr is not a
/// terminal.
pub fn download_spinner(name: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Downloading {}", name));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
