//! Archive detection and extraction for downloaded assets
//!
//! Handles tar archives (plain, gzip, xz or bzip2 compressed), zip
//! archives and single compressed files. Anything else is stored as-is.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use liblzma::read::XzDecoder;
use tempfile::NamedTempFile;

use crate::version::error::FetchError;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const XZ_MAGIC: &[u8] = &[0xfd, b'7', b'z', b'X', b'Z', 0x00];
const BZIP2_MAGIC: &[u8] = b"BZh";
/// `ustar` magic sits at this offset of the first tar header block
const TAR_MAGIC_OFFSET: usize = 257;
const TAR_HEADER_LEN: usize = 512;
/// Bytes read from the start of a download to sniff its format
pub const SNIFF_LEN: u64 = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Xz,
    Bzip2,
}

impl Compression {
    fn sniff(head: &[u8]) -> Self {
        if head.starts_with(GZIP_MAGIC) {
            Compression::Gzip
        } else if head.starts_with(XZ_MAGIC) {
            Compression::Xz
        } else if head.starts_with(BZIP2_MAGIC) {
            Compression::Bzip2
        } else {
            Compression::None
        }
    }

    fn decoder<'a, R: Read + 'a>(self, reader: R) -> Box<dyn Read + 'a> {
        match self {
            Compression::None => Box::new(reader),
            Compression::Gzip => Box::new(GzDecoder::new(reader)),
            Compression::Xz => Box::new(XzDecoder::new(reader)),
            Compression::Bzip2 => Box::new(BzDecoder::new(reader)),
        }
    }

    fn suffixes(self) -> &'static [&'static str] {
        match self {
            Compression::None => &[],
            Compression::Gzip => &[".gz"],
            Compression::Xz => &[".xz"],
            Compression::Bzip2 => &[".bz2"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Tar(Compression),
    Zip,
    /// A single compressed file
    Compressed(Compression),
    Plain,
}

/// Longer suffixes first so `.tar.gz` wins over `.gz`
const EXTENSIONS: &[(&str, ArchiveKind)] = &[
    (".tar.gz", ArchiveKind::Tar(Compression::Gzip)),
    (".tgz", ArchiveKind::Tar(Compression::Gzip)),
    (".tar.xz", ArchiveKind::Tar(Compression::Xz)),
    (".txz", ArchiveKind::Tar(Compression::Xz)),
    (".tar.bz2", ArchiveKind::Tar(Compression::Bzip2)),
    (".tbz2", ArchiveKind::Tar(Compression::Bzip2)),
    (".tbz", ArchiveKind::Tar(Compression::Bzip2)),
    (".tar", ArchiveKind::Tar(Compression::None)),
    (".zip", ArchiveKind::Zip),
    (".gz", ArchiveKind::Compressed(Compression::Gzip)),
    (".xz", ArchiveKind::Compressed(Compression::Xz)),
    (".bz2", ArchiveKind::Compressed(Compression::Bzip2)),
];

impl ArchiveKind {
    /// Detect by file extension, then by the signature at the start of `head`
    pub fn detect(file_name: &str, head: &[u8]) -> Self {
        let lower = file_name.to_ascii_lowercase();
        EXTENSIONS
            .iter()
            .find(|(suffix, _)| lower.ends_with(suffix))
            .map(|(_, kind)| *kind)
            .unwrap_or_else(|| Self::sniff(head))
    }

    fn sniff(head: &[u8]) -> Self {
        if head.starts_with(ZIP_MAGIC) {
            return ArchiveKind::Zip;
        }

        match Compression::sniff(head) {
            Compression::None if is_tar(head) => ArchiveKind::Tar(Compression::None),
            Compression::None => ArchiveKind::Plain,
            compression => {
                // a truncated head still decodes far enough to expose a tar header
                let mut decoded = Vec::with_capacity(TAR_HEADER_LEN);
                let _ = compression
                    .decoder(head)
                    .take(TAR_HEADER_LEN as u64)
                    .read_to_end(&mut decoded);
                if is_tar(&decoded) {
                    ArchiveKind::Tar(compression)
                } else {
                    ArchiveKind::Compressed(compression)
                }
            }
        }
    }
}

fn is_tar(header: &[u8]) -> bool {
    header.get(TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + 5) == Some(&b"ustar"[..])
}

/// Detect the format of a finished download and unpack it into `destination`.
pub fn extract(
    download: NamedTempFile,
    destination: &Path,
    file_name: &str,
) -> Result<ArchiveKind, FetchError> {
    let mut head = Vec::new();
    download
        .reopen()?
        .take(SNIFF_LEN)
        .read_to_end(&mut head)?;

    let kind = ArchiveKind::detect(file_name, &head);
    unpack(kind, download, destination, file_name)?;
    Ok(kind)
}

/// Unpack `download` into `destination` according to `kind`.
///
/// `Plain` downloads are moved to `destination/file_name`; single
/// compressed files are decompressed to `file_name` minus its suffix.
/// The temporary download is removed in every other case.
pub fn unpack(
    kind: ArchiveKind,
    download: NamedTempFile,
    destination: &Path,
    file_name: &str,
) -> Result<(), FetchError> {
    match kind {
        ArchiveKind::Tar(compression) => {
            tar::Archive::new(compression.decoder(download.reopen()?)).unpack(destination)?
        }
        ArchiveKind::Zip => {
            let mut archive = zip::ZipArchive::new(download.reopen()?)
                .map_err(|e| FetchError::Archive(e.to_string()))?;
            archive
                .extract(destination)
                .map_err(|e| FetchError::Archive(e.to_string()))?;
        }
        ArchiveKind::Compressed(compression) => {
            let path = destination.join(decompressed_name(file_name, compression));
            let mut file = File::create(&path)?;
            io::copy(&mut compression.decoder(download.reopen()?), &mut file)
                .map_err(|e| FetchError::Archive(format!("{file_name}: {e}")))?;
            make_executable(&path)?;
        }
        ArchiveKind::Plain => {
            let path = destination.join(file_name);
            download
                .persist(&path)
                .map_err(|e| FetchError::Io(e.error))?;
            make_executable(&path)?;
        }
    }
    Ok(())
}

fn decompressed_name(file_name: &str, compression: Compression) -> &str {
    let lower = file_name.to_ascii_lowercase();
    let stem = compression
        .suffixes()
        .iter()
        .find(|suffix| lower.ends_with(*suffix))
        .map_or(file_name, |suffix| &file_name[..file_name.len() - suffix.len()]);
    if stem.is_empty() { file_name } else { stem }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
