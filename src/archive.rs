//! Build and extract `.alghive` archives.
//!
//! An archive is a zip container whose entries are the package files with
//! paths relative to the package root. Building performs no validation of
//! its own; callers run the strict validator first.

use crate::error::Result;
use crate::package::ARCHIVE_EXT;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Archive path for a package directory: `<dir>.alghive` as a sibling.
pub fn archive_path_for(dir: &Path) -> PathBuf {
    let mut os = dir.as_os_str().to_os_string();
    os.push(format!(".{ARCHIVE_EXT}"));
    PathBuf::from(os)
}

/// Package a validated directory into its distributable archive.
///
/// Entries are written in sorted order so rebuilding an unchanged package
/// produces an identical entry layout. Overwrites any prior archive.
pub fn build(dir: &Path) -> Result<PathBuf> {
    let out = archive_path_for(dir);
    let file = File::create(&out)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        zip.start_file(rel.to_string_lossy().into_owned(), options)?;
        io::copy(&mut File::open(entry.path())?, &mut zip)?;
    }
    zip.finish()?;
    info!(archive = %out.display(), "built package archive");
    Ok(out)
}

/// Decompress an archive into `target`, recreating the package layout.
pub fn extract(archive: &Path, target: &Path) -> Result<()> {
    let mut zip = ZipArchive::new(File::open(archive)?)?;
    zip.extract(target)?;
    Ok(())
}
