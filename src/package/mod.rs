//! On-disk shape of one puzzle package.
//!
//! A package is a directory (or a `.alghive` archive of that directory)
//! holding exactly eight artifacts: the three capability sources, three
//! metadata records under `props/`, and the two statement blobs.

pub mod props;

use std::path::{Path, PathBuf};

/// Generator capability source.
pub const FORGE_FILE: &str = "forge.rs";
/// First solver capability source.
pub const DECRYPT_FILE: &str = "decrypt.rs";
/// Second solver capability source.
pub const UNVEIL_FILE: &str = "unveil.rs";
/// Statement text for the first presentation stage.
pub const CIPHER_FILE: &str = "cipher.html";
/// Statement text for the second presentation stage.
pub const OBSCURE_FILE: &str = "obscure.html";

pub const PROPS_DIR: &str = "props";
pub const META_FILE: &str = "props/meta.xml";
pub const DESC_FILE: &str = "props/desc.xml";
pub const CORE_FILE: &str = "props/core.xml";

/// Extension of the distributable archive form.
pub const ARCHIVE_EXT: &str = "alghive";

/// Artifacts that must be authored by hand. `props/core.xml` is not
/// listed: the validator synthesizes it on first run.
pub const AUTHORED_FILES: &[&str] = &[
    FORGE_FILE,
    DECRYPT_FILE,
    UNVEIL_FILE,
    META_FILE,
    DESC_FILE,
    CIPHER_FILE,
    OBSCURE_FILE,
];

/// Path helper over one package directory.
#[derive(Debug, Clone)]
pub struct PackageLayout {
    root: PathBuf,
}

impl PackageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory name of the package, used as the puzzle name.
    pub fn name(&self) -> String {
        self.root
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn path(&self, artifact: &str) -> PathBuf {
        self.root.join(artifact)
    }

    pub fn forge(&self) -> PathBuf {
        self.path(FORGE_FILE)
    }

    pub fn decrypt(&self) -> PathBuf {
        self.path(DECRYPT_FILE)
    }

    pub fn unveil(&self) -> PathBuf {
        self.path(UNVEIL_FILE)
    }

    pub fn cipher(&self) -> PathBuf {
        self.path(CIPHER_FILE)
    }

    pub fn obscure(&self) -> PathBuf {
        self.path(OBSCURE_FILE)
    }

    pub fn meta(&self) -> PathBuf {
        self.path(META_FILE)
    }

    pub fn desc(&self) -> PathBuf {
        self.path(DESC_FILE)
    }

    pub fn core(&self) -> PathBuf {
        self.path(CORE_FILE)
    }
}

/// True if `path` looks like a package archive (`*.alghive`).
pub fn is_archive(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case(ARCHIVE_EXT))
        .unwrap_or(false)
}

/// Strip a trailing `.alghive` from a puzzle name, if present.
pub fn strip_archive_ext(name: &str) -> &str {
    name.strip_suffix(&format!(".{ARCHIVE_EXT}"))
        .unwrap_or(name)
}
