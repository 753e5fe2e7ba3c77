//! Runtime catalog of themes and bound puzzles.
//!
//! Reconciles the on-disk tree (`root/<theme>/<puzzle>/` directories plus
//! sibling `<puzzle>.alghive` archives) with an in-memory registry of
//! servable puzzles. Readers always see an immutable snapshot: `load`
//! builds the next theme set off to the side and publishes it with a
//! single reference swap, so no reader ever observes a half-built
//! catalog.

use crate::archive;
use crate::error::{HiveError, Result};
use crate::package::props::{DescProps, MetaProps};
use crate::package::{is_archive, strip_archive_ext, PackageLayout, ARCHIVE_EXT};
use crate::plugin::{Bindings, PluginRegistry};
use parking_lot::RwLock;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// One bound, servable puzzle.
///
/// Owned by its theme; dropped when the theme is unloaded or the puzzle
/// deleted.
pub struct Puzzle {
    pub name: String,
    pub path: PathBuf,
    /// Statement text for the first presentation stage.
    pub cipher: String,
    /// Statement text for the second presentation stage.
    pub obscure: String,
    pub meta: MetaProps,
    pub desc: DescProps,
    pub bindings: Bindings,
}

impl Puzzle {
    /// Bind one extracted package directory into a servable puzzle.
    fn load(dir: &Path) -> Result<Self> {
        let layout = PackageLayout::new(dir);
        let meta = MetaProps::parse(&fs::read_to_string(layout.meta())?)
            .map_err(|mut v| HiveError::Integrity(v.remove(0)))?;
        let desc = DescProps::parse(&fs::read_to_string(layout.desc())?)
            .map_err(|mut v| HiveError::Integrity(v.remove(0)))?;
        let bindings = PluginRegistry::resolve(meta.id).ok_or(HiveError::MissingCapability {
            puzzle: layout.name(),
            id: meta.id,
        })?;
        Ok(Self {
            name: layout.name(),
            path: dir.to_path_buf(),
            cipher: fs::read_to_string(layout.cipher())?,
            obscure: fs::read_to_string(layout.obscure())?,
            meta,
            desc,
            bindings,
        })
    }
}

/// Named grouping of puzzles, backed by one directory under the root.
#[derive(Clone)]
pub struct Theme {
    pub name: String,
    pub path: PathBuf,
    pub puzzles: Vec<Arc<Puzzle>>,
}

impl Theme {
    pub fn puzzle(&self, name: &str) -> Option<&Arc<Puzzle>> {
        let wanted = strip_archive_ext(name);
        self.puzzles.iter().find(|p| p.name == wanted)
    }
}

/// A puzzle excluded from a load, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedPuzzle {
    pub theme: String,
    pub puzzle: String,
    pub reason: String,
}

/// Aggregated outcome of one `load`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub themes: usize,
    pub puzzles: usize,
    /// Puzzles excluded from the catalog; the rest of the tree still
    /// loads.
    pub skipped: Vec<SkippedPuzzle>,
}

/// Process-wide registry of themes.
///
/// Mutating operations require external serialization (one writer at a
/// time); readers are lock-free beyond the snapshot fetch.
pub struct Catalog {
    root: PathBuf,
    themes: RwLock<Arc<Vec<Theme>>>,
}

impl Catalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            themes: RwLock::new(Arc::new(Vec::new())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Immutable snapshot of the current theme set.
    pub fn themes(&self) -> Arc<Vec<Theme>> {
        self.themes.read().clone()
    }

    pub fn theme(&self, name: &str) -> Option<Theme> {
        self.themes().iter().find(|t| t.name == name).cloned()
    }

    pub fn theme_exists(&self, name: &str) -> bool {
        self.theme(name).is_some()
    }

    /// Archive-extension-insensitive puzzle existence check.
    pub fn puzzle_exists(&self, theme: &str, puzzle: &str) -> bool {
        self.puzzle(theme, puzzle).is_some()
    }

    pub fn puzzle(&self, theme: &str, puzzle: &str) -> Option<Arc<Puzzle>> {
        self.theme(theme).and_then(|t| t.puzzle(puzzle).cloned())
    }

    /// Decompress every archive not yet materialized as a same-named
    /// directory. Idempotent: existing directories are skipped.
    pub fn extract(&self) -> Result<()> {
        for theme_dir in self.theme_dirs()? {
            for entry in fs::read_dir(&theme_dir)? {
                let path = entry?.path();
                if !path.is_file() || !is_archive(&path) {
                    continue;
                }
                let target = path.with_extension("");
                if target.is_dir() {
                    continue;
                }
                debug!(archive = %path.display(), "extracting package");
                archive::extract(&path, &target)?;
            }
        }
        Ok(())
    }

    /// Walk exactly two directory levels (theme, then puzzle), bind each
    /// package and publish the resulting theme set as one snapshot.
    ///
    /// A puzzle that fails to bind is skipped and reported; it never
    /// aborts the rest of the load.
    pub fn load(&self) -> Result<LoadReport> {
        let mut report = LoadReport::default();
        let mut themes = Vec::new();

        for theme_dir in self.theme_dirs()? {
            let theme_name = dir_name(&theme_dir);
            let mut theme = Theme {
                name: theme_name.clone(),
                path: theme_dir.clone(),
                puzzles: Vec::new(),
            };
            for puzzle_dir in sorted_subdirs(&theme_dir)? {
                match Puzzle::load(&puzzle_dir) {
                    Ok(puzzle) => {
                        report.puzzles += 1;
                        theme.puzzles.push(Arc::new(puzzle));
                    }
                    Err(e) => {
                        warn!(theme = %theme_name, puzzle = %dir_name(&puzzle_dir), error = %e, "skipping puzzle");
                        report.skipped.push(SkippedPuzzle {
                            theme: theme_name.clone(),
                            puzzle: dir_name(&puzzle_dir),
                            reason: e.to_string(),
                        });
                    }
                }
            }
            themes.push(theme);
        }

        report.themes = themes.len();
        *self.themes.write() = Arc::new(themes);
        info!(themes = report.themes, puzzles = report.puzzles, skipped = report.skipped.len(), "catalog loaded");
        Ok(report)
    }

    /// Remove every materialized puzzle directory (archives stay, they
    /// are the source of truth) and publish an empty catalog.
    pub fn unload(&self) -> Result<()> {
        for theme_dir in self.theme_dirs()? {
            for puzzle_dir in sorted_subdirs(&theme_dir)? {
                fs::remove_dir_all(&puzzle_dir)?;
            }
        }
        *self.themes.write() = Arc::new(Vec::new());
        info!("catalog unloaded");
        Ok(())
    }

    /// `unload` then `extract` then `load`. Atomic only from the caller's
    /// perspective; concurrent mutations must be serialized externally.
    pub fn reload(&self) -> Result<LoadReport> {
        self.unload()?;
        self.extract()?;
        self.load()
    }

    /// Create a theme directory and add the empty theme to the snapshot.
    pub fn create_theme(&self, name: &str) -> Result<Theme> {
        let path = self.root.join(name);
        fs::create_dir_all(&path)?;
        let theme = Theme {
            name: name.to_string(),
            path,
            puzzles: Vec::new(),
        };
        let mut themes = self.themes();
        if !themes.iter().any(|t| t.name == name) {
            let mut next = themes.as_ref().clone();
            next.push(theme.clone());
            themes = Arc::new(next);
            *self.themes.write() = themes;
        }
        Ok(theme)
    }

    /// Remove a theme directory, its puzzle directories and archives, and
    /// drop it from the snapshot.
    pub fn delete_theme(&self, name: &str) -> Result<()> {
        let path = self.root.join(name);
        if !path.is_dir() {
            return Err(HiveError::not_found("theme", name));
        }
        fs::remove_dir_all(&path)?;
        let next: Vec<Theme> = self
            .themes()
            .iter()
            .filter(|t| t.name != name)
            .cloned()
            .collect();
        *self.themes.write() = Arc::new(next);
        info!(theme = name, "theme deleted");
        Ok(())
    }

    /// Place one uploaded archive under a theme.
    ///
    /// Does not touch the in-memory snapshot; a reload is required to
    /// surface the new puzzle.
    pub fn upload_puzzle(&self, theme: &str, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let theme_dir = self.root.join(theme);
        if !theme_dir.is_dir() {
            return Err(HiveError::not_found("theme", theme));
        }
        let file_name = if is_archive(Path::new(name)) {
            name.to_string()
        } else {
            format!("{name}.{ARCHIVE_EXT}")
        };
        let path = theme_dir.join(file_name);
        fs::write(&path, bytes)?;
        info!(theme, archive = %path.display(), "puzzle archive uploaded");
        Ok(path)
    }

    /// Remove one puzzle's archive and its extracted directory.
    ///
    /// Like `upload_puzzle`, leaves the snapshot untouched until the next
    /// reload.
    pub fn delete_puzzle(&self, theme: &str, name: &str) -> Result<()> {
        let theme_dir = self.root.join(theme);
        let base = strip_archive_ext(name);
        let dir = theme_dir.join(base);
        let archive = theme_dir.join(format!("{base}.{ARCHIVE_EXT}"));

        if !dir.exists() && !archive.exists() {
            return Err(HiveError::not_found("puzzle", name));
        }
        if dir.is_dir() {
            fs::remove_dir_all(&dir)?;
        }
        if archive.is_file() {
            fs::remove_file(&archive)?;
        }
        info!(theme, puzzle = base, "puzzle deleted");
        Ok(())
    }

    /// Compressed (archive) and uncompressed (directory) sizes of one
    /// puzzle, in bytes.
    pub fn puzzle_sizes(&self, theme: &str, name: &str) -> (u64, u64) {
        let theme_dir = self.root.join(theme);
        let base = strip_archive_ext(name);
        let compressed = fs::metadata(theme_dir.join(format!("{base}.{ARCHIVE_EXT}")))
            .map(|m| m.len())
            .unwrap_or(0);
        (compressed, dir_size(&theme_dir.join(base)))
    }

    fn theme_dirs(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(HiveError::not_found(
                "catalog root",
                self.root.display().to_string(),
            ));
        }
        sorted_subdirs(&self.root)
    }
}

fn sorted_subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Recursive sum of file sizes under a path; 0 if it does not exist.
pub fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::testing::number_bindings;
    use crate::test_util::write_package;
    use tempfile::TempDir;

    /// Root with one theme holding two compiled archives (no extracted
    /// directories) for ids `base` and `base + 1`.
    fn seed_root(ids: (u32, u32)) -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("puzzles");
        let theme = root.join("math");
        fs::create_dir_all(&theme).unwrap();

        for (name, id) in [("fibonacci", ids.0), ("primes", ids.1)] {
            let staging = tmp.path().join("staging").join(name);
            write_package(&staging, id);
            let built = archive::build(&staging).unwrap();
            fs::rename(built, theme.join(format!("{name}.alghive"))).unwrap();
        }
        fs::remove_dir_all(tmp.path().join("staging")).unwrap();
        (tmp, root)
    }

    #[test]
    fn test_extract_load_unload_cycle() {
        let (_tmp, root) = seed_root((920_001, 920_002));
        PluginRegistry::register(920_001, number_bindings());
        PluginRegistry::register(920_002, number_bindings());

        let catalog = Catalog::new(&root);
        catalog.extract().unwrap();
        assert!(root.join("math/fibonacci").is_dir());

        let report = catalog.load().unwrap();
        assert_eq!(report.themes, 1);
        assert_eq!(report.puzzles, 2);
        assert!(report.skipped.is_empty());
        assert!(catalog.puzzle_exists("math", "fibonacci"));
        assert!(catalog.puzzle_exists("math", "fibonacci.alghive"));

        catalog.unload().unwrap();
        assert!(catalog.themes().is_empty());
        assert!(!root.join("math/fibonacci").exists());
        // Archives survive unload.
        assert!(root.join("math/fibonacci.alghive").is_file());

        PluginRegistry::unregister(920_001);
        PluginRegistry::unregister(920_002);
    }

    #[test]
    fn test_reload_reproduces_name_set() {
        let (_tmp, root) = seed_root((920_003, 920_004));
        PluginRegistry::register(920_003, number_bindings());
        PluginRegistry::register(920_004, number_bindings());

        let catalog = Catalog::new(&root);
        catalog.extract().unwrap();
        catalog.load().unwrap();
        let names_before: Vec<String> = catalog.themes()[0]
            .puzzles
            .iter()
            .map(|p| p.name.clone())
            .collect();

        catalog.reload().unwrap();
        let names_after: Vec<String> = catalog.themes()[0]
            .puzzles
            .iter()
            .map(|p| p.name.clone())
            .collect();
        assert_eq!(names_before, names_after);

        PluginRegistry::unregister(920_003);
        PluginRegistry::unregister(920_004);
    }

    #[test]
    fn test_extract_is_idempotent() {
        let (_tmp, root) = seed_root((920_005, 920_006));
        let catalog = Catalog::new(&root);
        catalog.extract().unwrap();
        let marker = root.join("math/fibonacci/marker.txt");
        fs::write(&marker, "kept").unwrap();
        catalog.extract().unwrap();
        assert!(marker.is_file());
    }

    #[test]
    fn test_bad_puzzle_is_isolated() {
        let (_tmp, root) = seed_root((920_007, 920_008));
        // Only one of the two packages has registered bindings.
        PluginRegistry::register(920_007, number_bindings());

        let catalog = Catalog::new(&root);
        catalog.extract().unwrap();
        let report = catalog.load().unwrap();
        assert_eq!(report.puzzles, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].puzzle, "primes");
        assert!(catalog.puzzle_exists("math", "fibonacci"));
        assert!(!catalog.puzzle_exists("math", "primes"));

        PluginRegistry::unregister(920_007);
    }

    #[test]
    fn test_create_delete_theme() {
        let tmp = TempDir::new().unwrap();
        let catalog = Catalog::new(tmp.path());
        catalog.create_theme("strings").unwrap();
        assert!(tmp.path().join("strings").is_dir());
        assert!(catalog.theme_exists("strings"));

        catalog.delete_theme("strings").unwrap();
        assert!(!tmp.path().join("strings").exists());
        assert!(!catalog.theme_exists("strings"));

        let err = catalog.delete_theme("strings").unwrap_err();
        assert!(matches!(err, HiveError::NotFound { .. }));
    }

    #[test]
    fn test_upload_and_delete_puzzle() {
        let (_tmp, root) = seed_root((920_009, 920_010));
        let catalog = Catalog::new(&root);
        catalog.create_theme("uploads").unwrap();

        let bytes = fs::read(root.join("math/fibonacci.alghive")).unwrap();
        let path = catalog.upload_puzzle("uploads", "copy", &bytes).unwrap();
        assert!(path.ends_with("copy.alghive"));
        assert!(path.is_file());

        // Upload alone does not surface the puzzle; a reload is needed.
        assert!(!catalog.puzzle_exists("uploads", "copy"));

        catalog.delete_puzzle("uploads", "copy").unwrap();
        assert!(!path.exists());
        let err = catalog.delete_puzzle("uploads", "copy").unwrap_err();
        assert!(matches!(err, HiveError::NotFound { .. }));
    }

    #[test]
    fn test_upload_to_unknown_theme() {
        let tmp = TempDir::new().unwrap();
        let catalog = Catalog::new(tmp.path());
        let err = catalog.upload_puzzle("ghost", "p", b"zipbytes").unwrap_err();
        assert!(matches!(err, HiveError::NotFound { kind: "theme", .. }));
    }

    #[test]
    fn test_puzzle_sizes() {
        let (_tmp, root) = seed_root((920_011, 920_012));
        let catalog = Catalog::new(&root);
        catalog.extract().unwrap();
        let (compressed, uncompressed) = catalog.puzzle_sizes("math", "fibonacci");
        assert!(compressed > 0);
        assert!(uncompressed > 0);
    }

    #[test]
    fn test_dir_size_missing_path() {
        assert_eq!(dir_size(Path::new("/nonexistent/nowhere")), 0);
    }
}
