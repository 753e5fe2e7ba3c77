//! Hivecraft - puzzle package lifecycle engine
//!
//! Distributes "puzzle packages": self-contained `.alghive` bundles
//! pairing a deterministic input generator with two independent solvers
//! and the puzzle statement text.
//!
//! ## Module Structure
//!
//! - `package/`: the on-disk package layout and `props/` metadata records
//! - `plugin`: generator/solver traits, seeded generation, the binding registry
//! - `validator`: package integrity checks before testing or packaging
//! - `harness`: deterministic test harness run before distribution
//! - `archive`: `.alghive` build and extraction
//! - `catalog`: runtime registry of themes and bound puzzles
//! - `throttle`: per-caller reload cooldown
//! - `runner`: request-time instantiation
//! - `scaffold`: template package creation for the CLI

/// `.alghive` build and extraction
pub mod archive;

/// Runtime registry of themes and bound puzzles
pub mod catalog;

/// Error taxonomy
pub mod error;

/// Deterministic test harness
pub mod harness;

/// Package layout and metadata records
pub mod package;

/// Plugin contract and binding registry
pub mod plugin;

/// Request-time instantiation
pub mod runner;

/// Template package creation
pub mod scaffold;

/// Per-caller reload cooldown
pub mod throttle;

/// Package integrity validation
pub mod validator;

#[cfg(test)]
pub(crate) mod test_util;

pub use archive::{archive_path_for, build, extract};
pub use catalog::{Catalog, LoadReport, Puzzle, SkippedPuzzle, Theme};
pub use error::{HiveError, Result, Stage, Violation, ViolationKind};
pub use harness::{run_tests, run_tests_with, HarnessConfig, TestRun, Trial};
pub use package::props::{CoreProps, DescProps, Difficulty, MetaProps};
pub use package::{PackageLayout, ARCHIVE_EXT};
pub use plugin::{Bindings, Forge, Generator, PluginRegistry, Solver};
pub use runner::{instantiate, PuzzleInstance};
pub use throttle::ReloadThrottle;
pub use validator::{validate, ValidationReport};
