//! Integrity validator for package directories.
//!
//! Checks the eight-artifact layout and both metadata records before a
//! package may be tested, built or served. The only side effect is the
//! one-time synthesis of `props/core.xml` on first validation.

use crate::error::{HiveError, Result, Violation, ViolationKind};
use crate::package::props::{CoreProps, DescProps, MetaProps};
use crate::package::{PackageLayout, CIPHER_FILE, DESC_FILE, META_FILE, OBSCURE_FILE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Aggregated outcome of a non-strict validation; empty means valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    fn push(&mut self, field: impl Into<String>, kind: ViolationKind) {
        self.violations.push(Violation::new(field, kind));
    }

    fn extend(&mut self, violations: Vec<Violation>) {
        self.violations.extend(violations);
    }
}

/// Validate a package directory.
///
/// `strict=true` (used before packaging) turns the first violation into an
/// error; `strict=false` (used before testing) returns the full report so
/// an author can fix several problems at once.
pub fn validate(dir: &Path, strict: bool) -> Result<ValidationReport> {
    if !dir.is_dir() {
        return Err(HiveError::not_found("package", dir.display().to_string()));
    }
    let layout = PackageLayout::new(dir);
    let mut report = ValidationReport::default();

    for artifact in [
        crate::package::FORGE_FILE,
        crate::package::DECRYPT_FILE,
        crate::package::UNVEIL_FILE,
    ] {
        if !layout.path(artifact).is_file() {
            report.push(artifact, ViolationKind::MissingArtifact);
        }
    }

    for blob in [CIPHER_FILE, OBSCURE_FILE] {
        let path = layout.path(blob);
        if !path.is_file() {
            report.push(blob, ViolationKind::MissingArtifact);
        } else if fs::read_to_string(&path)?.trim().is_empty() {
            report.push(blob, ViolationKind::EmptyArtifact);
        }
    }

    check_record(&layout.meta(), META_FILE, &mut report, |content| {
        MetaProps::parse(content).map(|_| ())
    })?;
    check_record(&layout.desc(), DESC_FILE, &mut report, |content| {
        DescProps::parse(content).map(|_| ())
    })?;
    check_core(&layout, &mut report)?;

    if strict {
        if let Some(first) = report.violations.first() {
            return Err(HiveError::Integrity(first.clone()));
        }
    }
    debug!(package = %dir.display(), violations = report.violations.len(), "validated package");
    Ok(report)
}

fn check_record(
    path: &Path,
    artifact: &str,
    report: &mut ValidationReport,
    parse: impl Fn(&str) -> std::result::Result<(), Vec<Violation>>,
) -> Result<()> {
    if !path.is_file() {
        report.push(artifact, ViolationKind::MissingArtifact);
        return Ok(());
    }
    if let Err(violations) = parse(&fs::read_to_string(path)?) {
        report.extend(violations);
    }
    Ok(())
}

/// `props/core.xml` is special: absent means first validation, so a fresh
/// provenance stamp is written; present means validate only, never mutate.
fn check_core(layout: &PackageLayout, report: &mut ValidationReport) -> Result<()> {
    let path = layout.core();
    if path.is_file() {
        if let Err(violations) = CoreProps::parse(&fs::read_to_string(&path)?) {
            report.extend(violations);
        }
        return Ok(());
    }
    fs::create_dir_all(layout.path(crate::package::PROPS_DIR))?;
    let core = CoreProps::synthesize();
    fs::write(&path, core.to_xml())?;
    info!(path = %path.display(), author = %core.author, "stamped package provenance");
    Ok(())
}
