//! Deterministic test harness.
//!
//! Exercises a package's plugin contract across many instance keys to
//! catch non-determinism and runtime failures before distribution. The
//! harness has no ground truth for solver answers; what it verifies is
//! structural health: no failure in any stage, reproducible generation
//! for one designated key, and distinct output across distinct keys.

use crate::error::{HiveError, Result, Stage};
use crate::package::props::MetaProps;
use crate::package::PackageLayout;
use crate::plugin::{Bindings, Generator, PluginRegistry};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Harness tuning knobs.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Fixed line count used for every trial.
    pub line_count: usize,
    /// Instance key used for the explicit determinism check.
    pub designated_key: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            line_count: 50,
            designated_key: "determinism-probe".to_string(),
        }
    }
}

/// One harness iteration under one instance key.
#[derive(Debug, Clone, Serialize)]
pub struct Trial {
    pub instance_key: String,
    pub elapsed_ms: u64,
}

/// Outcome of a full harness run; constructed only when every trial passed.
#[derive(Debug, Clone, Serialize)]
pub struct TestRun {
    pub trials: Vec<Trial>,
    pub line_count: usize,
}

/// Run `trial_count` trials against the package in `dir`.
///
/// Fails fast: the first failing trial aborts the run with the offending
/// key, the failing stage and the underlying fault.
pub fn run_tests(dir: &Path, trial_count: usize) -> Result<TestRun> {
    run_tests_with(dir, trial_count, &HarnessConfig::default())
}

pub fn run_tests_with(dir: &Path, trial_count: usize, config: &HarnessConfig) -> Result<TestRun> {
    let bindings = resolve_bindings(dir)?;

    check_determinism(&bindings, config)?;

    let mut trials = Vec::with_capacity(trial_count);
    // Output fingerprint -> key of the trial that produced it. Duplicate
    // fingerprints under distinct keys mean the forge ignores its key.
    let mut seen: HashMap<[u8; 32], String> = HashMap::new();
    let tag = hex::encode(rand::random::<[u8; 4]>());

    for i in 0..trial_count {
        let instance_key = format!("trial-{i}-{tag}");
        let started = Instant::now();

        let generator = Generator::new(config.line_count, &instance_key, bindings.forge.clone());
        let lines = generator.generate()?;

        bindings
            .decrypt
            .solve(&lines)
            .map_err(|source| HiveError::RuntimeFault {
                key: instance_key.clone(),
                stage: Stage::SolveDecrypt,
                source,
            })?;
        bindings
            .unveil
            .solve(&lines)
            .map_err(|source| HiveError::RuntimeFault {
                key: instance_key.clone(),
                stage: Stage::SolveUnveil,
                source,
            })?;

        if seen.insert(fingerprint(&lines), instance_key.clone()).is_some() {
            return Err(HiveError::KeyCollision { key: instance_key });
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        debug!(trial = i, key = %instance_key, elapsed_ms, "trial passed");
        trials.push(Trial {
            instance_key,
            elapsed_ms,
        });
    }

    info!(package = %dir.display(), trials = trial_count, "all trials passed");
    Ok(TestRun {
        trials,
        line_count: config.line_count,
    })
}

/// Read the package's meta record and resolve its registry bindings.
fn resolve_bindings(dir: &Path) -> Result<Bindings> {
    let layout = PackageLayout::new(dir);
    let content = fs::read_to_string(layout.meta())?;
    let meta = MetaProps::parse(&content)
        .map_err(|mut violations| HiveError::Integrity(violations.remove(0)))?;
    PluginRegistry::resolve(meta.id).ok_or(HiveError::MissingCapability {
        puzzle: layout.name(),
        id: meta.id,
    })
}

/// Invoke the generator twice with the designated key and require
/// byte-for-byte identical output.
fn check_determinism(bindings: &Bindings, config: &HarnessConfig) -> Result<()> {
    let first = Generator::new(
        config.line_count,
        &config.designated_key,
        bindings.forge.clone(),
    )
    .generate()?;
    let second = Generator::new(
        config.line_count,
        &config.designated_key,
        bindings.forge.clone(),
    )
    .generate()?;
    if first != second {
        return Err(HiveError::NonDeterminism {
            key: config.designated_key.clone(),
        });
    }
    Ok(())
}

fn fingerprint(lines: &[String]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for line in lines {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    hasher.finalize().into()
}
