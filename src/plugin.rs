//! Plugin contract: the three capabilities every package provides.
//!
//! A package carries source for one generator (`forge`) and two
//! independently written solvers (`decrypt`, `unveil`). Binding uses a
//! process-wide registry mapping the package's numeric id to statically
//! linked implementations; the loader and the harness resolve from it.

use crate::error::{HiveError, Result, Stage};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;

/// Per-index line callback backing a package's generator.
///
/// Implementations must be pure functions of `(index, rng)`: the engine
/// guarantees `rng` is seeded solely from the instance key, so identical
/// keys replay identical streams.
pub trait Forge: Send + Sync {
    /// Produce line `index` of the challenge input, drawing from the
    /// seeded stream as needed.
    fn generate_line(&self, index: usize, rng: &mut StdRng) -> anyhow::Result<String>;
}

/// One of the two independent solvers.
///
/// No purity requirement beyond terminating and leaving `lines` intact;
/// the result type is author-defined, typically numeric or string.
pub trait Solver: Send + Sync {
    fn solve(&self, lines: &[String]) -> anyhow::Result<serde_json::Value>;
}

/// Bound capability set for one package.
#[derive(Clone)]
pub struct Bindings {
    pub forge: Arc<dyn Forge>,
    pub decrypt: Arc<dyn Solver>,
    pub unveil: Arc<dyn Solver>,
}

impl Bindings {
    pub fn new(
        forge: Arc<dyn Forge>,
        decrypt: Arc<dyn Solver>,
        unveil: Arc<dyn Solver>,
    ) -> Self {
        Self {
            forge,
            decrypt,
            unveil,
        }
    }
}

/// Derive the pseudorandom seed for an instance key.
pub fn derive_seed(instance_key: &str) -> u64 {
    let digest = Sha256::digest(instance_key.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

/// Deterministic generator driving a `Forge` implementation.
///
/// Constructed per instantiation with `(line_count, instance_key)`; two
/// generators with identical arguments against the same package yield
/// byte-identical output.
pub struct Generator {
    line_count: usize,
    instance_key: String,
    forge: Arc<dyn Forge>,
}

impl Generator {
    pub fn new(line_count: usize, instance_key: impl Into<String>, forge: Arc<dyn Forge>) -> Self {
        Self {
            line_count,
            instance_key: instance_key.into(),
            forge,
        }
    }

    /// Draw `line_count` lines from the stream seeded by the instance key.
    pub fn generate(&self) -> Result<Vec<String>> {
        if self.line_count == 0 {
            return Err(HiveError::InvalidLineCount);
        }
        let mut rng = StdRng::seed_from_u64(derive_seed(&self.instance_key));
        let mut lines = Vec::with_capacity(self.line_count);
        for index in 0..self.line_count {
            let line =
                self.forge
                    .generate_line(index, &mut rng)
                    .map_err(|source| HiveError::RuntimeFault {
                        key: self.instance_key.clone(),
                        stage: Stage::Generate,
                        source,
                    })?;
            lines.push(line);
        }
        Ok(lines)
    }
}

static REGISTRY: Lazy<RwLock<HashMap<u32, Bindings>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Process-wide map from package id to capability bindings.
pub struct PluginRegistry;

impl PluginRegistry {
    /// Register (or replace) the bindings for a package id.
    pub fn register(id: u32, bindings: Bindings) {
        REGISTRY.write().insert(id, bindings);
    }

    pub fn unregister(id: u32) {
        REGISTRY.write().remove(&id);
    }

    pub fn resolve(id: u32) -> Option<Bindings> {
        REGISTRY.read().get(&id).cloned()
    }

    pub fn is_registered(id: u32) -> bool {
        REGISTRY.read().contains_key(&id)
    }
}
