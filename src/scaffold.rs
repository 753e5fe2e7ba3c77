//! Template package creation for `beeline new`.

use crate::error::{HiveError, Result};
use crate::package::props::{DescProps, Difficulty, MetaProps};
use crate::package::{
    CIPHER_FILE, DECRYPT_FILE, DESC_FILE, FORGE_FILE, META_FILE, OBSCURE_FILE, PROPS_DIR,
    UNVEIL_FILE,
};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const FORGE_TEMPLATE: &str = r#"use anyhow::Result;
use hivecraft::plugin::Forge;
use rand::rngs::StdRng;
use rand::Rng;

pub struct PuzzleForge;

impl Forge for PuzzleForge {
    fn generate_line(&self, _index: usize, rng: &mut StdRng) -> Result<String> {
        // Build one input line here. Draw randomness only from `rng` so
        // identical instance keys replay identical input.
        Ok(rng.gen_range(1..=100).to_string())
    }
}
"#;

const DECRYPT_TEMPLATE: &str = r#"use anyhow::Result;
use hivecraft::plugin::Solver;
use serde_json::{json, Value};

pub struct PuzzleDecrypt;

impl Solver for PuzzleDecrypt {
    fn solve(&self, lines: &[String]) -> Result<Value> {
        // Solve part one of the puzzle from the generated input.
        Ok(json!(lines.len()))
    }
}
"#;

const UNVEIL_TEMPLATE: &str = r#"use anyhow::Result;
use hivecraft::plugin::Solver;
use serde_json::{json, Value};

pub struct PuzzleUnveil;

impl Solver for PuzzleUnveil {
    fn solve(&self, lines: &[String]) -> Result<Value> {
        // Solve part two of the puzzle, independently of decrypt.
        let total: u64 = lines.iter().filter_map(|l| l.parse::<u64>().ok()).sum();
        Ok(json!(total))
    }
}
"#;

const CIPHER_TEMPLATE: &str = "<article>\n  <h2>Part One</h2>\n  <p>Write the puzzle statement here.</p>\n</article>\n";
const OBSCURE_TEMPLATE: &str = "<article>\n  <h2>Part Two</h2>\n  <p>Write the second-stage statement here.</p>\n</article>\n";

/// Materialize a fresh template package at `parent/name`.
///
/// Fails if the target directory already exists.
pub fn create_project(name: &str, parent: &Path) -> Result<PathBuf> {
    let dir = parent.join(name);
    if dir.exists() {
        return Err(HiveError::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("{} already exists", dir.display()),
        )));
    }
    fs::create_dir_all(dir.join(PROPS_DIR))?;

    fs::write(dir.join(FORGE_FILE), FORGE_TEMPLATE)?;
    fs::write(dir.join(DECRYPT_FILE), DECRYPT_TEMPLATE)?;
    fs::write(dir.join(UNVEIL_FILE), UNVEIL_TEMPLATE)?;
    fs::write(dir.join(CIPHER_FILE), CIPHER_TEMPLATE)?;
    fs::write(dir.join(OBSCURE_FILE), OBSCURE_TEMPLATE)?;

    let now = Utc::now().to_rfc3339();
    let meta = MetaProps {
        author: std::env::var("USER").unwrap_or_else(|_| "unknown".to_string()),
        created: now.clone(),
        modified: now,
        title: name.to_string(),
        id: 0,
    };
    fs::write(dir.join(META_FILE), meta.to_xml())?;

    let desc = DescProps {
        difficulty: Difficulty::Medium,
        language: "en".to_string(),
    };
    fs::write(dir.join(DESC_FILE), desc.to_xml())?;

    info!(project = %dir.display(), "scaffolded template package");
    Ok(dir)
}
