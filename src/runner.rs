//! Request-time instantiation.
//!
//! Pure orchestration over a bound puzzle: generate the challenge input
//! for the caller's instance key and compute both reference solutions.
//! No caching; the key is caller-supplied and varies per session.

use crate::catalog::Puzzle;
use crate::error::{HiveError, Result, Stage};
use crate::plugin::Generator;
use serde::Serialize;

/// One generated challenge with its two reference solutions.
#[derive(Debug, Clone, Serialize)]
pub struct PuzzleInstance {
    pub lines: Vec<String>,
    pub decrypt_solution: serde_json::Value,
    pub unveil_solution: serde_json::Value,
}

pub fn instantiate(puzzle: &Puzzle, line_count: usize, instance_key: &str) -> Result<PuzzleInstance> {
    let generator = Generator::new(line_count, instance_key, puzzle.bindings.forge.clone());
    let lines = generator.generate()?;

    let decrypt_solution =
        puzzle
            .bindings
            .decrypt
            .solve(&lines)
            .map_err(|source| HiveError::RuntimeFault {
                key: instance_key.to_string(),
                stage: Stage::SolveDecrypt,
                source,
            })?;
    let unveil_solution =
        puzzle
            .bindings
            .unveil
            .solve(&lines)
            .map_err(|source| HiveError::RuntimeFault {
                key: instance_key.to_string(),
                stage: Stage::SolveUnveil,
                source,
            })?;

    Ok(PuzzleInstance {
        lines,
        decrypt_solution,
        unveil_solution,
    })
}
