//! `compile` command - strict validation, optional tests, then packaging.

use anyhow::{Context, Result};
use colored::Colorize;
use hivecraft::{archive, harness, validator};
use std::path::Path;

pub fn run(folder: &Path, test: bool, test_count: usize) -> Result<()> {
    println!("Compiling {}...", folder.display());
    println!();

    println!("Checking integrity...");
    validator::validate(folder, true).context("integrity check failed")?;

    if test {
        println!("Running tests...");
        harness::run_tests(folder, test_count)?;
        println!("{}", "All tests passed!".green());
    }

    println!("Packaging...");
    let archive_path = archive::build(folder)?;

    println!();
    println!("{}", "Puzzle compiled successfully!".green().bold());
    println!("Archive: {}", archive_path.display().to_string().bold());
    println!();
    println!("You can now upload the `.alghive` file to AlgoHive.");
    Ok(())
}
