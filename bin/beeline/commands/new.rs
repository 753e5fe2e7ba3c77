//! `new` command - scaffold a template puzzle package.

use anyhow::Result;
use colored::Colorize;
use hivecraft::scaffold;

pub fn run(name: &str) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let dir = scaffold::create_project(name, &cwd)?;

    println!("Project {} created in {}", name.bold(), dir.display());
    println!();
    println!("Implement the three capabilities:");
    println!("  - {} in forge.rs", "Forge::generate_line()".cyan());
    println!("  - {} in decrypt.rs", "Solver::solve()".cyan());
    println!("  - {} in unveil.rs", "Solver::solve()".cyan());
    println!();
    println!("Write the puzzle statements:");
    println!("  - cipher.html for Part One");
    println!("  - obscure.html for Part Two");
    println!();
    println!(
        "> To test your puzzle, run {}",
        format!("beeline test {name}").green()
    );
    println!(
        "> To compile your puzzle, run {}",
        format!("beeline compile {name}").green()
    );
    Ok(())
}
