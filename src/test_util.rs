//! Shared fixtures for the crate's unit tests.

use crate::package::props::{DescProps, Difficulty, MetaProps};
use std::fs;
use std::path::Path;

/// Write a complete, well-formed package (minus `props/core.xml`, which
/// the validator synthesizes) under `dir`.
pub fn write_package(dir: &Path, id: u32) {
    fs::create_dir_all(dir.join("props")).unwrap();
    fs::write(dir.join("forge.rs"), "// forge impl").unwrap();
    fs::write(dir.join("decrypt.rs"), "// decrypt impl").unwrap();
    fs::write(dir.join("unveil.rs"), "// unveil impl").unwrap();
    fs::write(dir.join("cipher.html"), "<p>Part one</p>").unwrap();
    fs::write(dir.join("obscure.html"), "<p>Part two</p>").unwrap();

    let meta = MetaProps {
        author: "tester".to_string(),
        created: "2025-03-06T22:00:00Z".to_string(),
        modified: "2025-03-06T22:00:00Z".to_string(),
        title: "Test Puzzle".to_string(),
        id,
    };
    fs::write(dir.join("props/meta.xml"), meta.to_xml()).unwrap();

    let desc = DescProps {
        difficulty: Difficulty::Easy,
        language: "en".to_string(),
    };
    fs::write(dir.join("props/desc.xml"), desc.to_xml()).unwrap();
}
