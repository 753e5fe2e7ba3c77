//! Metadata records carried under `props/`.
//!
//! The records are XML-like, namespace-qualified documents with plain text
//! fields:
//! - `meta.xml`: author, created, modified, title, id
//! - `desc.xml`: difficulty, language
//! - `core.xml`: author, created, modified, title (provenance stamp)

use crate::error::{Violation, ViolationKind};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Namespace carried by every record, kept for compatibility with the
/// historical file format.
pub const XML_NAMESPACE: &str = "http://www.w3.org/2001/WMLSchema";

static LOCALE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]{2}(-[A-Z]{2})?$").expect("locale regex"));

/// Severity tier of a puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EASY" => Ok(Self::Easy),
            "MEDIUM" => Ok(Self::Medium),
            "HARD" => Ok(Self::Hard),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Easy => "EASY",
            Self::Medium => "MEDIUM",
            Self::Hard => "HARD",
        };
        f.write_str(s)
    }
}

/// Extract the text of `<field>...</field>`, if present.
fn xml_field(content: &str, field: &str) -> Option<String> {
    let open = format!("<{field}>");
    let close = format!("</{field}>");
    let start = content.find(&open)? + open.len();
    let end = content[start..].find(&close)? + start;
    Some(content[start..end].trim().to_string())
}

fn required_field(content: &str, field: &str, violations: &mut Vec<Violation>) -> Option<String> {
    match xml_field(content, field) {
        Some(value) if !value.is_empty() => Some(value),
        Some(_) => {
            violations.push(Violation::new(field, ViolationKind::MalformedField));
            None
        }
        None => {
            violations.push(Violation::new(field, ViolationKind::MissingField));
            None
        }
    }
}

fn render_record(fields: &[(&str, String)]) -> String {
    let mut out = format!("<Properties xmlns=\"{XML_NAMESPACE}\">\n");
    for (name, value) in fields {
        out.push_str(&format!("    <{name}>{value}</{name}>\n"));
    }
    out.push_str("</Properties>\n");
    out
}

/// `props/meta.xml` - authoring metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaProps {
    pub author: String,
    pub created: String,
    pub modified: String,
    pub title: String,
    /// Numeric package identifier; keys the plugin registry.
    pub id: u32,
}

impl MetaProps {
    /// Parse a record, collecting one violation per missing or malformed
    /// required field.
    pub fn parse(content: &str) -> Result<Self, Vec<Violation>> {
        let mut violations = Vec::new();
        let author = required_field(content, "author", &mut violations);
        let created = required_field(content, "created", &mut violations);
        let modified = required_field(content, "modified", &mut violations);
        let title = required_field(content, "title", &mut violations);
        let id = match xml_field(content, "id") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(id) => Some(id),
                Err(_) => {
                    violations.push(Violation::new("id", ViolationKind::MalformedField));
                    None
                }
            },
            None => {
                violations.push(Violation::new("id", ViolationKind::MissingField));
                None
            }
        };

        match (author, created, modified, title, id) {
            (Some(author), Some(created), Some(modified), Some(title), Some(id))
                if violations.is_empty() =>
            {
                Ok(Self {
                    author,
                    created,
                    modified,
                    title,
                    id,
                })
            }
            _ => Err(violations),
        }
    }

    pub fn to_xml(&self) -> String {
        render_record(&[
            ("author", self.author.clone()),
            ("created", self.created.clone()),
            ("modified", self.modified.clone()),
            ("title", self.title.clone()),
            ("id", self.id.to_string()),
        ])
    }
}

/// `props/desc.xml` - descriptive metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescProps {
    pub difficulty: Difficulty,
    /// Short locale code, e.g. `en` or `fr-FR`.
    pub language: String,
}

impl DescProps {
    pub fn parse(content: &str) -> Result<Self, Vec<Violation>> {
        let mut violations = Vec::new();

        let difficulty = match xml_field(content, "difficulty") {
            Some(raw) => match raw.parse::<Difficulty>() {
                Ok(d) => Some(d),
                Err(()) => {
                    violations.push(Violation::new("difficulty", ViolationKind::MalformedField));
                    None
                }
            },
            None => {
                violations.push(Violation::new("difficulty", ViolationKind::MissingField));
                None
            }
        };

        let language = match xml_field(content, "language") {
            Some(raw) if LOCALE_RE.is_match(&raw) => Some(raw),
            Some(_) => {
                violations.push(Violation::new("language", ViolationKind::MalformedField));
                None
            }
            None => {
                violations.push(Violation::new("language", ViolationKind::MissingField));
                None
            }
        };

        match (difficulty, language) {
            (Some(difficulty), Some(language)) if violations.is_empty() => Ok(Self {
                difficulty,
                language,
            }),
            _ => Err(violations),
        }
    }

    pub fn to_xml(&self) -> String {
        render_record(&[
            ("difficulty", self.difficulty.to_string()),
            ("language", self.language.clone()),
        ])
    }
}

/// `props/core.xml` - provenance stamp.
///
/// Synthesized with the current user and timestamps the first time a
/// package is validated, then only ever re-checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreProps {
    pub author: String,
    pub created: String,
    pub modified: String,
    pub title: String,
}

impl CoreProps {
    /// Build a fresh provenance stamp for first-run synthesis.
    pub fn synthesize() -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            author: std::env::var("USER").unwrap_or_else(|_| "unknown".to_string()),
            created: now.clone(),
            modified: now,
            title: "Core".to_string(),
        }
    }

    pub fn parse(content: &str) -> Result<Self, Vec<Violation>> {
        let mut violations = Vec::new();
        let author = required_field(content, "author", &mut violations);
        let created = required_field(content, "created", &mut violations);
        let modified = required_field(content, "modified", &mut violations);
        let title = required_field(content, "title", &mut violations);

        match (author, created, modified, title) {
            (Some(author), Some(created), Some(modified), Some(title))
                if violations.is_empty() =>
            {
                Ok(Self {
                    author,
                    created,
                    modified,
                    title,
                })
            }
            _ => Err(violations),
        }
    }

    pub fn to_xml(&self) -> String {
        render_record(&[
            ("author", self.author.clone()),
            ("created", self.created.clone()),
            ("modified", self.modified.clone()),
            ("title", self.title.clone()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const META: &str = r#"<Properties xmlns="http://www.w3.org/2001/WMLSchema">
    <author>eric</author>
    <created>2025-03-06T22:00:00Z</created>
    <modified>2025-03-06T22:00:00Z</modified>
    <title>Fibonacci</title>
    <id>7</id>
</Properties>"#;

    #[test]
    fn test_parse_meta() {
        let meta = MetaProps::parse(META).unwrap();
        assert_eq!(meta.author, "eric");
        assert_eq!(meta.id, 7);
        assert_eq!(meta.title, "Fibonacci");
    }

    #[test]
    fn test_meta_missing_id() {
        let content = META.replace("<id>7</id>", "");
        let violations = MetaProps::parse(&content).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "id");
        assert_eq!(violations[0].kind, ViolationKind::MissingField);
    }

    #[test]
    fn test_meta_malformed_id() {
        let content = META.replace("<id>7</id>", "<id>seven</id>");
        let violations = MetaProps::parse(&content).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::MalformedField);
    }

    #[test]
    fn test_meta_roundtrip() {
        let meta = MetaProps::parse(META).unwrap();
        let rendered = meta.to_xml();
        assert_eq!(MetaProps::parse(&rendered).unwrap(), meta);
        assert!(rendered.contains(XML_NAMESPACE));
    }

    #[test]
    fn test_parse_desc() {
        let desc = DescProps::parse(
            "<Properties><difficulty>HARD</difficulty><language>fr-FR</language></Properties>",
        )
        .unwrap();
        assert_eq!(desc.difficulty, Difficulty::Hard);
        assert_eq!(desc.language, "fr-FR");
    }

    #[test]
    fn test_desc_bad_locale() {
        let violations = DescProps::parse(
            "<Properties><difficulty>EASY</difficulty><language>français</language></Properties>",
        )
        .unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "language");
    }

    #[test]
    fn test_desc_unknown_difficulty() {
        let violations = DescProps::parse(
            "<Properties><difficulty>BRUTAL</difficulty><language>en</language></Properties>",
        )
        .unwrap_err();
        assert_eq!(violations[0].field, "difficulty");
        assert_eq!(violations[0].kind, ViolationKind::MalformedField);
    }

    #[test]
    fn test_core_synthesize_roundtrip() {
        let core = CoreProps::synthesize();
        let parsed = CoreProps::parse(&core.to_xml()).unwrap();
        assert_eq!(parsed, core);
        assert_eq!(parsed.title, "Core");
    }

    #[test]
    fn test_core_missing_fields() {
        let violations = CoreProps::parse("<Properties></Properties>").unwrap_err();
        assert_eq!(violations.len(), 4);
    }

    #[test]
    fn test_difficulty_case_insensitive() {
        assert_eq!("medium".parse::<Difficulty>().unwrap(), Difficulty::Medium);
    }
}
