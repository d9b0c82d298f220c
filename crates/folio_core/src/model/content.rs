//! Content document schema and seed value.
//!
//! # Responsibility
//! - Define the canonical portfolio document and its nested records.
//! - Keep the wire shape (camelCase JSON) stable across both backends.
//!
//! # Invariants
//! - Decoding never yields a partially populated document: any missing
//!   top-level field is filled from `ContentDocument::seed()`.
//! - `skills`, `projects` and `certifications` keep insertion order.

use serde::{Deserialize, Serialize};

/// One portfolio project entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Project {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// One certification entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

impl Certification {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            issuer: None,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }
}

/// Contact links. Every value is a URI string (`mailto:`, `https:` ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub email: String,
    pub linkedin: String,
    pub github: String,
    pub resume_url: String,
}

/// The single editable portfolio aggregate.
///
/// Serialized as camelCase JSON; the same shape is written to the remote
/// path and to the local fallback key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentDocument {
    /// Display name.
    pub name: String,
    /// One-line tagline under the name.
    pub tagline: String,
    /// Free-text biography.
    pub about: String,
    pub skills: Vec<String>,
    pub projects: Vec<Project>,
    pub certifications: Vec<Certification>,
    pub contact: Contact,
    /// External reference or embedded `data:` URI.
    pub profile_image: String,
}

impl ContentDocument {
    /// Returns the fixed seed document used when no persisted value exists.
    pub fn seed() -> Self {
        Self {
            name: "Your Name".to_string(),
            tagline: "Software Engineer".to_string(),
            about: "Write a short introduction about yourself, what you build and what you care about."
                .to_string(),
            skills: vec![
                "Rust".to_string(),
                "TypeScript".to_string(),
                "SQL".to_string(),
                "Distributed Systems".to_string(),
            ],
            projects: vec![
                Project::new("Project One", "https://github.com/your-handle/project-one")
                    .with_description("A short description of the first project."),
                Project::new("Project Two", "https://github.com/your-handle/project-two")
                    .with_description("A short description of the second project."),
            ],
            certifications: vec![
                Certification::new("Certification One").with_issuer("Issuing Body"),
                Certification::new("Certification Two"),
            ],
            contact: Contact {
                email: "mailto:you@example.com".to_string(),
                linkedin: "https://www.linkedin.com/in/your-handle".to_string(),
                github: "https://github.com/your-handle".to_string(),
                resume_url: "https://example.com/resume.pdf".to_string(),
            },
            profile_image: "https://example.com/profile.jpg".to_string(),
        }
    }
}

impl Default for ContentDocument {
    fn default() -> Self {
        Self::seed()
    }
}
