//! Pure single-field edits over `ContentDocument`.
//!
//! # Responsibility
//! - Produce a new document with exactly one leaf replaced.
//! - Address array elements by index, matching rendering order.
//!
//! # Invariants
//! - The input document is never mutated.
//! - Every field not addressed by the path is preserved.
//! - An out-of-range index returns a copy equal to the input; arrays never grow.

use crate::model::content::ContentDocument;
use log::trace;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Email,
    Linkedin,
    Github,
    ResumeUrl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectField {
    Title,
    Url,
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificationField {
    Title,
    Issuer,
}

/// Address of one editable leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPath {
    Name,
    Tagline,
    About,
    ProfileImage,
    Contact(ContactField),
    Skill(usize),
    Project(usize, ProjectField),
    Certification(usize, CertificationField),
}

/// Returns a copy of `doc` with the leaf at `path` set to `value`.
///
/// Optional leaves (`description`, `issuer`) become `Some(value)`.
pub fn with_field(
    doc: &ContentDocument,
    path: FieldPath,
    value: impl Into<String>,
) -> ContentDocument {
    let value = value.into();
    let mut next = doc.clone();

    let applied = match path {
        FieldPath::Name => replace(&mut next.name, value),
        FieldPath::Tagline => replace(&mut next.tagline, value),
        FieldPath::About => replace(&mut next.about, value),
        FieldPath::ProfileImage => replace(&mut next.profile_image, value),
        FieldPath::Contact(field) => {
            let contact = &mut next.contact;
            let slot = match field {
                ContactField::Email => &mut contact.email,
                ContactField::Linkedin => &mut contact.linkedin,
                ContactField::Github => &mut contact.github,
                ContactField::ResumeUrl => &mut contact.resume_url,
            };
            replace(slot, value)
        }
        FieldPath::Skill(index) => next
            .skills
            .get_mut(index)
            .map(|slot| *slot = value)
            .is_some(),
        FieldPath::Project(index, field) => next
            .projects
            .get_mut(index)
            .map(|project| match field {
                ProjectField::Title => project.title = value,
                ProjectField::Url => project.url = value,
                ProjectField::Description => project.description = Some(value),
            })
            .is_some(),
        FieldPath::Certification(index, field) => next
            .certifications
            .get_mut(index)
            .map(|certification| match field {
                CertificationField::Title => certification.title = value,
                CertificationField::Issuer => certification.issuer = Some(value),
            })
            .is_some(),
    };

    if !applied {
        trace!(
            "event=field_edit module=service status=skipped reason=index_out_of_range path={path}"
        );
    }
    next
}

fn replace(slot: &mut String, value: String) -> bool {
    *slot = value;
    true
}

/// Field path parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPathError(pub String);

impl Display for FieldPathError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown field path `{}`", self.0)
    }
}

impl Error for FieldPathError {}

impl FromStr for FieldPath {
    type Err = FieldPathError;

    /// Parses dotted paths such as `name`, `contact.email`, `skills.2`,
    /// `projects.0.url` and `certifications.1.issuer`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let err = || FieldPathError(raw.to_string());
        let parts = raw.trim().split('.').collect::<Vec<_>>();
        let index = |value: &str| value.parse::<usize>().map_err(|_| err());

        let path = match parts.as_slice() {
            ["name"] => Self::Name,
            ["tagline"] => Self::Tagline,
            ["about"] => Self::About,
            ["profileImage"] => Self::ProfileImage,
            ["contact", field] => Self::Contact(match *field {
                "email" => ContactField::Email,
                "linkedin" => ContactField::Linkedin,
                "github" => ContactField::Github,
                "resumeUrl" => ContactField::ResumeUrl,
                _ => return Err(err()),
            }),
            ["skills", i] => Self::Skill(index(*i)?),
            ["projects", i, field] => Self::Project(
                index(*i)?,
                match *field {
                    "title" => ProjectField::Title,
                    "url" => ProjectField::Url,
                    "description" => ProjectField::Description,
                    _ => return Err(err()),
                },
            ),
            ["certifications", i, field] => Self::Certification(
                index(*i)?,
                match *field {
                    "title" => CertificationField::Title,
                    "issuer" => CertificationField::Issuer,
                    _ => return Err(err()),
                },
            ),
            _ => return Err(err()),
        };
        Ok(path)
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Tagline => write!(f, "tagline"),
            Self::About => write!(f, "about"),
            Self::ProfileImage => write!(f, "profileImage"),
            Self::Contact(field) => {
                let name = match field {
                    ContactField::Email => "email",
                    ContactField::Linkedin => "linkedin",
                    ContactField::Github => "github",
                    ContactField::ResumeUrl => "resumeUrl",
                };
                write!(f, "contact.{name}")
            }
            Self::Skill(index) => write!(f, "skills.{index}"),
            Self::Project(index, field) => {
                let name = match field {
                    ProjectField::Title => "title",
                    ProjectField::Url => "url",
                    ProjectField::Description => "description",
                };
                write!(f, "projects.{index}.{name}")
            }
            Self::Certification(index, field) => {
                let name = match field {
                    CertificationField::Title => "title",
                    CertificationField::Issuer => "issuer",
                };
                write!(f, "certifications.{index}.{name}")
            }
        }
    }
}
