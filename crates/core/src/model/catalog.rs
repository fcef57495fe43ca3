//! Subjects and study resources: the reference catalog admins curate.

use chrono::{DateTime, Utc};
use thiserror::Error;
use url::Url;

use crate::model::ids::{ResourceId, SubjectId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("{field} must not be empty")]
    MissingField { field: &'static str },

    #[error("invalid resource url: {0}")]
    InvalidUrl(String),

    #[error("unknown resource type: {0}")]
    UnknownResourceType(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    id: SubjectId,
    name: String,
    description: Option<String>,
}

impl Subject {
    /// # Errors
    ///
    /// Returns `CatalogError::MissingField` when the name is blank.
    pub fn new(
        id: SubjectId,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Result<Self, CatalogError> {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogError::MissingField { field: "name" });
        }
        Ok(Self {
            id,
            name: name.to_string(),
            description: description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        })
    }

    #[must_use]
    pub fn id(&self) -> SubjectId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Video,
    Article,
    Document,
    Link,
}

impl ResourceKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Article => "article",
            Self::Document => "document",
            Self::Link => "link",
        }
    }

    /// # Errors
    ///
    /// Returns `CatalogError::UnknownResourceType` for unrecognised values.
    pub fn parse(value: &str) -> Result<Self, CatalogError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "video" => Ok(Self::Video),
            "article" => Ok(Self::Article),
            "document" | "pdf" => Ok(Self::Document),
            "link" => Ok(Self::Link),
            other => Err(CatalogError::UnknownResourceType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyResource {
    id: ResourceId,
    title: String,
    subject: String,
    kind: ResourceKind,
    url: Url,
    uploaded_at: DateTime<Utc>,
    pub approved: bool,
}

impl StudyResource {
    /// # Errors
    ///
    /// Returns `CatalogError::MissingField` for a blank title or subject and
    /// `CatalogError::InvalidUrl` when the link does not parse.
    pub fn new(
        id: ResourceId,
        title: impl Into<String>,
        subject: impl Into<String>,
        kind: ResourceKind,
        url: &str,
        approved: bool,
        uploaded_at: DateTime<Utc>,
    ) -> Result<Self, CatalogError> {
        let title = title.into();
        let subject = subject.into();
        if title.trim().is_empty() {
            return Err(CatalogError::MissingField { field: "title" });
        }
        if subject.trim().is_empty() {
            return Err(CatalogError::MissingField { field: "subject" });
        }
        let url = Url::parse(url.trim()).map_err(|_| CatalogError::InvalidUrl(url.to_string()))?;
        Ok(Self {
            id,
            title: title.trim().to_string(),
            subject: subject.trim().to_string(),
            kind,
            url,
            uploaded_at,
            approved,
        })
    }

    #[must_use]
    pub fn id(&self) -> ResourceId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_name_is_required() {
        assert_eq!(
            Subject::new(SubjectId::random(), "  ", None).unwrap_err(),
            CatalogError::MissingField { field: "name" }
        );
        let subject = Subject::new(SubjectId::random(), "Cybersecurity", Some(String::new())).unwrap();
        assert_eq!(subject.description(), None);
    }

    #[test]
    fn resource_validates_url_and_kind() {
        assert_eq!(ResourceKind::parse("PDF").unwrap(), ResourceKind::Document);
        assert!(ResourceKind::parse("podcast").is_err());

        let err = StudyResource::new(
            ResourceId::random(),
            "Rust book",
            "Programming",
            ResourceKind::Link,
            "doc.rust-lang.org/book",
            true,
            crate::time::fixed_now(),
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidUrl(_)));
    }
}
