use std::collections::BTreeSet;
use std::sync::Arc;

use aarambh_core::model::StudyResource;
use storage::repository::ResourceRepository;

use crate::error::ResourceServiceError;

/// Label of the subject filter that matches every resource.
pub const ALL_SUBJECTS: &str = "All";

/// Subject filter plus free-text title search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceFilter {
    subject: Option<String>,
    search: String,
}

impl ResourceFilter {
    /// `"All"` (or blank) clears the subject filter.
    #[must_use]
    pub fn new(subject: &str, search: &str) -> Self {
        let subject = subject.trim();
        Self {
            subject: (!subject.is_empty() && subject != ALL_SUBJECTS).then(|| subject.to_string()),
            search: search.trim().to_lowercase(),
        }
    }

    #[must_use]
    pub fn matches(&self, resource: &StudyResource) -> bool {
        self.subject
            .as_deref()
            .is_none_or(|s| resource.subject().eq_ignore_ascii_case(s))
            && (self.search.is_empty() || resource.title().to_lowercase().contains(&self.search))
    }
}

/// Read-only access to the approved resource library.
#[derive(Clone)]
pub struct ResourceService {
    resources: Arc<dyn ResourceRepository>,
}

impl ResourceService {
    #[must_use]
    pub fn new(resources: Arc<dyn ResourceRepository>) -> Self {
        Self { resources }
    }

    /// # Errors
    ///
    /// Returns `ResourceServiceError::Storage` on repository failures.
    pub async fn list(
        &self,
        filter: &ResourceFilter,
    ) -> Result<Vec<StudyResource>, ResourceServiceError> {
        let mut resources = self.resources.list_resources(true).await?;
        resources.retain(|r| filter.matches(r));
        Ok(resources)
    }

    /// `"All"` followed by every subject that has an approved resource.
    ///
    /// # Errors
    ///
    /// Returns `ResourceServiceError::Storage` on repository failures.
    pub async fn subject_options(&self) -> Result<Vec<String>, ResourceServiceError> {
        let subjects: BTreeSet<String> = self
            .resources
            .list_resources(true)
            .await?
            .into_iter()
            .map(|r| r.subject().to_string())
            .collect();
        Ok(std::iter::once(ALL_SUBJECTS.to_string())
            .chain(subjects)
            .collect())
    }
}
