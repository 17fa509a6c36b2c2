//! Project records and input validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::{DomainError, DomainResult, ProjectId, UserId};

/// Persisted project entry. Ownership-scoped to `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub tech_stack: Vec<String>,
    pub project_link: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated creation input.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub project_link: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl NewProject {
    pub fn validate(&self) -> DomainResult<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("title is required"));
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::validation("description is required"));
        }
        if self.tech_stack.is_empty() {
            return Err(DomainError::validation("tech_stack must be a non-empty list"));
        }
        if let Some(link) = &self.project_link {
            validate_link(link)?;
        }
        Ok(())
    }

    pub fn into_project(self, user_id: UserId, now: DateTime<Utc>) -> Project {
        Project {
            id: ProjectId::new(),
            user_id,
            title: self.title.trim().to_string(),
            description: self.description,
            tech_stack: self.tech_stack,
            project_link: self.project_link,
            image: self.image,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub project_link: Option<String>,
    pub image: Option<String>,
}

impl ProjectPatch {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(DomainError::validation("title cannot be empty"));
            }
        }
        if let Some(description) = &self.description {
            if description.trim().is_empty() {
                return Err(DomainError::validation("description cannot be empty"));
            }
        }
        if let Some(link) = &self.project_link {
            validate_link(link)?;
        }
        Ok(())
    }

    pub fn apply(self, mut project: Project, now: DateTime<Utc>) -> Project {
        if let Some(title) = self.title {
            project.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            project.description = description;
        }
        if let Some(tech_stack) = self.tech_stack {
            project.tech_stack = tech_stack;
        }
        if let Some(project_link) = self.project_link {
            project.project_link = Some(project_link);
        }
        if let Some(image) = self.image {
            project.image = Some(image);
        }
        project.updated_at = now;
        project
    }
}

// Scheme check only; full URL parsing is not worth a dependency here.
fn validate_link(link: &str) -> DomainResult<()> {
    if !(link.starts_with("http://") || link.starts_with("https://")) {
        return Err(DomainError::validation("project_link must be an http(s) URL"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_project() -> NewProject {
        NewProject {
            title: "Folio".to_string(),
            description: "A portfolio app".to_string(),
            tech_stack: vec!["rust".to_string()],
            project_link: Some("https://example.com/folio".to_string()),
            image: None,
        }
    }

    #[test]
    fn valid_project_passes() {
        assert!(new_project().validate().is_ok());
    }

    #[test]
    fn empty_tech_stack_is_rejected() {
        let mut p = new_project();
        p.tech_stack.clear();
        assert!(p.validate().is_err());
    }

    #[test]
    fn non_http_link_is_rejected() {
        let mut p = new_project();
        p.project_link = Some("ftp://example.com".to_string());
        assert!(p.validate().is_err());
    }

    #[test]
    fn patch_preserves_absent_fields() {
        let now = Utc::now();
        let project = new_project().into_project(UserId::new(), now);

        let patch = ProjectPatch {
            title: Some("Folio 2".to_string()),
            ..Default::default()
        };
        let updated = patch.apply(project.clone(), now);

        assert_eq!(updated.title, "Folio 2");
        assert_eq!(updated.description, project.description);
        assert_eq!(updated.project_link, project.project_link);
    }
}
