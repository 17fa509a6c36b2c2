//! Portfolio records and input validation.
//!
//! A portfolio is the single public-facing document a user curates: who they
//! are, what they do, and how to reach them. One per user, enforced by query
//! pattern (lookup-by-owner before insert) rather than a store constraint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::{DomainError, DomainResult, PortfolioId, UserId};

/// Persisted portfolio document. Ownership-scoped: every mutation is filtered
/// to `user_id = caller`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: PortfolioId,
    pub user_id: UserId,
    pub name: String,
    pub profession: String,
    pub bio: String,
    pub profile_image: String,
    pub contact_info: String,
    pub skills: Vec<String>,
    pub social_links: Vec<String>,
    pub template_style: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated creation input.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPortfolio {
    pub name: String,
    pub profession: String,
    pub bio: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    pub contact_info: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub social_links: Vec<String>,
    #[serde(default)]
    pub template_style: Option<String>,
}

impl NewPortfolio {
    pub fn validate(&self) -> DomainResult<()> {
        require_nonempty("name", &self.name)?;
        require_nonempty("profession", &self.profession)?;
        require_nonempty("bio", &self.bio)?;
        require_nonempty("contact_info", &self.contact_info)?;
        Ok(())
    }

    pub fn into_portfolio(self, user_id: UserId, now: DateTime<Utc>) -> Portfolio {
        Portfolio {
            id: PortfolioId::new(),
            user_id,
            name: self.name.trim().to_string(),
            profession: self.profession.trim().to_string(),
            bio: self.bio,
            profile_image: self.profile_image.unwrap_or_default(),
            contact_info: self.contact_info,
            skills: self.skills,
            social_links: self.social_links,
            template_style: self
                .template_style
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "default".to_string()),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortfolioPatch {
    pub name: Option<String>,
    pub profession: Option<String>,
    pub bio: Option<String>,
    pub profile_image: Option<String>,
    pub contact_info: Option<String>,
    pub skills: Option<Vec<String>>,
    pub social_links: Option<Vec<String>>,
    pub template_style: Option<String>,
}

impl PortfolioPatch {
    pub fn validate(&self) -> DomainResult<()> {
        for (field, value) in [
            ("name", &self.name),
            ("profession", &self.profession),
            ("bio", &self.bio),
            ("contact_info", &self.contact_info),
        ] {
            if let Some(v) = value {
                require_nonempty(field, v)?;
            }
        }
        Ok(())
    }

    /// Apply the patch to an existing record, bumping `updated_at`.
    pub fn apply(self, mut portfolio: Portfolio, now: DateTime<Utc>) -> Portfolio {
        if let Some(name) = self.name {
            portfolio.name = name.trim().to_string();
        }
        if let Some(profession) = self.profession {
            portfolio.profession = profession.trim().to_string();
        }
        if let Some(bio) = self.bio {
            portfolio.bio = bio;
        }
        if let Some(profile_image) = self.profile_image {
            portfolio.profile_image = profile_image;
        }
        if let Some(contact_info) = self.contact_info {
            portfolio.contact_info = contact_info;
        }
        if let Some(skills) = self.skills {
            portfolio.skills = skills;
        }
        if let Some(social_links) = self.social_links {
            portfolio.social_links = social_links;
        }
        if let Some(template_style) = self.template_style {
            portfolio.template_style = template_style;
        }
        portfolio.updated_at = now;
        portfolio
    }
}

fn require_nonempty(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_portfolio() -> NewPortfolio {
        NewPortfolio {
            name: "Alice Smith".to_string(),
            profession: "Photographer".to_string(),
            bio: "I take pictures.".to_string(),
            profile_image: None,
            contact_info: "alice@example.com".to_string(),
            skills: vec!["lighting".to_string()],
            social_links: vec![],
            template_style: None,
        }
    }

    #[test]
    fn valid_input_passes_and_defaults_template() {
        let input = new_portfolio();
        assert!(input.validate().is_ok());

        let p = input.into_portfolio(UserId::new(), Utc::now());
        assert_eq!(p.template_style, "default");
        assert_eq!(p.profile_image, "");
    }

    #[test]
    fn missing_profession_is_rejected() {
        let mut input = new_portfolio();
        input.profession = " ".to_string();
        assert!(input.validate().is_err());
    }

    #[test]
    fn patch_applies_only_present_fields() {
        let owner = UserId::new();
        let now = Utc::now();
        let p = new_portfolio().into_portfolio(owner, now);

        let later = now + chrono::Duration::minutes(5);
        let patch = PortfolioPatch {
            bio: Some("New bio".to_string()),
            ..Default::default()
        };
        let updated = patch.apply(p.clone(), later);

        assert_eq!(updated.bio, "New bio");
        assert_eq!(updated.name, p.name);
        assert_eq!(updated.updated_at, later);
        assert_eq!(updated.created_at, p.created_at);
    }
}
