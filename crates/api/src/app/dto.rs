use serde::Deserialize;

use folio_accounts::{InviteWithParties, Portfolio, Project, User};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct IssueInviteRequest {
    /// Overrides the configured default invite TTL.
    pub expires_in_hours: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAdminWithInviteRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub invite_code: String,
}

// -------------------------
// JSON mapping helpers
// -------------------------

/// Public shape of a user record. The password hash never leaves the server.
pub fn user_to_json(user: &User) -> serde_json::Value {
    serde_json::json!({
        "id": user.id.to_string(),
        "name": user.name,
        "email": user.email,
        "role": user.role.as_str(),
        "created_at": user.created_at.to_rfc3339(),
        "updated_at": user.updated_at.to_rfc3339(),
    })
}

pub fn portfolio_to_json(portfolio: &Portfolio) -> serde_json::Value {
    serde_json::json!({
        "id": portfolio.id.to_string(),
        "user_id": portfolio.user_id.to_string(),
        "name": portfolio.name,
        "profession": portfolio.profession,
        "bio": portfolio.bio,
        "profile_image": portfolio.profile_image,
        "contact_info": portfolio.contact_info,
        "skills": portfolio.skills,
        "social_links": portfolio.social_links,
        "template_style": portfolio.template_style,
        "created_at": portfolio.created_at.to_rfc3339(),
        "updated_at": portfolio.updated_at.to_rfc3339(),
    })
}

pub fn project_to_json(project: &Project) -> serde_json::Value {
    serde_json::json!({
        "id": project.id.to_string(),
        "user_id": project.user_id.to_string(),
        "title": project.title,
        "description": project.description,
        "tech_stack": project.tech_stack,
        "project_link": project.project_link,
        "image": project.image,
        "created_at": project.created_at.to_rfc3339(),
        "updated_at": project.updated_at.to_rfc3339(),
    })
}

pub fn invite_to_json(entry: &InviteWithParties) -> serde_json::Value {
    serde_json::json!({
        "id": entry.invite.id.to_string(),
        "code": entry.invite.code,
        "created_by": {
            "name": entry.created_by_name,
            "email": entry.created_by_email,
        },
        "used_by": entry.used_by_email.as_ref().map(|email| serde_json::json!({
            "name": entry.used_by_name,
            "email": email,
        })),
        "used_at": entry.invite.used_at.map(|t| t.to_rfc3339()),
        "expires_at": entry.invite.expires_at.to_rfc3339(),
        "is_used": entry.invite.is_used,
        "created_at": entry.invite.created_at.to_rfc3339(),
    })
}
