//! Create/edit drafts and their submission.
//!
//! A draft is validated for required fields before anything touches the
//! network. A failed save keeps the draft untouched so the caller can show
//! it again for correction.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::models::{AiReporterSettings, LoginRequest, Policy, PolicyStatus};
use crate::notice::Notices;
use crate::slug::slugify;

/// A form body that can check itself before submission.
pub trait FormDraft: Serialize + Send + Sync {
    fn validate(&self) -> Result<()>;
}

fn require(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ClientError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Draft of a policy page.
///
/// The slug follows the title until it is edited by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDraft {
    pub title: String,
    #[serde(default)]
    pub slug: String,
    pub content: String,
    pub status: PolicyStatus,
    #[serde(skip)]
    slug_edited: bool,
}

impl Default for PolicyDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyDraft {
    pub fn new() -> Self {
        Self {
            title: String::new(),
            slug: String::new(),
            content: String::new(),
            status: PolicyStatus::Active,
            slug_edited: false,
        }
    }

    /// Draft for editing an existing policy. Its slug is kept as is.
    pub fn from_policy(policy: &Policy) -> Self {
        Self {
            title: policy.title.clone(),
            slug: policy.slug.clone(),
            content: policy.content.clone(),
            status: policy.status,
            slug_edited: true,
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        if !self.slug_edited {
            self.slug = slugify(&self.title);
        }
    }

    pub fn set_slug(&mut self, slug: impl Into<String>) {
        self.slug = slug.into();
        self.slug_edited = true;
    }

    pub fn slug_edited(&self) -> bool {
        self.slug_edited
    }
}

impl FormDraft for PolicyDraft {
    fn validate(&self) -> Result<()> {
        require(&self.title, "Title")?;
        require(&self.slug, "Slug")?;
        require(&self.content, "Content")?;
        Ok(())
    }
}

impl FormDraft for AiReporterSettings {
    fn validate(&self) -> Result<()> {
        if self.generation_mode.is_empty() {
            return Err(ClientError::Validation(
                "Select at least one generation mode".into(),
            ));
        }
        if self.schedule.articles_per_run == 0 {
            return Err(ClientError::Validation(
                "Articles per run must be at least 1".into(),
            ));
        }
        if self.archive.enabled && self.archive.after_days == 0 {
            return Err(ClientError::Validation(
                "Archive delay must be at least 1 day".into(),
            ));
        }
        Ok(())
    }
}

/// Credentials entered on the login screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl FormDraft for LoginForm {
    fn validate(&self) -> Result<()> {
        let email = self.email.trim();
        let valid_email = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !valid_email {
            return Err(ClientError::Validation("Enter a valid email address".into()));
        }
        require(&self.password, "Password")
    }
}

impl From<LoginForm> for LoginRequest {
    fn from(form: LoginForm) -> Self {
        Self {
            email: form.email.trim().to_string(),
            password: form.password,
        }
    }
}

/// A stored record and the list route to return to.
#[derive(Debug, Clone)]
pub struct Saved<T> {
    pub record: T,
    pub redirect: String,
}

/// Validate `draft`, then run `send`.
///
/// Validation failures and backend failures both raise an error notice;
/// `send` is never called for an invalid draft.
pub async fn submit<D, T, F, Fut>(
    draft: &D,
    redirect: &str,
    notices: &mut Notices,
    send: F,
) -> Result<Saved<T>>
where
    D: FormDraft,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if let Err(e) = draft.validate() {
        if let ClientError::Validation(message) = &e {
            notices.error(message.clone());
        }
        return Err(e);
    }

    match send().await {
        Ok(record) => {
            notices.success("Saved successfully");
            Ok(Saved {
                record,
                redirect: redirect.to_string(),
            })
        }
        Err(e) => {
            tracing::error!(error = %e, "form submission failed");
            notices.error(format!("Failed to save: {e}"));
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArchiveRules, Frequency, GenerationMode, Schedule};
    use std::cell::Cell;

    #[test]
    fn test_slug_follows_title_until_edited() {
        let mut draft = PolicyDraft::new();
        draft.set_title("Privacy & Cookies!!");
        assert_eq!(draft.slug, "privacy-cookies");

        draft.set_slug("cookies");
        draft.set_title("Cookie Policy");
        assert_eq!(draft.slug, "cookies");
        assert!(draft.slug_edited());
    }

    #[test]
    fn test_policy_requires_content() {
        let mut draft = PolicyDraft::new();
        draft.set_title("Terms");
        let err = draft.validate().unwrap_err();
        assert_eq!(err.to_string(), "validation failed: Content is required");
    }

    #[test]
    fn test_settings_need_a_generation_mode() {
        let mut settings = AiReporterSettings {
            target_tags: vec!["tenancy".into()],
            legal_fields: vec![],
            lawyers_to_follow: vec![],
            generation_mode: vec![],
            schedule: Schedule {
                frequency: Frequency::Daily,
                articles_per_run: 3,
                time_of_day: Some("09:00".into()),
            },
            archive: ArchiveRules {
                enabled: true,
                after_days: 30,
                min_views: None,
            },
        };
        assert!(settings.validate().is_err());

        settings.generation_mode.push(GenerationMode::Tags);
        assert!(settings.validate().is_ok());

        settings.archive.after_days = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_login_form_checks_email_shape() {
        let form = LoginForm {
            email: "admin".into(),
            password: "secret".into(),
        };
        assert!(form.validate().is_err());

        let form = LoginForm {
            email: " admin@example.com ".into(),
            password: "secret".into(),
        };
        assert!(form.validate().is_ok());
        assert_eq!(LoginRequest::from(form).email, "admin@example.com");
    }

    #[tokio::test]
    async fn test_invalid_draft_never_reaches_backend() {
        let mut draft = PolicyDraft::new();
        draft.set_title("Refunds");
        let calls = Cell::new(0);
        let mut notices = Notices::new();

        let result = submit(&draft, "/policies", &mut notices, || async {
            calls.set(calls.get() + 1);
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(ClientError::Validation(_))));
        assert_eq!(calls.get(), 0);
        assert_eq!(notices.errors().count(), 1);
    }

    #[tokio::test]
    async fn test_successful_submit_redirects() {
        let mut draft = PolicyDraft::new();
        draft.set_title("Refunds");
        draft.content = "Full refund within 14 days.".into();
        let mut notices = Notices::new();

        let saved = submit(&draft, "/policies", &mut notices, || async {
            Ok(draft.slug.clone())
        })
        .await
        .unwrap();

        assert_eq!(saved.record, "refunds");
        assert_eq!(saved.redirect, "/policies");
        assert_eq!(notices.errors().count(), 0);
    }
}
