//! Response contracts for the admin backend.
//!
//! Field names follow the backend's camelCase wire format. Every type here
//! is parsed at the network boundary, so a payload that drifts from these
//! shapes surfaces as [`crate::ClientError::Decode`] instead of leaking
//! half-filled records into a screen.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

use crate::mutation::Mutation;
use crate::resource::{FilterMode, ListEndpoint, Resource};

/// Backend record identifier.
///
/// The backend hands out string ids for most collections and numeric ids
/// for a few legacy ones; both are carried as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Number(n) => Self(n.to_string()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Role {
    Client,
    Lawyer,
    Admin,
    AiReporter,
}

impl Role {
    /// Route an account lands on right after login.
    pub fn landing_route(self) -> &'static str {
        match self {
            Role::AiReporter => "/ai-reporter",
            _ => "/dashboard",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default, alias = "createdAt")]
    pub registered_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lawyer {
    #[serde(flatten)]
    pub user: User,
    #[serde(default)]
    pub area_of_practice: Option<String>,
    #[serde(default)]
    pub experience: Option<u32>,
    #[serde(default = "pending")]
    pub verification_status: VerificationStatus,
}

fn pending() -> VerificationStatus {
    VerificationStatus::Pending
}

/// Set `slot` to `value`, reporting whether it changed.
fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(alias = "_id", alias = "id")]
    pub txn_id: RecordId,
    pub user: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: f64,
    pub date: DateTime<Utc>,
    pub status: String,
    #[serde(default)]
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ContentStatus {
    Published,
    Flagged,
    Draft,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    #[serde(alias = "_id")]
    pub id: RecordId,
    pub author: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub snippet: Option<String>,
    pub status: ContentStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum PolicyStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    #[serde(alias = "_id")]
    pub id: RecordId,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub status: PolicyStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ArticleStatus {
    Draft,
    Published,
    Archived,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArticleStats {
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub shares: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(alias = "_id")]
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub legal_field: Option<String>,
    pub status: ArticleStatus,
    #[serde(default)]
    pub stats: ArticleStats,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GenerationMode {
    Trending,
    Tags,
    LegalFields,
    Lawyers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Frequency {
    Hourly,
    Daily,
    Weekly,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub frequency: Frequency,
    pub articles_per_run: u32,
    #[serde(default)]
    pub time_of_day: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveRules {
    pub enabled: bool,
    pub after_days: u32,
    #[serde(default)]
    pub min_views: Option<u64>,
}

/// AI Reporter configuration. Fetched and written back as a whole.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiReporterSettings {
    #[serde(default)]
    pub target_tags: Vec<String>,
    #[serde(default)]
    pub legal_fields: Vec<String>,
    #[serde(default)]
    pub lawyers_to_follow: Vec<String>,
    #[serde(default)]
    pub generation_mode: Vec<GenerationMode>,
    pub schedule: Schedule,
    pub archive: ArchiveRules,
}

/// Body of `POST /ai-reporter/articles/generate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_field: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_lawyers: u64,
    #[serde(default)]
    pub pending_verifications: u64,
    #[serde(default)]
    pub total_transactions: u64,
    #[serde(default)]
    pub total_revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoleCount {
    pub role: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(alias = "_id")]
    pub id: RecordId,
    #[serde(alias = "user")]
    pub actor: String,
    pub action: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The account a session belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(alias = "_id")]
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: SessionUser,
}

impl Resource for User {
    const ENDPOINT: ListEndpoint = ListEndpoint {
        path: "/admin/users",
        mode: FilterMode::Server,
        role_param: "role",
        label: "users",
    };

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn search_text(&self) -> Vec<&str> {
        vec![&self.name, &self.email]
    }

    fn status_key(&self) -> Option<String> {
        Some(if self.is_active { "active" } else { "inactive" }.to_string())
    }

    fn role_key(&self) -> Option<String> {
        Some(self.role.to_string())
    }

    fn apply_local(&mut self, mutation: &Mutation) -> bool {
        match *mutation {
            Mutation::SetActive(active) => replace(&mut self.is_active, active),
            Mutation::SetVerified(verified) => replace(&mut self.is_verified, verified),
            _ => false,
        }
    }
}

impl Resource for Lawyer {
    const ENDPOINT: ListEndpoint = ListEndpoint {
        path: "/admin/lawyers/pending",
        mode: FilterMode::Client,
        role_param: "area",
        label: "lawyers",
    };

    fn id(&self) -> &RecordId {
        &self.user.id
    }

    fn search_text(&self) -> Vec<&str> {
        let mut text = self.user.search_text();
        if let Some(area) = &self.area_of_practice {
            text.push(area);
        }
        text
    }

    fn status_key(&self) -> Option<String> {
        Some(self.verification_status.to_string())
    }

    fn role_key(&self) -> Option<String> {
        self.area_of_practice.clone()
    }

    fn apply_local(&mut self, mutation: &Mutation) -> bool {
        match mutation {
            Mutation::VerifyLawyer => {
                replace(&mut self.verification_status, VerificationStatus::Verified)
            }
            Mutation::RejectLawyer { .. } => {
                replace(&mut self.verification_status, VerificationStatus::Rejected)
            }
            other => self.user.apply_local(other),
        }
    }
}

impl Resource for Transaction {
    const ENDPOINT: ListEndpoint = ListEndpoint {
        path: "/admin/transactions",
        mode: FilterMode::Server,
        role_param: "type",
        label: "transactions",
    };

    fn id(&self) -> &RecordId {
        &self.txn_id
    }

    fn search_text(&self) -> Vec<&str> {
        vec![self.txn_id.as_str(), &self.user]
    }

    fn status_key(&self) -> Option<String> {
        Some(self.status.clone())
    }

    fn role_key(&self) -> Option<String> {
        Some(self.kind.clone())
    }
}

impl Resource for ContentItem {
    const ENDPOINT: ListEndpoint = ListEndpoint {
        path: "/admin/content",
        mode: FilterMode::Server,
        role_param: "type",
        label: "content",
    };

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn search_text(&self) -> Vec<&str> {
        let mut text = vec![self.title.as_str(), self.author.as_str()];
        if let Some(snippet) = &self.snippet {
            text.push(snippet);
        }
        text
    }

    fn status_key(&self) -> Option<String> {
        Some(self.status.to_string())
    }

    fn role_key(&self) -> Option<String> {
        Some(self.kind.clone())
    }

    fn apply_local(&mut self, mutation: &Mutation) -> bool {
        match *mutation {
            Mutation::SetContentStatus(status) => replace(&mut self.status, status),
            _ => false,
        }
    }
}

impl Resource for Policy {
    const ENDPOINT: ListEndpoint = ListEndpoint {
        path: "/policies",
        mode: FilterMode::Client,
        role_param: "type",
        label: "policies",
    };

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn search_text(&self) -> Vec<&str> {
        vec![&self.title, &self.slug]
    }

    fn status_key(&self) -> Option<String> {
        Some(self.status.to_string())
    }
}

impl Resource for Article {
    const ENDPOINT: ListEndpoint = ListEndpoint {
        path: "/ai-reporter/articles",
        mode: FilterMode::Server,
        role_param: "legalField",
        label: "articles",
    };

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn search_text(&self) -> Vec<&str> {
        let mut text = vec![self.title.as_str()];
        text.extend(self.tags.iter().map(String::as_str));
        text
    }

    fn status_key(&self) -> Option<String> {
        Some(self.status.to_string())
    }

    fn role_key(&self) -> Option<String> {
        self.legal_field.clone()
    }

    fn apply_local(&mut self, mutation: &Mutation) -> bool {
        match mutation {
            Mutation::PublishArticle => replace(&mut self.status, ArticleStatus::Published),
            Mutation::ArchiveArticle => replace(&mut self.status, ArticleStatus::Archived),
            _ => false,
        }
    }
}
