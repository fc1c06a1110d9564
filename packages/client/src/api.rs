//! HTTP client for the admin backend.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::form::PolicyDraft;
use crate::models::{
    Activity, AiReporterSettings, Article, ContentStatus, GenerateRequest, GenerateResponse,
    LoginRequest, LoginResponse, Policy, RecordId, RoleCount, Stats,
};
use crate::mutation::{Mutation, MutationSink};
use crate::resource::{ListQuery, ListSource, Resource};

/// User agent string identifying this client.
const USER_AGENT: &str = concat!("lexpanel/", env!("CARGO_PKG_VERSION"));

/// Typed client for the backend REST API.
///
/// Cloning is cheap; the connection pool is shared. A session token is
/// attached per clone with [`BackendClient::with_token`], so the session
/// store stays the only place a token lives.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    page_size: u32,
    token: Option<String>,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Pull the payload out of a `{ "data": ... }` envelope, if there is one.
fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) => match map.remove("data") {
            Some(data) => data,
            None => Value::Object(map),
        },
        other => other,
    }
}

/// Parse a response body against its contract type.
pub(crate) fn decode<T: DeserializeOwned>(endpoint: &str, body: &[u8]) -> Result<T> {
    let decode_err = |source| ClientError::Decode {
        endpoint: endpoint.to_string(),
        source,
    };
    let value: Value = serde_json::from_slice(body).map_err(decode_err)?;
    serde_json::from_value(unwrap_envelope(value)).map_err(decode_err)
}

fn error_message(body: &str, status: StatusCode) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        ["message", "error"]
            .iter()
            .find_map(|key| v.get(key).and_then(Value::as_str).map(str::to_string))
    });

    from_json
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        })
}

fn segment(id: &RecordId) -> String {
    urlencoding::encode(id.as_str()).into_owned()
}

impl BackendClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            page_size: config.page_size,
            token: None,
        })
    }

    /// A clone that authenticates with `token`.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..self.clone()
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{path}", self.base_url));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Vec<u8>> {
        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: error_message(&body, status),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(String, String)]) -> Result<T> {
        let body = self.send(self.request(Method::GET, path).query(query)).await?;
        decode(path, &body)
    }

    async fn send_json<T, B>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.send(self.request(method, path).json(body)).await?;
        decode(path, &response)
    }

    /// Send a request whose response body is not needed.
    async fn send_discard(&self, method: Method, path: &str, body: Option<Value>) -> Result<()> {
        let builder = self.request(method, path);
        let builder = match body {
            Some(body) => builder.json(&body),
            None => builder,
        };
        self.send(builder).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        self.send_json(Method::POST, "/auth/admin-login", request)
            .await
    }

    pub async fn stats(&self) -> Result<Stats> {
        self.get("/admin/stats", &[]).await
    }

    pub async fn role_counts(&self) -> Result<Vec<RoleCount>> {
        self.get("/admin/user-roles", &[]).await
    }

    pub async fn recent_activity(&self) -> Result<Vec<Activity>> {
        self.get("/admin/recent-activity", &[]).await
    }

    /// Fetch one page of `R` for `query`.
    #[tracing::instrument(skip(self), fields(endpoint = R::ENDPOINT.path))]
    pub async fn list<R: Resource>(&self, query: &ListQuery) -> Result<Vec<R>> {
        let mut query = query.clone();
        if query.page.is_none() {
            query.page = Some(1);
        }
        if query.limit.is_none() {
            query.limit = Some(self.page_size);
        }
        self.get(R::ENDPOINT.path, &query.to_pairs(&R::ENDPOINT))
            .await
    }

    pub async fn verify_lawyer(&self, id: &RecordId) -> Result<()> {
        let path = format!("/admin/users/{}/verify", segment(id));
        self.send_discard(Method::POST, &path, None).await
    }

    pub async fn reject_lawyer(&self, id: &RecordId, reason: &str) -> Result<()> {
        let path = format!("/admin/users/{}/reject", segment(id));
        self.send_discard(Method::POST, &path, Some(serde_json::json!({ "reason": reason })))
            .await
    }

    pub async fn set_active(&self, id: &RecordId, active: bool) -> Result<()> {
        let path = format!("/admin/users/{}/toggle-active", segment(id));
        self.send_discard(Method::PATCH, &path, Some(serde_json::json!({ "isActive": active })))
            .await
    }

    pub async fn set_verified(&self, id: &RecordId, verified: bool) -> Result<()> {
        let path = format!("/admin/users/{}/toggle-verified", segment(id));
        self.send_discard(
            Method::PATCH,
            &path,
            Some(serde_json::json!({ "isVerified": verified })),
        )
        .await
    }

    pub async fn set_content_status(&self, id: &RecordId, status: ContentStatus) -> Result<()> {
        let path = format!("/admin/content/{}/status", segment(id));
        self.send_discard(Method::PUT, &path, Some(serde_json::json!({ "status": status })))
            .await
    }

    pub async fn policy(&self, id: &RecordId) -> Result<Policy> {
        self.get(&format!("/policies/{}", segment(id)), &[]).await
    }

    pub async fn create_policy(&self, draft: &PolicyDraft) -> Result<Policy> {
        self.send_json(Method::POST, "/policies", draft).await
    }

    pub async fn update_policy(&self, id: &RecordId, draft: &PolicyDraft) -> Result<Policy> {
        let path = format!("/policies/{}", segment(id));
        self.send_json(Method::PUT, &path, draft).await
    }

    pub async fn delete_policy(&self, id: &RecordId) -> Result<()> {
        let path = format!("/policies/{}", segment(id));
        self.send_discard(Method::DELETE, &path, None).await
    }

    pub async fn article(&self, id: &RecordId) -> Result<Article> {
        self.get(&format!("/ai-reporter/articles/{}", segment(id)), &[])
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn generate_articles(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        self.send_json(Method::POST, "/ai-reporter/articles/generate", request)
            .await
    }

    pub async fn publish_article(&self, id: &RecordId) -> Result<()> {
        let path = format!("/ai-reporter/articles/{}/publish", segment(id));
        self.send_discard(Method::PUT, &path, None).await
    }

    pub async fn archive_article(&self, id: &RecordId) -> Result<()> {
        let path = format!("/ai-reporter/articles/{}/archive", segment(id));
        self.send_discard(Method::PUT, &path, None).await
    }

    pub async fn delete_article(&self, id: &RecordId) -> Result<()> {
        let path = format!("/ai-reporter/articles/{}", segment(id));
        self.send_discard(Method::DELETE, &path, None).await
    }

    pub async fn settings(&self) -> Result<AiReporterSettings> {
        self.get("/ai-reporter/settings", &[]).await
    }

    pub async fn save_settings(&self, settings: &AiReporterSettings) -> Result<AiReporterSettings> {
        self.send_json(Method::PUT, "/ai-reporter/settings", settings)
            .await
    }
}

#[async_trait]
impl<R: Resource> ListSource<R> for BackendClient {
    async fn fetch(&self, query: &ListQuery) -> Result<Vec<R>> {
        self.list(query).await
    }
}

#[async_trait]
impl MutationSink for BackendClient {
    async fn apply(&self, id: &RecordId, mutation: &Mutation) -> Result<()> {
        match mutation {
            Mutation::VerifyLawyer => self.verify_lawyer(id).await,
            Mutation::RejectLawyer { reason } => self.reject_lawyer(id, reason).await,
            Mutation::SetActive(active) => self.set_active(id, *active).await,
            Mutation::SetVerified(verified) => self.set_verified(id, *verified).await,
            Mutation::SetContentStatus(status) => self.set_content_status(id, *status).await,
            Mutation::PublishArticle => self.publish_article(id).await,
            Mutation::ArchiveArticle => self.archive_article(id).await,
            Mutation::DeleteArticle => self.delete_article(id).await,
            Mutation::DeletePolicy => self.delete_policy(id).await,
        }
    }
}
