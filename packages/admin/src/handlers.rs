use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use lexpanel_client::export::{self, ExportFormat, DEFAULT_STRIPPED_FIELDS};
use lexpanel_client::form::{self, PolicyDraft};
use lexpanel_client::models::{
    Activity, AiReporterSettings, Article, ContentItem, ContentStatus, GenerateRequest,
    GenerateResponse, Lawyer, Policy, RecordId, RoleCount, Stats, Transaction, User,
};
use lexpanel_client::mutation::BulkOutcome;
use lexpanel_client::notice::{Notice, Notices};
use lexpanel_client::resource::fetch_visible;
use lexpanel_client::{
    BackendClient, ClientError, ListController, ListQuery, Mutation, Resource, ResourceKind,
    Selection,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn health() -> &'static str {
    "OK"
}

// --- Dashboard ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: Stats,
    pub role_counts: Vec<RoleCount>,
    pub recent_activity: Vec<Activity>,
}

pub async fn dashboard(
    Extension(client): Extension<BackendClient>,
) -> Result<Json<Dashboard>, ApiError> {
    let (stats, role_counts, recent_activity) = tokio::try_join!(
        client.stats(),
        client.role_counts(),
        client.recent_activity()
    )?;

    Ok(Json(Dashboard {
        stats,
        role_counts,
        recent_activity,
    }))
}

// --- Lists ---

async fn list<R: Resource>(
    client: &BackendClient,
    query: ListQuery,
) -> Result<Json<Vec<R>>, ApiError> {
    Ok(Json(fetch_visible::<R, _>(client, query).await?))
}

pub async fn list_users(
    Extension(client): Extension<BackendClient>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    list(&client, query).await
}

pub async fn list_pending_lawyers(
    Extension(client): Extension<BackendClient>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Lawyer>>, ApiError> {
    list(&client, query).await
}

pub async fn list_transactions(
    Extension(client): Extension<BackendClient>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    list(&client, query).await
}

pub async fn list_content(
    Extension(client): Extension<BackendClient>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ContentItem>>, ApiError> {
    list(&client, query).await
}

pub async fn list_policies(
    Extension(client): Extension<BackendClient>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Policy>>, ApiError> {
    list(&client, query).await
}

pub async fn list_articles(
    Extension(client): Extension<BackendClient>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Article>>, ApiError> {
    list(&client, query).await
}

// --- Row actions ---

/// Notices raised by an action plus the refetched rows.
#[derive(Debug, Serialize)]
pub struct MutationResponse<R> {
    pub notices: Vec<Notice>,
    pub data: Vec<R>,
}

#[derive(Debug, Serialize)]
pub struct BulkResponse<R> {
    pub notices: Vec<Notice>,
    pub outcome: BulkOutcome,
    pub data: Vec<R>,
}

async fn mutate<R: Resource>(
    client: BackendClient,
    query: ListQuery,
    id: RecordId,
    mutation: Mutation,
) -> Result<Json<MutationResponse<R>>, ApiError> {
    let mut controller = ListController::<R, _>::new(client.clone(), query);
    controller.mutate(&client, &id, &mutation).await?;

    Ok(Json(MutationResponse {
        notices: controller.notices().drain(),
        data: controller.list().visible().into_iter().cloned().collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ToggleBody {
    pub value: bool,
}

#[derive(Debug, Deserialize)]
pub struct RejectBody {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: ContentStatus,
}

#[derive(Debug, Deserialize)]
pub struct BulkBody {
    pub ids: Vec<RecordId>,
}

pub async fn toggle_active(
    Extension(client): Extension<BackendClient>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
    Json(body): Json<ToggleBody>,
) -> Result<Json<MutationResponse<User>>, ApiError> {
    mutate(client, query, RecordId::new(id), Mutation::SetActive(body.value)).await
}

pub async fn toggle_verified(
    Extension(client): Extension<BackendClient>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
    Json(body): Json<ToggleBody>,
) -> Result<Json<MutationResponse<User>>, ApiError> {
    mutate(client, query, RecordId::new(id), Mutation::SetVerified(body.value)).await
}

pub async fn verify_lawyer(
    Extension(client): Extension<BackendClient>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<MutationResponse<Lawyer>>, ApiError> {
    mutate(client, query, RecordId::new(id), Mutation::VerifyLawyer).await
}

pub async fn reject_lawyer(
    Extension(client): Extension<BackendClient>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
    Json(body): Json<RejectBody>,
) -> Result<Json<MutationResponse<Lawyer>>, ApiError> {
    let reason = body.reason.trim();
    if reason.is_empty() {
        return Err(ClientError::Validation("Reason is required".into()).into());
    }
    let mutation = Mutation::RejectLawyer {
        reason: reason.to_string(),
    };
    mutate(client, query, RecordId::new(id), mutation).await
}

pub async fn bulk_verify_lawyers(
    Extension(client): Extension<BackendClient>,
    Query(query): Query<ListQuery>,
    Json(body): Json<BulkBody>,
) -> Result<Json<BulkResponse<Lawyer>>, ApiError> {
    let selection: Selection = body.ids.into_iter().collect();
    if selection.is_empty() {
        return Err(ClientError::Validation("Select at least one lawyer".into()).into());
    }

    let mut controller = ListController::<Lawyer, _>::new(client.clone(), query);
    let outcome = controller
        .mutate_bulk(&client, &selection, &Mutation::VerifyLawyer)
        .await;

    Ok(Json(BulkResponse {
        notices: controller.notices().drain(),
        outcome,
        data: controller.list().visible().into_iter().cloned().collect(),
    }))
}

pub async fn set_content_status(
    Extension(client): Extension<BackendClient>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
    Json(body): Json<StatusBody>,
) -> Result<Json<MutationResponse<ContentItem>>, ApiError> {
    let mutation = Mutation::SetContentStatus(body.status);
    mutate(client, query, RecordId::new(id), mutation).await
}

pub async fn publish_article(
    Extension(client): Extension<BackendClient>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<MutationResponse<Article>>, ApiError> {
    mutate(client, query, RecordId::new(id), Mutation::PublishArticle).await
}

pub async fn archive_article(
    Extension(client): Extension<BackendClient>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<MutationResponse<Article>>, ApiError> {
    mutate(client, query, RecordId::new(id), Mutation::ArchiveArticle).await
}

pub async fn delete_article(
    Extension(client): Extension<BackendClient>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<MutationResponse<Article>>, ApiError> {
    mutate(client, query, RecordId::new(id), Mutation::DeleteArticle).await
}

pub async fn delete_policy(
    Extension(client): Extension<BackendClient>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<MutationResponse<Policy>>, ApiError> {
    mutate(client, query, RecordId::new(id), Mutation::DeletePolicy).await
}

// --- Forms ---

/// A stored record plus the route the console returns to.
#[derive(Debug, Serialize)]
pub struct FormResponse<T> {
    pub notices: Vec<Notice>,
    pub data: T,
    pub redirect: String,
}

async fn save<D, T, F, Fut>(
    draft: &D,
    redirect: &str,
    send: F,
) -> Result<Json<FormResponse<T>>, ApiError>
where
    D: form::FormDraft,
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = lexpanel_client::Result<T>>,
{
    let mut notices = Notices::new();
    let saved = form::submit(draft, redirect, &mut notices, send).await?;

    Ok(Json(FormResponse {
        notices: notices.drain(),
        data: saved.record,
        redirect: saved.redirect,
    }))
}

/// A draft posted without a slug gets one from its title.
fn with_slug(mut draft: PolicyDraft) -> PolicyDraft {
    if draft.slug.trim().is_empty() {
        let title = draft.title.clone();
        draft.set_title(title);
    }
    draft
}

pub async fn get_policy(
    Extension(client): Extension<BackendClient>,
    Path(id): Path<String>,
) -> Result<Json<Policy>, ApiError> {
    Ok(Json(client.policy(&RecordId::new(id)).await?))
}

pub async fn create_policy(
    Extension(client): Extension<BackendClient>,
    Json(draft): Json<PolicyDraft>,
) -> Result<Json<FormResponse<Policy>>, ApiError> {
    let draft = with_slug(draft);
    save(&draft, "/policies", || client.create_policy(&draft)).await
}

pub async fn update_policy(
    Extension(client): Extension<BackendClient>,
    Path(id): Path<String>,
    Json(draft): Json<PolicyDraft>,
) -> Result<Json<FormResponse<Policy>>, ApiError> {
    let id = RecordId::new(id);
    let draft = with_slug(draft);
    save(&draft, "/policies", || client.update_policy(&id, &draft)).await
}

pub async fn get_settings(
    Extension(client): Extension<BackendClient>,
) -> Result<Json<AiReporterSettings>, ApiError> {
    Ok(Json(client.settings().await?))
}

pub async fn save_settings(
    Extension(client): Extension<BackendClient>,
    Json(settings): Json<AiReporterSettings>,
) -> Result<Json<FormResponse<AiReporterSettings>>, ApiError> {
    save(&settings, "/ai-reporter", || client.save_settings(&settings)).await
}

pub async fn get_article(
    Extension(client): Extension<BackendClient>,
    Path(id): Path<String>,
) -> Result<Json<Article>, ApiError> {
    Ok(Json(client.article(&RecordId::new(id)).await?))
}

pub async fn generate_articles(
    Extension(client): Extension<BackendClient>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let response = client.generate_articles(&request).await?;
    tracing::info!(count = response.articles.len(), "articles generated");
    Ok(Json(response))
}

// --- Export ---

#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    #[serde(default)]
    pub format: ExportFormat,
    pub search: Option<String>,
    pub status: Option<String>,
    #[serde(alias = "type")]
    pub role: Option<String>,
    /// Comma-separated fields to drop; defaults to avatars.
    pub strip: Option<String>,
}

pub async fn export(
    State(state): State<AppState>,
    Extension(client): Extension<BackendClient>,
    Path(resource): Path<String>,
    Query(params): Query<ExportParams>,
) -> Result<Response, ApiError> {
    let kind: ResourceKind = resource
        .parse()
        .map_err(|_| ApiError::UnknownResource(resource.clone()))?;

    let query = ListQuery {
        search: params.search,
        status: params.status,
        role: params.role,
        page: Some(1),
        limit: Some(state.config.client.page_size),
    }
    .normalized();

    let strip: Vec<&str> = match &params.strip {
        Some(fields) => fields
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect(),
        None => DEFAULT_STRIPPED_FIELDS.to_vec(),
    };

    let records = export::snapshot(&client, kind, query, &strip).await?;
    let body = params.format.render(&records)?;
    let file_name = export::export_file_name(
        &kind.to_string(),
        params.format,
        chrono::Local::now().date_naive(),
    );

    tracing::info!(resource = %kind, format = %params.format, rows = records.len(), "export served");

    Ok((
        [
            (header::CONTENT_TYPE, params.format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response())
}
