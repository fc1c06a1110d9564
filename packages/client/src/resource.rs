//! Generic resource list: fetch, filter, and guard against stale responses.
//!
//! Every console screen is a [`ResourceList`] configured by a
//! [`ListEndpoint`]. Filters are either mapped to query parameters
//! ([`FilterMode::Server`]) or applied to the fetched array
//! ([`FilterMode::Client`]). Each fetch carries a [`FetchTicket`]; only the
//! most recently issued ticket may replace the rows.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{ClientError, Result};
use crate::models::RecordId;
use crate::mutation::Mutation;
use crate::notice::Notices;

/// Largest page a list request may ask the backend for.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Where a resource's filters are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Server,
    Client,
}

/// Backend list endpoint and its query-parameter mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListEndpoint {
    pub path: &'static str,
    pub mode: FilterMode,
    /// Query parameter carrying the role/type filter.
    pub role_param: &'static str,
    /// Human label used in notices ("users", "policies").
    pub label: &'static str,
}

/// A record shown in a list screen.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const ENDPOINT: ListEndpoint;

    fn id(&self) -> &RecordId;

    /// Fields the free-text search looks at.
    fn search_text(&self) -> Vec<&str>;

    fn status_key(&self) -> Option<String> {
        None
    }

    /// Role for users, type for transactions and content, area for lawyers.
    fn role_key(&self) -> Option<String> {
        None
    }

    /// Optimistically patch the local copy. Returns whether anything changed.
    fn apply_local(&mut self, _mutation: &Mutation) -> bool {
        false
    }
}

/// Filter and paging parameters of a list screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "type")]
    pub role: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = clean(Some(search.into()));
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = clean(Some(status.into()));
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = clean(Some(role.into()));
        self
    }

    pub fn with_page(mut self, page: u32, limit: u32) -> Self {
        self.page = Some(page.max(1));
        self.limit = Some(limit.clamp(1, MAX_PAGE_SIZE));
        self
    }

    /// Drop blank values and the "all" dropdown sentinel; clamp paging.
    pub fn normalized(self) -> Self {
        Self {
            search: clean(self.search),
            status: clean(self.status),
            role: clean(self.role),
            page: self.page.map(|page| page.max(1)),
            limit: self.limit.map(|limit| limit.clamp(1, MAX_PAGE_SIZE)),
        }
    }

    /// Query-string pairs sent to `endpoint`.
    ///
    /// Paging is always sent; filters only when the endpoint filters
    /// server-side.
    pub fn to_pairs(&self, endpoint: &ListEndpoint) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        if endpoint.mode == FilterMode::Server {
            if let Some(search) = &self.search {
                pairs.push(("search".to_string(), search.clone()));
            }
            if let Some(status) = &self.status {
                pairs.push(("status".to_string(), status.clone()));
            }
            if let Some(role) = &self.role {
                pairs.push((endpoint.role_param.to_string(), role.clone()));
            }
        }

        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }

        pairs
    }

    /// Logical AND of the search, status and role predicates.
    pub fn matches<R: Resource>(&self, record: &R) -> bool {
        let search_ok = match &self.search {
            Some(term) => {
                let term = term.to_lowercase();
                record
                    .search_text()
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
            }
            None => true,
        };

        let status_ok = match &self.status {
            Some(wanted) => record
                .status_key()
                .is_some_and(|s| s.eq_ignore_ascii_case(wanted)),
            None => true,
        };

        let role_ok = match &self.role {
            Some(wanted) => record
                .role_key()
                .is_some_and(|r| r.eq_ignore_ascii_case(wanted)),
            None => true,
        };

        search_ok && status_ok && role_ok
    }
}

/// Identifies one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// What happened when a fetch result was handed back.
#[derive(Debug)]
pub enum Completion {
    Loaded { count: usize },
    Failed(ClientError),
    /// A newer fetch was issued after this one; the result was dropped.
    Stale,
}

/// Rows of one screen plus the state of its latest fetch.
#[derive(Debug, Clone)]
pub struct ResourceList<R> {
    items: Vec<R>,
    query: ListQuery,
    phase: Phase,
    issued: u64,
}

impl<R: Resource> Default for ResourceList<R> {
    fn default() -> Self {
        Self::new(ListQuery::default())
    }
}

impl<R: Resource> ResourceList<R> {
    pub fn new(query: ListQuery) -> Self {
        Self {
            items: Vec::new(),
            query: query.normalized(),
            phase: Phase::Idle,
            issued: 0,
        }
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// Fetched rows, before any client-side filtering.
    pub fn items(&self) -> &[R] {
        &self.items
    }

    /// Rows the screen renders.
    pub fn visible(&self) -> Vec<&R> {
        match R::ENDPOINT.mode {
            FilterMode::Server => self.items.iter().collect(),
            FilterMode::Client => self
                .items
                .iter()
                .filter(|record| self.query.matches(*record))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.visible().is_empty()
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        self.phase = Phase::Loading;
        FetchTicket(self.issued)
    }

    /// Replace the filter. Returns the ticket of the fetch it triggers.
    pub fn set_query(&mut self, query: ListQuery) -> FetchTicket {
        self.query = query.normalized();
        self.begin_fetch()
    }

    pub fn complete(&mut self, ticket: FetchTicket, result: Result<Vec<R>>) -> Completion {
        if ticket.0 != self.issued {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.issued,
                resource = R::ENDPOINT.label,
                "dropping stale response"
            );
            return Completion::Stale;
        }

        match result {
            Ok(items) => {
                let count = items.len();
                self.items = items;
                self.phase = Phase::Loaded;
                Completion::Loaded { count }
            }
            Err(e) => {
                self.items.clear();
                self.phase = Phase::Failed;
                Completion::Failed(e)
            }
        }
    }

    /// Patch a row in place ahead of the refetch that will overwrite it.
    ///
    /// Returns the row as it was when the patch changed anything.
    pub fn patch_local(&mut self, id: &RecordId, mutation: &Mutation) -> Option<R> {
        let record = self.items.iter_mut().find(|record| record.id() == id)?;
        let previous = record.clone();
        record.apply_local(mutation).then_some(previous)
    }

    /// Put back a row saved by [`ResourceList::patch_local`].
    pub fn restore(&mut self, previous: R) {
        if let Some(record) = self
            .items
            .iter_mut()
            .find(|record| record.id() == previous.id())
        {
            *record = previous;
        }
    }
}

/// Anything that can serve a page of `R`.
#[async_trait]
pub trait ListSource<R: Resource>: Send + Sync {
    async fn fetch(&self, query: &ListQuery) -> Result<Vec<R>>;
}

/// A list screen: its rows, the source it loads from and its notices.
pub struct ListController<R, S> {
    source: S,
    list: ResourceList<R>,
    notices: Notices,
    optimistic: bool,
}

impl<R: Resource, S: ListSource<R>> ListController<R, S> {
    pub fn new(source: S, query: ListQuery) -> Self {
        Self {
            source,
            list: ResourceList::new(query),
            notices: Notices::new(),
            optimistic: false,
        }
    }

    /// Patch rows locally before a mutation call resolves.
    pub fn with_optimistic_updates(mut self) -> Self {
        self.optimistic = true;
        self
    }

    pub fn list(&self) -> &ResourceList<R> {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ResourceList<R> {
        &mut self.list
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn notices(&mut self) -> &mut Notices {
        &mut self.notices
    }

    pub fn is_optimistic(&self) -> bool {
        self.optimistic
    }

    /// Fetch with the current filter. Returns whether rows were loaded.
    pub async fn refresh(&mut self) -> bool {
        let ticket = self.list.begin_fetch();
        self.load(ticket).await
    }

    /// Change the filter and refetch.
    pub async fn set_query(&mut self, query: ListQuery) -> bool {
        let ticket = self.list.set_query(query);
        self.load(ticket).await
    }

    async fn load(&mut self, ticket: FetchTicket) -> bool {
        let query = self.list.query().clone();
        let result = self.source.fetch(&query).await;

        match self.list.complete(ticket, result) {
            Completion::Loaded { count } => {
                tracing::debug!(resource = R::ENDPOINT.label, count, "list loaded");
                true
            }
            Completion::Failed(e) => {
                tracing::error!(resource = R::ENDPOINT.label, error = %e, "failed to fetch list");
                self.notices
                    .error(format!("Failed to load {}", R::ENDPOINT.label));
                false
            }
            Completion::Stale => false,
        }
    }
}

/// Fetch one page and return the rows a screen with `query` would show.
pub async fn fetch_visible<R, S>(source: &S, query: ListQuery) -> Result<Vec<R>>
where
    R: Resource,
    S: ListSource<R>,
{
    let mut list = ResourceList::<R>::new(query);
    let ticket = list.begin_fetch();
    let result = source.fetch(list.query()).await;

    match list.complete(ticket, result) {
        Completion::Failed(e) => Err(e),
        _ => Ok(list.visible().into_iter().cloned().collect()),
    }
}

/// The console's list screens, addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ResourceKind {
    Users,
    Lawyers,
    Transactions,
    Content,
    Policies,
    Articles,
}

impl ResourceKind {
    pub fn endpoint(self) -> ListEndpoint {
        use crate::models::{Article, ContentItem, Lawyer, Policy, Transaction, User};

        match self {
            ResourceKind::Users => User::ENDPOINT,
            ResourceKind::Lawyers => Lawyer::ENDPOINT,
            ResourceKind::Transactions => Transaction::ENDPOINT,
            ResourceKind::Content => ContentItem::ENDPOINT,
            ResourceKind::Policies => Policy::ENDPOINT,
            ResourceKind::Articles => Article::ENDPOINT,
        }
    }
}
