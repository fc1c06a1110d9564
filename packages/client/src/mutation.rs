//! Row and bulk actions, each followed by a refetch of the list.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{ContentStatus, RecordId};
use crate::resource::{ListController, ListSource, Resource};

/// One backend action keyed by a record id.
///
/// Toggles carry the target value rather than "flip", so repeating an
/// action converges on the same state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum Mutation {
    VerifyLawyer,
    RejectLawyer { reason: String },
    SetActive(bool),
    SetVerified(bool),
    SetContentStatus(ContentStatus),
    PublishArticle,
    ArchiveArticle,
    DeleteArticle,
    DeletePolicy,
}

impl Mutation {
    pub fn success_message(&self) -> String {
        match self {
            Mutation::VerifyLawyer => "Lawyer verified".to_string(),
            Mutation::RejectLawyer { .. } => "Lawyer rejected".to_string(),
            Mutation::SetActive(true) => "User activated".to_string(),
            Mutation::SetActive(false) => "User deactivated".to_string(),
            Mutation::SetVerified(true) => "User marked verified".to_string(),
            Mutation::SetVerified(false) => "User marked unverified".to_string(),
            Mutation::SetContentStatus(status) => format!("Content marked {status}"),
            Mutation::PublishArticle => "Article published".to_string(),
            Mutation::ArchiveArticle => "Article archived".to_string(),
            Mutation::DeleteArticle => "Article deleted".to_string(),
            Mutation::DeletePolicy => "Policy deleted".to_string(),
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            Mutation::VerifyLawyer => "Failed to verify lawyer",
            Mutation::RejectLawyer { .. } => "Failed to reject lawyer",
            Mutation::SetActive(_) => "Failed to update user status",
            Mutation::SetVerified(_) => "Failed to update verification",
            Mutation::SetContentStatus(_) => "Failed to update content status",
            Mutation::PublishArticle => "Failed to publish article",
            Mutation::ArchiveArticle => "Failed to archive article",
            Mutation::DeleteArticle => "Failed to delete article",
            Mutation::DeletePolicy => "Failed to delete policy",
        }
    }
}

/// Anything that can carry out a [`Mutation`].
#[async_trait]
pub trait MutationSink: Send + Sync {
    async fn apply(&self, id: &RecordId, mutation: &Mutation) -> Result<()>;
}

/// Row checkboxes plus the header "select all" box.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<RecordId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, id: &RecordId) {
        if !self.ids.remove(id) {
            self.ids.insert(id.clone());
        }
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.ids.contains(id)
    }

    pub fn all_selected<'a>(&self, ids: impl IntoIterator<Item = &'a RecordId>) -> bool {
        let mut any = false;
        for id in ids {
            any = true;
            if !self.ids.contains(id) {
                return false;
            }
        }
        any
    }

    /// Select every id when not all are selected yet, otherwise clear.
    pub fn toggle_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a RecordId> + Clone) {
        if self.all_selected(ids.clone()) {
            self.ids.clear();
        } else {
            self.ids.extend(ids.into_iter().cloned());
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &RecordId> {
        self.ids.iter()
    }
}

impl FromIterator<RecordId> for Selection {
    fn from_iter<I: IntoIterator<Item = RecordId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Result of a bulk action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    pub succeeded: Vec<RecordId>,
    pub failed: Vec<RecordId>,
}

impl<R: Resource, S: ListSource<R>> ListController<R, S> {
    /// Run one action, then refetch on success.
    ///
    /// A rejected action raises an error notice and hands the error back;
    /// an optimistic patch is undone so the list is left as it was.
    pub async fn mutate<M: MutationSink>(
        &mut self,
        sink: &M,
        id: &RecordId,
        mutation: &Mutation,
    ) -> Result<()> {
        let previous = if self.is_optimistic() {
            self.list_mut().patch_local(id, mutation)
        } else {
            None
        };

        match sink.apply(id, mutation).await {
            Ok(()) => {
                tracing::info!(record_id = %id, ?mutation, "mutation applied");
                self.notices().success(mutation.success_message());
                self.refresh().await;
                Ok(())
            }
            Err(e) => {
                tracing::error!(record_id = %id, ?mutation, error = %e, "mutation failed");
                if let Some(previous) = previous {
                    self.list_mut().restore(previous);
                }
                self.notices()
                    .error(format!("{}: {e}", mutation.failure_message()));
                Err(e)
            }
        }
    }

    /// Run one action per selected id, in order, then refetch once.
    ///
    /// There is no rollback: ids that succeeded stay applied even when a
    /// later one fails. Each failure raises its own notice.
    pub async fn mutate_bulk<M: MutationSink>(
        &mut self,
        sink: &M,
        selection: &Selection,
        mutation: &Mutation,
    ) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();

        for id in selection.ids() {
            match sink.apply(id, mutation).await {
                Ok(()) => outcome.succeeded.push(id.clone()),
                Err(e) => {
                    tracing::error!(record_id = %id, ?mutation, error = %e, "bulk mutation failed");
                    self.notices()
                        .error(format!("{} {id}: {e}", mutation.failure_message()));
                    outcome.failed.push(id.clone());
                }
            }
        }

        if !outcome.succeeded.is_empty() {
            self.notices().success(format!(
                "{} ({} of {})",
                mutation.success_message(),
                outcome.succeeded.len(),
                selection.len()
            ));
        }

        self.refresh().await;
        outcome
    }
}
