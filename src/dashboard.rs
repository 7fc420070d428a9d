//! Admin and learner views over the batch directory.
//!
//! Each view owns its local list and changes it only through
//! [`apply_mutation`] after the backend confirms. Every action ends in a
//! [`Notice`]; failures are logged and leave the list untouched.
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::api::BatchApi;
use crate::filter::BatchFilter;
use crate::form::BatchDraft;
use crate::model::{Batch, Enrollment, Language, Mode, User};
use crate::reconcile::{apply_mutation, Mutation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Short user-facing outcome of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn success(description: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, "Success", description)
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, "Error", description)
    }

    pub fn new(kind: NoticeKind, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == NoticeKind::Success
    }
}

pub struct AdminDashboard {
    api: Arc<dyn BatchApi>,
    batches: Vec<Batch>,
    search: String,
    editing: Option<String>,
}

impl AdminDashboard {
    pub fn new(api: Arc<dyn BatchApi>) -> Self {
        Self {
            api,
            batches: Vec::new(),
            search: String::new(),
            editing: None,
        }
    }

    /// Fetch every batch. On failure the current list is kept.
    #[instrument(skip_all)]
    pub async fn load(&mut self) -> Option<Notice> {
        match self.api.list_all().await {
            Ok(batches) => {
                info!(count = batches.len(), "loaded batches");
                self.apply(Mutation::Reset(batches));
                None
            }
            Err(err) => {
                warn!(?err, "error fetching batches");
                Some(Notice::error("Failed to load batches."))
            }
        }
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_string();
    }

    pub fn visible(&self) -> Vec<&Batch> {
        BatchFilter::admin(&self.search).apply(&self.batches)
    }

    #[instrument(skip_all)]
    pub async fn create(&mut self, draft: &BatchDraft) -> Notice {
        let payload = match draft.validate() {
            Ok(p) => p,
            Err(err) => return Notice::error(err.to_string()),
        };
        match self.api.create(&payload).await {
            Ok(batch) => {
                info!(id = %batch.id, "created batch");
                self.apply(Mutation::Append(batch));
                Notice::success("Batch created successfully!")
            }
            Err(err) => {
                warn!(?err, "error creating batch");
                Notice::error("Failed to create batch.")
            }
        }
    }

    /// Select a batch for editing and return the prefilled form.
    pub fn begin_edit(&mut self, id: &str) -> Option<BatchDraft> {
        let batch = self.batches.iter().find(|b| b.id == id)?;
        self.editing = Some(batch.id.clone());
        Some(BatchDraft::from_batch(batch))
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Send the edit form for the selected batch. The local entry becomes the
    /// backend's copy; the selection is kept if the update fails or the new
    /// capacity is below the seats already filled.
    #[instrument(skip_all)]
    pub async fn submit_edit(&mut self, draft: &BatchDraft) -> Notice {
        let Some(id) = self.editing.clone() else {
            warn!("edit submitted with no batch selected");
            return Notice::error("No batch selected for editing.");
        };
        let payload = match draft.validate() {
            Ok(p) => p,
            Err(err) => return Notice::error(err.to_string()),
        };
        let filled = self
            .batches
            .iter()
            .find(|b| b.id == id)
            .map_or(0, |b| b.filled_slots);
        if payload.total_slots < filled {
            warn!(
                id = %id,
                filled,
                requested = payload.total_slots,
                "edit would drop capacity below enrollments"
            );
            return Notice::error(format!(
                "Total slots cannot be fewer than the {} seats already filled.",
                filled
            ));
        }
        match self.api.update(&id, &payload).await {
            Ok(batch) => {
                info!(id = %batch.id, "updated batch");
                self.apply(Mutation::Replace(batch));
                self.editing = None;
                Notice::success("Batch updated successfully!")
            }
            Err(err) => {
                warn!(?err, id = %id, "error updating batch");
                Notice::error("Failed to update batch.")
            }
        }
    }

    #[instrument(skip_all, fields(id = %id))]
    pub async fn delete(&mut self, id: &str) -> Notice {
        match self.api.delete(id).await {
            Ok(()) => {
                info!("deleted batch");
                self.apply(Mutation::Remove(id.to_string()));
                if self.editing.as_deref() == Some(id) {
                    self.editing = None;
                }
                Notice::success("Batch deleted successfully!")
            }
            Err(err) => {
                warn!(?err, "error deleting batch");
                Notice::error("Failed to delete batch.")
            }
        }
    }

    fn apply(&mut self, op: Mutation) {
        self.batches = apply_mutation(&self.batches, op);
    }
}

pub struct LearnerDashboard {
    api: Arc<dyn BatchApi>,
    batches: Vec<Batch>,
    filter: BatchFilter,
    enrollments: Vec<Enrollment>,
}

impl LearnerDashboard {
    pub fn new(api: Arc<dyn BatchApi>) -> Self {
        Self {
            api,
            batches: Vec::new(),
            filter: BatchFilter::default(),
            enrollments: Vec::new(),
        }
    }

    #[instrument(skip_all)]
    pub async fn load(&mut self) -> Option<Notice> {
        match self.api.list_public().await {
            Ok(batches) => {
                info!(count = batches.len(), "loaded public batches");
                self.batches = apply_mutation(&self.batches, Mutation::Reset(batches));
                None
            }
            Err(err) => {
                warn!(?err, "error fetching batches");
                Some(Notice::error("Failed to load batches."))
            }
        }
    }

    pub fn set_filter(&mut self, search: &str, language: Option<Language>, mode: Option<Mode>) {
        self.filter = BatchFilter::learner(search, language, mode);
    }

    pub fn visible(&self) -> Vec<&Batch> {
        self.filter.apply(&self.batches)
    }

    pub fn available_count(&self) -> usize {
        self.batches.len()
    }

    /// Enrollments made during this run. They are never sent to the backend.
    pub fn enrollments(&self) -> &[Enrollment] {
        &self.enrollments
    }

    pub fn enroll(&mut self, user: &User, batch_id: &str) -> Notice {
        let Some(batch) = self.batches.iter().find(|b| b.id == batch_id) else {
            return Notice::error("Batch not found.");
        };
        let already = batch.registered_user_ids.iter().any(|u| *u == user.id)
            || self
                .enrollments
                .iter()
                .any(|e| e.batch_id == batch_id && e.user_id == user.id);
        if already {
            return Notice::new(
                NoticeKind::Error,
                "Already Enrolled",
                "You are already enrolled in this batch.",
            );
        }
        if !batch.can_enroll() {
            return Notice::new(NoticeKind::Error, "Batch Full", "No seats left in this batch.");
        }

        let enrollment = Enrollment::new_active(&user.id, batch_id);
        info!(batch_id, enrollment_id = %enrollment.id, "enrolled locally");
        self.enrollments.push(enrollment);
        Notice::new(
            NoticeKind::Success,
            "Enrollment Successful!",
            "You have been enrolled in the batch. Check your enrolled courses.",
        )
    }
}
