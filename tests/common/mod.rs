#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

use fxstream_client::api::BatchApi;
use fxstream_client::error::{ApiError, ApiResult};
use fxstream_client::form::{BatchDraft, BatchPayload};
use fxstream_client::model::{Batch, Language, Mode, Role, User};

pub fn user(id: &str, role: Role) -> User {
    User {
        id: id.into(),
        full_name: format!("User {}", id),
        email: format!("{}@example.com", id),
        role,
    }
}

pub fn batch(id: &str, name: &str, total: u32, filled: u32) -> Batch {
    Batch {
        id: id.into(),
        name: name.into(),
        description: format!("{} syllabus", name),
        start_date: "2025-04-01T00:00:00.000Z".into(),
        duration: "6 weeks".into(),
        mode: Mode::Online,
        price: 1999.0,
        thumbnail_url: format!("https://cdn.example/{}.png", id),
        total_slots: total,
        filled_slots: filled,
        language: Language::English,
        registered_user_ids: vec![],
    }
}

pub fn intro_to_fx() -> BatchDraft {
    BatchDraft {
        title: "Intro to FX".into(),
        description: "Currency pairs, pips and lots".into(),
        duration: "4 weeks".into(),
        price: 999.0,
        image: "https://cdn.example/intro.png".into(),
        start_date: "2025-05-05".into(),
        max_students: 50,
        ..Default::default()
    }
}

/// In-memory stand-in for the backend's batch collection. Updates overwrite
/// the mutable fields and keep server-owned ones (slot counts, registrations).
#[derive(Clone, Default)]
pub struct FakeBatchBackend {
    records: Arc<Mutex<Vec<Batch>>>,
    failures: Arc<Mutex<VecDeque<ApiError>>>,
    calls: Arc<Mutex<Vec<String>>>,
    next_id: Arc<Mutex<u32>>,
}

impl FakeBatchBackend {
    pub fn with_records(records: Vec<Batch>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            ..Default::default()
        }
    }

    /// Make the next call fail with `err`.
    pub async fn fail_next(&self, err: ApiError) {
        self.failures.lock().await.push_back(err);
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    pub async fn records(&self) -> Vec<Batch> {
        self.records.lock().await.clone()
    }

    /// Simulate enrollments made elsewhere.
    pub async fn set_filled(&self, id: &str, filled: u32) {
        let mut guard = self.records.lock().await;
        if let Some(b) = guard.iter_mut().find(|b| b.id == id) {
            b.filled_slots = filled;
        }
    }

    async fn enter(&self, call: String) -> ApiResult<()> {
        self.calls.lock().await.push(call);
        match self.failures.lock().await.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn apply_payload(batch: &mut Batch, payload: &BatchPayload) {
    batch.name = payload.batch_name.clone();
    batch.description = payload.description.clone();
    batch.duration = payload.duration.clone();
    batch.price = payload.price;
    batch.start_date = format!("{}T00:00:00.000Z", payload.start_date);
    batch.total_slots = payload.total_slots;
    batch.mode = payload.mode;
    batch.language = payload.language;
    batch.thumbnail_url = payload.thumbnail.clone();
}

pub fn not_found() -> ApiError {
    ApiError::Rejected {
        status: StatusCode::NOT_FOUND,
        body: "{\"message\":\"Batch not found\"}".into(),
    }
}

#[async_trait]
impl BatchApi for FakeBatchBackend {
    async fn list_all(&self) -> ApiResult<Vec<Batch>> {
        self.enter("list_all".into()).await?;
        Ok(self.records.lock().await.clone())
    }

    async fn list_public(&self) -> ApiResult<Vec<Batch>> {
        self.enter("list_public".into()).await?;
        Ok(self.records.lock().await.clone())
    }

    async fn create(&self, payload: &BatchPayload) -> ApiResult<Batch> {
        self.enter(format!("create {}", payload.batch_name)).await?;
        let id = {
            let mut next = self.next_id.lock().await;
            *next += 1;
            format!("srv-{}", *next)
        };
        let mut created = batch(&id, "", payload.total_slots, 0);
        apply_payload(&mut created, payload);
        self.records.lock().await.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &str, payload: &BatchPayload) -> ApiResult<Batch> {
        self.enter(format!("update {}", id)).await?;
        let mut guard = self.records.lock().await;
        let stored = guard.iter_mut().find(|b| b.id == id).ok_or_else(not_found)?;
        apply_payload(stored, payload);
        Ok(stored.clone())
    }

    async fn delete(&self, id: &str) -> ApiResult<()> {
        self.enter(format!("delete {}", id)).await?;
        let mut guard = self.records.lock().await;
        let before = guard.len();
        guard.retain(|b| b.id != id);
        if guard.len() == before {
            return Err(not_found());
        }
        Ok(())
    }
}
