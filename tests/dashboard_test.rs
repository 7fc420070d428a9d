mod common;

use std::sync::Arc;

use common::{batch, intro_to_fx, not_found, user, FakeBatchBackend};
use fxstream_client::dashboard::{AdminDashboard, LearnerDashboard, NoticeKind};
use fxstream_client::form::BatchDraft;
use fxstream_client::model::{Language, Mode, Role};

async fn loaded_admin(backend: &FakeBatchBackend) -> AdminDashboard {
    let mut view = AdminDashboard::new(Arc::new(backend.clone()));
    assert!(view.load().await.is_none());
    view
}

#[tokio::test]
async fn create_appends_backend_record() {
    let backend = FakeBatchBackend::with_records(vec![
        batch("a", "Price Action", 30, 10),
        batch("b", "Options Basics", 20, 20),
    ]);
    let mut view = loaded_admin(&backend).await;
    let before = view.batches().len();

    let notice = view.create(&intro_to_fx()).await;
    assert!(notice.is_success());
    assert_eq!(notice.description, "Batch created successfully!");

    let batches = view.batches();
    assert_eq!(batches.len(), before + 1);
    let created = batches.last().unwrap();
    assert_eq!(created.id, "srv-1");
    assert_eq!(created.name, "Intro to FX");
    assert_eq!(created.price, 999.0);
    assert_eq!(created.total_slots, 50);
    assert_eq!(created.filled_slots, 0);
    assert_eq!(created.description, "Currency pairs, pips and lots");
    assert_eq!(created.duration, "4 weeks");
    assert_eq!(created.thumbnail_url, "https://cdn.example/intro.png");
    assert_eq!(created.mode, Mode::Online);
    assert_eq!(created.language, Language::English);
    assert_eq!(
        created.start_day().map(|d| d.to_string()).as_deref(),
        Some("2025-05-05")
    );

    // Optimistic append agrees with a fresh fetch.
    let mut fresh = AdminDashboard::new(Arc::new(backend.clone()));
    fresh.load().await;
    assert_eq!(fresh.batches(), view.batches());
}

#[tokio::test]
async fn empty_form_never_reaches_backend() {
    let backend = FakeBatchBackend::with_records(vec![batch("a", "A", 5, 0)]);
    let mut view = loaded_admin(&backend).await;

    let notice = view.create(&BatchDraft::default()).await;
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.description, "title is required");
    assert_eq!(view.batches().len(), 1);
    assert_eq!(backend.calls().await, vec!["list_all"]);
}

#[tokio::test]
async fn failed_create_leaves_list_unchanged() {
    let backend = FakeBatchBackend::with_records(vec![batch("a", "A", 5, 0)]);
    let mut view = loaded_admin(&backend).await;
    backend.fail_next(not_found()).await;

    let notice = view.create(&intro_to_fx()).await;
    assert_eq!(notice.description, "Failed to create batch.");
    assert_eq!(view.batches().len(), 1);
}

#[tokio::test]
async fn delete_removes_exactly_one() {
    let backend = FakeBatchBackend::with_records(vec![
        batch("a", "A", 5, 0),
        batch("b", "B", 5, 0),
        batch("c", "C", 5, 0),
    ]);
    let mut view = loaded_admin(&backend).await;

    let notice = view.delete("b").await;
    assert!(notice.is_success());
    assert_eq!(view.batches().len(), 2);
    assert!(view.batches().iter().all(|b| b.id != "b"));
}

#[tokio::test]
async fn failed_delete_keeps_entry() {
    let backend = FakeBatchBackend::with_records(vec![batch("a", "A", 5, 0)]);
    let mut view = loaded_admin(&backend).await;

    let notice = view.delete("missing").await;
    assert_eq!(notice.description, "Failed to delete batch.");
    assert_eq!(view.batches().len(), 1);
}

#[tokio::test]
async fn sequential_edits_track_backend_copy() {
    let backend = FakeBatchBackend::with_records(vec![batch("a", "Swing Trading", 40, 0)]);
    let mut view = loaded_admin(&backend).await;

    // First edit sets a new description.
    let mut draft = view.begin_edit("a").unwrap();
    assert_eq!(draft.start_date, "2025-04-01");
    draft.description = "Updated syllabus".into();
    assert!(view.submit_edit(&draft).await.is_success());
    assert_eq!(view.editing(), None);

    // Learners enroll elsewhere; the backend owns the slot count.
    backend.set_filled("a", 5).await;

    // Second edit only touches the price.
    let mut draft = view.begin_edit("a").unwrap();
    draft.price = 2499.0;
    assert!(view.submit_edit(&draft).await.is_success());

    let local = &view.batches()[0];
    assert_eq!(local.description, "Updated syllabus");
    assert_eq!(local.price, 2499.0);
    assert_eq!(local.filled_slots, 5);
    assert_eq!(local, &backend.records().await[0]);
}

#[tokio::test]
async fn edit_without_selection_is_rejected_locally() {
    let backend = FakeBatchBackend::with_records(vec![batch("a", "A", 5, 0)]);
    let mut view = loaded_admin(&backend).await;

    let notice = view.submit_edit(&intro_to_fx()).await;
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.description, "No batch selected for editing.");
    assert_eq!(backend.calls().await, vec!["list_all"]);

    assert!(view.begin_edit("nope").is_none());
    view.begin_edit("a").unwrap();
    view.cancel_edit();
    assert!(!view.submit_edit(&intro_to_fx()).await.is_success());
}

#[tokio::test]
async fn failed_update_keeps_local_copy_and_selection() {
    let backend = FakeBatchBackend::with_records(vec![batch("a", "A", 5, 0)]);
    let mut view = loaded_admin(&backend).await;
    let before = view.batches()[0].clone();

    let mut draft = view.begin_edit("a").unwrap();
    draft.title = "Renamed".into();
    backend.fail_next(not_found()).await;

    let notice = view.submit_edit(&draft).await;
    assert_eq!(notice.description, "Failed to update batch.");
    assert_eq!(view.batches()[0], before);
    assert_eq!(view.editing(), Some("a"));
}

#[tokio::test]
async fn capacity_below_enrollments_is_rejected_locally() {
    let backend = FakeBatchBackend::with_records(vec![batch("a", "Swing Trading", 20, 10)]);
    let mut view = loaded_admin(&backend).await;
    let before = view.batches()[0].clone();

    let mut draft = view.begin_edit("a").unwrap();
    draft.max_students = 5;
    let notice = view.submit_edit(&draft).await;
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(
        notice.description,
        "Total slots cannot be fewer than the 10 seats already filled."
    );
    assert_eq!(backend.calls().await, vec!["list_all"]);
    assert_eq!(view.batches()[0], before);
    assert_eq!(view.editing(), Some("a"));

    // Exactly the filled count is still allowed.
    draft.max_students = 10;
    assert!(view.submit_edit(&draft).await.is_success());
    let local = &view.batches()[0];
    assert_eq!(local.total_slots, 10);
    assert_eq!(local.filled_slots, 10);
    assert!(local.is_full());
}

#[tokio::test]
async fn failed_reload_keeps_current_list() {
    let backend = FakeBatchBackend::with_records(vec![batch("a", "A", 5, 0)]);
    let mut view = loaded_admin(&backend).await;
    backend.fail_next(not_found()).await;

    let notice = view.load().await.unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(view.batches().len(), 1);
}

#[tokio::test]
async fn admin_search_filters_by_name() {
    let backend = FakeBatchBackend::with_records(vec![
        batch("a", "Intro to FX", 5, 0),
        batch("b", "Crypto Basics", 5, 0),
    ]);
    let mut view = loaded_admin(&backend).await;
    view.set_search("intro");
    let visible: Vec<&str> = view.visible().iter().map(|b| b.id.as_str()).collect();
    assert_eq!(visible, vec!["a"]);
}

#[tokio::test]
async fn learner_browses_and_enrolls() {
    let mut hindi = batch("h", "Chart Patterns", 10, 3);
    hindi.language = Language::Hindi;
    hindi.mode = Mode::Offline;
    let backend = FakeBatchBackend::with_records(vec![
        batch("a", "Intro to FX", 50, 0),
        batch("full", "Sold Out", 2, 2),
        hindi,
    ]);
    let mut view = LearnerDashboard::new(Arc::new(backend.clone()));
    assert!(view.load().await.is_none());
    assert_eq!(view.available_count(), 3);
    assert_eq!(backend.calls().await, vec!["list_public"]);

    view.set_filter("", Some(Language::Hindi), Some(Mode::Offline));
    let visible: Vec<&str> = view.visible().iter().map(|b| b.id.as_str()).collect();
    assert_eq!(visible, vec!["h"]);

    let learner = user("u1", Role::User);

    let full = view.enroll(&learner, "full");
    assert_eq!(full.title, "Batch Full");
    assert!(!full.is_success());

    let ok = view.enroll(&learner, "a");
    assert!(ok.is_success());
    assert_eq!(ok.title, "Enrollment Successful!");
    assert_eq!(view.enrollments().len(), 1);
    assert_eq!(view.enrollments()[0].batch_id, "a");
    assert_eq!(view.enrollments()[0].user_id, "u1");

    let again = view.enroll(&learner, "a");
    assert_eq!(again.title, "Already Enrolled");
    assert_eq!(view.enrollments().len(), 1);

    assert_eq!(view.enroll(&learner, "ghost").description, "Batch not found.");

    // Enrollment is local only.
    assert_eq!(backend.calls().await, vec!["list_public"]);
}

#[tokio::test]
async fn enroll_button_state_matches_slots() {
    let backend = FakeBatchBackend::with_records(vec![
        batch("open", "Open", 3, 2),
        batch("full", "Full", 3, 3),
    ]);
    let mut view = LearnerDashboard::new(Arc::new(backend.clone()));
    view.load().await;
    for b in view.visible() {
        assert!(b.filled_slots <= b.total_slots);
        assert_eq!(b.can_enroll(), b.filled_slots != b.total_slots);
    }
}
