mod common;

use common::{doc, folder, setup_pool, typed_doc, RecordingSource};
use gdoc_press::db;
use gdoc_press::model::FileState;
use gdoc_press::reconcile::{self, ActionOutcome, AdminAction};

async fn seeded() -> (sqlx::SqlitePool, RecordingSource) {
    let pool = setup_pool().await;
    let source = RecordingSource::new();
    source.add(doc("index"), "<p>home</p>").await;
    source.add(doc("about"), "<p>about</p>").await;
    source.add(doc("draft"), "<p>draft</p>").await;
    db::upsert_post(&pool, "index", "<p>home</p>").await.unwrap();
    db::upsert_post(&pool, "about", "<p>about</p>").await.unwrap();
    db::upsert_post(&pool, "retired", "<p>bye</p>").await.unwrap();
    db::upsert_post(&pool, "renamed", "<p>old name</p>").await.unwrap();
    (pool, source)
}

#[tokio::test]
async fn load_classifies_folder_against_store() {
    let (pool, source) = seeded().await;
    let state = reconcile::load(&pool, &source, &folder()).await.unwrap();

    assert_eq!(state.state_of("index"), Some(FileState::Active));
    assert_eq!(state.state_of("about"), Some(FileState::Active));
    assert_eq!(state.state_of("draft"), Some(FileState::Available));
    assert_eq!(
        state.orphaned,
        vec!["renamed".to_string(), "retired".to_string()]
    );
    assert_eq!(state.len(), 5);
}

#[tokio::test]
async fn delete_all_orphaned_leaves_no_orphans() {
    let (pool, source) = seeded().await;
    let outcome = reconcile::apply(
        &pool,
        &source,
        &folder(),
        AdminAction::DeleteAllOrphaned,
        "",
    )
    .await
    .unwrap();
    assert_eq!(outcome, ActionOutcome::OrphansRemoved(2));

    let state = reconcile::load(&pool, &source, &folder()).await.unwrap();
    assert!(state.orphaned.is_empty());
    assert_eq!(state.active.len(), 2);

    // repeating is a no-op
    let again = reconcile::apply(&pool, &source, &folder(), AdminAction::DeleteAllOrphaned, "")
        .await
        .unwrap();
    assert_eq!(again, ActionOutcome::OrphansRemoved(0));
}

#[tokio::test]
async fn delete_all_orphaned_with_empty_folder_clears_store() {
    let (pool, source) = seeded().await;
    for name in ["index", "about", "draft"] {
        source.remove(name).await;
    }
    reconcile::delete_all_orphaned(&pool, &source, &folder())
        .await
        .unwrap();
    assert_eq!(db::count_posts(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn non_docs_are_orphaned_in_view_and_bulk_delete() {
    let (pool, source) = seeded().await;
    source
        .add(typed_doc("budget", "application/vnd.google-apps.spreadsheet"), "")
        .await;
    db::upsert_post(&pool, "budget", "<p>stale</p>").await.unwrap();

    let state = reconcile::load(&pool, &source, &folder()).await.unwrap();
    assert_eq!(state.state_of("budget"), Some(FileState::Orphaned));

    reconcile::delete_all_orphaned(&pool, &source, &folder())
        .await
        .unwrap();
    assert!(db::get_post(&pool, "budget").await.unwrap().is_none());
    let state = reconcile::load(&pool, &source, &folder()).await.unwrap();
    assert!(state.orphaned.is_empty());
}

#[tokio::test]
async fn listing_failure_deletes_nothing() {
    let (pool, source) = seeded().await;
    source.fail_listing().await;

    let res = reconcile::apply(&pool, &source, &folder(), AdminAction::DeleteAllOrphaned, "").await;
    assert!(res.is_err());
    assert_eq!(db::count_posts(&pool).await.unwrap(), 4);
}

#[tokio::test]
async fn activate_with_empty_fetch_keeps_row_count() {
    let (pool, source) = seeded().await;
    let before = db::count_posts(&pool).await.unwrap();

    let outcome = reconcile::apply(&pool, &source, &folder(), AdminAction::Activate, "nope")
        .await
        .unwrap();
    assert_eq!(outcome, ActionOutcome::NothingFetched);
    assert_eq!(db::count_posts(&pool).await.unwrap(), before);
}

#[tokio::test]
async fn activate_then_deactivate_round() {
    let (pool, source) = seeded().await;

    let outcome = reconcile::apply(&pool, &source, &folder(), AdminAction::Activate, "draft")
        .await
        .unwrap();
    assert_eq!(outcome, ActionOutcome::Published);
    let state = reconcile::load(&pool, &source, &folder()).await.unwrap();
    assert_eq!(state.state_of("draft"), Some(FileState::Active));

    let outcome = reconcile::apply(&pool, &source, &folder(), AdminAction::Deactivate, "draft")
        .await
        .unwrap();
    assert_eq!(outcome, ActionOutcome::Removed);
    let outcome = reconcile::apply(&pool, &source, &folder(), AdminAction::Delete, "draft")
        .await
        .unwrap();
    assert_eq!(outcome, ActionOutcome::NotPresent);
}

#[tokio::test]
async fn refresh_overwrites_content() {
    let (pool, source) = seeded().await;
    source.remove("about").await;
    source.add(doc("about"), "<p>about v2</p>").await;

    reconcile::apply(&pool, &source, &folder(), AdminAction::Refresh, "about")
        .await
        .unwrap();
    let post = db::get_post(&pool, "about").await.unwrap().unwrap();
    assert_eq!(post.content, "<p>about v2</p>");
}
