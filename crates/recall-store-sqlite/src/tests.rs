//! Integration tests for `SqliteBacklog` against real SQLite databases.

use std::{collections::BTreeSet, sync::Arc, time::Duration};

use recall_core::{
  AuthToken, Committer, Error as CoreError, Ingestor, Selector,
  backlog::Backlog,
  question::{Candidate, QuestionId},
};

use crate::{
  Error, PoolConfig, SqliteBacklog,
  encode::encode_dt,
  schema::SCHEMA,
  store::{is_unique_violation, try_insert},
};

async fn store() -> SqliteBacklog {
  SqliteBacklog::open_in_memory()
    .await
    .expect("in-memory store")
}

fn candidate(slug: &str) -> Candidate {
  Candidate::new(slug.replace('-', " "), format!("https://leetcode.com/problems/{slug}/"))
}

async fn seed(s: &SqliteBacklog, slugs: &[&str]) -> Vec<QuestionId> {
  s.insert_new(slugs.iter().map(|slug| candidate(slug)).collect())
    .await
    .unwrap();
  s.list_questions().await.unwrap().into_iter().map(|q| q.id).collect()
}

// ─── Ingestion ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_new_creates_rows_at_zero() {
  let s = store().await;
  let inserted = s.insert_new(vec![candidate("two-sum")]).await.unwrap();
  assert_eq!(inserted.len(), 1);

  let all = s.list_questions().await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].url, "https://leetcode.com/problems/two-sum/");
  assert_eq!(all[0].revision_count, 0);
  assert!(all[0].last_sent_date.is_none());
}

#[tokio::test]
async fn insert_new_skips_existing_urls() {
  let s = store().await;
  s.insert_new(vec![candidate("two-sum")]).await.unwrap();
  let inserted = s
    .insert_new(vec![candidate("two-sum"), candidate("lru-cache")])
    .await
    .unwrap();

  assert_eq!(inserted, vec![candidate("lru-cache")]);
  assert_eq!(s.list_questions().await.unwrap().len(), 2);
}

#[tokio::test]
async fn duplicate_inside_one_batch_is_inserted_once() {
  let s = store().await;
  let inserted = s
    .insert_new(vec![candidate("two-sum"), candidate("two-sum")])
    .await
    .unwrap();
  assert_eq!(inserted.len(), 1);
  assert_eq!(s.list_questions().await.unwrap().len(), 1);
}

#[test]
fn unique_violation_is_recognised_as_present() {
  let conn = rusqlite::Connection::open_in_memory().unwrap();
  conn.execute_batch(SCHEMA).unwrap();
  let url = "https://leetcode.com/problems/two-sum/";

  assert!(try_insert(&conn, url).unwrap());
  // Skips the existence check, as a concurrent writer would.
  assert!(!try_insert(&conn, url).unwrap());

  let err = conn
    .execute("INSERT INTO questions (url) VALUES (?1)", [url])
    .unwrap_err();
  assert!(is_unique_violation(&err));

  let not_unique = conn
    .execute("INSERT INTO questions (url, revision_count) VALUES ('x', -1)", [])
    .unwrap_err();
  assert!(!is_unique_violation(&not_unique));
}

// ─── Selection ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn minimum_tier_on_empty_store_is_empty() {
  let s = store().await;
  assert!(s.minimum_tier().await.unwrap().is_empty());
}

#[tokio::test]
async fn minimum_tier_only_holds_lowest_count() {
  let s = store().await;
  let ids = seed(&s, &["a", "b", "c"]).await;
  s.increment_revisions(vec![ids[2]]).await.unwrap();

  let tier: Vec<QuestionId> = s.minimum_tier().await.unwrap().into_iter().map(|q| q.id).collect();
  assert_eq!(tier, vec![ids[0], ids[1]]);
}

#[tokio::test]
async fn minimum_tier_moves_up_when_everything_is_revised() {
  let s = store().await;
  let ids = seed(&s, &["a", "b"]).await;
  s.increment_revisions(ids.clone()).await.unwrap();

  let tier = s.minimum_tier().await.unwrap();
  assert_eq!(tier.len(), 2);
  assert!(tier.iter().all(|q| q.revision_count == 1));
}

// ─── Commits ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn increment_touches_only_named_rows() {
  let s = store().await;
  let ids = seed(&s, &["a", "b", "c"]).await;

  let affected = s.increment_revisions(vec![ids[0], ids[2]]).await.unwrap();
  assert_eq!(affected, 2);

  let counts: Vec<u32> = s
    .list_questions()
    .await
    .unwrap()
    .into_iter()
    .map(|q| q.revision_count)
    .collect();
  assert_eq!(counts, vec![1, 0, 1]);
}

#[tokio::test]
async fn increment_unknown_id_affects_nothing() {
  let s = store().await;
  let ids = seed(&s, &["a"]).await;

  let affected = s.increment_revisions(vec![QuestionId(9_999)]).await.unwrap();
  assert_eq!(affected, 0);
  assert_eq!(s.get_question(ids[0]).await.unwrap().unwrap().revision_count, 0);
}

#[tokio::test]
async fn get_question_missing_returns_none() {
  let s = store().await;
  assert!(s.get_question(QuestionId(1)).await.unwrap().is_none());
}

#[tokio::test]
async fn last_sent_date_is_decoded() {
  let s = store().await;
  let ids = seed(&s, &["a"]).await;
  let sent = chrono::DateTime::parse_from_rfc3339("2024-03-01T08:00:00Z")
    .unwrap()
    .with_timezone(&chrono::Utc);

  let conn = s.pool.acquire().await.unwrap();
  let stamp = encode_dt(sent);
  let id = ids[0].0;
  conn
    .call(move |c| {
      c.execute(
        "UPDATE questions SET last_sent_date = ?1 WHERE id = ?2",
        rusqlite::params![stamp, id],
      )?;
      Ok(())
    })
    .await
    .unwrap();
  conn.release();

  let q = s.get_question(ids[0]).await.unwrap().unwrap();
  assert_eq!(q.last_sent_date, Some(sent));
}

// ─── End-to-end through the core components ─────────────────────────────────

#[tokio::test]
async fn ingest_select_commit_scenario() {
  let backlog = Arc::new(store().await);
  let ingestor = Ingestor::new(Arc::clone(&backlog));
  let selector = Selector::new(Arc::clone(&backlog));
  let committer = Committer::new(Arc::clone(&backlog), AuthToken::new("token"));

  assert!(matches!(selector.select_next(2).await, Err(CoreError::EmptyBacklog)));

  let inserted = ingestor
    .ingest(vec![Candidate::new("Two Sum", "https://x/two-sum/")])
    .await
    .unwrap();
  assert_eq!(inserted, vec!["https://x/two-sum/".to_string()]);

  let picked = selector.select_next(2).await.unwrap();
  assert_eq!(picked.len(), 1);
  assert_eq!(picked[0].url, "https://x/two-sum/");

  let result = committer
    .commit(BTreeSet::from([picked[0].id]), Some("token"))
    .await
    .unwrap();
  assert_eq!(result.rows_affected, 1);

  let q = backlog.get_question(picked[0].id).await.unwrap().unwrap();
  assert_eq!(q.revision_count, 1);
}

#[tokio::test]
async fn unauthorized_commit_changes_nothing() {
  let backlog = Arc::new(store().await);
  let ids = seed(&backlog, &["a", "b"]).await;
  let committer = Committer::new(Arc::clone(&backlog), AuthToken::new("token"));

  let err = committer
    .commit(ids.iter().copied().collect(), Some("wrong"))
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::Unauthorized));
  assert!(
    backlog
      .list_questions()
      .await
      .unwrap()
      .iter()
      .all(|q| q.revision_count == 0)
  );
}

// ─── Pool behaviour against SQLite ───────────────────────────────────────────

#[tokio::test]
async fn closed_connection_is_replaced_on_acquire() {
  let dir = tempfile::tempdir().unwrap();
  let s = SqliteBacklog::open(dir.path().join("recall.db"), PoolConfig::default())
    .await
    .unwrap();
  seed(&s, &["a"]).await;

  // Kill the only idle connection behind the pool's back.
  let conn = s.pool.acquire().await.unwrap();
  (*conn).clone().close().await.unwrap();
  conn.release();

  // Every operation still works; the dead connection was swapped out.
  assert_eq!(s.list_questions().await.unwrap().len(), 1);
  assert_eq!(s.pool_status().live, 1);
}

#[tokio::test]
async fn shutdown_makes_store_unavailable() {
  let s = store().await;
  s.shutdown().await;

  let err = s.list_questions().await.unwrap_err();
  assert!(matches!(err, Error::PoolClosed));
  assert!(matches!(CoreError::from(err), CoreError::StoreUnavailable(_)));
}

#[tokio::test]
async fn unreachable_database_is_unavailable() {
  let dir = tempfile::tempdir().unwrap();
  let missing_parent = dir.path().join("no-such-dir").join("recall.db");
  let err = SqliteBacklog::open(
    missing_parent,
    PoolConfig::default()
      .with_connect_attempts(2)
      .with_retry_delay(Duration::from_millis(1)),
  )
  .await
  .err()
  .unwrap();

  assert!(matches!(err, Error::Connect { attempts: 2, .. }));
  assert!(matches!(CoreError::from(err), CoreError::StoreUnavailable(_)));
}

// ─── Concurrency ─────────────────────────────────────────────────────────────

async fn file_store(dir: &tempfile::TempDir) -> SqliteBacklog {
  SqliteBacklog::open(
    dir.path().join("recall.db"),
    PoolConfig::default().with_max_size(4),
  )
  .await
  .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_commits_to_same_id_all_apply() {
  let dir = tempfile::tempdir().unwrap();
  let s = file_store(&dir).await;
  let ids = seed(&s, &["a", "b"]).await;

  let mut tasks = Vec::new();
  for _ in 0..8 {
    let s = s.clone();
    let ids = ids.clone();
    tasks.push(tokio::spawn(async move { s.increment_revisions(ids).await }));
  }
  for task in tasks {
    assert_eq!(task.await.unwrap().unwrap(), 2);
  }

  let counts: Vec<u32> = s
    .list_questions()
    .await
    .unwrap()
    .into_iter()
    .map(|q| q.revision_count)
    .collect();
  assert_eq!(counts, vec![8, 8]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_commits_to_disjoint_ids_all_apply() {
  let dir = tempfile::tempdir().unwrap();
  let s = file_store(&dir).await;
  let ids = seed(&s, &["a", "b", "c", "d", "e", "f", "g", "h"]).await;

  let mut tasks = Vec::new();
  for pair in ids.chunks(2) {
    let s = s.clone();
    let pair = pair.to_vec();
    tasks.push(tokio::spawn(async move {
      let mut affected = 0;
      for _ in 0..3 {
        affected += s.increment_revisions(pair.clone()).await?;
      }
      Ok::<_, Error>(affected)
    }));
  }
  for task in tasks {
    assert_eq!(task.await.unwrap().unwrap(), 6);
  }

  let questions = s.list_questions().await.unwrap();
  assert_eq!(questions.len(), 8);
  assert!(questions.iter().all(|q| q.revision_count == 3));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_ingestion_of_same_url_inserts_once() {
  let dir = tempfile::tempdir().unwrap();
  let s = file_store(&dir).await;

  let mut tasks = Vec::new();
  for _ in 0..6 {
    let s = s.clone();
    tasks.push(tokio::spawn(async move {
      s.insert_new(vec![candidate("two-sum"), candidate("lru-cache")]).await
    }));
  }
  let mut total_inserted = 0;
  for task in tasks {
    total_inserted += task.await.unwrap().unwrap().len();
  }

  assert_eq!(total_inserted, 2);
  assert_eq!(s.list_questions().await.unwrap().len(), 2);
}
