//! Tests for the startup readiness gate.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use taskboard::config::{ExhaustedPolicy, ReadinessConfig, StartupMode};
use taskboard::db::Database;
use taskboard::error::{StoreError, StoreResult};
use taskboard::readiness::{GateOutcome, SchemaTarget, create_schema_once, retry_schema, wait_for_store};
use tokio::time::Instant;

const DELAY: Duration = Duration::from_secs(2);

fn unavailable() -> StoreError {
    StoreError::Unavailable(rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
        Some("unable to open database file".to_string()),
    ))
}

fn broken() -> StoreError {
    StoreError::Query(rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
        Some("syntax error".to_string()),
    ))
}

/// Fails with a connection error until `fail_times` calls have been made.
struct FlakyStore {
    fail_times: u32,
    calls: AtomicU32,
}

impl FlakyStore {
    fn new(fail_times: u32) -> Self {
        Self {
            fail_times,
            calls: AtomicU32::new(0),
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SchemaTarget for FlakyStore {
    fn ensure_schema(&self) -> StoreResult<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.fail_times {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

/// Always fails with a non-retryable error.
struct BrokenStore {
    calls: AtomicU32,
}

impl SchemaTarget for BrokenStore {
    fn ensure_schema(&self) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(broken())
    }
}

fn retry_config(on_exhausted: ExhaustedPolicy) -> ReadinessConfig {
    ReadinessConfig {
        mode: StartupMode::Retry,
        attempts: 10,
        delay_ms: 2_000,
        on_exhausted,
    }
}

#[tokio::test(start_paused = true)]
async fn ready_on_first_attempt_does_not_wait() {
    let store = FlakyStore::new(0);
    let start = Instant::now();

    let outcome = retry_schema(&store, 10, DELAY, ExhaustedPolicy::Proceed)
        .await
        .unwrap();

    assert_eq!(outcome, GateOutcome::Ready { attempts: 1 });
    assert_eq!(store.calls(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn becomes_ready_after_failures() {
    for n in [2u32, 5, 10] {
        let store = FlakyStore::new(n - 1);
        let start = Instant::now();

        let outcome = retry_schema(&store, 10, DELAY, ExhaustedPolicy::Fail)
            .await
            .unwrap();

        assert_eq!(outcome, GateOutcome::Ready { attempts: n });
        assert!(outcome.is_ready());
        assert_eq!(store.calls(), n);
        assert_eq!(start.elapsed(), DELAY * (n - 1));
    }
}

#[tokio::test(start_paused = true)]
async fn exhausted_proceeds_by_default() {
    let store = FlakyStore::new(u32::MAX);
    let start = Instant::now();

    let outcome = wait_for_store(&store, &retry_config(ExhaustedPolicy::Proceed))
        .await
        .unwrap();

    assert_eq!(outcome, GateOutcome::Exhausted { attempts: 10 });
    assert!(!outcome.is_ready());
    assert_eq!(store.calls(), 10);
    // No sleep after the final attempt.
    assert_eq!(start.elapsed(), DELAY * 9);
}

#[tokio::test(start_paused = true)]
async fn exhausted_fails_when_configured() {
    let store = FlakyStore::new(u32::MAX);

    let err = wait_for_store(&store, &retry_config(ExhaustedPolicy::Fail))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Unavailable(_)));
    assert_eq!(store.calls(), 10);
}

#[tokio::test(start_paused = true)]
async fn non_retryable_error_stops_immediately() {
    let store = BrokenStore {
        calls: AtomicU32::new(0),
    };

    let err = retry_schema(&store, 10, DELAY, ExhaustedPolicy::Proceed)
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Query(_)));
    assert_eq!(store.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn zero_attempts_still_tries_once() {
    let store = FlakyStore::new(0);

    let outcome = retry_schema(&store, 0, DELAY, ExhaustedPolicy::Fail)
        .await
        .unwrap();

    assert_eq!(outcome, GateOutcome::Ready { attempts: 1 });
}

#[tokio::test]
async fn once_mode_does_not_retry() {
    let store = FlakyStore::new(1);
    let config = ReadinessConfig {
        mode: StartupMode::Once,
        ..retry_config(ExhaustedPolicy::Proceed)
    };

    let err = wait_for_store(&store, &config).await.unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(store.calls(), 1);
}

#[test]
fn once_mode_creates_schema() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::connect_lazy(dir.path().join("tasks.db"));

    let outcome = create_schema_once(&db).unwrap();

    assert_eq!(outcome, GateOutcome::Ready { attempts: 1 });
    assert!(db.list_tasks().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn gate_waits_for_real_database_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("volume");
    let db = Database::connect_lazy(nested.join("tasks.db"));

    let creator = {
        let nested = nested.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            std::fs::create_dir_all(nested).unwrap();
        })
    };

    let outcome = retry_schema(&db, 10, DELAY, ExhaustedPolicy::Fail)
        .await
        .unwrap();
    creator.await.unwrap();

    // Attempts at t=0, 2, 4 fail; t=6 succeeds.
    assert_eq!(outcome, GateOutcome::Ready { attempts: 4 });
    assert!(db.list_tasks().unwrap().is_empty());
}

#[tokio::test]
async fn gate_retries_while_database_is_locked() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.db");

    let holder = rusqlite::Connection::open(&path).unwrap();
    holder
        .execute_batch("PRAGMA journal_mode=WAL; BEGIN EXCLUSIVE;")
        .unwrap();
    let releaser = std::thread::spawn(move || {
        // Outlast the 5 s busy timeout so the first attempt fails.
        std::thread::sleep(Duration::from_secs(6));
        holder.execute_batch("COMMIT;").unwrap();
    });

    let db = Database::connect_lazy(&path);
    let outcome = retry_schema(&db, 5, DELAY, ExhaustedPolicy::Fail)
        .await
        .unwrap();
    releaser.join().unwrap();

    assert!(outcome.is_ready());
    assert!(matches!(outcome, GateOutcome::Ready { attempts } if attempts >= 2));
    assert!(db.list_tasks().unwrap().is_empty());
}
