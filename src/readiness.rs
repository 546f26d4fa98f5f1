//! Startup readiness gate.
//!
//! Makes sure the task table exists before the HTTP listener is bound. A
//! database that is still coming up is retried with a fixed delay up to a
//! fixed number of attempts; what happens after the last failed attempt is
//! decided by [`ExhaustedPolicy`].

use crate::config::{ExhaustedPolicy, ReadinessConfig, StartupMode};
use crate::db::Database;
use crate::error::{StoreError, StoreResult};
use std::time::Duration;
use tracing::{error, info, warn};

/// Something whose schema can be created on demand.
pub trait SchemaTarget {
    fn ensure_schema(&self) -> StoreResult<()>;
}

impl SchemaTarget for Database {
    fn ensure_schema(&self) -> StoreResult<()> {
        Database::ensure_schema(self)
    }
}

/// How the gate finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Schema is in place; `attempts` is how many tries it took.
    Ready { attempts: u32 },
    /// Every attempt failed and the policy said to start anyway.
    Exhausted { attempts: u32 },
}

impl GateOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, GateOutcome::Ready { .. })
    }
}

/// Run schema creation according to the configured startup mode.
pub async fn wait_for_store<T: SchemaTarget>(
    target: &T,
    config: &ReadinessConfig,
) -> StoreResult<GateOutcome> {
    match config.mode {
        StartupMode::Once => create_schema_once(target),
        StartupMode::Retry => {
            retry_schema(
                target,
                config.attempts,
                Duration::from_millis(config.delay_ms),
                config.on_exhausted,
            )
            .await
        }
    }
}

/// Single synchronous attempt; any failure is fatal.
pub fn create_schema_once<T: SchemaTarget>(target: &T) -> StoreResult<GateOutcome> {
    target.ensure_schema()?;
    info!("Tables created successfully");
    Ok(GateOutcome::Ready { attempts: 1 })
}

/// Retry schema creation on connection-class failures.
///
/// Non-retryable errors end the loop immediately.
pub async fn retry_schema<T: SchemaTarget>(
    target: &T,
    attempts: u32,
    delay: Duration,
    on_exhausted: ExhaustedPolicy,
) -> StoreResult<GateOutcome> {
    let attempts = attempts.max(1);
    let mut last_error: Option<StoreError> = None;

    for attempt in 1..=attempts {
        match target.ensure_schema() {
            Ok(()) => {
                info!(attempt, "Tables created successfully");
                return Ok(GateOutcome::Ready { attempts: attempt });
            }
            Err(e) if e.is_retryable() => {
                warn!(attempt, attempts, error = %e, "Database not ready");
                last_error = Some(e);
                if attempt < attempts {
                    tokio::time::sleep(delay).await;
                }
            }
            Err(e) => {
                error!(attempt, error = %e, "Schema creation failed");
                return Err(e);
            }
        }
    }

    match (on_exhausted, last_error) {
        (ExhaustedPolicy::Fail, Some(e)) => {
            error!(attempts, "Database never became ready, giving up");
            Err(e)
        }
        _ => {
            error!(
                attempts,
                "Database never became ready, starting without a verified schema"
            );
            Ok(GateOutcome::Exhausted { attempts })
        }
    }
}
