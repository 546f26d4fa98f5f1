//! Configuration loading and management.
//!
//! Sources, lowest priority first:
//! 1. **Defaults** compiled in
//! 2. **File** - `--config`, `TASKBOARD_CONFIG_PATH`, or `./taskboard.yaml`
//! 3. **Environment** - `TASKBOARD_*` variables
//! 4. **CLI flags** - applied by the binary
//!
//! ## Environment Variables
//! - `TASKBOARD_DB_PATH` - SQLite database file
//! - `TASKBOARD_HOST` / `TASKBOARD_PORT` - Listen address
//! - `TASKBOARD_ROUTES` - `root` or `main`
//! - `TASKBOARD_STARTUP_MODE` - `retry` or `once`
//! - `TASKBOARD_READY_ATTEMPTS` / `TASKBOARD_READY_DELAY_MS` - Retry bound and delay
//! - `TASKBOARD_ON_EXHAUSTED` - `proceed` or `fail`

mod loader;
mod types;

pub use loader::{CONFIG_PATH_ENV, DEFAULT_CONFIG_FILE};
pub use types::*;
