//! Shared setup for unit and integration tests.

use std::env;
use std::sync::Once;

use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::services::{MapStorage, MindMapManager};
use crate::infrastructure::traits::RealFileSystem;

static TEST_SETUP: Once = Once::new();

/// Install a global tracing subscriber once per test binary.
///
/// Honors `RUST_LOG`; defaults to `debug`.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_test_writer()
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_filter(env_filter),
        );

        if let Err(e) = subscriber.try_init() {
            eprintln!("Error: Failed to set up logging: {}", e);
        }
        info!(
            "Test Setup complete (RUST_LOG={})",
            env::var("RUST_LOG").unwrap_or_default()
        );
    });
}

/// Manager storing maps under `data_dir` on the real filesystem.
pub fn manager_in(data_dir: &std::path::Path) -> MindMapManager {
    MindMapManager::new(MapStorage::new(
        std::sync::Arc::new(RealFileSystem),
        data_dir,
    ))
}
